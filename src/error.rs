use std::fmt;
use std::path::PathBuf;

/// Optional-requirements section names reserved for the dedicated
/// test and documentation requirement files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedSection {
    /// `[tests]`, which belongs in `tests/requirements.txt`.
    Tests,
    /// `[docs]`, which belongs in `docs/requirements.txt`.
    Docs,
}

impl ReservedSection {
    /// The section name as it appears in an optional requirements file.
    pub fn name(self) -> &'static str {
        match self {
            ReservedSection::Tests => "tests",
            ReservedSection::Docs => "docs",
        }
    }
}

impl fmt::Display for ReservedSection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReservedSection::Tests => {
                write!(f, "Test dependencies should be defined in `tests/requirements`")
            }
            ReservedSection::Docs => write!(
                f,
                "Documentation dependencies should be defined in `docs/requirements`"
            ),
        }
    }
}

/// Error type for requirement parsing and metadata collection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requirement line whose name is missing or invalid.
    #[error("Dependency could not be parsed: {0}")]
    UnparsableDependency(String),

    /// Editable installs, local paths and other pip options.
    #[error("{0} option is not supported")]
    UnsupportedOption(String),

    /// A URL requirement whose egg fragment carries no version.
    #[error("Version hints must be provided for URL dependencies: {0}")]
    MissingVersionHint(String),

    /// A malformed `[section]` header.
    #[error("Could not parse optional dependency: {0}")]
    SectionSyntax(String),

    /// A requirement line before the first section header.
    #[error(
        "Required dependencies should not be placed in an optional dependencies file: {0}"
    )]
    OrphanRequirement(String),

    /// An optional requirements file defines `[tests]` or `[docs]`.
    #[error("{0}")]
    ReservedSection(ReservedSection),

    /// Neither `VERSION` nor `_version.py` exists for the package.
    #[error("no version file found for package at {}", .0.display())]
    MissingVersion(PathBuf),

    /// A package data glob pattern that does not compile.
    #[error("invalid package data pattern {pattern}: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Reason reported by the glob compiler.
        message: String,
    },

    /// A project layout document that cannot be deserialized.
    #[error("invalid project layout: {0}")]
    InvalidLayout(String),

    /// A line in `entry_points.txt` that is neither a header nor `key = value`.
    #[error("could not parse entry points file {}: {line}", .path.display())]
    InvalidEntryPoints {
        /// Path of the entry points file.
        path: PathBuf,
        /// The offending line.
        line: String,
    },

    /// Filesystem failure other than a missing requirements file.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dependency installer reported a failure.
    #[error("dependency installation failed: {0}")]
    InstallFailed(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for setup-metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_tests_message() {
        let err = Error::ReservedSection(ReservedSection::Tests);
        assert_eq!(
            err.to_string(),
            "Test dependencies should be defined in `tests/requirements`"
        );
    }

    #[test]
    fn reserved_docs_message() {
        let err = Error::ReservedSection(ReservedSection::Docs);
        assert_eq!(
            err.to_string(),
            "Documentation dependencies should be defined in `docs/requirements`"
        );
    }

    #[test]
    fn unsupported_option_message() {
        let err = Error::UnsupportedOption("editable".to_string());
        assert_eq!(err.to_string(), "editable option is not supported");
    }
}
