use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fs::read_optional;

/// Name of the optional layout file looked up in the project root.
pub const LAYOUT_FILE: &str = "setup-metadata.toml";

/// Locations of the conventional project files, relative to the project root.
///
/// Every key is optional in `setup-metadata.toml`; omitted keys keep their
/// defaults:
///
/// ```toml
/// requirements = "requirements.txt"
/// optional-requirements = "requirements.optional.txt"
/// tests-requirements = "tests/requirements.txt"
/// docs-requirements = "docs/requirements.txt"
/// readme = "README.rst"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectLayout {
    /// Required dependencies.
    pub requirements: PathBuf,
    /// Sectioned optional dependencies.
    pub optional_requirements: PathBuf,
    /// Test dependencies, published as the `tests` extra.
    pub tests_requirements: PathBuf,
    /// Documentation dependencies, published as the `docs` extra.
    pub docs_requirements: PathBuf,
    /// Long description source.
    pub readme: PathBuf,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        ProjectLayout {
            requirements: PathBuf::from("requirements.txt"),
            optional_requirements: PathBuf::from("requirements.optional.txt"),
            tests_requirements: Path::new("tests").join("requirements.txt"),
            docs_requirements: Path::new("docs").join("requirements.txt"),
            readme: PathBuf::from("README.rst"),
        }
    }
}

impl ProjectLayout {
    /// Parse a layout document.
    ///
    /// ```
    /// use setup_metadata::ProjectLayout;
    ///
    /// let layout = ProjectLayout::from_toml_str("readme = \"README.txt\"").unwrap();
    /// assert_eq!(layout.readme.to_str(), Some("README.txt"));
    /// assert_eq!(layout.requirements.to_str(), Some("requirements.txt"));
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::InvalidLayout(e.to_string()))
    }

    /// Load `setup-metadata.toml` from `dir`, falling back to the defaults
    /// when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(LAYOUT_FILE);
        let content = read_optional(&path)?;
        if content.trim().is_empty() {
            return Ok(ProjectLayout::default());
        }
        tracing::debug!(path = %path.display(), "loading project layout");
        Self::from_toml_str(&content)
    }
}
