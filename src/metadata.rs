use std::collections::BTreeMap;
use std::path::Path;

use crate::dependencies::{get_dependencies, Dependencies};
use crate::error::{Error, Result};
use crate::fs::read_optional;
use crate::layout::ProjectLayout;
use crate::package_data::expand_package_data_filename_patterns;
use crate::render::RenderOptions;

/// Metadata of a Python package, collected from its project files.
///
/// The fields map one-to-one onto the keyword arguments of
/// `setuptools.setup`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Package name.
    pub name: String,

    /// Long description, from `README.rst`.
    pub long_description: String,

    /// Version, from `<package>/VERSION` or `<package>/_version.py`.
    pub version: String,

    /// Data files per module, relative to the module directory.
    pub package_data: BTreeMap<String, Vec<String>>,

    /// Required dependencies.
    pub install_requires: Vec<String>,

    /// Optional dependency groups, including `tests`, `docs` and `all`.
    pub extras_require: BTreeMap<String, Vec<String>>,

    /// Test dependencies.
    pub tests_require: Vec<String>,

    /// Direct links of URL dependencies.
    pub dependency_links: Vec<String>,
}

/// Collect the metadata of `package_name` in the project rooted at `dir`.
///
/// The project layout is read from `setup-metadata.toml` when present.
pub fn get_package_metadata(
    dir: &Path,
    package_name: &str,
    package_data_patterns: &BTreeMap<String, Vec<String>>,
) -> Result<PackageMetadata> {
    let layout = ProjectLayout::load(dir)?;
    get_package_metadata_with(
        dir,
        package_name,
        package_data_patterns,
        &layout,
        &RenderOptions::default(),
    )
}

/// [`get_package_metadata`] with an explicit layout and rendering options.
pub fn get_package_metadata_with(
    dir: &Path,
    package_name: &str,
    package_data_patterns: &BTreeMap<String, Vec<String>>,
    layout: &ProjectLayout,
    options: &RenderOptions,
) -> Result<PackageMetadata> {
    tracing::debug!(dir = %dir.display(), package = package_name, "collecting package metadata");

    let long_description = get_long_description(dir, layout)?;
    let version = get_version(dir, package_name)?;
    let package_data = expand_package_data_filename_patterns(dir, package_data_patterns)?;
    let Dependencies {
        install_requires,
        extras_require,
        tests_require,
        dependency_links,
    } = get_dependencies(dir, layout, options)?;

    Ok(PackageMetadata {
        name: package_name.to_string(),
        long_description,
        version,
        package_data,
        install_requires,
        extras_require,
        tests_require,
        dependency_links,
    })
}

/// Contents of the project's README, or an empty string when there is none.
pub fn get_long_description(dir: &Path, layout: &ProjectLayout) -> Result<String> {
    read_optional(&dir.join(&layout.readme))
}

/// Read the package version.
///
/// `<package>/VERSION` takes precedence; otherwise the `__version__`
/// assignment of `<package>/_version.py` is used.
pub fn get_version(dir: &Path, package_name: &str) -> Result<String> {
    let package_dir = dir.join(package_name);

    let version_file = read_optional(&package_dir.join("VERSION"))?;
    if !version_file.trim().is_empty() {
        return Ok(version_file.trim().to_string());
    }

    let version_module = read_optional(&package_dir.join("_version.py"))?;
    parse_version_assignment(&version_module).ok_or(Error::MissingVersion(package_dir))
}

/// Extract `X` from a `__version__ = 'X'` line.
fn parse_version_assignment(source: &str) -> Option<String> {
    source.lines().find_map(|line| {
        let value = line
            .trim()
            .strip_prefix("__version__")?
            .trim_start()
            .strip_prefix('=')?
            .trim();
        let quote = value.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let inner = &value[1..];
        let end = inner.find(quote)?;
        Some(inner[..end].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("package")).unwrap();
        std::fs::create_dir_all(root.join("tests")).unwrap();
        std::fs::write(
            root.join("package").join("_version.py"),
            "__version__ = '0.0.1'",
        )
        .unwrap();
        std::fs::write(root.join("requirements.txt"), "req1\nreq2[opt2]\n").unwrap();
        std::fs::write(root.join("tests").join("requirements.txt"), "req9\nreq1\n").unwrap();
        dir
    }

    #[test]
    fn collect_metadata() {
        let dir = project();
        std::fs::write(dir.path().join("README.rst"), "Test\n====\n").unwrap();

        let md = get_package_metadata(dir.path(), "package", &BTreeMap::new()).unwrap();
        assert_eq!(md.name, "package");
        assert_eq!(md.long_description, "Test\n====\n");
        assert_eq!(md.version, "0.0.1");
        assert!(md.package_data.is_empty());
        assert_eq!(md.install_requires, vec!["req1", "req2[opt2]"]);
        assert_eq!(md.tests_require, vec!["req9"]);
        assert_eq!(md.extras_require["tests"], vec!["req9"]);
        assert!(md.dependency_links.is_empty());
    }

    #[test]
    fn long_description_without_readme() {
        let dir = project();
        let description = get_long_description(dir.path(), &ProjectLayout::default()).unwrap();
        assert_eq!(description, "");
    }

    #[test]
    fn version_file_preferred() {
        let dir = project();
        std::fs::write(dir.path().join("package").join("VERSION"), "1.2.3\n").unwrap();
        assert_eq!(get_version(dir.path(), "package").unwrap(), "1.2.3");
    }

    #[test]
    fn version_from_module() {
        let dir = project();
        assert_eq!(get_version(dir.path(), "package").unwrap(), "0.0.1");
    }

    #[test]
    fn missing_version() {
        let dir = tempfile::tempdir().unwrap();
        let err = get_version(dir.path(), "package").unwrap_err();
        assert!(matches!(err, Error::MissingVersion(_)));
    }

    #[test]
    fn version_assignment_forms() {
        assert_eq!(
            parse_version_assignment("__version__ = \"2.0\"\n"),
            Some("2.0".to_string())
        );
        assert_eq!(
            parse_version_assignment("# header\n__version__='3.1.4'  # comment\n"),
            Some("3.1.4".to_string())
        );
        assert_eq!(parse_version_assignment("__version__ = VERSION\n"), None);
        assert_eq!(parse_version_assignment("__version_info__ = (1, 0)\n"), None);
    }

    #[test]
    fn layout_file_respected() {
        let dir = project();
        std::fs::write(dir.path().join("README.txt"), "plain readme").unwrap();
        std::fs::write(dir.path().join("setup-metadata.toml"), "readme = \"README.txt\"\n")
            .unwrap();
        let md = get_package_metadata(dir.path(), "package", &BTreeMap::new()).unwrap();
        assert_eq!(md.long_description, "plain readme");
    }
}
