use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{Error, ReservedSection, Result};
use crate::layout::ProjectLayout;
use crate::lines::{parse_requirements_file, RequirementLines};
use crate::optional::OptionalRequirements;
use crate::render::RenderOptions;

/// Extra synthesized from the test requirements file.
pub const TESTS_EXTRA: &str = "tests";
/// Extra synthesized from the documentation requirements file.
pub const DOCS_EXTRA: &str = "docs";
/// Extra holding the union of every other extra.
pub const ALL_EXTRA: &str = "all";

/// Dependency fields ready to be passed to `setuptools.setup`.
///
/// Every list is deduplicated and sorted. No extra repeats an entry of
/// `install_requires`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// `install_requires`.
    pub install_requires: Vec<String>,
    /// `extras_require`, always holding `tests`, `docs` and `all`.
    pub extras_require: BTreeMap<String, Vec<String>>,
    /// `tests_require`.
    pub tests_require: Vec<String>,
    /// `dependency_links`.
    pub dependency_links: Vec<String>,
}

/// Merge parsed requirement sources into [`Dependencies`].
///
/// Fails with [`Error::ReservedSection`] when the optional file populates a
/// `tests` or `docs` section.
pub fn aggregate(
    required: RequirementLines,
    optional: OptionalRequirements,
    tests: RequirementLines,
    docs: RequirementLines,
) -> Result<Dependencies> {
    for reserved in [ReservedSection::Tests, ReservedSection::Docs] {
        if optional
            .section(reserved.name())
            .is_some_and(|s| !s.requires.is_empty())
        {
            return Err(Error::ReservedSection(reserved));
        }
    }

    let mut extras: Vec<(String, Vec<String>)> = optional
        .sections
        .into_iter()
        .map(|s| (s.name, s.requires))
        .collect();
    extras.push((TESTS_EXTRA.to_string(), tests.requires.clone()));
    extras.push((DOCS_EXTRA.to_string(), docs.requires));
    let all: Vec<String> = extras
        .iter()
        .flat_map(|(_, requires)| requires.iter().cloned())
        .collect();
    extras.push((ALL_EXTRA.to_string(), all));

    let install_requires: BTreeSet<String> = required.requires.into_iter().collect();

    let extras_require: BTreeMap<String, Vec<String>> = extras
        .into_iter()
        .map(|(name, requires)| (name, sorted_unique(requires, &install_requires)))
        .collect();
    let tests_require = sorted_unique(tests.requires, &install_requires);

    let dependency_links: BTreeSet<String> = required
        .dependency_links
        .into_iter()
        .chain(optional.dependency_links)
        .chain(tests.dependency_links)
        .chain(docs.dependency_links)
        .collect();

    tracing::debug!(
        install_requires = install_requires.len(),
        extras = extras_require.len(),
        tests_require = tests_require.len(),
        dependency_links = dependency_links.len(),
        "aggregated dependencies"
    );

    Ok(Dependencies {
        install_requires: install_requires.into_iter().collect(),
        extras_require,
        tests_require,
        dependency_links: dependency_links.into_iter().collect(),
    })
}

/// Deduplicate and sort `requires`, dropping anything already required.
fn sorted_unique(requires: Vec<String>, exclude: &BTreeSet<String>) -> Vec<String> {
    requires
        .into_iter()
        .filter(|r| !exclude.contains(r))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Collect the dependency fields of the project rooted at `dir`.
///
/// Missing requirement files count as empty.
pub fn get_dependencies(
    dir: &Path,
    layout: &ProjectLayout,
    options: &RenderOptions,
) -> Result<Dependencies> {
    let required = parse_requirements_file(&dir.join(&layout.requirements), options)?;
    let optional = OptionalRequirements::read(&dir.join(&layout.optional_requirements), options)?;
    let tests = parse_requirements_file(&dir.join(&layout.tests_requirements), options)?;
    let docs = parse_requirements_file(&dir.join(&layout.docs_requirements), options)?;
    aggregate(required, optional, tests, docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::parse_requirement_lines;

    const REQUIREMENTS: &str = "req1\nreq1\nreq2[opt2]\nreq3 >= 1.0\n#comment\n\nreq4; python_version > \"2.6\"\n";

    const OPTIONAL_REQUIREMENTS: &str = "\
#comment
[package_opt_1]
req7

[package_opt_2]
req8[opt8a,opt8b]
req9[opt9a, opt9b]
git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2[option10] #comment
";

    const TESTS_REQUIREMENTS: &str = "req9\n";

    const DOCS_REQUIREMENTS: &str = r#"req1
req1
req2[opt2]
req3 >= 1.0
req10
req11 #comment
req12[opt12a, opt12b] <=1.0,>=2.0; python_version>="2.7"
req13[opt13a,opt13b]; python_version >= "2.7"
git+https://github.com/opt/req14.git#egg=req14-14.1.2[opt13a,opt13b]; python_version >= "2.7"
git+https://github.com/opt/req15.git#egg=req15-15.1.2 ; python_version >= "2.7"
git+https://github.com/opt/req16.git#egg=req16-16.1.2
git+https://github.com/opt/req17.git#egg=req17-17.1.2 #comment
git+https://github.com/opt/req18.git@branch#egg=req18-18.1.2 #comment
"#;

    fn write_project(dir: &Path, optional: &str) {
        std::fs::create_dir_all(dir.join("tests")).unwrap();
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        std::fs::write(dir.join("requirements.txt"), REQUIREMENTS).unwrap();
        std::fs::write(dir.join("requirements.optional.txt"), optional).unwrap();
        std::fs::write(dir.join("tests/requirements.txt"), TESTS_REQUIREMENTS).unwrap();
        std::fs::write(dir.join("docs/requirements.txt"), DOCS_REQUIREMENTS).unwrap();
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn project_fixture() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), OPTIONAL_REQUIREMENTS);
        let deps = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(
            deps.install_requires,
            strings(&["req1", "req2[opt2]", "req3 >= 1.0", r#"req4; python_version > "2.6""#])
        );
        assert_eq!(deps.tests_require, strings(&["req9"]));

        let mut expected = BTreeMap::new();
        expected.insert("package_opt_1".to_string(), strings(&["req7"]));
        expected.insert(
            "package_opt_2".to_string(),
            strings(&["req10[option10]", "req8[opt8a, opt8b]", "req9[opt9a, opt9b]"]),
        );
        expected.insert("tests".to_string(), strings(&["req9"]));
        expected.insert(
            "docs".to_string(),
            strings(&[
                "req10",
                "req11",
                r#"req12[opt12a, opt12b] <= 1.0, >= 2.0; python_version>="2.7""#,
                r#"req13[opt13a, opt13b]; python_version >= "2.7""#,
                r#"req14[opt13a, opt13b]; python_version >= "2.7""#,
                r#"req15; python_version >= "2.7""#,
                "req16",
                "req17",
                "req18",
            ]),
        );
        expected.insert(
            "all".to_string(),
            strings(&[
                "req10",
                "req10[option10]",
                "req11",
                r#"req12[opt12a, opt12b] <= 1.0, >= 2.0; python_version>="2.7""#,
                r#"req13[opt13a, opt13b]; python_version >= "2.7""#,
                r#"req14[opt13a, opt13b]; python_version >= "2.7""#,
                r#"req15; python_version >= "2.7""#,
                "req16",
                "req17",
                "req18",
                "req7",
                "req8[opt8a, opt8b]",
                "req9",
                "req9[opt9a, opt9b]",
            ]),
        );
        assert_eq!(deps.extras_require, expected);

        assert_eq!(
            deps.dependency_links,
            strings(&[
                "git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2",
                "git+https://github.com/opt/req14.git#egg=req14-14.1.2",
                "git+https://github.com/opt/req15.git#egg=req15-15.1.2",
                "git+https://github.com/opt/req16.git#egg=req16-16.1.2",
                "git+https://github.com/opt/req17.git#egg=req17-17.1.2",
                "git+https://github.com/opt/req18.git@branch#egg=req18-18.1.2",
            ])
        );
    }

    #[test]
    fn extras_never_repeat_install_requires() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), OPTIONAL_REQUIREMENTS);
        let deps = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap();
        for requires in deps.extras_require.values() {
            for r in requires {
                assert!(!deps.install_requires.contains(r), "{r}");
            }
        }
    }

    #[test]
    fn all_is_union_of_other_extras() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), OPTIONAL_REQUIREMENTS);
        let deps = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap();
        let union: BTreeSet<&String> = deps
            .extras_require
            .iter()
            .filter(|(name, _)| name.as_str() != ALL_EXTRA)
            .flat_map(|(_, requires)| requires)
            .collect();
        let all: Vec<&String> = deps.extras_require[ALL_EXTRA].iter().collect();
        assert_eq!(all, union.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn tests_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "[tests]\nreq1\n");
        let err = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ReservedSection(ReservedSection::Tests)));
        assert_eq!(
            err.to_string(),
            "Test dependencies should be defined in `tests/requirements`"
        );
    }

    #[test]
    fn docs_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "[docs]\nreq1\n");
        let err = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Documentation dependencies should be defined in `docs/requirements`"
        );
    }

    #[test]
    fn empty_project() {
        let dir = tempfile::tempdir().unwrap();
        let deps = get_dependencies(
            dir.path(),
            &ProjectLayout::default(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(deps.install_requires.is_empty());
        assert!(deps.tests_require.is_empty());
        assert!(deps.dependency_links.is_empty());
        let names: Vec<&str> = deps.extras_require.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["all", "docs", "tests"]);
        assert!(deps.extras_require.values().all(Vec::is_empty));
    }

    #[test]
    fn duplicates_across_sections_collapse_only_in_all() {
        let options = RenderOptions::default();
        let optional = OptionalRequirements::parse("[a]\nx\nx\n[b]\nx\n", &options).unwrap();
        let deps = aggregate(
            RequirementLines::default(),
            optional,
            RequirementLines::default(),
            RequirementLines::default(),
        )
        .unwrap();
        assert_eq!(deps.extras_require["a"], strings(&["x"]));
        assert_eq!(deps.extras_require["b"], strings(&["x"]));
        assert_eq!(deps.extras_require["all"], strings(&["x"]));
    }

    #[test]
    fn links_deduplicated_without_required_filter() {
        let options = RenderOptions::default();
        let line = "git+https://github.com/opt/req16.git#egg=req16-16.1.2";
        let required = parse_requirement_lines([line], &options).unwrap();
        let docs = parse_requirement_lines([line, line], &options).unwrap();
        let deps = aggregate(
            required,
            OptionalRequirements::default(),
            RequirementLines::default(),
            docs,
        )
        .unwrap();
        assert_eq!(deps.dependency_links, strings(&[line]));
        assert_eq!(deps.install_requires, strings(&["req16"]));
        assert!(deps.extras_require["docs"].is_empty());
    }

    #[test]
    fn custom_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deps.txt"), "req1\n").unwrap();
        let layout = ProjectLayout {
            requirements: "deps.txt".into(),
            ..ProjectLayout::default()
        };
        let deps = get_dependencies(dir.path(), &layout, &RenderOptions::default()).unwrap();
        assert_eq!(deps.install_requires, strings(&["req1"]));
    }
}
