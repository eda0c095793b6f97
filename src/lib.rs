//! Python package metadata assembled from conventional project files.
//!
//! This crate reads the files a Python project already keeps next to its
//! `setup.py` and turns them into the values `setuptools.setup` expects, so
//! the dependency lists are never maintained twice.
//!
//! # Overview
//!
//! | File | Produces |
//! |---|---|
//! | `requirements.txt` | `install_requires` |
//! | `requirements.optional.txt` | `extras_require` (one extra per `[section]`) |
//! | `tests/requirements.txt` | `tests_require` and the `tests` extra |
//! | `docs/requirements.txt` | the `docs` extra |
//! | `README.rst` | `long_description` |
//! | `<package>/VERSION` | `version` |
//!
//! Requirement lines accept names, extras, version clauses, environment
//! markers and VCS/URL sources with `#egg=name-version` fragments. URL
//! sources additionally yield `dependency_links`.
//!
//! # Examples
//!
//! Parse and render a single requirement:
//!
//! ```
//! use setup_metadata::{RenderOptions, Requirement};
//!
//! let req = Requirement::parse(
//!     "git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2[option10] #comment",
//! )
//! .unwrap();
//! assert_eq!(req.render(&RenderOptions::default()), "req10[option10]");
//! assert_eq!(
//!     req.dependency_link().unwrap(),
//!     "git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2",
//! );
//! ```
//!
//! Aggregate parsed sources:
//!
//! ```
//! use setup_metadata::{
//!     aggregate, parse_requirement_lines, OptionalRequirements, RenderOptions, RequirementLines,
//! };
//!
//! let options = RenderOptions::default();
//! let required = parse_requirement_lines(["req1", "req3 >= 1.0"], &options).unwrap();
//! let optional = OptionalRequirements::parse("[extra]\nreq1\nreq7\n", &options).unwrap();
//! let tests = parse_requirement_lines(["req9"], &options).unwrap();
//! let docs = RequirementLines::default();
//!
//! let deps = aggregate(required, optional, tests, docs).unwrap();
//! assert_eq!(deps.install_requires, vec!["req1", "req3 >= 1.0"]);
//! assert_eq!(deps.extras_require["extra"], vec!["req7"]);
//! assert_eq!(deps.extras_require["all"], vec!["req7", "req9"]);
//! ```

mod console_scripts;
mod dependencies;
mod error;
mod fs;
mod install;
mod layout;
mod lines;
mod metadata;
mod optional;
mod package_data;
mod render;
mod requirement;

// Re-export public types
pub use console_scripts::{add_console_scripts, get_console_scripts, CONSOLE_SCRIPTS};
pub use dependencies::{
    aggregate, get_dependencies, Dependencies, ALL_EXTRA, DOCS_EXTRA, TESTS_EXTRA,
};
pub use error::{Error, ReservedSection, Result};
pub use install::{install_dependencies, DependencyInstaller, PipInstaller};
pub use layout::{ProjectLayout, LAYOUT_FILE};
pub use lines::{parse_requirement_lines, parse_requirements_file, RequirementLines};
pub use metadata::{
    get_long_description, get_package_metadata, get_package_metadata_with, get_version,
    PackageMetadata,
};
pub use optional::{OptionalRequirements, Section};
pub use package_data::expand_package_data_filename_patterns;
pub use render::RenderOptions;
pub use requirement::{FileHash, Operator, Requirement, UrlSource, VersionSpec};
