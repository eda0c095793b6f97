use std::path::Path;

use winnow::combinator::delimited;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::{Error, Result};
use crate::fs::read_optional;
use crate::lines::RequirementLines;
use crate::render::RenderOptions;

/// One `[name]` group of an optional requirements file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Extra name from the section header.
    pub name: String,
    /// Rendered requirements in file order, duplicates kept.
    pub requires: Vec<String>,
}

/// Contents of a sectioned optional requirements file such as
/// `requirements.optional.txt`.
///
/// ```text
/// [postgres]
/// psycopg2 >= 2.7
///
/// [plots]
/// matplotlib
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalRequirements {
    /// Sections in order of first appearance. A section is recorded once it
    /// receives its first requirement.
    pub sections: Vec<Section>,
    /// Dependency links from every section.
    pub dependency_links: Vec<String>,
}

impl OptionalRequirements {
    /// Parse the text of an optional requirements file.
    ///
    /// # Examples
    ///
    /// ```
    /// use setup_metadata::{OptionalRequirements, RenderOptions};
    ///
    /// let input = "[opt1]\nreq7\n\n[opt2]\nreq8[opt8a,opt8b]\n";
    /// let optional = OptionalRequirements::parse(input, &RenderOptions::default()).unwrap();
    /// assert_eq!(optional.sections.len(), 2);
    /// assert_eq!(optional.section("opt2").unwrap().requires, vec!["req8[opt8a, opt8b]"]);
    /// ```
    pub fn parse(input: &str, options: &RenderOptions) -> Result<Self> {
        let mut optional = OptionalRequirements::default();
        let mut current: Option<String> = None;

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                let name = parse_section_header
                    .parse(line)
                    .map_err(|_| Error::SectionSyntax(line.to_string()))?;
                tracing::trace!(section = name, "entering optional section");
                current = Some(name.to_string());
                continue;
            }

            let Some(name) = current.as_deref() else {
                return Err(Error::OrphanRequirement(line.to_string()));
            };

            let mut parsed = RequirementLines::default();
            parsed.push_line(line, options)?;
            optional
                .section_mut(name)
                .requires
                .append(&mut parsed.requires);
            optional
                .dependency_links
                .append(&mut parsed.dependency_links);
        }

        Ok(optional)
    }

    /// Read an optional requirements file. A missing file yields no sections.
    pub fn read(path: &Path, options: &RenderOptions) -> Result<Self> {
        let content = read_optional(path)?;
        let optional = Self::parse(&content, options)?;
        tracing::debug!(
            path = %path.display(),
            sections = optional.sections.len(),
            links = optional.dependency_links.len(),
            "parsed optional requirements file"
        );
        Ok(optional)
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    requires: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}

fn is_section_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_section_header<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    delimited('[', take_while(1.., is_section_char), ']').parse_next(input)
}
