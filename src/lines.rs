use std::path::Path;

use crate::error::Result;
use crate::fs::read_optional;
use crate::render::RenderOptions;
use crate::requirement::Requirement;

/// Rendered requirements and dependency links of a plain requirements file,
/// in file order with duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementLines {
    /// Rendered requirement strings.
    pub requires: Vec<String>,
    /// Dependency links of URL requirements.
    pub dependency_links: Vec<String>,
}

impl RequirementLines {
    /// Parse and render one requirement line.
    pub(crate) fn push_line(&mut self, line: &str, options: &RenderOptions) -> Result<()> {
        let req = Requirement::parse(line)?;
        self.requires.push(req.render(options));
        if let Some(link) = req.dependency_link() {
            self.dependency_links.push(link);
        }
        Ok(())
    }
}

/// Parse requirement lines, skipping blank lines and `#` comment lines.
///
/// # Examples
///
/// ```
/// use setup_metadata::{parse_requirement_lines, RenderOptions};
///
/// let parsed = parse_requirement_lines(
///     ["req1", "# comment", "", "req3 >= 1.0"],
///     &RenderOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(parsed.requires, vec!["req1", "req3 >= 1.0"]);
/// assert!(parsed.dependency_links.is_empty());
/// ```
pub fn parse_requirement_lines<'a, I>(lines: I, options: &RenderOptions) -> Result<RequirementLines>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = RequirementLines::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        parsed.push_line(line, options)?;
    }
    Ok(parsed)
}

/// Parse a `requirements.txt`-style file. A missing file yields no requirements.
pub fn parse_requirements_file(path: &Path, options: &RenderOptions) -> Result<RequirementLines> {
    let content = read_optional(path)?;
    let parsed = parse_requirement_lines(content.lines(), options)?;
    tracing::debug!(
        path = %path.display(),
        requires = parsed.requires.len(),
        links = parsed.dependency_links.len(),
        "parsed requirements file"
    );
    Ok(parsed)
}
