use std::collections::BTreeSet;
use std::fmt;

use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::{Error, Result};

/// Hash algorithms accepted in the fragment of a URL requirement.
const HASH_ALGORITHMS: &[&str] = &["md5", "sha1", "sha224", "sha256", "sha384", "sha512"];

/// Version comparison operator of a [`VersionSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `~=`
    Compatible,
    /// `===`
    ArbitraryEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
}

impl Operator {
    /// The operator as written in a requirement line.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Compatible => "~=",
            Operator::ArbitraryEqual => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<operator> <version>` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    /// Comparison operator.
    pub op: Operator,
    /// Version text, kept verbatim.
    pub version: String,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.op, self.version)
    }
}

/// A `<algorithm>=<digest>` pair from a URL fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHash {
    /// Algorithm name, e.g. `sha256`.
    pub algorithm: String,
    /// Hex digest as written.
    pub digest: String,
}

/// Direct source of a URL requirement such as
/// `git+https://host/repo.git@branch#egg=name-1.0&subdirectory=pkg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlSource {
    /// The URL without revision and fragment.
    pub uri: String,
    /// VCS revision following the last `@` of the path.
    pub revision: Option<String>,
    /// The egg fragment as written, without extras (e.g. `name-1.0`).
    pub egg: String,
    /// Version hint carried by the egg fragment.
    pub version: String,
    /// `subdirectory` fragment parameter.
    pub subdirectory: Option<String>,
    /// Hash fragment parameter.
    pub hash: Option<FileHash>,
}

/// A parsed requirement line.
///
/// Covers plain declarations (`name[extras] specs; marker`) and URL
/// declarations whose name comes from an `#egg=` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Distribution name, matching `[A-Za-z0-9_]+`.
    pub name: String,
    /// Requested extras.
    pub extras: BTreeSet<String>,
    /// Version clauses in input order; rendering sorts them.
    pub specs: Vec<VersionSpec>,
    /// Raw environment marker following `;`.
    pub marker: Option<String>,
    /// Direct URL source, if any.
    pub source: Option<UrlSource>,
}

impl Requirement {
    /// Parse one non-blank, non-comment requirement line.
    ///
    /// # Examples
    ///
    /// ```
    /// use setup_metadata::Requirement;
    ///
    /// let req = Requirement::parse("req3 >= 1.0").unwrap();
    /// assert_eq!(req.name, "req3");
    /// assert_eq!(req.specs.len(), 1);
    ///
    /// let req = Requirement::parse(
    ///     "git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2[option10] #comment",
    /// )
    /// .unwrap();
    /// let source = req.source.unwrap();
    /// assert_eq!(source.revision.as_deref(), Some("branch"));
    /// assert_eq!(source.egg, "req10-10.1.2");
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        check_option(trimmed)?;

        let content =
            strip_comment(trimmed).ok_or_else(|| Error::UnparsableDependency(trimmed.to_string()))?;
        let (body, marker) = split_marker(content);
        let body = body.trim();

        let first = body.split_whitespace().next().unwrap_or_default();
        if is_local_path(first) {
            return Err(Error::UnsupportedOption("local file".to_string()));
        }

        let req = if first.contains("://") {
            parse_url_requirement(trimmed, body, marker)?
        } else {
            parse_named_requirement(trimmed, body, marker)?
        };
        tracing::trace!(name = %req.name, url = req.source.is_some(), "parsed requirement");
        Ok(req)
    }

    /// `true` when the requirement points at a direct URL source.
    pub fn has_link(&self) -> bool {
        self.source.is_some()
    }
}

/// Reject pip options, which are not dependency declarations.
fn check_option(line: &str) -> Result<()> {
    if !line.starts_with('-') {
        return Ok(());
    }
    let option = if line.starts_with("--") {
        line.split(|c: char| c.is_whitespace() || c == '=')
            .next()
            .unwrap_or(line)
    } else {
        line.get(..2).unwrap_or(line)
    };
    match option {
        "-e" | "--editable" => Err(Error::UnsupportedOption("editable".to_string())),
        _ => Err(Error::UnsupportedOption(option.to_string())),
    }
}

/// Remove a trailing comment.
///
/// On a URL line with an `#egg=` fragment the comment starts at the first `#`
/// found at least five characters past the fragment marker. Returns `None`
/// when a `#` precedes `#egg=`, i.e. the fragment sits inside a comment.
/// Without a URL before the marker, `#egg=` is ordinary comment text.
fn strip_comment(line: &str) -> Option<&str> {
    match line.find("#egg=").filter(|&egg| line[..egg].contains("://")) {
        Some(egg) => {
            if line.find('#').is_some_and(|first| first < egg) {
                return None;
            }
            let from = egg + 5;
            Some(line[from..].find('#').map_or(line, |i| &line[..from + i]))
        }
        None => Some(line.find('#').map_or(line, |i| &line[..i])),
    }
}

/// Split `body; marker` at the first `;`.
fn split_marker(content: &str) -> (&str, Option<String>) {
    match content.split_once(';') {
        Some((body, marker)) => {
            let marker = marker.trim();
            (body, (!marker.is_empty()).then(|| marker.to_string()))
        }
        None => (content, None),
    }
}

fn is_local_path(token: &str) -> bool {
    if token.starts_with("file:") {
        return true;
    }
    if token.contains("://") {
        return false;
    }
    token.starts_with('.') || token.starts_with('~') || token.contains('/') || token.contains('\\')
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_named_requirement(line: &str, body: &str, marker: Option<String>) -> Result<Requirement> {
    let (name, extras, specs) = parse_named_body
        .parse(body)
        .map_err(|_| Error::UnparsableDependency(line.to_string()))?;
    if !is_valid_name(name) {
        return Err(Error::UnparsableDependency(line.to_string()));
    }
    Ok(Requirement {
        name: name.to_string(),
        extras: extras.into_iter().collect(),
        specs,
        marker,
        source: None,
    })
}

fn parse_url_requirement(line: &str, body: &str, marker: Option<String>) -> Result<Requirement> {
    let (token, rest) = split_url_token(body);
    let (location, fragment) = token.split_once('#').unwrap_or((token, ""));
    let (uri, revision) = split_revision(location);

    let mut egg = None;
    let mut subdirectory = None;
    let mut hash = None;
    for pair in fragment.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "egg" => egg = Some(value),
            "subdirectory" => subdirectory = Some(value.to_string()),
            alg if HASH_ALGORITHMS.contains(&alg) => {
                hash = Some(FileHash {
                    algorithm: alg.to_string(),
                    digest: value.to_string(),
                })
            }
            other => tracing::trace!(key = other, "ignoring URL fragment parameter"),
        }
    }

    let egg = egg.ok_or_else(|| Error::MissingVersionHint(line.to_string()))?;
    let (egg, extras) = match egg.find('[') {
        Some(i) => {
            let extras = parse_extras
                .parse(&egg[i..])
                .map_err(|_| Error::UnparsableDependency(line.to_string()))?;
            (&egg[..i], extras)
        }
        None => (egg, Vec::new()),
    };

    let (name, version) = split_egg_version(egg);
    if !is_valid_name(name) {
        return Err(Error::UnparsableDependency(line.to_string()));
    }
    let version = version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingVersionHint(line.to_string()))?;

    let specs = parse_spec_list
        .parse(rest.trim())
        .map_err(|_| Error::UnparsableDependency(line.to_string()))?;

    Ok(Requirement {
        name: name.to_string(),
        extras: extras.into_iter().collect(),
        specs,
        marker,
        source: Some(UrlSource {
            uri: uri.to_string(),
            revision: revision.map(str::to_string),
            egg: egg.to_string(),
            version: version.to_string(),
            subdirectory,
            hash,
        }),
    })
}

/// Split off the URL token; whitespace inside an egg's `[extras]` does not end it.
fn split_url_token(body: &str) -> (&str, &str) {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => return (&body[..i], &body[i..]),
            _ => {}
        }
    }
    (body, "")
}

/// Split a `vcs+scheme://host/path@revision` location into URI and revision.
fn split_revision(location: &str) -> (&str, Option<&str>) {
    let Some(scheme_end) = location.find("://") else {
        return (location, None);
    };
    if !location[..scheme_end].contains('+') {
        return (location, None);
    }
    let authority = scheme_end + 3;
    let path_start = location[authority..]
        .find('/')
        .map_or(location.len(), |i| authority + i);
    match location[path_start..].rfind('@') {
        Some(i) if path_start + i + 1 < location.len() => (
            &location[..path_start + i],
            Some(&location[path_start + i + 1..]),
        ),
        _ => (location, None),
    }
}

/// Split `name-version` at the first `-` followed by a digit.
fn split_egg_version(egg: &str) -> (&str, Option<&str>) {
    egg.match_indices('-')
        .find(|(i, _)| egg[i + 1..].starts_with(|c: char| c.is_ascii_digit()))
        .map_or((egg, None), |(i, _)| (&egg[..i], Some(&egg[i + 1..])))
}

// Winnow parsers

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '_' | '-')
}

fn parse_operator(input: &mut &str) -> ModalResult<Operator> {
    alt((
        "===".value(Operator::ArbitraryEqual),
        "~=".value(Operator::Compatible),
        "==".value(Operator::Equal),
        "!=".value(Operator::NotEqual),
        "<=".value(Operator::LessEqual),
        ">=".value(Operator::GreaterEqual),
        "<".value(Operator::Less),
        ">".value(Operator::Greater),
    ))
    .parse_next(input)
}

fn parse_spec(input: &mut &str) -> ModalResult<VersionSpec> {
    (
        parse_operator,
        preceded(multispace0, take_while(1.., is_version_char)),
    )
        .map(|(op, version): (Operator, &str)| VersionSpec {
            op,
            version: version.to_string(),
        })
        .parse_next(input)
}

fn parse_specs(input: &mut &str) -> ModalResult<Vec<VersionSpec>> {
    separated(
        0..,
        preceded(multispace0, parse_spec),
        (multispace0, ','),
    )
    .parse_next(input)
}

/// Specs, optionally wrapped in parentheses: `>= 1.0, < 2` or `(>=1.0)`.
fn parse_spec_list(input: &mut &str) -> ModalResult<Vec<VersionSpec>> {
    let specs = alt((
        delimited(('(', multispace0), parse_specs, (multispace0, ')')),
        parse_specs,
    ))
    .parse_next(input)?;
    multispace0.parse_next(input)?;
    Ok(specs)
}

fn parse_extras(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(
        ('[', multispace0),
        separated(
            0..,
            take_while(1.., is_name_char).map(|s: &str| s.to_string()),
            (multispace0, ',', multispace0),
        ),
        (multispace0, ']'),
    )
    .parse_next(input)
}

fn parse_named_body<'s>(
    input: &mut &'s str,
) -> ModalResult<(&'s str, Vec<String>, Vec<VersionSpec>)> {
    let name = take_while(1.., is_name_char).parse_next(input)?;
    multispace0.parse_next(input)?;
    let extras = opt(parse_extras).parse_next(input)?.unwrap_or_default();
    multispace0.parse_next(input)?;
    let specs = parse_spec_list(input)?;
    Ok((name, extras, specs))
}
