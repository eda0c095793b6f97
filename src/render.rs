use std::fmt;

use crate::requirement::{Requirement, UrlSource, VersionSpec};

/// Controls which parts of a [`Requirement`] end up in its rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render `[extra1, extra2]`.
    pub include_extras: bool,
    /// Render version clauses.
    pub include_specs: bool,
    /// Render `; marker`.
    pub include_markers: bool,
    /// Render URL requirements as `<uri>#egg=<name>...` instead of the bare name.
    pub include_uri: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            include_extras: true,
            include_specs: true,
            include_markers: true,
            include_uri: false,
        }
    }
}

impl Requirement {
    /// Render the canonical requirement string.
    ///
    /// Version clauses are written sorted by operator text, then version text.
    ///
    /// # Examples
    ///
    /// ```
    /// use setup_metadata::{RenderOptions, Requirement};
    ///
    /// let req = Requirement::parse("req8[opt8b,opt8a]>=1.0,<2").unwrap();
    /// assert_eq!(req.render(&RenderOptions::default()), "req8[opt8a, opt8b] < 2, >= 1.0");
    ///
    /// let options = RenderOptions { include_specs: false, ..RenderOptions::default() };
    /// assert_eq!(req.render(&options), "req8[opt8a, opt8b]");
    /// ```
    pub fn render(&self, options: &RenderOptions) -> String {
        let mut out = match &self.source {
            Some(source) if options.include_uri => url_locator(source, &self.name),
            _ => {
                let mut head = self.name.clone();
                if options.include_extras && !self.extras.is_empty() {
                    let extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
                    head.push('[');
                    head.push_str(&extras.join(", "));
                    head.push(']');
                }
                head
            }
        };

        if options.include_specs && !self.specs.is_empty() {
            let mut specs: Vec<&VersionSpec> = self.specs.iter().collect();
            specs.sort_by(|a, b| (a.op.as_str(), &a.version).cmp(&(b.op.as_str(), &b.version)));
            let specs: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
            out.push(' ');
            out.push_str(&specs.join(", "));
        }

        out.truncate(out.trim_end().len());
        if options.include_markers {
            if let Some(marker) = &self.marker {
                out.push_str("; ");
                out.push_str(marker);
            }
        }
        out
    }

    /// The dependency link of a URL requirement, carrying the egg exactly as
    /// written (version included, extras dropped).
    ///
    /// ```
    /// use setup_metadata::Requirement;
    ///
    /// let req = Requirement::parse(
    ///     "git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2[option10]",
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     req.dependency_link().as_deref(),
    ///     Some("git+https://github.com/opt/req10.git@branch#egg=req10-10.1.2"),
    /// );
    /// assert_eq!(Requirement::parse("req1").unwrap().dependency_link(), None);
    /// ```
    pub fn dependency_link(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|source| url_locator(source, &source.egg))
    }
}

/// `<uri>[@<revision>]#egg=<egg>[&subdirectory=<dir>][&<alg>=<digest>]`
fn url_locator(source: &UrlSource, egg: &str) -> String {
    let mut out = source.uri.clone();
    if let Some(revision) = &source.revision {
        out.push('@');
        out.push_str(revision);
    }
    out.push_str("#egg=");
    out.push_str(egg);
    if let Some(subdirectory) = &source.subdirectory {
        out.push_str("&subdirectory=");
        out.push_str(subdirectory);
    }
    if let Some(hash) = &source.hash {
        out.push('&');
        out.push_str(&hash.algorithm);
        out.push('=');
        out.push_str(&hash.digest);
    }
    out
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.render(&RenderOptions::default()))
    }
}
