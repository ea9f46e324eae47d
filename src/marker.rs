//! The HTML comment that ties a tracking issue to its feature.
//!
//! Every generated body ends with `<!-- web-features:<identity> -->`. The
//! comment is invisible on GitHub but survives edits, so it is the join key
//! between tracker and catalog.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct Marker {
    prefix: String,
    pattern: Regex,
}

impl Marker {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"<!--\s*{}:([a-z0-9-]+)\s*-->",
            regex::escape(prefix)
        ))?;
        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    /// The marker comment for `id`.
    pub fn render(&self, id: &str) -> String {
        format!("<!-- {}:{} -->", self.prefix, id)
    }

    /// Every identity marked in `text`, in order of appearance.
    pub fn extract_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect()
    }

    /// The first identity marked in `text`.
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}
