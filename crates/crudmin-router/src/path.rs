//! Path pattern matching.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// A compiled path pattern for matching URLs.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// The original pattern string.
    pattern: String,
    /// Compiled regex for matching.
    regex: Regex,
    /// Parameter names in order.
    param_names: Vec<String>,
    /// Whether the pattern ends with `/`.
    trailing_slash: bool,
}

impl PathPattern {
    /// Parses a path pattern string.
    ///
    /// Pattern syntax:
    /// - `/users` - Literal path
    /// - `/users/{id}` - Path with parameter (one segment)
    ///
    /// A pattern ending in `/` only matches paths ending in `/`, and a
    /// pattern without one only matches paths without one, so
    /// `/admin/{model}/` and `/admin/{model}/{pk}` never overlap.
    ///
    /// # Example
    ///
    /// ```
    /// use crudmin_router::PathPattern;
    ///
    /// let pattern = PathPattern::new("/admin/{model}/{pk}").unwrap();
    /// let params = pattern.match_path("/admin/widget/42").unwrap();
    /// assert_eq!(params.get("model"), Some("widget"));
    /// assert_eq!(params.get("pk"), Some("42"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self> {
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");
        let trailing_slash = pattern.ends_with('/');

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            regex_str.push('/');

            if let Some(param) = part.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                param_names.push(param.to_string());
                regex_str.push_str("([^/]+)");
            } else {
                regex_str.push_str(&regex::escape(part));
            }
        }

        if trailing_slash {
            regex_str.push('/');
        }
        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|source| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            param_names,
            trailing_slash,
        })
    }

    /// Attempts to match a path against this pattern.
    ///
    /// Returns extracted parameters if the path matches.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                params.insert(name.clone(), crate::form::percent_decode(value.as_str()));
            }
        }

        Some(params)
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the parameter names.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns true if the pattern requires a trailing slash.
    pub const fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }
}
