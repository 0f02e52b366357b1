use std::path::Path;

use regex::Regex;

use super::KssError;

/// File-name filter applied while walking the source tree.
pub const DEFAULT_MASK: &str = "*.css|*.less|*.sass|*.scss|*.styl|*.stylus";

#[derive(Debug, Clone)]
pub struct Mask {
    raw: String,
    regex: Regex,
}

impl Mask {
    /// Build a mask from either a glob list (`*.css|*.less`) or a raw regex
    /// wrapped in slashes (`/\.css$/`).
    pub fn parse(mask: &str) -> Result<Self, KssError> {
        let pattern = match mask.strip_prefix('/').and_then(|m| m.strip_suffix('/')) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => glob_to_pattern(mask),
        };

        let regex = Regex::new(&pattern).map_err(|source| KssError::InvalidMask {
            mask: mask.to_string(),
            source,
        })?;

        Ok(Self {
            raw: mask.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.regex.is_match(name))
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self {
            raw: DEFAULT_MASK.to_string(),
            regex: Regex::new(&glob_to_pattern(DEFAULT_MASK)).expect("valid default mask"),
        }
    }
}

fn glob_to_pattern(mask: &str) -> String {
    let alternatives: Vec<String> = mask
        .split('|')
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .map(|alt| {
            alt.split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*")
        })
        .collect();

    format!("^(?:{})$", alternatives.join("|"))
}
