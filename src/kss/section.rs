use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder replaced by a modifier's class name inside section markup.
pub const MODIFIER_PLACEHOLDER: &str = "{$modifiers}";

/// One documented block of a style guide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub reference: String,
    pub header: String,
    /// Description, already rendered to HTML when markdown is enabled.
    pub description: String,
    pub modifiers: Vec<Modifier>,
    pub markup: Option<String>,
    pub deprecated: bool,
    pub experimental: bool,
    pub weight: f64,
    pub custom: BTreeMap<String, String>,
    pub source: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub name: String,
    pub description: String,
}

impl Section {
    /// Number of segments in the reference: `2.1.3` has depth 3.
    pub fn depth(&self) -> usize {
        reference_segments(&self.reference).len()
    }

    /// First segment of the reference, which names the page a section lives on.
    pub fn root(&self) -> &str {
        reference_segments(&self.reference)
            .first()
            .copied()
            .unwrap_or_default()
    }

    /// Whether `self` is `ancestor` or nested beneath it.
    pub fn is_within(&self, ancestor: &str) -> bool {
        let ours = reference_segments(&self.reference);
        let theirs = reference_segments(ancestor);
        !theirs.is_empty() && ours.len() >= theirs.len() && ours[..theirs.len()] == theirs[..]
    }

    /// Markup with the modifier placeholder removed.
    pub fn default_markup(&self) -> Option<String> {
        self.markup
            .as_ref()
            .map(|markup| markup.replace(MODIFIER_PLACEHOLDER, ""))
    }

    /// Anchor-safe form of the reference (`2.1.3` -> `2-1-3`).
    pub fn anchor(&self) -> String {
        reference_segments(&self.reference).join("-")
    }
}

impl Modifier {
    /// CSS class the modifier applies: `.primary` -> `primary`,
    /// `:hover` -> `pseudo-class-hover`.
    pub fn class_name(&self) -> String {
        let name = self.name.trim();
        if let Some(pseudo) = name.strip_prefix(':') {
            return format!("pseudo-class-{}", pseudo.replace(':', "-"));
        }

        name.split('.')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Section markup rendered with this modifier's class.
    pub fn markup(&self, section: &Section) -> Option<String> {
        section
            .markup
            .as_ref()
            .map(|markup| markup.replace(MODIFIER_PLACEHOLDER, &self.class_name()))
    }
}

pub fn reference_segments(reference: &str) -> Vec<&str> {
    reference
        .trim()
        .trim_end_matches('.')
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Compare references segment by segment, numerically where both segments are
/// numbers, so that `2.10` sorts after `2.9`.
pub fn compare_references(a: &str, b: &str) -> Ordering {
    let left = reference_segments(a);
    let right = reference_segments(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => l.to_lowercase().cmp(&r.to_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}
