use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use super::section::{Section, compare_references, reference_segments};

/// The parsed style guide handed from the traversal to a generator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Styleguide {
    sections: Vec<Section>,
    pub files: Vec<PathBuf>,
    /// Markdown source of `homepage.md`, if one was found next to the sources.
    pub homepage: Option<String>,
}

impl Styleguide {
    /// Sections are ordered as a tree: a parent precedes its descendants,
    /// and siblings sort by `Weight:` then by reference.
    pub fn new(mut sections: Vec<Section>) -> Self {
        let weights: HashMap<String, f64> = sections
            .iter()
            .map(|section| (reference_segments(&section.reference).join("."), section.weight))
            .collect();
        sections.sort_by(|a, b| compare_in_tree(&a.reference, &b.reference, &weights));

        Self {
            sections,
            files: Vec::new(),
            homepage: None,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Exact lookup by reference; `2.1` and `2.1.` are the same reference.
    pub fn section(&self, reference: &str) -> Option<&Section> {
        let wanted = reference_segments(reference);
        self.sections
            .iter()
            .find(|section| reference_segments(&section.reference) == wanted)
    }

    /// Sections below a wildcard query. `2.*` and `2.x` return every section
    /// nested under `2` (but not `2` itself); a query without a wildcard
    /// behaves like [`Styleguide::section`].
    pub fn sections_matching(&self, query: &str) -> Vec<&Section> {
        let query = query.trim();
        let parent = query
            .strip_suffix(".*")
            .or_else(|| query.strip_suffix(".x"));

        match parent {
            Some(parent) => {
                let depth = reference_segments(parent).len();
                self.sections
                    .iter()
                    .filter(|section| section.is_within(parent) && section.depth() > depth)
                    .collect()
            }
            None => self.section(query).into_iter().collect(),
        }
    }

    /// Distinct first-level references in display order.
    pub fn roots(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = Vec::new();
        for section in &self.sections {
            let root = section.root();
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Section that heads a first-level page, if one was documented.
    pub fn root_section(&self, root: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.depth() == 1 && section.root() == root)
    }
}

/// Compare two references level by level. At the first level where they part
/// ways, the weights of the two branches decide before the segments do.
fn compare_in_tree(a: &str, b: &str, weights: &HashMap<String, f64>) -> Ordering {
    let left = reference_segments(a);
    let right = reference_segments(b);
    let weight = |segments: &[&str]| weights.get(&segments.join(".")).copied().unwrap_or(0.0);

    for (depth, (l, r)) in left.iter().zip(&right).enumerate() {
        let ordering = weight(&left[..=depth])
            .total_cmp(&weight(&right[..=depth]))
            .then_with(|| compare_references(l, r));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}
