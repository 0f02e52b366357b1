//! KSS comment traversal.
//!
//! Walks stylesheet sources, pulls out the documentation comments and builds a
//! [`Styleguide`]. Generators consume this through the [`Traversal`] trait so a
//! host that already has its sources in memory can swap in its own routine.

pub mod markdown;
pub mod mask;
pub mod parser;
pub mod section;
pub mod styleguide;

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

pub use mask::{DEFAULT_MASK, Mask};
pub use section::{Modifier, Section, SourceLocation};
pub use styleguide::Styleguide;

/// Name of the markdown file used as the style guide's front page.
pub const HOMEPAGE_FILE: &str = "homepage.md";

#[derive(Error, Debug)]
pub enum KssError {
    #[error("source path does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("invalid file mask '{mask}': {source}")]
    InvalidMask {
        mask: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },
}

/// Switches handed to a traversal.
#[derive(Debug, Clone, Default)]
pub struct TraverseOptions {
    /// Read `/* ... */` blocks as well as `//` runs.
    pub multiline: bool,
    /// Render descriptions from markdown to HTML.
    pub markdown: bool,
    /// Recognise `Markup:` paragraphs.
    pub markup: bool,
    /// File-name filter; `None` means [`DEFAULT_MASK`].
    pub mask: Option<String>,
    /// Extra `Name:` paragraphs to lift into [`Section::custom`].
    pub custom: Vec<String>,
}

/// Routine that turns source paths into a style guide.
pub trait Traversal: Send + Sync {
    fn traverse(
        &self,
        sources: &[PathBuf],
        options: &TraverseOptions,
    ) -> Result<Styleguide, KssError>;
}

/// File-system traversal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Kss;

impl Traversal for Kss {
    fn traverse(
        &self,
        sources: &[PathBuf],
        options: &TraverseOptions,
    ) -> Result<Styleguide, KssError> {
        let mask = match options.mask.as_deref() {
            Some(mask) if !mask.trim().is_empty() => Mask::parse(mask)?,
            _ => Mask::default(),
        };

        let mut files = Vec::new();
        let mut homepage = None;
        for source in sources {
            if !source.exists() {
                return Err(KssError::MissingSource(source.clone()));
            }

            for path in walk_files(source)? {
                if homepage.is_none()
                    && path.file_name().and_then(|n| n.to_str()) == Some(HOMEPAGE_FILE)
                {
                    homepage = Some(read(&path)?);
                    continue;
                }

                if mask.matches(&path) && !files.contains(&path) {
                    files.push(path);
                }
            }
        }

        let mut sections = Vec::new();
        for path in &files {
            let contents = read(path)?;
            let found = parser::parse_source(&contents, path, options);
            tracing::debug!("{}: {} sections", path.display(), found.len());
            sections.extend(found);
        }

        tracing::info!(
            "parsed {} sections from {} files (mask {})",
            sections.len(),
            files.len(),
            mask.as_str()
        );

        let mut styleguide = Styleguide::new(sections);
        styleguide.files = files;
        styleguide.homepage = homepage;
        Ok(styleguide)
    }
}

fn read(path: &Path) -> Result<String, KssError> {
    fs::read_to_string(path).map_err(|source| KssError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Regular files under `root` (or `root` itself), hidden entries skipped,
/// sorted by path.
fn walk_files(root: &Path) -> Result<Vec<PathBuf>, KssError> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry.map_err(|source| KssError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options() -> TraverseOptions {
        TraverseOptions {
            multiline: true,
            markdown: true,
            markup: true,
            mask: None,
            custom: Vec::new(),
        }
    }

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn traverses_nested_sources_with_default_mask() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a/buttons.scss", "// Buttons\n//\n// Styleguide 2\n");
        write(tmp.path(), "b/forms.css", "/* Forms\n\nStyleguide 1 */\n");
        write(tmp.path(), "b/notes.txt", "// Notes\n//\n// Styleguide 3\n");
        write(tmp.path(), ".hidden/skip.css", "// Hidden\n//\n// Styleguide 4\n");

        let guide = Kss
            .traverse(&[tmp.path().to_path_buf()], &options())
            .unwrap();

        let refs: Vec<&str> = guide
            .sections()
            .iter()
            .map(|s| s.reference.as_str())
            .collect();
        assert_eq!(refs, vec!["1", "2"]);
        assert_eq!(guide.files.len(), 2);
        assert!(guide.homepage.is_none());
    }

    #[test]
    fn mask_narrows_the_file_set() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "buttons.scss", "// Buttons\n//\n// Styleguide 2\n");
        write(tmp.path(), "forms.css", "// Forms\n//\n// Styleguide 1\n");

        let mut opts = options();
        opts.mask = Some("*.css".into());
        let guide = Kss.traverse(&[tmp.path().to_path_buf()], &opts).unwrap();
        assert_eq!(guide.sections().len(), 1);
        assert_eq!(guide.sections()[0].header, "Forms");
    }

    #[test]
    fn homepage_is_picked_up() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "homepage.md", "# Welcome\n");
        write(tmp.path(), "a.css", "");

        let guide = Kss
            .traverse(&[tmp.path().to_path_buf()], &options())
            .unwrap();
        assert_eq!(guide.homepage.as_deref(), Some("# Welcome\n"));
        assert!(guide.is_empty());
    }

    #[test]
    fn single_file_source_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.css", "// A\n//\n// Styleguide 1\n");
        let file = tmp.path().join("a.css");

        let guide = Kss
            .traverse(&[file.clone(), tmp.path().to_path_buf()], &options())
            .unwrap();
        assert_eq!(guide.files, vec![file]);
        assert_eq!(guide.sections().len(), 1);
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = Kss.traverse(&[missing.clone()], &options()).unwrap_err();
        assert!(matches!(err, KssError::MissingSource(path) if path == missing));
    }
}
