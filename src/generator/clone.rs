use std::fs;
use std::io::ErrorKind;
use std::path::{self, Path};

use ignore::WalkBuilder;

use super::GeneratorError;

/// How [`copy_tree`] treats the destination and dot-files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Write into an existing destination, replacing files of the same name.
    pub overwrite: bool,
    /// Leave dot-prefixed files and directories behind.
    pub exclude_hidden: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            exclude_hidden: true,
        }
    }
}

/// Recursively copy `src` into `dest`, returning the number of files written.
pub fn copy_tree(src: &Path, dest: &Path, options: CopyOptions) -> Result<usize, GeneratorError> {
    let src_abs = path::absolute(src).map_err(GeneratorError::io(src))?;
    let dest_abs = path::absolute(dest).map_err(GeneratorError::io(dest))?;
    if dest_abs.starts_with(&src_abs) {
        return Err(GeneratorError::CopyIntoSource {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }

    if options.overwrite {
        fs::create_dir_all(dest).map_err(GeneratorError::io(dest))?;
    } else {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(GeneratorError::io(parent))?;
        }
        // Creating the directory is the existence check.
        fs::create_dir(dest).map_err(|source| match source.kind() {
            ErrorKind::AlreadyExists => GeneratorError::DestinationExists(dest.to_path_buf()),
            _ => GeneratorError::Io {
                path: dest.to_path_buf(),
                source,
            },
        })?;
    }

    let walker = WalkBuilder::new(src)
        .hidden(options.exclude_hidden)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(true)
        .build();

    let mut copied = 0;
    for entry in walker {
        let entry = entry.map_err(|source| GeneratorError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(rel);
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(GeneratorError::io(&target))?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(GeneratorError::io(parent))?;
            }
            fs::copy(entry.path(), &target).map_err(GeneratorError::io(&target))?;
            tracing::debug!("copied {}", target.display());
            copied += 1;
        }
    }

    Ok(copied)
}

/// Clone a template directory to a destination that must not exist yet.
pub fn clone_template(template: &Path, destination: &Path) -> Result<(), GeneratorError> {
    if !template.is_dir() {
        return Err(GeneratorError::TemplateMissing(template.to_path_buf()));
    }

    let copied = copy_tree(template, destination, CopyOptions::default())?;
    tracing::info!(
        "cloned template {} into {} ({copied} files)",
        template.display(),
        destination.display()
    );
    Ok(())
}
