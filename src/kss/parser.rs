use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::TraverseOptions;
use super::markdown;
use super::section::{Modifier, Section, SourceLocation};

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*styleguide\s+(.+?)\s*$").expect("valid styleguide reference regex")
});
static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([.:][^\s]+)\s+-\s+(.*?)\s*$").expect("valid modifier regex")
});
static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("valid paragraph break regex"));
static FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(deprecated|experimental)\s*:").expect("valid flag regex")
});

/// A run of comment text and the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub line: usize,
    pub text: String,
}

/// Pull comment blocks out of a stylesheet. Consecutive `//` lines form one
/// block; `/* ... */` blocks are only read when `multiline` is set.
pub fn comment_blocks(source: &str, multiline: bool) -> Vec<CommentBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CommentBlock> = None;
    let mut in_multiline = false;

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();

        if in_multiline {
            let block = current.get_or_insert_with(|| CommentBlock {
                line: idx + 1,
                text: String::new(),
            });
            match trimmed.find("*/") {
                Some(end) => {
                    push_line(&mut block.text, strip_decoration(&trimmed[..end]));
                    in_multiline = false;
                    blocks.extend(current.take());
                }
                None => push_line(&mut block.text, strip_decoration(trimmed)),
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("//") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            let block = current.get_or_insert_with(|| CommentBlock {
                line: idx + 1,
                text: String::new(),
            });
            push_line(&mut block.text, rest);
            continue;
        }

        // Anything else ends a run of line comments.
        blocks.extend(current.take());

        if multiline && let Some(rest) = trimmed.strip_prefix("/*") {
            let mut block = CommentBlock {
                line: idx + 1,
                text: String::new(),
            };
            // Find the terminator before dropping `/**` decorations so `/**/`
            // closes on its own line.
            match rest.find("*/") {
                Some(end) => {
                    push_line(&mut block.text, rest[..end].trim_start_matches('*').trim());
                    blocks.push(block);
                }
                None => {
                    let rest = rest.trim_start_matches('*').trim();
                    if !rest.is_empty() {
                        push_line(&mut block.text, rest);
                    }
                    current = Some(block);
                    in_multiline = true;
                }
            }
        }
    }

    blocks.extend(current.take());
    blocks
        .into_iter()
        .map(|block| CommentBlock {
            line: block.line,
            text: block.text.trim_matches('\n').to_string(),
        })
        .filter(|block| !block.text.trim().is_empty())
        .collect()
}

fn push_line(text: &mut String, line: &str) {
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(line.trim_end());
}

fn strip_decoration(line: &str) -> &str {
    match line.strip_prefix('*') {
        Some(rest) if !rest.starts_with('/') => rest.strip_prefix(' ').unwrap_or(rest),
        _ => line,
    }
}

/// Parse one comment block into a section. Blocks without a `Styleguide`
/// reference line are ordinary comments and yield `None`.
pub fn parse_section(block: &CommentBlock, path: &Path, options: &TraverseOptions) -> Option<Section> {
    let mut reference = None;
    let mut body = Vec::new();

    for line in block.text.lines() {
        match REFERENCE_RE.captures(line) {
            Some(caps) if reference.is_none() => {
                reference = Some(caps[1].trim_end_matches('.').trim().to_string());
            }
            _ => body.push(line),
        }
    }

    let reference = reference.filter(|r| !r.is_empty())?;
    let body = body.join("\n");
    let mut paragraphs = PARAGRAPH_RE
        .split(body.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let header = paragraphs
        .next()
        .map(|p| p.lines().map(str::trim).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let mut section = Section {
        reference,
        header,
        source: Some(SourceLocation {
            path: path.to_path_buf(),
            line: block.line,
        }),
        ..Section::default()
    };

    let mut description = Vec::new();
    for paragraph in paragraphs {
        if options.markup
            && let Some(markup) = strip_label(paragraph, "markup")
        {
            section.markup = Some(markup.to_string());
            continue;
        }

        if let Some(weight) = strip_label(paragraph, "weight") {
            match weight.parse::<f64>() {
                Ok(weight) => section.weight = weight,
                Err(_) => tracing::debug!(
                    "ignoring weight {weight:?} in section {}",
                    section.reference
                ),
            }
            continue;
        }

        if let Some((name, value)) = custom_property(paragraph, &options.custom) {
            section.custom.insert(name, value);
            continue;
        }

        if let Some(modifiers) = modifier_list(paragraph) {
            section.modifiers.extend(modifiers);
            continue;
        }

        if let Some(caps) = FLAG_RE.captures(paragraph) {
            match caps[1].to_ascii_lowercase().as_str() {
                "deprecated" => section.deprecated = true,
                _ => section.experimental = true,
            }
        }
        description.push(paragraph);
    }

    let description = description.join("\n\n");
    section.description = if options.markdown {
        markdown::to_html(&description)
    } else {
        description
    };

    Some(section)
}

/// Text after `Label:` when the paragraph opens with that label.
fn strip_label<'a>(paragraph: &'a str, label: &str) -> Option<&'a str> {
    let (head, rest) = paragraph.split_once(':')?;
    if head.trim().eq_ignore_ascii_case(label) {
        Some(rest.trim())
    } else {
        None
    }
}

fn custom_property(paragraph: &str, custom: &[String]) -> Option<(String, String)> {
    custom.iter().find_map(|name| {
        strip_label(paragraph, name).map(|value| (name.clone(), value.to_string()))
    })
}

fn modifier_list(paragraph: &str) -> Option<Vec<Modifier>> {
    paragraph
        .lines()
        .map(|line| {
            MODIFIER_RE.captures(line).map(|caps| Modifier {
                name: caps[1].to_string(),
                description: caps[2].to_string(),
            })
        })
        .collect()
}

/// Parse every section found in one file's contents.
pub fn parse_source(source: &str, path: &Path, options: &TraverseOptions) -> Vec<Section> {
    comment_blocks(source, options.multiline)
        .iter()
        .filter_map(|block| parse_section(block, path, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TraverseOptions {
        TraverseOptions {
            multiline: true,
            markdown: true,
            markup: true,
            custom: vec!["Colors".to_string()],
            ..TraverseOptions::default()
        }
    }

    const BUTTONS: &str = r#"
// Buttons
//
// Your standard form button.
//
// :hover    - Highlights when hovering.
// .primary  - Use this class to indicate the primary action.
//
// Markup: <a class="button {$modifiers}">Button</a>
//
// Styleguide 2.1.3.
.button { color: red; }
"#;

    #[test]
    fn line_comments_form_one_block() {
        let blocks = comment_blocks(BUTTONS, false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].line, 2);
        assert!(blocks[0].text.starts_with("Buttons\n\nYour standard"));
    }

    #[test]
    fn multiline_blocks_need_the_option() {
        let css = "/* Title\n *\n * Styleguide 1\n */\n.a {}\n/* inline */";
        assert!(comment_blocks(css, false).is_empty());

        let blocks = comment_blocks(css, true);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "Title\n\nStyleguide 1");
        assert_eq!(blocks[1].text, "inline");
        assert_eq!(blocks[1].line, 6);
    }

    #[test]
    fn empty_block_comments_close_on_their_own_line() {
        for opener in ["/**/", "/***/", "/** */"] {
            let css = format!("{opener}\n.a {{}}\n\n// Buttons\n//\n// Styleguide 1\n.b {{}}\n");
            let blocks = comment_blocks(&css, true);
            assert_eq!(blocks.len(), 1, "{opener}");
            assert_eq!(blocks[0].line, 4);

            let sections = parse_source(&css, Path::new("a.css"), &options());
            assert_eq!(sections.len(), 1, "{opener}");
            assert_eq!(sections[0].header, "Buttons");
        }

        let blocks = comment_blocks("/** Title */\n", true);
        assert_eq!(blocks[0].text, "Title");
    }

    #[test]
    fn full_section() {
        let sections = parse_source(BUTTONS, Path::new("buttons.scss"), &options());
        assert_eq!(sections.len(), 1);

        let section = &sections[0];
        assert_eq!(section.reference, "2.1.3");
        assert_eq!(section.header, "Buttons");
        assert_eq!(
            section.description.trim(),
            "<p>Your standard form button.</p>"
        );
        assert_eq!(section.modifiers.len(), 2);
        assert_eq!(section.modifiers[0].name, ":hover");
        assert_eq!(section.modifiers[1].description, "Use this class to indicate the primary action.");
        assert_eq!(
            section.markup.as_deref(),
            Some(r#"<a class="button {$modifiers}">Button</a>"#)
        );
        assert_eq!(section.source.as_ref().unwrap().line, 2);
    }

    #[test]
    fn comments_without_reference_are_skipped() {
        let css = "// Just a note\n// about layout\n.a {}\n";
        assert!(parse_source(css, Path::new("a.css"), &options()).is_empty());

        let css = "// Helpers\n//\n// No styleguide reference.\n";
        assert!(parse_source(css, Path::new("a.css"), &options()).is_empty());
    }

    #[test]
    fn flags_weight_and_custom_properties() {
        let css = "/*\nForms\n\nDeprecated: use inputs instead.\n\nWeight: -2\n\nColors: red, blue\n\nStyleguide 4\n*/";
        let sections = parse_source(css, Path::new("forms.css"), &options());
        let section = &sections[0];
        assert!(section.deprecated);
        assert!(!section.experimental);
        assert_eq!(section.weight, -2.0);
        assert_eq!(section.custom.get("Colors").map(String::as_str), Some("red, blue"));
        assert!(section.description.contains("Deprecated: use inputs instead."));
    }

    #[test]
    fn markup_stays_in_description_when_disabled() {
        let mut opts = options();
        opts.markup = false;
        opts.markdown = false;
        let sections = parse_source(BUTTONS, Path::new("buttons.scss"), &opts);
        assert!(sections[0].markup.is_none());
        assert!(sections[0].description.contains("Markup: <a class="));
    }
}
