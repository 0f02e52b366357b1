use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::kss::{Section, Styleguide, markdown};
use crate::model::option::OptionSpec;

use super::highlight;
use super::{API, CopyOptions, Generator, GeneratorBase, GeneratorError, copy_tree};

const BUILTIN_INDEX: &str = include_str!("../../templates/default/index.html");
const BUILTIN_CSS: &str = include_str!("../../templates/default/public/kss.css");
const DEFAULT_TITLE: &str = "KSS Style Guide";

/// Renders a style guide as static HTML: an `index.html` front page plus one
/// `section-<n>.html` page per top-level section.
#[derive(Debug)]
pub struct HtmlGenerator {
    base: GeneratorBase,
    written: Vec<PathBuf>,
}

impl Default for HtmlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlGenerator {
    pub fn new() -> Self {
        Self::with_base(GeneratorBase::new(Some(API), Self::declared_options()))
    }

    /// Build around a prepared base, e.g. one with a custom traversal.
    pub fn with_base(base: GeneratorBase) -> Self {
        Self {
            base,
            written: Vec::new(),
        }
    }

    pub fn declared_options() -> BTreeMap<String, OptionSpec> {
        BTreeMap::from([
            (
                "title".to_string(),
                OptionSpec::value("Title of the style guide").default_value(DEFAULT_TITLE),
            ),
            (
                "css".to_string(),
                OptionSpec::value("URL of a stylesheet to include").multiple(),
            ),
            (
                "js".to_string(),
                OptionSpec::value("URL of a script to include").multiple(),
            ),
        ])
    }

    /// Pages written by the last `generate` call.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_page(&mut self, path: PathBuf, html: &str) -> Result<(), GeneratorError> {
        fs::write(&path, html).map_err(GeneratorError::io(&path))?;
        tracing::info!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl Generator for HtmlGenerator {
    fn base(&self) -> &GeneratorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GeneratorBase {
        &mut self.base
    }

    fn generate(&mut self, styleguide: &Styleguide) -> Result<(), GeneratorError> {
        let config = self.base.require_config()?;
        let destination = config.destination.clone();
        let template = config.template.clone();
        let page = PageTemplate {
            title: config
                .generator_str("title")
                .unwrap_or(DEFAULT_TITLE)
                .to_string(),
            css: config.generator_list("css"),
            js: config.generator_list("js"),
            layout: load_layout(template.as_deref())?,
        };

        self.written.clear();
        fs::create_dir_all(&destination).map_err(GeneratorError::io(&destination))?;
        publish_assets(template.as_deref(), &destination)?;

        let pages = root_pages(styleguide);
        let menu = render_menu(styleguide, &pages);

        let home = match styleguide.homepage.as_deref() {
            Some(homepage) => markdown::to_html(homepage),
            None => "<p>Add a <code>homepage.md</code> next to your stylesheets to fill this page.</p>"
                .to_string(),
        };
        let index = page.render(&menu, &home);
        self.write_page(destination.join("index.html"), &index)?;

        for (root, name) in &pages {
            let content = render_root(styleguide, root);
            let html = page.render(&menu, &content);
            self.write_page(destination.join(name), &html)?;
        }

        tracing::info!(
            "style guide written to {} ({} pages)",
            destination.display(),
            self.written.len()
        );
        Ok(())
    }
}

struct PageTemplate {
    title: String,
    css: Vec<String>,
    js: Vec<String>,
    layout: String,
}

impl PageTemplate {
    fn render(&self, menu: &str, content: &str) -> String {
        let styles: String = self
            .css
            .iter()
            .map(|href| {
                format!(
                    r#"<link rel="stylesheet" href="{}">"#,
                    encode_double_quoted_attribute(href)
                )
            })
            .collect::<Vec<_>>()
            .join("\n  ");
        let scripts: String = self
            .js
            .iter()
            .map(|src| {
                format!(
                    r#"<script src="{}"></script>"#,
                    encode_double_quoted_attribute(src)
                )
            })
            .collect::<Vec<_>>()
            .join("\n  ");

        // Content goes last so placeholders inside rendered markup stay put.
        self.layout
            .replace("{{title}}", &encode_text(&self.title))
            .replace("{{styles}}", &styles)
            .replace("{{scripts}}", &scripts)
            .replace("{{menu}}", menu)
            .replace("{{content}}", content)
    }
}

fn load_layout(template: Option<&Path>) -> Result<String, GeneratorError> {
    let Some(template) = template else {
        return Ok(BUILTIN_INDEX.to_string());
    };

    let index = template.join("index.html");
    if index.is_file() {
        fs::read_to_string(&index).map_err(GeneratorError::io(&index))
    } else {
        tracing::warn!(
            "{} not found, using the built-in layout",
            index.display()
        );
        Ok(BUILTIN_INDEX.to_string())
    }
}

fn publish_assets(template: Option<&Path>, destination: &Path) -> Result<(), GeneratorError> {
    let public = destination.join("public");
    let template_public = template.map(|t| t.join("public")).filter(|p| p.is_dir());

    match template_public {
        Some(assets) => {
            copy_tree(
                &assets,
                &public,
                CopyOptions {
                    overwrite: true,
                    exclude_hidden: true,
                },
            )?;
        }
        None => {
            fs::create_dir_all(&public).map_err(GeneratorError::io(&public))?;
            let css = public.join("kss.css");
            fs::write(&css, BUILTIN_CSS).map_err(GeneratorError::io(&css))?;
        }
    }
    Ok(())
}

/// File name of the page holding everything under `root`.
pub fn page_name(root: &str) -> String {
    let slug: String = root
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("section-{slug}.html")
}

/// Each first-level reference paired with its page. Roots whose slugs
/// collide get a numeric suffix, so no page overwrites another.
fn root_pages(styleguide: &Styleguide) -> Vec<(&str, String)> {
    let mut pages: Vec<(&str, String)> = Vec::new();
    for root in styleguide.roots() {
        let mut name = page_name(root);
        let stem = name.trim_end_matches(".html").to_string();
        let mut n = 2;
        while pages.iter().any(|(_, taken)| *taken == name) {
            name = format!("{stem}-{n}.html");
            n += 1;
        }
        pages.push((root, name));
    }
    pages
}

fn render_menu(styleguide: &Styleguide, pages: &[(&str, String)]) -> String {
    let mut menu = String::from("<ul class=\"kss-menu\">\n");
    menu.push_str("  <li><a href=\"index.html\">Overview</a></li>\n");
    for (root, name) in pages {
        let root = *root;
        let label = styleguide
            .root_section(root)
            .map(|s| s.header.as_str())
            .filter(|header| !header.is_empty())
            .unwrap_or(root);
        let _ = writeln!(
            menu,
            "  <li><a href=\"{}\">{}. {}</a></li>",
            name,
            encode_text(root),
            encode_text(label)
        );
    }
    menu.push_str("</ul>");
    menu
}

fn render_root(styleguide: &Styleguide, root: &str) -> String {
    styleguide
        .sections()
        .iter()
        .filter(|section| section.is_within(root))
        .map(render_section)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_section(section: &Section) -> String {
    let mut out = String::new();
    let level = section.depth().clamp(1, 5) + 1;
    let _ = writeln!(
        out,
        "<section class=\"kss-section\" id=\"kssref-{}\">",
        section.anchor()
    );
    let _ = write!(
        out,
        "<h{level}><span class=\"kss-ref\">{}</span> {}",
        encode_text(&section.reference),
        encode_text(&section.header)
    );
    if section.deprecated {
        out.push_str("<span class=\"kss-flag\">Deprecated</span>");
    }
    if section.experimental {
        out.push_str("<span class=\"kss-flag\">Experimental</span>");
    }
    let _ = writeln!(out, "</h{level}>");

    if !section.description.is_empty() {
        let _ = writeln!(out, "<div class=\"kss-description\">{}</div>", section.description);
    }

    if !section.custom.is_empty() {
        out.push_str("<dl class=\"kss-custom\">\n");
        for (name, value) in &section.custom {
            let _ = writeln!(
                out,
                "<dt>{}</dt><dd>{}</dd>",
                encode_text(name),
                encode_text(value)
            );
        }
        out.push_str("</dl>\n");
    }

    if !section.modifiers.is_empty() {
        out.push_str("<ul class=\"kss-modifiers\">\n");
        for modifier in &section.modifiers {
            let _ = writeln!(
                out,
                "<li><code>{}</code> {}</li>",
                encode_text(&modifier.name),
                encode_text(&modifier.description)
            );
        }
        out.push_str("</ul>\n");
    }

    if let Some(markup) = section.default_markup() {
        let _ = writeln!(
            out,
            "<div class=\"kss-example\"><div class=\"kss-example-label\">Default styling</div>{markup}</div>"
        );
        for modifier in &section.modifiers {
            if let Some(example) = modifier.markup(section) {
                let _ = writeln!(
                    out,
                    "<div class=\"kss-example\"><div class=\"kss-example-label\">{}</div>{example}</div>",
                    encode_text(&modifier.name)
                );
            }
        }
        if let Some(raw) = &section.markup {
            out.push_str(&highlight::markup_source(raw));
            out.push('\n');
        }
    }

    if let Some(source) = &section.source {
        let file = source
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<p class=\"kss-source\">Source: <code>{}</code>, line {}</p>",
            encode_text(&file),
            source.line
        );
    }

    out.push_str("</section>");
    out
}
