use std::sync::LazyLock;

use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static SYNTECT_THEME: LazyLock<SyntectTheme> = LazyLock::new(|| {
    let themes = ThemeSet::load_defaults();
    themes
        .themes
        .get("InspiredGitHub")
        .cloned()
        .or_else(|| themes.themes.values().next().cloned())
        .expect("at least one syntect theme")
});

/// Highlighted `<pre>` block for an HTML markup example.
pub fn markup_source(markup: &str) -> String {
    let syntax = SYNTAX_SET
        .find_syntax_by_extension("html")
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

    match highlighted_html_for_string(markup, &SYNTAX_SET, syntax, &SYNTECT_THEME) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!("markup highlighting failed: {err}");
            format!(
                "<pre><code>{}</code></pre>",
                html_escape::encode_text(markup)
            )
        }
    }
}
