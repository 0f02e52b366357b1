use pulldown_cmark::{Options, Parser, html};

/// Render a KSS description paragraph set to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraphs_and_inline_code() {
        let html = to_html("Use `.button` for links.\n\nSecond paragraph.");
        assert!(html.contains("<p>Use <code>.button</code> for links.</p>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(to_html(""), "");
    }
}
