//! Markdown rendering for product descriptions.
//!
//! Product descriptions are authored in Markdown through the admin dashboard
//! and rendered here with comrak. Raw HTML in the source is not passed
//! through (comrak's default), since descriptions are admin-authored but
//! still displayed to every visitor.

use comrak::Options;

/// Render Markdown to HTML.
#[must_use]
pub fn render(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;

    comrak::markdown_to_html(markdown, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Monstera\n\nA *big* leaf.");
        assert!(html.contains("<h1>Monstera</h1>"));
        assert!(html.contains("<em>big</em>"));
    }

    #[test]
    fn test_render_strips_raw_html() {
        let html = render("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_table_extension() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(""), "");
    }
}
