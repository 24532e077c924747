//! Markdown rendering for portfolio, blog and page bodies.

use comrak::{Options, markdown_to_html};

/// Render markdown to HTML with GitHub Flavored Markdown support.
///
/// Raw HTML in the source is escaped. Bodies are written in the dashboard,
/// and the guard is the only thing between a stolen session and the public
/// site.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    options.render.r#unsafe = false;

    markdown_to_html(content, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_gfm_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_strikethrough_and_autolink() {
        let html = render_markdown("~~old~~ see https://forgepilot.io");
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("href=\"https://forgepilot.io\""));
    }

    #[test]
    fn test_raw_html_is_not_passed_through() {
        let html = render_markdown("<script>alert(1)</script>\n\nhello");
        assert!(!html.contains("<script>"));
        assert!(html.contains("hello"));
    }
}
