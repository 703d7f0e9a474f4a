use na_core::text::collapse_whitespace;
use na_core::{Error, Result};
use scraper::{Html, Selector};

/// Text content of an HTML fragment with whitespace collapsed.
pub fn clean_html(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<String>();
    collapse_whitespace(&text)
}

/// Joins the text of every `<p>` element of a page, one paragraph per block.
pub fn paragraph_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p")
        .map_err(|e| Error::Feed(format!("Invalid selector: {}", e)))?;

    Ok(document
        .select(&selector)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_strips_tags_and_entities() {
        let raw = "<p>Markets   <b>rallied</b>\n on Monday &amp; Tuesday.</p>";
        assert_eq!(clean_html(raw), "Markets rallied on Monday & Tuesday.");
    }

    #[test]
    fn test_clean_html_passes_plain_text() {
        assert_eq!(clean_html("  just text  "), "just text");
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_paragraph_text() {
        let html = r#"
            <html><body>
                <h1>Headline</h1>
                <p>First   paragraph.</p>
                <div class="ad"><span>Buy now</span></div>
                <p>Second <a href="/x">paragraph</a>.</p>
                <p>   </p>
            </body></html>
        "#;
        assert_eq!(paragraph_text(html).unwrap(), "First paragraph.\n\nSecond paragraph.");
    }
}
