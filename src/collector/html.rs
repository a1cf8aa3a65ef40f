//! HTML helpers for title and favicon link extraction.

use reqwest::Url;
use scraper::{Html, Selector};

/// Fallback favicon path when a page declares no icon link.
pub const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

/// Text of the first `<title>` element, trimmed. Empty titles yield `None`.
pub fn page_title(body: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let document = Html::parse_document(body);
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// `href` of the first `<link>` whose `rel` contains the `icon` token.
///
/// Matches both `rel="icon"` and `rel="shortcut icon"`.
pub fn icon_href(body: &str) -> Option<String> {
    let selector = Selector::parse("link[rel][href]").ok()?;
    let document = Html::parse_document(body);
    document
        .select(&selector)
        .find(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("icon")))
        })
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Absolute favicon URL for an origin, given the page body if one was fetched.
pub fn favicon_url(origin: &Url, body: Option<&str>) -> Option<Url> {
    if let Some(href) = body.and_then(icon_href) {
        if let Ok(url) = origin.join(&href) {
            return Some(url);
        }
    }
    origin.join(DEFAULT_FAVICON_PATH).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_is_trimmed() {
        let body = "<html><head><title>\n  Acme KVM  \n</title></head></html>";
        assert_eq!(page_title(body).as_deref(), Some("Acme KVM"));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(page_title("<html><body>hi</body></html>"), None);
        assert_eq!(page_title("<title>   </title>"), None);
    }

    #[test]
    fn test_icon_href_variants() {
        let body = r#"<head><link rel="stylesheet" href="/s.css"><link rel="shortcut icon" href="/static/fav.png"></head>"#;
        assert_eq!(icon_href(body).as_deref(), Some("/static/fav.png"));
        let body = r#"<head><link rel="ICON" href="i.ico"></head>"#;
        assert_eq!(icon_href(body).as_deref(), Some("i.ico"));
        assert_eq!(icon_href("<head></head>"), None);
    }

    #[test]
    fn test_favicon_url_resolution() {
        let origin = Url::parse("http://10.0.0.5/").unwrap();
        let body = r#"<link rel="icon" href="img/icon.png">"#;
        assert_eq!(
            favicon_url(&origin, Some(body)).unwrap().as_str(),
            "http://10.0.0.5/img/icon.png"
        );
        assert_eq!(
            favicon_url(&origin, None).unwrap().as_str(),
            "http://10.0.0.5/favicon.ico"
        );
    }
}
