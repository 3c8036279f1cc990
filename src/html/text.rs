//! Text escaping for generated HTML.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for matching URLs in escaped text (`&amp;` is the only entity a URL keeps)
    static ref RE_URL: Regex = Regex::new(r"https?://(?:[^\s<>()&]|&amp;)+").unwrap();

    /// Regex for matching email addresses
    static ref RE_EMAIL: Regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap();
}

/// Escape HTML special characters.
///
/// Replaces &, <, >, ", and ' with their HTML entity equivalents.
///
/// # Examples
///
/// ```
/// # use snapguide::html::escape_html;
/// let escaped = escape_html("AT&T <Company>");
/// assert_eq!(escaped, "AT&amp;T &lt;Company&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape text and turn URLs and email addresses into links.
///
/// Links open in a new tab since the module is usually viewed offline.
///
/// # Examples
///
/// ```
/// # use snapguide::html::linkify;
/// let linked = linkify("See https://example.com or mail help@example.com");
/// assert!(linked.contains("<a href=\"https://example.com\""));
/// assert!(linked.contains("<a href=\"mailto:help@example.com\">"));
/// ```
pub fn linkify(text: &str) -> String {
    let escaped = escape_html(text);

    let with_urls = RE_URL.replace_all(&escaped, |caps: &regex::Captures| {
        let url = &caps[0];
        format!(r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#, url, url)
    });

    // emails inside an already linked URL are left alone
    let mut out = String::with_capacity(with_urls.len());
    for (i, part) in with_urls.split("<a ").enumerate() {
        if i == 0 {
            out.push_str(&link_emails(part));
            continue;
        }
        out.push_str("<a ");
        match part.split_once("</a>") {
            Some((link, rest)) => {
                out.push_str(link);
                out.push_str("</a>");
                out.push_str(&link_emails(rest));
            },
            None => out.push_str(part),
        }
    }
    out
}

fn link_emails(text: &str) -> String {
    RE_EMAIL
        .replace_all(text, |caps: &regex::Captures| {
            let email = &caps[0];
            format!(r#"<a href="mailto:{}">{}</a>"#, email, email)
        })
        .to_string()
}

/// Paragraphs from free text: blank lines separate `<p>` elements, single
/// newlines become `<br>`.
pub fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", linkify(p).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("")
}

/// Escape a string for embedding inside a `<script>` JSON literal.
pub fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}

/// Slug for ids and `data-tag` attributes: lowercase alphanumerics and
/// single dashes.
pub fn slug(text: &str) -> String {
    let mut out = String::new();
    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Filter keys for step tags.
///
/// Tags that differ only in case or surrounding whitespace share a key;
/// every other pair of tags gets distinct keys, whatever characters they
/// contain. Keys are `tag-1`, `tag-2`, ... in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TagKeys {
    keys: IndexMap<String, String>,
}

impl TagKeys {
    /// Assign keys to `tags` in order. Blank tags get none.
    pub fn new<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keys = IndexMap::new();
        for tag in tags {
            let norm = normalize_tag(tag);
            if norm.is_empty() || keys.contains_key(&norm) {
                continue;
            }
            let key = format!("tag-{}", keys.len() + 1);
            keys.insert(norm, key);
        }
        Self { keys }
    }

    /// Key for a tag, `None` for blank or unknown tags.
    pub fn key(&self, tag: &str) -> Option<&str> {
        self.keys.get(&normalize_tag(tag)).map(String::as_str)
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// `href` value for a resource link; only `http`, `https` and `mailto`
/// URLs are kept.
pub fn safe_href(url: &str) -> Option<&str> {
    let url = url.trim();
    let scheme = url.split_once(':').map(|(s, _)| s.to_ascii_lowercase())?;
    match scheme.as_str() {
        "http" | "https" | "mailto" => Some(url),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Hello"), "Hello");
        assert_eq!(escape_html("AT&T"), "AT&amp;T");
        assert_eq!(escape_html("<div>"), "&lt;div&gt;");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("'apostrophe'"), "&#x27;apostrophe&#x27;");
    }

    #[test]
    fn test_linkify_escapes_first() {
        let out = linkify("<b>https://example.com/a</b>");
        assert!(out.starts_with("&lt;b&gt;"));
        assert!(out.contains("href=\"https://example.com/a\""));
    }

    #[test]
    fn test_email_in_url_not_double_linked() {
        let out = linkify("https://example.com/u/me@example.com");
        assert_eq!(out.matches("<a ").count(), 1);
        let out = linkify("write to a@b.io");
        assert!(out.contains("mailto:a@b.io"));
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(paragraphs("one\ntwo\n\nthree"), "<p>one<br>two</p><p>three</p>");
        assert_eq!(paragraphs("  "), "");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Getting Started!"), "getting-started");
        assert_eq!(slug("  a  b "), "a-b");
        assert_eq!(slug("---"), "");
    }

    #[test]
    fn test_tag_keys_do_not_collide() {
        let keys = TagKeys::new(["C++", "C#", "Setup", " setup ", "!!!", ""]);
        assert_eq!(keys.key("C++"), Some("tag-1"));
        assert_eq!(keys.key("C#"), Some("tag-2"));
        assert_eq!(keys.key("SETUP"), Some("tag-3"));
        assert_eq!(keys.key("!!!"), Some("tag-4"));
        assert_eq!(keys.key("  "), None);
        assert_eq!(keys.key("other"), None);
    }

    #[test]
    fn test_safe_href() {
        assert_eq!(safe_href(" https://example.com/a "), Some("https://example.com/a"));
        assert_eq!(safe_href("MAILTO:help@example.com"), Some("MAILTO:help@example.com"));
        assert_eq!(safe_href("javascript:alert(1)"), None);
        assert_eq!(safe_href("JavaScript:alert(1)"), None);
        assert_eq!(safe_href("data:text/html,hi"), None);
        assert_eq!(safe_href("docs/setup.html"), None);
    }

    #[test]
    fn test_script_json() {
        assert_eq!(escape_script_json(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }
}
