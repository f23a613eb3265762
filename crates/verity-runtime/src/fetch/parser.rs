//! HTML-to-article extraction.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::FetchError;

/// Structured fields pulled out of a raw page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArticle {
    pub title: String,
    pub body_text: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub authors: Vec<String>,
    pub top_image: Option<String>,
}

/// Turns raw page content into article fields.
pub trait ArticleParser: Send + Sync {
    fn parse(&self, raw: &str, url: &str) -> Result<ParsedArticle, FetchError>;
}

lazy_static! {
    static ref TITLE_TAG: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref META_TAG: Regex = Regex::new(r"(?is)<meta\s[^>]*>").unwrap();
    static ref META_ATTR: Regex =
        Regex::new(r#"(?is)([a-z:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").unwrap();
    static ref SCRIPT_OR_STYLE: Regex =
        Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]+>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref ENTITY: Regex =
        Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]+);").unwrap();
}

/// Regex-based extractor for typical news pages.
///
/// Reads `<title>` (preferring `og:title`), the text of `<p>` elements,
/// `article:published_time`, `author` meta tags and `og:image`.
#[derive(Debug, Clone, Default)]
pub struct HtmlArticleParser;

impl HtmlArticleParser {
    pub fn new() -> Self {
        Self
    }
}

impl ArticleParser for HtmlArticleParser {
    fn parse(&self, raw: &str, url: &str) -> Result<ParsedArticle, FetchError> {
        let html = SCRIPT_OR_STYLE.replace_all(raw, " ");
        let meta = meta_tags(&html);

        let find_meta = |names: &[&str]| -> Option<String> {
            meta.iter()
                .find(|(key, _)| names.contains(&key.as_str()))
                .map(|(_, content)| content.clone())
                .filter(|content| !content.is_empty())
        };

        let title = find_meta(&["og:title"])
            .or_else(|| {
                TITLE_TAG
                    .captures(&html)
                    .map(|caps| clean_text(&caps[1]))
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_default();

        let body_text = PARAGRAPH
            .captures_iter(&html)
            .map(|caps| clean_text(&caps[1]))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if body_text.is_empty() {
            return Err(FetchError::Parse {
                url: url.to_string(),
                message: "no body text found".to_string(),
            });
        }

        let publish_date = find_meta(&["article:published_time", "pubdate", "date"])
            .and_then(|value| parse_date(&value));

        let mut authors: Vec<String> = meta
            .iter()
            .filter(|(key, _)| key == "author" || key == "article:author")
            .map(|(_, content)| content.clone())
            .filter(|a| !a.is_empty() && !a.starts_with("http"))
            .collect();
        authors.dedup();

        let top_image = find_meta(&["og:image"]);

        Ok(ParsedArticle {
            title,
            body_text,
            publish_date,
            authors,
            top_image,
        })
    }
}

/// `(name-or-property, content)` pairs of every meta tag, keys lowercased.
fn meta_tags(html: &str) -> Vec<(String, String)> {
    META_TAG
        .find_iter(html)
        .filter_map(|tag| {
            let mut key = None;
            let mut content = None;
            for caps in META_ATTR.captures_iter(tag.as_str()) {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match caps[1].to_lowercase().as_str() {
                    "name" | "property" | "itemprop" => key = Some(value.to_lowercase()),
                    "content" => content = Some(clean_text(value)),
                    _ => {}
                }
            }
            Some((key?, content?))
        })
        .collect()
}

fn clean_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, " ");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Decode named and numeric character references in one pass. Unknown or
/// invalid references are kept verbatim.
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let hex = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(name)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "nbsp" => ' ',
        "quot" => '"',
        "apos" => '\'',
        "rsquo" => '’',
        "lsquo" => '‘',
        "ldquo" => '“',
        "rdquo" => '”',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        _ => return None,
    })
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    let day = value.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
