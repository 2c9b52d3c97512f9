//! Item identity derivation and score-text parsing.
//!
//! Recording identity prefers the id the page exposed, falls back to the
//! numeric segment of the detail url, and as a last resort synthesizes a
//! timestamp-based identifier so the record is still deduplicable within
//! the history store.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

use super::types::ItemStub;

lazy_static! {
    static ref PIN_ID_RE: Regex = Regex::new(r"/pin/(\d+)").expect("valid pin id pattern");
}

/// Extract the numeric pin id from a detail-page url, if present
#[must_use]
pub fn pin_id_from_url(url: &str) -> Option<String> {
    PIN_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Recording identity for a stub: explicit id, else url-derived, else synthesized
#[must_use]
pub fn identity_for(stub: &ItemStub) -> String {
    if let Some(id) = &stub.id
        && !id.is_empty()
    {
        return id.clone();
    }
    pin_id_from_url(&stub.url).unwrap_or_else(synthesized_identity)
}

/// Fallback identity derived from the current time
#[must_use]
pub fn synthesized_identity() -> String {
    format!("pin-{}", Utc::now().timestamp_millis())
}

/// Parse a popularity count rendered as text, e.g. "523", "1.2K", "3M"
///
/// Returns None for text that is not a count at all.
#[must_use]
pub fn parse_score_text(text: &str) -> Option<u64> {
    let cleaned = text.trim().replace(',', "").to_uppercase();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = match cleaned.strip_suffix(['K', 'M', 'B']) {
        Some(stripped) => {
            let mult = match cleaned.as_bytes()[cleaned.len() - 1] {
                b'K' => 1_000.0,
                b'M' => 1_000_000.0,
                _ => 1_000_000_000.0,
            };
            (stripped, mult)
        }
        None => (cleaned.as_str(), 1.0),
    };

    let value: f64 = digits.parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(id: Option<&str>, url: &str) -> ItemStub {
        ItemStub {
            id: id.map(String::from),
            url: url.to_string(),
            image_url: "https://i.example.com/236x/ab.jpg".to_string(),
            image_url_hq: None,
            title: String::new(),
        }
    }

    #[test]
    fn explicit_id_wins() {
        let s = stub(Some("987"), "https://www.pinterest.com/pin/123456/");
        assert_eq!(identity_for(&s), "987");
    }

    #[test]
    fn id_parsed_from_url() {
        let s = stub(None, "https://www.pinterest.com/pin/123456/");
        assert_eq!(identity_for(&s), "123456");
    }

    #[test]
    fn empty_id_falls_back_to_url() {
        let s = stub(Some(""), "https://www.pinterest.com/pin/42/");
        assert_eq!(identity_for(&s), "42");
    }

    #[test]
    fn unparseable_url_synthesizes() {
        let s = stub(None, "https://www.pinterest.com/ideas/whatever/");
        assert!(identity_for(&s).starts_with("pin-"));
    }

    #[test]
    fn score_text_plain_and_suffixed() {
        assert_eq!(parse_score_text("523"), Some(523));
        assert_eq!(parse_score_text("1,234"), Some(1234));
        assert_eq!(parse_score_text("1.2K"), Some(1200));
        assert_eq!(parse_score_text("3m"), Some(3_000_000));
        assert_eq!(parse_score_text("2B"), Some(2_000_000_000));
        assert_eq!(parse_score_text(""), None);
        assert_eq!(parse_score_text("likes"), None);
    }
}
