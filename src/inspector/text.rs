//! Text summaries: preview, printable ratio, JSON shape and line count

use serde::Serialize;
use serde_json::Value;

/// Appended to a preview that was cut short
pub const ELLIPSIS: char = '…';
/// Most top-level JSON object keys reported
pub const MAX_JSON_KEYS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSummary {
    /// Decoded text, cut to the preview length
    pub preview: String,
    /// Share of characters in printable ASCII (32..=126), 3 decimals
    pub printable_ratio: f64,
    pub is_json: bool,
    /// First top-level keys, only when the text is a JSON object
    pub json_keys: Option<Vec<String>>,
    /// Character count of the full decoded text
    pub length: usize,
    pub lines: usize,
}

/// Summarize `data` as text, previewing at most `max_len` characters.
///
/// Decoding is lossy: malformed UTF-8 becomes U+FFFD instead of failing.
pub fn summarize(data: &[u8], max_len: usize) -> TextSummary {
    let decoded = String::from_utf8_lossy(data);
    let text = decoded.strip_prefix('\u{FEFF}').unwrap_or(&decoded);

    let mut total = 0usize;
    let mut printable = 0usize;
    for ch in text.chars() {
        total += 1;
        if (' '..='~').contains(&ch) {
            printable += 1;
        }
    }

    let printable_ratio = if total == 0 {
        1.0
    } else {
        round3(printable as f64 / total as f64)
    };

    let (is_json, json_keys) = json_shape(text);

    TextSummary {
        preview: truncate_chars(text, max_len, total),
        printable_ratio,
        is_json,
        json_keys,
        length: total,
        lines: text.matches('\n').count() + 1,
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn truncate_chars(text: &str, max_len: usize, total: usize) -> String {
    if total <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push(ELLIPSIS);
    out
}

fn json_shape(text: &str) -> (bool, Option<Vec<String>>) {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => {
            let keys = map.keys().take(MAX_JSON_KEYS).cloned().collect();
            (true, Some(keys))
        }
        Ok(Value::Array(_)) => (true, None),
        _ => (false, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ==========================================================================
    // JSON DETECTION
    // ==========================================================================

    #[test]
    fn test_json_object_keys_in_document_order() {
        let summary = summarize(br#"{"zeta": 1, "alpha": [1,2], "mid": {"x": null}}"#, 500);

        assert!(summary.is_json);
        assert_eq!(
            summary.json_keys,
            Some(vec!["zeta".to_string(), "alpha".to_string(), "mid".to_string()])
        );
    }

    #[test]
    fn test_json_keys_capped_at_ten() {
        let body: Vec<String> = (0..15).map(|i| format!("\"k{:02}\": {}", i, i)).collect();
        let text = format!("{{{}}}", body.join(","));

        let summary = summarize(text.as_bytes(), 500);
        let keys = summary.json_keys.unwrap();

        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0], "k00");
        assert_eq!(keys[9], "k09");
    }

    #[test]
    fn test_json_array_has_no_keys() {
        let summary = summarize(b"[1, 2, {\"a\": 3}]", 500);
        assert!(summary.is_json);
        assert_eq!(summary.json_keys, None);
    }

    #[test]
    fn test_json_scalars_are_not_json() {
        for text in ["42", "\"a string\"", "true", "null"] {
            let summary = summarize(text.as_bytes(), 500);
            assert!(!summary.is_json, "{} should not count as JSON", text);
        }
    }

    #[test]
    fn test_broken_json_is_not_json() {
        let summary = summarize(b"{\"a\": 1,", 500);
        assert!(!summary.is_json);
        assert_eq!(summary.json_keys, None);
    }

    #[test]
    fn test_json_with_surrounding_whitespace() {
        let summary = summarize(b"\n  {\"a\": 1}\n", 500);
        assert!(summary.is_json);
    }

    // ==========================================================================
    // PREVIEW TRUNCATION
    // ==========================================================================

    #[test]
    fn test_truncation_appends_single_ellipsis() {
        let text = "x".repeat(1000);
        let summary = summarize(text.as_bytes(), 500);

        assert_eq!(summary.preview.chars().count(), 501);
        assert!(summary.preview.ends_with(ELLIPSIS));
        assert_eq!(summary.length, 1000);
    }

    #[test]
    fn test_exact_length_not_truncated() {
        let text = "y".repeat(500);
        let summary = summarize(text.as_bytes(), 500);

        assert_eq!(summary.preview, text);
        assert_eq!(summary.length, 500);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        let summary = summarize(text.as_bytes(), 4);

        assert_eq!(summary.preview, "éééé…");
        assert_eq!(summary.length, 10);
    }

    // ==========================================================================
    // PRINTABLE RATIO, LINES, DECODING
    // ==========================================================================

    #[test]
    fn test_empty_text() {
        let summary = summarize(b"", 500);

        assert_eq!(summary.printable_ratio, 1.0);
        assert_eq!(summary.length, 0);
        assert_eq!(summary.lines, 1);
        assert!(!summary.is_json);
        assert_eq!(summary.preview, "");
    }

    #[test]
    fn test_printable_ratio_rounded() {
        // 2 printable out of 3 chars: newline is not printable
        let summary = summarize(b"a\nb", 500);
        assert_eq!(summary.printable_ratio, 0.667);
    }

    #[test]
    fn test_line_count_handles_crlf_and_lf() {
        assert_eq!(summarize(b"one\r\ntwo\nthree", 500).lines, 3);
        assert_eq!(summarize(b"trailing\n", 500).lines, 2);
        assert_eq!(summarize(b"single", 500).lines, 1);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let summary = summarize(&[b'o', b'k', 0xFF, b'!'], 500);

        assert_eq!(summary.preview, "ok\u{FFFD}!");
        assert_eq!(summary.length, 4);
        assert_eq!(summary.printable_ratio, 0.75);
    }

    #[test]
    fn test_byte_order_mark_dropped() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice(br#"{"a": 1}"#);

        let summary = summarize(&data, 500);
        assert!(summary.is_json);
        assert_eq!(summary.length, 8);
    }
}
