//! Single emoji glyph recognition.
//!
//! A value is accepted when it is exactly one extended grapheme cluster and
//! that cluster is a known emoji sequence (skin tones, ZWJ families, flags,
//! keycaps and tag sequences included).

use unicode_segmentation::UnicodeSegmentation;

pub(crate) const DEFAULT_EMOJI: &str = "💬";

pub(crate) fn is_single_emoji(value: &str) -> bool {
    let mut graphemes = value.graphemes(true);
    match (graphemes.next(), graphemes.next()) {
        (Some(glyph), None) => emojis::get(glyph).is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_EMOJI, is_single_emoji};

    #[test]
    fn accepts_simple_pictographs() {
        for emoji in ["😀", "🔥", "❤️", "☕", DEFAULT_EMOJI] {
            assert!(is_single_emoji(emoji), "{emoji} must be accepted");
        }
    }

    #[test]
    fn accepts_modified_and_joined_glyphs() {
        for emoji in [
            "👍🏽",
            "👩‍💻",
            "👨‍👩‍👧‍👦",
            "🏳️‍🌈",
            "🇺🇦",
            "1️⃣",
            "🏴\u{E0067}\u{E0062}\u{E0073}\u{E0063}\u{E0074}\u{E007F}",
        ] {
            assert!(is_single_emoji(emoji), "{emoji} must be accepted");
        }
    }

    #[test]
    fn rejects_empty_text_and_multiple_glyphs() {
        for value in ["", "a", "ok", "1", "😀😀", "😀 ", "🇺🇦🇺", "👩‍", "🔥a"] {
            assert!(!is_single_emoji(value), "{value:?} must be rejected");
        }
    }

    #[test]
    fn rejects_symbols_that_are_not_emoji() {
        // Dingbat numerals, pencils, mahjong tiles and arrows share blocks with emoji.
        for value in ["\u{2776}", "\u{2710}", "\u{1F000}", "\u{1F10B}", "\u{1F780}", "→", "★"] {
            assert!(!is_single_emoji(value), "{value:?} must be rejected");
        }
    }
}
