use crate::language::is_cjk_ocr_code;

/// Post-processing of OCR output before translation.
pub trait TextNormalizer {
    fn normalize(&self, text: &str, ocr_lang: &str) -> String;
}

/// CJK segmentation leaves spaces between characters; drop whitespace runs
/// that sit between two CJK characters and leave everything else alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct CjkWhitespaceNormalizer;

impl TextNormalizer for CjkWhitespaceNormalizer {
    fn normalize(&self, text: &str, ocr_lang: &str) -> String {
        if !is_cjk_ocr_code(ocr_lang) {
            return text.to_string();
        }
        collapse_cjk_whitespace(text)
    }
}

/// Shorthand for [`CjkWhitespaceNormalizer`].
pub fn normalize(text: &str, ocr_lang: &str) -> String {
    CjkWhitespaceNormalizer.normalize(text, ocr_lang)
}

fn collapse_cjk_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if c.is_whitespace() {
            pending.push(c);
            continue;
        }

        let between_cjk = prev.is_some_and(is_cjk_char) && is_cjk_char(c);
        if !between_cjk {
            out.push_str(&pending);
        }
        pending.clear();
        out.push(c);
        prev = Some(c);
    }

    out.push_str(&pending);
    out
}

/// Han ideographs, kana, CJK punctuation and full-width forms.
pub fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F   // CJK symbols and punctuation (U+3000 itself is whitespace)
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x31F0..=0x31FF // Katakana phonetic extensions
        | 0x3400..=0x4DBF // CJK extension A
        | 0x4E00..=0x9FFF // CJK unified ideographs
        | 0xF900..=0xFAFF // CJK compatibility ideographs
        | 0xFF00..=0xFFEF // Half-width and full-width forms
        | 0x20000..=0x2FA1F // Supplementary ideographic planes
    )
}
