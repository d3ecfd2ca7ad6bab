//! Static mapping between OCR model codes and translation provider codes.
//!
//! OCR source languages map to a generic provider group (`ZH` covers simplified
//! and traditional models), while targets distinguish regional variants.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrLanguage {
    /// Tesseract model name
    pub ocr_code: &'static str,
    /// Provider source code
    pub translate_source: &'static str,
    /// BCP-47 tag for engines that take one
    pub bcp47: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLanguage {
    pub code: &'static str,
    pub name: &'static str,
}

const fn src(
    ocr_code: &'static str,
    translate_source: &'static str,
    bcp47: &'static str,
    name: &'static str,
) -> OcrLanguage {
    OcrLanguage {
        ocr_code,
        translate_source,
        bcp47,
        name,
    }
}

const fn tgt(code: &'static str, name: &'static str) -> TargetLanguage {
    TargetLanguage { code, name }
}

static OCR_LANGUAGES: &[OcrLanguage] = &[
    src("ara", "AR", "ar", "Arabic"),
    src("bul", "BG", "bg", "Bulgarian"),
    src("chi_sim", "ZH", "zh-Hans", "Chinese (all Chinese variants)"),
    src("chi_tra", "ZH", "zh-Hant", "Chinese (all Chinese variants)"),
    src("ces", "CS", "cs", "Czech"),
    src("dan", "DA", "da", "Danish"),
    src("nld", "NL", "nl", "Dutch"),
    src("eng", "EN", "en", "English (all English variants)"),
    src("est", "ET", "et", "Estonian"),
    src("fin", "FI", "fi", "Finnish"),
    src("fra", "FR", "fr", "French"),
    src("deu", "DE", "de", "German"),
    src("ell", "EL", "el", "Greek"),
    src("hun", "HU", "hu", "Hungarian"),
    src("ind", "ID", "id", "Indonesian"),
    src("ita", "IT", "it", "Italian"),
    src("jpn", "JA", "ja", "Japanese"),
    src("kor", "KO", "ko", "Korean"),
    src("lav", "LV", "lv", "Latvian"),
    src("lit", "LT", "lt", "Lithuanian"),
    src("nor", "NB", "nb", "Norwegian Bokmål"),
    src("pol", "PL", "pl", "Polish"),
    src("por", "PT", "pt", "Portuguese (all Portuguese variants)"),
    src("ron", "RO", "ro", "Romanian"),
    src("rus", "RU", "ru", "Russian"),
    src("slk", "SK", "sk", "Slovak"),
    src("slv", "SL", "sl", "Slovenian"),
    src("spa", "ES", "es", "Spanish"),
    src("swe", "SV", "sv", "Swedish"),
    src("tur", "TR", "tr", "Turkish"),
    src("ukr", "UK", "uk", "Ukrainian"),
];

static TARGET_LANGUAGES: &[TargetLanguage] = &[
    tgt("AR", "Arabic"),
    tgt("BG", "Bulgarian"),
    tgt("ZH-HANS", "Chinese (simplified)"),
    tgt("ZH-HANT", "Chinese (traditional)"),
    tgt("ZH", "Chinese (unspecified variant)"),
    tgt("CS", "Czech"),
    tgt("DA", "Danish"),
    tgt("NL", "Dutch"),
    tgt("EN-US", "English (American)"),
    tgt("EN-GB", "English (British)"),
    tgt("ET", "Estonian"),
    tgt("FI", "Finnish"),
    tgt("FR", "French"),
    tgt("DE", "German"),
    tgt("EL", "Greek"),
    tgt("HU", "Hungarian"),
    tgt("ID", "Indonesian"),
    tgt("IT", "Italian"),
    tgt("JA", "Japanese"),
    tgt("KO", "Korean"),
    tgt("LV", "Latvian"),
    tgt("LT", "Lithuanian"),
    tgt("NB", "Norwegian Bokmål"),
    tgt("PL", "Polish"),
    tgt("PT-BR", "Portuguese (Brazilian)"),
    tgt("PT-PT", "Portuguese (excluding Brazilian)"),
    tgt("PT", "Portuguese (unspecified variant)"),
    tgt("RO", "Romanian"),
    tgt("RU", "Russian"),
    tgt("SK", "Slovak"),
    tgt("SL", "Slovenian"),
    tgt("ES", "Spanish"),
    tgt("SV", "Swedish"),
    tgt("TR", "Turkish"),
    tgt("UK", "Ukrainian"),
];

const CJK_OCR_CODES: &[&str] = &["jpn", "chi_sim", "chi_tra"];

pub fn ocr_languages() -> &'static [OcrLanguage] {
    OCR_LANGUAGES
}

pub fn target_languages() -> &'static [TargetLanguage] {
    TARGET_LANGUAGES
}

pub fn ocr_language(ocr_code: &str) -> Option<&'static OcrLanguage> {
    let base = ocr_code.strip_suffix("_vert").unwrap_or(ocr_code);
    OCR_LANGUAGES.iter().find(|l| l.ocr_code == base)
}

pub fn target_language(code: &str) -> Option<&'static TargetLanguage> {
    TARGET_LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Provider targets a source group can be translated into, e.g. `PT` -> `PT-BR`, `PT-PT`, `PT`.
pub fn targets_for(source: &str) -> Vec<&'static TargetLanguage> {
    TARGET_LANGUAGES
        .iter()
        .filter(|t| {
            let base = t.code.split('-').next().unwrap_or(t.code);
            base.eq_ignore_ascii_case(source)
        })
        .collect()
}

/// Vertical variants (`jpn_vert`) count as their horizontal model.
pub fn is_cjk_ocr_code(ocr_code: &str) -> bool {
    let base = ocr_code.strip_suffix("_vert").unwrap_or(ocr_code);
    CJK_OCR_CODES.contains(&base)
}
