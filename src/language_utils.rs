use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Target languages are given as ISO 639-1 (2-letter) or ISO 639-2
/// (3-letter) codes, optionally with a region or script suffix such as
/// `zh-TW` or `pt_BR`. The suffix is kept in file names and prompts but
/// ignored for validation.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

// Primary language subtag, lowercased: "zh-TW" -> "zh"
fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = primary_subtag(code);

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if PART2B_TO_PART2T.iter().any(|(b, _)| *b == normalized_code) => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = primary_subtag(code);

    match validate_language_code(&normalized_code)? {
        LanguageCodeType::Part1 => Language::from_639_1(&normalized_code)
            .map(|lang| lang.to_639_3().to_string())
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
        LanguageCodeType::Part2T => Ok(normalized_code),
        LanguageCodeType::Part2B => PART2B_TO_PART2T
            .iter()
            .find(|(b, _)| *b == normalized_code)
            .map(|(_, t)| t.to_string())
            .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code)),
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Human-friendly name for a code, or the code itself when unknown
pub fn display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}
