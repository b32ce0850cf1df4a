//! Strong's code normalization
//!
//! Sources spell codes every possible way: `H7225`, `h07225`, `strong:H7225`, `G 25`, or bare
//! digits whose language only the file name reveals. Everything downstream wants the single
//! form `[HG]` followed by at least four digits.

use once_cell::sync::Lazy;
use regex::Regex;

static PREFIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"([HhGg])\s*0*([0-9]{1,5})").unwrap());
static BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b0*([0-9]{1,5})\b").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|\s;,]+").unwrap());

/// Language of a lexicon, used to complete bare numeric ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hebrew,
    Greek,
}

impl Language {
    pub fn prefix(self) -> char {
        match self {
            Language::Hebrew => 'H',
            Language::Greek => 'G',
        }
    }

    pub fn of_code(code: &str) -> Option<Self> {
        match code.chars().next() {
            Some('H') => Some(Language::Hebrew),
            Some('G') => Some(Language::Greek),
            _ => None,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hebrew" | "heb" | "h" => Ok(Language::Hebrew),
            "greek" | "grk" | "g" => Ok(Language::Greek),
            other => Err(format!("unknown lexicon language '{}'", other)),
        }
    }
}

fn pad(prefix: char, digits: &str) -> Option<String> {
    let n: u32 = digits.parse().ok()?;
    Some(format!("{}{:04}", prefix, n))
}

/// Normalize the first letter-prefixed code found in `raw`.
///
/// `h7225` → `H7225`, `G25` → `G0025`, `strong:H07225` → `H7225`.
pub fn normalize_code(raw: &str) -> Option<String> {
    let caps = PREFIXED.captures(raw)?;
    let letter = caps[1].chars().next()?.to_ascii_uppercase();
    pad(letter, &caps[2])
}

/// All codes in an attribute value such as `H7225 H430|G25`, normalized and de-duplicated
/// in order of appearance.
pub fn extract_codes(attr: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for piece in SEPARATORS.split(attr) {
        if let Some(code) = normalize_code(piece) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

/// Lexicon id from a loosely formatted identifier.
///
/// Letter-prefixed ids win; bare digits are completed with `hint` and rejected without one.
pub fn to_sid(raw: &str, hint: Option<Language>) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    if let Some(code) = normalize_code(raw) {
        return Some(code);
    }
    let lang = hint?;
    let caps = BARE.captures(raw)?;
    pad(lang.prefix(), &caps[1])
}

/// Add every code of `incoming` not yet in `seen`
pub fn union_into(seen: &mut Vec<String>, incoming: &[String]) {
    for code in incoming {
        if !seen.contains(code) {
            seen.push(code.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_padding() {
        assert_eq!(normalize_code("h7225").as_deref(), Some("H7225"));
        assert_eq!(normalize_code("G25").as_deref(), Some("G0025"));
        assert_eq!(normalize_code("strong:H07225").as_deref(), Some("H7225"));
        assert_eq!(normalize_code("G12345").as_deref(), Some("G12345"));
        assert_eq!(normalize_code("7225"), None);
        assert_eq!(normalize_code(""), None);
    }

    #[test]
    fn extracts_codes_in_order_without_duplicates() {
        assert_eq!(
            extract_codes("H7225 h430|G25;H7225, x-foo"),
            vec!["H7225", "H0430", "G0025"]
        );
        assert!(extract_codes("lemma:bara").is_empty());
    }

    #[test]
    fn bare_digits_need_a_language() {
        assert_eq!(to_sid("0025", Some(Language::Greek)).as_deref(), Some("G0025"));
        assert_eq!(to_sid("7225", Some(Language::Hebrew)).as_deref(), Some("H7225"));
        assert_eq!(to_sid("7225", None), None);
        assert_eq!(to_sid("H7225", Some(Language::Greek)).as_deref(), Some("H7225"));
        assert_eq!(to_sid("  ", Some(Language::Greek)), None);
    }

    #[test]
    fn language_from_code_and_name() {
        assert_eq!(Language::of_code("G0025"), Some(Language::Greek));
        assert_eq!(Language::of_code("X1"), None);
        assert_eq!("HEB".parse::<Language>(), Ok(Language::Hebrew));
        assert!("latin".parse::<Language>().is_err());
    }
}
