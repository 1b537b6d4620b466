//! Text helpers for header matching and translation-script detection

use serde::{Deserialize, Serialize};

/// Script the translations are expected to be written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetScript {
    #[default]
    Hangul,
    Kana,
    Han,
    Cyrillic,
}

impl TargetScript {
    pub fn contains(&self, c: char) -> bool {
        let cp = c as u32;
        match self {
            // Syllables, Jamo, Compatibility Jamo, Jamo Extended-A/B
            Self::Hangul => matches!(
                cp,
                0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xD7B0..=0xD7FF
            ),
            Self::Kana => matches!(cp, 0x3040..=0x309F | 0x30A0..=0x30FF | 0x31F0..=0x31FF),
            Self::Han => matches!(
                cp,
                0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x20000..=0x2A6DF | 0xF900..=0xFAFF
            ),
            Self::Cyrillic => matches!(cp, 0x0400..=0x04FF | 0x0500..=0x052F),
        }
    }
}

/// Lower-cases, trims and drops everything that is not a letter or digit.
///
/// `"No."`, `"no"` and `" NO "` all normalize to `"no"`.
pub fn normalize_token(cell: &str) -> String {
    cell.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// True when the cell starts with a digit (`"1"`, `"12."`, `"3)"`).
pub fn looks_numeric(cell: &str) -> bool {
    cell.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

/// Share of alphabetic characters that belong to `script`.
///
/// `None` when the text has no alphabetic characters at all.
pub fn script_ratio(text: &str, script: TargetScript) -> Option<f64> {
    let (mut alphabetic, mut in_script) = (0usize, 0usize);
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        alphabetic += 1;
        if script.contains(c) {
            in_script += 1;
        }
    }
    if alphabetic == 0 {
        None
    } else {
        Some(in_script as f64 / alphabetic as f64)
    }
}

/// Plausibility check for a translation cell.
///
/// Cells without letters (blank, numbers, punctuation) are accepted as-is.
pub fn is_target_script(text: &str, script: TargetScript, threshold: f64) -> bool {
    script_ratio(text, script).map_or(true, |ratio| ratio >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_header_variants() {
        assert_eq!(normalize_token("No."), "no");
        assert_eq!(normalize_token("  NO "), "no");
        assert_eq!(normalize_token("Words:"), "words");
        assert_eq!(normalize_token("해석 (뜻)"), "해석뜻");
    }

    #[test]
    fn numeric_detection() {
        assert!(looks_numeric("1"));
        assert!(looks_numeric(" 12."));
        assert!(!looks_numeric("No"));
        assert!(!looks_numeric(""));
    }

    #[test]
    fn hangul_ratio() {
        assert_eq!(script_ratio("사과", TargetScript::Hangul), Some(1.0));
        assert_eq!(script_ratio("apple", TargetScript::Hangul), Some(0.0));
        assert_eq!(script_ratio("123 !", TargetScript::Hangul), None);
        // 2 of 7 letters
        let ratio = script_ratio("apple 사과", TargetScript::Hangul).unwrap();
        assert!((ratio - 2.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn plausibility_threshold() {
        assert!(is_target_script("(n.) 사과", TargetScript::Hangul, 0.3));
        assert!(!is_target_script("I ate an apple", TargetScript::Hangul, 0.3));
        assert!(is_target_script("", TargetScript::Hangul, 0.3));
        assert!(is_target_script("кошка", TargetScript::Cyrillic, 0.3));
    }
}
