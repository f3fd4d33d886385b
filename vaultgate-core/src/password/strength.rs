//! Deterministic password strength scoring.
//!
//! The score is an additive/subtractive point system over raw properties of
//! the password (length, character classes, repetition, common sequences,
//! character variety). Each check is independent of the running score, so the
//! same password always produces the same score and the same feedback order.

use std::collections::HashSet;

use serde::Serialize;

/// Threshold at or above which a password is considered strong.
const STRONG_THRESHOLD: u8 = 70;

/// Case-insensitive substrings that immediately cost points.
const COMMON_SEQUENCES: &[&str] = &["123", "abc", "qwe", "password", "admin"];

/// Result of scoring a candidate password.
#[derive(Debug, Clone, Serialize)]
pub struct StrengthReport {
    /// Final score, clamped to 0..=100.
    pub score: u8,
    /// Human-readable feedback; the first entry is always the band summary.
    pub feedback: Vec<String>,
    /// True iff `score >= 70`.
    pub is_strong: bool,
}

/// Score a password.
///
/// Point schedule:
/// - +20 length >= 8, +10 length >= 12, +10 length >= 16
/// - +10 per present character class (lower, upper, digit, special)
/// - -10 any character repeated 3+ times consecutively
/// - -20 contains a common sequence (one deduction regardless of how many)
/// - -10 fewer than 4 distinct characters
/// - +10 length >= 16 and 10+ distinct characters
/// - +10 length >= 20 and 15+ distinct characters
pub fn score(password: &str) -> StrengthReport {
    let mut score: i32 = 0;
    let mut feedback: Vec<String> = Vec::new();

    let chars: Vec<char> = password.chars().collect();
    let length = chars.len();
    let distinct: usize = chars.iter().collect::<HashSet<_>>().len();

    if length >= 8 {
        score += 20;
    } else {
        feedback.push("Password is too short".to_string());
    }
    if length >= 12 {
        score += 10;
    }
    if length >= 16 {
        score += 10;
    }

    let has_lower = chars.iter().any(|c| c.is_lowercase());
    let has_upper = chars.iter().any(|c| c.is_uppercase());
    let has_digit = chars.iter().any(|c| c.is_ascii_digit());
    let has_special = chars.iter().any(|c| !c.is_alphanumeric());

    if has_lower {
        score += 10;
    } else {
        feedback.push("Add lowercase letters".to_string());
    }
    if has_upper {
        score += 10;
    } else {
        feedback.push("Add uppercase letters".to_string());
    }
    if has_digit {
        score += 10;
    } else {
        feedback.push("Add numbers".to_string());
    }
    if has_special {
        score += 10;
    } else {
        feedback.push("Add special characters".to_string());
    }

    if has_consecutive_repeat(&chars) {
        score -= 10;
        feedback.push("Avoid repeating the same character".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_SEQUENCES.iter().any(|s| lowered.contains(s)) {
        score -= 20;
        feedback.push("Avoid common words and sequences".to_string());
    }

    if distinct < 4 {
        score -= 10;
        feedback.push("Use a wider variety of characters".to_string());
    }

    // Bonuses depend on raw password properties only, never on the running
    // score above.
    if length >= 16 && distinct >= 10 {
        score += 10;
    }
    if length >= 20 && distinct >= 15 {
        score += 10;
    }

    let score = score.clamp(0, 100) as u8;
    feedback.insert(0, format!("Password strength: {}", band(score)));

    StrengthReport {
        score,
        is_strong: score >= STRONG_THRESHOLD,
        feedback,
    }
}

/// True if any character appears 3 or more times in a row.
fn has_consecutive_repeat(chars: &[char]) -> bool {
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

fn band(score: u8) -> &'static str {
    match score {
        0..=29 => "very weak",
        30..=49 => "weak",
        50..=69 => "moderate",
        70..=89 => "strong",
        90..=99 => "very strong",
        _ => "perfect",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_score_mixed_password() {
        // len 16 (+40), all classes (+40), contains "password" and "123"
        // (-20 once), 14 distinct chars, len>=16 bonus (+10) => 70
        let report = score("TestPassword123!");
        assert_eq!(report.score, 70);
        assert!(report.is_strong);
        assert_eq!(report.feedback[0], "Password strength: strong");
    }

    #[test]
    fn test_exact_score_short_password() {
        // len 4 (no length points), lowercase only (+10) => 10
        let report = score("weak");
        assert_eq!(report.score, 10);
        assert!(!report.is_strong);
        assert_eq!(report.feedback[0], "Password strength: very weak");
        assert!(report
            .feedback
            .contains(&"Password is too short".to_string()));
    }

    #[test]
    fn test_strong_exceeds_weak() {
        assert!(score("TestPassword123!").score > score("weak").score);
    }

    #[test]
    fn test_registration_example_password() {
        // len 19 (+40), all classes (+40), 19 distinct, len>=16 bonus (+10)
        // => 90
        let report = score("Xy9$mK@2pQ7#vL4!nR8");
        assert_eq!(report.score, 90);
        assert!(report.is_strong);
        assert_eq!(report.feedback[0], "Password strength: very strong");
    }

    #[test]
    fn test_perfect_score() {
        // len 20 (+40), all classes (+40), 20 distinct, both bonuses (+20)
        let report = score("Zq8#Wm2$Kt5@Rv9&Xb4!");
        assert_eq!(report.score, 100);
        assert_eq!(report.feedback[0], "Password strength: perfect");
    }

    #[test]
    fn test_repeated_characters_penalized() {
        // "aaa": lowercase (+10), triple repeat (-10), 1 distinct (-10)
        // => clamped to 0
        let report = score("aaa");
        assert_eq!(report.score, 0);
        assert!(report
            .feedback
            .contains(&"Avoid repeating the same character".to_string()));
    }

    #[test]
    fn test_common_sequence_single_deduction() {
        // "password": len 8 (+20), lowercase (+10), denylist (-20) => 10.
        // Only one -20 even though the whole string is denylisted.
        let report = score("password");
        assert_eq!(report.score, 10);
        assert!(report
            .feedback
            .contains(&"Avoid common words and sequences".to_string()));
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let a = score("PASSWORDzk%T");
        let b = score("passwordzk%T");
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_short_passwords_never_strong() {
        for pw in ["", "a", "Ab1!", "Xy9$mK@"] {
            assert!(!score(pw).is_strong, "{pw:?} must not be strong");
        }
    }

    #[test]
    fn test_missing_class_feedback_order() {
        let report = score("alllowercase");
        // Summary first, then the missing classes in check order.
        assert_eq!(report.feedback[0], "Password strength: weak");
        assert_eq!(report.feedback[1], "Add uppercase letters");
        assert_eq!(report.feedback[2], "Add numbers");
        assert_eq!(report.feedback[3], "Add special characters");
    }

    #[test]
    fn test_score_clamped_to_zero() {
        // "aaa111": len 6 (0), lower (+10), digit (+10), repeats (-10),
        // "123"? no. distinct {a,1}=2 (-10) => 0
        let report = score("aaa111");
        assert_eq!(report.score, 0);
    }
}
