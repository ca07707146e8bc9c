//! Human-readable feedback built from a match result.

use crate::matching::scorer::Verdict;

pub const DEFAULT_TOP_MATCHED: usize = 5;
const TOP_MISSING: usize = 6;

/// Builds a one-paragraph summary: strengths, gaps, overall fit and a
/// verdict-specific suggestion.
pub fn generate_feedback(
    score: f64,
    matched: &[String],
    missing: &[String],
    top_matched: usize,
) -> String {
    let strong = if matched.is_empty() {
        "Strong in: none detected.".to_string()
    } else {
        format!("Strong in: {}.", head(matched, top_matched))
    };

    let gaps = if missing.is_empty() {
        "Missing: none.".to_string()
    } else {
        format!("Missing or weak: {}.", head(missing, TOP_MISSING))
    };

    format!(
        "{strong} {gaps} Overall fit: {}%. {}",
        percent(score),
        suggestion(Verdict::from_score(score))
    )
}

/// Whole scores keep one decimal place ("80.0"); others print as rounded.
fn percent(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}

fn suggestion(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::High => {
            "Candidate is a strong fit. Prepare for interview and focus on role-specific projects."
        }
        Verdict::Medium => {
            "Decent fit. Adding relevant projects or certifications for the missing skills would improve it."
        }
        Verdict::Low => {
            "Low fit. Upskilling on the missing core technologies and adding practical projects is recommended."
        }
    }
}

fn head(items: &[String], n: usize) -> String {
    items
        .iter()
        .take(n)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
