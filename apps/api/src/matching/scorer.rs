//! Scorer — weighted, frequency-aware relevance of one document against a
//! requirement list.
//!
//! Algorithm:
//! 1. Normalize the document once and count token frequencies.
//! 2. For each distinct requirement, in input order:
//!    - weight = table lookup on the normalized phrase (default 1.0)
//!    - total_weight += weight
//!    - present (word-boundary match) → matched, achieved += weight + bonus
//!    - absent → missing
//!    - bonus = 0.15 × (min token frequency across the phrase's words − 1) × weight,
//!      only when that minimum exceeds 1
//! 3. score = round(achieved / total × 100, 2), or 0.0 when total is 0.
//!
//! The score is not capped: repeated mentions can push it past 100. Callers
//! that need a bounded value set `ScoringOptions::clamp_score`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::extractor::phrase_present;
use crate::matching::normalizer::AliasTable;
use crate::matching::weights::WeightTable;

/// Bonus per extra mention, as a fraction of the requirement's weight.
pub const FREQUENCY_BONUS_RATE: f64 = 0.15;

pub const HIGH_THRESHOLD: f64 = 80.0;
pub const MEDIUM_THRESHOLD: f64 = 55.0;

/// Categorical fit label derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    /// Inclusive lower bounds: ≥80 High, ≥55 Medium, otherwise Low.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            Verdict::High
        } else if score >= MEDIUM_THRESHOLD {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }

    /// Presentation color. Not used in scoring.
    pub fn color(self) -> &'static str {
        match self {
            Verdict::High => "green",
            Verdict::Medium => "orange",
            Verdict::Low => "red",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::High => "High",
            Verdict::Medium => "Medium",
            Verdict::Low => "Low",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringOptions {
    /// Credit repeated mentions of a matched phrase.
    pub frequency_boost: bool,
    /// Clamp the final score to 100.
    pub clamp_score: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            frequency_boost: true,
            clamp_score: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub total_weight: f64,
    pub achieved_weight: f64,
}

/// Outcome of scoring one document. `matched` and `missing` partition the
/// distinct requirements and keep their original spelling and order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub score: f64,
    pub verdict: Verdict,
    pub color: String,
    pub details: MatchDetails,
}

/// Scores `document_text` against `requirements`.
///
/// Requirements that normalize to the same phrase are scored once (first
/// spelling kept). A requirement that normalizes to nothing can never match
/// and lands in `missing`. Never fails: empty inputs give score 0.0 / Low.
pub fn score<S: AsRef<str>>(
    requirements: &[S],
    document_text: &str,
    weights: Option<&WeightTable>,
    aliases: &AliasTable,
    options: ScoringOptions,
) -> MatchResult {
    let document = aliases.normalize(document_text);
    let frequencies = token_frequencies(&document);
    let weights = weights.map(|w| w.resolve(aliases)).unwrap_or_default();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    let mut total_weight = 0.0_f64;
    let mut achieved_weight = 0.0_f64;
    let mut seen = HashSet::new();

    for requirement in requirements {
        let phrase = requirement.as_ref();
        let key = aliases.normalize(phrase);
        let identity = if key.is_empty() {
            phrase.trim().to_string()
        } else {
            key.clone()
        };
        if !seen.insert(identity) {
            continue;
        }

        let weight = weights.get(&key);
        total_weight += weight;

        if phrase_present(&document, &key) {
            let bonus = if options.frequency_boost {
                frequency_bonus(&key, &frequencies, weight)
            } else {
                0.0
            };
            achieved_weight += weight + bonus;
            matched.push(phrase.to_string());
        } else {
            missing.push(phrase.to_string());
        }
    }

    let mut score = if total_weight > 0.0 {
        round2(achieved_weight / total_weight * 100.0)
    } else {
        0.0
    };
    if options.clamp_score {
        score = score.min(100.0);
    }
    let verdict = Verdict::from_score(score);

    debug!(
        requirements = matched.len() + missing.len(),
        matched = matched.len(),
        score,
        %verdict,
        "scored document"
    );

    MatchResult {
        matched,
        missing,
        score,
        verdict,
        color: verdict.color().to_string(),
        details: MatchDetails {
            total_weight: round2(total_weight),
            achieved_weight: round2(achieved_weight),
        },
    }
}

/// A phrase is only as frequent as its rarest word.
fn frequency_bonus(phrase: &str, frequencies: &HashMap<&str, usize>, weight: f64) -> f64 {
    let min_count = phrase
        .split(' ')
        .map(|word| frequencies.get(word).copied().unwrap_or(0))
        .min()
        .unwrap_or(0);
    if min_count > 1 {
        FREQUENCY_BONUS_RATE * (min_count - 1) as f64 * weight
    } else {
        0.0
    }
}

fn token_frequencies(normalized: &str) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in normalized.split_whitespace() {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(requirements: &[&str], document: &str, weights: Option<&WeightTable>) -> MatchResult {
        score(
            requirements,
            document,
            weights,
            AliasTable::builtin(),
            ScoringOptions::default(),
        )
    }

    fn as_set(items: &[String]) -> HashSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn test_weighted_scenario_scores_high() {
        let weights = WeightTable::new([("python", 2.0), ("sql", 2.0), ("excel", 1.0)]).unwrap();
        let result = run(
            &["python", "sql", "excel"],
            "I used Python and SQL daily.",
            Some(&weights),
        );
        assert_eq!(result.matched, vec!["python", "sql"]);
        assert_eq!(result.missing, vec!["excel"]);
        assert_eq!(result.details.total_weight, 5.0);
        assert_eq!(result.details.achieved_weight, 4.0);
        assert_eq!(result.score, 80.0);
        assert_eq!(result.verdict, Verdict::High);
        assert_eq!(result.color, "green");
    }

    #[test]
    fn test_frequency_bonus_allows_score_above_100() {
        let weights = WeightTable::new([("python", 2.0)]).unwrap();
        let result = run(&["python"], "Python, python and more PYTHON", Some(&weights));
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.details.total_weight, 2.0);
        assert_eq!(result.details.achieved_weight, 2.6);
        assert_eq!(result.score, 130.0);
        assert_eq!(result.verdict, Verdict::High);
    }

    #[test]
    fn test_clamp_option_caps_score_at_100() {
        let weights = WeightTable::new([("python", 2.0)]).unwrap();
        let options = ScoringOptions {
            clamp_score: true,
            ..ScoringOptions::default()
        };
        let result = score(
            &["python"],
            "python python python",
            Some(&weights),
            AliasTable::builtin(),
            options,
        );
        assert_eq!(result.score, 100.0);
        assert_eq!(result.details.achieved_weight, 2.6);
    }

    #[test]
    fn test_frequency_boost_can_be_disabled() {
        let options = ScoringOptions {
            frequency_boost: false,
            ..ScoringOptions::default()
        };
        let result = score(
            &["python"],
            "python python python",
            None,
            AliasTable::builtin(),
            options,
        );
        assert_eq!(result.score, 100.0);
        assert_eq!(result.details.achieved_weight, 1.0);
    }

    #[test]
    fn test_multi_word_bonus_uses_rarest_word() {
        // "machine" ×3, "learning" ×2 → min 2 → bonus 0.15 × 1 × 1.0
        let result = run(
            &["machine learning"],
            "machine learning, machine vision, machine learning",
            None,
        );
        assert_eq!(result.details.achieved_weight, 1.15);
        assert_eq!(result.score, 115.0);
    }

    #[test]
    fn test_empty_requirements_score_zero_low() {
        let result = run(&[], "anything", None);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.verdict, Verdict::Low);
        assert!(result.matched.is_empty());
        assert!(result.missing.is_empty());
        assert_eq!(result.details.total_weight, 0.0);
    }

    #[test]
    fn test_empty_document_misses_everything() {
        let result = run(&["python", "sql"], "", None);
        assert!(result.matched.is_empty());
        assert_eq!(result.missing, vec!["python", "sql"]);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_zero_total_weight_scores_zero() {
        let weights = WeightTable::new([("python", 0.0)]).unwrap();
        let result = run(&["python"], "python", Some(&weights));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.matched, vec!["python"]);
    }

    #[test]
    fn test_word_boundaries_respected() {
        let result = run(&["learning"], "datalearning", None);
        assert!(result.matched.is_empty());

        let result = run(&["machine learning"], "machine learning engineer", None);
        assert_eq!(result.matched, vec!["machine learning"]);
    }

    #[test]
    fn test_power_bi_matches_case_and_punctuation_but_not_concatenation() {
        let result = run(&["power bi"], "experience with Power BI tools", None);
        assert_eq!(result.matched, vec!["power bi"]);

        let result = run(&["power bi"], "experience with Power-BI.", None);
        assert_eq!(result.matched, vec!["power bi"]);

        let result = run(&["power bi"], "paid the powerbill", None);
        assert_eq!(result.missing, vec!["power bi"]);
    }

    #[test]
    fn test_original_spelling_is_preserved() {
        let result = run(&["Power BI", "Excel"], "power bi only", None);
        assert_eq!(result.matched, vec!["Power BI"]);
        assert_eq!(result.missing, vec!["Excel"]);
    }

    #[test]
    fn test_weight_lookup_uses_normalized_phrase() {
        let weights = WeightTable::new([("POWER-BI", 3.0)]).unwrap();
        let result = run(&["Power BI", "excel"], "power bi", Some(&weights));
        assert_eq!(result.details.total_weight, 4.0);
        assert_eq!(result.details.achieved_weight, 3.0);
        assert_eq!(result.score, 75.0);
        assert_eq!(result.verdict, Verdict::Medium);
    }

    #[test]
    fn test_duplicate_requirements_scored_once() {
        let result = run(&["Python", "python", "PYTHON"], "python", None);
        assert_eq!(result.matched, vec!["Python"]);
        assert!(result.missing.is_empty());
        assert_eq!(result.details.total_weight, 1.0);
    }

    #[test]
    fn test_unnormalizable_requirement_is_missing() {
        let result = run(&["!!!", "python"], "python", None);
        assert_eq!(result.matched, vec!["python"]);
        assert_eq!(result.missing, vec!["!!!"]);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_matched_and_missing_partition_requirements() {
        let cases: &[(&[&str], &str)] = &[
            (&["python", "sql", "excel"], "python and sql"),
            (&["machine learning", "learning", "deep learning"], "deep learning expert"),
            (&["power bi", "tableau", "Power BI"], "tableau power bi"),
            (&["aws", "azure", "docker", "!!"], ""),
            (&[], "python"),
        ];
        for (requirements, document) in cases {
            let result = run(requirements, document, None);
            let matched = as_set(&result.matched);
            let missing = as_set(&result.missing);
            assert!(matched.is_disjoint(&missing), "overlap for {requirements:?}");
            let union: HashSet<String> = matched.union(&missing).cloned().collect();
            let expected: HashSet<String> = crate::matching::vocabulary::dedup_requirements(
                requirements.iter().copied(),
                AliasTable::builtin(),
            )
            .into_iter()
            .chain(requirements.iter().filter(|r| normalize_empty(r)).map(|r| r.to_string()))
            .collect();
            assert_eq!(union, expected, "partition mismatch for {requirements:?}");
            assert!(result.score >= 0.0);
        }
    }

    fn normalize_empty(phrase: &str) -> bool {
        AliasTable::builtin().normalize(phrase).is_empty()
    }

    #[test]
    fn test_verdict_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(Verdict::from_score(80.0), Verdict::High);
        assert_eq!(Verdict::from_score(130.0), Verdict::High);
        assert_eq!(Verdict::from_score(79.99), Verdict::Medium);
        assert_eq!(Verdict::from_score(55.0), Verdict::Medium);
        assert_eq!(Verdict::from_score(54.99), Verdict::Low);
        assert_eq!(Verdict::from_score(0.0), Verdict::Low);
    }

    #[test]
    fn test_verdict_colors() {
        assert_eq!(Verdict::High.color(), "green");
        assert_eq!(Verdict::Medium.color(), "orange");
        assert_eq!(Verdict::Low.color(), "red");
    }

    #[test]
    fn test_verdict_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Verdict::Medium).unwrap(), "\"Medium\"");
    }
}
