//! Scores many candidate documents against one requirement
//! list and ranks them.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::matching::engine::MatchEngine;
use crate::matching::scorer::{MatchResult, ScoringOptions};
use crate::matching::weights::WeightTable;

/// A document already decoded to plain text by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistEntry {
    /// 1-based position after ranking.
    pub rank: usize,
    pub name: String,
    pub result: MatchResult,
    pub feedback: String,
}

/// How many evaluated candidates matched a requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCoverage {
    pub skill: String,
    pub candidates: usize,
}

/// A document that never reached scoring, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shortlist {
    pub requirements: Vec<String>,
    pub ranked: Vec<ShortlistEntry>,
    pub skill_coverage: Vec<SkillCoverage>,
    pub skipped: Vec<SkippedDocument>,
}

/// Scores each document in submission order. Documents with no text after
/// trimming are returned as skipped instead of scored.
pub fn evaluate_documents(
    engine: &MatchEngine,
    requirements: &[String],
    documents: Vec<CandidateDocument>,
    weights: Option<&WeightTable>,
    options: ScoringOptions,
) -> (Vec<(String, MatchResult)>, Vec<SkippedDocument>) {
    let mut evaluated = Vec::with_capacity(documents.len());
    let mut skipped = Vec::new();

    for document in documents {
        if document.text.trim().is_empty() {
            warn!(name = %document.name, "skipping document with no text");
            skipped.push(SkippedDocument {
                name: document.name,
                reason: "document text is empty".to_string(),
            });
            continue;
        }
        let result = engine.score(requirements, &document.text, weights, options);
        evaluated.push((document.name, result));
    }

    (evaluated, skipped)
}

/// Evaluates, ranks by descending score (ties keep submission order) and
/// aggregates requirement coverage. `skipped` carries documents that already
/// failed ingestion upstream.
pub fn build_shortlist(
    engine: &MatchEngine,
    requirements: Vec<String>,
    documents: Vec<CandidateDocument>,
    weights: Option<&WeightTable>,
    options: ScoringOptions,
    mut skipped: Vec<SkippedDocument>,
) -> Shortlist {
    let (mut evaluated, empty) =
        evaluate_documents(engine, &requirements, documents, weights, options);
    skipped.extend(empty);

    let skill_coverage = coverage(&requirements, &evaluated);

    evaluated.sort_by(|(_, a), (_, b)| b.score.total_cmp(&a.score));
    let ranked: Vec<ShortlistEntry> = evaluated
        .into_iter()
        .enumerate()
        .map(|(i, (name, result))| ShortlistEntry {
            rank: i + 1,
            feedback: engine.feedback(&result),
            name,
            result,
        })
        .collect();

    info!(
        requirements = requirements.len(),
        ranked = ranked.len(),
        skipped = skipped.len(),
        top_score = ranked.first().map(|e| e.result.score).unwrap_or(0.0),
        "shortlist built"
    );

    Shortlist {
        requirements,
        ranked,
        skill_coverage,
        skipped,
    }
}

/// Requirement → number of candidates that matched it, most common first.
fn coverage(requirements: &[String], evaluated: &[(String, MatchResult)]) -> Vec<SkillCoverage> {
    let mut coverage: Vec<SkillCoverage> = requirements
        .iter()
        .map(|skill| SkillCoverage {
            skill: skill.clone(),
            candidates: evaluated
                .iter()
                .filter(|(_, result)| result.matched.contains(skill))
                .count(),
        })
        .collect();
    coverage.sort_by(|a, b| b.candidates.cmp(&a.candidates));
    coverage
}
