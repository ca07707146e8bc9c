//! MatchEngine — immutable bundle of vocabulary, default weights and scoring
//! options. Shared across requests as `Arc<MatchEngine>`; per-request weights
//! and option overrides are passed in as values, never stored.

use serde::Deserialize;

use crate::matching::extractor::extract_skills;
use crate::matching::feedback::{generate_feedback, DEFAULT_TOP_MATCHED};
use crate::matching::scorer::{score, MatchResult, ScoringOptions};
use crate::matching::vocabulary::{dedup_requirements, parse_requirement_list, SkillVocabulary};
use crate::matching::weights::WeightTable;

/// Where an evaluation's requirement list comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RequirementSource {
    /// A pre-built list of phrases.
    Phrases(Vec<String>),
    /// Free-form "Python, SQL, AWS" input.
    List(String),
    /// Raw job-description text, run through skill extraction.
    JobDescription(String),
}

/// Per-request overrides of the engine's scoring options.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OptionOverrides {
    pub frequency_boost: Option<bool>,
    pub clamp_score: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct MatchEngine {
    vocabulary: SkillVocabulary,
    default_weights: WeightTable,
    options: ScoringOptions,
    top_matched: usize,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(
            SkillVocabulary::default(),
            WeightTable::defaults(),
            ScoringOptions::default(),
        )
    }
}

impl MatchEngine {
    pub fn new(
        vocabulary: SkillVocabulary,
        default_weights: WeightTable,
        options: ScoringOptions,
    ) -> Self {
        Self {
            vocabulary,
            default_weights,
            options,
            top_matched: DEFAULT_TOP_MATCHED,
        }
    }

    pub fn with_top_matched(mut self, top_matched: usize) -> Self {
        self.top_matched = top_matched;
        self
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn default_weights(&self) -> &WeightTable {
        &self.default_weights
    }

    pub fn options(&self) -> ScoringOptions {
        self.options
    }

    /// Engine options with any per-request overrides applied.
    pub fn options_with(&self, overrides: OptionOverrides) -> ScoringOptions {
        ScoringOptions {
            frequency_boost: overrides
                .frequency_boost
                .unwrap_or(self.options.frequency_boost),
            clamp_score: overrides.clamp_score.unwrap_or(self.options.clamp_score),
        }
    }

    /// Skills from the engine vocabulary present in `text`.
    pub fn extract(&self, text: &str) -> Vec<String> {
        extract_skills(text, &self.vocabulary)
    }

    /// Skills from an ad-hoc phrase list present in `text`, normalized with the
    /// engine's aliases.
    pub fn extract_with(&self, text: &str, phrases: &[String]) -> Vec<String> {
        let vocabulary = SkillVocabulary::new(phrases, self.vocabulary.aliases().clone());
        extract_skills(text, &vocabulary)
    }

    /// Resolves a requirement source into an ordered, distinct phrase list.
    pub fn requirements(&self, source: &RequirementSource) -> Vec<String> {
        let aliases = self.vocabulary.aliases();
        match source {
            RequirementSource::Phrases(phrases) => dedup_requirements(phrases, aliases),
            RequirementSource::List(input) => {
                dedup_requirements(parse_requirement_list(input), aliases)
            }
            RequirementSource::JobDescription(text) => self.extract(text),
        }
    }

    /// Scores one document. `overrides` are layered over the engine's default
    /// weights for this call only.
    pub fn score(
        &self,
        requirements: &[String],
        document_text: &str,
        overrides: Option<&WeightTable>,
        options: ScoringOptions,
    ) -> MatchResult {
        let weights = match overrides {
            Some(overrides) => self.default_weights.overlay(overrides),
            None => self.default_weights.clone(),
        };
        score(
            requirements,
            document_text,
            Some(&weights),
            self.vocabulary.aliases(),
            options,
        )
    }

    pub fn feedback(&self, result: &MatchResult) -> String {
        generate_feedback(
            result.score,
            &result.matched,
            &result.missing,
            self.top_matched,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::Verdict;

    fn unweighted_engine() -> MatchEngine {
        MatchEngine::new(
            SkillVocabulary::default(),
            WeightTable::default(),
            ScoringOptions::default(),
        )
    }

    #[test]
    fn test_requirements_from_job_description() {
        let engine = MatchEngine::default();
        let reqs = engine.requirements(&RequirementSource::JobDescription(
            "We need Python, SQL Server and Power-BI. Machine learning is a plus.".to_string(),
        ));
        assert_eq!(reqs, vec!["power bi", "machine learning", "sql server", "python", "sql"]);
    }

    #[test]
    fn test_requirements_from_list_are_deduplicated() {
        let engine = MatchEngine::default();
        let reqs = engine.requirements(&RequirementSource::List(
            "Python, SQL, python, Communication".to_string(),
        ));
        assert_eq!(reqs, vec!["Python", "SQL", "Communication"]);
    }

    #[test]
    fn test_requirements_from_empty_job_description() {
        let engine = MatchEngine::default();
        let reqs = engine.requirements(&RequirementSource::JobDescription(String::new()));
        assert!(reqs.is_empty());
    }

    #[test]
    fn test_default_weights_apply_when_no_overrides() {
        let engine = MatchEngine::default();
        let reqs = vec!["python".to_string(), "excel".to_string()];
        let result = engine.score(&reqs, "python", None, engine.options());
        // python 2.5 matched of 3.5 total
        assert_eq!(result.details.total_weight, 3.5);
        assert_eq!(result.score, 71.43);
        assert_eq!(result.verdict, Verdict::Medium);
    }

    #[test]
    fn test_overrides_layer_over_defaults() {
        let engine = MatchEngine::default();
        let overrides = WeightTable::new([("excel", 2.5)]).unwrap();
        let reqs = vec!["python".to_string(), "excel".to_string()];
        let result = engine.score(&reqs, "python", Some(&overrides), engine.options());
        assert_eq!(result.details.total_weight, 5.0);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_option_overrides() {
        let engine = unweighted_engine();
        let options = engine.options_with(OptionOverrides {
            clamp_score: Some(true),
            frequency_boost: None,
        });
        assert!(options.clamp_score);
        assert!(options.frequency_boost);

        let reqs = vec!["python".to_string()];
        let result = engine.score(&reqs, "python python python", None, options);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_extract_with_custom_phrases_uses_engine_aliases() {
        let engine = MatchEngine::default();
        let skills = engine.extract_with("PowerBI and Looker", &["power bi".to_string(), "looker".to_string()]);
        assert_eq!(skills, vec!["power bi", "looker"]);
    }

    #[test]
    fn test_feedback_respects_top_matched() {
        let engine = unweighted_engine().with_top_matched(1);
        let reqs = vec!["python".to_string(), "sql".to_string()];
        let result = engine.score(&reqs, "python sql", None, engine.options());
        let fb = engine.feedback(&result);
        assert!(fb.starts_with("Strong in: python."));
    }
}
