//! The fixed set of canonical skill phrases the extractor looks for.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::normalizer::{Alias, AliasTable};

/// Default skill phrases for data / analytics roles.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "pandas",
    "numpy",
    "sql",
    "power bi",
    "tableau",
    "matplotlib",
    "seaborn",
    "spark",
    "pyspark",
    "hadoop",
    "kafka",
    "machine learning",
    "deep learning",
    "nlp",
    "natural language processing",
    "computer vision",
    "tensorflow",
    "pytorch",
    "scikit-learn",
    "excel",
    "power query",
    "dax",
    "sql server",
    "aws",
    "azure",
    "docker",
    "github",
    "git",
    "data visualization",
    "data analysis",
    "etl",
    "data engineering",
    "statistics",
    "probability",
];

/// Ordered canonical skill phrases plus the alias table used to normalize text
/// before matching. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillVocabulary {
    phrases: Vec<String>,
    aliases: AliasTable,
}

impl SkillVocabulary {
    /// Builds a vocabulary, dropping blank phrases and phrases that normalize
    /// to an already-present one. Original spelling of the first is kept.
    pub fn new<I, S>(phrases: I, aliases: AliasTable) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = dedup_requirements(phrases, &aliases);
        Self { phrases, aliases }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn alias_entries(&self) -> &[Alias] {
        self.aliases.entries()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Normalizes text with this vocabulary's aliases.
    pub fn normalize(&self, text: &str) -> String {
        self.aliases.normalize(text)
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied(), AliasTable::builtin().clone())
    }
}

/// Splits free-form requirement input ("Python, SQL, Machine Learning") on
/// commas, semicolons and line breaks, trimming blanks.
pub fn parse_requirement_list(input: &str) -> Vec<String> {
    input
        .split([',', ';', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Removes phrases that are blank or normalize to an earlier phrase,
/// preserving first-seen order and original spelling.
pub fn dedup_requirements<I, S>(phrases: I, aliases: &AliasTable) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .filter_map(|p| {
            let raw = p.as_ref().trim();
            let key = aliases.normalize(raw);
            (!key.is_empty() && seen.insert(key)).then(|| raw.to_string())
        })
        .collect()
}
