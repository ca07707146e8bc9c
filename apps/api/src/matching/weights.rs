//! Per-skill importance multipliers supplied with an evaluation.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::matching::normalizer::AliasTable;

/// Weight applied to any requirement without an entry.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Core-skill emphasis used when no override is configured.
pub const DEFAULT_WEIGHTS: &[(&str, f64)] = &[
    ("python", 2.5),
    ("sql", 2.0),
    ("pandas", 1.5),
    ("numpy", 1.2),
    ("power bi", 1.5),
    ("tableau", 1.5),
    ("machine learning", 2.0),
    ("nlp", 2.0),
    ("spark", 1.5),
    ("pyspark", 1.5),
];

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("invalid weight for '{skill}': {value} (expected a non-negative number)")]
    InvalidWeight { skill: String, value: String },

    #[error("weights must be an object mapping skill to number")]
    NotAMapping,
}

/// Skill → weight entries in the order supplied. Values are validated on
/// construction; keys are normalized only when resolved against an alias table,
/// so lookups use exactly the normalization applied to requirement phrases.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightTable {
    entries: Vec<(String, f64)>,
}

impl WeightTable {
    pub fn new<I, S>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(skill, weight)| {
                let skill = skill.into();
                validate(&skill, weight).map(|w| (skill, w))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The built-in default weights.
    pub fn defaults() -> Self {
        Self {
            entries: DEFAULT_WEIGHTS
                .iter()
                .map(|(skill, weight)| (skill.to_string(), *weight))
                .collect(),
        }
    }

    /// Parses a JSON object. Values may be numbers or numeric strings;
    /// anything else fails with `InvalidWeight` rather than being coerced.
    pub fn from_json(value: &Value) -> Result<Self, WeightError> {
        let map = value.as_object().ok_or(WeightError::NotAMapping)?;
        let pairs = map
            .iter()
            .map(|(skill, raw)| {
                let weight = match raw {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                weight
                    .map(|w| (skill.clone(), w))
                    .ok_or_else(|| WeightError::InvalidWeight {
                        skill: skill.clone(),
                        value: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pairs)
    }

    /// Parses `skill=weight` pairs separated by commas, e.g. `python=2.5,sql=2`.
    pub fn parse_list(input: &str) -> Result<Self, WeightError> {
        let mut pairs = Vec::new();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (skill, raw) = pair.split_once('=').ok_or_else(|| WeightError::InvalidWeight {
                skill: pair.to_string(),
                value: String::new(),
            })?;
            let weight = raw.trim().parse::<f64>().map_err(|_| WeightError::InvalidWeight {
                skill: skill.trim().to_string(),
                value: raw.trim().to_string(),
            })?;
            pairs.push((skill.trim().to_string(), weight));
        }
        Self::new(pairs)
    }

    /// Returns a table with `overrides` applied on top of `self`.
    pub fn overlay(&self, overrides: &WeightTable) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(overrides.entries.iter().cloned());
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Resolves keys through `aliases`. Later entries win when two keys
    /// normalize to the same phrase; keys that normalize to "" are dropped.
    pub fn resolve(&self, aliases: &AliasTable) -> ResolvedWeights {
        let by_phrase = self
            .entries
            .iter()
            .map(|(skill, weight)| (aliases.normalize(skill), *weight))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        ResolvedWeights { by_phrase }
    }
}

/// Weight lookup keyed by normalized phrase.
#[derive(Debug, Clone, Default)]
pub struct ResolvedWeights {
    by_phrase: HashMap<String, f64>,
}

impl ResolvedWeights {
    /// Weight for an already-normalized phrase; `DEFAULT_WEIGHT` when absent.
    pub fn get(&self, normalized_phrase: &str) -> f64 {
        self.by_phrase
            .get(normalized_phrase)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }
}

fn validate(skill: &str, weight: f64) -> Result<f64, WeightError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(WeightError::InvalidWeight {
            skill: skill.to_string(),
            value: weight.to_string(),
        })
    }
}
