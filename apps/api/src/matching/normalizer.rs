//! Text Normalizer — canonicalizes raw extracted text so phrase matching is
//! robust to case, punctuation, line breaks and known spelling variants.
//!
//! Output contains only `[a-z0-9]` and single spaces, and `normalize` is
//! idempotent for every alias table accepted by `AliasTable::new`.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Spelling variants seen in resumes and JDs, rewritten to the vocabulary form.
/// Hyphenated variants ("power-bi", "deep-learning") need no entry: punctuation
/// stripping already turns them into the canonical spaced form.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("powerbi", "power bi"),
    ("power-bi", "power bi"),
    ("deep-learning", "deep learning"),
    ("machine-learning", "machine learning"),
    ("sklearn", "scikit learn"),
    ("pyspark", "pyspark"),
    ("nlp", "nlp"),
];

/// Upper bound on alias rewrite passes. Rewrites can expose a new variant
/// across a former word edge, so passes repeat until the text is stable.
const MAX_ALIAS_PASSES: usize = 4;

static BUILTIN: LazyLock<AliasTable> =
    LazyLock::new(|| AliasTable::new(BUILTIN_ALIASES.iter().copied()));

/// A single variant → canonical rewrite, both sides already cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub variant: String,
    pub canonical: String,
}

/// Ordered alias mapping applied by literal substring replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    /// Builds a table from raw pairs. Both sides are cleaned first; entries that
    /// become empty, identical to their canonical form, duplicated, or whose
    /// canonical form contains a known variant are dropped.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cleaned: Vec<Alias> = pairs
            .into_iter()
            .map(|(variant, canonical)| Alias {
                variant: clean(variant.as_ref()),
                canonical: clean(canonical.as_ref()),
            })
            .filter(|a| !a.variant.is_empty() && a.variant != a.canonical)
            .collect();

        let mut entries: Vec<Alias> = Vec::with_capacity(cleaned.len());
        for alias in &cleaned {
            if entries.iter().any(|e| e.variant == alias.variant) {
                continue;
            }
            // A canonical form that re-introduces a variant would never settle.
            if cleaned.iter().any(|other| alias.canonical.contains(other.variant.as_str())) {
                continue;
            }
            entries.push(alias.clone());
        }

        Self { entries }
    }

    /// The built-in alias table used by [`normalize`].
    pub fn builtin() -> &'static AliasTable {
        &BUILTIN
    }

    pub fn entries(&self) -> &[Alias] {
        &self.entries
    }

    /// Lower-cases, strips punctuation, collapses whitespace, then applies aliases.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = clean(text);

        for _ in 0..MAX_ALIAS_PASSES {
            let mut changed = false;
            for alias in &self.entries {
                if out.contains(alias.variant.as_str()) {
                    out = out.replace(alias.variant.as_str(), &alias.canonical);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            out = collapse_whitespace(&out);
        }

        out
    }
}

/// Normalizes `text` with the built-in alias table. Empty input yields "".
pub fn normalize(text: &str) -> String {
    AliasTable::builtin().normalize(text)
}

/// Case-fold and punctuation strip without alias substitution.
fn clean(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&mapped)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
