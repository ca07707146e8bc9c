//! Skill Extractor — finds which vocabulary phrases occur in a document.
//!
//! Matching is literal: a phrase is present when its normalized token sequence
//! appears contiguously in the normalized text, bounded by a space or a string
//! edge on both sides. "learning" never matches inside "datalearning".

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::debug;

use crate::matching::vocabulary::SkillVocabulary;

/// Returns the vocabulary phrases present in `text`, longest phrases first.
///
/// Phrases are scanned in descending word count of their vocabulary spelling
/// (stable for equal counts) and each is tested independently; a multi-word hit does not suppress its
/// constituent words. Output is unique and keeps the vocabulary's spelling.
pub fn extract_skills(text: &str, vocabulary: &SkillVocabulary) -> Vec<String> {
    let normalized = vocabulary.normalize(text);
    if normalized.is_empty() || vocabulary.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(&String, String)> = vocabulary
        .phrases()
        .iter()
        .map(|phrase| (phrase, vocabulary.normalize(phrase)))
        .collect();
    candidates.sort_by_key(|(phrase, _)| Reverse(word_count(phrase)));

    let mut seen = HashSet::new();
    let found: Vec<String> = candidates
        .into_iter()
        .filter(|(_, key)| phrase_present(&normalized, key))
        .filter(|(phrase, _)| seen.insert(*phrase))
        .map(|(phrase, _)| phrase.clone())
        .collect();

    debug!(
        vocabulary = vocabulary.len(),
        found = found.len(),
        "extracted skills"
    );
    found
}

/// Word-boundary phrase test. Both arguments must already be normalized; an
/// empty phrase is never present.
pub fn phrase_present(normalized_text: &str, normalized_phrase: &str) -> bool {
    if normalized_phrase.is_empty() {
        return false;
    }
    let bytes = normalized_text.as_bytes();
    // Hits may overlap, so advance one byte past each rejected start.
    // Normalized text is ASCII, so every byte offset is a char boundary.
    let mut pos = 0;
    while let Some(offset) = normalized_text[pos..].find(normalized_phrase) {
        let start = pos + offset;
        let end = start + normalized_phrase.len();
        let left_ok = start == 0 || bytes[start - 1] == b' ';
        let right_ok = end == bytes.len() || bytes[end] == b' ';
        if left_ok && right_ok {
            return true;
        }
        pos = start + 1;
    }
    false
}

fn word_count(phrase: &str) -> usize {
    phrase.split_whitespace().count()
}
