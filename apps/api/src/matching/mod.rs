// Matching engine: text normalization, phrase extraction, weighted scoring.
// Every function here is a pure computation over its inputs; shared
// configuration lives in an immutable `MatchEngine`.

pub mod engine;
pub mod extractor;
pub mod feedback;
pub mod handlers;
pub mod normalizer;
pub mod scorer;
pub mod shortlist;
pub mod vocabulary;
pub mod weights;
