//! Axum route handlers for the Matching API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingest::ingest_document;
use crate::matching::engine::{OptionOverrides, RequirementSource};
use crate::matching::normalizer::{normalize, Alias};
use crate::matching::scorer::MatchResult;
use crate::matching::shortlist::{build_shortlist, CandidateDocument, Shortlist, SkippedDocument};
use crate::matching::weights::WeightTable;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Exactly one of the three fields must be set.
#[derive(Debug, Default, Deserialize)]
pub struct RequirementInput {
    pub requirements: Option<Vec<String>>,
    pub requirements_text: Option<String>,
    pub jd_text: Option<String>,
}

impl RequirementInput {
    fn into_source(self) -> Result<RequirementSource, AppError> {
        match (self.requirements, self.requirements_text, self.jd_text) {
            (Some(phrases), None, None) => Ok(RequirementSource::Phrases(phrases)),
            (None, Some(list), None) => Ok(RequirementSource::List(list)),
            (None, None, Some(jd)) => Ok(RequirementSource::JobDescription(jd)),
            (None, None, None) => Err(AppError::Validation(
                "one of requirements, requirements_text or jd_text is required".to_string(),
            )),
            _ => Err(AppError::Validation(
                "only one of requirements, requirements_text or jd_text may be set".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    /// Ad-hoc vocabulary; the engine vocabulary is used when absent.
    pub vocabulary: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub normalized: String,
}

#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    pub phrases: Vec<String>,
    pub aliases: Vec<Alias>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    #[serde(flatten)]
    pub requirements: RequirementInput,
    pub weights: Option<Value>,
    #[serde(flatten)]
    pub options: OptionOverrides,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub requirements: Vec<String>,
    #[serde(flatten)]
    pub result: MatchResult,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub resumes: Vec<CandidateDocument>,
    #[serde(flatten)]
    pub requirements: RequirementInput,
    pub weights: Option<Value>,
    #[serde(flatten)]
    pub options: OptionOverrides,
}

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/vocabulary
pub async fn handle_vocabulary(State(state): State<AppState>) -> Json<VocabularyResponse> {
    let vocabulary = state.engine.vocabulary();
    Json(VocabularyResponse {
        phrases: vocabulary.phrases().to_vec(),
        aliases: vocabulary.alias_entries().to_vec(),
    })
}

/// POST /api/v1/normalize
///
/// Shows the form text takes before matching, using the built-in aliases.
pub async fn handle_normalize(Json(request): Json<NormalizeRequest>) -> Json<NormalizeResponse> {
    Json(NormalizeResponse {
        normalized: normalize(&request.text),
    })
}

/// POST /api/v1/skills/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    let skills = match &request.vocabulary {
        Some(phrases) => state.engine.extract_with(&request.text, phrases),
        None => state.engine.extract(&request.text),
    };
    Json(ExtractResponse { skills })
}

/// POST /api/v1/score
///
/// Scores a single resume against a requirement list, phrase string or JD.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let source = request.requirements.into_source()?;
    let weights = parse_weights(request.weights.as_ref())?;
    let engine = state.engine.clone();
    let options = engine.options_with(request.options);
    let resume_text = request.resume_text;

    let response = tokio::task::spawn_blocking(move || {
        let requirements = engine.requirements(&source);
        let result = engine.score(&requirements, &resume_text, weights.as_ref(), options);
        let feedback = engine.feedback(&result);
        ScoreResponse {
            requirements,
            result,
            feedback,
        }
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(response))
}

/// POST /api/v1/shortlist
///
/// Ranks already-extracted resume texts against one requirement source.
pub async fn handle_shortlist(
    State(state): State<AppState>,
    Json(request): Json<ShortlistRequest>,
) -> Result<Json<Shortlist>, AppError> {
    if request.resumes.is_empty() {
        return Err(AppError::Validation("resumes cannot be empty".to_string()));
    }
    let source = request.requirements.into_source()?;
    let weights = parse_weights(request.weights.as_ref())?;

    let shortlist = run_shortlist(
        &state,
        source,
        request.resumes,
        weights,
        request.options,
        Vec::new(),
    )
    .await?;
    Ok(Json(shortlist))
}

/// POST /api/v1/shortlist/upload
///
/// Multipart: `jd` file or `requirements_text`, one or more `resumes` files,
/// optional `weights` (JSON object), `clamp_score`, `frequency_boost`.
/// Resumes that cannot be read are reported in `skipped`.
pub async fn handle_shortlist_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Shortlist>, AppError> {
    let mut jd: Option<UploadedFile> = None;
    let mut requirements_text: Option<String> = None;
    let mut resumes = Vec::new();
    let mut weights = None;
    let mut options = OptionOverrides::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jd" | "resumes" => {
                let upload = UploadedFile {
                    file_name: field.file_name().unwrap_or(&name).to_string(),
                    content_type: field.content_type().map(str::to_string),
                    bytes: field.bytes().await?,
                };
                if name == "jd" {
                    jd = Some(upload);
                } else {
                    resumes.push(upload);
                }
            }
            "requirements_text" => requirements_text = Some(field.text().await?),
            "weights" => {
                let raw = field.text().await?;
                let value: Value = serde_json::from_str(&raw).map_err(|e| {
                    AppError::Validation(format!("weights must be a JSON object: {e}"))
                })?;
                weights = Some(WeightTable::from_json(&value)?);
            }
            "clamp_score" => options.clamp_score = Some(parse_flag(&name, &field.text().await?)?),
            "frequency_boost" => {
                options.frequency_boost = Some(parse_flag(&name, &field.text().await?)?)
            }
            other => warn!(field = other, "ignoring unknown multipart field"),
        }
    }

    if resumes.is_empty() {
        return Err(AppError::Validation(
            "at least one resumes file is required".to_string(),
        ));
    }

    let source = match (requirements_text, jd) {
        (Some(list), None) => RequirementSource::List(list),
        (None, Some(jd)) => {
            let document = ingest_document(&jd.file_name, jd.content_type.as_deref(), jd.bytes)
                .await
                .map_err(|e| {
                    AppError::UnprocessableEntity(format!(
                        "job description '{}' could not be read: {e}",
                        jd.file_name
                    ))
                })?;
            RequirementSource::JobDescription(document.text)
        }
        (None, None) => {
            return Err(AppError::Validation(
                "a jd file or requirements_text is required".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "only one of jd or requirements_text may be set".to_string(),
            ))
        }
    };

    let (documents, skipped) = ingest_all(resumes).await?;
    let shortlist = run_shortlist(&state, source, documents, weights, options, skipped).await?;
    Ok(Json(shortlist))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_weights(value: Option<&Value>) -> Result<Option<WeightTable>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(WeightTable::from_json(value)?)),
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, AppError> {
    raw.trim()
        .parse::<bool>()
        .map_err(|_| AppError::Validation(format!("{field} must be true or false")))
}

/// Extracts every upload concurrently, one task per file, preserving
/// submission order.
async fn ingest_all(
    uploads: Vec<UploadedFile>,
) -> Result<(Vec<CandidateDocument>, Vec<SkippedDocument>), AppError> {
    let mut tasks = JoinSet::new();
    for (index, upload) in uploads.into_iter().enumerate() {
        tasks.spawn(async move {
            let result =
                ingest_document(&upload.file_name, upload.content_type.as_deref(), upload.bytes)
                    .await;
            (index, upload.file_name, result)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.map_err(|e| AppError::Internal(e.into()))?);
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut documents = Vec::new();
    let mut skipped = Vec::new();
    for (_, file_name, result) in outcomes {
        match result {
            Ok(document) => documents.push(document),
            Err(e) => {
                warn!(file_name = %file_name, error = %e, "resume could not be ingested");
                skipped.push(SkippedDocument {
                    name: file_name,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok((documents, skipped))
}

async fn run_shortlist(
    state: &AppState,
    source: RequirementSource,
    documents: Vec<CandidateDocument>,
    weights: Option<WeightTable>,
    overrides: OptionOverrides,
    skipped: Vec<SkippedDocument>,
) -> Result<Shortlist, AppError> {
    let engine = state.engine.clone();
    let options = engine.options_with(overrides);
    let submitted = documents.len() + skipped.len();

    let shortlist = tokio::task::spawn_blocking(move || {
        let requirements = engine.requirements(&source);
        build_shortlist(
            &engine,
            requirements,
            documents,
            weights.as_ref(),
            options,
            skipped,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    info!(
        submitted,
        ranked = shortlist.ranked.len(),
        "shortlist request completed"
    );
    Ok(shortlist)
}
