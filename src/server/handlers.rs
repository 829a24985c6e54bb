//! Request handlers and JSON payloads.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppContext;
use crate::engine::{FinishReason, GenerationRequest, Sampler};
use crate::lang::Language;

/// Body returned by `/markov` when the walk produced nothing.
pub const NO_CONTINUATION: &str = "(no continuation found)";

const FRONTEND: &str = include_str!("frontend.html");

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Seed text.
    #[serde(default)]
    pub input: String,
    /// Number of symbols to generate.
    pub length: Option<usize>,
    /// RNG seed for reproducible output.
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Seed followed by the generated text.
    pub output: String,
    pub generated: usize,
    pub finish_reason: FinishReason,
    pub language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkovResponse {
    pub output: String,
    pub generated: usize,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    /// Target language; defaults to the other language of the detected one.
    pub target: Option<Language>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub language: Language,
    pub target: Language,
    pub translation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub architecture: String,
    pub level: String,
    pub vocab_size: usize,
    pub markov_states: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn invalid_json(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection, "Rejected request body");
    error_response(StatusCode::BAD_REQUEST, "Invalid JSON")
}

fn sampler_for(context: &AppContext, seed: Option<u64>) -> Sampler {
    match seed.or(context.sampling.seed) {
        Some(seed) => Sampler::with_seed(seed),
        None => Sampler::new(&context.sampling),
    }
}

pub(super) async fn frontend() -> Html<&'static str> {
    Html(FRONTEND)
}

pub(super) async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

pub(super) async fn health(State(context): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let config = context.engine.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        architecture: config.architecture.as_str().to_string(),
        level: config.level.as_str().to_string(),
        vocab_size: config.vocab_size,
        markov_states: context.markov.num_states(),
    })
}

pub(super) async fn generate(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_json(rejection),
    };
    let start = Instant::now();
    let length = context.clamp_length(request.length);
    let mut sampler = sampler_for(&context, request.seed);

    let generation = GenerationRequest::new(request.input.as_str())
        .max_tokens(length)
        .unknown_symbols(context.sampling.unknown_symbols);

    match context.engine.generate(&generation, &mut sampler) {
        Ok(output) => {
            tracing::info!(
                seed_len = request.input.len(),
                requested = length,
                generated = output.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Generated text"
            );
            Json(GenerateResponse {
                output: output.full_text(),
                generated: output.len(),
                finish_reason: output.finish_reason,
                language: context.detector.detect(&request.input),
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Generation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub(super) async fn markov(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_json(rejection),
    };
    let length = context.clamp_length(request.length);
    let mut sampler = sampler_for(&context, request.seed);

    let output = context.markov.generate(&request.input, length, &mut sampler);
    tracing::info!(
        seed_len = request.input.len(),
        requested = length,
        generated = output.len(),
        "Generated Markov text"
    );

    let text = if output.is_empty() {
        NO_CONTINUATION.to_string()
    } else {
        output.text()
    };
    Json(MarkovResponse {
        output: text,
        generated: output.len(),
        finish_reason: output.finish_reason,
    })
    .into_response()
}

pub(super) async fn translate(
    State(context): State<Arc<AppContext>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return invalid_json(rejection),
    };
    let language = context.detector.detect(&request.text);
    let target = request.target.unwrap_or_else(|| language.other());

    Json(TranslateResponse {
        language,
        target,
        translation: context.translator.translate(&request.text, target),
    })
    .into_response()
}
