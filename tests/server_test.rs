//! HTTP tests driving the router directly.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use nano_textgen::server::{
    GenerateResponse, HealthResponse, MarkovResponse, TranslateResponse, NO_CONTINUATION,
};
use nano_textgen::{
    create_app, AppContext, Corpus, FinishReason, Language, MarkovChain, ModelConfig,
    NeuralEngine, SamplingConfig, SymbolLevel, TrainingConfig,
};
use tower::ServiceExt;

fn app() -> Router {
    let corpus = Corpus::new(["the cat sat", "the cat ran"]);
    let config = ModelConfig {
        level: SymbolLevel::Word,
        hidden_size: 8,
        ..ModelConfig::default()
    };
    let training = TrainingConfig {
        epochs: 3,
        learning_rate: 0.05,
    };
    let (engine, _) = NeuralEngine::train(&corpus, config, &training).unwrap();
    let markov = MarkovChain::build(&corpus, SymbolLevel::Word);
    let sampling = SamplingConfig {
        max_tokens: 5,
        ..SamplingConfig::default()
    };
    create_app(Arc::new(AppContext::new(engine, markov, sampling, 10)))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_generate_echoes_seed() {
    let response = app()
        .oneshot(post_json("/generate", r#"{"input": "the cat", "length": 4, "seed": 1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: GenerateResponse = body_json(response).await;
    assert!(body.output.starts_with("the cat "));
    assert_eq!(body.generated, 4);
    assert_eq!(body.finish_reason, FinishReason::MaxTokens);
    assert_eq!(body.language, Language::English);
}

#[tokio::test]
async fn test_generate_length_defaults_and_caps() {
    let body: GenerateResponse = body_json(
        app()
            .oneshot(post_json("/generate", r#"{"input": "cat"}"#))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.generated, 5);

    let body: GenerateResponse = body_json(
        app()
            .oneshot(post_json("/generate", r#"{"input": "cat", "length": 1000}"#))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.generated, 10);
}

#[tokio::test]
async fn test_generate_is_reproducible_with_seed() {
    let request = r#"{"input": "the", "length": 8, "seed": 42}"#;
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let response = app().oneshot(post_json("/generate", request)).await.unwrap();
        let body: GenerateResponse = body_json(response).await;
        outputs.push(body.output);
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    for uri in ["/generate", "/markov", "/translate"] {
        let response = app().oneshot(post_json(uri, "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");

        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body["error"], "Invalid JSON");
    }
}

#[tokio::test]
async fn test_markov_continuation() {
    let response = app()
        .oneshot(post_json("/markov", r#"{"input": "the cat", "length": 1}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: MarkovResponse = body_json(response).await;
    assert!(body.output == "sat" || body.output == "ran", "{}", body.output);
}

#[tokio::test]
async fn test_markov_placeholder_when_nothing_generated() {
    let body: MarkovResponse = body_json(
        app()
            .oneshot(post_json("/markov", r#"{"input": "dog", "length": 3}"#))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.output, NO_CONTINUATION);
    assert_eq!(body.generated, 0);
    assert_eq!(body.finish_reason, FinishReason::NoSuccessors);
}

#[tokio::test]
async fn test_translate() {
    let body: TranslateResponse = body_json(
        app()
            .oneshot(post_json("/translate", r#"{"text": "hello world"}"#))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.language, Language::English);
    assert_eq!(body.target, Language::Russian);
    assert_eq!(body.translation, "привет мир");

    let body: TranslateResponse = body_json(
        app()
            .oneshot(post_json("/translate", r#"{"text": "привет", "target": "en"}"#))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body.language, Language::Russian);
    assert_eq!(body.translation, "hello");
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: HealthResponse = body_json(response).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.architecture, "recurrent");
    assert_eq!(body.level, "word");
    assert_eq!(body.vocab_size, 4);
    assert_eq!(body.markov_states, 3);
}

#[tokio::test]
async fn test_frontend_pages() {
    for uri in ["/", "/frontend.html"] {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Not Found");
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/generate")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
