//! Integration tests for NeuralEngine and the generation loop.

use nano_textgen::{
    Architecture, Corpus, FinishReason, GenerationRequest, ModelConfig, NeuralEngine, Sampler,
    SymbolLevel, TrainingConfig, UnknownSymbolPolicy,
};

fn quick_training() -> TrainingConfig {
    TrainingConfig {
        epochs: 5,
        learning_rate: 0.05,
    }
}

fn engine(architecture: Architecture, level: SymbolLevel) -> NeuralEngine {
    let config = ModelConfig {
        architecture,
        level,
        hidden_size: 8,
        seq_length: 4,
        ..ModelConfig::default()
    };
    let corpus = Corpus::new(["the cat sat", "the cat ran"]);
    NeuralEngine::train(&corpus, config, &quick_training())
        .unwrap()
        .0
}

#[test]
fn test_generation_request_builder() {
    let request = GenerationRequest::new("Hello")
        .max_tokens(42)
        .unknown_symbols(UnknownSymbolPolicy::Default);

    assert_eq!(request.seed, "Hello");
    assert_eq!(request.max_tokens, 42);
    assert_eq!(request.unknown_symbols, UnknownSymbolPolicy::Default);
}

#[test]
fn test_generation_request_defaults() {
    let request = GenerationRequest::new("Test");

    assert_eq!(request.max_tokens, 100);
    assert_eq!(request.unknown_symbols, UnknownSymbolPolicy::Skip);
}

#[test]
fn test_full_length_for_known_seed() {
    for architecture in [Architecture::Recurrent, Architecture::Direct] {
        let engine = engine(architecture, SymbolLevel::Char);
        let mut sampler = Sampler::with_seed(11);

        for n in [0usize, 1, 7, 30] {
            let output = engine
                .generate(&GenerationRequest::new("the c").max_tokens(n), &mut sampler)
                .unwrap();
            assert_eq!(output.len(), n, "{architecture:?} with n = {n}");
            assert_eq!(output.finish_reason, FinishReason::MaxTokens);
        }
    }
}

#[test]
fn test_unknown_seed_stops_early() {
    let engine = engine(Architecture::Recurrent, SymbolLevel::Word);
    let mut sampler = Sampler::with_seed(0);

    let output = engine
        .generate(&GenerationRequest::new("zebra").max_tokens(10), &mut sampler)
        .unwrap();

    assert!(output.is_empty());
    assert_eq!(output.finish_reason, FinishReason::UnknownContext);
    assert_eq!(output.full_text(), "zebra");
}

#[test]
fn test_default_policy_generates_from_unknown_seed() {
    let engine = engine(Architecture::Direct, SymbolLevel::Word);
    let mut sampler = Sampler::with_seed(0);

    let request = GenerationRequest::new("zebra")
        .max_tokens(3)
        .unknown_symbols(UnknownSymbolPolicy::Default);
    let output = engine.generate(&request, &mut sampler).unwrap();

    assert_eq!(output.len(), 3);
    assert!(output.full_text().starts_with("zebra "));
}

#[test]
fn test_same_seed_same_text() {
    let engine = engine(Architecture::Recurrent, SymbolLevel::Char);
    let request = GenerationRequest::new("the").max_tokens(20);

    let a = engine.generate(&request, &mut Sampler::with_seed(99)).unwrap();
    let b = engine.generate(&request, &mut Sampler::with_seed(99)).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_requests_do_not_share_hidden_state() {
    let engine = engine(Architecture::Recurrent, SymbolLevel::Char);
    let first = engine.distribution(&[0, 1, 2]).unwrap().unwrap();

    // An unrelated request in between must not change the next result.
    let mut sampler = Sampler::with_seed(3);
    engine
        .generate(&GenerationRequest::new("cat").max_tokens(15), &mut sampler)
        .unwrap();

    let second = engine.distribution(&[0, 1, 2]).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_training_reduces_loss() {
    let corpus = Corpus::new(["abababababababab"]);
    let config = ModelConfig {
        architecture: Architecture::Direct,
        ..ModelConfig::default()
    };
    let training = TrainingConfig {
        epochs: 40,
        learning_rate: 0.5,
    };

    let (engine, report) = NeuralEngine::train(&corpus, config, &training).unwrap();
    assert_eq!(report.losses.len(), 40);
    assert!(report.final_loss().unwrap() < report.losses[0]);

    // "a" is always followed by "b".
    let probs = engine.distribution(&[0]).unwrap().unwrap();
    assert!(probs[1] > probs[0]);
}
