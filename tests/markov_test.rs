//! Integration tests for the Markov alternative.

use nano_textgen::{Corpus, FinishReason, MarkovChain, Sampler, SymbolLevel};

fn cat_chain() -> MarkovChain {
    MarkovChain::build(&Corpus::new(["the cat sat", "the cat ran"]), SymbolLevel::Word)
}

#[test]
fn test_cat_successors_in_insertion_order() {
    let chain = cat_chain();
    assert_eq!(chain.successors("cat").unwrap(), &["sat", "ran"]);
}

#[test]
fn test_one_step_from_the_cat() {
    let chain = cat_chain();
    let mut sampler = Sampler::with_seed(17);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..100 {
        let output = chain.generate("the cat", 1, &mut sampler);
        assert_eq!(output.len(), 1);
        seen.insert(output.text());
    }

    let expected: std::collections::HashSet<String> =
        ["sat", "ran"].into_iter().map(String::from).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_length_zero_returns_start_state() {
    let chain = cat_chain();
    for seed in ["the cat", "cat", "the"] {
        let mut sampler = Sampler::with_seed(0);
        let output = chain.generate(seed, 0, &mut sampler);

        let last = seed.split_whitespace().last().unwrap();
        assert_eq!(output.start_state.as_deref(), Some(last));
        assert!(output.is_empty());
    }
}

#[test]
fn test_walk_follows_recorded_transitions() {
    let chain = cat_chain();
    let mut sampler = Sampler::with_seed(5);

    let output = chain.generate("the", 20, &mut sampler);
    let mut previous = output.start_state.clone().unwrap();
    for symbol in &output.symbols {
        assert!(chain.successors(&previous).unwrap().contains(symbol));
        previous = symbol.clone();
    }
    if output.len() < 20 {
        assert_eq!(output.finish_reason, FinishReason::NoSuccessors);
        assert!(chain.successors(&previous).is_none());
    }
}

#[test]
fn test_terminal_seed_stops_immediately() {
    let chain = cat_chain();
    let mut sampler = Sampler::with_seed(0);

    // "ran" ends the corpus and "dog" is unknown: no start state.
    let output = chain.generate("dog ran", 5, &mut sampler);
    assert!(output.start_state.is_none());
    assert!(output.is_empty());
    assert_eq!(output.finish_reason, FinishReason::NoSuccessors);
}

#[test]
fn test_char_level_chain() {
    let chain = MarkovChain::build(&Corpus::new(["aaaa"]), SymbolLevel::Char);
    let mut sampler = Sampler::with_seed(1);

    let output = chain.generate("a", 6, &mut sampler);
    assert_eq!(output.text(), "aaaaaa");
    assert_eq!(output.finish_reason, FinishReason::MaxTokens);
}
