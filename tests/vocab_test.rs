//! Integration tests for Vocabulary and Corpus.

use nano_textgen::{Corpus, SymbolLevel, Vocabulary};

#[test]
fn test_abcabc_first_occurrence_ids() {
    let vocab = Vocabulary::build(SymbolLevel::Char.split("abcabc"));

    assert_eq!(vocab.len(), 3);
    assert_eq!(vocab.id("a"), Some(0));
    assert_eq!(vocab.id("b"), Some(1));
    assert_eq!(vocab.id("c"), Some(2));
}

#[test]
fn test_word_level_from_corpus() {
    let corpus = Corpus::new(["the cat sat", "the cat ran"]);
    let vocab = Vocabulary::build(corpus.symbols(SymbolLevel::Word));

    assert_eq!(vocab.symbols(), &["the", "cat", "sat", "ran"]);
    assert_eq!(vocab.id("dog"), None);
}

#[test]
fn test_char_level_includes_record_separator() {
    let corpus = Corpus::new(["ab", "ba"]);
    let vocab = Vocabulary::build(corpus.symbols(SymbolLevel::Char));

    // Records are joined with a single space.
    assert_eq!(vocab.symbols(), &["a", "b", " "]);
}

#[test]
fn test_encoding_unknown_symbols() {
    let vocab = Vocabulary::build(SymbolLevel::Word.split("red green blue"));
    let seed = SymbolLevel::Word.split("green purple blue");

    assert_eq!(vocab.encode_known(&seed), vec![1, 2]);
    assert_eq!(vocab.encode_or(&seed, 0), vec![1, 0, 2]);
}

#[test]
fn test_serialized_as_symbol_list() {
    let vocab = Vocabulary::build(SymbolLevel::Char.split("hi"));
    let json = serde_json::to_string(&vocab).unwrap();
    assert_eq!(json, r#"["h","i"]"#);

    let parsed: Vocabulary = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, vocab);
    assert!(serde_json::from_str::<Vocabulary>(r#"["h","h"]"#).is_err());
}

#[test]
fn test_sample_corpus_is_usable() {
    let corpus = Corpus::sample();
    assert!(!corpus.is_empty());
    assert!(!Vocabulary::build(corpus.symbols(SymbolLevel::Word)).is_empty());
}
