//! nano-textgen server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nano_textgen::{
    server, telemetry, Architecture, AppContext, Corpus, MarkovChain, ModelConfig, NeuralEngine,
    SamplingConfig, ServerConfig, SymbolLevel, TrainingConfig, UnknownSymbolPolicy,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nano-textgen")]
#[command(about = "Toy next-symbol text generator with an HTTP front end")]
struct Args {
    /// Server host address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Weight file to load, or to write after training
    #[arg(long, default_value = "weights.json")]
    weights: PathBuf,

    /// Corpus file, one record per non-empty line (built-in sample if omitted)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Symbol granularity
    #[arg(long, value_enum, default_value = "char")]
    level: SymbolLevel,

    /// Forward-pass shape
    #[arg(long, value_enum, default_value = "recurrent")]
    architecture: Architecture,

    /// Hidden dimension of the recurrent shape
    #[arg(long, default_value = "50")]
    hidden_size: usize,

    /// Context window length used during generation
    #[arg(long, default_value = "16")]
    seq_length: usize,

    /// Training epochs
    #[arg(long, default_value = "50")]
    epochs: usize,

    /// Training step size
    #[arg(long, default_value = "0.01")]
    learning_rate: f32,

    /// Train even if the weight file exists
    #[arg(long)]
    retrain: bool,

    /// Upper bound on the requested generation length
    #[arg(long, default_value = "500")]
    max_tokens: usize,

    /// Default generation length when a request omits it
    #[arg(long, default_value = "100")]
    default_length: usize,

    /// Fixed RNG seed for every request without its own seed
    #[arg(long)]
    seed: Option<u64>,

    /// Handling of seed symbols outside the vocabulary
    #[arg(long, value_enum, default_value = "skip")]
    unknown_symbols: UnknownSymbolPolicy,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&args.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting nano-textgen");

    let corpus = match &args.corpus {
        Some(path) => Corpus::from_file(path)
            .with_context(|| format!("failed to read corpus {}", path.display()))?,
        None => Corpus::sample(),
    };

    let model_config = ModelConfig {
        architecture: args.architecture,
        level: args.level,
        hidden_size: args.hidden_size,
        seq_length: args.seq_length,
        ..ModelConfig::default()
    };
    let training = TrainingConfig {
        epochs: args.epochs,
        learning_rate: args.learning_rate,
    };

    let engine = if args.retrain {
        let (engine, report) = NeuralEngine::train(&corpus, model_config, &training)?;
        engine
            .save(&args.weights)
            .with_context(|| format!("failed to save weights to {}", args.weights.display()))?;
        info!(final_loss = ?report.final_loss(), "Retrained model");
        engine
    } else {
        NeuralEngine::load_or_train(&args.weights, &corpus, model_config, &training)
            .with_context(|| format!("failed to load weights from {}", args.weights.display()))?
    };

    let markov = MarkovChain::build(&corpus, engine.config().level);
    info!(
        architecture = engine.config().architecture.as_str(),
        level = engine.config().level.as_str(),
        vocab_size = engine.config().vocab_size,
        markov_states = markov.num_states(),
        "Models ready"
    );

    let sampling = SamplingConfig {
        max_tokens: args.default_length,
        seed: args.seed,
        unknown_symbols: args.unknown_symbols,
    };
    let context = Arc::new(AppContext::new(engine, markov, sampling, args.max_tokens));
    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    server::serve(&config, context).await?;
    Ok(())
}
