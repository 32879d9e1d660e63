use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_textgen_core::io::{load_model, save_model};
use rs_textgen_core::model::generator::Generator;
use rs_textgen_core::model::ngram_model::{BOS, EOS, NGramModel};
use rs_textgen_core::model::state::State;

#[derive(Parser, Debug)]
#[command(author, version, about = "Continue a prefix with an n-gram model", long_about = None)]
struct Args {
    /// Binary model to load; a small built-in model is used otherwise
    #[arg(long)]
    model: Option<PathBuf>,

    #[arg(long, default_value = "")]
    prefix: String,

    #[arg(long, default_value_t = 50)]
    max_words: i64,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generations to print
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Write the built-in model to this path and exit
    #[arg(long)]
    save_builtin: Option<PathBuf>,
}

/// Order-3 model over a handful of Odia words.
fn builtin_model() -> Result<NGramModel, Box<dyn std::error::Error>> {
    let ctx = |a: &str, b: &str| vec![a.to_owned(), b.to_owned()];
    let counts = vec![
        (ctx(BOS, BOS), State::from_counts([("ମୁଁ", 3), ("ସେ", 2)])?),
        (ctx(BOS, "ମୁଁ"), State::from_counts([("ଘରକୁ", 2), ("ସ୍କୁଲକୁ", 1)])?),
        (ctx(BOS, "ସେ"), State::from_counts([("ଘରକୁ", 1), ("ସ୍କୁଲକୁ", 1)])?),
        (ctx("ମୁଁ", "ଘରକୁ"), State::from_counts([("ଯାଏ", 2)])?),
        (ctx("ମୁଁ", "ସ୍କୁଲକୁ"), State::from_counts([("ଯାଏ", 1)])?),
        (ctx("ସେ", "ଘରକୁ"), State::from_counts([("ଯାଏ", 1)])?),
        (ctx("ସେ", "ସ୍କୁଲକୁ"), State::from_counts([("ଯାଏ", 1)])?),
        (ctx("ଘରକୁ", "ଯାଏ"), State::from_counts([("।", 3)])?),
        (ctx("ସ୍କୁଲକୁ", "ଯାଏ"), State::from_counts([("।", 2)])?),
        (ctx("ଯାଏ", "।"), State::from_counts([(EOS, 4), ("ମୁଁ", 1)])?),
        (ctx("।", "ମୁଁ"), State::from_counts([("ଘରକୁ", 1)])?),
    ];
    Ok(NGramModel::from_counts(
        3,
        ["ମୁଁ", "ସେ", "ଘରକୁ", "ସ୍କୁଲକୁ", "ଯାଏ", "।"],
        counts,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if let Some(path) = &args.save_builtin {
        save_model(&builtin_model()?, path)?;
        println!("Built-in model written to {}", path.display());
        return Ok(());
    }

    let model = match &args.model {
        Some(path) => load_model(path)?,
        None => builtin_model()?,
    };
    println!("Order {} model, {} known words", model.order(), model.vocabulary().len());

    let generator = Generator::new(Arc::new(model));

    // A seed makes every run print the same lines
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    for i in 0..args.count {
        let result = generator.generate(&args.prefix, args.max_words, &mut rng)?;
        if result.is_rejected() {
            println!("Rejected: {}", result.message);
            break;
        }
        println!("Generation {}: {}", i + 1, result.generation);
    }

    Ok(())
}
