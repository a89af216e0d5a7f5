// CLI entry point for the sound-change driver.
//
// Decodes each word given on the command line as IPA, then ages it. In the
// default lineage mode a chain of `--depth` dialects is split off a proto
// language (all words share the same chain) and the word is printed at
// every stage. With `--generations N` each word instead gets N single
// changes drawn from the catalog and every intermediate form is printed.
// See `lineage.rs` for both drivers and `config.rs` for the settings.
//
// Usage:
//   drift [OPTIONS] WORD...
//     --config <PATH>         JSON config file (flags override it)
//     --seed <N>              RNG seed (default: 0)
//     --depth <N>             Dialect splits below the proto-language (default: 3)
//     --generations <N>       Draw N single changes per word instead
//     --rules <PATH>          Rule file to use instead of the built-in one
//     --no-stress             Skip default stress on proto words
//     --verbose, -v           Log every applied change

use std::path::Path;
use std::sync::Arc;

use glottochron_lang::{DriftConfig, Lineage, Word, default_ipa_table, evolve};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line settings. `None` leaves the config value alone.
#[derive(Default)]
struct CliArgs {
    config_path: Option<String>,
    seed: Option<u64>,
    depth: Option<usize>,
    generations: Option<usize>,
    rules_path: Option<String>,
    no_stress: bool,
    verbose: bool,
    words: Vec<String>,
}

fn main() {
    let args = parse_args();
    init_logging(args.verbose);

    let config = match &args.config_path {
        Some(path) => DriftConfig::from_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }),
        None => DriftConfig::default(),
    };
    let config = merge(config, &args);

    let catalog = config.catalog().unwrap_or_else(|e| {
        eprintln!("Failed to load rules: {e}");
        std::process::exit(1);
    });

    let table = default_ipa_table();
    let words: Vec<Word> = args
        .words
        .iter()
        .map(|text| {
            table.decode(text).unwrap_or_else(|e| {
                eprintln!("Cannot read {text:?}: {e}");
                std::process::exit(1);
            })
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(config.seed);

    if config.generations > 0 {
        for (text, word) in args.words.iter().zip(&words) {
            println!("{text}");
            let history = evolve(word, &catalog, config.generations, &mut rng);
            for (generation, form) in history.iter().enumerate() {
                println!("  {generation:>3}  {}", table.encode(form));
            }
        }
        return;
    }

    let mut lineage = Lineage::proto_with_stress(config.proto_stress());
    for _ in 0..config.lineage_depth {
        lineage = lineage.descend(&catalog, &mut rng);
    }
    let stages: Vec<Arc<Lineage>> = (0..=config.lineage_depth)
        .rev()
        .map(|n| lineage.ancestor(n))
        .collect();

    for (text, word) in args.words.iter().zip(&words) {
        println!("{text}");
        for stage in &stages {
            println!("  {:>3}  {}", stage.depth(), table.encode(&stage.apply(word)));
        }
    }
}

fn merge(mut config: DriftConfig, args: &CliArgs) -> DriftConfig {
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(depth) = args.depth {
        config.lineage_depth = depth;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(path) = &args.rules_path {
        config.rules_path = Some(path.clone());
    }
    if args.no_stress {
        config.apply_default_stress = false;
    }
    config
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching,
/// no clap dependency.
fn parse_args() -> CliArgs {
    let mut parsed = CliArgs::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                parsed.config_path = Some(required(&args, i, "--config"));
            }
            "--seed" => {
                i += 1;
                parsed.seed = Some(number(&args, i, "--seed"));
            }
            "--depth" => {
                i += 1;
                parsed.depth = Some(number(&args, i, "--depth"));
            }
            "--generations" => {
                i += 1;
                parsed.generations = Some(number(&args, i, "--generations"));
            }
            "--rules" => {
                i += 1;
                parsed.rules_path = Some(required(&args, i, "--rules"));
            }
            "--no-stress" => parsed.no_stress = true,
            "--verbose" | "-v" => parsed.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            word => parsed.words.push(word.to_string()),
        }
        i += 1;
    }

    if parsed.words.is_empty() {
        eprintln!("No words given");
        print_usage();
        std::process::exit(1);
    }
    parsed
}

fn required(args: &[String], i: usize, flag: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{flag} requires a value");
        std::process::exit(1);
    })
}

fn number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{flag} requires a valid number");
        std::process::exit(1);
    })
}

fn print_usage() {
    println!("Usage: drift [OPTIONS] WORD...");
    println!();
    println!("Options:");
    println!("  --config <PATH>         JSON config file (flags override it)");
    println!("  --seed <N>              RNG seed (default: 0)");
    println!("  --depth <N>             Dialect splits below the proto-language (default: 3)");
    println!("  --generations <N>       Draw N single changes per word instead");
    println!("  --rules <PATH>          Rule file to use instead of the built-in one");
    println!("  --no-stress             Skip default stress on proto words");
    println!("  --verbose, -v           Log every applied change");
    println!("  --help, -h              Show this help");
}
