use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use wordgen::{Config, Grammar, presets};

/// Rule-driven word generator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate words from a grammar file
    Generate {
        /// Path to the JSON grammar
        config: PathBuf,

        /// Number of words to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Start from this rule instead of the configured root
        #[arg(long)]
        root: Option<String>,
    },
    /// Report every problem in a grammar file
    Validate {
        /// Path to the JSON grammar
        config: PathBuf,
    },
    /// Write a built-in grammar as JSON
    Preset {
        /// Preset name ("Toki Pona" or "Weighted Toki Pona")
        name: String,

        /// Output file path (stdout if omitted)
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            config,
            count,
            seed,
            root,
        } => {
            let mut config = Config::from_json_file(&config)?;
            if let Some(root) = root {
                config.set_root(&root);
            }
            let grammar = Grammar::load(&config)?;

            let mut failed = 0;
            for result in wordgen::generate_batch(&grammar, count, seed) {
                match result {
                    Ok(word) => println!("{}", word),
                    Err(e) => {
                        eprintln!("error: {}", e);
                        failed += 1;
                    }
                }
            }

            if count > 0 && failed == count {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Validate { config } => {
            let config = Config::from_json_file(&config)?;
            let problems = wordgen::validate(&config);
            for problem in &problems {
                println!("{}", problem);
            }
            if !problems.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            println!("ok: {} rules", config.rules.len());
        }
        Commands::Preset { name, output } => {
            let config = presets::preset(&name)?;
            match output {
                Some(path) => {
                    config.save(&path)?;
                    eprintln!("Created {} preset at: {}", name, path.display());
                }
                None => println!("{}", config.to_json()?),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
