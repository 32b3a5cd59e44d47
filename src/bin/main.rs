use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use crossterm::style::{style, Color, Stylize};
use speller_core::core::vocabulary::Vocabulary;
use speller_core::network::{DenseNetwork, Predictor};
use speller_core::persistence::{ids_path, network_path, save_vocabulary};
use speller_core::training::{BatchReport, TrainConfig, TrainOutcome, TrainingObserver};
use speller_core::{repl, Speller};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

/// Learns to spell dictionary words from an unordered bag of letters.
#[derive(Parser, Debug)]
#[command(name = "speller", version)]
struct Cli {
    /// Text file containing the dictionary words
    #[arg(value_name = "TEXT_FILE")]
    corpus: PathBuf,

    /// Give up after this many epochs instead of training until convergence
    #[arg(long)]
    max_epochs: Option<usize>,

    /// Largest number of anagram sets per mini-batch
    #[arg(long, default_value_t = TrainConfig::default().batch_size)]
    batch_size: usize,

    #[arg(long, default_value_t = TrainConfig::default().network.learning_rate)]
    learning_rate: f32,

    /// Seed for the initial network weights
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Skip training and query the .ids/.net files saved next to TEXT_FILE
    #[arg(long)]
    load: bool,
}

impl Cli {
    fn train_config(&self) -> TrainConfig {
        let mut config = TrainConfig {
            batch_size: self.batch_size,
            max_epochs: self.max_epochs,
            seed: self.seed,
            ..TrainConfig::default()
        };
        config.network.learning_rate = self.learning_rate;
        config
    }
}

fn print_usage() -> ! {
    println!("{}", Cli::command().render_usage());
    println!("\tThe text file should contain a list of words in the dictionary");
    process::exit(1);
}

/// Prints training progress to stdout, coloured when attached to a terminal.
struct ConsoleReporter {
    styled: bool,
}

impl ConsoleReporter {
    fn paint(&self, text: String, color: Color) -> String {
        if self.styled {
            style(text).with(color).to_string()
        } else {
            text
        }
    }
}

impl TrainingObserver for ConsoleReporter {
    fn epoch_started(&mut self, epoch: usize) {
        println!("{}", self.paint(format!("=== Epoch {} ===", epoch), Color::Cyan));
    }

    fn batch_trained(&mut self, report: &BatchReport) {
        let result = match report.polished_bit_fail {
            None => self.paint("!".to_string(), Color::Green),
            Some(after) => self.paint(after.to_string(), Color::Yellow),
        };
        println!(
            "Training on mini-batch {} / {}: {} -> {}",
            report.index, report.total, report.bit_fail, result
        );
    }

    fn epoch_finished(&mut self, _epoch: usize, total_bit_fail: usize) {
        println!("Total bit fail: {}", total_bit_fail);
    }
}

fn train(cli: &Cli) -> Result<Speller<DenseNetwork>> {
    let config = cli.train_config();
    config.validate()?;

    let text = fs::read_to_string(&cli.corpus)
        .with_context(|| format!("Cannot read corpus '{}'", cli.corpus.display()))?;
    let vocab = Vocabulary::from_corpus(&text)?;
    tracing::info!("Indexed {} words over {} characters", vocab.word_count(), vocab.char_count());

    println!("Saving Ids...");
    let ids = ids_path(&cli.corpus);
    save_vocabulary(&vocab, &ids).with_context(|| format!("Cannot write '{}'", ids.display()))?;

    println!("Training network...");
    let mut reporter = ConsoleReporter { styled: io::stdout().is_terminal() };
    let (speller, outcome) = Speller::<DenseNetwork>::train(vocab, &config, &mut reporter)?;
    if let TrainOutcome::EpochLimitReached { epochs, total_bit_fail } = outcome {
        println!("Stopped after {} epochs with {} failing bits", epochs, total_bit_fail);
    }

    println!("Saving Network...");
    let net = network_path(&cli.corpus);
    speller
        .predictor()
        .save(&net)
        .with_context(|| format!("Cannot write '{}'", net.display()))?;
    Ok(speller)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("speller_core=warn,speller=info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => print_usage(),
    };
    if !cli.corpus.is_file() {
        print_usage();
    }

    let speller = if cli.load {
        let ids = ids_path(&cli.corpus);
        let net = network_path(&cli.corpus);
        Speller::<DenseNetwork>::from_files(&ids, &net)
            .with_context(|| format!("Cannot load '{}' and '{}'", ids.display(), net.display()))?
    } else {
        train(&cli)?
    };

    let stdin = io::stdin();
    repl::run(&speller, stdin.lock(), &mut io::stdout())?;
    Ok(())
}
