//! CLI entry point for `orderscan`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use orderscan::config::Config;
use orderscan::export;
use orderscan::extract::Extractor;
use orderscan::model::purchase::PurchaseRecord;
use orderscan::parser;
use orderscan::pricing::{compare_record, PriceBook};

#[derive(Parser)]
#[command(
    name = "orderscan",
    version,
    about = "Extract purchases (product, amount, date) from order-confirmation emails"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract purchases from .json (Gmail API) or .eml files, or directories of them
    Extract {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print one JSON object per purchase instead of a table
        #[arg(long)]
        json: bool,
        /// Also write the purchases to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
        /// Also write the purchases to a JSON file
        #[arg(long = "json-out", value_name = "FILE")]
        json_out: Option<PathBuf>,
        /// Print every candidate found per message, not just the chosen values
        #[arg(long)]
        candidates: bool,
    },
    /// Extract purchases and compare amounts with the configured reference prices
    Compare {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = orderscan::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Extract {
            paths,
            json,
            csv,
            json_out,
            candidates,
        } => cmd_extract(
            &config,
            &paths,
            json,
            csv.as_deref(),
            json_out.as_deref(),
            candidates,
        ),
        Commands::Compare { paths, json } => cmd_compare(&config, &paths, json),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = orderscan::config::log_file_path(config);
    let log_dir = orderscan::config::cache_dir(config);
    if let (Some(file_name), Ok(())) = (log_path.file_name(), std::fs::create_dir_all(&log_dir)) {
        let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "orderscan", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Extract purchases and print / export them.
fn cmd_extract(
    config: &Config,
    paths: &[PathBuf],
    json: bool,
    csv: Option<&Path>,
    json_out: Option<&Path>,
    show_candidates: bool,
) -> anyhow::Result<()> {
    let records = extract_records(config, paths, show_candidates)?;

    if json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        print_records_table(&records);
    }

    if let Some(path) = csv {
        let path = resolve_output(config, path);
        export::csv::export_csv(&records, &path)?;
        if !json {
            println!("  Exported CSV to {}", path.display());
        }
    }
    if let Some(path) = json_out {
        let path = resolve_output(config, path);
        export::json::export_json(&records, &path)?;
        if !json {
            println!("  Exported JSON to {}", path.display());
        }
    }

    Ok(())
}

/// Extract purchases and check them against the configured price book.
fn cmd_compare(config: &Config, paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let book = PriceBook::new(config.prices.clone());
    if book.is_empty() {
        tracing::warn!("No reference prices configured; add a [prices] table to the config file");
    } else {
        tracing::info!(products = book.len(), "Loaded reference prices");
    }

    let records = extract_records(config, paths, false)?;

    if !json {
        println!();
        println!("  Price check results:");
        println!();
    }
    for record in &records {
        let check = compare_record(&book, record);
        if json {
            println!("{}", serde_json::to_string(&check)?);
            continue;
        }
        match check.reference {
            Some(reference) => {
                println!(
                    "  {:<40} reference ${:<10.2} paid {:<12} {}",
                    truncate(&check.product_name, 39),
                    reference,
                    record.amount.as_deref().unwrap_or("-"),
                    check.verdict
                );
            }
            None => println!(
                "  {:<40} {}",
                truncate(&check.product_name, 39),
                check.verdict
            ),
        }
    }
    if !json {
        println!();
    }

    Ok(())
}

/// Load every input and run the extractor over each message.
///
/// Files that fail to load are reported and skipped.
fn extract_records(
    config: &Config,
    paths: &[PathBuf],
    show_candidates: bool,
) -> anyhow::Result<Vec<PurchaseRecord>> {
    let files = parser::collect_inputs(paths)?;
    let extractor = Extractor::with_pattern_recognizer(config.extraction.clone());

    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Extracting [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .expect("valid template")
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut records = Vec::new();
    let mut failed = 0usize;

    for file in &files {
        match parser::load_path(file) {
            Ok(messages) => {
                for message in &messages {
                    if show_candidates {
                        let candidates = extractor.candidates(message);
                        pb.suspend(|| {
                            println!("  {}", file.display());
                            println!("    products: {:?}", candidates.products);
                            println!("    amounts:  {:?}", candidates.amounts);
                            println!("    dates:    {:?}", candidates.dates);
                        });
                    }
                    if let Some(record) = extractor.extract(message) {
                        records.push(record);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(path = %file.display(), error = %e, "Skipping input");
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    tracing::info!(
        files = files.len(),
        failed,
        purchases = records.len(),
        "Extraction finished"
    );
    Ok(records)
}

/// Relative output paths are placed under `export.default_output_dir` when set.
fn resolve_output(config: &Config, path: &Path) -> PathBuf {
    match &config.export.default_output_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Print purchases as a human-readable table.
fn print_records_table(records: &[PurchaseRecord]) {
    println!();
    println!("  {} purchase(s)", records.len());
    println!();

    if records.is_empty() {
        return;
    }

    println!("  {:<4} {:<50} {:>12} {:>6}", "#", "Product", "Amount", "Date");
    println!("  {}", "-".repeat(75));

    for (i, record) in records.iter().enumerate() {
        println!(
            "  {:<4} {:<50} {:>12} {:>6}",
            i + 1,
            truncate(&record.product_name, 49),
            record.amount.as_deref().unwrap_or("-"),
            record.date.as_deref().unwrap_or("-"),
        );
    }
    println!();
}
