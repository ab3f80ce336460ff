use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use marcsim_core::{AppConfig, Record};
use marcsim_similarity::{CheckerKind, Comparison, SimilarityEngine, Strategy};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "marcsim",
    about = "Similarity of MARC21 bibliographic records",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting MARCSIM_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two records.
    Compare {
        record1: PathBuf,
        record2: PathBuf,
        /// Strategy TOML file.
        #[arg(long)]
        strategy: Option<PathBuf>,
        /// Run a single checker by name.
        #[arg(long, conflicts_with = "strategy")]
        checker: Option<String>,
        /// Include the selected and normalized fields of every checker.
        #[arg(long)]
        details: bool,
    },

    /// Compare record pairs listed in a tab-separated file.
    Batch {
        pairs: PathBuf,
        /// Directory holding `<id>.json` record files.
        #[arg(long)]
        records_dir: PathBuf,
        #[arg(long)]
        strategy: Option<PathBuf>,
    },

    /// List registered checkers.
    Checkers,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location.
    Path,
    /// Show the effective config.
    Show,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("MARCSIM_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    match cli.command {
        // ── Compare ────────────────────────────────────────────────────────

        Commands::Compare { record1, record2, strategy, checker, details } => {
            let engine = build_engine(&config, strategy.as_deref(), checker.as_deref())?;
            let r1 = load_record(&record1)?;
            let r2 = load_record(&record2)?;

            let comparison = engine.compare_records(&r1, &r2)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                let data = if details {
                    serde_json::to_value(&comparison)?
                } else {
                    serde_json::json!({
                        "features": comparison.feature_vector(),
                        "similarity": comparison.similarity,
                    })
                };
                print_json(&serde_json::json!({"status":"ok","data":data,"meta":{"duration_ms":dur}}))?;
            } else {
                print_comparison(&comparison, details);
            }
        }

        // ── Batch ──────────────────────────────────────────────────────────

        Commands::Batch { pairs, records_dir, strategy } => {
            let engine = build_engine(&config, strategy.as_deref(), None)?;
            let text = std::fs::read_to_string(&pairs)
                .with_context(|| format!("reading pairs {}", pairs.display()))?;
            let pairs = parse_pairs(&text);

            let compare_pair = |(id1, id2): &(String, String)| -> Option<Option<f64>> {
                let result = compare_ids(&engine, &config, &records_dir, id1, id2);
                match result {
                    Ok(similarity) => Some(similarity),
                    Err(e) => {
                        tracing::warn!("skipping pair {id1} {id2}: {e:#}");
                        None
                    }
                }
            };

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.batch.threads)
                .build()?;
            let results: Vec<Option<Option<f64>>> =
                pool.install(|| pairs.par_iter().map(compare_pair).collect());
            let dur = start.elapsed().as_millis();

            let compared: Vec<_> = pairs
                .iter()
                .zip(results)
                .filter_map(|(pair, result)| result.map(|similarity| (pair, similarity)))
                .collect();

            if json_output {
                let items: Vec<serde_json::Value> = compared
                    .iter()
                    .map(|((id1, id2), sim)| serde_json::json!({"id1":id1,"id2":id2,"similarity":sim}))
                    .collect();
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"items":items,"total":pairs.len(),"failed":pairs.len() - compared.len()},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                for ((id1, id2), sim) in &compared {
                    match sim {
                        Some(value) => println!("{id1}\t{id2}\t{value}"),
                        None => println!("{id1}\t{id2}\tSKIP"),
                    }
                }
            }
        }

        // ── Checkers ───────────────────────────────────────────────────────

        Commands::Checkers => {
            if json_output {
                let items: Vec<serde_json::Value> = CheckerKind::ALL
                    .iter()
                    .map(|k| serde_json::json!({"name":k.name(),"description":k.description()}))
                    .collect();
                print_json(&serde_json::json!({"status":"ok","data":items}))?;
            } else {
                for kind in CheckerKind::ALL {
                    println!("{:<24}{}", kind.name(), kind.description());
                }
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({
                        "status":"ok",
                        "data":{"path":config_path,"exists":config_path.exists()}
                    }))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
        },
    }

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn build_engine(
    config: &AppConfig,
    strategy: Option<&Path>,
    checker: Option<&str>,
) -> Result<SimilarityEngine> {
    let parallel = config.engine.parallel_checkers;
    let engine = match (checker, strategy) {
        (Some(name), _) => SimilarityEngine::new(Strategy::single(name)?).with_parallel(parallel),
        (None, Some(path)) => SimilarityEngine::new(
            Strategy::load(path).with_context(|| format!("loading strategy {}", path.display()))?,
        )
        .with_parallel(parallel),
        (None, None) => SimilarityEngine::from_config(config)?,
    };
    Ok(engine)
}

fn load_record(path: &Path) -> Result<Record> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    Record::from_json(&json).with_context(|| format!("parsing record {}", path.display()))
}

fn compare_ids(
    engine: &SimilarityEngine,
    config: &AppConfig,
    records_dir: &Path,
    id1: &str,
    id2: &str,
) -> Result<Option<f64>> {
    let r1 = load_record(&config.record_path(records_dir, id1))?;
    let r2 = load_record(&config.record_path(records_dir, id2))?;
    Ok(engine.compare_records(&r1, &r2)?.similarity)
}

/// Tab-separated identifier pairs, one per line. Blank lines and `#`
/// comments are ignored; malformed lines are logged and dropped.
fn parse_pairs(text: &str) -> Vec<(String, String)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|(n, line)| {
            let mut ids = line.split('\t').map(str::trim);
            match (ids.next(), ids.next()) {
                (Some(id1), Some(id2)) if !id1.is_empty() && !id2.is_empty() => {
                    Some((id1.to_string(), id2.to_string()))
                }
                _ => {
                    tracing::warn!("line {}: expected two tab-separated ids", n + 1);
                    None
                }
            }
        })
        .collect()
}

fn format_similarity(value: Option<f64>) -> String {
    match value {
        Some(v) if v < 0.0 => "VETO".to_string(),
        Some(v) => format!("{v:.3}"),
        None => "SKIP".to_string(),
    }
}

fn print_comparison(comparison: &Comparison, details: bool) {
    for result in &comparison.results {
        println!(
            "{name:<24} {weight:>5.2}  {sim}",
            name = result.checker.name(),
            weight = result.weight,
            sim = format_similarity(result.verdict().similarity()),
        );
        if details {
            for (side, (fields, normalized)) in result
                .outcome
                .fields
                .iter()
                .zip(&result.outcome.normalized)
                .enumerate()
            {
                println!("    record{}: {:?}", side + 1, fields.values(true));
                println!("    normalized: {:?}", normalized.values(true));
            }
        }
    }
    println!("{:<24} {:>5}  {}", "similarity", "", format_similarity(comparison.similarity));
}
