//! Evaluation CLI for ownership disambiguation.
//!
//! Usage:
//!     eval canonicalize "Ben & Jerry's" --country us
//!     eval detect "Smørrebrød på æblebrød"
//!     eval key --brand Oatly --product "Oat Drink"
//!     eval score --candidates candidates.json --text "the best of the north"
//!     eval benchmark --cases cases.json
//!     eval cache-health

mod benchmark;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ownerlens_cachekey::{generate_cache_key, LookupInput};
use ownerlens_disambig::{DisambigConfig, DisambiguationScorer};
use ownerlens_explain::{explain_rationale, explain_result, summarize_decision};
use ownerlens_model::DisambiguationCandidate;
use ownerlens_store::{probe, CacheStore, SupabaseConfig, SupabaseStore};
use std::path::Path;

#[derive(Parser)]
#[command(name = "eval")]
#[command(about = "Evaluate ownership disambiguation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the strong logo/OCR threshold
    #[arg(long, global = true)]
    strong_threshold: Option<f64>,

    /// Override the weak logo/OCR threshold
    #[arg(long, global = true)]
    weak_threshold: Option<f64>,

    /// Override the minimum score gap
    #[arg(long, global = true)]
    min_gap: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize an entity name and resolve sub-brands
    Canonicalize {
        name: String,

        /// Also print the entity key for this country
        #[arg(short, long)]
        country: Option<String>,
    },

    /// Detect packaging languages in text
    Detect { text: String },

    /// Generate a cache key for a lookup
    Key {
        #[arg(long, default_value = "ownership")]
        pipeline: String,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        product: Option<String>,

        #[arg(long)]
        barcode: Option<String>,

        #[arg(long)]
        locale: Option<String>,

        #[arg(long, default_value = ownerlens_cachekey::DEFAULT_CACHE_VERSION)]
        cache_version: String,
    },

    /// Score candidates from a JSON file
    Score {
        /// Path to a JSON array of candidates
        #[arg(short, long)]
        candidates: String,

        /// Packaging/OCR text for the language signal
        #[arg(short, long)]
        text: Option<String>,

        /// Whether the brand is known to be ambiguous (bare flag means true)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        brand_ambiguous: Option<bool>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run benchmark against a cases file
    Benchmark {
        /// Path to a JSON array of labelled cases
        #[arg(short, long)]
        cases: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check the Supabase cache
    CacheHealth {
        /// Supabase URL (defaults to SUPABASE_URL)
        #[arg(long)]
        supabase_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ownerlens=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    match cli.command {
        Commands::Canonicalize { name, country } => run_canonicalize(&name, country.as_deref()),
        Commands::Detect { text } => run_detect(&text)?,
        Commands::Key {
            pipeline,
            brand,
            product,
            barcode,
            locale,
            cache_version,
        } => {
            let input = LookupInput {
                brand,
                product_name: product,
                barcode,
            };
            let key = generate_cache_key(&pipeline, &input, locale.as_deref(), &cache_version)?;
            println!("{}", key);
        }
        Commands::Score {
            candidates,
            text,
            brand_ambiguous,
            format,
        } => {
            run_score(&config, &candidates, text.as_deref(), brand_ambiguous, &format)?;
        }
        Commands::Benchmark { cases, format } => {
            run_benchmark(&config, &cases, &format)?;
        }
        Commands::CacheHealth { supabase_url } => {
            run_cache_health(supabase_url).await?;
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides.
fn load_config(cli: &Cli) -> DisambigConfig {
    let mut config = DisambigConfig::from_env();
    if let Some(v) = cli.strong_threshold {
        config = config.with_strong_threshold(v);
    }
    if let Some(v) = cli.weak_threshold {
        config = config.with_weak_threshold(v);
    }
    if let Some(v) = cli.min_gap {
        config = config.with_min_gap(v);
    }
    config
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(Path::new(path)).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))
}

fn run_canonicalize(name: &str, country: Option<&str>) {
    let canonicalizer = ownerlens_canonical::builtin();

    println!("Canonical: {}", canonicalizer.canonicalize(name));
    match canonicalizer.resolve_sub_brand_to_parent(name) {
        Some(parent) => println!("Parent:    {}", parent),
        None => println!("Parent:    (not a known sub-brand)"),
    }
    if let Some(country) = country {
        println!("Key:       {}", canonicalizer.make_entity_key(name, country));
    }
}

fn run_detect(text: &str) -> Result<()> {
    let detection = ownerlens_signals::detect(text);
    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

fn run_score(
    config: &DisambigConfig,
    path: &str,
    text: Option<&str>,
    brand_ambiguous: Option<bool>,
    format: &str,
) -> Result<()> {
    let candidates: Vec<DisambiguationCandidate> = read_json(path)?;
    let signal = text.map(ownerlens_signals::detect);

    let scorer = DisambiguationScorer::with_builtin_clusters(*config);
    let decision = scorer.decide(&candidates, signal.as_ref(), brand_ambiguous);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    println!("Candidates: {}", candidates.len());
    if let Some(signal) = &signal {
        println!(
            "Language: {} ({}, {})",
            signal.dominant, signal.cluster, signal.strength
        );
    }
    println!("---");

    if let Some(scoring) = &decision.scoring {
        for (i, scored) in scoring.candidates.iter().enumerate() {
            println!(
                "\n{}. {} [{}] ({})",
                i + 1,
                scored.candidate.name,
                scored.candidate.id,
                scored.candidate.country
            );
            println!(
                "   Final Score: {:.3} | Confidence: {:.3} | Modifier: {:.2}",
                scored.final_score,
                scored.candidate.unit_confidence(),
                scored.language_modifier
            );
            println!("   {}", explain_rationale(scored.language_rationale));
        }

        println!("\nGap: {:.3}", scoring.score_gap);
        for explanation in explain_result(scoring) {
            println!("   - {}: {}", explanation.summary, explanation.detail);
        }
    }

    println!("\n---");
    println!("{}", summarize_decision(&decision));

    Ok(())
}

fn run_benchmark(config: &DisambigConfig, path: &str, format: &str) -> Result<()> {
    let cases: Vec<benchmark::BenchmarkCase> = read_json(path)?;
    let scorer = DisambiguationScorer::with_builtin_clusters(*config);

    let reports: Vec<_> = cases
        .iter()
        .map(|case| benchmark::run_case(&scorer, case))
        .collect();
    let summary = benchmark::summarize(&reports);
    tracing::info!(
        total = summary.total,
        wrong_accept_rate = summary.wrong_accept_rate,
        ambiguous_trigger_rate = summary.ambiguous_trigger_rate,
        "benchmark complete"
    );

    if format == "json" {
        let out = serde_json::json!({ "cases": reports, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Total brands tested: {}", summary.total);
        println!("Ambiguous trigger rate: {:.1}%", summary.ambiguous_trigger_rate * 100.0);
        println!("Wrong accept rate: {:.1}%", summary.wrong_accept_rate * 100.0);
        println!("Correct accept rate: {:.1}%", summary.correct_accept_rate * 100.0);
        println!("Abstain rate: {:.1}%", summary.abstain_rate * 100.0);
        println!("---");

        for report in &reports {
            println!(
                "{} ({:?}): {} - {} options, gap: {:.3}",
                report.brand,
                report.kind,
                if report.accepted { "ACCEPTED" } else { "DISAMBIGUATED" },
                report.options,
                report.gap
            );
            if !report.rules.is_empty() {
                println!("  Rules: {}", report.rules.join(", "));
            }
        }
    }

    if !summary.passed() {
        for failure in &summary.failures {
            eprintln!("FAILED: {}", failure);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_cache_health(supabase_url: Option<String>) -> Result<()> {
    let mut config = SupabaseConfig::from_env();
    if let Some(url) = supabase_url {
        config.base_url = url;
    }
    let store = SupabaseStore::new(config)?;

    print!("Checking {} store... ", store.name());

    let result = match store.health_check().await {
        Ok(()) => probe(&store).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}
