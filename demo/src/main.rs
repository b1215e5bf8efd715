//! RXGUARD Clinical Safety Engine: demo CLI
//!
//! Enriches draft treatment recommendations against the drug knowledge base
//! and prints the result.
//!
//! Usage:
//!   cargo run -p demo -- scenarios
//!   cargo run -p demo -- enrich --draft draft.json --patient patient.json
//!   cargo run -p demo -- kb-stats --config rxguard.toml
//!   cargo run -p demo -- drug-class lisinopril

mod scenarios;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxguard_contracts::error::{SafetyError, SafetyResult};
use rxguard_engine::EnrichmentEngine;
use rxguard_knowledge::{drug_class_of, KnowledgeBaseProvider, RxguardConfig};
use rxguard_verify::{load_json, BoundaryVerifier};

// ── CLI definition ────────────────────────────────────────────────────────────

/// RXGUARD: deterministic safety checks for AI-drafted treatment plans.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "RXGUARD clinical safety engine demo",
    long_about = "Cross-checks draft treatment recommendations against drug interactions,\n\
                  contraindications and allergy cross-reactivity, then escalates risk."
)]
struct Cli {
    /// TOML configuration file. Without one, only the embedded dataset is used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in escalation scenarios against the embedded dataset.
    Scenarios,
    /// Enrich one draft for one patient and print the enriched analysis.
    Enrich {
        /// Draft recommendation JSON.
        #[arg(long)]
        draft: PathBuf,
        /// Patient profile JSON.
        #[arg(long)]
        patient: PathBuf,
        /// Print the enrichment report instead of the analysis.
        #[arg(long)]
        report: bool,
    },
    /// Show knowledge-base collection sizes and where they came from.
    KbStats,
    /// Look up the therapeutic class of a drug.
    DrugClass {
        name: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see every match decision.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Scenarios => {
            print_banner();
            scenarios::run_all()
        }
        Command::Enrich {
            draft,
            patient,
            report,
        } => run_enrich(cli.config.as_deref(), &draft, &patient, report),
        Command::KbStats => run_kb_stats(cli.config.as_deref()),
        Command::DrugClass { name } => {
            run_drug_class(&name);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn provider(config: Option<&Path>) -> SafetyResult<Arc<KnowledgeBaseProvider>> {
    let config = match config {
        Some(path) => RxguardConfig::from_file(path)?,
        None => RxguardConfig::default(),
    };
    Ok(Arc::new(KnowledgeBaseProvider::from_config(&config.knowledge_base)?))
}

fn run_enrich(
    config: Option<&Path>,
    draft: &Path,
    patient: &Path,
    report: bool,
) -> SafetyResult<()> {
    let verifier = BoundaryVerifier::new()?;
    let draft = verifier.parse_draft(&load_json(draft)?)?;
    let patient = verifier.parse_patient(&load_json(patient)?)?;

    let engine = EnrichmentEngine::new(provider(config)?);
    let outcome = engine.run(draft, &patient);
    verifier.check_enriched(&outcome.analysis)?;

    info!(run_id = %outcome.report.run_id, "enriched analysis verified");

    let rendered = if report {
        serde_json::to_string_pretty(&outcome.report)
    } else {
        serde_json::to_string_pretty(&outcome.analysis)
    }
    .map_err(|e| SafetyError::DraftParse {
        document: "enrichment output".to_string(),
        reason: e.to_string(),
    })?;

    println!("{rendered}");
    Ok(())
}

fn run_kb_stats(config: Option<&Path>) -> SafetyResult<()> {
    let provider = provider(config)?;
    // Resolve every collection so the origins are meaningful.
    provider.snapshot();
    let stats = provider.stats();

    println!("Knowledge base");
    println!("  Remote configured:   {}", stats.remote_configured);
    println!(
        "  Interactions:        {:>3}  ({:?})",
        stats.interactions, stats.origins.interactions
    );
    println!(
        "  Contraindications:   {:>3}  ({:?})",
        stats.contraindications, stats.origins.contraindications
    );
    println!(
        "  Allergy mappings:    {:>3}  ({:?})",
        stats.allergy_mappings, stats.origins.allergy_mappings
    );
    Ok(())
}

fn run_drug_class(name: &str) {
    match drug_class_of(name) {
        Some(class) => println!("{name}: {class}"),
        None => println!("{name}: unknown class"),
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("RXGUARD: Clinical Safety Enrichment Engine");
    println!("===========================================");
    println!();
    println!("Enrichment pipeline per draft:");
    println!("  [1] Interactions across current medications and the proposed drug");
    println!("  [2] Contraindications of the proposed drug for patient conditions");
    println!("  [3] Allergy cross-reactivity; a low-risk draft is raised to high (>= 75)");
    println!("  [4] Severity recount: absolute/contraindicated -> critical (>= 90),");
    println!("      more than one major interaction -> high (>= 70)");
    println!();
}
