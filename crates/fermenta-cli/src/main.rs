use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fermenta_core::{
    AppConfig, BeerAction, Database, DuplicateFinder, GroupPlan, MergeReport, Unifier,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "fermenta-dedup",
    about = "Merge breweries that differ only by name variations into one record",
    version,
    long_about = None
)]
struct Cli {
    /// Print the merge plan without changing the database.
    #[arg(long)]
    dry_run: bool,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting FERMENTA_JSON=1.
    #[arg(long)]
    json: bool,

    /// Database file to operate on. Overrides the config file and FERMENTA_DATABASE.
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_logging();

    let json_output = cli.json || std::env::var("FERMENTA_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load().context("failed to load config")?;
    let mut explicit_path = false;
    if let Ok(db_path) = std::env::var("FERMENTA_DATABASE") {
        config.set_database_path(db_path.into());
        explicit_path = true;
    }
    if let Some(db_path) = cli.database {
        config.set_database_path(db_path);
        explicit_path = true;
    }

    let db = open_db(&config, explicit_path)?;
    let unifier = Unifier::new(&db).with_finder(DuplicateFinder::from_config(&config.dedup));

    if cli.dry_run {
        let plans = unifier.plan().context("failed to plan brewery merge")?;
        let dur = start.elapsed().as_millis();

        if json_output {
            print_json(&serde_json::json!({
                "status": "ok",
                "data": { "dry_run": true, "groups": plans },
                "meta": { "duration_ms": dur }
            }))?;
        } else {
            print_plans(&plans);
        }
    } else {
        let report = unifier.run().context("brewery merge aborted")?;
        let dur = start.elapsed().as_millis();

        if json_output {
            print_json(&serde_json::json!({
                "status": "ok",
                "data": report,
                "meta": { "duration_ms": dur }
            }))?;
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the database, creating it only at the configured default location.
/// A path given on the command line or in FERMENTA_DATABASE must exist.
fn open_db(config: &AppConfig, must_exist: bool) -> Result<Database> {
    let db_path = config.database_path();
    if must_exist && !db_path.is_file() {
        bail!("database not found at {}", db_path.display());
    }
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_plans(plans: &[GroupPlan]) {
    if plans.is_empty() {
        println!("No duplicate breweries found.");
        return;
    }

    println!("Found {} duplicate groups (dry run, nothing written):", plans.len());
    for plan in plans {
        println!();
        println!("  keep  #{:<6} {}", plan.canonical.id, plan.canonical.name);
        for duplicate in &plan.duplicates {
            println!("  drop  #{:<6} {}", duplicate.id, duplicate.name);
        }
        for action in &plan.actions {
            match action {
                BeerAction::Reparent { beer_id, name, from_brewery_id } => {
                    println!("    move    beer #{beer_id} \"{name}\" from #{from_brewery_id}");
                }
                BeerAction::Discard { beer_id, name, kept_beer_id, .. } => {
                    println!("    discard beer #{beer_id} \"{name}\" (keeping #{kept_beer_id})");
                }
            }
        }
    }

    let transfers: usize = plans.iter().map(GroupPlan::transfers).sum();
    let discards: usize = plans.iter().map(GroupPlan::discards).sum();
    let breweries: usize = plans.iter().map(|p| p.duplicates.len()).sum();
    println!();
    println!(
        "Would transfer {transfers} beers, discard {discards} beers, \
         eliminate {breweries} breweries."
    );
}

fn print_report(report: &MergeReport) {
    if report.groups_found == 0 {
        println!("No duplicate breweries found.");
        return;
    }

    println!("Duplicate groups found: {}", report.groups_found);
    println!("Groups merged:          {}", report.groups_merged);
    println!("Beers transferred:      {}", report.beers_transferred);
    println!("Beers discarded:        {}", report.beers_discarded);
    println!("Breweries eliminated:   {}", report.breweries_deleted);

    if !report.is_clean() {
        println!();
        println!("{} groups were rolled back and need a re-run:", report.failed_groups());
        for failure in &report.failures {
            println!(
                "  #{} {} (failed on #{}): {}",
                failure.canonical_id, failure.canonical_name, failure.brewery_id, failure.message
            );
        }
    }
}
