use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use quizbank::import::{apply_import, parse_categories, ImportReport};
use quizbank::model::Database;
use quizbank::replace::{apply_replacements, load_mapping, validate, ReplacementMap};

#[derive(Parser)]
#[command(author, version, about = "Maintain a JSON-backed quiz content database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Repair a near-JSON category export and import it into the database
    Import {
        /// Path to the raw category export (near-JSON text)
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the target database document
        #[arg(short, long)]
        db: PathBuf,

        /// Version string stamped on the database after import
        #[arg(long, default_value = "2.2.0")]
        set_version: String,

        /// lastUpdated date stamped after import [default: today]
        #[arg(long)]
        set_date: Option<String>,
    },
    /// Replace category questions from the sources named in a mapping table
    Replace {
        /// Path to the target database document
        #[arg(short, long)]
        db: PathBuf,

        /// Path to the mapping table (JSON array of
        /// { "topic": ..., "source": ..., "key": ... }); source paths are
        /// resolved relative to this file
        #[arg(short, long)]
        mapping: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Command::Import {
            input,
            db,
            set_version,
            set_date,
        } => run_import(&input, &db, &set_version, set_date),
        Command::Replace { db, mapping } => run_replace(&db, &mapping),
    }
}

fn run_import(input: &Path, db_path: &Path, version: &str, date: Option<String>) -> Result<()> {
    println!("Reading {}...", input.display());
    let raw = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    println!("File size: {} characters", raw.chars().count());

    println!("Repairing and parsing...");
    let categories = parse_categories(&raw)?;

    let report = ImportReport::new(&categories);
    println!("Found {} categories", categories.len());
    for (id, count) in &report.counts {
        println!("  - {}: {} questions", id, count);
    }
    println!("Total questions: {}", report.total);

    let mut database = Database::load(db_path)?;
    let date = date.unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
    apply_import(&mut database, categories, version, &date);
    database.save(db_path)?;

    println!(
        "Updated {} with {} categories:",
        db_path.display(),
        database.quiz_categories.len()
    );
    for (i, category) in database.quiz_categories.iter().enumerate() {
        println!("  {}. {}", i + 1, category.name);
    }
    Ok(())
}

fn run_replace(db_path: &Path, mapping_path: &Path) -> Result<()> {
    let entries = load_mapping(mapping_path)?;
    let base = mapping_path.parent().unwrap_or_else(|| Path::new("."));
    let map = ReplacementMap::load(&entries, base)?;

    let mut database = Database::load(db_path)?;
    let issues = validate(&database, &map);
    if !issues.is_empty() {
        println!("{} mapping issue(s), see warnings above", issues.len());
    }

    let summary = apply_replacements(&mut database, &map);
    database.save(db_path)?;

    println!(
        "Questions updated successfully! ({} topic(s) replaced, {} untouched)",
        summary.replaced.len(),
        summary.untouched
    );
    Ok(())
}
