use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{parser, ActorId, DirectoryStore};
use driver::{load_artifacts, BatchJob, JobConfig, JobReport, ResolvedRecommendation};
use pipeline::{FilterReport, InteractionFilter};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// SeriousRecs - Game recommendations from serious players
#[derive(Parser)]
#[command(name = "serious-recs")]
#[command(about = "Game recommender trained on serious-player reviews with ALS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, train, evaluate and write all artifacts
    Train {
        /// Review CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for mappings, recommendations, model and report
        #[arg(short, long, default_value = "artifacts")]
        output: PathBuf,

        /// JSON job config; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Latent factor rank
        #[arg(long)]
        rank: Option<usize>,

        /// ALS iterations
        #[arg(long)]
        iterations: Option<usize>,

        /// Regularization λ
        #[arg(long)]
        regularization: Option<f64>,

        /// Recommendations kept per game
        #[arg(long)]
        top_k: Option<usize>,

        /// Seed for factor initialisation and the holdout split
        #[arg(long)]
        seed: Option<u64>,

        /// Share of ratings held out for evaluation
        #[arg(long)]
        holdout: Option<f64>,
    },

    /// Run only the interaction filter and print its report
    Filter {
        /// Review CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// JSON job config (only the filter section is used)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recommendations from a trained artifact directory
    Recommend {
        /// Directory written by `train`
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Game name: list the players it should be recommended to
        #[arg(long, conflicts_with = "actor", required_unless_present = "actor")]
        item: Option<String>,

        /// Player id: list games for this player
        #[arg(long)]
        actor: Option<ActorId>,

        /// Number of recommendations to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            input,
            output,
            config,
            rank,
            iterations,
            regularization,
            top_k,
            seed,
            holdout,
        } => {
            let mut job = load_config(config.as_deref())?;
            if let Some(rank) = rank {
                job.als.rank = rank;
            }
            if let Some(iterations) = iterations {
                job.als.iterations = iterations;
            }
            if let Some(regularization) = regularization {
                job.als.regularization = regularization;
            }
            if let Some(top_k) = top_k {
                job.top_k = top_k;
            }
            if let Some(seed) = seed {
                job.als.seed = Some(seed);
                job.split_seed = Some(seed);
            }
            if let Some(holdout) = holdout {
                job.holdout_fraction = holdout;
            }
            handle_train(&input, output, job)?
        }
        Commands::Filter { input, config } => {
            let job = load_config(config.as_deref())?;
            handle_filter(&input, job)?
        }
        Commands::Recommend {
            artifacts,
            item,
            actor,
            limit,
        } => handle_recommend(&artifacts, item, actor, limit)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<JobConfig> {
    match path {
        Some(path) => JobConfig::from_json_file(path),
        None => Ok(JobConfig::default()),
    }
}

fn load_reviews(input: &Path) -> Result<Vec<data_loader::InteractionRecord>> {
    println!("Loading reviews from {}...", input.display());
    let start = Instant::now();
    let records = parser::read_reviews(input)
        .with_context(|| format!("Failed to load reviews from {}", input.display()))?;
    println!(
        "{} Loaded {} reviews in {:?}",
        "✓".green(),
        records.len(),
        start.elapsed()
    );
    Ok(records)
}

/// Handle the 'train' command
fn handle_train(input: &Path, output: PathBuf, config: JobConfig) -> Result<()> {
    debug!("Job config: {:?}", config);
    let records = load_reviews(input)?;

    let job = BatchJob::new(config, DirectoryStore::new(output.clone()));
    let report = job.run(records)?;

    print_filter_report(&report.filter);
    print_job_report(&report);
    println!(
        "{} Artifacts written to {}",
        "✓".green(),
        output.display()
    );
    Ok(())
}

/// Handle the 'filter' command
fn handle_filter(input: &Path, config: JobConfig) -> Result<()> {
    let records = load_reviews(input)?;
    let outcome = InteractionFilter::new(config.filter)
        .run(records)
        .context("Interaction filter failed")?;
    print_filter_report(&outcome.report);
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    artifacts: &Path,
    item: Option<String>,
    actor: Option<ActorId>,
    limit: usize,
) -> Result<()> {
    let loaded = load_artifacts(&DirectoryStore::new(artifacts))
        .with_context(|| format!("Failed to load artifacts from {}", artifacts.display()))?;

    match (item, actor) {
        (Some(name), _) => {
            let recs = loaded.actors_for_item(&name, limit)?;
            print_recommendations(&format!("Players for '{name}'"), &recs);
        }
        (None, Some(actor_id)) => {
            let recs = loaded.items_for_actor(actor_id, limit)?;
            print_recommendations(&format!("Games for player {actor_id}"), &recs);
        }
        (None, None) => bail!("Pass --item or --actor"),
    }
    Ok(())
}

fn print_filter_report(report: &FilterReport) {
    println!("{}", "Interaction filter:".bold().blue());
    println!("{}Input rows: {}", "• ".green(), report.input_rows);
    for stage in &report.stages {
        println!(
            "  - {}: {} -> {}",
            stage.stage, stage.input, stage.output
        );
    }
    println!("{}Popular games: {}", "• ".green(), report.popular_items);
    println!(
        "{}Playtime quartiles: Q1 {:.1}, Q3 {:.1} (bounds {:.1} to {:.1})",
        "• ".green(),
        report.quartiles.q1,
        report.quartiles.q3,
        report.playtime_bounds.0,
        report.playtime_bounds.1
    );
    println!(
        "{}Mean playtime {:.1}, serious floor {:.1}",
        "• ".green(),
        report.mean_playtime,
        report.serious_floor
    );
    println!(
        "{}Invalid actor rows dropped: {}",
        "• ".green(),
        report.invalid_actor_rows
    );
    for warning in &report.warnings {
        println!("{}{:?}", "! ".yellow(), warning);
    }
    println!("{}Serious interactions: {}", "• ".green(), report.output_rows);
}

fn print_job_report(report: &JobReport) {
    println!("{}", "Model:".bold().blue());
    println!(
        "{}{} players x {} games, {} training ratings",
        "• ".cyan(),
        report.actors,
        report.items,
        report.train_ratings
    );
    if report.cold_start_actors > 0 || report.cold_start_items > 0 {
        println!(
            "{}Cold start: {} players, {} games",
            "! ".yellow(),
            report.cold_start_actors,
            report.cold_start_items
        );
    }
    print_rmse("Training RMSE", report.train.rmse);
    if let Some(holdout) = &report.holdout {
        print_rmse("Holdout RMSE", holdout.rmse);
        println!(
            "  ({} scored, {} skipped as cold start)",
            holdout.evaluated, holdout.skipped_cold_start
        );
    }
    println!(
        "{}Recommendation lists: {}",
        "• ".cyan(),
        report.recommendation_lists
    );
}

fn print_rmse(label: &str, rmse: Option<f64>) {
    match rmse {
        Some(rmse) => println!("{}{}: {:.4}", "• ".cyan(), label, rmse),
        None => println!("{}{}: n/a", "• ".cyan(), label),
    }
}

fn print_recommendations<K: Display>(header: &str, recs: &[ResolvedRecommendation<K>]) {
    println!("{}", format!("{header}:").bold().blue());
    if recs.is_empty() {
        println!("  (none)");
    }
    for rec in recs {
        println!(
            "{}. {} - Score: {:.3}",
            rec.rank.to_string().green(),
            rec.target,
            rec.score
        );
    }
}
