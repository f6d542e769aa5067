use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scorer::dataset::{read_records, Dataset};
use scorer::{Interaction, RecommendationMethod, Recommender, RecommenderConfig};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Rank jobs for a user from a dataset directory", long_about = None)]
struct Cli {
    /// Optional JSON recommender config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend jobs for one user
    Recommend {
        /// Dataset directory or file
        #[arg(long)]
        data: PathBuf,
        /// User to recommend for
        #[arg(long)]
        user: String,
        /// content-based, collaborative, popular or hybrid
        #[arg(long, default_value = "hybrid")]
        method: RecommendationMethod,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Extra interactions (JSON/JSONL) for the user, appended to the dataset's
        #[arg(long)]
        interactions: Option<PathBuf>,
        /// Print the explanation sentence for the method
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
    /// List the most viewed jobs
    Popular {
        #[arg(long)]
        data: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    user_id: Option<&'a str>,
    method: RecommendationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    results: Vec<scorer::Recommendation>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RecommenderConfig::from_file(path)?,
        None => RecommenderConfig::default(),
    };
    let mut recommender = Recommender::new(config);
    let readiness = recommender.initialize();
    if !readiness.is_ready() {
        tracing::warn!(?readiness, "continuing with popular fallback for content scoring");
    }

    match cli.command {
        Commands::Recommend { data, user, method, limit, interactions, explain } => {
            let dataset = Dataset::load(&data)?;
            let mut history: Vec<Interaction> =
                dataset.interactions_by_user().remove(user.as_str()).unwrap_or_default();
            if let Some(path) = interactions {
                let extra: Vec<Interaction> =
                    read_records(&path).with_context(|| format!("loading interactions from {}", path.display()))?;
                history.extend(extra);
            }
            dataset.populate_jobs(&mut history);
            recommender.update_user_profile(&user, &history);

            let results = recommender.recommend(&user, method, &dataset.jobs, &dataset.applications, limit);
            let explanation = explain.then(|| recommender.get_recommendation_explanation(&user, "", method.as_str()));
            print_json(&Output { user_id: Some(&user), method, explanation, results })
        }
        Commands::Popular { data, limit } => {
            let dataset = Dataset::load(&data)?;
            let results = recommender.get_popular_jobs(&dataset.jobs, limit);
            print_json(&Output { user_id: None, method: RecommendationMethod::Popular, explanation: None, results })
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
