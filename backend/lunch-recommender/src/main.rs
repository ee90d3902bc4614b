use anyhow::{bail, Context, Result};
use lunch_recommender::{Config, InMemoryMealStore, RecommendationEngine, TextNormalizer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

const USAGE: &str = "usage: lunch-recommender <snapshot.json> <user-id> [count]";

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("Failed to load config")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (snapshot_path, user_id, count) = match args.as_slice() {
        [snapshot, user] => (snapshot, user, config.recommender.default_count),
        [snapshot, user, count] => (
            snapshot,
            user,
            count
                .parse::<usize>()
                .with_context(|| format!("Invalid count: {}", count))?,
        ),
        _ => bail!(USAGE),
    };
    let user_id = Uuid::parse_str(user_id).with_context(|| format!("Invalid user id: {}", user_id))?;

    let normalizer = TextNormalizer::from_files(
        &config.resources.lemma_dictionary_path,
        &config.resources.stopwords_path,
    )
    .context("Failed to load linguistic resources")?;
    let store = InMemoryMealStore::from_json_file(snapshot_path)?;

    info!(
        snapshot = %snapshot_path,
        user_id = %user_id,
        count = count,
        "Computing recommendations"
    );

    let engine = RecommendationEngine::new(store, Arc::new(normalizer), config.recommender);
    let recommendations = engine.get_recommendations(user_id, count)?;

    println!("{}", serde_json::to_string_pretty(&recommendations)?);

    Ok(())
}
