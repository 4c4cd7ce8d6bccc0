//! Swarm mode: one independent crawl per seed
//!
//! Each seed gets its own engine, frontier and page limit. The engines run
//! concurrently and share a single cache so the cache limit holds across all
//! of them.

use crate::cache::CacheStore;
use crate::config::{validate, Config};
use crate::crawler::coordinator::{CrawlOutcome, Crawler};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of one engine in a swarm
#[derive(Debug, Clone)]
pub struct SwarmOutcome {
    pub seed: String,
    pub outcome: CrawlOutcome,
}

/// Runs one crawl per configured seed and waits for all of them
///
/// Results are returned in seed order. A configuration or cache fault that
/// prevents the swarm from starting is reported as a failure for every seed.
pub async fn crawl_swarm(config: Config) -> Vec<SwarmOutcome> {
    let fail_all = |config: &Config, reason: String| {
        config
            .seeds
            .iter()
            .map(|seed| SwarmOutcome {
                seed: seed.clone(),
                outcome: CrawlOutcome::Failed(reason.clone()),
            })
            .collect::<Vec<_>>()
    };

    if let Err(e) = validate(&config) {
        tracing::error!("Swarm not started: {}", e);
        return fail_all(&config, e.to_string());
    }

    let cache = match CacheStore::open(&config.cache_dir, config.cache_limit) {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            tracing::error!("Swarm not started: {}", e);
            return fail_all(&config, crate::SiftError::from(e).to_string());
        }
    };

    tracing::info!("Starting swarm of {} crawlers", config.seeds.len());

    let mut tasks = JoinSet::new();
    for (index, seed) in config.seeds.iter().enumerate() {
        let mut single = config.clone();
        single.seeds = vec![seed.clone()];
        // The report path would be overwritten by every engine
        single.summary_path = None;

        let mut crawler = Crawler::with_cache(single, Arc::clone(&cache));
        let seed = seed.clone();
        tasks.spawn(async move {
            let outcome = crawler.crawl().await;
            (index, SwarmOutcome { seed, outcome })
        });
    }

    let mut results: Vec<Option<SwarmOutcome>> = vec![None; config.seeds.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => results[index] = Some(outcome),
            Err(e) => tracing::error!("Swarm crawler task failed: {}", e),
        }
    }

    results
        .into_iter()
        .zip(config.seeds.iter())
        .map(|(result, seed)| {
            result.unwrap_or_else(|| SwarmOutcome {
                seed: seed.clone(),
                outcome: CrawlOutcome::Failed("crawler task aborted".to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_invalid_config_fails_every_seed() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(
            vec!["https://a.example/".to_string(), "https://b.example/".to_string()],
            0,
            1,
        );
        config.cache_dir = dir.path().join("cache");

        let results = crawl_swarm(config).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].seed, "https://a.example/");
        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, CrawlOutcome::Failed(_))));
    }
}
