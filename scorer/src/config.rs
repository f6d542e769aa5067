use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::lexicon::LexiconConfig;
use crate::store::StoreConfig;

/// Weights of the content-based terms and the hybrid blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub skills_weight: f64,
    pub location_weight: f64,
    pub company_weight: f64,
    pub job_type_weight: f64,
    pub salary_weight: f64,
    /// Salary closeness used when either side has no salary data.
    pub neutral_salary_match: f64,
    pub content_blend: f64,
    pub collaborative_blend: f64,
    /// Neighbors must be strictly more similar than this.
    pub min_similarity: f64,
    pub max_neighbors: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            skills_weight: 0.4,
            location_weight: 0.25,
            company_weight: 0.15,
            job_type_weight: 0.10,
            salary_weight: 0.10,
            neutral_salary_match: 0.5,
            content_blend: 0.6,
            collaborative_blend: 0.4,
            min_similarity: 0.1,
            max_neighbors: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub scoring: ScoringConfig,
    pub lexicon: LexiconConfig,
    pub store: StoreConfig,
}

impl RecommenderConfig {
    /// Load from a JSON file; absent keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
