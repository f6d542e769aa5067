use anyhow::{Context, Result};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\p{L}[\p{L}\p{N}_'+#.]*";

const STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","cannot","could","did","do","does","doing","down","during",
    "each","few","for","from","further","had","has","have","having","he","her","here","hers","him","his","how",
    "i","if","in","into","is","it","its","itself","me","more","most","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","our","ours","out","over","own",
    "same","she","should","so","some","such","than","that","the","their","theirs","them","then","there","these","they","this","those","through","to","too",
    "under","until","up","very","was","we","were","what","when","where","which","while","who","whom","why","with","would",
    "you","your","yours",
    // job-title filler
    "job","role","position","opening","opportunity","wanted","hiring","remote","full","time","part",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub token_pattern: String,
    pub extra_stopwords: Vec<String>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self { token_pattern: DEFAULT_TOKEN_PATTERN.to_string(), extra_stopwords: Vec::new() }
    }
}

/// Lexical helper shared by profile building and content scoring.
pub struct Lexicon {
    re: Regex,
    stemmer: Stemmer,
    stopwords: HashSet<String>,
}

impl Lexicon {
    pub fn new(config: &LexiconConfig) -> Result<Self> {
        let re = Regex::new(&config.token_pattern)
            .with_context(|| format!("invalid token pattern '{}'", config.token_pattern))?;
        let stopwords = STOPWORDS
            .iter()
            .map(|w| w.to_string())
            .chain(config.extra_stopwords.iter().map(|w| normalize_basic(w)))
            .collect();
        Ok(Self { re, stemmer: Stemmer::create(Algorithm::English), stopwords })
    }

    pub fn normalize(&self, text: &str) -> String { normalize_basic(text) }

    fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    /// Tokenize text into (stem, position), skipping stopwords.
    pub fn tokenize(&self, text: &str) -> Vec<(String, usize)> {
        let normalized = self.normalize(text);
        let mut tokens = Vec::new();
        for (pos, mat) in self.re.find_iter(&normalized).enumerate() {
            let token = mat.as_str().trim_end_matches('.');
            if token.is_empty() || self.is_stopword(token) { continue; }
            tokens.push((self.stemmer.stem(token).to_string(), pos));
        }
        tokens
    }

    pub fn keywords(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|(w, _)| w).collect()
    }
}

/// NFKC fold, lowercase, and collapse inner whitespace. Shared by profile
/// building and scoring whether or not a lexicon is loaded.
pub fn normalize_basic(text: &str) -> String {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
