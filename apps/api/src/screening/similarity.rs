//! Similarity Ranker — TF-IDF vectors and cosine similarity against the JD.
//!
//! Algorithm:
//! 1. Tokenize every text: lowercase, tokens are runs of ≥2 word characters.
//! 2. Fit document frequencies over the corpus. By default the corpus is
//!    `{job description, resume₁ … resumeₙ}`, so the JD's own vocabulary
//!    takes part in IDF weighting.
//! 3. Smoothed IDF: `ln((1 + n) / (1 + df)) + 1`.
//! 4. Weight = raw count × IDF; score = cosine(JD vector, resume vector).

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

#[derive(Debug, Error)]
pub enum RankError {
    #[error("No valid resumes to rank")]
    EmptyBatch,

    #[error("Empty vocabulary: the job description and resumes contain no terms")]
    EmptyVocabulary,

    #[error("Score count mismatch: {documents} documents, {scores} scores")]
    ScoreCountMismatch { documents: usize, scores: usize },
}

/// Which texts contribute to document frequencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfMode {
    /// The job description is a corpus member alongside the resumes.
    #[default]
    QueryInCorpus,
    /// Frequencies come from the resumes alone; the job description is
    /// projected onto their vocabulary afterwards.
    DocumentsOnly,
}

impl FromStr for IdfMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query_in_corpus" => Ok(IdfMode::QueryInCorpus),
            "documents_only" => Ok(IdfMode::DocumentsOnly),
            other => Err(format!(
                "unknown IDF mode '{other}' (expected query_in_corpus or documents_only)"
            )),
        }
    }
}

// Ordered maps keep every float reduction in term order, so equal inputs
// produce bit-identical scores.
type TermCounts = BTreeMap<String, u32>;

/// Lowercases `text` and splits it into tokens of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn term_counts(text: &str) -> TermCounts {
    let mut counts = TermCounts::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Sparse, weighted term vector.
#[derive(Debug, Clone, Default)]
pub struct TermVector(BTreeMap<String, f64>);

impl TermVector {
    pub fn magnitude(&self) -> f64 {
        self.0.values().fold(0.0, |acc, w| acc + w * w).sqrt()
    }

    pub fn dot(&self, other: &TermVector) -> f64 {
        let (small, large) = if self.0.len() <= other.0.len() {
            (&self.0, &other.0)
        } else {
            (&other.0, &self.0)
        };
        small
            .iter()
            .filter_map(|(term, w)| large.get(term).map(|v| w * v))
            .fold(0.0, |acc, x| acc + x)
    }
}

/// `dot(a, b) / (|a| · |b|)`, or 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let denom = a.magnitude() * b.magnitude();
    if denom == 0.0 {
        return 0.0;
    }
    let score = a.dot(b) / denom;
    if score > 0.0 {
        score.min(1.0)
    } else {
        0.0
    }
}

/// IDF table fitted over one corpus.
#[derive(Debug)]
struct TfIdfModel {
    idf: HashMap<String, f64>,
}

impl TfIdfModel {
    fn fit<'a>(corpus: impl IntoIterator<Item = &'a TermCounts>) -> Result<Self, RankError> {
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut n = 0usize;
        for counts in corpus {
            n += 1;
            for term in counts.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if df.is_empty() {
            return Err(RankError::EmptyVocabulary);
        }

        let n = n as f64;
        let idf = df
            .into_iter()
            .map(|(term, df)| {
                let weight = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
                (term.to_string(), weight)
            })
            .collect();

        Ok(TfIdfModel { idf })
    }

    /// Terms outside the fitted vocabulary are dropped.
    fn transform(&self, counts: &TermCounts) -> TermVector {
        TermVector(
            counts
                .iter()
                .filter_map(|(term, &tf)| self.idf.get(term).map(|idf| (term.clone(), tf as f64 * idf)))
                .collect(),
        )
    }
}

/// Scores each document against `query`, positionally aligned to `documents`.
///
/// An empty batch returns no scores without fitting anything.
pub fn rank<S: AsRef<str>>(
    query: &str,
    documents: &[S],
    mode: IdfMode,
) -> Result<Vec<f64>, RankError> {
    if documents.is_empty() {
        return Ok(Vec::new());
    }

    let query_counts = term_counts(query);
    let doc_counts: Vec<TermCounts> = documents.iter().map(|d| term_counts(d.as_ref())).collect();

    let model = match mode {
        IdfMode::QueryInCorpus => TfIdfModel::fit(std::iter::once(&query_counts).chain(&doc_counts))?,
        IdfMode::DocumentsOnly => TfIdfModel::fit(&doc_counts)?,
    };
    debug!(
        "Fitted TF-IDF over {} terms ({:?}, {} documents)",
        model.idf.len(),
        mode,
        documents.len()
    );

    let query_vector = model.transform(&query_counts);
    Ok(doc_counts
        .iter()
        .map(|counts| cosine_similarity(&query_vector, &model.transform(counts)))
        .collect())
}
