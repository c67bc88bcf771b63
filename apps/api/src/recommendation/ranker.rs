//! Filter & Ranker: applies the relevance threshold, orders survivors, and
//! shapes the annotated output.

use serde::{Deserialize, Serialize};

use crate::models::posting::Posting;
use crate::recommendation::scorer::{PairScore, Signal};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A posting paired with its score, before filtering.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub posting: Posting,
    pub pair: PairScore,
}

/// Per-signal values behind a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub skill_match: f64,
    pub interest_alignment: f64,
    pub experience_synergy: f64,
    pub top_signal: Option<Signal>,
}

impl From<&PairScore> for ScoreBreakdown {
    fn from(pair: &PairScore) -> Self {
        Self {
            skill_match: pair.skill_match.value,
            interest_alignment: pair.interest_alignment.value,
            experience_synergy: pair.experience_synergy.value,
            top_signal: pair.top_signal,
        }
    }
}

/// A recommended posting: the input posting, untouched, plus its score and
/// a short justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub relevance_score: f64,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
}

impl ScoredPosting {
    pub fn new(candidate: Candidate, reason: String) -> Self {
        Self {
            relevance_score: candidate.pair.score,
            breakdown: ScoreBreakdown::from(&candidate.pair),
            posting: candidate.posting,
            reason,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Filter & sort
// ────────────────────────────────────────────────────────────────────────────

/// Keeps candidates scoring strictly above `threshold` and sorts them
/// descending by score. `sort_by` is stable, so exact ties keep input order.
pub fn filter_and_sort(candidates: Vec<Candidate>, threshold: f64) -> Vec<Candidate> {
    let mut survivors: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.pair.score > threshold)
        .collect();

    survivors.sort_by(|a, b| b.pair.score.total_cmp(&a.pair.score));
    survivors
}
