//! Scorer: deterministic relevance score for one (student, posting) pair.
//!
//! score = w_skill·skill_match + w_interest·interest_alignment + w_experience·experience_synergy,
//! clamped to [0.0, 1.0]. Each sub-signal is a Jaccard overlap between two
//! normalized term sets. Weights default to 0.5 / 0.3 / 0.2 and are tunable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::posting::Posting;
use crate::models::profile::StudentProfile;
use crate::recommendation::normalizer::{normalize_list, KeywordExtractor, TermSet};

/// The three sub-signals, in tie-break priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    SkillMatch,
    InterestAlignment,
    ExperienceSynergy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub skill: f64,
    pub interest: f64,
    pub experience: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill: 0.5,
            interest: 0.3,
            experience: 0.2,
        }
    }
}

impl ScoringWeights {
    /// Returns the name of the first weight that is not finite or falls outside [0, 1].
    pub fn invalid_weight(&self) -> Option<&'static str> {
        [
            ("skill", self.skill),
            ("interest", self.interest),
            ("experience", self.experience),
        ]
        .into_iter()
        .find(|(_, w)| !w.is_finite() || !(0.0..=1.0).contains(w))
        .map(|(name, _)| name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized inputs
// ────────────────────────────────────────────────────────────────────────────

/// Student side of the comparison, normalized once per ranking call.
#[derive(Debug, Clone, Default)]
pub struct ProfileTerms {
    pub skills: TermSet,
    pub interests: TermSet,
    /// Keywords from past experience and academic achievements combined.
    pub background: TermSet,
}

impl ProfileTerms {
    pub fn from_profile(profile: &StudentProfile, extractor: &dyn KeywordExtractor) -> Self {
        let mut background = extractor.extract_keywords(&profile.past_experiences);
        background.extend(extractor.extract_keywords(&profile.academic_achievements));

        Self {
            skills: normalize_list(profile.skill_names()),
            interests: normalize_list(profile.interests.iter().map(String::as_str)),
            background,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.interests.is_empty() && self.background.is_empty()
    }
}

/// Posting side of the comparison, normalized once per posting.
#[derive(Debug, Clone, Default)]
pub struct PostingTerms {
    pub required_skills: TermSet,
    /// Domain keywords extracted from the description.
    pub keywords: TermSet,
}

impl PostingTerms {
    pub fn from_posting(posting: &Posting, extractor: &dyn KeywordExtractor) -> Self {
        Self {
            required_skills: normalize_list(posting.required_skills.iter().map(String::as_str)),
            keywords: extractor.extract_keywords(&posting.description),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scores
// ────────────────────────────────────────────────────────────────────────────

/// One sub-signal value plus the terms both sides share, in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalScore {
    pub value: f64,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    pub score: f64,
    pub skill_match: SignalScore,
    pub interest_alignment: SignalScore,
    pub experience_synergy: SignalScore,
    /// Sub-signal with the largest weighted contribution; `None` when nothing overlaps.
    pub top_signal: Option<Signal>,
}

impl PairScore {
    pub fn signal(&self, signal: Signal) -> &SignalScore {
        match signal {
            Signal::SkillMatch => &self.skill_match,
            Signal::InterestAlignment => &self.interest_alignment,
            Signal::ExperienceSynergy => &self.experience_synergy,
        }
    }
}

/// |a ∩ b| / |a ∪ b|. Zero when either side is empty.
pub fn jaccard(a: &TermSet, b: &TermSet) -> SignalScore {
    if a.is_empty() || b.is_empty() {
        return SignalScore::default();
    }

    let matched: Vec<String> = a.intersection(b).cloned().collect();
    let union = a.len() + b.len() - matched.len();

    SignalScore {
        value: matched.len() as f64 / union as f64,
        matched,
    }
}

/// Scores one pair. Never fails: an empty side drives its sub-signal to 0.
pub fn score_pair(
    profile: &ProfileTerms,
    posting: &PostingTerms,
    weights: &ScoringWeights,
) -> PairScore {
    let skill_match = jaccard(&profile.skills, &posting.required_skills);
    let interest_alignment = jaccard(&profile.interests, &posting.keywords);
    let experience_synergy = jaccard(&profile.background, &posting.keywords);

    if posting.required_skills.is_empty() || posting.keywords.is_empty() {
        debug!(
            "Degraded signal: posting has {} required skills and {} description keywords",
            posting.required_skills.len(),
            posting.keywords.len()
        );
    }

    // Fixed summation order keeps the result bit-identical across calls.
    let contributions = [
        (Signal::SkillMatch, weights.skill * skill_match.value),
        (Signal::InterestAlignment, weights.interest * interest_alignment.value),
        (Signal::ExperienceSynergy, weights.experience * experience_synergy.value),
    ];
    let score = (contributions[0].1 + contributions[1].1 + contributions[2].1).clamp(0.0, 1.0);

    PairScore {
        score,
        skill_match,
        interest_alignment,
        experience_synergy,
        top_signal: top_signal(&contributions),
    }
}

/// Largest positive contribution wins; earlier signals win exact ties.
fn top_signal(contributions: &[(Signal, f64)]) -> Option<Signal> {
    let mut best: Option<(Signal, f64)> = None;
    for &(signal, contribution) in contributions {
        if contribution <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_contribution)) if contribution <= best_contribution => {}
            _ => best = Some((signal, contribution)),
        }
    }
    best.map(|(signal, _)| signal)
}
