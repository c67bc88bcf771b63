//! Reason annotation: short, human-readable justification per recommended posting.
//!
//! `TemplateReasonWriter` is pure string templating and the default.
//! `LlmReasonWriter` rephrases the templated reason through the LLM; any
//! failure, timeout or unusable reply falls back to the template. Scores and
//! order are settled before either writer runs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::llm_client::LlmClient;
use crate::models::profile::StudentProfile;
use crate::recommendation::normalizer::normalize_term;
use crate::recommendation::prompts::{reason_polish_system, REASON_POLISH_PROMPT_TEMPLATE};
use crate::recommendation::ranker::Candidate;
use crate::recommendation::scorer::Signal;

pub const MAX_REASON_WORDS: usize = 20;
const MAX_LISTED_FACTORS: usize = 3;
const MAX_CONCURRENT_POLISH: usize = 8;
const FALLBACK_REASON: &str = "Partially matches your profile.";

// ────────────────────────────────────────────────────────────────────────────
// Reason context
// ────────────────────────────────────────────────────────────────────────────

/// Everything a writer needs to justify one recommendation.
#[derive(Debug, Clone)]
pub struct ReasonContext {
    pub posting_id: String,
    pub title: String,
    pub organization: String,
    pub top_signal: Option<Signal>,
    /// Matching terms for the top signal, in display form.
    pub factors: Vec<String>,
    pub template: String,
}

impl ReasonContext {
    pub fn build(candidate: &Candidate, profile: &StudentProfile) -> Self {
        let top_signal = candidate.pair.top_signal;
        let factors = top_signal
            .map(|signal| matching_factors(signal, candidate, profile))
            .unwrap_or_default();

        Self {
            posting_id: candidate.posting.id.clone(),
            title: candidate.posting.title.clone(),
            organization: candidate.posting.organization.clone(),
            template: template_reason(top_signal, &factors),
            top_signal,
            factors,
        }
    }
}

/// Matching terms for `signal`, preferring the caller's own spelling:
/// skills as the posting lists them, interests as the student wrote them.
fn matching_factors(signal: Signal, candidate: &Candidate, profile: &StudentProfile) -> Vec<String> {
    let matched = &candidate.pair.signal(signal).matched;

    let factors: Vec<String> = match signal {
        Signal::SkillMatch => display_forms(
            candidate.posting.required_skills.iter().map(String::as_str),
            matched,
        ),
        Signal::InterestAlignment => {
            display_forms(profile.interests.iter().map(String::as_str), matched)
        }
        Signal::ExperienceSynergy => widest_phrases(matched),
    };

    factors.into_iter().take(MAX_LISTED_FACTORS).collect()
}

fn display_forms<'a, I>(originals: I, matched: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut forms = Vec::new();

    for original in originals {
        let Some(normalized) = normalize_term(original) else {
            continue;
        };
        if matched.contains(&normalized) && !seen.contains(&normalized) {
            forms.push(original.split_whitespace().collect::<Vec<_>>().join(" "));
            seen.push(normalized);
        }
    }
    forms
}

/// Drops matched keywords that only repeat part of a longer matched phrase,
/// so "distributed systems" is listed once rather than with its words.
fn widest_phrases(matched: &[String]) -> Vec<String> {
    matched
        .iter()
        .filter(|term| {
            let needle = format!(" {term} ");
            !matched
                .iter()
                .any(|other| other != *term && format!(" {other} ").contains(&needle))
        })
        .cloned()
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

/// Renders the templated reason for the dominant signal. Always non-empty and
/// at most `MAX_REASON_WORDS` words.
pub fn template_reason(top_signal: Option<Signal>, factors: &[String]) -> String {
    if factors.is_empty() {
        return FALLBACK_REASON.to_string();
    }
    let listed = join_factors(factors);

    let reason = match top_signal {
        Some(Signal::SkillMatch) => format!("Matches your expertise in {listed}."),
        Some(Signal::InterestAlignment) => format!("Aligns with your interest in {listed}."),
        Some(Signal::ExperienceSynergy) => format!("Builds on your experience with {listed}."),
        None => return FALLBACK_REASON.to_string(),
    };
    clamp_words(&reason, MAX_REASON_WORDS)
}

/// "a", "a and b", "a, b and c".
fn join_factors(factors: &[String]) -> String {
    match factors {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Truncates to `max_words` words, ending with a period.
pub fn clamp_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let truncated = words[..max_words]
        .join(" ")
        .trim_end_matches(|c: char| c == ',' || c == '.')
        .to_string();
    format!("{truncated}.")
}

// ────────────────────────────────────────────────────────────────────────────
// Writers
// ────────────────────────────────────────────────────────────────────────────

/// Produces one reason per context, in the same order. Implementations must
/// not fail: every slot gets at least the templated reason.
///
/// Carried in `AppState` as `Arc<dyn ReasonWriter>`.
#[async_trait]
pub trait ReasonWriter: Send + Sync {
    async fn write(&self, contexts: Vec<ReasonContext>) -> Vec<String>;

    /// "template" or "llm", reported for transparency.
    fn backend(&self) -> &'static str;
}

pub struct TemplateReasonWriter;

#[async_trait]
impl ReasonWriter for TemplateReasonWriter {
    async fn write(&self, contexts: Vec<ReasonContext>) -> Vec<String> {
        contexts.into_iter().map(|c| c.template).collect()
    }

    fn backend(&self) -> &'static str {
        "template"
    }
}

/// Rephrases templated reasons through the LLM. The whole polish step is
/// bounded by `timeout`; slots not polished in time keep their template.
pub struct LlmReasonWriter {
    llm: LlmClient,
    timeout: Duration,
}

impl LlmReasonWriter {
    pub fn new(llm: LlmClient, timeout: Duration) -> Self {
        Self { llm, timeout }
    }
}

#[derive(Debug, Deserialize)]
struct PolishedReason {
    reason: String,
}

#[async_trait]
impl ReasonWriter for LlmReasonWriter {
    async fn write(&self, contexts: Vec<ReasonContext>) -> Vec<String> {
        let mut reasons: Vec<String> = contexts.iter().map(|c| c.template.clone()).collect();
        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_POLISH));
        let system = Arc::new(reason_polish_system());
        let mut tasks = JoinSet::new();

        for (slot, context) in contexts.into_iter().enumerate() {
            if context.factors.is_empty() {
                continue;
            }
            let llm = self.llm.clone();
            let permits = Arc::clone(&permits);
            let system = Arc::clone(&system);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                polish_one(&llm, &system, &context)
                    .await
                    .map(|reason| (slot, reason))
            });
        }

        let collect = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some((slot, reason))) => reasons[slot] = reason,
                    Ok(None) => {}
                    Err(e) => warn!("Reason polish task failed: {e}"),
                }
            }
        };

        if tokio::time::timeout(self.timeout, collect).await.is_err() {
            warn!(
                "Reason polish exceeded {}ms, keeping templated reasons for the rest",
                self.timeout.as_millis()
            );
        }

        reasons
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

async fn polish_one(llm: &LlmClient, system: &str, context: &ReasonContext) -> Option<String> {
    let prompt = REASON_POLISH_PROMPT_TEMPLATE
        .replace("{title}", &context.title)
        .replace("{organization}", &context.organization)
        .replace("{factors}", &context.factors.join(", "))
        .replace("{draft}", &context.template);

    match llm.call_json::<PolishedReason>(&prompt, system).await {
        Ok(polished) => {
            let accepted = accept_polished(&polished.reason, &context.factors);
            if accepted.is_none() {
                debug!(
                    "Rejected polished reason for posting {}: {:?}",
                    context.posting_id, polished.reason
                );
            }
            accepted
        }
        Err(e) => {
            warn!(
                "Reason polish unavailable for posting {}: {e}",
                context.posting_id
            );
            None
        }
    }
}

/// A polished reason is kept only if it is non-empty, within the word limit,
/// and still names at least one matching factor.
fn accept_polished(text: &str, factors: &[String]) -> Option<String> {
    let text = text.trim().trim_matches('"').trim();
    if text.is_empty() || text.split_whitespace().count() > MAX_REASON_WORDS {
        return None;
    }
    let lowered = text.to_lowercase();
    factors
        .iter()
        .any(|f| lowered.contains(&f.to_lowercase()))
        .then(|| text.to_string())
}
