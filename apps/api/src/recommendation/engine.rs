//! Ranking engine: the single entry point for internship recommendations.
//!
//! Flow: validate → normalize profile once → normalize + score each posting →
//!       filter & sort → annotate reasons.
//!
//! Stateless: every call works on its own inputs and configuration.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::posting::Posting;
use crate::models::profile::StudentProfile;
use crate::recommendation::normalizer::{KeywordExtractor, PhraseExtractor};
use crate::recommendation::ranker::{filter_and_sort, Candidate, ScoredPosting};
use crate::recommendation::reasons::{ReasonContext, ReasonWriter};
use crate::recommendation::scorer::{score_pair, PostingTerms, ProfileTerms, ScoringWeights};

pub const DEFAULT_MIN_RELEVANCE_THRESHOLD: f64 = 0.3;

/// Raised only for contract violations. Data-quality problems degrade scores instead.
#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    pub min_relevance_threshold: f64,
    pub weights: ScoringWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_relevance_threshold: DEFAULT_MIN_RELEVANCE_THRESHOLD,
            weights: ScoringWeights::default(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), RankError> {
        let t = self.min_relevance_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(RankError::InvalidInput(format!(
                "minRelevanceThreshold must be within [0, 1], got {t}"
            )));
        }
        if let Some(name) = self.weights.invalid_weight() {
            return Err(RankError::InvalidInput(format!(
                "{name} weight must be within [0, 1]"
            )));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Ranks `postings` for `profile` with templated reasons. Pure and synchronous.
pub fn rank(
    profile: &StudentProfile,
    postings: &[Posting],
    config: &RankingConfig,
) -> Result<Vec<ScoredPosting>, RankError> {
    let ranked = score_and_rank(profile, postings, config, &PhraseExtractor)?;
    Ok(ranked
        .into_iter()
        .map(|candidate| {
            let reason = ReasonContext::build(&candidate, profile).template;
            ScoredPosting::new(candidate, reason)
        })
        .collect())
}

/// Ranks `postings` for `profile`, delegating reason text to `writer`.
/// Scores and order are identical to `rank`; only `reason` may differ.
pub async fn rank_with_writer(
    profile: &StudentProfile,
    postings: &[Posting],
    config: &RankingConfig,
    writer: &dyn ReasonWriter,
) -> Result<Vec<ScoredPosting>, RankError> {
    let ranked = score_and_rank(profile, postings, config, &PhraseExtractor)?;
    if ranked.is_empty() {
        return Ok(Vec::new());
    }

    let contexts: Vec<ReasonContext> = ranked
        .iter()
        .map(|candidate| ReasonContext::build(candidate, profile))
        .collect();
    let templates: Vec<String> = contexts.iter().map(|c| c.template.clone()).collect();

    let mut reasons = writer.write(contexts).await;
    if reasons.len() != ranked.len() {
        // A writer that loses slots is treated as unavailable.
        reasons = templates;
    }

    Ok(ranked
        .into_iter()
        .zip(reasons)
        .map(|(candidate, reason)| ScoredPosting::new(candidate, reason))
        .collect())
}

// ────────────────────────────────────────────────────────────────────────────
// Core
// ────────────────────────────────────────────────────────────────────────────

fn score_and_rank(
    profile: &StudentProfile,
    postings: &[Posting],
    config: &RankingConfig,
    extractor: &dyn KeywordExtractor,
) -> Result<Vec<Candidate>, RankError> {
    config.validate()?;
    validate_input(profile, postings)?;

    if postings.is_empty() {
        return Ok(Vec::new());
    }

    let profile_terms = ProfileTerms::from_profile(profile, extractor);
    if profile_terms.is_empty() {
        debug!(
            "Student {} has no skills, interests or narrative; every score will be 0",
            profile.student_id
        );
    }

    let candidates: Vec<Candidate> = postings
        .iter()
        .map(|posting| {
            let posting_terms = PostingTerms::from_posting(posting, extractor);
            Candidate {
                pair: score_pair(&profile_terms, &posting_terms, &config.weights),
                posting: posting.clone(),
            }
        })
        .collect();

    let ranked = filter_and_sort(candidates, config.min_relevance_threshold);
    info!(
        "Ranked {} of {} postings above threshold {} for student {}",
        ranked.len(),
        postings.len(),
        config.min_relevance_threshold,
        profile.student_id
    );

    Ok(ranked)
}

fn validate_input(profile: &StudentProfile, postings: &[Posting]) -> Result<(), RankError> {
    if profile.student_id.trim().is_empty() {
        return Err(RankError::InvalidInput(
            "studentProfile.studentId cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(postings.len());
    for (index, posting) in postings.iter().enumerate() {
        if posting.id.trim().is_empty() {
            return Err(RankError::InvalidInput(format!(
                "postings[{index}].id cannot be empty"
            )));
        }
        if !seen.insert(posting.id.as_str()) {
            return Err(RankError::InvalidInput(format!(
                "duplicate posting id '{}'",
                posting.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::reasons::TemplateReasonWriter;
    use crate::recommendation::scorer::Signal;
    use async_trait::async_trait;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn student(skills: &[&str], interests: &[&str]) -> StudentProfile {
        StudentProfile {
            student_id: "student1".to_string(),
            skills: skills.iter().map(|&s| s.into()).collect(),
            interests: strings(interests),
            ..Default::default()
        }
    }

    fn posting(id: &str, required: &[&str], description: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: format!("Intern {id}"),
            organization: "TechNova Solutions".to_string(),
            description: description.to_string(),
            required_skills: strings(required),
            ..Default::default()
        }
    }

    fn ids(ranked: &[ScoredPosting]) -> Vec<&str> {
        ranked.iter().map(|s| s.posting.id.as_str()).collect()
    }

    /// Seed data: one student, four internships.
    fn seed() -> (StudentProfile, Vec<Posting>) {
        let profile = StudentProfile {
            student_id: "student1".to_string(),
            skills: vec!["React".into(), "TypeScript".into(), "Node.js".into(), "Firebase".into(), "Data Analysis".into()],
            interests: strings(&["Web Development", "Artificial Intelligence", "Startups"]),
            past_experiences: "Developed a full-stack web application for a university project using the MERN stack. \
                Contributed to an open-source library for data visualization."
                .to_string(),
            academic_achievements: "Dean's List for two consecutive semesters. Published a paper on efficient sorting algorithms. GPA: 3.8/4.0"
                .to_string(),
        };
        let postings = vec![
            posting("internship1", &["React", "TypeScript", "Tailwind CSS"],
                "Work on our flagship product's frontend using React and TypeScript. Collaborate with a dynamic team to build new features."),
            posting("internship2", &["Python", "Pandas", "Scikit-learn"],
                "Analyze large datasets to extract meaningful insights. Build predictive models using Python and popular ML libraries."),
            posting("internship3", &["Node.js", "Express", "MongoDB"],
                "Develop and maintain server-side logic, define and maintain the central database, and ensure high performance."),
            posting("internship4", &["AWS", "Docker", "Kubernetes"],
                "Help manage and scale our cloud infrastructure on AWS. Work with technologies like Docker, Kubernetes, and Terraform."),
        ];
        (profile, postings)
    }

    #[test]
    fn test_partial_skill_overlap_falls_below_default_threshold() {
        let profile = student(&["react", "typescript", "node"], &[]);
        let postings = vec![posting("p1", &["react", "typescript", "tailwind"], "")];
        let ranked = rank(&profile, &postings, &RankingConfig::default()).unwrap();
        assert!(ranked.is_empty(), "0.25 must not pass a 0.3 threshold");
    }

    #[test]
    fn test_skill_and_interest_match_outranks_partial_match() {
        let profile = student(&["react", "typescript", "node"], &["web development"]);
        let postings = vec![
            posting("partial", &["react", "typescript", "tailwind"], ""),
            posting("strong", &["react", "typescript"], "Web development."),
        ];

        let ranked = rank(&profile, &postings, &RankingConfig::default()).unwrap();
        assert_eq!(ids(&ranked), vec!["strong"]);

        // Description keywords: {web, development, web development}.
        // 0.5·(2/3) + 0.3·(1/3) + 0.2·0
        let expected = 0.5 * (2.0 / 3.0) + 0.3 * (1.0 / 3.0);
        assert!((ranked[0].relevance_score - expected).abs() < 1e-12);
        assert!((ranked[0].breakdown.interest_alignment - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(ranked[0].breakdown.top_signal, Some(Signal::SkillMatch));
        assert_eq!(ranked[0].reason, "Matches your expertise in react and typescript.");

        let lenient = RankingConfig {
            min_relevance_threshold: 0.2,
            ..Default::default()
        };
        let ranked = rank(&profile, &postings, &lenient).unwrap();
        assert_eq!(ids(&ranked), vec!["strong", "partial"]);
    }

    #[test]
    fn test_interest_inside_longer_description_phrase_counts() {
        let profile = student(&[], &["Machine Learning"]);
        let postings = vec![posting(
            "ml",
            &[],
            "Exciting machine learning projects await you.",
        )];
        let zero = RankingConfig {
            min_relevance_threshold: 0.0,
            ..Default::default()
        };

        let ranked = rank(&profile, &postings, &zero).unwrap();
        assert_eq!(ids(&ranked), vec!["ml"]);
        assert!(ranked[0].breakdown.interest_alignment > 0.0);
        assert_eq!(ranked[0].breakdown.top_signal, Some(Signal::InterestAlignment));
        assert_eq!(ranked[0].reason, "Aligns with your interest in Machine Learning.");
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let profile = student(&["rust"], &[]);
        let postings = vec![
            posting("p1", &["rust"], ""),
            posting("p0", &["go"], ""),
            posting("p2", &["rust"], ""),
        ];
        let ranked = rank(&profile, &postings, &RankingConfig::default()).unwrap();
        assert_eq!(ids(&ranked), vec!["p1", "p2"]);
        assert_eq!(ranked[0].relevance_score, 0.5);
        assert_eq!(ranked[1].relevance_score, 0.5);
    }

    #[test]
    fn test_empty_posting_is_excluded_at_any_threshold() {
        let (profile, _) = seed();
        let postings = vec![posting("empty", &[], "")];
        let zero = RankingConfig {
            min_relevance_threshold: 0.0,
            ..Default::default()
        };
        assert!(rank(&profile, &postings, &zero).unwrap().is_empty());
    }

    #[test]
    fn test_empty_posting_list_returns_empty() {
        let (profile, _) = seed();
        assert!(rank(&profile, &[], &RankingConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_profile_returns_empty() {
        let (_, postings) = seed();
        let profile = StudentProfile {
            student_id: "nobody".to_string(),
            ..Default::default()
        };
        assert!(rank(&profile, &postings, &RankingConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_output_properties_hold_on_seed_data() {
        let (profile, postings) = seed();
        let config = RankingConfig {
            min_relevance_threshold: 0.05,
            ..Default::default()
        };
        let ranked = rank(&profile, &postings, &config).unwrap();
        assert!(!ranked.is_empty());

        let input_ids: HashSet<&str> = postings.iter().map(|p| p.id.as_str()).collect();
        let mut output_ids = HashSet::new();
        for scored in &ranked {
            assert!(input_ids.contains(scored.posting.id.as_str()));
            assert!(output_ids.insert(scored.posting.id.as_str()), "duplicate output id");
            assert!(scored.relevance_score > config.min_relevance_threshold);
            assert!((0.0..=1.0).contains(&scored.relevance_score));
            assert!(!scored.reason.is_empty());
            assert!(scored.reason.split_whitespace().count() <= 20);

            let original = postings.iter().find(|p| p.id == scored.posting.id).unwrap();
            assert_eq!(&scored.posting, original, "postings pass through unchanged");
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
        assert_eq!(ranked[0].posting.id, "internship1");
        assert!(ranked[0].reason.contains("React"));
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let (profile, postings) = seed();
        let config = RankingConfig {
            min_relevance_threshold: 0.0,
            ..Default::default()
        };
        let first = rank(&profile, &postings, &config).unwrap();
        let second = rank(&profile, &postings, &config).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.relevance_score.to_bits(), b.relevance_score.to_bits());
        }
    }

    #[test]
    fn test_contract_violations_are_rejected() {
        let (profile, postings) = seed();

        let anonymous = StudentProfile {
            student_id: "  ".to_string(),
            ..profile.clone()
        };
        assert!(matches!(
            rank(&anonymous, &postings, &RankingConfig::default()),
            Err(RankError::InvalidInput(_))
        ));

        let mut duplicated = postings.clone();
        duplicated.push(postings[0].clone());
        assert_eq!(
            rank(&profile, &duplicated, &RankingConfig::default()),
            Err(RankError::InvalidInput("duplicate posting id 'internship1'".to_string()))
        );

        let blank_id = vec![posting("", &["rust"], "")];
        assert!(rank(&profile, &blank_id, &RankingConfig::default()).is_err());

        let bad_threshold = RankingConfig {
            min_relevance_threshold: 1.5,
            ..Default::default()
        };
        assert!(rank(&profile, &postings, &bad_threshold).is_err());

        let bad_weights = RankingConfig {
            weights: ScoringWeights {
                interest: f64::INFINITY,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(rank(&profile, &postings, &bad_weights).is_err());
    }

    struct BrokenWriter;

    #[async_trait]
    impl ReasonWriter for BrokenWriter {
        async fn write(&self, _contexts: Vec<ReasonContext>) -> Vec<String> {
            Vec::new()
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    struct ShoutingWriter;

    #[async_trait]
    impl ReasonWriter for ShoutingWriter {
        async fn write(&self, contexts: Vec<ReasonContext>) -> Vec<String> {
            contexts.into_iter().map(|c| c.template.to_uppercase()).collect()
        }

        fn backend(&self) -> &'static str {
            "shouting"
        }
    }

    #[tokio::test]
    async fn test_writer_changes_reasons_but_not_ranking() {
        let (profile, postings) = seed();
        let config = RankingConfig {
            min_relevance_threshold: 0.05,
            ..Default::default()
        };
        let plain = rank(&profile, &postings, &config).unwrap();
        let shouted = rank_with_writer(&profile, &postings, &config, &ShoutingWriter)
            .await
            .unwrap();

        assert_eq!(ids(&plain), ids(&shouted));
        for (a, b) in plain.iter().zip(&shouted) {
            assert_eq!(a.relevance_score, b.relevance_score);
            assert_eq!(a.reason.to_uppercase(), b.reason);
        }
    }

    #[tokio::test]
    async fn test_writer_losing_slots_falls_back_to_templates() {
        let (profile, postings) = seed();
        let config = RankingConfig {
            min_relevance_threshold: 0.05,
            ..Default::default()
        };
        let expected = rank(&profile, &postings, &config).unwrap();
        let ranked = rank_with_writer(&profile, &postings, &config, &BrokenWriter)
            .await
            .unwrap();
        assert_eq!(expected, ranked);

        let templated = rank_with_writer(&profile, &postings, &config, &TemplateReasonWriter)
            .await
            .unwrap();
        assert_eq!(expected, templated);
    }
}
