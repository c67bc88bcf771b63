// Internship recommendations: deterministic relevance ranking of postings for a student.
// Implements: normalization, weighted scoring, threshold filtering, ranking, reason annotation.
// Only reason polish may reach the LLM, and only through llm_client.

pub mod engine;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod ranker;
pub mod reasons;
pub mod scorer;
