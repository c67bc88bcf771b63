//! Normalizer: turns list fields and free-text narratives into comparable term sets.
//!
//! List fields (skills, required skills, interests) are normalized per element.
//! Narratives (experience, academics, posting descriptions) go through a
//! `KeywordExtractor`, so a better NLP technique can replace `PhraseExtractor`
//! without touching the scorer or the ranker.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Normalized terms. Ordered so that iteration, and everything derived from it,
/// is deterministic.
pub type TermSet = BTreeSet<String>;

/// Longest phrase kept intact by the phrase extractor.
pub const MAX_PHRASE_WORDS: usize = 3;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // function words
        "a", "about", "across", "after", "all", "also", "an", "and", "any", "are", "as", "at",
        "be", "been", "being", "both", "but", "by", "can", "could", "did", "do", "does", "during",
        "each", "etc", "for", "from", "had", "has", "have", "he", "her", "his", "how", "i", "if",
        "in", "into", "is", "it", "its", "me", "more", "most", "my", "no", "not", "of", "on",
        "one", "or", "other", "our", "ours", "out", "over", "per", "she", "so", "some", "such",
        "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
        "those", "through", "to", "two", "under", "up", "us", "very", "via", "was", "we", "well",
        "were", "what", "when", "where", "which", "while", "who", "will", "with", "within",
        "would", "you", "your",
        // verbs and fillers that carry no domain meaning in postings or narratives
        "analyze", "assist", "build", "building", "built", "collaborate", "contributed",
        "create", "created", "define", "develop", "developed", "ensure", "extract", "gain",
        "get", "help", "helped", "join", "learn", "like", "maintain", "make", "manage", "new",
        "popular", "providing", "support", "use", "used", "using", "work", "worked", "working",
    ]
    .into_iter()
    .collect()
});

// ────────────────────────────────────────────────────────────────────────────
// List fields
// ────────────────────────────────────────────────────────────────────────────

/// Trims, lowercases and collapses internal whitespace. Returns `None` for
/// blank input.
pub fn normalize_term(raw: &str) -> Option<String> {
    let collapsed = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Normalizes every element of a list field. Blank entries and duplicates
/// (after normalization) disappear.
pub fn normalize_list<'a, I>(items: I) -> TermSet
where
    I: IntoIterator<Item = &'a str>,
{
    items.into_iter().filter_map(normalize_term).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Free text
// ────────────────────────────────────────────────────────────────────────────

/// Extracts comparable keyword phrases from a narrative.
pub trait KeywordExtractor: Send + Sync {
    fn extract_keywords(&self, text: &str) -> TermSet;
}

/// Best-effort phrase extractor. Deterministic for a given input.
///
/// Algorithm:
/// 1. Split the lowercased text into clauses on punctuation. A period only
///    ends a clause when followed by whitespace, so `node.js` survives.
/// 2. Within a clause, stop words and bare numbers break the word run.
/// 3. Every contiguous sub-phrase of a run of content words, from one word up
///    to `MAX_PHRASE_WORDS`, is kept. A term embedded in a longer run
///    ("exciting machine learning projects") still matches on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseExtractor;

impl KeywordExtractor for PhraseExtractor {
    fn extract_keywords(&self, text: &str) -> TermSet {
        let mut phrases = TermSet::new();
        let lowered = text.to_lowercase();

        for clause in split_clauses(&lowered) {
            let mut run: Vec<&str> = Vec::new();
            for raw_word in clause.split_whitespace() {
                match clean_word(raw_word) {
                    Some(word) if !STOP_WORDS.contains(word) => run.push(word),
                    _ => flush_run(&mut run, &mut phrases),
                }
            }
            flush_run(&mut run, &mut phrases);
        }

        phrases
    }
}

/// Convenience wrapper over the default extractor.
pub fn extract_keywords(text: &str) -> TermSet {
    PhraseExtractor.extract_keywords(text)
}

fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let is_boundary = match c {
            ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '|' | '/'
            | '\n' | '\r' | '•' => true,
            '.' => chars.peek().map_or(true, |&(_, next)| next.is_whitespace()),
            _ => false,
        };
        if is_boundary {
            clauses.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    clauses.push(&text[start..]);

    clauses.retain(|clause| !clause.trim().is_empty());
    clauses
}

/// Strips surrounding punctuation and possessive suffixes. Returns `None` for
/// tokens with nothing to match on (punctuation, bare numbers).
fn clean_word(raw: &str) -> Option<&str> {
    let trimmed = raw
        .trim_matches(|c: char| !c.is_alphanumeric() && !matches!(c, '+' | '#' | '.'))
        .trim_end_matches('.');
    let word = trimmed
        .strip_suffix("'s")
        .or_else(|| trimmed.strip_suffix("’s"))
        .unwrap_or(trimmed);

    if !word.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(word)
}

fn flush_run(run: &mut Vec<&str>, phrases: &mut TermSet) {
    for width in 1..=MAX_PHRASE_WORDS.min(run.len()) {
        for window in run.windows(width) {
            phrases.insert(window.join(" "));
        }
    }
    run.clear();
}
