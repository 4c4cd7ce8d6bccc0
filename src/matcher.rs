//! Term matching for page relevance
//!
//! A page is scored by counting how many of its word tokens are configured
//! search terms. Tokens are lower-cased runs of alphanumeric characters; matching
//! is exact token equality, with stop terms removed before anything is counted.

use crate::storage::Document;
use crate::url::CrawlUrl;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Result of scoring a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// URL of the scored document
    pub url: CrawlUrl,

    /// Total number of search-term occurrences
    pub match_count: usize,

    /// Distinct search terms that occurred at least once
    pub matched: BTreeSet<String>,

    /// Occurrences per matched term
    pub term_counts: BTreeMap<String, usize>,
}

impl MatchResult {
    /// A zero score for `url`, used for pages that could not be fetched
    pub fn empty(url: CrawlUrl) -> Self {
        Self {
            url,
            match_count: 0,
            matched: BTreeSet::new(),
            term_counts: BTreeMap::new(),
        }
    }
}

/// Scores documents against a fixed set of search terms and stop terms
#[derive(Debug, Clone, Default)]
pub struct TermMatcher {
    terms: HashSet<String>,
    stop_terms: HashSet<String>,
}

impl TermMatcher {
    /// Creates a matcher; terms are lower-cased and trimmed
    pub fn new<T, S>(terms: T, stop_terms: S) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let normalize = |t: &str| t.trim().to_lowercase();
        Self {
            terms: terms.into_iter().map(|t| normalize(t.as_ref())).collect(),
            stop_terms: stop_terms.into_iter().map(|t| normalize(t.as_ref())).collect(),
        }
    }

    /// Scores a document's visible text
    ///
    /// Stop terms take precedence: a token equal to a stop term never counts,
    /// even when the same word is also a search term.
    pub fn score(&self, document: &Document) -> MatchResult {
        let mut result = MatchResult::empty(document.url.clone());

        for token in tokenize(&document.raw_text) {
            if self.stop_terms.contains(&token) {
                continue;
            }
            if self.terms.contains(&token) {
                result.match_count += 1;
                *result.term_counts.entry(token.clone()).or_insert(0) += 1;
                result.matched.insert(token);
            }
        }

        result
    }

    /// Returns true if no search terms are configured
    pub fn has_no_terms(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Scores `document` against `terms` and `stop_terms` without building a matcher
pub fn score(document: &Document, terms: &[String], stop_terms: &[String]) -> MatchResult {
    TermMatcher::new(terms, stop_terms).score(document)
}

/// Splits text into lower-cased tokens on non-alphanumeric boundaries
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}
