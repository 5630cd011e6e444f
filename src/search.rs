use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::{debug, trace};

use crate::Page;

/// A page matched by a search, with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub page: &'a Page,
    pub score: i64,
}

/// Fuzzy-matches `query` against titles and contents, best matches first.
///
/// Title matches weigh twice as much as content matches. A blank query matches nothing.
pub fn search_pages<'a>(pages: &'a [Page], query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits: Vec<SearchHit<'a>> = pages
        .iter()
        .filter_map(|page| {
            let title_score = matcher.fuzzy_match(&page.title, query).unwrap_or(0);
            let content_score = matcher.fuzzy_match(&page.content, query).unwrap_or(0);
            let score = title_score * 2 + content_score;
            trace!("Page {} scored {}", page.id, score);
            (score > 0).then_some(SearchHit { page, score })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    debug!("Search for '{}' matched {} pages", query, hits.len());
    hits
}
