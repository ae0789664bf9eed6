use crate::vacancy::PostingRecord;

/// Selects postings whose title contains a query string.
///
/// Matching is case-sensitive. An empty query selects every posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFilter {
    query: String,
}

impl TitleFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self, record: &PostingRecord) -> bool {
        record.title_contains(&self.query)
    }
}
