//! Bidirectional mapping between a [`ListQuery`] and a URL query string.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::{ListRecord, RecordCategory};

/// Query-string keys understood by listing routes.
pub const SEARCH_KEY: &str = "search";
pub const CATEGORY_KEY: &str = "category";
pub const SORT_KEY: &str = "sort";

/// Category value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Sort order of a listing page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
    ExpiringSoon,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::ExpiringSoon => "expiring-soon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(SortOption::Newest),
            "oldest" => Some(SortOption::Oldest),
            "name-asc" => Some(SortOption::NameAsc),
            "name-desc" => Some(SortOption::NameDesc),
            "expiring-soon" => Some(SortOption::ExpiringSoon),
            _ => None,
        }
    }
}

/// Search text, category filter and sort option of one listing page.
///
/// `category == None` is the "all" filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<C> {
    pub search: String,
    pub category: Option<C>,
    pub sort: SortOption,
}

impl<C> Default for ListQuery<C> {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            sort: SortOption::default(),
        }
    }
}

impl<C: RecordCategory> ListQuery<C> {
    /// The category as it appears in the URL (`all` when unfiltered).
    pub fn category_str(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or(ALL_CATEGORIES)
    }

    pub fn is_default(&self) -> bool {
        self.search.is_empty() && self.category.is_none() && self.sort == SortOption::default()
    }
}

impl<C: RecordCategory> Serialize for ListQuery<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ListQuery", 3)?;
        state.serialize_field(SEARCH_KEY, &self.search)?;
        state.serialize_field(CATEGORY_KEY, self.category_str())?;
        state.serialize_field(SORT_KEY, &self.sort)?;
        state.end()
    }
}

/// Decode a listing query string for record type `R`.
///
/// Never fails: a missing, empty or unrecognised value takes the field's
/// default, unknown keys are ignored, and the first occurrence of a repeated
/// key wins. A leading `?` is accepted.
pub fn decode<R: ListRecord>(raw: &str) -> ListQuery<R::Category> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).unwrap_or_else(|e| {
        tracing::debug!("Ignoring undecodable query string {:?}: {}", raw, e);
        Vec::new()
    });

    let search = first_value(&pairs, SEARCH_KEY)
        .unwrap_or_default()
        .to_string();
    let category =
        first_value(&pairs, CATEGORY_KEY).and_then(<R::Category as RecordCategory>::parse);
    let sort = first_value(&pairs, SORT_KEY)
        .and_then(SortOption::parse)
        .filter(|sort| R::SORTS.contains(sort))
        .unwrap_or_default();

    ListQuery {
        search,
        category,
        sort,
    }
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.is_empty())
}

/// Encode a query, omitting every field that holds its default.
///
/// Keys are emitted in the order `search`, `category`, `sort`.
pub fn encode<C: RecordCategory>(query: &ListQuery<C>) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(3);
    if !query.search.is_empty() {
        pairs.push((SEARCH_KEY, &query.search));
    }
    if let Some(category) = query.category {
        pairs.push((CATEGORY_KEY, category.as_str()));
    }
    if query.sort != SortOption::default() {
        pairs.push((SORT_KEY, query.sort.as_str()));
    }
    // Serializing string pairs cannot fail.
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}
