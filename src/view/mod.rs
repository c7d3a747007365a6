//! Listing page controller and detail lookups.
//!
//! A [`ListController`] owns the query state of one listing page. Category and
//! sort changes apply immediately; typed search text is only applied when the
//! search is submitted, which also yields the query string for the URL.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::clock::{Clock, DelayedTask};
use crate::errors::AppError;
use crate::models::{ListRecord, NotificationKind, RecordKind};
use crate::notify::NotificationSink;
use crate::query::{self, ListQuery, SortOption};
use crate::store::RecordSource;

/// Number of tags shown on a record card.
pub const VISIBLE_TAGS: usize = 3;

/// Timing knobs of a listing page.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    /// Delay before the (already available) records are shown.
    pub loading_delay: Duration,
    /// How far ahead an expiration date counts as "expiring soon".
    pub expiry_window: chrono::Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            loading_delay: Duration::from_millis(800),
            expiry_window: chrono::Duration::days(30),
        }
    }
}

/// A record as rendered on a listing card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCard<R> {
    #[serde(flatten)]
    pub record: R,
    pub visible_tags: Vec<String>,
    pub hidden_tag_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiring_soon: Option<bool>,
}

/// Everything a listing page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<R: ListRecord> {
    pub loading: bool,
    pub query: ListQuery<R::Category>,
    pub canonical_query: String,
    pub items: Vec<RecordCard<R>>,
    pub total: usize,
    /// e.g. "Showing 2 certificates".
    pub summary: String,
    /// No record matched; the page offers a reset action.
    pub empty: bool,
    /// Search, category or sort differs from the defaults.
    pub filtered: bool,
}

struct PageState<C> {
    query: ListQuery<C>,
    search_draft: String,
    loading: bool,
    mounted: bool,
}

pub struct ListController<R: ListRecord> {
    records: Arc<[R]>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    options: ListOptions,
    state: Arc<Mutex<PageState<R::Category>>>,
    loading_task: Option<DelayedTask>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: ListRecord> ListController<R> {
    /// Controller whose records are already displayed (no loading phase).
    pub fn new(
        records: impl Into<Arc<[R]>>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        options: ListOptions,
    ) -> Self {
        Self {
            records: records.into(),
            clock,
            sink,
            options,
            state: Arc::new(Mutex::new(PageState {
                query: ListQuery::default(),
                search_draft: String::new(),
                loading: false,
                mounted: false,
            })),
            loading_task: None,
        }
    }

    /// Controller whose initial query is decoded from a URL query string.
    pub fn from_url(
        records: impl Into<Arc<[R]>>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        options: ListOptions,
        raw_query: &str,
    ) -> Self {
        let controller = Self::new(records, clock, sink, options);
        controller.navigate(raw_query);
        controller
    }

    /// Start the loading phase. When the delay elapses the records are shown
    /// and the load is announced, together with an expiry warning if any
    /// record expires soon.
    ///
    /// HTTP handlers cannot outlive the timer and use [`load`](Self::load).
    #[allow(dead_code)]
    pub fn mount(&mut self) {
        {
            let mut state = lock(&self.state);
            state.mounted = true;
            state.loading = true;
        }

        let state = self.state.clone();
        let sink = self.sink.clone();
        let expiring = self.expiring_count();
        let task = Box::new(move || finish_loading::<R>(&state, sink.as_ref(), expiring));

        tracing::debug!(kind = R::KIND.singular, "Mounting listing page");
        self.loading_task = Some(self.clock.delay(self.options.loading_delay, task));
    }

    /// Run the whole loading phase, waiting out the delay on the clock.
    pub async fn load(&mut self) {
        {
            let mut state = lock(&self.state);
            state.mounted = true;
            state.loading = true;
        }
        let expiring = self.expiring_count();
        self.clock.sleep(self.options.loading_delay).await;
        finish_loading::<R>(&self.state, self.sink.as_ref(), expiring);
    }

    /// Tear the page down; a pending load never touches state afterwards.
    pub fn unmount(&mut self) {
        lock(&self.state).mounted = false;
        if let Some(task) = self.loading_task.take() {
            task.cancel();
        }
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading
    }

    pub fn query(&self) -> ListQuery<R::Category> {
        lock(&self.state).query.clone()
    }

    pub fn search_draft(&self) -> String {
        lock(&self.state).search_draft.clone()
    }

    /// Replace the query with the one encoded in the URL.
    pub fn navigate(&self, raw_query: &str) {
        let decoded = query::decode::<R>(raw_query);
        let mut state = lock(&self.state);
        state.search_draft = decoded.search.clone();
        state.query = decoded;
    }

    pub fn set_category(&self, category: Option<R::Category>) {
        lock(&self.state).query.category = category;
    }

    /// Sorts the record type does not offer are ignored.
    pub fn set_sort(&self, sort: SortOption) {
        if R::SORTS.contains(&sort) {
            lock(&self.state).query.sort = sort;
        }
    }

    /// Update the search box without re-filtering.
    pub fn set_search_draft(&self, text: &str) {
        lock(&self.state).search_draft = text.to_string();
    }

    /// Apply the search box and return the query string to push to the URL.
    pub fn submit_search(&self) -> String {
        let mut state = lock(&self.state);
        state.query.search = state.search_draft.clone();
        query::encode(&state.query)
    }

    /// Restore search, category and sort to their defaults.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.query = ListQuery::default();
        state.search_draft.clear();
    }

    /// Pipeline output for the current query.
    pub fn results(&self) -> Vec<R> {
        query::run(&self.records, &lock(&self.state).query)
    }

    pub fn view(&self) -> ListView<R> {
        let (loading, query) = {
            let state = lock(&self.state);
            (state.loading, state.query.clone())
        };
        let canonical_query = query::encode(&query);
        let filtered = !query.is_default();

        if loading {
            return ListView {
                loading,
                query,
                canonical_query,
                items: Vec::new(),
                total: 0,
                summary: String::new(),
                empty: false,
                filtered,
            };
        }

        let now = self.clock.now();
        let items: Vec<RecordCard<R>> = self
            .results()
            .into_iter()
            .map(|record| {
                let tags = record.tags();
                let visible_tags = tags.iter().take(VISIBLE_TAGS).cloned().collect();
                let hidden_tag_count = tags.len().saturating_sub(VISIBLE_TAGS);
                let expiring_soon = record.expiring_soon(now, self.options.expiry_window);
                RecordCard {
                    record,
                    visible_tags,
                    hidden_tag_count,
                    expiring_soon,
                }
            })
            .collect();

        let total = items.len();
        ListView {
            loading,
            query,
            canonical_query,
            summary: format!("Showing {} {}", total, R::KIND.noun(total)),
            empty: total == 0,
            filtered,
            items,
            total,
        }
    }

    fn expiring_count(&self) -> usize {
        let now = self.clock.now();
        self.records
            .iter()
            .filter(|r| r.expiring_soon(now, self.options.expiry_window) == Some(true))
            .count()
    }
}

fn finish_loading<R: ListRecord>(
    state: &Mutex<PageState<R::Category>>,
    sink: &dyn NotificationSink,
    expiring: usize,
) {
    {
        let mut state = lock(state);
        if !state.mounted {
            return;
        }
        state.loading = false;
    }

    sink.notify(
        NotificationKind::Info,
        &format!("{}s loaded successfully", R::KIND.title),
    );
    if expiring > 0 {
        sink.notify(
            NotificationKind::Warning,
            &format!("You have {} {}(s) expiring soon", expiring, R::KIND.singular),
        );
    }
}

/// Listing pages already shown in the current session.
///
/// Only the first visit to a page waits out the loading delay and announces
/// the load. Later visits render at once.
#[derive(Debug, Default)]
pub struct LoadedPages {
    kinds: Mutex<HashSet<&'static str>>,
}

impl LoadedPages {
    /// Record a visit; `true` when it is the first since the last reset.
    pub fn first_visit(&self, kind: RecordKind) -> bool {
        lock(&self.kinds).insert(kind.singular)
    }

    /// Forget every visit, e.g. when the session changes.
    pub fn reset(&self) {
        lock(&self.kinds).clear();
    }
}

impl<R: ListRecord> Drop for ListController<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Resolve a detail-page id.
///
/// Ids that are not numeric or not in the store produce a not-found error that
/// carries the listing route to redirect to, and an error notification.
pub fn open_detail<R, S>(
    source: &S,
    raw_id: &str,
    sink: &dyn NotificationSink,
) -> Result<R, AppError>
where
    R: ListRecord,
    S: RecordSource<R> + ?Sized,
{
    let found = raw_id
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|id| source.find(id));

    match found {
        Some(record) => Ok(record.clone()),
        None => {
            let message = format!("{} not found", R::KIND.title);
            sink.notify(NotificationKind::Error, &message);
            Err(AppError::NotFound {
                message,
                redirect: Some(R::KIND.list_route.to_string()),
            })
        }
    }
}
