//! Certificate and award endpoints.
//!
//! Every handler is generic over the record type; the router instantiates
//! them once for certificates and once for awards.

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ListRecord, NotificationKind, RecordCategory, RecordForm};
use crate::notify::NotificationSink;
use crate::query::{SortOption, ALL_CATEGORIES};
use crate::store::{RecordSource, RecordStore};
use crate::view::{open_detail, ListController, ListOptions, ListView};
use crate::AppState;

/// A control used on a listing page.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ListAction {
    SetCategory { category: String },
    SetSort { sort: String },
    /// Typing in the search box; the listing is not filtered yet.
    EditSearch { text: String },
    SubmitSearch { text: String },
    Reset,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActionRequest {
    /// Query string of the page the action was taken on.
    #[serde(default)]
    pub query: String,
    pub action: ListAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActionResponse<R: ListRecord> {
    /// Query string to push to the URL.
    pub url_query: String,
    pub search_draft: String,
    pub view: ListView<R>,
}

/// Where the client navigates after a delete.
#[derive(Debug, Serialize)]
pub struct Redirect {
    pub redirect: String,
}

fn list_options(state: &AppState) -> ListOptions {
    ListOptions {
        loading_delay: state.config.loading_delay,
        expiry_window: state.config.expiry_window(),
    }
}

/// GET /api/{certificates,awards} - Filtered, searched and sorted listing.
pub async fn list_records<R>(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> ApiResult<ListView<R>>
where
    R: ListRecord + Serialize,
    RecordStore: RecordSource<R>,
{
    let mut controller = ListController::<R>::from_url(
        RecordSource::<R>::records(&*state.store).to_vec(),
        state.clock.clone(),
        state.notifications.clone(),
        list_options(&state),
        raw.as_deref().unwrap_or_default(),
    );
    if state.loaded_pages.first_visit(R::KIND) {
        controller.load().await;
    }

    let view = controller.view();
    tracing::debug!(
        kind = R::KIND.singular,
        query = %view.canonical_query,
        total = view.total,
        loading = controller.is_loading(),
        "Listed records"
    );
    success(view)
}

/// POST /api/{certificates,awards}/query - Apply a page control to the query
/// string the page was showing.
pub async fn apply_list_action<R>(
    State(state): State<AppState>,
    Json(request): Json<ListActionRequest>,
) -> ApiResult<ListActionResponse<R>>
where
    R: ListRecord + Serialize,
    RecordStore: RecordSource<R>,
{
    let controller = ListController::<R>::from_url(
        RecordSource::<R>::records(&*state.store).to_vec(),
        state.clock.clone(),
        state.notifications.clone(),
        list_options(&state),
        &request.query,
    );

    let mut url_query = None;
    match request.action {
        ListAction::SetCategory { category } if category == ALL_CATEGORIES => {
            controller.set_category(None)
        }
        ListAction::SetCategory { category } => {
            let parsed = <R::Category as RecordCategory>::parse(&category).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown {} category: {}", R::KIND.singular, category))
            })?;
            controller.set_category(Some(parsed));
        }
        ListAction::SetSort { sort } => {
            let parsed = SortOption::parse(&sort)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown sort: {}", sort)))?;
            controller.set_sort(parsed);
        }
        ListAction::EditSearch { text } => controller.set_search_draft(&text),
        ListAction::SubmitSearch { text } => {
            controller.set_search_draft(&text);
            url_query = Some(controller.submit_search());
        }
        ListAction::Reset => controller.reset(),
    }

    let view = controller.view();
    success(ListActionResponse {
        url_query: url_query.unwrap_or_else(|| view.canonical_query.clone()),
        search_draft: controller.search_draft(),
        view,
    })
}

/// GET /api/{certificates,awards}/:id - Get a single record.
pub async fn get_record<R>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<R>
where
    R: ListRecord + Serialize,
    RecordStore: RecordSource<R>,
{
    let record = open_detail::<R, _>(&*state.store, &id, &*state.notifications)?;
    success(record)
}

/// POST /api/{certificates,awards} - Validate a new record.
///
/// The record is returned with the id it would receive; the store is unchanged.
pub async fn create_record<F>(
    State(state): State<AppState>,
    Json(form): Json<F>,
) -> ApiResult<F::Record>
where
    F: RecordForm,
    F::Record: Serialize,
    RecordStore: RecordSource<F::Record>,
{
    let id = RecordSource::<F::Record>::next_id(&*state.store);

    match form.into_record(id) {
        Ok(record) => {
            let message = format!("{} added successfully", <F::Record as ListRecord>::KIND.title);
            state.notifications.notify(NotificationKind::Success, &message);
            success(record)
        }
        Err(fields) => {
            let message = "Please fix the errors in the form".to_string();
            state.notifications.notify(NotificationKind::Error, &message);
            Err(AppError::Validation { message, fields })
        }
    }
}

/// DELETE /api/{certificates,awards}/:id - Simulated delete.
pub async fn delete_record<R>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Redirect>
where
    R: ListRecord,
    RecordStore: RecordSource<R>,
{
    let record = open_detail::<R, _>(&*state.store, &id, &*state.notifications)?;

    tracing::info!(kind = R::KIND.singular, id = record.id(), "Simulated delete");
    state.notifications.notify(
        NotificationKind::Success,
        &format!("{} deleted successfully", R::KIND.title),
    );
    success(Redirect {
        redirect: R::KIND.list_route.to_string(),
    })
}
