use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        dao::{
            CategoryGroup, DailyStats, DateSortMode, DayQuery, ListOrder, ListQuery,
            NewScheduleItem, Page, PageRequest, PriorityGroup, SchedulePatch, SearchCriteria,
            SearchField, SortDirection,
        },
        entities::schedule_item,
    },
    error::AppError,
    middleware::AuthGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ScheduleService, ServiceContext},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayParams {
    pub date: NaiveDate,
    pub priority_level: Option<i32>,
    #[serde(default)]
    pub sort_by_priority: SortDirection,
    pub is_completed: Option<bool>,
    #[serde(default)]
    pub sort_mode: DateSortMode,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub priority_level: Option<i32>,
    #[serde(default)]
    pub sort_by_priority: SortDirection,
    #[serde(default)]
    pub order_by: ListOrder,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
    pub include_completed: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority_level: Option<i32>,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub search_type: SearchField,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionParams {
    pub date: NaiveDate,
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub due_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority_level: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub due_at: Option<NaiveDateTime>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority_level: Option<i32>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemResponse {
    pub id: i32,
    pub due_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub title: String,
    pub content: String,
    pub priority_level: i32,
    pub category: String,
    pub is_completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroupResponse {
    pub category: String,
    pub items: Vec<ScheduleItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityGroupResponse {
    pub priority_level: i32,
    pub items: Vec<ScheduleItemResponse>,
}

impl From<schedule_item::Model> for ScheduleItemResponse {
    fn from(model: schedule_item::Model) -> Self {
        Self {
            id: model.id,
            due_at: model.due_at,
            created_at: model.created_at,
            title: model.title,
            content: model.content,
            priority_level: model.priority_level,
            category: model.category,
            is_completed: model.is_completed,
        }
    }
}

impl From<CategoryGroup> for CategoryGroupResponse {
    fn from(group: CategoryGroup) -> Self {
        Self {
            category: group.category,
            items: into_responses(group.items),
        }
    }
}

impl From<PriorityGroup> for PriorityGroupResponse {
    fn from(group: PriorityGroup) -> Self {
        Self {
            priority_level: group.priority_level,
            items: into_responses(group.items),
        }
    }
}

impl From<CreateScheduleRequest> for NewScheduleItem {
    fn from(body: CreateScheduleRequest) -> Self {
        Self {
            due_at: body.due_at,
            title: body.title,
            content: body.content,
            priority_level: body.priority_level,
            category: body.category,
            is_completed: body.is_completed,
        }
    }
}

impl From<UpdateScheduleRequest> for SchedulePatch {
    fn from(body: UpdateScheduleRequest) -> Self {
        Self {
            due_at: body.due_at,
            title: body.title,
            content: body.content,
            priority_level: body.priority_level,
            category: body.category,
        }
    }
}

fn into_responses(items: Vec<schedule_item::Model>) -> Vec<ScheduleItemResponse> {
    items.into_iter().map(ScheduleItemResponse::from).collect()
}

fn schedule_service(state: &AppState) -> ScheduleService {
    ServiceContext::from_state(state).schedule()
}

/// Applies the configured default and ceiling; zero values still reach the
/// repository and come back as `InvalidPagination`.
fn page_request(
    state: &AppState,
    page: Option<u64>,
    page_size: Option<u64>,
) -> Result<PageRequest, AppError> {
    let page_size = state.config.pagination.clamp(page_size);
    Ok(PageRequest::new(page.unwrap_or(1), page_size)?)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/schedule", get(list_by_date).post(create_item))
        .route("/schedule/all", get(list_all))
        .route("/schedule/search", get(search))
        .route("/schedule/completion", get(list_by_completion))
        .route("/schedule/category", get(group_by_category))
        .route("/schedule/priority", get(group_by_priority))
        .route("/schedule/completed", get(list_completed))
        .route("/schedule/range", get(list_by_range))
        .route("/schedule/daily-stats", get(daily_stats))
        .route("/schedule/monthly-stats", get(monthly_stats))
        .route(
            "/schedule/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/schedule/{id}/complete", put(complete_item))
        .route("/schedule/{id}/uncomplete", put(uncomplete_item))
        .with_state(state)
}

async fn list_by_date(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<DayParams>,
) -> ApiResult<Page<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let page = page_request(state.as_ref(), params.page, params.page_size)?;
    let query = DayQuery {
        date: params.date,
        priority_level: params.priority_level,
        sort_by_priority: params.sort_by_priority,
        is_completed: params.is_completed,
        sort_mode: params.sort_mode,
    };
    let items = schedule_service(state.as_ref())
        .list_by_date(scope, query, page)
        .await?;
    JsonApiResponse::ok(items.map(ScheduleItemResponse::from))
}

async fn list_all(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let page = page_request(state.as_ref(), params.page, params.page_size)?;
    let query = ListQuery {
        priority_level: params.priority_level,
        sort_by_priority: params.sort_by_priority,
        order_by: params.order_by,
    };
    let items = schedule_service(state.as_ref())
        .list_all(scope, query, page)
        .await?;
    JsonApiResponse::ok(items.map(ScheduleItemResponse::from))
}

async fn search(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<SearchParams>,
) -> ApiResult<Page<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let page = page_request(state.as_ref(), params.page, params.page_size)?;
    let criteria = SearchCriteria {
        keyword: params.keyword,
        include_completed: params.include_completed.unwrap_or(true),
        start_date: params.start_date,
        end_date: params.end_date,
        priority_level: params.priority_level,
        tag: params.tag,
        search_type: params.search_type,
    };
    let items = schedule_service(state.as_ref())
        .search(scope, criteria, page)
        .await?;
    JsonApiResponse::ok(items.map(ScheduleItemResponse::from))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Json(body): Json<CreateScheduleRequest>,
) -> ApiResult<ScheduleItemResponse> {
    let scope = auth.owner_scope()?;
    let item = schedule_service(state.as_ref())
        .add(scope, body.into())
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", item.into())
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Path(id): Path<i32>,
) -> ApiResult<ScheduleItemResponse> {
    let scope = auth.owner_scope()?;
    let item = schedule_service(state.as_ref()).get(id, scope).await?;
    JsonApiResponse::ok(item.into())
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Path(id): Path<i32>,
    Json(body): Json<UpdateScheduleRequest>,
) -> ApiResult<ScheduleItemResponse> {
    let scope = auth.owner_scope()?;
    let item = schedule_service(state.as_ref())
        .update(id, scope, body.into())
        .await?;
    JsonApiResponse::ok(item.into())
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let scope = auth.owner_scope()?;
    schedule_service(state.as_ref()).delete(id, scope).await?;
    JsonApiResponse::with_status(StatusCode::OK, "deleted", serde_json::Value::Null)
}

async fn complete_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let scope = auth.owner_scope()?;
    schedule_service(state.as_ref()).complete(id, scope).await?;
    JsonApiResponse::with_status(StatusCode::OK, "completed", serde_json::Value::Null)
}

async fn uncomplete_item(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Path(id): Path<i32>,
) -> ApiResult<serde_json::Value> {
    let scope = auth.owner_scope()?;
    schedule_service(state.as_ref()).uncomplete(id, scope).await?;
    JsonApiResponse::with_status(StatusCode::OK, "uncompleted", serde_json::Value::Null)
}

async fn list_by_completion(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<CompletionParams>,
) -> ApiResult<Vec<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let items = schedule_service(state.as_ref())
        .list_by_date_and_completion(scope, params.date, params.is_completed)
        .await?;
    JsonApiResponse::ok(into_responses(items))
}

async fn list_completed(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
) -> ApiResult<Vec<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let items = schedule_service(state.as_ref())
        .list_completed(scope)
        .await?;
    JsonApiResponse::ok(into_responses(items))
}

async fn list_by_range(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<RangeParams>,
) -> ApiResult<Vec<ScheduleItemResponse>> {
    let scope = auth.owner_scope()?;
    let items = schedule_service(state.as_ref())
        .list_by_date_range(scope, params.start, params.end)
        .await?;
    JsonApiResponse::ok(into_responses(items))
}

async fn group_by_category(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
) -> ApiResult<Vec<CategoryGroupResponse>> {
    let scope = auth.owner_scope()?;
    let groups = schedule_service(state.as_ref())
        .group_by_category(scope)
        .await?;
    JsonApiResponse::ok(groups.into_iter().map(CategoryGroupResponse::from).collect())
}

async fn group_by_priority(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
) -> ApiResult<Vec<PriorityGroupResponse>> {
    let scope = auth.owner_scope()?;
    let groups = schedule_service(state.as_ref())
        .group_by_priority(scope)
        .await?;
    JsonApiResponse::ok(groups.into_iter().map(PriorityGroupResponse::from).collect())
}

async fn daily_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<DateParams>,
) -> ApiResult<DailyStats> {
    let scope = auth.owner_scope()?;
    let stats = schedule_service(state.as_ref())
        .daily_stats(scope, params.date)
        .await?;
    JsonApiResponse::ok(stats)
}

async fn monthly_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthGuard,
    Query(params): Query<MonthParams>,
) -> ApiResult<Vec<DailyStats>> {
    let scope = auth.owner_scope()?;
    let stats = schedule_service(state.as_ref())
        .monthly_stats(scope, params.year, params.month)
        .await?;
    JsonApiResponse::ok(stats)
}
