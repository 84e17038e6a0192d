//! Initiatives, plus the Kanban board and Gantt timeline built from them.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, prelude::Date, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{InitiativeStatus, goal, initiative, user};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, ensure_exists, get_scoped, list_scoped, scoped};
use crate::utils::{new_id, now_timestamp};

pub struct InitiativesModule;

impl RouteModule for InitiativesModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_initiatives).post(create_initiative))
            .route("/board", get(board))
            .route("/timeline", get(timeline))
            .route(
                "/{id}",
                get(get_initiative)
                    .patch(update_initiative)
                    .delete(delete_initiative),
            )
            .route("/{id}/status", patch(update_status))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/initiatives")
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateInitiative {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub status: Option<InitiativeStatus>,
    #[validate(range(min = 0, max = 100))]
    pub progress: Option<i32>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub owner_id: Option<String>,
}

fn validate_create_dates(req: &CreateInitiative) -> std::result::Result<(), ValidationError> {
    check_date_order(req.start_date, req.end_date)
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInitiative {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    pub status: Option<InitiativeStatus>,
    #[validate(range(min = 0, max = 100))]
    pub progress: Option<i32>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub start_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub end_date: Option<Option<Date>>,
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub owner_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatus {
    pub status: InitiativeStatus,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct InitiativeFilter {
    pub status: Option<InitiativeStatus>,
}

fn check_date_order(
    start: Option<Date>,
    end: Option<Date>,
) -> std::result::Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("end_date must not be before start_date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// One Kanban column.
#[derive(Debug, Serialize)]
pub struct BoardColumn {
    pub status: InitiativeStatus,
    pub count: usize,
    pub items: Vec<initiative::Model>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub columns: Vec<BoardColumn>,
    pub total: usize,
}

impl BoardResponse {
    /// Partition initiatives into the fixed column order, keeping input order
    /// inside each column.
    pub fn from_initiatives(initiatives: Vec<initiative::Model>) -> Self {
        let total = initiatives.len();
        let mut columns: Vec<BoardColumn> = InitiativeStatus::ALL
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                count: 0,
                items: Vec::new(),
            })
            .collect();

        for item in initiatives {
            let status = item.status();
            if let Some(column) = columns.iter_mut().find(|c| c.status == status) {
                column.items.push(item);
                column.count += 1;
            }
        }

        Self { columns, total }
    }
}

/// A Gantt bar. Dates are whole days.
#[derive(Debug, Serialize)]
pub struct TimelineEvent {
    pub id: String,
    pub title: String,
    pub start: Date,
    pub end: Date,
    pub progress: i32,
    pub status: InitiativeStatus,
    pub color: &'static str,
    pub all_day: bool,
}

impl TimelineEvent {
    /// `None` for initiatives that have not been scheduled.
    pub fn from_initiative(item: initiative::Model) -> Option<Self> {
        let start = item.start_date?;
        let status = item.status();

        Some(Self {
            end: item.end_date.unwrap_or(start),
            start,
            progress: item.progress,
            color: status_color(status),
            status,
            id: item.id,
            title: item.title,
            all_day: true,
        })
    }
}

pub fn status_color(status: InitiativeStatus) -> &'static str {
    match status {
        InitiativeStatus::Planned => "#94a3b8",
        InitiativeStatus::InProgress => "#3b82f6",
        InitiativeStatus::OnHold => "#f59e0b",
        InitiativeStatus::Completed => "#22c55e",
    }
}

async fn list_initiatives(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<InitiativeFilter>,
) -> Result<Json<PaginatedData<initiative::Model>>> {
    let condition = Condition::all().add_option(
        filter
            .status
            .map(|s| initiative::Column::Status.eq(s.as_str())),
    );

    let (items, total) = list_scoped::<initiative::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        condition,
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_initiative(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<initiative::Model>> {
    let item =
        get_scoped::<initiative::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(item))
}

async fn create_initiative(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateInitiative>,
) -> Result<CreatedResponse<initiative::Model>> {
    ensure_exists::<user::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "owner_id",
        req.owner_id.as_deref(),
    )
    .await?;

    let now = now_timestamp();
    let item = initiative::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        title: Set(req.title.trim().to_string()),
        description: Set(non_blank(req.description)),
        status: Set(req
            .status
            .unwrap_or(InitiativeStatus::Planned)
            .as_str()
            .to_string()),
        progress: Set(req.progress.unwrap_or(0)),
        start_date: Set(req.start_date),
        end_date: Set(req.end_date),
        owner_id: Set(req.owner_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    tracing::debug!(initiative_id = %item.id, status = %item.status, "Initiative created");

    let location = format!("/api/initiatives/{}", item.id);
    Ok(CreatedResponse::new(item, location))
}

async fn update_initiative(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateInitiative>,
) -> Result<Json<initiative::Model>> {
    let current =
        get_scoped::<initiative::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    ensure_exists::<user::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "owner_id",
        req.owner_id.as_ref().and_then(Option::as_deref),
    )
    .await?;

    // The merged dates must still be ordered
    let start = req.start_date.unwrap_or(current.start_date);
    let end = req.end_date.unwrap_or(current.end_date);
    if check_date_order(start, end).is_err() {
        return Err(VerdantError::bad_request(
            "end_date must not be before start_date",
        ));
    }

    let mut active: initiative::ActiveModel = current.into();

    if let Some(title) = non_blank(req.title) {
        active.title = Set(title);
    }
    if let Some(description) = req.description {
        active.description = Set(non_blank(description));
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(progress) = req.progress {
        active.progress = Set(progress);
    }
    if let Some(start_date) = req.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = req.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(owner_id) = req.owner_id {
        active.owner_id = Set(owner_id);
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

/// Moves a card between board columns. Progress is left alone.
async fn update_status(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateStatus>,
) -> Result<Json<initiative::Model>> {
    let current =
        get_scoped::<initiative::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let from = current.status();

    let mut active: initiative::ActiveModel = current.into();
    active.status = Set(req.status.as_str().to_string());
    active.updated_at = Set(now_timestamp());
    let updated = active.update(&ctx.db).await?;

    tracing::info!(initiative_id = %id, from = %from, to = %req.status, "Initiative moved");
    Ok(Json(updated))
}

/// Goals of the initiative are kept and detached.
async fn delete_initiative(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    let org = tenant.organization_id.as_str();
    let txn = ctx.db.begin().await?;

    goal::Entity::update_many()
        .col_expr(goal::Column::InitiativeId, Expr::value(Option::<String>::None))
        .filter(goal::Column::OrganizationId.eq(org))
        .filter(goal::Column::InitiativeId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    if !delete_scoped::<initiative::Entity, _>(&txn, org, &id).await? {
        return Err(VerdantError::not_found("Initiative not found"));
    }
    txn.commit().await?;

    tracing::info!(organization_id = %org, initiative_id = %id, "Initiative deleted");
    Ok(NoContentResponse)
}

async fn board(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
) -> Result<Json<BoardResponse>> {
    let initiatives = scoped::<initiative::Entity>(&tenant.organization_id)
        .order_by_desc(initiative::Column::CreatedAt)
        .order_by_desc(initiative::Column::Id)
        .all(&ctx.db)
        .await?;

    Ok(Json(BoardResponse::from_initiatives(initiatives)))
}

async fn timeline(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
) -> Result<Json<Vec<TimelineEvent>>> {
    let initiatives = scoped::<initiative::Entity>(&tenant.organization_id)
        .filter(initiative::Column::StartDate.is_not_null())
        .order_by_asc(initiative::Column::StartDate)
        .order_by_asc(initiative::Column::CreatedAt)
        .order_by_asc(initiative::Column::Id)
        .all(&ctx.db)
        .await?;

    let events = initiatives
        .into_iter()
        .filter_map(TimelineEvent::from_initiative)
        .collect();

    Ok(Json(events))
}
