use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, Set, prelude::Date};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{goal, initiative};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, ensure_exists, get_scoped, list_scoped};
use crate::utils::{new_id, now_timestamp};

pub struct GoalsModule;

impl RouteModule for GoalsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_goals).post(create_goal))
            .route(
                "/{id}",
                get(get_goal).patch(update_goal).delete(delete_goal),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/goals")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoal {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub initiative_id: Option<String>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub metric: String,
    #[validate(range(exclusive_min = 0.0))]
    pub target_value: f64,
    #[validate(range(min = 0.0))]
    pub current_value: Option<f64>,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub unit: String,
    pub due_date: Option<Date>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGoal {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub initiative_id: Option<Option<String>>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub metric: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub target_value: Option<f64>,
    #[validate(range(min = 0.0))]
    pub current_value: Option<f64>,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub due_date: Option<Option<Date>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GoalFilter {
    pub initiative_id: Option<String>,
}

/// A goal with its derived progress.
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: goal::Model,
    pub progress_percent: f64,
    pub achieved: bool,
}

impl From<goal::Model> for GoalResponse {
    fn from(goal: goal::Model) -> Self {
        Self {
            progress_percent: goal.progress_percent(),
            achieved: goal.is_achieved(),
            goal,
        }
    }
}

async fn list_goals(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<GoalFilter>,
) -> Result<Json<PaginatedData<GoalResponse>>> {
    let condition = Condition::all().add_option(
        filter
            .initiative_id
            .as_deref()
            .map(|id| goal::Column::InitiativeId.eq(id)),
    );

    let (items, total) =
        list_scoped::<goal::Entity, _>(&ctx.db, &tenant.organization_id, condition, &page)
            .await?;

    Ok(Json(
        PaginatedData::new(items, total, &page).map(GoalResponse::from),
    ))
}

async fn get_goal(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<GoalResponse>> {
    let goal = get_scoped::<goal::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(goal.into()))
}

async fn create_goal(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateGoal>,
) -> Result<CreatedResponse<GoalResponse>> {
    ensure_exists::<initiative::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "initiative_id",
        req.initiative_id.as_deref(),
    )
    .await?;

    let now = now_timestamp();
    let goal = goal::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        initiative_id: Set(req.initiative_id),
        name: Set(req.name.trim().to_string()),
        metric: Set(req.metric.trim().to_string()),
        target_value: Set(req.target_value),
        current_value: Set(req.current_value.unwrap_or(0.0)),
        unit: Set(req.unit.trim().to_string()),
        due_date: Set(req.due_date),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    let location = format!("/api/goals/{}", goal.id);
    Ok(CreatedResponse::new(goal.into(), location))
}

async fn update_goal(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateGoal>,
) -> Result<Json<GoalResponse>> {
    let current = get_scoped::<goal::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    ensure_exists::<initiative::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "initiative_id",
        req.initiative_id.as_ref().and_then(Option::as_deref),
    )
    .await?;

    let mut active: goal::ActiveModel = current.into();

    if let Some(initiative_id) = req.initiative_id {
        active.initiative_id = Set(initiative_id);
    }
    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(metric) = non_blank(req.metric) {
        active.metric = Set(metric);
    }
    if let Some(target) = req.target_value {
        active.target_value = Set(target);
    }
    if let Some(current) = req.current_value {
        active.current_value = Set(current);
    }
    if let Some(unit) = non_blank(req.unit) {
        active.unit = Set(unit);
    }
    if let Some(due_date) = req.due_date {
        active.due_date = Set(due_date);
    }
    active.updated_at = Set(now_timestamp());

    let updated = active.update(&ctx.db).await?;
    Ok(Json(updated.into()))
}

async fn delete_goal(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    if !delete_scoped::<goal::Entity, _>(&ctx.db, &tenant.organization_id, &id).await? {
        return Err(VerdantError::not_found("Goal not found"));
    }
    Ok(NoContentResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_must_be_positive() {
        let req = UpdateGoal {
            target_value: Some(0.0),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateGoal {
            target_value: Some(0.5),
            current_value: Some(0.0),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_response_carries_progress() {
        let goal = goal::Model {
            id: "g".into(),
            organization_id: "o".into(),
            initiative_id: None,
            name: "Cut landfill".into(),
            metric: "landfill_kg".into(),
            target_value: 200.0,
            current_value: 50.0,
            unit: "kg".into(),
            due_date: None,
            created_at: 0,
            updated_at: 0,
        };

        let json = serde_json::to_value(GoalResponse::from(goal)).unwrap();
        assert_eq!(json["progress_percent"], 25.0);
        assert_eq!(json["achieved"], false);
        assert_eq!(json["name"], "Cut landfill");
    }
}
