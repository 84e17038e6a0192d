use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::Deserialize;
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{ActiveStatus, WasteType, device, image, waste_point};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, get_scoped, list_scoped};
use crate::utils::{new_id, now_timestamp};

pub struct WastePointsModule;

impl RouteModule for WastePointsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_waste_points).post(create_waste_point))
            .route(
                "/{id}",
                get(get_waste_point)
                    .patch(update_waste_point)
                    .delete(delete_waste_point),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/waste-points")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWastePoint {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 500),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub waste_type: WasteType,
    #[validate(range(min = 0.0))]
    pub capacity_kg: Option<f64>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateWastePoint {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 500),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub latitude: Option<Option<f64>>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub longitude: Option<Option<f64>>,
    pub waste_type: Option<WasteType>,
    #[validate(range(min = 0.0))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub capacity_kg: Option<Option<f64>>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct WastePointFilter {
    pub waste_type: Option<WasteType>,
    pub status: Option<ActiveStatus>,
}

impl WastePointFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(
                self.waste_type
                    .map(|t| waste_point::Column::WasteType.eq(t.as_str())),
            )
            .add_option(self.status.map(|s| waste_point::Column::Status.eq(s.as_str())))
    }
}

async fn list_waste_points(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<WastePointFilter>,
) -> Result<Json<PaginatedData<waste_point::Model>>> {
    let (items, total) = list_scoped::<waste_point::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        filter.condition(),
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_waste_point(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<waste_point::Model>> {
    let point =
        get_scoped::<waste_point::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(point))
}

async fn create_waste_point(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateWastePoint>,
) -> Result<CreatedResponse<waste_point::Model>> {
    let now = now_timestamp();

    let point = waste_point::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        name: Set(req.name.trim().to_string()),
        location: Set(req.location.trim().to_string()),
        latitude: Set(req.latitude),
        longitude: Set(req.longitude),
        waste_type: Set(req.waste_type.as_str().to_string()),
        capacity_kg: Set(req.capacity_kg),
        status: Set(req
            .status
            .unwrap_or(ActiveStatus::Active)
            .as_str()
            .to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    tracing::debug!(waste_point_id = %point.id, "Waste point created");

    let location = format!("/api/waste-points/{}", point.id);
    Ok(CreatedResponse::new(point, location))
}

async fn update_waste_point(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateWastePoint>,
) -> Result<Json<waste_point::Model>> {
    let current =
        get_scoped::<waste_point::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let mut active: waste_point::ActiveModel = current.into();

    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(location) = non_blank(req.location) {
        active.location = Set(location);
    }
    if let Some(latitude) = req.latitude {
        active.latitude = Set(latitude);
    }
    if let Some(longitude) = req.longitude {
        active.longitude = Set(longitude);
    }
    if let Some(waste_type) = req.waste_type {
        active.waste_type = Set(waste_type.as_str().to_string());
    }
    if let Some(capacity_kg) = req.capacity_kg {
        active.capacity_kg = Set(capacity_kg);
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

/// Devices and images at the point stay, detached from it.
async fn delete_waste_point(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    let org = tenant.organization_id.as_str();
    let txn = ctx.db.begin().await?;

    device::Entity::update_many()
        .col_expr(device::Column::WastePointId, Expr::value(Option::<String>::None))
        .filter(device::Column::OrganizationId.eq(org))
        .filter(device::Column::WastePointId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    image::Entity::update_many()
        .col_expr(image::Column::WastePointId, Expr::value(Option::<String>::None))
        .filter(image::Column::OrganizationId.eq(org))
        .filter(image::Column::WastePointId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    if !delete_scoped::<waste_point::Entity, _>(&txn, org, &id).await? {
        return Err(VerdantError::not_found("Waste point not found"));
    }
    txn.commit().await?;

    tracing::info!(organization_id = %org, waste_point_id = %id, "Waste point deleted");
    Ok(NoContentResponse)
}
