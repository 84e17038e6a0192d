//! Sensors and their time-series readings.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{SensorType, device, sensor, sensor_reading};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, ensure_exists, get_scoped, list_scoped, scoped};
use crate::utils::{new_id, now_timestamp};

const DEFAULT_READINGS_LIMIT: u64 = 100;
const MAX_READINGS_LIMIT: u64 = 1000;

pub struct SensorsModule;

impl RouteModule for SensorsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_sensors).post(create_sensor))
            .route(
                "/{id}",
                get(get_sensor).patch(update_sensor).delete(delete_sensor),
            )
            .route("/{id}/readings", get(list_readings).post(create_reading))
            .route("/{id}/readings/latest", get(latest_reading))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/sensors")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSensor {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub device_id: String,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    pub sensor_type: SensorType,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub unit: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSensor {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub device_id: Option<String>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    pub sensor_type: Option<SensorType>,
    #[validate(
        length(min = 1, max = 32),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub unit: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SensorFilter {
    pub device_id: Option<String>,
    pub sensor_type: Option<SensorType>,
}

impl SensorFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(
                self.device_id
                    .as_deref()
                    .map(|id| sensor::Column::DeviceId.eq(id)),
            )
            .add_option(
                self.sensor_type
                    .map(|t| sensor::Column::SensorType.eq(t.as_str())),
            )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReading {
    pub value: f64,
    /// Unix seconds; defaults to the time the reading is received
    pub recorded_at: Option<i64>,
}

/// `from` and `to` are inclusive Unix-second bounds on `recorded_at`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReadingsQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
}

async fn list_sensors(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<SensorFilter>,
) -> Result<Json<PaginatedData<sensor::Model>>> {
    let (items, total) = list_scoped::<sensor::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        filter.condition(),
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_sensor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<sensor::Model>> {
    let sensor = get_scoped::<sensor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(sensor))
}

async fn create_sensor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateSensor>,
) -> Result<CreatedResponse<sensor::Model>> {
    ensure_exists::<device::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "device_id",
        Some(&req.device_id),
    )
    .await?;

    let now = now_timestamp();
    let sensor = sensor::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        device_id: Set(req.device_id),
        name: Set(req.name.trim().to_string()),
        sensor_type: Set(req.sensor_type.as_str().to_string()),
        unit: Set(req.unit.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    tracing::debug!(sensor_id = %sensor.id, device_id = %sensor.device_id, "Sensor created");

    let location = format!("/api/sensors/{}", sensor.id);
    Ok(CreatedResponse::new(sensor, location))
}

async fn update_sensor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateSensor>,
) -> Result<Json<sensor::Model>> {
    let current = get_scoped::<sensor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    ensure_exists::<device::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "device_id",
        req.device_id.as_deref(),
    )
    .await?;

    let mut active: sensor::ActiveModel = current.into();

    if let Some(device_id) = req.device_id {
        active.device_id = Set(device_id);
    }
    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(sensor_type) = req.sensor_type {
        active.sensor_type = Set(sensor_type.as_str().to_string());
    }
    if let Some(unit) = non_blank(req.unit) {
        active.unit = Set(unit);
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

async fn delete_sensor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    let org = tenant.organization_id.as_str();
    let txn = ctx.db.begin().await?;

    sensor_reading::Entity::delete_many()
        .filter(sensor_reading::Column::OrganizationId.eq(org))
        .filter(sensor_reading::Column::SensorId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    if !delete_scoped::<sensor::Entity, _>(&txn, org, &id).await? {
        return Err(VerdantError::not_found("Sensor not found"));
    }
    txn.commit().await?;

    tracing::info!(organization_id = %org, sensor_id = %id, "Sensor deleted");
    Ok(NoContentResponse)
}

async fn create_reading(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateReading>,
) -> Result<CreatedResponse<sensor_reading::Model>> {
    if !req.value.is_finite() {
        return Err(VerdantError::bad_request("value must be a finite number"));
    }

    let sensor = get_scoped::<sensor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let now = now_timestamp();

    let reading = sensor_reading::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        sensor_id: Set(sensor.id.clone()),
        value: Set(req.value),
        recorded_at: Set(req.recorded_at.unwrap_or(now)),
        created_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    let location = format!("/api/sensors/{}/readings/latest", sensor.id);
    Ok(CreatedResponse::new(reading, location))
}

/// Newest first, capped at `limit`.
async fn list_readings(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ReadingsQuery>,
) -> Result<Json<Vec<sensor_reading::Model>>> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(VerdantError::bad_request("from must not be after to"));
        }
    }

    get_scoped::<sensor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;

    let condition = Condition::all()
        .add(sensor_reading::Column::SensorId.eq(id.as_str()))
        .add_option(query.from.map(|from| sensor_reading::Column::RecordedAt.gte(from)))
        .add_option(query.to.map(|to| sensor_reading::Column::RecordedAt.lte(to)));

    let limit = query
        .limit
        .unwrap_or(DEFAULT_READINGS_LIMIT)
        .min(MAX_READINGS_LIMIT);

    let readings = scoped::<sensor_reading::Entity>(&tenant.organization_id)
        .filter(condition)
        .order_by_desc(sensor_reading::Column::RecordedAt)
        .order_by_desc(sensor_reading::Column::Id)
        .limit(limit)
        .all(&ctx.db)
        .await?;

    Ok(Json(readings))
}

async fn latest_reading(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<sensor_reading::Model>> {
    get_scoped::<sensor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;

    scoped::<sensor_reading::Entity>(&tenant.organization_id)
        .filter(sensor_reading::Column::SensorId.eq(id.as_str()))
        .order_by_desc(sensor_reading::Column::RecordedAt)
        .order_by_desc(sensor_reading::Column::Id)
        .one(&ctx.db)
        .await?
        .map(Json)
        .ok_or_else(|| VerdantError::not_found("Sensor has no readings"))
}
