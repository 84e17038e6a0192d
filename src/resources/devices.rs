use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{DeviceStatus, device, sensor, sensor_reading, waste_point};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, ensure_exists, get_scoped, list_scoped};
use crate::utils::{new_id, now_timestamp};

pub struct DevicesModule;

impl RouteModule for DevicesModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_devices).post(create_device))
            .route(
                "/{id}",
                get(get_device).patch(update_device).delete(delete_device),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/devices")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDevice {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub waste_point_id: Option<String>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub device_type: String,
    #[validate(length(max = 100))]
    pub serial_number: Option<String>,
    pub status: Option<DeviceStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDevice {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub waste_point_id: Option<Option<String>>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 100),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub device_type: Option<String>,
    #[validate(length(max = 100))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub serial_number: Option<Option<String>>,
    pub status: Option<DeviceStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeviceFilter {
    pub waste_point_id: Option<String>,
    pub status: Option<DeviceStatus>,
}

impl DeviceFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(
                self.waste_point_id
                    .as_deref()
                    .map(|id| device::Column::WastePointId.eq(id)),
            )
            .add_option(self.status.map(|s| device::Column::Status.eq(s.as_str())))
    }
}

async fn list_devices(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<DeviceFilter>,
) -> Result<Json<PaginatedData<device::Model>>> {
    let (items, total) = list_scoped::<device::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        filter.condition(),
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_device(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<device::Model>> {
    let device = get_scoped::<device::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(device))
}

async fn create_device(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateDevice>,
) -> Result<CreatedResponse<device::Model>> {
    ensure_exists::<waste_point::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "waste_point_id",
        req.waste_point_id.as_deref(),
    )
    .await?;

    let now = now_timestamp();
    let device = device::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        waste_point_id: Set(req.waste_point_id),
        name: Set(req.name.trim().to_string()),
        device_type: Set(req.device_type.trim().to_string()),
        serial_number: Set(non_blank(req.serial_number)),
        status: Set(req
            .status
            .unwrap_or(DeviceStatus::Offline)
            .as_str()
            .to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    tracing::debug!(device_id = %device.id, "Device created");

    let location = format!("/api/devices/{}", device.id);
    Ok(CreatedResponse::new(device, location))
}

async fn update_device(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateDevice>,
) -> Result<Json<device::Model>> {
    let current = get_scoped::<device::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    ensure_exists::<waste_point::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "waste_point_id",
        req.waste_point_id.as_ref().and_then(Option::as_deref),
    )
    .await?;

    let mut active: device::ActiveModel = current.into();

    if let Some(waste_point_id) = req.waste_point_id {
        active.waste_point_id = Set(waste_point_id);
    }
    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(device_type) = non_blank(req.device_type) {
        active.device_type = Set(device_type);
    }
    if let Some(serial_number) = req.serial_number {
        active.serial_number = Set(non_blank(serial_number));
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

/// Takes the device's sensors and all their readings with it.
async fn delete_device(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    let org = tenant.organization_id.as_str();
    let txn = ctx.db.begin().await?;

    get_scoped::<device::Entity, _>(&txn, org, &id).await?;

    let sensor_ids: Vec<String> = sensor::Entity::find()
        .filter(sensor::Column::OrganizationId.eq(org))
        .filter(sensor::Column::DeviceId.eq(id.as_str()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    if !sensor_ids.is_empty() {
        sensor_reading::Entity::delete_many()
            .filter(sensor_reading::Column::OrganizationId.eq(org))
            .filter(sensor_reading::Column::SensorId.is_in(sensor_ids.clone()))
            .exec(&txn)
            .await?;

        sensor::Entity::delete_many()
            .filter(sensor::Column::OrganizationId.eq(org))
            .filter(sensor::Column::Id.is_in(sensor_ids))
            .exec(&txn)
            .await?;
    }

    if !delete_scoped::<device::Entity, _>(&txn, org, &id).await? {
        return Err(VerdantError::not_found("Device not found"));
    }
    txn.commit().await?;

    tracing::info!(organization_id = %org, device_id = %id, "Device deleted");
    Ok(NoContentResponse)
}
