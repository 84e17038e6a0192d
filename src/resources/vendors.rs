use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, Set};
use serde::Deserialize;
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{ActiveStatus, ServiceType, vendor};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, get_scoped, list_scoped};
use crate::utils::{new_id, normalize_email, now_timestamp};

pub struct VendorsModule;

impl RouteModule for VendorsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_vendors).post(create_vendor))
            .route(
                "/{id}",
                get(get_vendor).patch(update_vendor).delete(delete_vendor),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/vendors")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendor {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    pub service_type: ServiceType,
    #[validate(length(max = 200))]
    pub contact_name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(custom(function = "crate::validation::validate_phone"))]
    pub phone: Option<String>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVendor {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    pub service_type: Option<ServiceType>,
    #[validate(length(max = 200))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub contact_name: Option<Option<String>>,
    #[validate(email)]
    #[serde(default, deserialize_with = "super::nullable")]
    pub contact_email: Option<Option<String>>,
    #[validate(custom(function = "crate::validation::validate_phone"))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub phone: Option<Option<String>>,
    pub status: Option<ActiveStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct VendorFilter {
    pub status: Option<ActiveStatus>,
    pub service_type: Option<ServiceType>,
}

async fn list_vendors(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<VendorFilter>,
) -> Result<Json<PaginatedData<vendor::Model>>> {
    let condition = Condition::all()
        .add_option(filter.status.map(|s| vendor::Column::Status.eq(s.as_str())))
        .add_option(
            filter
                .service_type
                .map(|t| vendor::Column::ServiceType.eq(t.as_str())),
        );

    let (items, total) =
        list_scoped::<vendor::Entity, _>(&ctx.db, &tenant.organization_id, condition, &page)
            .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_vendor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<vendor::Model>> {
    let vendor = get_scoped::<vendor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(vendor))
}

async fn create_vendor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateVendor>,
) -> Result<CreatedResponse<vendor::Model>> {
    let now = now_timestamp();
    let vendor = vendor::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        name: Set(req.name.trim().to_string()),
        service_type: Set(req.service_type.as_str().to_string()),
        contact_name: Set(non_blank(req.contact_name)),
        contact_email: Set(req.contact_email.as_deref().map(normalize_email)),
        phone: Set(non_blank(req.phone)),
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

    let location = format!("/api/vendors/{}", vendor.id);
    Ok(CreatedResponse::new(vendor, location))
}

async fn update_vendor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateVendor>,
) -> Result<Json<vendor::Model>> {
    let current = get_scoped::<vendor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let mut active: vendor::ActiveModel = current.into();

    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(service_type) = req.service_type {
        active.service_type = Set(service_type.as_str().to_string());
    }
    if let Some(contact_name) = req.contact_name {
        active.contact_name = Set(non_blank(contact_name));
    }
    if let Some(email) = req.contact_email {
        active.contact_email = Set(email.map(|e| normalize_email(&e)));
    }
    if let Some(phone) = req.phone {
        active.phone = Set(non_blank(phone));
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

async fn delete_vendor(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    if !delete_scoped::<vendor::Entity, _>(&ctx.db, &tenant.organization_id, &id).await? {
        return Err(VerdantError::not_found("Vendor not found"));
    }
    Ok(NoContentResponse)
}
