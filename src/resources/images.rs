//! Image metadata. Files live elsewhere; only the URL is stored.

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
use crate::entities::{image, waste_point};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, ensure_exists, get_scoped, list_scoped};
use crate::utils::{new_id, now_timestamp};

pub struct ImagesModule;

impl RouteModule for ImagesModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_images).post(create_image))
            .route(
                "/{id}",
                get(get_image).patch(update_image).delete(delete_image),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/images")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateImage {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    pub waste_point_id: Option<String>,
    #[validate(url, length(max = 2048))]
    pub url: String,
    #[validate(length(max = 500))]
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateImage {
    #[validate(custom(function = "crate::validation::validate_uuid"))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub waste_point_id: Option<Option<String>>,
    #[validate(url, length(max = 2048))]
    pub url: Option<String>,
    #[validate(length(max = 500))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub caption: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ImageFilter {
    pub waste_point_id: Option<String>,
}

async fn list_images(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
    ValidatedQuery(filter): ValidatedQuery<ImageFilter>,
) -> Result<Json<PaginatedData<image::Model>>> {
    let condition = Condition::all().add_option(
        filter
            .waste_point_id
            .as_deref()
            .map(|id| image::Column::WastePointId.eq(id)),
    );

    let (items, total) =
        list_scoped::<image::Entity, _>(&ctx.db, &tenant.organization_id, condition, &page)
            .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_image(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<image::Model>> {
    let image = get_scoped::<image::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(image))
}

async fn create_image(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateImage>,
) -> Result<CreatedResponse<image::Model>> {
    ensure_exists::<waste_point::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "waste_point_id",
        req.waste_point_id.as_deref(),
    )
    .await?;

    let image = image::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        waste_point_id: Set(req.waste_point_id),
        url: Set(req.url),
        caption: Set(non_blank(req.caption)),
        created_at: Set(now_timestamp()),
    }
    .insert(&ctx.db)
    .await?;

    let location = format!("/api/images/{}", image.id);
    Ok(CreatedResponse::new(image, location))
}

async fn update_image(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateImage>,
) -> Result<Json<image::Model>> {
    let current = get_scoped::<image::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    ensure_exists::<waste_point::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        "waste_point_id",
        req.waste_point_id.as_ref().and_then(Option::as_deref),
    )
    .await?;

    let mut active: image::ActiveModel = current.into();

    if let Some(waste_point_id) = req.waste_point_id {
        active.waste_point_id = Set(waste_point_id);
    }
    if let Some(url) = req.url {
        active.url = Set(url);
    }
    if let Some(caption) = req.caption {
        active.caption = Set(non_blank(caption));
    }

    Ok(Json(active.update(&ctx.db).await?))
}

async fn delete_image(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    if !delete_scoped::<image::Entity, _>(&ctx.db, &tenant.organization_id, &id).await? {
        return Err(VerdantError::not_found("Image not found"));
    }
    Ok(NoContentResponse)
}
