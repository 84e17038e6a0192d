//! User-defined data models: a name plus a free-form JSON object schema.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use sea_orm::{ActiveModelTrait, Condition, Set};
use serde::Deserialize;
use validator::Validate;

use super::non_blank;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::data_model;
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, get_scoped, list_scoped};
use crate::utils::{new_id, now_timestamp};

pub struct DataModelsModule;

impl RouteModule for DataModelsModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_data_models).post(create_data_model))
            .route(
                "/{id}",
                get(get_data_model)
                    .patch(update_data_model)
                    .delete(delete_data_model),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/data-models")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDataModel {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(custom(function = "crate::validation::validate_json_object"))]
    pub schema: serde_json::Value,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDataModel {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    #[validate(custom(function = "crate::validation::validate_json_object"))]
    pub schema: Option<serde_json::Value>,
}

async fn list_data_models(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
) -> Result<Json<PaginatedData<data_model::Model>>> {
    let (items, total) = list_scoped::<data_model::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        Condition::all(),
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_data_model(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<data_model::Model>> {
    let model =
        get_scoped::<data_model::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(model))
}

async fn create_data_model(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateDataModel>,
) -> Result<CreatedResponse<data_model::Model>> {
    let now = now_timestamp();
    let model = data_model::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        name: Set(req.name.trim().to_string()),
        description: Set(non_blank(req.description)),
        schema: Set(req.schema),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    let location = format!("/api/data-models/{}", model.id);
    Ok(CreatedResponse::new(model, location))
}

async fn update_data_model(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateDataModel>,
) -> Result<Json<data_model::Model>> {
    let current =
        get_scoped::<data_model::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let mut active: data_model::ActiveModel = current.into();

    if let Some(name) = non_blank(req.name) {
        active.name = Set(name);
    }
    if let Some(description) = req.description {
        active.description = Set(non_blank(description));
    }
    if let Some(schema) = req.schema {
        active.schema = Set(schema);
    }
    active.updated_at = Set(now_timestamp());

    Ok(Json(active.update(&ctx.db).await?))
}

async fn delete_data_model(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    if !delete_scoped::<data_model::Entity, _>(&ctx.db, &tenant.organization_id, &id).await? {
        return Err(VerdantError::not_found("Data model not found"));
    }
    Ok(NoContentResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_must_be_an_object() {
        let ok: CreateDataModel = serde_json::from_value(json!({
            "name": "Bin audit",
            "schema": {"fields": [{"name": "weight", "type": "number"}]}
        }))
        .unwrap();
        assert!(ok.validate().is_ok());

        let bad: CreateDataModel = serde_json::from_value(json!({
            "name": "Bin audit",
            "schema": ["weight"]
        }))
        .unwrap();
        assert!(bad.validate().is_err());
    }
}
