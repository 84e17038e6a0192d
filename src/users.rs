//! User management inside one organization.

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

use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{Role, dashboard_layout, initiative, user};
use crate::error::{Result, VerdantError};
use crate::http::{
    CreatedResponse, NoContentResponse, PaginatedData, PaginationQuery, RouteModule,
    ValidatedJson, ValidatedQuery,
};
use crate::tenancy::{delete_scoped, get_scoped, list_scoped};
use crate::utils::{new_id, normalize_email, now_timestamp};

pub struct UsersModule;

impl RouteModule for UsersModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/", get(list_users).post(create_user))
            .route(
                "/{id}",
                get(get_user).patch(update_user).delete(delete_user),
            )
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/users")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Member
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

async fn list_users(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(page): ValidatedQuery<PaginationQuery>,
) -> Result<Json<PaginatedData<user::Model>>> {
    let (items, total) = list_scoped::<user::Entity, _>(
        &ctx.db,
        &tenant.organization_id,
        Condition::all(),
        &page,
    )
    .await?;

    Ok(Json(PaginatedData::new(items, total, &page)))
}

async fn get_user(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<user::Model>> {
    let user = get_scoped::<user::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    Ok(Json(user))
}

async fn create_user(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<CreateUser>,
) -> Result<CreatedResponse<user::Model>> {
    tenant.require_admin()?;

    let email = normalize_email(&req.email);
    let taken = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&ctx.db)
        .await?;
    if taken.is_some() {
        return Err(VerdantError::conflict("Email already registered"));
    }

    let password_hash = ctx.passwords.hash_blocking(req.password).await?;
    let now = now_timestamp();

    let user = user::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        email: Set(email),
        name: Set(req.name.trim().to_string()),
        password_hash: Set(password_hash),
        role: Set(req.role.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&ctx.db)
    .await?;

    tracing::info!(
        organization_id = %tenant.organization_id,
        user_id = %user.id,
        role = %req.role,
        "User created"
    );

    let location = format!("/api/users/{}", user.id);
    Ok(CreatedResponse::new(user, location))
}

/// Admins may edit anyone; members only their own name and password.
async fn update_user(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUser>,
) -> Result<Json<user::Model>> {
    if !tenant.is_admin() {
        if tenant.user_id != id {
            return Err(VerdantError::forbidden("Admin role required"));
        }
        if req.role.is_some() {
            return Err(VerdantError::forbidden("Only admins can change roles"));
        }
    }
    // An admin demoting themselves could leave the organization with no admin
    if tenant.user_id == id && req.role.is_some_and(|role| role != Role::Admin) {
        return Err(VerdantError::bad_request("You cannot change your own role"));
    }

    let current = get_scoped::<user::Entity, _>(&ctx.db, &tenant.organization_id, &id).await?;
    let mut active: user::ActiveModel = current.into();

    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(password) = req.password {
        active.password_hash = Set(ctx.passwords.hash_blocking(password).await?);
    }
    if let Some(role) = req.role {
        active.role = Set(role.as_str().to_string());
    }
    active.updated_at = Set(now_timestamp());

    let updated = active.update(&ctx.db).await?;
    Ok(Json(updated))
}

/// Removes the user's layouts and unassigns their initiatives, then the user.
async fn delete_user(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(id): Path<String>,
) -> Result<NoContentResponse> {
    tenant.require_admin()?;
    if tenant.user_id == id {
        return Err(VerdantError::bad_request("You cannot delete your own account"));
    }

    let org = tenant.organization_id.as_str();
    let txn = ctx.db.begin().await?;

    get_scoped::<user::Entity, _>(&txn, org, &id).await?;

    dashboard_layout::Entity::delete_many()
        .filter(dashboard_layout::Column::OrganizationId.eq(org))
        .filter(dashboard_layout::Column::UserId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    initiative::Entity::update_many()
        .col_expr(initiative::Column::OwnerId, Expr::value(Option::<String>::None))
        .filter(initiative::Column::OrganizationId.eq(org))
        .filter(initiative::Column::OwnerId.eq(id.as_str()))
        .exec(&txn)
        .await?;

    delete_scoped::<user::Entity, _>(&txn, org, &id).await?;
    txn.commit().await?;

    tracing::info!(organization_id = %org, user_id = %id, "User deleted");
    Ok(NoContentResponse)
}
