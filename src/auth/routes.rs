//! `/api/auth`: register, login, logout, me.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppContext;
use crate::entities::{Role, organization, user};
use crate::error::{Result, VerdantError};
use crate::http::{ApiResponse, RouteModule, ValidatedJson};
use crate::organizations;
use crate::tenancy::get_scoped;
use crate::utils::{new_id, normalize_email, now_timestamp};
use crate::validation::validate_slug;

use super::TenantContext;
use super::tokens::IssuedToken;

pub struct AuthModule;

impl RouteModule for AuthModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/me", get(me))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/auth")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub organization_name: String,
    /// Derived from the name when omitted
    #[validate(custom(function = "validate_slug"))]
    pub organization_slug: Option<String>,
    /// Defaults to the registering user's email
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: user::Model,
    pub organization: organization::Model,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: user::Model,
    pub organization: organization::Model,
}

/// Creates an organization and its first admin in one transaction.
async fn register(
    State(ctx): State<AppContext>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Response> {
    let email = normalize_email(&req.email);
    let password_hash = ctx.passwords.hash_blocking(req.password).await?;
    let now = now_timestamp();

    let txn = ctx.db.begin().await?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(VerdantError::conflict("Email already registered"));
    }

    let slug = match req.organization_slug {
        Some(slug) => slug,
        None => organizations::unique_slug(&txn, &req.organization_name).await?,
    };

    let organization = organization::ActiveModel {
        id: Set(new_id()),
        name: Set(req.organization_name.trim().to_string()),
        slug: Set(slug),
        contact_email: Set(req
            .contact_email
            .as_deref()
            .map(normalize_email)
            .unwrap_or_else(|| email.clone())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let user = user::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(organization.id.clone()),
        email: Set(email),
        name: Set(req.name.trim().to_string()),
        password_hash: Set(password_hash),
        role: Set(Role::Admin.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        organization_id = %organization.id,
        user_id = %user.id,
        slug = %organization.slug,
        "Organization registered"
    );

    let token = ctx.tokens.issue(&user)?;
    let cookie = ctx.session.issue(&token.token);
    let body = AuthResponse {
        token,
        user,
        organization,
    };

    Ok((StatusCode::CREATED, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

async fn login(
    State(ctx): State<AppContext>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Response> {
    let email = normalize_email(&req.email);

    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&ctx.db)
        .await?
    else {
        tracing::debug!("Login for unknown email");
        return Err(invalid_credentials());
    };

    let valid = ctx
        .passwords
        .verify_blocking(req.password, user.password_hash.clone())
        .await?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let organization = organizations::load(&ctx.db, &user.organization_id).await?;
    let token = ctx.tokens.issue(&user)?;
    let cookie = ctx.session.issue(&token.token);

    tracing::info!(user_id = %user.id, organization_id = %organization.id, "User logged in");

    let body = AuthResponse {
        token,
        user,
        organization,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Clears the session cookie. Bearer tokens simply expire.
async fn logout(State(ctx): State<AppContext>) -> Response {
    (
        [(header::SET_COOKIE, ctx.session.clear())],
        ApiResponse::message("Logged out"),
    )
        .into_response()
}

async fn me(State(ctx): State<AppContext>, tenant: TenantContext) -> Result<Json<MeResponse>> {
    let user = get_scoped::<user::Entity, _>(&ctx.db, &tenant.organization_id, &tenant.user_id)
        .await?;
    let organization = organizations::load(&ctx.db, &tenant.organization_id).await?;

    Ok(Json(MeResponse { user, organization }))
}

/// Same answer for unknown email and wrong password
fn invalid_credentials() -> VerdantError {
    VerdantError::unauthorized("Invalid email or password")
}
