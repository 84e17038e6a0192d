//! The caller's own organization: `GET /api/organization` and
//! `PATCH /api/organization` (admins only).

use axum::{Json, Router, extract::State, routing::get};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::organization;
use crate::error::{Result, VerdantError};
use crate::http::{RouteModule, ValidatedJson};
use crate::utils::{normalize_email, now_timestamp};

const MAX_SLUG_LEN: usize = 63;
const SLUG_ATTEMPTS: usize = 5;

pub struct OrganizationModule;

impl RouteModule for OrganizationModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new().route("/", get(get_organization).patch(update_organization))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/organization")
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
}

async fn get_organization(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
) -> Result<Json<organization::Model>> {
    Ok(Json(load(&ctx.db, &tenant.organization_id).await?))
}

async fn update_organization(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedJson(req): ValidatedJson<UpdateOrganization>,
) -> Result<Json<organization::Model>> {
    tenant.require_admin()?;

    let current = load(&ctx.db, &tenant.organization_id).await?;
    let mut active: organization::ActiveModel = current.into();

    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = req.contact_email {
        active.contact_email = Set(normalize_email(&email));
    }
    active.updated_at = Set(now_timestamp());

    let updated = active.update(&ctx.db).await?;
    tracing::info!(organization_id = %updated.id, "Organization updated");
    Ok(Json(updated))
}

pub(crate) async fn load<C: ConnectionTrait>(db: &C, id: &str) -> Result<organization::Model> {
    organization::Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| VerdantError::not_found("Organization not found"))
}

/// URL-safe slug from an organization name: lowercase ASCII letters and
/// digits, runs of anything else collapsed to one hyphen.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        "org".to_string()
    } else {
        slug
    }
}

/// A slug derived from `name` that no organization uses yet.
///
/// Collisions get a short random suffix.
pub(crate) async fn unique_slug<C: ConnectionTrait>(db: &C, name: &str) -> Result<String> {
    let base = slugify(name);
    let mut candidate = base.clone();

    for _ in 0..SLUG_ATTEMPTS {
        let taken = organization::Entity::find()
            .filter(organization::Column::Slug.eq(candidate.as_str()))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }

        let stem: String = base.chars().take(MAX_SLUG_LEN - 5).collect();
        candidate = format!("{}-{:04x}", stem.trim_end_matches('-'), fastrand::u16(..));
    }

    Err(VerdantError::conflict(
        "Could not allocate a unique organization slug",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_slug;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Recycling Co."), "acme-recycling-co");
        assert_eq!(slugify("  --Green   Future--  "), "green-future");
        assert_eq!(slugify("Ümwelt GmbH"), "mwelt-gmbh");
        assert_eq!(slugify("!!!"), "org");
    }

    #[test]
    fn test_slugify_output_is_a_valid_slug() {
        let long = "Zero Waste ".repeat(20);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(validate_slug(&slug).is_ok());
    }
}
