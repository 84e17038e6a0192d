use crate::app::AppContext;
use crate::auth::token::TokenExtractor;
use crate::entities::{Role, user};
use crate::error::{Result, VerdantError};
use crate::tenancy::find_scoped;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated user and the organization every query is scoped to
///
/// Extracting it verifies the token and reloads the user inside the token's
/// organization, so a deleted user loses access immediately even while the
/// token is still unexpired.
///
/// ```rust,ignore
/// async fn list_devices(
///     State(ctx): State<AppContext>,
///     tenant: TenantContext,
/// ) -> verdant::Result<Json<Vec<device::Model>>> {
///     let devices = scoped::<device::Entity>(&tenant.organization_id).all(&ctx.db).await?;
///     Ok(Json(devices))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub user_id: String,
    pub organization_id: String,
    pub role: Role,
    pub email: String,
}

impl TenantContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 403 unless the caller is an organization admin
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(VerdantError::forbidden("Admin role required"))
        }
    }
}

impl FromRequestParts<AppContext> for TenantContext {
    type Rejection = VerdantError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self> {
        let token = TokenExtractor::from_request(parts, ctx.session.name())?;
        let claims = ctx.tokens.verify(&token)?;

        let user = find_scoped::<user::Entity, _>(&ctx.db, &claims.org_id, &claims.sub)
            .await?
            .ok_or_else(|| VerdantError::unauthorized("User no longer exists"))?;

        Ok(TenantContext {
            role: user.role(),
            user_id: user.id,
            organization_id: user.organization_id,
            email: user.email,
        })
    }
}
