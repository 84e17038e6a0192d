//! Which dashboard modules and navigation items a user has switched on.
//!
//! A slot holds an ordered list of `{key, visible}` items. Until a user saves
//! a slot they see its built-in default (known slots) or an empty list.

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::dashboard_layout;
use crate::error::{Result, VerdantError};
use crate::http::{NoContentResponse, ValidatedJson};
use crate::utils::{new_id, now_timestamp};
use crate::validation::validate_slot;

const MAX_ITEMS: u64 = 200;

const DASHBOARD_MODULES: &[&str] = &[
    "summary-cards",
    "waste-by-type",
    "material-flow",
    "initiatives-board",
    "initiatives-timeline",
    "goals-progress",
    "recent-readings",
    "vendors",
];

const NAV_ITEMS: &[&str] = &[
    "dashboard",
    "waste-points",
    "devices",
    "sensors",
    "initiatives",
    "goals",
    "vendors",
    "data-models",
    "images",
    "settings",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LayoutItem {
    #[validate(custom(function = "crate::validation::validate_slot"))]
    pub key: String,
    pub visible: bool,
}

impl LayoutItem {
    fn shown(key: &str) -> Self {
        Self {
            key: key.to_string(),
            visible: true,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PutLayout {
    #[validate(length(max = 200), nested)]
    pub items: Vec<LayoutItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ToggleLayout {
    #[validate(custom(function = "crate::validation::validate_slot"))]
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub slot: String,
    pub items: Vec<LayoutItem>,
    /// Keys of the visible items, in layout order
    pub visible: Vec<String>,
    pub is_default: bool,
    pub updated_at: Option<i64>,
}

impl LayoutResponse {
    fn new(slot: String, items: Vec<LayoutItem>, is_default: bool, updated_at: Option<i64>) -> Self {
        let visible = items
            .iter()
            .filter(|item| item.visible)
            .map(|item| item.key.clone())
            .collect();

        Self {
            slot,
            items,
            visible,
            is_default,
            updated_at,
        }
    }
}

/// Built-in layout for a known slot, everything visible.
pub fn default_items(slot: &str) -> Option<Vec<LayoutItem>> {
    let keys = match slot {
        "dashboard-modules" => DASHBOARD_MODULES,
        "nav-items" => NAV_ITEMS,
        _ => return None,
    };
    Some(keys.iter().map(|key| LayoutItem::shown(key)).collect())
}

/// Flip `key`'s visibility, or append it as visible when absent.
pub fn toggle_item(mut items: Vec<LayoutItem>, key: &str) -> Vec<LayoutItem> {
    match items.iter_mut().find(|item| item.key == key) {
        Some(item) => item.visible = !item.visible,
        None => items.push(LayoutItem::shown(key)),
    }
    items
}

fn ensure_unique_keys(items: &[LayoutItem]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.key.as_str()) {
            return Err(VerdantError::bad_request(format!(
                "Duplicate layout key '{}'",
                item.key
            )));
        }
    }
    Ok(())
}

fn check_slot(slot: &str) -> Result<()> {
    validate_slot(slot).map_err(|_| {
        VerdantError::bad_request("Slot must be 1-64 characters of a-z, 0-9, '-' or '_'")
    })
}

async fn find_layout<C: ConnectionTrait>(
    db: &C,
    tenant: &TenantContext,
    slot: &str,
) -> Result<Option<dashboard_layout::Model>> {
    let layout = dashboard_layout::Entity::find()
        .filter(dashboard_layout::Column::OrganizationId.eq(tenant.organization_id.as_str()))
        .filter(dashboard_layout::Column::UserId.eq(tenant.user_id.as_str()))
        .filter(dashboard_layout::Column::Slot.eq(slot))
        .one(db)
        .await?;
    Ok(layout)
}

fn stored_items(layout: &dashboard_layout::Model) -> Result<Vec<LayoutItem>> {
    serde_json::from_value(layout.items.clone()).map_err(|e| {
        tracing::error!(layout_id = %layout.id, error = %e, "Stored layout is not a valid item list");
        VerdantError::internal("Stored layout is corrupt")
    })
}

/// The stored layout, else the slot default, else nothing.
async fn effective_layout<C: ConnectionTrait>(
    db: &C,
    tenant: &TenantContext,
    slot: &str,
) -> Result<LayoutResponse> {
    match find_layout(db, tenant, slot).await? {
        Some(layout) => Ok(LayoutResponse::new(
            slot.to_string(),
            stored_items(&layout)?,
            false,
            Some(layout.updated_at),
        )),
        None => Ok(LayoutResponse::new(
            slot.to_string(),
            default_items(slot).unwrap_or_default(),
            true,
            None,
        )),
    }
}

async fn save_layout<C: ConnectionTrait>(
    db: &C,
    tenant: &TenantContext,
    slot: &str,
    items: Vec<LayoutItem>,
) -> Result<LayoutResponse> {
    let json = serde_json::to_value(&items)?;
    let now = now_timestamp();

    // Upsert on the (user_id, slot) unique index so concurrent first saves
    // both succeed; the later write wins.
    let row = dashboard_layout::ActiveModel {
        id: Set(new_id()),
        organization_id: Set(tenant.organization_id.clone()),
        user_id: Set(tenant.user_id.clone()),
        slot: Set(slot.to_string()),
        items: Set(json),
        updated_at: Set(now),
    };
    dashboard_layout::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                dashboard_layout::Column::UserId,
                dashboard_layout::Column::Slot,
            ])
            .update_columns([
                dashboard_layout::Column::Items,
                dashboard_layout::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(LayoutResponse::new(
        slot.to_string(),
        items,
        false,
        Some(now),
    ))
}

pub(super) async fn get_layout(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(slot): Path<String>,
) -> Result<Json<LayoutResponse>> {
    check_slot(&slot)?;
    Ok(Json(effective_layout(&ctx.db, &tenant, &slot).await?))
}

pub(super) async fn put_layout(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(slot): Path<String>,
    ValidatedJson(req): ValidatedJson<PutLayout>,
) -> Result<Json<LayoutResponse>> {
    check_slot(&slot)?;
    ensure_unique_keys(&req.items)?;

    let saved = save_layout(&ctx.db, &tenant, &slot, req.items).await?;
    tracing::debug!(user_id = %tenant.user_id, slot = %slot, "Layout saved");
    Ok(Json(saved))
}

pub(super) async fn toggle_layout(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(slot): Path<String>,
    ValidatedJson(req): ValidatedJson<ToggleLayout>,
) -> Result<Json<LayoutResponse>> {
    check_slot(&slot)?;

    let current = effective_layout(&ctx.db, &tenant, &slot).await?;
    if current.items.len() as u64 >= MAX_ITEMS && !current.items.iter().any(|i| i.key == req.key)
    {
        return Err(VerdantError::bad_request("Layout has too many items"));
    }

    let items = toggle_item(current.items, &req.key);
    Ok(Json(save_layout(&ctx.db, &tenant, &slot, items).await?))
}

/// Forget the saved layout so the default applies again.
pub(super) async fn reset_layout(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    Path(slot): Path<String>,
) -> Result<NoContentResponse> {
    check_slot(&slot)?;

    dashboard_layout::Entity::delete_many()
        .filter(dashboard_layout::Column::OrganizationId.eq(tenant.organization_id.as_str()))
        .filter(dashboard_layout::Column::UserId.eq(tenant.user_id.as_str()))
        .filter(dashboard_layout::Column::Slot.eq(slot.as_str()))
        .exec(&ctx.db)
        .await?;

    Ok(NoContentResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str, visible: bool) -> LayoutItem {
        LayoutItem {
            key: key.into(),
            visible,
        }
    }

    #[test]
    fn test_known_slots_have_defaults() {
        let modules = default_items("dashboard-modules").unwrap();
        assert!(modules.iter().all(|i| i.visible));
        assert_eq!(modules[0].key, "summary-cards");

        assert!(default_items("nav-items").is_some());
        assert!(default_items("reports").is_none());
    }

    #[test]
    fn test_toggle_flips_existing_key() {
        let items = vec![item("a", true), item("b", true)];
        let items = toggle_item(items, "b");
        assert_eq!(items, vec![item("a", true), item("b", false)]);

        let items = toggle_item(items, "b");
        assert_eq!(items, vec![item("a", true), item("b", true)]);
    }

    #[test]
    fn test_toggle_appends_unknown_key_as_visible() {
        let items = toggle_item(vec![item("a", false)], "c");
        assert_eq!(items, vec![item("a", false), item("c", true)]);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        assert!(ensure_unique_keys(&[item("a", true), item("b", false)]).is_ok());
        assert!(ensure_unique_keys(&[item("a", true), item("a", false)]).is_err());
    }

    #[test]
    fn test_response_lists_visible_keys_in_order() {
        let response = LayoutResponse::new(
            "nav-items".into(),
            vec![item("goals", true), item("images", false), item("devices", true)],
            false,
            Some(1),
        );
        assert_eq!(response.visible, ["goals", "devices"]);
    }

    #[test]
    fn test_invalid_item_key_fails_validation() {
        let req = PutLayout {
            items: vec![item("Summary Cards", true)],
        };
        assert!(req.validate().is_err());
    }
}
