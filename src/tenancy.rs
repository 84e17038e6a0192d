//! Organization-scoped data access.
//!
//! Every tenant table carries an `organization_id` column. Handlers never call
//! `Entity::find()` directly on those tables; they go through the helpers here
//! so that a row belonging to another organization looks exactly like a row
//! that does not exist.

use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select,
};

use crate::error::{Result, VerdantError};
use crate::http::{PaginationQuery, SortOrder};

/// An entity whose rows belong to exactly one organization.
pub trait TenantScoped: EntityTrait {
    /// Human-readable name used in error messages ("Waste point", "Sensor", ...)
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn organization_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
}

/// `SELECT ... WHERE organization_id = ?`
pub fn scoped<E: TenantScoped>(organization_id: &str) -> Select<E> {
    E::find().filter(E::organization_column().eq(organization_id))
}

pub async fn find_scoped<E, C>(db: &C, organization_id: &str, id: &str) -> Result<Option<E::Model>>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    let model = scoped::<E>(organization_id)
        .filter(E::id_column().eq(id))
        .one(db)
        .await?;
    Ok(model)
}

/// Like [`find_scoped`], but a missing row is a 404.
pub async fn get_scoped<E, C>(db: &C, organization_id: &str, id: &str) -> Result<E::Model>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    find_scoped::<E, C>(db, organization_id, id)
        .await?
        .ok_or_else(|| VerdantError::not_found(format!("{} not found", E::LABEL)))
}

/// One page of rows matching `filter`, ordered by creation time then id.
///
/// Returns the page and the total number of matching rows.
pub async fn list_scoped<E, C>(
    db: &C,
    organization_id: &str,
    filter: Condition,
    page: &PaginationQuery,
) -> Result<(Vec<E::Model>, u64)>
where
    E: TenantScoped,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let select = scoped::<E>(organization_id).filter(filter);
    let select = match page.order {
        SortOrder::Asc => select
            .order_by_asc(E::created_at_column())
            .order_by_asc(E::id_column()),
        SortOrder::Desc => select
            .order_by_desc(E::created_at_column())
            .order_by_desc(E::id_column()),
    };

    let paginator = select.paginate(db, page.limit());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page_index()).await?;

    Ok((items, total))
}

pub async fn count_scoped<E, C>(db: &C, organization_id: &str, filter: Condition) -> Result<u64>
where
    E: TenantScoped,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let count = scoped::<E>(organization_id).filter(filter).count(db).await?;
    Ok(count)
}

/// Delete one row; `false` when nothing in this organization had that id.
pub async fn delete_scoped<E, C>(db: &C, organization_id: &str, id: &str) -> Result<bool>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(E::organization_column().eq(organization_id))
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Check a foreign id supplied in a request body.
///
/// A reference to a row of another organization is rejected the same way as
/// a reference to nothing: 400 naming the offending field.
pub async fn ensure_exists<E, C>(
    db: &C,
    organization_id: &str,
    field: &str,
    id: Option<&str>,
) -> Result<()>
where
    E: TenantScoped,
    C: ConnectionTrait,
{
    let Some(id) = id else {
        return Ok(());
    };

    match find_scoped::<E, C>(db, organization_id, id).await? {
        Some(_) => Ok(()),
        None => Err(VerdantError::bad_request(format!(
            "{field} does not reference an existing {}",
            E::LABEL.to_lowercase()
        ))),
    }
}
