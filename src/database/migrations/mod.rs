//! Schema migrations, applied in order.

use sea_orm_migration::prelude::*;

mod m001_create_organizations_and_users;
mod m002_create_waste_tracking;
mod m003_create_initiatives_and_goals;
mod m004_create_vendors_models_images;
mod m005_create_dashboard_layouts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m001_create_organizations_and_users::Migration),
            Box::new(m002_create_waste_tracking::Migration),
            Box::new(m003_create_initiatives_and_goals::Migration),
            Box::new(m004_create_vendors_models_images::Migration),
            Box::new(m005_create_dashboard_layouts::Migration),
        ]
    }
}

/// Identifiers shared by several migrations
#[derive(DeriveIden)]
pub(crate) enum Organizations {
    Table,
    Id,
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
pub(crate) enum WastePoints {
    Table,
    Id,
}

/// Foreign key from `table.organization_id` to `organizations.id`
pub(crate) fn organization_fk(
    name: &str,
    table: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, Alias::new("organization_id"))
        .to(Organizations::Table, Organizations::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

/// Index on `table.organization_id`; every tenant query filters on it
pub(crate) fn organization_index(
    name: &str,
    table: impl IntoIden + 'static,
) -> IndexCreateStatement {
    Index::create()
        .name(name)
        .table(table)
        .col(Alias::new("organization_id"))
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_helpers_accept_owned_idens() {
        let fk = organization_fk("fk_devices_organization", Alias::new("devices"))
            .to_string(PostgresQueryBuilder);
        assert!(fk.contains(r#"FOREIGN KEY ("organization_id")"#));
        assert!(fk.contains(r#"REFERENCES "organizations" ("id")"#));
        assert!(fk.contains("ON DELETE CASCADE"));

        let index = organization_index("idx_waste_points_organization", WastePoints::Table)
            .to_string(PostgresQueryBuilder);
        assert!(index.starts_with(r#"CREATE INDEX "idx_waste_points_organization""#));
        assert!(index.ends_with(r#"ON "waste_points" ("organization_id")"#));
    }
}
