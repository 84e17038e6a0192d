use super::{Users, organization_fk};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DashboardLayouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DashboardLayouts::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DashboardLayouts::OrganizationId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DashboardLayouts::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(DashboardLayouts::Slot).string_len(64).not_null())
                    .col(ColumnDef::new(DashboardLayouts::Items).json().not_null())
                    .col(ColumnDef::new(DashboardLayouts::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk(
                        "fk_dashboard_layouts_organization",
                        DashboardLayouts::Table,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dashboard_layouts_user")
                            .from(DashboardLayouts::Table, DashboardLayouts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One stored layout per user and slot
        manager
            .create_index(
                Index::create()
                    .name("idx_dashboard_layouts_user_slot")
                    .table(DashboardLayouts::Table)
                    .col(DashboardLayouts::UserId)
                    .col(DashboardLayouts::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DashboardLayouts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DashboardLayouts {
    Table,
    Id,
    OrganizationId,
    UserId,
    Slot,
    Items,
    UpdatedAt,
}
