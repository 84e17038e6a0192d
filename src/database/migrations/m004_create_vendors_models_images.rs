use super::{WastePoints, organization_fk, organization_index};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vendors::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vendors::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Vendors::Name).string().not_null())
                    .col(ColumnDef::new(Vendors::ServiceType).string_len(32).not_null())
                    .col(ColumnDef::new(Vendors::ContactName).string().null())
                    .col(ColumnDef::new(Vendors::ContactEmail).string().null())
                    .col(ColumnDef::new(Vendors::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(Vendors::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Vendors::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Vendors::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk("fk_vendors_organization", Vendors::Table))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index("idx_vendors_organization_id", Vendors::Table))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DataModels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DataModels::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DataModels::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(DataModels::Name).string().not_null())
                    .col(ColumnDef::new(DataModels::Description).text().null())
                    .col(ColumnDef::new(DataModels::Schema).json().not_null())
                    .col(ColumnDef::new(DataModels::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(DataModels::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk(
                        "fk_data_models_organization",
                        DataModels::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index(
                "idx_data_models_organization_id",
                DataModels::Table,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Images::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Images::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Images::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Images::WastePointId).string_len(36).null())
                    .col(ColumnDef::new(Images::Url).text().not_null())
                    .col(ColumnDef::new(Images::Caption).string().null())
                    .col(ColumnDef::new(Images::CreatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk("fk_images_organization", Images::Table))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_images_waste_point")
                            .from(Images::Table, Images::WastePointId)
                            .to(WastePoints::Table, WastePoints::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index("idx_images_organization_id", Images::Table))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Images::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DataModels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    OrganizationId,
    Name,
    ServiceType,
    ContactName,
    ContactEmail,
    Phone,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DataModels {
    Table,
    Id,
    OrganizationId,
    Name,
    Description,
    Schema,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Images {
    Table,
    Id,
    OrganizationId,
    WastePointId,
    Url,
    Caption,
    CreatedAt,
}
