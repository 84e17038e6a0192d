use super::{Users, organization_fk, organization_index};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Initiatives::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Initiatives::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Initiatives::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Initiatives::Title).string().not_null())
                    .col(ColumnDef::new(Initiatives::Description).text().null())
                    .col(
                        ColumnDef::new(Initiatives::Status)
                            .string_len(16)
                            .not_null()
                            .default("planned"),
                    )
                    .col(
                        ColumnDef::new(Initiatives::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Initiatives::StartDate).date().null())
                    .col(ColumnDef::new(Initiatives::EndDate).date().null())
                    .col(ColumnDef::new(Initiatives::OwnerId).string_len(36).null())
                    .col(ColumnDef::new(Initiatives::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Initiatives::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk(
                        "fk_initiatives_organization",
                        Initiatives::Table,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_initiatives_owner")
                            .from(Initiatives::Table, Initiatives::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index(
                "idx_initiatives_organization_id",
                Initiatives::Table,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Goals::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Goals::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Goals::InitiativeId).string_len(36).null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::Metric).string().not_null())
                    .col(ColumnDef::new(Goals::TargetValue).double().not_null())
                    .col(
                        ColumnDef::new(Goals::CurrentValue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Goals::Unit).string_len(32).not_null())
                    .col(ColumnDef::new(Goals::DueDate).date().null())
                    .col(ColumnDef::new(Goals::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Goals::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk("fk_goals_organization", Goals::Table))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goals_initiative")
                            .from(Goals::Table, Goals::InitiativeId)
                            .to(Initiatives::Table, Initiatives::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index("idx_goals_organization_id", Goals::Table))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Initiatives::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Initiatives {
    Table,
    Id,
    OrganizationId,
    Title,
    Description,
    Status,
    Progress,
    StartDate,
    EndDate,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    OrganizationId,
    InitiativeId,
    Name,
    Metric,
    TargetValue,
    CurrentValue,
    Unit,
    DueDate,
    CreatedAt,
    UpdatedAt,
}
