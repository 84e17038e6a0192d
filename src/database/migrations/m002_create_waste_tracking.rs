use super::{organization_fk, organization_index};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WastePoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WastePoints::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WastePoints::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(WastePoints::Name).string().not_null())
                    .col(ColumnDef::new(WastePoints::Location).string().not_null())
                    .col(ColumnDef::new(WastePoints::Latitude).double().null())
                    .col(ColumnDef::new(WastePoints::Longitude).double().null())
                    .col(ColumnDef::new(WastePoints::WasteType).string_len(32).not_null())
                    .col(ColumnDef::new(WastePoints::CapacityKg).double().null())
                    .col(
                        ColumnDef::new(WastePoints::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(WastePoints::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(WastePoints::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk(
                        "fk_waste_points_organization",
                        WastePoints::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index(
                "idx_waste_points_organization_id",
                WastePoints::Table,
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devices::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Devices::WastePointId).string_len(36).null())
                    .col(ColumnDef::new(Devices::Name).string().not_null())
                    .col(ColumnDef::new(Devices::DeviceType).string_len(64).not_null())
                    .col(ColumnDef::new(Devices::SerialNumber).string().null())
                    .col(
                        ColumnDef::new(Devices::Status)
                            .string_len(16)
                            .not_null()
                            .default("offline"),
                    )
                    .col(ColumnDef::new(Devices::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Devices::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk("fk_devices_organization", Devices::Table))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devices_waste_point")
                            .from(Devices::Table, Devices::WastePointId)
                            .to(WastePoints::Table, WastePoints::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index("idx_devices_organization_id", Devices::Table))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sensors::OrganizationId).string_len(36).not_null())
                    .col(ColumnDef::new(Sensors::DeviceId).string_len(36).not_null())
                    .col(ColumnDef::new(Sensors::Name).string().not_null())
                    .col(ColumnDef::new(Sensors::SensorType).string_len(32).not_null())
                    .col(ColumnDef::new(Sensors::Unit).string_len(32).not_null())
                    .col(ColumnDef::new(Sensors::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Sensors::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk("fk_sensors_organization", Sensors::Table))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_device")
                            .from(Sensors::Table, Sensors::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(organization_index("idx_sensors_organization_id", Sensors::Table))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SensorReadings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SensorReadings::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SensorReadings::OrganizationId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SensorReadings::SensorId).string_len(36).not_null())
                    .col(ColumnDef::new(SensorReadings::Value).double().not_null())
                    .col(ColumnDef::new(SensorReadings::RecordedAt).big_integer().not_null())
                    .col(ColumnDef::new(SensorReadings::CreatedAt).big_integer().not_null())
                    .foreign_key(&mut organization_fk(
                        "fk_sensor_readings_organization",
                        SensorReadings::Table,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensor_readings_sensor")
                            .from(SensorReadings::Table, SensorReadings::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Readings are always read per sensor, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_sensor_readings_sensor_recorded_at")
                    .table(SensorReadings::Table)
                    .col(SensorReadings::SensorId)
                    .col(SensorReadings::RecordedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SensorReadings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WastePoints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WastePoints {
    Table,
    Id,
    OrganizationId,
    Name,
    Location,
    Latitude,
    Longitude,
    WasteType,
    CapacityKg,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Devices {
    Table,
    Id,
    OrganizationId,
    WastePointId,
    Name,
    DeviceType,
    SerialNumber,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
    OrganizationId,
    DeviceId,
    Name,
    SensorType,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SensorReadings {
    Table,
    Id,
    OrganizationId,
    SensorId,
    Value,
    RecordedAt,
    CreatedAt,
}
