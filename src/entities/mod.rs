//! SeaORM entities, one module per table.
//!
//! Ids are UUID v4 strings, timestamps are Unix seconds and enum-like columns
//! hold the string form of the types in [`enums`]. Models serialize directly
//! as API responses.

/// Implement [`TenantScoped`](crate::tenancy::TenantScoped) for the `Entity`
/// of the current module, which must have `id`, `organization_id` and
/// `created_at` columns.
macro_rules! tenant_scoped {
    ($label:literal) => {
        impl $crate::tenancy::TenantScoped for Entity {
            const LABEL: &'static str = $label;

            fn id_column() -> Column {
                Column::Id
            }

            fn organization_column() -> Column {
                Column::OrganizationId
            }

            fn created_at_column() -> Column {
                Column::CreatedAt
            }
        }
    };
}

pub mod enums;

pub mod dashboard_layout;
pub mod data_model;
pub mod device;
pub mod goal;
pub mod image;
pub mod initiative;
pub mod organization;
pub mod sensor;
pub mod sensor_reading;
pub mod user;
pub mod vendor;
pub mod waste_point;

pub use enums::{
    ActiveStatus, DeviceStatus, InitiativeStatus, ParseEnumError, Role, SensorType, ServiceType,
    WasteType,
};
