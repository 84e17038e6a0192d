//! Tenant-scoped CRUD resources under `/api`.
//!
//! Every module follows the same shape: a `*Module` implementing
//! [`RouteModule`](crate::http::RouteModule), create and update request types
//! validated with `validator`, a filter type read from the query string, and
//! handlers that only touch rows through [`crate::tenancy`].

mod data_models;
mod devices;
mod goals;
mod images;
mod initiatives;
mod sensors;
mod vendors;
mod waste_points;

pub use data_models::{CreateDataModel, DataModelsModule, UpdateDataModel};
pub use devices::{CreateDevice, DeviceFilter, DevicesModule, UpdateDevice};
pub use goals::{CreateGoal, GoalFilter, GoalResponse, GoalsModule, UpdateGoal};
pub use images::{CreateImage, ImageFilter, ImagesModule, UpdateImage};
pub use initiatives::{
    BoardColumn, BoardResponse, CreateInitiative, InitiativeFilter, InitiativesModule,
    TimelineEvent, UpdateInitiative, UpdateStatus, status_color,
};
pub use sensors::{
    CreateReading, CreateSensor, ReadingsQuery, SensorFilter, SensorsModule, UpdateSensor,
};
pub use vendors::{CreateVendor, UpdateVendor, VendorFilter, VendorsModule};
pub use waste_points::{CreateWastePoint, UpdateWastePoint, WastePointFilter, WastePointsModule};

use serde::{Deserialize, Deserializer};

/// `deserialize_with` for clearable PATCH fields.
///
/// Paired with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trimmed copy of an optional text field; blank input becomes `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        caption: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_separates_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"caption": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"caption": "Full"}"#).unwrap();

        assert_eq!(absent.caption, None);
        assert_eq!(cleared.caption, Some(None));
        assert_eq!(set.caption, Some(Some("Full".to_string())));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Bay 4 ".into())), Some("Bay 4".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
