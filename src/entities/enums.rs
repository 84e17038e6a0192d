//! Closed sets of values stored as strings in the database.
//!
//! Columns hold the lowercase `as_str()` form; request and filter types use
//! the enums so unknown values are rejected at deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for sea_orm::Value {
            fn from(value: $name) -> Self {
                sea_orm::Value::from(value.as_str())
            }
        }
    };
}

string_enum! {
    /// Role of a user inside their organization
    Role ("role") {
        Admin => "admin",
        Member => "member",
    }
}

string_enum! {
    WasteType ("waste type") {
        General => "general",
        Recyclable => "recyclable",
        Organic => "organic",
        Hazardous => "hazardous",
        Electronic => "electronic",
    }
}

string_enum! {
    /// Lifecycle flag shared by waste points and vendors
    ActiveStatus ("status") {
        Active => "active",
        Inactive => "inactive",
    }
}

string_enum! {
    DeviceStatus ("device status") {
        Online => "online",
        Offline => "offline",
        Maintenance => "maintenance",
    }
}

string_enum! {
    SensorType ("sensor type") {
        FillLevel => "fill_level",
        Weight => "weight",
        Temperature => "temperature",
        Humidity => "humidity",
        Gas => "gas",
    }
}

string_enum! {
    /// Kanban column of an initiative; `ALL` is the board's column order
    InitiativeStatus ("initiative status") {
        Planned => "planned",
        InProgress => "in_progress",
        OnHold => "on_hold",
        Completed => "completed",
    }
}

string_enum! {
    ServiceType ("service type") {
        Collection => "collection",
        Recycling => "recycling",
        Disposal => "disposal",
        Consulting => "consulting",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for status in InitiativeStatus::ALL {
            assert_eq!(status.as_str().parse::<InitiativeStatus>().unwrap(), *status);
        }
        assert_eq!("fill_level".parse::<SensorType>().unwrap(), SensorType::FillLevel);
    }

    #[test]
    fn test_serde_matches_column_value() {
        let json = serde_json::to_string(&InitiativeStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: SensorType = serde_json::from_str("\"fill_level\"").unwrap();
        assert_eq!(parsed.as_str(), "fill_level");
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "invalid role: 'owner'");
        assert!(serde_json::from_str::<WasteType>("\"plastic\"").is_err());
    }

    #[test]
    fn test_board_column_order() {
        let columns: Vec<&str> = InitiativeStatus::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(columns, ["planned", "in_progress", "on_hold", "completed"]);
    }
}
