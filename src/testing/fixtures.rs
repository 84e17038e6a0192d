//! Generated request data for tests.

/// Random values that satisfy the API's validation rules
pub mod fake {
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn short_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn uuid() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn email() -> String {
        format!("user-{}@example.com", Uuid::new_v4().simple())
    }

    pub fn name() -> String {
        format!("Test User {}", short_id())
    }

    pub fn organization_name() -> String {
        format!("Green Org {}", short_id())
    }

    pub fn password() -> String {
        format!("pw-{}", Uuid::new_v4().simple())
    }

    pub fn phone() -> String {
        format!("+1555{:07}", fastrand::u32(0..10_000_000))
    }

    pub fn waste_point() -> Value {
        json!({
            "name": format!("Bin {}", short_id()),
            "location": "Loading dock",
            "waste_type": "recyclable",
            "capacity_kg": 240.0,
        })
    }

    pub fn device(waste_point_id: Option<&str>) -> Value {
        json!({
            "name": format!("Scale {}", short_id()),
            "device_type": "smart_scale",
            "waste_point_id": waste_point_id,
            "status": "online",
        })
    }

    pub fn sensor(device_id: &str, sensor_type: &str) -> Value {
        json!({
            "device_id": device_id,
            "name": format!("Sensor {}", short_id()),
            "sensor_type": sensor_type,
            "unit": "kg",
        })
    }

    pub fn initiative(status: &str) -> Value {
        json!({
            "title": format!("Initiative {}", short_id()),
            "status": status,
            "progress": fastrand::i32(0..=100),
        })
    }

    pub fn vendor() -> Value {
        json!({
            "name": format!("Hauler {}", short_id()),
            "service_type": "collection",
            "contact_email": email(),
            "phone": phone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_phone;

    #[test]
    fn test_fake_values_are_unique() {
        assert_ne!(fake::email(), fake::email());
        assert_eq!(fake::uuid().len(), 36);
    }

    #[test]
    fn test_fake_values_pass_validation() {
        assert!(validate_phone(&fake::phone()).is_ok());
        assert!(fake::password().len() >= 8);
        assert_eq!(fake::waste_point()["waste_type"], "recyclable");
    }
}
