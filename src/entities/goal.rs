use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub initiative_id: Option<String>,
    pub name: String,
    pub metric: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub due_date: Option<Date>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    /// `current / target` as a percentage clamped to 0..=100
    pub fn progress_percent(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_achieved(&self) -> bool {
        self.current_value >= self.target_value
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

tenant_scoped!("Goal");

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(current: f64, target: f64) -> Model {
        Model {
            id: "g".into(),
            organization_id: "o".into(),
            initiative_id: None,
            name: "Divert cardboard".into(),
            metric: "diversion".into(),
            target_value: target,
            current_value: current,
            unit: "kg".into(),
            due_date: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_progress_percent_is_clamped() {
        assert_eq!(goal(25.0, 100.0).progress_percent(), 25.0);
        assert_eq!(goal(250.0, 100.0).progress_percent(), 100.0);
        assert_eq!(goal(0.0, 100.0).progress_percent(), 0.0);
        assert_eq!(goal(5.0, 0.0).progress_percent(), 0.0);
    }

    #[test]
    fn test_achieved_when_current_reaches_target() {
        assert!(goal(100.0, 100.0).is_achieved());
        assert!(!goal(99.9, 100.0).is_achieved());
    }
}
