use std::collections::BTreeMap;

use axum::{Json, extract::State};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    sea_query::Expr,
};
use serde::Serialize;

use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::entities::{
    ActiveStatus, DeviceStatus, InitiativeStatus, SensorType, device, goal, initiative, sensor,
    sensor_reading, vendor, waste_point,
};
use crate::error::Result;
use crate::tenancy::{count_scoped, scoped};
use crate::utils::now_timestamp;

const RECENT_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub waste_points: u64,
    pub devices: u64,
    pub devices_online: u64,
    pub sensors: u64,
    pub vendors: u64,
    pub vendors_active: u64,
    pub initiatives: InitiativeSummary,
    pub goals: GoalSummary,
    /// Sum of every reading from `weight` sensors
    pub total_weight: f64,
    pub readings_last_30_days: u64,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct InitiativeSummary {
    pub total: u64,
    pub by_status: BTreeMap<InitiativeStatus, u64>,
    pub average_progress: f64,
}

impl InitiativeSummary {
    pub fn from_rows(rows: &[(String, i32)]) -> Self {
        let mut by_status: BTreeMap<InitiativeStatus, u64> =
            InitiativeStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut progress_sum = 0i64;

        for (status, progress) in rows {
            let status = status.parse().unwrap_or(InitiativeStatus::Planned);
            *by_status.entry(status).or_default() += 1;
            progress_sum += i64::from(*progress);
        }

        let total = rows.len() as u64;
        let average_progress = if total == 0 {
            0.0
        } else {
            progress_sum as f64 / total as f64
        };

        Self {
            total,
            by_status,
            average_progress,
        }
    }
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct GoalSummary {
    pub total: u64,
    pub achieved: u64,
}

impl GoalSummary {
    /// Rows are `(current_value, target_value)`.
    pub fn from_rows(rows: &[(f64, f64)]) -> Self {
        Self {
            total: rows.len() as u64,
            achieved: rows.iter().filter(|(cur, target)| cur >= target).count() as u64,
        }
    }
}

pub(super) async fn get_summary(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
) -> Result<Json<Summary>> {
    let db = &ctx.db;
    let org = tenant.organization_id.as_str();

    let initiative_rows: Vec<(String, i32)> = scoped::<initiative::Entity>(org)
        .select_only()
        .column(initiative::Column::Status)
        .column(initiative::Column::Progress)
        .into_tuple()
        .all(db)
        .await?;

    let goal_rows: Vec<(f64, f64)> = scoped::<goal::Entity>(org)
        .select_only()
        .column(goal::Column::CurrentValue)
        .column(goal::Column::TargetValue)
        .into_tuple()
        .all(db)
        .await?;

    let now = now_timestamp();
    let recent_since = now - RECENT_WINDOW_SECS;

    let summary = Summary {
        waste_points: count_scoped::<waste_point::Entity, _>(db, org, Condition::all()).await?,
        devices: count_scoped::<device::Entity, _>(db, org, Condition::all()).await?,
        devices_online: count_scoped::<device::Entity, _>(
            db,
            org,
            Condition::all().add(device::Column::Status.eq(DeviceStatus::Online.as_str())),
        )
        .await?,
        sensors: count_scoped::<sensor::Entity, _>(db, org, Condition::all()).await?,
        vendors: count_scoped::<vendor::Entity, _>(db, org, Condition::all()).await?,
        vendors_active: count_scoped::<vendor::Entity, _>(
            db,
            org,
            Condition::all().add(vendor::Column::Status.eq(ActiveStatus::Active.as_str())),
        )
        .await?,
        initiatives: InitiativeSummary::from_rows(&initiative_rows),
        goals: GoalSummary::from_rows(&goal_rows),
        total_weight: collected_weight(db, org).await?,
        readings_last_30_days: count_scoped::<sensor_reading::Entity, _>(
            db,
            org,
            Condition::all()
                .add(sensor_reading::Column::RecordedAt.gte(recent_since))
                .add(sensor_reading::Column::RecordedAt.lte(now)),
        )
        .await?,
    };

    Ok(Json(summary))
}

/// Total of all readings taken by the organization's weight sensors.
pub(super) async fn collected_weight<C: ConnectionTrait>(db: &C, organization_id: &str) -> Result<f64> {
    let weight_sensors: Vec<String> = scoped::<sensor::Entity>(organization_id)
        .filter(sensor::Column::SensorType.eq(SensorType::Weight.as_str()))
        .select_only()
        .column(sensor::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    if weight_sensors.is_empty() {
        return Ok(0.0);
    }

    let total: Option<Option<f64>> = sensor_reading::Entity::find()
        .filter(sensor_reading::Column::OrganizationId.eq(organization_id))
        .filter(sensor_reading::Column::SensorId.is_in(weight_sensors))
        .select_only()
        .column_as(Expr::col(sensor_reading::Column::Value).sum(), "total")
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(0.0))
}
