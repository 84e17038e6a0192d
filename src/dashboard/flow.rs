//! Sankey data for the material-flow chart.
//!
//! The split is a fixed allocation of one total across outcome buckets, not
//! tracked flow.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::summary::collected_weight;
use crate::app::AppContext;
use crate::auth::TenantContext;
use crate::error::{Result, VerdantError};
use crate::http::ValidatedQuery;

const SOURCE_NODE: (&str, &str) = ("collected", "Collected");

/// `(id, label, percent)`; percents sum to 100 and the last bucket absorbs
/// rounding.
pub const FLOW_BUCKETS: &[(&str, &str, i64)] = &[
    ("recycled", "Recycled", 45),
    ("composted", "Composted", 20),
    ("landfill", "Landfill", 30),
    ("incinerated", "Incinerated", 5),
];

/// Largest accepted total; keeps the cent arithmetic inside `i64`
const MAX_TOTAL: f64 = 1e12;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct FlowQuery {
    /// Defaults to the organization's collected weight
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowLink {
    pub source: &'static str,
    pub target: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowResponse {
    pub total: f64,
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Split `total` across [`FLOW_BUCKETS`].
///
/// Works in whole cents: every bucket but the last takes its floored share
/// and the last takes the remainder, so no link is negative and the links sum
/// to the rounded total.
pub fn split_flow(total: f64) -> Result<FlowResponse> {
    if !total.is_finite() {
        return Err(VerdantError::bad_request("total must be a finite number"));
    }
    if total < 0.0 {
        return Err(VerdantError::bad_request("total must not be negative"));
    }
    if total > MAX_TOTAL {
        return Err(VerdantError::bad_request("total is too large"));
    }

    let cents = (total * 100.0).round() as i64;
    let mut nodes = vec![FlowNode {
        id: SOURCE_NODE.0,
        name: SOURCE_NODE.1,
    }];
    let mut links = Vec::with_capacity(FLOW_BUCKETS.len());
    let mut allocated = 0;

    for (i, &(id, name, percent)) in FLOW_BUCKETS.iter().enumerate() {
        let share = if i + 1 == FLOW_BUCKETS.len() {
            cents - allocated
        } else {
            cents * percent / 100
        };
        allocated += share;

        nodes.push(FlowNode { id, name });
        links.push(FlowLink {
            source: SOURCE_NODE.0,
            target: id,
            value: from_cents(share),
        });
    }

    Ok(FlowResponse {
        total: from_cents(cents),
        nodes,
        links,
    })
}

pub(super) async fn get_flow(
    State(ctx): State<AppContext>,
    tenant: TenantContext,
    ValidatedQuery(query): ValidatedQuery<FlowQuery>,
) -> Result<Json<FlowResponse>> {
    let total = match query.total {
        Some(total) => total,
        None => collected_weight(&ctx.db, &tenant.organization_id).await?,
    };

    Ok(Json(split_flow(total)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_sum(flow: &FlowResponse) -> f64 {
        flow.links.iter().map(|l| l.value).sum()
    }

    #[test]
    fn test_split_of_round_total() {
        let flow = split_flow(1000.0).unwrap();
        let values: Vec<f64> = flow.links.iter().map(|l| l.value).collect();
        assert_eq!(values, [450.0, 200.0, 300.0, 50.0]);
        assert_eq!(flow.nodes.len(), 5);
        assert!(flow.links.iter().all(|l| l.source == "collected"));
    }

    #[test]
    fn test_last_bucket_absorbs_rounding() {
        let flow = split_flow(0.07).unwrap();
        // 0.0315 -> 0.03, 0.014 -> 0.01, 0.021 -> 0.02
        assert_eq!(flow.links[3].value, 0.01);
        assert!((link_sum(&flow) - 0.07).abs() < 1e-9);

        for total in [1.0, 3.33, 99.99, 12345.67, 0.01] {
            let flow = split_flow(total).unwrap();
            assert!((link_sum(&flow) - flow.total).abs() < 1e-9, "total {total}");
        }
    }

    #[test]
    fn test_small_totals_never_produce_negative_links() {
        let flow = split_flow(0.15).unwrap();
        assert_eq!(flow.links[3].value, 0.02);
        assert!(flow.links[3].value.is_sign_positive());

        for cents in 0..=5_000 {
            let flow = split_flow(cents as f64 / 100.0).unwrap();
            assert!(
                flow.links
                    .iter()
                    .all(|l| l.value >= 0.0 && l.value.is_sign_positive()),
                "cents {cents}"
            );
        }
    }

    #[test]
    fn test_zero_total_gives_zero_links() {
        let flow = split_flow(0.0).unwrap();
        assert_eq!(flow.total, 0.0);
        assert!(flow.links.iter().all(|l| l.value == 0.0));
    }

    #[test]
    fn test_negative_or_nan_total_is_rejected() {
        assert!(matches!(
            split_flow(-1.0),
            Err(VerdantError::BadRequest(_))
        ));
        assert!(split_flow(f64::NAN).is_err());
        assert!(split_flow(1e15).is_err());
    }

    #[test]
    fn test_bucket_percents_sum_to_100() {
        let sum: i64 = FLOW_BUCKETS.iter().map(|(_, _, p)| p).sum();
        assert_eq!(sum, 100);
    }
}
