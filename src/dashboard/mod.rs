//! `/api/dashboard`: per-user layouts, the summary cards and Sankey flow data.

mod flow;
mod layout;
mod summary;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app::AppContext;
use crate::http::RouteModule;

pub use flow::{FLOW_BUCKETS, FlowLink, FlowNode, FlowQuery, FlowResponse, split_flow};
pub use layout::{
    LayoutItem, LayoutResponse, PutLayout, ToggleLayout, default_items, toggle_item,
};
pub use summary::{GoalSummary, InitiativeSummary, Summary};

pub struct DashboardModule;

impl RouteModule for DashboardModule {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route(
                "/layouts/{slot}",
                get(layout::get_layout)
                    .put(layout::put_layout)
                    .delete(layout::reset_layout),
            )
            .route("/layouts/{slot}/toggle", post(layout::toggle_layout))
            .route("/summary", get(summary::get_summary))
            .route("/flow", get(flow::get_flow))
    }

    fn prefix(&self) -> Option<&str> {
        Some("/api/dashboard")
    }
}
