//! Test support: in-process HTTP scenarios, in-memory databases and
//! generated data.
//!
//! ```rust,ignore
//! use verdant::testing::{self, TestApp};
//!
//! #[tokio::test]
//! async fn lists_waste_points() {
//!     let app = TestApp::new().await;
//!     let admin = app.register().await;
//!
//!     testing::get(app.router(), "/api/waste-points")
//!         .bearer_token(&admin.token)
//!         .execute()
//!         .await
//!         .assert_ok();
//! }
//! ```

mod app;
mod database;
mod fixtures;
mod scenario;

pub use app::{Session, TEST_JWT_SECRET, TestApp};
pub use database::TestDb;
pub use fixtures::fake;
pub use scenario::{Scenario, ScenarioAssert, delete, get, patch, post, put};
