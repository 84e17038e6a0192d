//! Tower middleware installed around every route.
//!
//! Each layer has a serde-friendly config that can be loaded from
//! `VERDANT_`-prefixed environment variables, and a `build_*` function that
//! returns `None` when the layer is disabled.

mod cors;
mod request_id;
mod request_logging;
mod timeout;

pub use cors::{CorsConfig, build_cors_layer};
pub use request_id::MakeRequestUuid;
pub use request_logging::{
    LogLevel, RequestLoggingConfig, RequestLoggingLayer, build_request_logging_layer,
};
pub use timeout::{TimeoutConfig, build_timeout_layer};
