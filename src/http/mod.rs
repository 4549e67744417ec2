//! HTTP protocol layer module
//!
//! HTTP building blocks shared by the query service and the static mount,
//! kept free of creature-specific logic.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use range::{parse_range_header, RangeParseResult};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_500_response, build_detail_response, build_health_response,
    build_json_response, build_options_response, build_redirect_response,
};
