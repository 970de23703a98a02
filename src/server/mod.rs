//! 网关 HTTP 层
//!
//! 参数校验、主/备通道调度、统计更新和响应组装

mod error;
mod handlers;
mod request;
mod router;
mod types;

pub use request::DimensionLimits;
pub use router::{AppState, create_router};
