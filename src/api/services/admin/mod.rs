//! Admin API 服务模块
//!
//! 该模块包含管理 API 的所有端点：
//! - 面板与提示
//! - 设置读写
//! - OAuth 流程
//! - cron 与队列
//! - 内容目录登记

pub mod auth;
mod content_ops;
mod dashboard;
pub mod error_code;
mod helpers;
mod queue_ops;
pub mod routes;
mod settings_ops;
mod types;

pub use types::*;

pub use helpers::{api_result, error_from_counter, error_response, success_response};

pub use error_code::ErrorCode;

pub use routes::admin_v1_routes;
