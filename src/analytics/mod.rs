//! 外部统计服务接入
//!
//! - `client`: `AnalyticsApi` trait 与 ureq 实现
//! - `types`: 报表查询、结果页、令牌、媒体资源/视图
//! - `date_range`: 报表日期范围推算

mod client;
mod date_range;
mod types;

pub use client::{ANALYTICS_SCOPE, AnalyticsApi, GoogleAnalyticsApi, authorize_url};
pub use date_range::DateRange;
pub use types::{ClientCredentials, Profile, ReportQuery, ResultPage, TokenGrant, WebProperty};
