pub mod aggregator;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod fetcher;
pub mod filter;
pub mod format;
pub mod notices;
pub mod service;
pub mod state;

pub use aggregator::{PathAggregator, build_alias_set, hash_for_path, normalize_path};
pub use auth::{AuthManager, Feed, PropertyOption};
pub use catalog::{ContentCatalog, ContentItem, ContentRegistry, MemoryContentCatalog, PathAlias};
pub use dashboard::DashboardSummary;
pub use fetcher::{FetchOutcome, ReportFetcher, next_cursor, pointer};
pub use format::format_number;
pub use notices::{Notice, NoticeLevel, Notices};
pub use service::CounterService;
pub use state::{CounterState, REVOCABLE_KEYS, state_keys};
