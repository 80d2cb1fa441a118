pub mod admin;
pub mod display;
pub mod oauth;

pub use admin::admin_v1_routes;
pub use display::{DisplayService, display_routes};
pub use oauth::oauth_routes;
