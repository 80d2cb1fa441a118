//! Admin API 路由配置

use actix_web::web;

use super::auth::{auth_callback, begin_auth, get_properties, revoke_auth};
use super::content_ops::{put_aliases, put_items};
use super::dashboard::{get_dashboard, get_notices};
use super::queue_ops::{purge_queue, run_cron};
use super::settings_ops::{
    get_auth_settings, get_general_settings, get_types_settings, update_auth_settings,
    update_general_settings, update_types_settings,
};

/// 设置路由 `/settings`
pub fn settings_routes() -> actix_web::Scope {
    web::scope("/settings")
        .route("/auth", web::get().to(get_auth_settings))
        .route("/auth", web::put().to(update_auth_settings))
        .route("/general", web::get().to(get_general_settings))
        .route("/general", web::put().to(update_general_settings))
        .route("/types", web::get().to(get_types_settings))
        .route("/types", web::put().to(update_types_settings))
}

/// OAuth 路由 `/auth`
///
/// - POST /auth/begin - 生成授权地址
/// - GET /auth/callback - 授权码回调
/// - POST /auth/revoke - 撤销认证
/// - GET /auth/properties - 可选视图
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/begin", web::post().to(begin_auth))
        .route("/callback", web::get().to(auth_callback))
        .route("/revoke", web::post().to(revoke_auth))
        .route("/properties", web::get().to(get_properties))
}

/// 内容目录路由 `/content`
pub fn content_routes() -> actix_web::Scope {
    web::scope("/content")
        .route("/items", web::put().to(put_items))
        .route("/aliases", web::put().to(put_aliases))
}

/// Admin API v1 路由
pub fn admin_v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .route("/dashboard", web::get().to(get_dashboard))
        .route("/notices", web::get().to(get_notices))
        .route("/cron", web::post().to(run_cron))
        .route("/queue", web::delete().to(purge_queue))
        .service(settings_routes())
        .service(auth_routes())
        .service(content_routes())
}
