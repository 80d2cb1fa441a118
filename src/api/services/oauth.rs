//! OAuth 跳转回调
//!
//! 统计服务授权后浏览器带着 `code` 与 `state` 跳转到这里，请求不带管理令牌，
//! 因此挂在 `/admin` 之外。`state` 必须与 `POST /admin/v1/auth/begin`
//! 生成的一次性值一致。

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::counter::CounterService;

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// 用户拒绝授权时由服务方带回
    pub error: Option<String>,
}

fn page(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!doctype html><title>Analytics authentication</title><p>{}</p>",
            html_escape::encode_text(message)
        ))
}

/// GET /auth/callback?code=&state=
pub async fn oauth_redirect(
    query: web::Query<RedirectQuery>,
    service: web::Data<Arc<CounterService>>,
) -> HttpResponse {
    if let Some(error) = query.error.as_deref() {
        warn!("OAuth provider returned error: {}", error);
        return page(
            StatusCode::BAD_REQUEST,
            &format!("Authorization was not granted: {}", error),
        );
    }

    let code = query.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let state = query.state.as_deref().filter(|s| !s.is_empty());
    let (Some(code), Some(state)) = (code, state) else {
        return page(
            StatusCode::BAD_REQUEST,
            "Missing authorization code or state",
        );
    };

    match service
        .complete_redirect(code, state, Utc::now().timestamp())
        .await
    {
        Ok(true) => {
            info!("OAuth redirect completed, analytics authenticated");
            page(StatusCode::OK, "You have been successfully authenticated.")
        }
        Ok(false) => page(
            StatusCode::BAD_GATEWAY,
            "There was an authentication error, see the admin notices.",
        ),
        Err(e) => page(e.http_status(), e.message()),
    }
}

pub fn oauth_routes() -> actix_web::Scope {
    web::scope("/auth").route("/callback", web::get().to(oauth_redirect))
}
