//! Admin API OAuth 流程

use std::sync::Arc;

use actix_web::{HttpResponse, http::StatusCode, web};
use chrono::Utc;
use tracing::info;

use crate::counter::CounterService;

use super::error_code::ErrorCode;
use super::helpers::{api_result, error_response};
use super::types::{AuthCallbackQuery, AuthCallbackResponse, AuthUrlResponse};

/// POST /auth/begin
pub async fn begin_auth(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    api_result(
        service
            .begin_authentication()
            .await
            .map(|url| AuthUrlResponse {
                authorization_url: url.to_string(),
            }),
    )
}

/// GET /auth/callback?code=
pub async fn auth_callback(
    service: web::Data<Arc<CounterService>>,
    query: web::Query<AuthCallbackQuery>,
) -> HttpResponse {
    let Some(code) = query.code.as_deref().filter(|c| !c.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            "Missing authorization code",
        );
    };

    let result = service
        .auth_callback(code, Utc::now().timestamp())
        .await
        .map(|authenticated| AuthCallbackResponse {
            authenticated,
            notices: service.notices().drain(),
        });
    api_result(result)
}

/// POST /auth/revoke
pub async fn revoke_auth(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    let result = service.revoke().await;
    if result.is_ok() {
        info!("Admin API: authentication revoked");
    }
    api_result(result.map(|_| serde_json::json!({ "revoked": true })))
}

/// GET /auth/properties
pub async fn get_properties(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    api_result(service.web_property_options(Utc::now().timestamp()).await)
}
