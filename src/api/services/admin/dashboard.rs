//! Admin API 面板与提示

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::trace;

use crate::counter::CounterService;

use super::helpers::{api_result, success_response};

/// GET /dashboard
pub async fn get_dashboard(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    trace!("Admin API: dashboard requested");
    api_result(service.dashboard(Utc::now()).await)
}

/// GET /notices，读取后清空
pub async fn get_notices(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    success_response(service.notices().drain())
}
