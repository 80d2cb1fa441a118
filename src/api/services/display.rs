//! 公开的计数展示端点
//!
//! - GET /counter?path= - 某个路径的浏览量
//! - GET /counter/items/{nid} - 条目计数字段
//! - POST /filter - 解析文本中的 `[gac]` / `[gac|all]`

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{error, trace};

use crate::counter::CounterService;
use crate::errors::CounterError;

#[derive(Debug, Deserialize)]
pub struct CounterQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub text: String,
    /// 文本所在页面的路径，`[gac]` 以此计数
    #[serde(default)]
    pub path: String,
}

pub struct DisplayService;

impl DisplayService {
    pub async fn path_count(
        query: web::Query<CounterQuery>,
        service: web::Data<Arc<CounterService>>,
    ) -> impl Responder {
        trace!("Counter requested for path '{}'", query.path);
        match service.display_count(&query.path).await {
            Ok(count) => text_response("text/plain; charset=utf-8", count),
            Err(e) => failure(&e),
        }
    }

    pub async fn item_field(
        nid: web::Path<i64>,
        service: web::Data<Arc<CounterService>>,
    ) -> impl Responder {
        match service.item_field(nid.into_inner()).await {
            Ok(html) => text_response("text/html; charset=utf-8", html),
            Err(e) => failure(&e),
        }
    }

    pub async fn filter(
        body: web::Json<FilterRequest>,
        service: web::Data<Arc<CounterService>>,
    ) -> impl Responder {
        match service.filter_text(&body.text, &body.path).await {
            Ok(text) => text_response("text/html; charset=utf-8", text),
            Err(e) => failure(&e),
        }
    }
}

fn text_response(content_type: &'static str, body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(content_type).body(body)
}

fn failure(err: &CounterError) -> HttpResponse {
    error!("Counter display failed: {}", err);
    HttpResponse::build(err.http_status())
        .content_type("text/plain; charset=utf-8")
        .body(err.message().to_string())
}

pub fn display_routes() -> actix_web::Scope {
    web::scope("")
        .route("/counter", web::get().to(DisplayService::path_count))
        .route("/counter/items/{nid}", web::get().to(DisplayService::item_field))
        .route("/filter", web::post().to(DisplayService::filter))
}
