//! Admin API 内容目录登记

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::counter::{ContentItem, ContentRegistry, PathAlias};

use super::helpers::api_result;
use super::types::RegisteredResponse;

/// PUT /content/items
pub async fn put_items(
    registry: web::Data<Arc<dyn ContentRegistry>>,
    body: web::Json<Vec<ContentItem>>,
) -> HttpResponse {
    api_result(
        registry
            .register_items(&body)
            .await
            .map(|registered| RegisteredResponse { registered }),
    )
}

/// PUT /content/aliases
pub async fn put_aliases(
    registry: web::Data<Arc<dyn ContentRegistry>>,
    body: web::Json<Vec<PathAlias>>,
) -> HttpResponse {
    api_result(
        registry
            .register_aliases(&body)
            .await
            .map(|registered| RegisteredResponse { registered }),
    )
}
