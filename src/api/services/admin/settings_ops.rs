//! Admin API 设置读写

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::config::{AuthSettingsUpdate, GeneralSettingsUpdate};
use crate::counter::CounterService;
use crate::errors::Result;

use super::helpers::api_result;
use super::types::{AuthSettingsView, GeneralSettingsView, TypesSettings};

/// GET /settings/auth
pub async fn get_auth_settings(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    api_result(auth_view(&service).await)
}

async fn auth_view(service: &CounterService) -> Result<AuthSettingsView> {
    let settings = service.load_settings().await?;
    let authenticated = service.is_authenticated().await?;
    Ok(AuthSettingsView::new(&settings, authenticated))
}

/// PUT /settings/auth
pub async fn update_auth_settings(
    service: web::Data<Arc<CounterService>>,
    body: web::Json<AuthSettingsUpdate>,
) -> HttpResponse {
    let result = async {
        service.update_auth_settings(body.into_inner()).await?;
        info!("Admin API: auth settings updated");
        auth_view(&service).await
    }
    .await;
    api_result(result)
}

/// GET /settings/general
pub async fn get_general_settings(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    api_result(
        service
            .load_settings()
            .await
            .map(|s| GeneralSettingsView::from(&s)),
    )
}

/// PUT /settings/general
pub async fn update_general_settings(
    service: web::Data<Arc<CounterService>>,
    body: web::Json<GeneralSettingsUpdate>,
) -> HttpResponse {
    let result = service
        .update_general_settings(body.into_inner())
        .await
        .map(|s| GeneralSettingsView::from(&s));
    if result.is_ok() {
        info!("Admin API: general settings updated");
    }
    api_result(result)
}

/// GET /settings/types
///
/// 列出目录中出现过的内容类型以及已启用的类型。
pub async fn get_types_settings(service: web::Data<Arc<CounterService>>) -> HttpResponse {
    api_result(types_view(&service).await)
}

async fn types_view(service: &CounterService) -> Result<TypesSettings> {
    let settings = service.load_settings().await?;
    let mut bundles: BTreeMap<String, bool> = service
        .catalog()
        .published_items()
        .await?
        .into_iter()
        .map(|item| (item.bundle, false))
        .collect();
    for bundle in settings.enabled_bundles {
        bundles.insert(bundle, true);
    }
    Ok(TypesSettings { bundles })
}

/// PUT /settings/types
pub async fn update_types_settings(
    service: web::Data<Arc<CounterService>>,
    body: web::Json<TypesSettings>,
) -> HttpResponse {
    let result = async {
        for (bundle, enabled) in &body.bundles {
            service.set_bundle_enabled(bundle, *enabled).await?;
        }
        types_view(&service).await
    }
    .await;
    api_result(result)
}
