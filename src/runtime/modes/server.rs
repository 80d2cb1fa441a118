//! Server mode
//!
//! Starts the HTTP server with the admin API and the display routes, plus the
//! background cron scheduler when enabled.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::AdminAuth;
use crate::api::services::{admin_v1_routes, display_routes, oauth_routes};
use crate::config::get_config;
use crate::queue::spawn_scheduler;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();

    let startup = lifetime::startup::prepare_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {:#}", e);
            e
        })?;

    let service = startup.service.clone();
    let driver = startup.driver.clone();
    let registry = startup.registry.clone();

    let scheduler = if config.scheduler.enabled {
        Some(spawn_scheduler(driver.clone(), config.scheduler.tick_secs))
    } else {
        info!("Cron scheduler disabled, run `gacounter cron` from an external scheduler");
        None
    };

    let admin_token = config.api.admin_token.clone();
    if admin_token.is_empty() {
        warn!("Admin API is disabled (api.admin_token not set)");
    } else {
        info!("Admin API available at: /admin/v1");
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(driver.clone()))
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .app_data(web::JsonConfig::default().limit(4 * 1024 * 1024))
            .service(
                web::scope("/admin")
                    .wrap(AdminAuth::new(admin_token.clone()))
                    .service(admin_v1_routes()),
            )
            .service(oauth_routes())
            .service(display_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    server.await.context("HTTP server error")?;

    if let Some(handle) = scheduler {
        handle.abort();
    }
    info!("Server stopped");
    Ok(())
}
