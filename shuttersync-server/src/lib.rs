use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{create_app, create_notification_app};
use crate::configs::Settings;
use crate::services::{Accessory, EventBus, ShellyClient};

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod services;

pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let event_bus = EventBus::default();
    let device = Arc::new(ShellyClient::from_settings(&settings.device));
    let accessory = Arc::new(Accessory::new(
        settings,
        device,
        Arc::new(event_bus.clone()),
    )?);

    if let Some(port) = settings.device.notification_port {
        let address = SocketAddr::from((IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("failed to bind notification listener on {address}"))?;
        let app = create_notification_app(accessory.clone());

        tracing::info!("status notification server listening on {:?}", address);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Status notification server failed: {}", e);
            }
        });
    }

    accessory.start().await;

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("invalid server host '{}'", settings.server.host))?;
    let address = SocketAddr::from((ip_addr, settings.server.port));
    let listener = TcpListener::bind(&address).await?;

    tracing::info!("listening on {:?}", address);

    axum::serve(listener, create_app(accessory.clone(), event_bus))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    accessory.shutdown().await;

    Ok(())
}
