use std::sync::Arc;

use axum::Router;
use shuttersync_api::DeviceStatus;
use shuttersync_server::app::{create_app, create_notification_app};
use shuttersync_server::configs::Settings;
use shuttersync_server::services::mock::MockDevice;
use shuttersync_server::services::{Accessory, EventBus};

pub const SETTINGS: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [logger]
    level = "debug"

    [device]
    name = "Bedroom"
    address = "10.0.0.7"
    notification_port = 8581
"#;

pub struct MockApp {
    pub router: Router,
    pub notification_router: Router,
    pub accessory: Arc<Accessory>,
    pub device: Arc<MockDevice>,
    pub event_bus: EventBus,
}

impl MockApp {
    pub async fn new(status: DeviceStatus) -> Self {
        let settings = Settings::from_toml(SETTINGS).unwrap();
        let device = Arc::new(MockDevice::new(status));
        let event_bus = EventBus::default();
        let accessory = Arc::new(
            Accessory::new(&settings, device.clone(), Arc::new(event_bus.clone())).unwrap(),
        );
        accessory.start().await;

        Self {
            router: create_app(accessory.clone(), event_bus.clone()),
            notification_router: create_notification_app(accessory.clone()),
            accessory,
            device,
            event_bus,
        }
    }
}
