use std::sync::Arc;

use axum::http::{Method, StatusCode};
use shuttersync_api::{Characteristic, RollerState};
use shuttersync_server::configs::Settings;
use shuttersync_server::errors::DeviceError;
use shuttersync_server::services::mock::RecordingSink;
use shuttersync_server::services::{Accessory, RollerDevice, ShellyClient};

use crate::common::fake_shelly::{FakeShelly, Reply, roller_status};

mod common;

#[tokio::test]
async fn test_status_request() {
    let shelly = FakeShelly::start(roller_status("stop", 42)).await;
    let client = ShellyClient::new(&shelly.address.to_string(), None);

    let status = client.status().await.unwrap();

    assert_eq!(status.state, RollerState::Stop);
    assert_eq!(status.current_pos, 42);
    assert_eq!(status.stop_reason.as_deref(), Some("normal"));

    let requests = shelly.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/roller/0");
    assert_eq!(requests[0].query, None);
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn test_go_to_position_request() {
    let shelly = FakeShelly::start(roller_status("close", 60)).await;
    let client = ShellyClient::new(&format!("http://{}/", shelly.address), None);

    let status = client.go_to_position(60).await.unwrap();

    assert_eq!(status.state, RollerState::Close);
    let requests = shelly.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/roller/0/");
    assert_eq!(requests[0].query.as_deref(), Some("go=to_pos&roller_pos=60"));
}

#[tokio::test]
async fn test_stop_request() {
    let shelly = FakeShelly::start(roller_status("stop", 10)).await;
    let client = ShellyClient::new(&shelly.address.to_string(), None);

    client.stop().await.unwrap();

    let requests = shelly.requests();
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].query.as_deref(), Some("go=stop"));
}

#[tokio::test]
async fn test_basic_authentication() {
    let shelly = FakeShelly::start(roller_status("stop", 10)).await;

    ShellyClient::new(&shelly.address.to_string(), Some("admin:secret"))
        .status()
        .await
        .unwrap();
    ShellyClient::new(&shelly.address.to_string(), Some("admin"))
        .status()
        .await
        .unwrap();

    let requests = shelly.requests();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic YWRtaW46c2VjcmV0")
    );
    assert_eq!(requests[1].authorization.as_deref(), Some("Basic YWRtaW46"));
}

#[tokio::test]
async fn test_error_status_is_protocol_error() {
    let shelly = FakeShelly::start(roller_status("stop", 10)).await;
    shelly.set_reply(Reply::Error(StatusCode::UNAUTHORIZED));
    let client = ShellyClient::new(&shelly.address.to_string(), None);

    let result = client.status().await;

    assert!(matches!(result, Err(DeviceError::Protocol(message)) if message.contains("401")));
}

#[tokio::test]
async fn test_malformed_body_is_protocol_error() {
    let shelly = FakeShelly::start(roller_status("stop", 10)).await;
    shelly.set_reply(Reply::Garbage);
    let client = ShellyClient::new(&shelly.address.to_string(), None);

    let result = client.go_to_position(20).await;

    assert!(matches!(result, Err(DeviceError::Protocol(_))));
}

#[tokio::test]
async fn test_accessory_over_http() {
    let shelly = FakeShelly::start(roller_status("stop", 100)).await;
    let settings = Settings::from_toml(&format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0

        [logger]
        level = "debug"

        [device]
        name = "Kitchen"
        address = "{}"
        notification_port = 8581

        [device.calibration]
        touch_down_position = 20
        "#,
        shelly.address
    ))
    .unwrap();
    let sink = Arc::new(RecordingSink::default());
    let accessory = Accessory::new(
        &settings,
        Arc::new(ShellyClient::from_settings(&settings.device)),
        sink.clone(),
    )
    .unwrap();

    accessory.start().await;
    assert_eq!(accessory.current_position().await.unwrap(), 100);

    shelly.set_reply(Reply::Status(roller_status("close", 60)));
    accessory.set_target_position(50).await.unwrap();

    let requests = shelly.requests();
    assert_eq!(
        requests
            .iter()
            .filter_map(|request| request.query.as_deref())
            .collect::<Vec<_>>(),
        vec!["go=to_pos&roller_pos=60"]
    );
    assert!(sink.updates().contains(&Characteristic::TargetPosition(50)));
    assert_eq!(accessory.current_position().await.unwrap(), 50);

    accessory.shutdown().await;
}
