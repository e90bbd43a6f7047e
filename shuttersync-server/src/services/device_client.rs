use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method};
use shuttersync_api::DeviceStatus;
use tracing::{debug, warn};

use crate::configs::Device;
use crate::errors::DeviceError;

const ROLLER_PATH: &str = "/roller/0";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound calls to a single roller channel.
///
/// Every endpoint answers with the full roller status.
#[async_trait]
pub trait RollerDevice: Send + Sync {
    async fn status(&self) -> Result<DeviceStatus, DeviceError>;

    /// `raw_position` is on the device scale, calibration already applied.
    async fn go_to_position(&self, raw_position: u8) -> Result<DeviceStatus, DeviceError>;

    async fn stop(&self) -> Result<DeviceStatus, DeviceError>;
}

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// JSON over HTTP client for a Shelly roller.
pub struct ShellyClient {
    http_client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl ShellyClient {
    pub fn new(address: &str, authentication: Option<&str>) -> Self {
        let http_client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client, using defaults without connect timeout: {}", e);
                Client::default()
            });

        let address = address.trim().trim_end_matches('/');
        let base_url = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        let credentials = authentication.map(|auth| match auth.split_once(':') {
            Some((username, password)) => Credentials {
                username: username.to_string(),
                password: Some(password.to_string()),
            },
            None => Credentials {
                username: auth.to_string(),
                password: None,
            },
        });

        Self {
            http_client,
            base_url,
            credentials,
        }
    }

    pub fn from_settings(device: &Device) -> Self {
        Self::new(&device.address, device.authentication.as_deref())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_json_request(
        &self,
        method: Method,
        path_and_query: &str,
    ) -> Result<DeviceStatus, DeviceError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!("{} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        let body = request.send().await?.error_for_status()?.text().await?;
        debug!("Raw response: {}", body);

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RollerDevice for ShellyClient {
    async fn status(&self) -> Result<DeviceStatus, DeviceError> {
        self.send_json_request(Method::GET, ROLLER_PATH).await
    }

    async fn go_to_position(&self, raw_position: u8) -> Result<DeviceStatus, DeviceError> {
        let path = format!("{ROLLER_PATH}/?go=to_pos&roller_pos={raw_position}");
        self.send_json_request(Method::POST, &path).await
    }

    async fn stop(&self) -> Result<DeviceStatus, DeviceError> {
        let path = format!("{ROLLER_PATH}/?go=stop");
        self.send_json_request(Method::GET, &path).await
    }
}
