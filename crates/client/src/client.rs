use fanpanel_core::{
    fan_power_path, FanId, FanReading, GeneralSettings, PowerUpdate, FAN_ENDPOINT,
    FAN_MANAGER_ENDPOINT,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid device url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client for the fan device's four endpoints.
#[derive(Clone)]
pub struct DeviceClient {
    http: Client,
    base: Url,
}

impl DeviceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        // Relative joins keep any path prefix the device is mounted under
        let mut raw = config.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|source| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| ClientError::Transport {
            endpoint: base.to_string(),
            source,
        })?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /fan`, returned as sent. Callers decide how many entries they expect.
    pub async fn fan_readings(&self) -> Result<Vec<FanReading>, ClientError> {
        let url = self.endpoint(FAN_ENDPOINT)?;
        let response = self.send(self.http.get(url), FAN_ENDPOINT).await?;
        decode(response, FAN_ENDPOINT).await
    }

    /// `POST /fan?name=<label>` with `{"power": power}`. The value is not
    /// range checked; the device answers 400 for anything outside 0..=100.
    /// The response body is ignored.
    pub async fn set_fan_power(&self, fan: FanId, power: Option<i64>) -> Result<(), ClientError> {
        let path = fan_power_path(fan);
        let url = self.endpoint(&path)?;
        let request = self.http.post(url).json(&PowerUpdate { power });
        self.send(request, &path).await?;
        Ok(())
    }

    pub async fn general_settings(&self) -> Result<GeneralSettings, ClientError> {
        let url = self.endpoint(FAN_MANAGER_ENDPOINT)?;
        let response = self.send(self.http.get(url), FAN_MANAGER_ENDPOINT).await?;
        decode(response, FAN_MANAGER_ENDPOINT).await
    }

    pub async fn set_general_settings(&self, settings: &GeneralSettings) -> Result<(), ClientError> {
        let url = self.endpoint(FAN_MANAGER_ENDPOINT)?;
        let request = self.http.post(url).json(settings);
        self.send(request, FAN_MANAGER_ENDPOINT).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidUrl { url: path.to_string(), source })
    }

    async fn send(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<Response, ClientError> {
        let response = request.send().await.map_err(|source| ClientError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "device response");
        if !status.is_success() {
            return Err(ClientError::Status { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, ClientError> {
    let body = response.bytes().await.map_err(|source| ClientError::Transport {
        endpoint: endpoint.to_string(),
        source,
    })?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let client = DeviceClient::new(&ClientConfig::new("http://10.0.0.5/device")).unwrap();
        assert_eq!(
            client.endpoint(&fan_power_path(FanId::Back)).unwrap().as_str(),
            "http://10.0.0.5/device/fan?name=Back"
        );
        assert_eq!(
            client.endpoint(FAN_MANAGER_ENDPOINT).unwrap().as_str(),
            "http://10.0.0.5/device/fanManager"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = DeviceClient::new(&ClientConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn status_accessor() {
        let err = ClientError::Status { endpoint: "/fan".into(), status: 404 };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "/fan answered with HTTP 404");
    }
}
