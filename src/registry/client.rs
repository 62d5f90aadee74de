use crate::app_config::AppConfig;
use crate::domain::device::{Device, DeviceSummary};
use crate::registry::{ApprovalResult, DeviceRegistry, TransportError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Thin reqwest wrapper over the registry's frontend routes. Stateless
/// besides the connection pool; every call hits the registry.
#[derive(Clone, Debug)]
pub struct RegistryClient {
    client: Client,
    devices_url: String,
}

impl RegistryClient {
    pub fn new(config: &AppConfig) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        let registry = config.registry();

        Ok(RegistryClient {
            client,
            devices_url: format!("{}{}/frontend/devices", registry.url(), registry.api_prefix()),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, detail });
        }

        response.json::<T>().await.map_err(TransportError::MalformedBody)
    }
}

#[async_trait]
impl DeviceRegistry for RegistryClient {
    #[instrument(skip(self))]
    async fn list_devices(&self) -> Result<Vec<DeviceSummary>, TransportError> {
        let response = self.client.get(&self.devices_url).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn get_device(&self, id: &str) -> Result<Device, TransportError> {
        let response = self.client.get(format!("{}/{}", self.devices_url, id)).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn approve_device(&self, id: &str) -> Result<ApprovalResult, TransportError> {
        let response = self.client.post(format!("{}/{}/approve", self.devices_url, id)).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use crate::domain::device::Sensor;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn client_for(server: &mockito::Server) -> RegistryClient {
        let config = AppConfigBuilder::new().registry_url(server.url()).build();
        RegistryClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn list_devices_returns_summaries_in_registry_order() -> Result<(), TransportError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/frontend/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(include_str!("../../tests/resources/device_list_response.json"))
            .create_async()
            .await;

        let devices = client_for(&server).list_devices().await?;

        mock.assert();
        assert_eq!(
            devices,
            vec![
                DeviceSummary {
                    id: "d1".to_string(),
                    approved: false,
                    sensor_count: 2,
                },
                DeviceSummary {
                    id: "d2".to_string(),
                    approved: true,
                    sensor_count: 0,
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_device_returns_the_full_sensor_set() -> Result<(), TransportError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/frontend/devices/d1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(include_str!("../../tests/resources/device_detail_response.json"))
            .create_async()
            .await;

        let device = client_for(&server).get_device("d1").await?;

        mock.assert();
        assert_eq!(
            device,
            Device {
                id: "d1".to_string(),
                approved: false,
                sensors: vec![Sensor {
                    id: 1,
                    name: "temp".to_string(),
                    r#type: "thermal".to_string(),
                }],
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_device_maps_404_to_a_not_found_status_error() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/frontend/devices/ghost")
            .with_status(404)
            .with_body("Device not found")
            .create_async()
            .await;

        let error = client_for(&server).get_device("ghost").await.unwrap_err();

        assert!(error.is_not_found());
        match error {
            TransportError::Status { status, detail } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(detail, "Device not found");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn approve_device_posts_and_decodes_the_result() -> Result<(), TransportError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/frontend/devices/d1/approve")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({ "success": true }).to_string())
            .create_async()
            .await;

        let result = client_for(&server).approve_device("d1").await?;

        mock.assert();
        assert_eq!(result, ApprovalResult { success: true });

        Ok(())
    }

    #[tokio::test]
    async fn routes_honor_a_versioned_api_prefix() -> Result<(), TransportError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/v1/frontend/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let config = AppConfigBuilder::new()
            .registry_url(server.url())
            .api_prefix("/api/v1".to_string())
            .build();
        let devices = RegistryClient::new(&config)?.list_devices().await?;

        mock.assert();
        assert_eq!(devices, vec![]);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_bodies_are_reported_as_such() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/frontend/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let error = client_for(&server).list_devices().await.unwrap_err();

        assert!(matches!(error, TransportError::MalformedBody(_)));
    }
}
