use config::Config;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    registry: Registry,
}

impl AppConfig {
    pub fn load() -> Self {
        Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::default())
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    channel_buffer_size: usize,
}

impl Core {
    pub fn channel_buffer_size(&self) -> usize {
        self.channel_buffer_size
    }
}

#[derive(Debug, Deserialize)]
pub struct Registry {
    url: String,
    #[serde(default)]
    api_prefix: String,
    #[serde(with = "humantime_serde")]
    poll_interval: Duration,
}

impl Registry {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Optional versioned mount point, e.g. "/api/v1". Empty when the
    /// frontend routes are mounted at the root.
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core { channel_buffer_size: 8 },
                registry: Registry {
                    url: "https://registry.url".to_string(),
                    api_prefix: "".to_string(),
                    poll_interval: Duration::from_millis(10_000),
                },
            },
        }
    }

    pub fn registry_url(mut self, url: String) -> Self {
        self.config.registry.url = url;
        self
    }

    pub fn api_prefix(mut self, prefix: String) -> Self {
        self.config.registry.api_prefix = prefix;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.registry.poll_interval = interval;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_defaults_to_an_empty_api_prefix() {
        let config = AppConfigBuilder::new().build();

        assert_eq!(config.registry().api_prefix(), "");
        assert_eq!(config.registry().poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn builder_overrides_the_registry_section() {
        let config = AppConfigBuilder::new()
            .registry_url("http://localhost:8000".to_string())
            .api_prefix("/api/v1".to_string())
            .poll_interval(Duration::from_millis(50))
            .build();

        assert_eq!(config.registry().url(), "http://localhost:8000");
        assert_eq!(config.registry().api_prefix(), "/api/v1");
        assert_eq!(config.registry().poll_interval(), Duration::from_millis(50));
    }
}
