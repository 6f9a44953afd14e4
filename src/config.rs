use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub store: StoreConfig,
    pub audio: AudioConfig,
    pub voice: VoiceConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Substring match against input device names; empty means the default
    /// input device
    #[serde(default)]
    pub device_pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    pub api_url: String,
    /// Bearer token for the endpoint; empty sends no Authorization header
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
