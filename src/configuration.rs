use config::Config;
use reqwest::Url;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_with::{DurationMilliSeconds, serde_as};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::mirrors::{MirrorGroup, MirrorInstance};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    #[serde(rename = "application")]
    pub application_cfg: ApplicationSettings,
    #[serde(rename = "mirrors")]
    pub mirrors_cfg: MirrorSettings,
    #[serde(rename = "resolver")]
    pub resolver_cfg: ResolverSettings,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir().expect("Failed to determine the current directory");
        let configuration_directory = base_path.join("configuration");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse `APP_ENVIRONMENT`");

        let environment_filename = format!("{}.yml", environment.as_str());

        Config::builder()
            .add_source(config::File::from(configuration_directory.join("base.yml")))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .add_source(config::File::from(
                configuration_directory.join(environment_filename),
            ))
            .build()?
            .try_deserialize()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
    pub async fn listener(&self) -> Result<TcpListener, std::io::Error> {
        TcpListener::bind(self.address()).await
    }
}

/// The ordered mirror list. Group order encodes an empirically-known
/// reliability preference; operators reorder or replace instances without a
/// rebuild.
#[derive(Deserialize, Debug, Clone)]
pub struct MirrorSettings {
    pub groups: Vec<MirrorGroupSettings>,
}

impl MirrorSettings {
    pub fn groups(&self) -> Vec<MirrorGroup> {
        self.groups
            .iter()
            .map(MirrorGroupSettings::to_group)
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MirrorGroupSettings {
    pub name: String,
    /// Metadata endpoint template, containing `{id}`.
    pub path_template: String,
    /// Search endpoint path; `q` and `filter` are appended as query pairs.
    #[serde(default = "default_search_path")]
    pub search_path: String,
    #[serde(deserialize_with = "url_list_format::deserialize")]
    pub instances: Vec<Url>,
}

fn default_search_path() -> String {
    "/api/v1/search".into()
}

impl MirrorGroupSettings {
    fn to_group(&self) -> MirrorGroup {
        MirrorGroup {
            name: self.name.clone(),
            instances: self
                .instances
                .iter()
                .map(|base_url| MirrorInstance {
                    base_url: base_url.clone(),
                    path_template: self.path_template.clone(),
                    search_path: self.search_path.clone(),
                })
                .collect(),
        }
    }
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct ResolverSettings {
    /// Timeout for one request to one mirror instance.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout_ms: Duration,
    /// Attempts per instance; only timeouts consume additional attempts.
    pub max_attempts: u32,
    /// Cap on a whole resolution, independent of per-attempt timeouts.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub overall_deadline_ms: Duration,
    /// Some mirrors reject default client signatures, so every request
    /// carries a browser-like user-agent.
    pub user_agent: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{} is not a supported environment. Use 'local' or 'production'.",
                other
            )),
        }
    }
}

mod url_list_format {
    use reqwest::Url;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Url>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|s| Url::parse(&s).map_err(D::Error::custom))
            .collect()
    }
}
