use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
    identity: Identity,
    storage: Storage,
    payment: Payment,
}

#[derive(Debug, Deserialize)]
pub struct Host {
    bindto: String,
}

#[derive(Debug, Deserialize)]
pub struct App {
    database_uri: String,
    #[serde(default)]
    docs: bool,
}

/// Hosted identity provider. Tokens are HS256 JWTs signed with the project secret.
#[derive(Debug, Deserialize)]
pub struct Identity {
    jwt_secret: String,
    audience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    base_url: String,
    service_key: String,
    bucket: String,
    #[serde(default = "default_upload_ttl")]
    upload_ttl_secs: u64,
    #[serde(default = "default_stream_ttl")]
    stream_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Payment {
    base_url: String,
    key_id: String,
    key_secret: String,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_upload_ttl() -> u64 {
    2 * 60 * 60
}

fn default_stream_ttl() -> u64 {
    60 * 60
}

fn default_currency() -> String {
    String::from("INR")
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_slice(&bytes)
                };

                let config = match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if matches!(e, error::ConfigError::ConfigNotFound) {
                            tracing::error!("Config not found.");
                        } else {
                            crate::error::log_error(&e);
                            tracing::error!("Unable to load config.");
                        }
                        std::process::exit(1);
                    }
                };

                config
            })
            .await
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let config: Self = toml::from_slice(bytes)?;
        Ok(config)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub fn payment(&self) -> &Payment {
        &self.payment
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }
}

impl App {
    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }
}

impl Identity {
    #[inline]
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    #[inline]
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }
}

impl Storage {
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn service_key(&self) -> &str {
        &self.service_key
    }

    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[inline]
    pub fn upload_ttl_secs(&self) -> u64 {
        self.upload_ttl_secs
    }

    #[inline]
    pub fn stream_ttl_secs(&self) -> u64 {
        self.stream_ttl_secs
    }
}

impl Payment {
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    #[inline]
    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn config_test() {
        let config = Config::get_or_init(true).await;
        assert_eq!(config.host().bindto(), "127.0.0.1:5000"); // defaults
    }

    #[test]
    fn config_defaults_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"

            [app]
            database_uri = "postgres://localhost/lectern"

            [identity]
            jwt_secret = "secret"

            [storage]
            base_url = "https://storage.local/storage/v1"
            service_key = "key"
            bucket = "videos"

            [payment]
            base_url = "https://payments.local/v1"
            key_id = "id"
            key_secret = "s"
        "#;

        let config = Config::from_slice(raw).unwrap();
        assert!(!config.app().docs());
        assert_eq!(config.identity().audience(), None);
        assert_eq!(config.storage().upload_ttl_secs(), 7200);
        assert_eq!(config.storage().stream_ttl_secs(), 3600);
        assert_eq!(config.payment().currency(), "INR");
    }

    #[test]
    fn config_missing_section_test() {
        let raw = br#"
            [host]
            bindto = "0.0.0.0:8080"
        "#;

        assert!(matches!(
            Config::from_slice(raw),
            Err(ConfigError::TomlDeError(_))
        ));
    }
}
