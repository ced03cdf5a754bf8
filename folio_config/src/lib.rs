use std::{collections::HashMap, net::IpAddr, path::PathBuf};

use anyhow::Context;
use config::{builder::DefaultState, ConfigBuilder, Environment, File, FileFormat};
pub use duration::Duration;
use folio_models::email_address::{EmailAddress, EmailAddressWithName};
use serde::{Deserialize, Deserializer};

mod duration;

pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Environment variable with a colon separated list of additional config
/// files.
pub const CONFIG_PATHS_VAR: &str = "FOLIO_CONFIG";

const ENV_PREFIX: &str = "FOLIO";

/// Loads the configuration from the built-in defaults, the files listed in
/// `FOLIO_CONFIG` and the environment.
pub fn load() -> anyhow::Result<Config> {
    let env = std::env::vars().collect::<HashMap<_, _>>();
    let paths = env
        .get(CONFIG_PATHS_VAR)
        .map(|paths| {
            paths
                .split(':')
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    load_from(&paths, env)
}

pub fn load_from(paths: &[PathBuf], env: HashMap<String, String>) -> anyhow::Result<Config> {
    let builder = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    let builder = paths.iter().try_fold(builder, |builder, path| {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let source = File::from_str(&content, FileFormat::Toml);
        anyhow::Ok(builder.add_source(source))
    })?;

    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(Some(env.clone())),
    );

    legacy_overrides(builder, &env)?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

/// Environment variables understood by earlier deployments of the contact
/// api.
fn legacy_overrides(
    builder: ConfigBuilder<DefaultState>,
    env: &HashMap<String, String>,
) -> anyhow::Result<ConfigBuilder<DefaultState>> {
    [
        ("PORT", "http.port"),
        ("ALLOWED_ORIGINS", "http.allowed_origins"),
        ("EMAIL_USER", "email.username"),
        ("EMAIL_PASS", "email.password"),
    ]
    .into_iter()
    .try_fold(builder, |builder, (var, key)| {
        let value = env.get(var).filter(|v| !v.is_empty()).cloned();
        builder
            .set_override_option(key, value)
            .with_context(|| format!("Failed to apply {var}"))
    })
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    #[serde(deserialize_with = "comma_separated")]
    pub allowed_origins: Vec<String>,
    pub body_limit: usize,
    pub real_ip: Option<RealIpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<EmailAddress>,
    pub from_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: Option<EmailAddressWithName>,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub window: Duration,
    pub purge_interval: Duration,
}

impl EmailConfig {
    /// The sender of all outgoing emails: `from`, or the smtp username if it
    /// is an email address.
    pub fn sender(&self) -> anyhow::Result<EmailAddressWithName> {
        let address = match (&self.from, &self.username) {
            (Some(from), _) => from.clone(),
            (None, Some(username)) => username
                .parse()
                .context("email.username is not an email address, set email.from instead")?,
            (None, None) => anyhow::bail!("Either email.from or email.username must be set"),
        };
        Ok(address.with_name(self.from_name.clone()))
    }
}

impl Config {
    /// The inbox that receives contact messages, defaults to the sender.
    pub fn contact_recipient(&self) -> anyhow::Result<EmailAddressWithName> {
        match &self.contact.recipient {
            Some(recipient) => Ok(recipient.clone()),
            None => self.email.sender(),
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_url", &self.smtp_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        String(String),
    }

    let items = match ListOrString::deserialize(deserializer)? {
        ListOrString::List(items) => items,
        ListOrString::String(s) => s.split(',').map(Into::into).collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn load_default_config() {
        let config = load_from(&[], HashMap::new()).unwrap();

        assert_eq!(config.http.port, 5000);
        assert_eq!(config.http.body_limit, 16 * 1024);
        assert!(config.http.allowed_origins.is_empty());
        assert!(config.http.real_ip.is_none());
        assert_eq!(config.email.smtp_url, "smtps://smtp.gmail.com");
        assert_eq!(config.email.from_name, "Portfolio Contact");
        assert_eq!(*config.email.timeout, StdDuration::from_secs(30));
        assert_eq!(config.contact.rate_limit.max_requests, 5);
        assert_eq!(*config.contact.rate_limit.window, StdDuration::from_secs(600));
        assert!(config.email.sender().is_err());
    }

    #[test]
    fn legacy_environment() {
        let config = load_from(
            &[],
            env(&[
                ("PORT", "8080"),
                ("ALLOWED_ORIGINS", "https://example.com, https://www.example.com,"),
                ("EMAIL_USER", "me@gmail.com"),
                ("EMAIL_PASS", "app-password"),
            ]),
        )
        .unwrap();

        assert_eq!(config.http.port, 8080);
        assert_eq!(
            config.http.allowed_origins,
            ["https://example.com", "https://www.example.com"]
        );
        assert_eq!(config.email.username.as_deref(), Some("me@gmail.com"));
        assert_eq!(config.email.password.as_deref(), Some("app-password"));
        let sender = config.email.sender().unwrap();
        assert_eq!(sender.0.name.as_deref(), Some("Portfolio Contact"));
        assert_eq!(sender.email().as_str(), "me@gmail.com");
        assert_eq!(
            config.contact_recipient().unwrap(),
            config.email.sender().unwrap()
        );
    }

    #[test]
    fn prefixed_environment() {
        let config = load_from(
            &[],
            env(&[
                ("FOLIO__HTTP__PORT", "9000"),
                ("FOLIO__EMAIL__FROM", "noreply@example.com"),
                ("FOLIO__CONTACT__RECIPIENT", "me@example.com"),
                ("FOLIO__CONTACT__RATE_LIMIT__WINDOW", "1h"),
            ]),
        )
        .unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(*config.contact.rate_limit.window, StdDuration::from_secs(3600));
        assert_eq!(
            config.email.sender().unwrap().email().as_str(),
            "noreply@example.com"
        );
        assert_eq!(
            config.contact_recipient().unwrap().to_string(),
            "me@example.com"
        );
    }

    #[test]
    fn legacy_variable_wins_over_file() {
        let path = std::env::temp_dir().join(format!("folio-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[http]\nport = 7000\nallowed_origins = [\"https://a.example\"]\n")
            .unwrap();

        let from_file = load_from(&[path.clone()], HashMap::new()).unwrap();
        let overridden = load_from(&[path.clone()], env(&[("PORT", "7001")])).unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(from_file.http.port, 7000);
        assert_eq!(from_file.http.allowed_origins, ["https://a.example"]);
        assert_eq!(overridden.http.port, 7001);
    }

    #[test]
    fn missing_file() {
        let result = load_from(&[PathBuf::from("/does/not/exist.toml")], HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn password_is_not_printed() {
        let config = load_from(&[], env(&[("EMAIL_PASS", "hunter2")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
