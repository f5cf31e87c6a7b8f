use std::fmt;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::RadError;

pub const USAGE: &str = "\
USAGE (one of the following):
  1) <program> settings-file
     settings-file - JSON file with Hostname, Port, URL and optional Login/Password
  2) <program> hostname port URL [login password]
     hostname - machine where the DataSnap server runs, e.g. localhost
     port     - server port number, e.g. 8180
     URL      - DataSnap URL path, e.g. datasnap/rest/TServerClass
     login    - DataSnap login (optional, given together with password)
     password - DataSnap password (optional, given together with login)";

#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the DataSnap server lives and how to log in to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub url_path: String,
    pub credentials: Option<Credentials>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16, url_path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            url_path: url_path.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(
        mut self,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            login: login.into(),
            password: password.into(),
        });
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}/{}/", self.host, self.port, self.url_path)
    }

    pub fn auth(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|creds| (creds.login.as_str(), creds.password.as_str()))
    }

    /// Resolve from the process arguments, skipping the program name.
    pub fn from_env_args() -> Result<Self, RadError> {
        Self::from_args(std::env::args().skip(1))
    }

    /// Resolve from positional values (program name excluded).
    ///
    /// One value is a settings file path; three are `host port url`; five add
    /// `login password`.
    pub fn from_args<I, S>(values: I) -> Result<Self, RadError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        match values.as_slice() {
            [settings_file] => Self::from_file(settings_file).map_err(|err| RadError::Config {
                reason: format!("error loading settings from `{settings_file}`: {err}\n{USAGE}"),
            }),
            [host, port, url_path] => Ok(Self::new(host.clone(), parse_port_text(port)?, url_path.clone())),
            [host, port, url_path, login, password] => {
                Ok(Self::new(host.clone(), parse_port_text(port)?, url_path.clone())
                    .with_credentials(login.clone(), password.clone()))
            }
            _ => Err(RadError::Config {
                reason: format!(
                    "expected 1, 3 or 5 connection values, got {}\n{USAGE}",
                    values.len()
                ),
            }),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| RadError::Config {
            reason: format!("cannot read `{}`: {err}", path.display()),
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|err| RadError::Config {
            reason: format!("`{}` is not valid JSON: {err}", path.display()),
        })?;
        Self::from_value(&value)
    }

    /// Resolve from a mapping keyed `host`/`Hostname`, `port`/`Port`,
    /// `urlPath`/`URL`, and optionally `login`/`Login` with `password`/`Password`.
    pub fn from_value(value: &Value) -> Result<Self, RadError> {
        let map = value.as_object().ok_or_else(|| RadError::Config {
            reason: "connection settings must be a mapping".to_string(),
        })?;

        let missing: Vec<&str> = [
            ("Hostname", ["host", "Hostname"]),
            ("Port", ["port", "Port"]),
            ("URL", ["urlPath", "URL"]),
        ]
        .into_iter()
        .filter(|(_, keys)| lookup(map, keys).is_none())
        .map(|(label, _)| label)
        .collect();
        if !missing.is_empty() {
            return Err(RadError::Config {
                reason: format!(
                    "connection settings must contain Hostname, Port and URL; missing: {}",
                    missing.join(", ")
                ),
            });
        }

        let host = required_text(map, &["host", "Hostname"])?;
        let port = parse_port_value(lookup(map, &["port", "Port"]))?;
        let url_path = required_text(map, &["urlPath", "URL"])?;
        let config = Self::new(host, port, url_path);

        let login = lookup(map, &["login", "Login"]);
        let password = lookup(map, &["password", "Password"]);
        match (login, password) {
            (Some(login), Some(password)) => Ok(config.with_credentials(
                setting_text(login),
                setting_text(password),
            )),
            (None, None) => Ok(config),
            _ => Err(RadError::Config {
                reason: "Login and Password must be given together".to_string(),
            }),
        }
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

fn required_text(map: &Map<String, Value>, keys: &[&str]) -> Result<String, RadError> {
    lookup(map, keys)
        .map(setting_text)
        .ok_or_else(|| RadError::Config {
            reason: format!("missing connection setting `{}`", keys.join("`/`")),
        })
}

fn setting_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_port_text(text: &str) -> Result<u16, RadError> {
    text.trim().parse::<u16>().map_err(|err| RadError::Config {
        reason: format!("invalid port `{text}`: {err}"),
    })
}

fn parse_port_value(value: Option<&Value>) -> Result<u16, RadError> {
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|port| u16::try_from(port).ok())
            .ok_or_else(|| RadError::Config {
                reason: format!("invalid port `{number}`"),
            }),
        Some(Value::String(text)) => parse_port_text(text),
        Some(other) => Err(RadError::Config {
            reason: format!("invalid port `{other}`"),
        }),
        None => Err(RadError::Config {
            reason: "missing connection setting `port`".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::ConnectionConfig;
    use crate::error::RadError;

    #[test]
    fn positional_and_mapping_configs_agree() {
        let positional = ConnectionConfig::from_args([
            "localhost",
            "5555",
            "datasnap/rest/TServerClass",
            "dsclient",
            "Ds_1234",
        ])
        .expect("five positional values are valid");

        let mapping = ConnectionConfig::from_value(&json!({
            "Hostname": "localhost",
            "Port": 5555,
            "URL": "datasnap/rest/TServerClass",
            "Login": "dsclient",
            "Password": "Ds_1234",
        }))
        .expect("mapping with all keys is valid");

        let camel = ConnectionConfig::from_value(&json!({
            "host": "localhost",
            "port": "5555",
            "urlPath": "datasnap/rest/TServerClass",
            "login": "dsclient",
            "password": "Ds_1234",
        }))
        .expect("camel-case keys are valid");

        assert_eq!(positional.base_url(), "http://localhost:5555/datasnap/rest/TServerClass/");
        assert_eq!(positional.base_url(), mapping.base_url());
        assert_eq!(positional.auth(), mapping.auth());
        assert_eq!(mapping, camel);
    }

    #[test]
    fn three_positional_values_mean_no_auth() {
        let config = ConnectionConfig::from_args(["localhost", "8180", "datasnap/rest/TServerClass"])
            .expect("host, port and url are enough");
        assert!(config.auth().is_none());
        assert_eq!(config.port, 8180);
    }

    #[test]
    fn wrong_positional_counts_are_config_errors() {
        let cases: [&[&str]; 4] = [
            &[],
            &["localhost", "8180"],
            &["localhost", "8180", "datasnap/rest/TServerClass", "dsclient"],
            &["a", "1", "b", "c", "d", "e"],
        ];
        for values in cases {
            let err = ConnectionConfig::from_args(values.iter().copied())
                .expect_err("count must be rejected");
            assert!(err.is_config(), "values: {values:?}");
            assert!(err.to_string().contains("USAGE"));
        }
    }

    #[test]
    fn bad_port_is_config_error() {
        let err = ConnectionConfig::from_args(["localhost", "http", "x"]).expect_err("bad port");
        assert!(matches!(err, RadError::Config { .. }));
    }

    #[test]
    fn single_value_reads_settings_file() {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("radsnap-config-{}-{millis}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"Hostname": "ide-box", "Port": 8080, "URL": "datasnap/rest/TServerClass"}"#,
        )
        .expect("temp file is writable");

        let config = ConnectionConfig::from_args([path.display().to_string()])
            .expect("settings file resolves");
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.base_url(), "http://ide-box:8080/datasnap/rest/TServerClass/");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn unreadable_settings_file_is_config_error_with_usage() {
        let err = ConnectionConfig::from_args(["/definitely/not/here/settings.json"])
            .expect_err("missing file");
        assert!(err.is_config());
        assert!(err.to_string().contains("USAGE"));
    }

    #[test]
    fn mapping_missing_mandatory_keys_is_rejected() {
        let err = ConnectionConfig::from_value(&json!({"Hostname": "localhost"}))
            .expect_err("port and url missing");
        let message = err.to_string();
        assert!(message.contains("Port"));
        assert!(message.contains("URL"));
    }

    #[test]
    fn mapping_with_lone_login_is_rejected() {
        let err = ConnectionConfig::from_value(&json!({
            "Hostname": "localhost",
            "Port": 1,
            "URL": "x",
            "Login": "dsclient",
        }))
        .expect_err("login without password");
        assert!(err.is_config());
    }

    #[test]
    fn non_mapping_is_rejected() {
        assert!(ConnectionConfig::from_value(&json!(["localhost"])).is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ConnectionConfig::new("h", 1, "p").with_credentials("user", "secret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("secret"));
    }
}
