use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::commands::{HttpVerb, RequestSpec};
use crate::config::{ConnectionConfig, Credentials};
use crate::error::RadError;

const ACCEPT_VALUE: &str = "application/json";
const CONTENT_TYPE_VALUE: &str = "text/plain;charset=UTF-8";

#[derive(Debug)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl Transport {
    pub(crate) fn new(config: &ConnectionConfig, user_agent: &str) -> Result<Self, RadError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|err| RadError::Config {
                reason: format!("cannot build HTTP client: {err}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            credentials: config.credentials.clone(),
        })
    }

    pub(crate) fn request_url(&self, spec: &RequestSpec) -> String {
        format!("{}{}", self.base_url, spec.function_path())
    }

    /// Send one request and return the response body as text.
    pub(crate) async fn roundtrip(&self, spec: &RequestSpec) -> Result<String, RadError> {
        let url = self.request_url(spec);
        let wire_url = wire_url(&url);

        tracing::debug!(
            verb = %spec.verb,
            url = %url,
            args = spec.args.len(),
            "sending DataSnap request"
        );

        let mut request = match spec.verb {
            HttpVerb::Get => self.http.get(&wire_url),
            HttpVerb::Post => self.http.post(&wire_url),
        }
        .header(ACCEPT, ACCEPT_VALUE)
        .header(CONTENT_TYPE, CONTENT_TYPE_VALUE);

        if let Some(creds) = self.credentials.as_ref() {
            request = request.basic_auth(&creds.login, Some(&creds.password));
        }
        for (name, value) in spec.headers.iter().filter(|(name, _)| !is_fixed_header(name)) {
            request = request.header(name.as_str(), value.as_str());
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = spec.body.as_ref() {
            request = request.body(body.clone());
        }
        if let Some(timeout) = spec.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| transport_error(&url, &err))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "DataSnap server returned non-success status");
        }

        let body = response
            .text()
            .await
            .map_err(|err| transport_error(&url, &err))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received DataSnap reply");
        Ok(body)
    }
}

/// `Accept` and `Content-Type` are always the fixed pair; caller values for them are dropped.
fn is_fixed_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(ACCEPT.as_str()) || name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
}

/// URL text as sent on the wire; backslashes would otherwise be read as path separators.
pub(crate) fn wire_url(url: &str) -> String {
    url.replace('\\', "%5C")
}

fn transport_error(url: &str, err: &reqwest::Error) -> RadError {
    let mut reason = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }

    RadError::Transport {
        url: url.to_string(),
        reason,
    }
}
