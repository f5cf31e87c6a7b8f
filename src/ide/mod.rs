//! Typed proxies over the IDE experts exposed by the DataSnap server.
//!
//! Every proxy holds a [`RadClient`] handed to it at construction; none of
//! them keep state on the server side.

mod common;
mod main_menu;
mod packages;

pub use common::Common;
pub use main_menu::{MainMenu, DEFAULT_MENU_DELIMITER};
pub use packages::{Package, PackageIter, Packages};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::RadClient;
use crate::envelope::value_text;
use crate::error::RadError;

pub(crate) fn unexpected(method: &str, value: &Value) -> RadError {
    RadError::UnexpectedResult {
        method: method.to_string(),
        value: value_text(value),
    }
}

pub(crate) fn expect_string_list(method: &str, value: Value) -> Result<Vec<String>, RadError> {
    match value {
        Value::Array(items) => Ok(items.iter().map(value_text).collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(unexpected(method, &other)),
    }
}

pub(crate) fn expect_integer(method: &str, value: Value) -> Result<i64, RadError> {
    match &value {
        Value::Number(number) => number.as_i64().ok_or_else(|| unexpected(method, &value)),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| unexpected(method, &value)),
        _ => Err(unexpected(method, &value)),
    }
}

pub(crate) fn decode_record<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, RadError> {
    if !value.is_object() {
        return Err(unexpected(method, &value));
    }

    let raw = value.to_string();
    serde_json::from_value(value).map_err(|err| RadError::Protocol {
        reason: format!("cannot decode `{method}` reply: {err}"),
        raw,
    })
}

/// `key: value` lines, one per field of a serialized record, sorted by key.
pub(crate) fn describe_fields(value: &Value) -> Vec<String> {
    let Some(map) = value.as_object() else {
        return vec![value_text(value)];
    };

    let mut lines: Vec<String> = map
        .iter()
        .map(|(key, field)| format!("{key}: {}", value_text(field)))
        .collect();
    lines.sort();
    lines
}

pub(crate) async fn fetch_string_list(
    client: &RadClient,
    method: &str,
    property: &str,
) -> Result<Vec<String>, RadError> {
    let value = client
        .call(crate::commands::RequestSpec::new(method).arg(property))
        .await?;
    expect_string_list(method, value)
}
