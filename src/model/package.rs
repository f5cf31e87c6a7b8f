use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply shape of `IDE_Packages_getPackageInfo`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInfo {
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Producer")]
    pub producer: String,
    #[serde(rename = "Consumer")]
    pub consumer: String,
    #[serde(rename = "SymbolFileName")]
    pub symbol_file_name: String,
    #[serde(rename = "RuntimeOnly")]
    pub runtime_only: bool,
    #[serde(rename = "DesigntimeOnly")]
    pub designtime_only: bool,
    #[serde(rename = "IDEPackage")]
    pub ide_package: bool,
    #[serde(rename = "Loaded")]
    pub loaded: bool,
    #[serde(rename = "ContainsList")]
    pub contains: Vec<String>,
    #[serde(rename = "RequiresList")]
    pub requires: Vec<String>,
    #[serde(rename = "ImplicitList")]
    pub implicit: Vec<String>,
    #[serde(rename = "RequiredByList")]
    pub required_by: Vec<String>,
    /// Keys the server sent that have no declared field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Selects a package by position in the IDE list or by file name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackageRef {
    Index(i64),
    Name(String),
}

impl PackageRef {
    /// Name compared against the IDE list: the last path component.
    pub fn basename(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(name) => Some(basename(name)),
        }
    }
}

impl From<i64> for PackageRef {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<usize> for PackageRef {
    fn from(index: usize) -> Self {
        Self::Index(index as i64)
    }
}

impl From<&str> for PackageRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PackageRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for PackageRef {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err("package reference must not be empty".to_string());
        }

        match value.parse::<i64>() {
            Ok(index) => Ok(Self::Index(index)),
            Err(_) => Ok(Self::Name(value.to_string())),
        }
    }
}

/// Last component of a Windows or POSIX path.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(&['\\', '/'][..]).next().unwrap_or(path)
}

/// Case-insensitive comparison of `candidate`'s basename with an IDE package name.
pub(crate) fn same_package_name(candidate: &str, ide_name: &str) -> bool {
    basename(candidate).to_lowercase() == ide_name.to_lowercase()
}
