use serde_json::Value;

use crate::client::RadClient;
use crate::commands::RequestSpec;
use crate::envelope::{is_truthy, value_text};
use crate::error::RadError;
use crate::ide::{decode_record, describe_fields, expect_integer, fetch_string_list};
use crate::model::package::{basename, same_package_name, PackageInfo, PackageRef};

const CMD_GET_PACKAGES_VALUE: &str = "IDE_Packages_getPackagesValue";
const CMD_GET_PACKAGE_INFO_VALUE: &str = "IDE_Packages_getPackageInfoValue";
const CMD_GET_COUNT: &str = "IDE_Packages_getCount";
const CMD_GET_PACKAGE_INFO: &str = "IDE_Packages_getPackageInfo";
const CMD_GET_COMP_COUNT: &str = "IDE_Packages_getCompCount";
const CMD_GET_COMP_NAME: &str = "IDE_Packages_getCompName";
const CMD_TOGGLE_LOADED: &str = "IDE_Packages_ToggleLoaded";
const CMD_INSTALL: &str = "IDE_Packages_Install";
const CMD_UNINSTALL: &str = "IDE_Packages_Uninstall";

const PROP_PACKAGE_NAMES: &str = "PackageNames";
const PROP_ERROR_MSG: &str = "ErrorMsg";

async fn fetch_package_names(client: &RadClient) -> Result<Vec<String>, RadError> {
    fetch_string_list(client, CMD_GET_PACKAGES_VALUE, PROP_PACKAGE_NAMES).await
}

async fn fetch_package_count(client: &RadClient) -> Result<i64, RadError> {
    let value = client.call(CMD_GET_COUNT).await?;
    expect_integer(CMD_GET_COUNT, value)
}

/// One package installed in (or known to) the IDE.
///
/// `info` is `None` once the package has been uninstalled or could not be
/// found again by `reload`; `last_info` keeps the most recent snapshot.
#[derive(Clone, Debug)]
pub struct Package {
    client: RadClient,
    index: i64,
    info: Option<PackageInfo>,
    last_info: Option<PackageInfo>,
}

impl Package {
    /// Look a package up by index or by file name and load its info.
    pub async fn open(client: &RadClient, package: impl Into<PackageRef>) -> Result<Self, RadError> {
        let index = match package.into() {
            PackageRef::Index(index) => {
                let count = fetch_package_count(client).await?;
                if index < 0 || index >= count {
                    return Err(RadError::PackageIndexOutOfRange {
                        index,
                        count: usize::try_from(count).unwrap_or(0),
                    });
                }
                index
            }
            PackageRef::Name(name) => {
                let names = fetch_package_names(client).await?;
                let position = names
                    .iter()
                    .position(|ide_name| same_package_name(&name, ide_name))
                    .ok_or(RadError::PackageNotFound { name })?;
                position as i64
            }
        };

        let mut package = Self {
            client: client.clone(),
            index,
            info: None,
            last_info: None,
        };
        package.load_info().await?;
        Ok(package)
    }

    /// Position in the IDE package list, or -1 once cleared.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn info(&self) -> Option<&PackageInfo> {
        self.info.as_ref()
    }

    pub fn last_info(&self) -> Option<&PackageInfo> {
        self.last_info.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.name.as_str())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.file_name.as_str())
    }

    pub async fn last_error(&self) -> Result<Value, RadError> {
        self.client
            .call(
                RequestSpec::new(CMD_GET_PACKAGE_INFO_VALUE)
                    .arg(self.index)
                    .arg(PROP_ERROR_MSG),
            )
            .await
    }

    /// Re-read the info at `index`, or find this package by name when `index` is `None`.
    ///
    /// Returns `false` and clears the package when the name is no longer listed.
    pub async fn reload(&mut self, index: Option<i64>) -> Result<bool, RadError> {
        if let Some(index) = index {
            self.index = index;
            self.load_info().await?;
            return Ok(true);
        }

        let name = self
            .info
            .as_ref()
            .or(self.last_info.as_ref())
            .map(|info| info.name.clone())
            .ok_or(RadError::MissingPackageInfo)?;

        let names = fetch_package_names(&self.client).await?;
        match names.iter().position(|ide_name| *ide_name == name) {
            Some(position) => {
                self.index = position as i64;
                self.load_info().await?;
                Ok(true)
            }
            None => {
                self.clear();
                Ok(false)
            }
        }
    }

    pub async fn component_count(&self) -> Result<i64, RadError> {
        if self.index < 0 {
            return Ok(0);
        }

        let value = self
            .client
            .call(RequestSpec::new(CMD_GET_COMP_COUNT).arg(self.index))
            .await?;
        expect_integer(CMD_GET_COMP_COUNT, value)
    }

    pub async fn components(&self) -> Result<Vec<String>, RadError> {
        let count = self.component_count().await?;
        let mut names = Vec::new();
        for component in 0..count {
            let value = self
                .client
                .call(
                    RequestSpec::new(CMD_GET_COMP_NAME)
                        .arg(self.index)
                        .arg(component),
                )
                .await?;
            names.push(value_text(&value));
        }

        Ok(names)
    }

    /// Load or unload the package; `info().loaded` follows a successful reply.
    pub async fn set_loaded(&mut self, loaded: bool) -> Result<Value, RadError> {
        let result = self
            .client
            .call(RequestSpec::new(CMD_TOGGLE_LOADED).arg(self.index).arg(loaded))
            .await?;

        if is_truthy(&result) {
            if let Some(info) = self.info.as_mut() {
                info.loaded = loaded;
            }
        }

        Ok(result)
    }

    /// Install from the known file name, then find the package again by name.
    pub async fn install(&mut self) -> Result<bool, RadError> {
        let file_name = self
            .info
            .as_ref()
            .or(self.last_info.as_ref())
            .map(|info| info.file_name.clone())
            .filter(|file_name| !file_name.is_empty())
            .ok_or(RadError::MissingPackageInfo)?;

        let result = self
            .client
            .call(RequestSpec::new(CMD_INSTALL).arg(file_name))
            .await?;
        tracing::debug!(result = %value_text(&result), "package install requested");

        self.reload(None).await
    }

    /// Uninstall; a successful reply clears the package.
    pub async fn uninstall(&mut self) -> Result<Value, RadError> {
        let file_name = self
            .file_name()
            .map(str::to_string)
            .ok_or(RadError::MissingPackageInfo)?;

        let result = self
            .client
            .call(RequestSpec::new(CMD_UNINSTALL).arg(file_name))
            .await?;

        if is_truthy(&result) {
            self.clear();
        }

        Ok(result)
    }

    pub async fn is_installed(&self) -> Result<bool, RadError> {
        let Some(name) = self.name() else {
            return Ok(false);
        };

        let names = fetch_package_names(&self.client).await?;
        Ok(names.iter().any(|ide_name| ide_name == name))
    }

    /// `key: value` lines for the index and every info field.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("Index: {}", self.index)];
        if let Some(info) = self.info.as_ref() {
            let value = serde_json::to_value(info).unwrap_or(Value::Null);
            lines.extend(describe_fields(&value));
        }
        lines.join("\n")
    }

    async fn load_info(&mut self) -> Result<(), RadError> {
        let value = self
            .client
            .call(RequestSpec::new(CMD_GET_PACKAGE_INFO).arg(self.index))
            .await?;
        let info: PackageInfo = decode_record(CMD_GET_PACKAGE_INFO, value)?;

        self.last_info = Some(info.clone());
        self.info = Some(info);
        Ok(())
    }

    fn clear(&mut self) {
        self.info = None;
        self.index = -1;
    }
}

/// The IDE package collection.
#[derive(Clone, Debug)]
pub struct Packages {
    client: RadClient,
}

impl Packages {
    pub fn new(client: &RadClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    pub async fn last_error(&self) -> Result<Value, RadError> {
        self.client
            .call(RequestSpec::new(CMD_GET_PACKAGES_VALUE).arg(PROP_ERROR_MSG))
            .await
    }

    pub async fn package_names(&self) -> Result<Vec<String>, RadError> {
        fetch_package_names(&self.client).await
    }

    pub async fn count(&self) -> Result<usize, RadError> {
        Ok(self.package_names().await?.len())
    }

    /// Position of `name` (compared by case-insensitive basename).
    pub async fn index_of(&self, name: &str) -> Result<Option<usize>, RadError> {
        let names = self.package_names().await?;
        Ok(names
            .iter()
            .position(|ide_name| same_package_name(name, ide_name)))
    }

    pub async fn get(&self, package: impl Into<PackageRef>) -> Result<Package, RadError> {
        Package::open(&self.client, package).await
    }

    /// Whether `package` can be opened; lookup failures of any kind count as `false`.
    pub async fn contains(&self, package: impl Into<PackageRef>) -> bool {
        self.get(package).await.is_ok()
    }

    pub async fn install(&self, package: impl Into<PackageRef>) -> Result<Value, RadError> {
        let target = self.remote_name(package.into(), true).await?;
        self.client
            .call(RequestSpec::new(CMD_INSTALL).arg(target))
            .await
    }

    pub async fn uninstall(&self, package: impl Into<PackageRef>) -> Result<Value, RadError> {
        let target = self.remote_name(package.into(), true).await?;
        self.client
            .call(RequestSpec::new(CMD_UNINSTALL).arg(target))
            .await
    }

    pub async fn is_installed(&self, package: impl Into<PackageRef>) -> Result<bool, RadError> {
        let name = match package.into() {
            PackageRef::Name(name) => basename(&name).to_string(),
            index => self.remote_name(index, false).await?,
        };

        let names = self.package_names().await?;
        Ok(names.contains(&name))
    }

    /// Lazily walk every package; each call starts from a fresh count.
    pub fn iter(&self) -> PackageIter {
        PackageIter {
            client: self.client.clone(),
            next_index: 0,
            count: None,
        }
    }

    pub async fn describe(&self) -> Result<String, RadError> {
        let names = self.package_names().await?;
        Ok(format!("{names:?}"))
    }

    /// Name passed to install/uninstall: given names verbatim, indexes resolved
    /// to the package's full path (or short name).
    async fn remote_name(&self, package: PackageRef, full_path: bool) -> Result<String, RadError> {
        let index = match package {
            PackageRef::Name(name) => return Ok(name),
            PackageRef::Index(index) => index,
        };

        let count = self.count().await?;
        if index < 0 || index as usize >= count {
            return Err(RadError::PackageIndexOutOfRange { index, count });
        }

        let package = self.get(index).await?;
        let info = package.info().ok_or(RadError::MissingPackageInfo)?;
        Ok(if full_path {
            info.file_name.clone()
        } else {
            info.name.clone()
        })
    }
}

/// Cursor over the IDE packages.
///
/// The package count is fetched on the first step and each step opens one
/// package.
#[derive(Debug)]
pub struct PackageIter {
    client: RadClient,
    next_index: usize,
    count: Option<usize>,
}

impl PackageIter {
    pub async fn next_package(&mut self) -> Option<Result<Package, RadError>> {
        let count = match self.count {
            Some(count) => count,
            None => match fetch_package_names(&self.client).await {
                Ok(names) => {
                    self.count = Some(names.len());
                    names.len()
                }
                Err(err) => {
                    self.count = Some(0);
                    return Some(Err(err));
                }
            },
        };

        if self.next_index >= count {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(Package::open(&self.client, index).await)
    }

    /// Collect every remaining package, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<Package>, RadError> {
        let mut packages = Vec::new();
        while let Some(package) = self.next_package().await {
            packages.push(package?);
        }
        Ok(packages)
    }
}
