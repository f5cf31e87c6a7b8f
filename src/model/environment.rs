use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reply shape of `IDE_Common_getEnvironment`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct IdeEnvironment {
    pub base_registry_key: String,
    pub product_identifier: String,
    pub parent_handle: Option<i64>,
    pub active_designer_type: String,
    pub root_directory: String,
    pub bin_directory: String,
    pub template_directory: String,
    pub application_data_directory: String,
    pub local_application_data_directory: String,
    #[serde(rename = "IDEPreferredUILanguages")]
    pub ide_preferred_ui_languages: String,
    pub startup_directory: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
