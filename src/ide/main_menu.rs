use serde_json::Value;

use crate::client::RadClient;
use crate::commands::RequestSpec;
use crate::envelope::value_text;
use crate::error::RadError;

const CMD_GET_VALUE: &str = "IDE_MainMenu_getValue";
const CMD_WRITE_TO_FILE: &str = "IDE_MainMenu_WriteToFile";
const CMD_WRITE_ACTIONS_TO_FILE: &str = "IDE_MainMenu_WriteActionsToFile";
const CMD_EXECUTE_MENU_ITEM: &str = "IDE_MainMenu_ExecuteMenuItem";
const CMD_EXECUTE_ACTION: &str = "IDE_MainMenu_ExecuteAction";

const PROP_ERROR_MSG: &str = "ErrorMsg";
const PROP_MAIN_MENU_STRING: &str = "MainMenuString";

/// Separator between captions in a menu item path such as `Search|Replace...`.
pub const DEFAULT_MENU_DELIMITER: &str = "|";

/// The IDE main menu and its actions.
#[derive(Clone, Debug)]
pub struct MainMenu {
    client: RadClient,
}

impl MainMenu {
    pub fn new(client: &RadClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    pub async fn last_error(&self) -> Result<Value, RadError> {
        self.client
            .call(RequestSpec::new(CMD_GET_VALUE).arg(PROP_ERROR_MSG))
            .await
    }

    /// Write the menu structure to a file on the IDE machine.
    pub async fn menu_to_file(&self, path: &str) -> Result<bool, RadError> {
        self.client
            .call_bool(RequestSpec::new(CMD_WRITE_TO_FILE).arg(path))
            .await
    }

    pub async fn menu_to_string(&self) -> Result<String, RadError> {
        let value = self
            .client
            .call(RequestSpec::new(CMD_GET_VALUE).arg(PROP_MAIN_MENU_STRING))
            .await?;

        Ok(match value {
            Value::Null => String::new(),
            other => value_text(&other),
        })
    }

    /// Like [`MainMenu::menu_to_file`], with each caption followed by its action name.
    pub async fn actions_to_file(&self, path: &str) -> Result<bool, RadError> {
        self.client
            .call_bool(RequestSpec::new(CMD_WRITE_ACTIONS_TO_FILE).arg(path))
            .await
    }

    /// Click a menu item given its caption path, e.g. `Tools|Options...`.
    ///
    /// Captions are given without their `&` accelerator markers.
    pub async fn execute_menu_item(&self, item_path: &str, delimiter: &str) -> Result<bool, RadError> {
        self.client
            .call_bool(
                RequestSpec::new(CMD_EXECUTE_MENU_ITEM)
                    .arg(item_path)
                    .arg(delimiter),
            )
            .await
    }

    pub async fn execute_action(&self, action_name: &str) -> Result<bool, RadError> {
        self.client
            .call_bool(RequestSpec::new(CMD_EXECUTE_ACTION).arg(action_name))
            .await
    }

    pub async fn describe(&self) -> Result<String, RadError> {
        self.menu_to_string().await
    }
}
