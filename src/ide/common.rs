use std::path::Path;

use serde_json::Value;

use crate::client::RadClient;
use crate::commands::RequestSpec;
use crate::error::RadError;
use crate::ide::decode_record;
use crate::model::environment::IdeEnvironment;

const CMD_GET_ENVIRONMENT: &str = "IDE_Common_getEnvironment";
const CMD_IS_PROJECT: &str = "IDE_Common_IsProject";
const CMD_IS_PROJECT_GROUP: &str = "IDE_Common_IsProjectGroup";
const CMD_EXPAND_ROOT_MACRO: &str = "IDE_Common_getExpandRootMacro";
const CMD_OPEN_FILE: &str = "IDE_Actions_OpenFile";
const CMD_CLOSE_FILE: &str = "IDE_Actions_CloseFile";
const CMD_RELOAD_FILE: &str = "IDE_Actions_ReloadFile";
const CMD_SAVE_FILE: &str = "IDE_Actions_SaveFile";
const CMD_OPEN_PROJECT: &str = "IDE_Actions_OpenProject";
const CMD_EXECUTE_ACTION: &str = "IDE_MainMenu_ExecuteAction";

const ACTION_SAVE_ALL: &str = "FileSaveAllCommand";
const ACTION_CLOSE_ALL: &str = "FileCloseAllCommand";

/// IDE environment constants plus file and project actions.
#[derive(Clone, Debug)]
pub struct Common {
    client: RadClient,
    environment: IdeEnvironment,
}

impl Common {
    pub async fn load(client: &RadClient) -> Result<Self, RadError> {
        let environment = fetch_environment(client).await?;
        Ok(Self {
            client: client.clone(),
            environment,
        })
    }

    pub async fn reload(&mut self) -> Result<(), RadError> {
        self.environment = fetch_environment(&self.client).await?;
        Ok(())
    }

    pub fn environment(&self) -> &IdeEnvironment {
        &self.environment
    }

    /// With `check_exists`, a path missing on this machine is `false` without asking the IDE.
    pub async fn is_project(&self, path: impl AsRef<Path>, check_exists: bool) -> Result<bool, RadError> {
        self.ask_about_file(CMD_IS_PROJECT, path.as_ref(), check_exists)
            .await
    }

    pub async fn is_project_group(
        &self,
        path: impl AsRef<Path>,
        check_exists: bool,
    ) -> Result<bool, RadError> {
        self.ask_about_file(CMD_IS_PROJECT_GROUP, path.as_ref(), check_exists)
            .await
    }

    pub async fn expand_root_macro(&self, text: &str) -> Result<Value, RadError> {
        self.client
            .call(RequestSpec::new(CMD_EXPAND_ROOT_MACRO).arg(text))
            .await
    }

    pub async fn open_file(&self, path: &str) -> Result<bool, RadError> {
        self.file_action(CMD_OPEN_FILE, path).await
    }

    pub async fn close_file(&self, path: &str, save_first: bool) -> Result<bool, RadError> {
        if save_first {
            self.save_file(path).await?;
        }
        self.file_action(CMD_CLOSE_FILE, path).await
    }

    pub async fn close_all_files(&self, save_first: bool) -> Result<bool, RadError> {
        if save_first {
            self.client
                .call_bool(RequestSpec::new(CMD_EXECUTE_ACTION).arg(ACTION_SAVE_ALL))
                .await?;
        }
        self.client
            .call_bool(RequestSpec::new(CMD_EXECUTE_ACTION).arg(ACTION_CLOSE_ALL))
            .await
    }

    pub async fn reload_file(&self, path: &str) -> Result<bool, RadError> {
        self.file_action(CMD_RELOAD_FILE, path).await
    }

    pub async fn save_file(&self, path: &str) -> Result<bool, RadError> {
        self.file_action(CMD_SAVE_FILE, path).await
    }

    pub async fn open_project(&self, path: &str, new_project_group: bool) -> Result<bool, RadError> {
        self.client
            .call_bool(
                RequestSpec::new(CMD_OPEN_PROJECT)
                    .arg(path)
                    .arg(new_project_group),
            )
            .await
    }

    async fn file_action(&self, method: &str, path: &str) -> Result<bool, RadError> {
        self.client
            .call_bool(RequestSpec::new(method).arg(path))
            .await
    }

    async fn ask_about_file(
        &self,
        method: &str,
        path: &Path,
        check_exists: bool,
    ) -> Result<bool, RadError> {
        if check_exists && !path.is_file() {
            return Ok(false);
        }

        let path = path.to_string_lossy();
        self.file_action(method, &path).await
    }
}

async fn fetch_environment(client: &RadClient) -> Result<IdeEnvironment, RadError> {
    let value = client.call(CMD_GET_ENVIRONMENT).await?;
    decode_record(CMD_GET_ENVIRONMENT, value)
}
