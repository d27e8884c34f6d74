use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{ledger_store::DEFAULT_STORAGE_KEY, utils, LedgerStore},
    errors::LedgerError,
    storage::{
        json_backend::{with_suffix, write_atomic},
        JsonFileStore,
    },
};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Currency code labelling amounts on exported report sheets.
    pub currency: String,
    #[serde(default = "Config::default_storage_key")]
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding ledger blobs. Defaults to `<app data dir>/data`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            storage_key: Self::default_storage_key(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_storage_key() -> String {
        DEFAULT_STORAGE_KEY.into()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => utils::data_dir_in(&utils::app_data_dir()),
        }
    }

    /// Opens a file-backed store according to this configuration.
    pub fn open_store(&self) -> Result<LedgerStore, LedgerError> {
        let backend = JsonFileStore::new(self.resolve_data_dir())?;
        Ok(LedgerStore::new(Box::new(backend)).with_key(self.storage_key.clone()))
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(utils::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = with_suffix(&self.path, TMP_SUFFIX);
        write_atomic(&tmp, json.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
