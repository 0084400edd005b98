use std::fs;
use std::path::PathBuf;

use crate::page::FileStore;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("APPTRACK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("apptrack").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Local store holding the login session and filter seeds
pub fn open_store() -> anyhow::Result<FileStore> {
    Ok(FileStore::new(get_config_dir()?.join("storage.json")))
}
