use std::path::{
    Path,
    PathBuf,
};

use bufo::Endianness;
use color_eyre::eyre::{
    eyre,
    Error,
    WrapErr,
};
use serde::{
    Deserialize,
    Deserializer,
};

#[derive(Debug, Deserialize, Default)]
pub struct ConfigData {
    #[serde(default, deserialize_with = "deserialize_endianness")]
    pub endianness: Endianness,

    #[serde(default)]
    pub hexdump: HexdumpConfig,
}

#[derive(Debug)]
pub struct Config {
    pub config: ConfigData,
    pub path: PathBuf,
}

impl Config {
    pub const DIR_NAME: &'static str = "bufo";
    pub const CONFIG_FILE: &'static str = "bufo.toml";

    /// Opens the config file at `path`, or in the user's config directory.
    ///
    /// If the config file doesn't exist, the default config file is written
    /// there.
    pub fn open(path: Option<impl AsRef<Path>>) -> Result<Self, Error> {
        let path = path
            .map(|path| path.as_ref().to_owned())
            .or_else(|| dirs::config_local_dir().map(|path| path.join(Self::DIR_NAME)))
            .ok_or_else(|| eyre!("Could not determine config directory"))?;

        if !path.exists() {
            std::fs::create_dir_all(&path)
                .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
        }

        let config_file_path = path.join(Self::CONFIG_FILE);
        let config = if config_file_path.exists() {
            let toml = std::fs::read_to_string(&config_file_path)?;
            toml::from_str(&toml)
                .wrap_err_with(|| format!("Invalid config file: {}", config_file_path.display()))?
        }
        else {
            let config = ConfigData::default();
            std::fs::write(&config_file_path, include_str!("../bufo.default.toml"))?;
            tracing::info!("Default config written to: {}", config_file_path.display());
            config
        };

        Ok(Self { config, path })
    }
}

#[derive(Debug, Deserialize)]
pub struct HexdumpConfig {
    #[serde(default = "default_true")]
    pub header: bool,

    #[serde(default = "default_true")]
    pub trailing_newline: bool,
}

impl Default for HexdumpConfig {
    fn default() -> Self {
        Self {
            header: true,
            trailing_newline: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn deserialize_endianness<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Endianness, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(<D::Error as serde::de::Error>::custom)
}
