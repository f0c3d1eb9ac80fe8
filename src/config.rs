use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const DEFAULT_MADRIGAL_BASE: &str = "%(MADRIGAL3_HTTP_PATH)s";
pub const DEFAULT_DESCRIPTOR_NAME: &str = "Madrigal.ini";
pub const DEFAULT_MANIFEST_NAME: &str = "Data.ini";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub instruments: BTreeMap<String, InstrumentEntry>,
    #[serde(default)]
    pub madrigal_base: Option<String>,
    #[serde(default)]
    pub avoid_overwrite: Option<bool>,
    #[serde(default)]
    pub descriptor_name: Option<String>,
    #[serde(default)]
    pub manifest_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstrumentEntry {
    pub output_path: String,
    pub mnemonic: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub output_root: Utf8PathBuf,
    pub mnemonic: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub instruments: BTreeMap<String, Instrument>,
    pub madrigal_base: String,
    pub avoid_overwrite: bool,
    pub descriptor_name: String,
    pub manifest_name: String,
}

impl ResolvedConfig {
    pub fn instrument(&self, id: &str) -> Result<&Instrument, CatalogError> {
        self.instruments
            .get(id.trim())
            .ok_or_else(|| CatalogError::InstrumentLookup(format!("unknown instrument id {id}")))
    }

    /// Sends every instrument's experiments under `root` instead of its configured path.
    pub fn with_output_root(mut self, root: Utf8PathBuf) -> Self {
        for instrument in self.instruments.values_mut() {
            instrument.output_root = root.clone();
        }
        self
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Explicit path, then the per-user config file, then built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, CatalogError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => match user_config_path() {
                Some(path) if path.exists() => path,
                _ => return Self::resolve_config(Config::default()),
            },
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| CatalogError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| CatalogError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, CatalogError> {
        let mut instruments = default_instruments();
        for (id, entry) in config.instruments {
            if entry.mnemonic.trim().is_empty() {
                return Err(CatalogError::ConfigParse(format!(
                    "instrument {id} has an empty mnemonic"
                )));
            }
            instruments.insert(
                id,
                Instrument {
                    output_root: Utf8PathBuf::from(entry.output_path),
                    mnemonic: entry.mnemonic,
                },
            );
        }

        Ok(ResolvedConfig {
            instruments,
            madrigal_base: config
                .madrigal_base
                .unwrap_or_else(|| DEFAULT_MADRIGAL_BASE.to_string()),
            avoid_overwrite: config.avoid_overwrite.unwrap_or(false),
            descriptor_name: config
                .descriptor_name
                .unwrap_or_else(|| DEFAULT_DESCRIPTOR_NAME.to_string()),
            manifest_name: config
                .manifest_name
                .unwrap_or_else(|| DEFAULT_MANIFEST_NAME.to_string()),
        })
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("amisr-catalog").join("catalog.json"))
}

pub fn default_instruments() -> BTreeMap<String, Instrument> {
    [
        (
            "61",
            "/opt/websites/database/calendar/amisrdb/ExperimentDetails/PFISR/Experiments",
            "pfa",
        ),
        (
            "91",
            "/opt/websites/database/calendar/amisrdb/ExperimentDetails/RISR-N/Experiments",
            "ran",
        ),
    ]
    .into_iter()
    .map(|(id, root, mnemonic)| {
        (
            id.to_string(),
            Instrument {
                output_root: Utf8PathBuf::from(root),
                mnemonic: mnemonic.to_string(),
            },
        )
    })
    .collect()
}
