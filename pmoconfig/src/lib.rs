//! # pmoconfig - configuration YAML du bridge
//!
//! Trois couches, de la plus faible à la plus forte :
//!
//! - 📦 **Défauts intégrés** : `pmobridge.yaml`, compilé dans le binaire
//! - 📝 **Fichier** : `<dir>/config.yaml`, réécrit après chargement
//! - 🌍 **Environnement** : `PMOBRIDGE_CONFIG__HOST__HTTP_PORT=9000` fixe `host.http_port`
//!
//! Les clés sont insensibles à la casse. Une valeur absente ou mal typée
//! retombe sur son défaut avec un `warn!`.
//!
//! ```no_run
//! use pmoconfig::{BridgeSettings, get_config};
//!
//! let config = get_config();
//! let settings = BridgeSettings::from_config(&config);
//! println!("catalog at {}", settings.catalog_base_url);
//! ```
//!
//! Les composants du bridge ne lisent jamais la configuration globale
//! eux-mêmes : le binaire construit un [`BridgeSettings`] au démarrage et
//! l'injecte.

use anyhow::{Result, bail};
use lazy_static::lazy_static;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

mod settings;

pub use settings::BridgeSettings;

const DEFAULT_CONFIG: &str = include_str!("pmobridge.yaml");

const CONFIG_FILE: &str = "config.yaml";
const DIR_NAME: &str = ".pmobridge";
const ENV_CONFIG_DIR: &str = "PMOBRIDGE_CONFIG";
const ENV_PREFIX: &str = "PMOBRIDGE_CONFIG__";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_FRIENDLY_NAME: &str = "PMOBridge";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROXY_PATH: &str = "/cdp-proxy";
const DEFAULT_CONTROL_PATH: &str = "/ContentDirectory/control";

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load(None).unwrap_or_else(|e| {
        error!("Cannot load configuration ({}), using built-in defaults", e);
        Config::in_memory()
    }));
}

/// Configuration globale, chargée au premier accès
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Arbre YAML fusionné, éventuellement adossé à un fichier
#[derive(Debug)]
pub struct Config {
    file: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Config {
    /// Charge la configuration depuis `dir`, ou depuis le premier
    /// répertoire candidat (`$PMOBRIDGE_CONFIG`, `./.pmobridge`,
    /// `~/.pmobridge`)
    ///
    /// Le répertoire est créé s'il manque ; le résultat fusionné y est
    /// réécrit.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(locate_dir);
        prepare_dir(&dir)?;

        let file = dir.join(CONFIG_FILE);
        let mut tree = defaults();
        match fs::read_to_string(&file) {
            Ok(text) => {
                info!(config_file = %file.display(), "Loaded config file");
                overlay(&mut tree, lowercase_keys(serde_yaml::from_str(&text)?));
            }
            Err(_) => info!(config_file = %file.display(), "No config file, using defaults"),
        }
        apply_env(&mut tree, env::vars());

        let config = Self {
            file: Some(file),
            data: Mutex::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    /// Défauts intégrés seuls, sans fichier ni environnement
    pub fn in_memory() -> Self {
        Self {
            file: None,
            data: Mutex::new(defaults()),
        }
    }

    /// Fichier `config.yaml` associé, s'il y en a un
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(file) = &self.file {
            fs::write(file, serde_yaml::to_string(&*self.tree())?)?;
        }
        Ok(())
    }

    /// Valeur brute au chemin `path`
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let tree = self.tree();
        let mut node = &*tree;
        for key in path {
            match node.get(key.to_lowercase()) {
                Some(next) => node = next,
                None => bail!("no configuration value at {}", path.join(".")),
            }
        }
        Ok(node.clone())
    }

    /// Écrit `value` au chemin `path` puis sauvegarde
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        insert(&mut self.tree(), path, value)?;
        self.save()
    }

    /// Variante typée de [`Config::set_value`]
    pub fn set<T: Serialize>(&self, path: &[&str], value: T) -> Result<()> {
        self.set_value(path, serde_yaml::to_value(value)?)
    }

    fn tree(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T: DeserializeOwned>(&self, path: &[&str]) -> Option<T> {
        let value = self.get_value(path).ok()?;
        match serde_yaml::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key = %path.join("."), error = %e, "Invalid configuration value, using default");
                None
            }
        }
    }

    fn read_or<T: DeserializeOwned>(&self, path: &[&str], default: T) -> T {
        self.read(path).unwrap_or(default)
    }

    fn read_string(&self, path: &[&str], default: &str) -> String {
        self.read(path).unwrap_or_else(|| default.to_string())
    }

    /// Hôte annoncé ; vide pour écouter sur toutes les interfaces
    pub fn get_base_url(&self) -> String {
        self.read_string(&["host", "base_url"], "")
    }

    pub fn get_http_port(&self) -> u16 {
        self.read_or(&["host", "http_port"], DEFAULT_HTTP_PORT)
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set(&["host", "http_port"], port)
    }

    pub fn get_friendly_name(&self) -> String {
        self.read_string(&["host", "friendly_name"], DEFAULT_FRIENDLY_NAME)
    }

    pub fn get_log_min_level(&self) -> String {
        self.read_string(&["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL)
    }

    pub fn get_log_enable_console(&self) -> bool {
        self.read_or(&["host", "logger", "enable_console"], true)
    }

    pub fn get_catalog_base_url(&self) -> String {
        self.read_string(&["catalog", "base_url"], "")
    }

    pub fn get_catalog_token(&self) -> String {
        self.read_string(&["catalog", "token"], "")
    }

    /// Bundles PEM additionnels
    ///
    /// Liste YAML ou chaîne séparée par des virgules ; les entrées vides
    /// sont ignorées.
    pub fn get_catalog_root_cas(&self) -> Vec<String> {
        let entries: Vec<String> = match self.read::<Value>(&["catalog", "root_cas"]) {
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            Some(Value::Sequence(seq)) => seq
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        entries
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn get_catalog_timeout_secs(&self) -> u64 {
        self.read_or(&["catalog", "timeout_secs"], DEFAULT_CATALOG_TIMEOUT_SECS)
    }

    pub fn get_guess_mime_from_url(&self) -> bool {
        self.read_or(&["catalog", "guess_mime_from_url"], false)
    }

    pub fn get_proxy_path(&self) -> String {
        self.read_string(&["proxy", "path"], DEFAULT_PROXY_PATH)
    }

    pub fn get_control_path(&self) -> String {
        self.read_string(&["contentdirectory", "control_path"], DEFAULT_CONTROL_PATH)
    }
}

fn defaults() -> Value {
    match serde_yaml::from_str(DEFAULT_CONFIG) {
        Ok(tree) => lowercase_keys(tree),
        Err(e) => {
            error!("Embedded configuration is invalid: {}", e);
            Value::Mapping(Mapping::new())
        }
    }
}

fn locate_dir() -> PathBuf {
    if let Ok(dir) = env::var(ENV_CONFIG_DIR) {
        info!(env_var = ENV_CONFIG_DIR, path = %dir, "Config directory from environment");
        return PathBuf::from(dir);
    }

    let local = PathBuf::from(DIR_NAME);
    if local.is_dir() {
        return local;
    }

    dirs::home_dir()
        .map(|home| home.join(DIR_NAME))
        .filter(|dir| dir.is_dir())
        .unwrap_or(local)
}

fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let probe = dir.join(".write_test");
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)?;
    Ok(())
}

/// `top` l'emporte ; seuls les mappings sont fusionnés clé par clé
fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Mapping(base), Value::Mapping(top)) => {
            for (key, value) in top {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, top) => *base = top,
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(k, v)| {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (k, lowercase_keys(v))
                })
                .collect(),
        ),
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

fn apply_env(tree: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (name, raw) in vars {
        let Some(path) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<&str> = path.split("__").collect();
        let value: Value =
            serde_yaml::from_str(&raw).unwrap_or_else(|_| Value::String(raw.clone()));
        if let Err(e) = insert(tree, &path, value) {
            warn!(env_var = %name, error = %e, "Ignoring configuration override");
        }
    }
}

fn insert(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *tree = value;
        return Ok(());
    };

    let mut node = tree;
    for key in parents {
        let Some(map) = node.as_mapping_mut() else {
            bail!("{} is not a mapping", path.join("."));
        };
        node = map
            .entry(Value::String(key.to_lowercase()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }

    let Some(map) = node.as_mapping_mut() else {
        bail!("{} is not a mapping", path.join("."));
    };
    map.insert(Value::String(last.to_lowercase()), value);
    Ok(())
}
