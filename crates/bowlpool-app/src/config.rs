// Configuration loading and parsing (pool.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use bowlpool_core::simulation::{SimulationSettings, DEFAULT_CHUNK_SIZE, DEFAULT_ITERATIONS};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the config was loaded from. Relative data paths resolve
    /// against it.
    pub base_dir: PathBuf,
    pub pool: PoolSection,
    pub data: DataSection,
    pub simulation: SimulationSection,
    pub output: OutputSection,
    /// Hypothetical winners keyed by game id, as raw team labels.
    pub what_if: HashMap<String, String>,
}

impl Config {
    pub fn games_path(&self) -> PathBuf {
        self.base_dir.join(&self.data.games)
    }

    pub fn picks_path(&self) -> PathBuf {
        self.base_dir.join(&self.data.picks)
    }
}

// ---------------------------------------------------------------------------
// pool.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pool.toml file.
#[derive(Debug, Clone, Deserialize)]
struct PoolFile {
    pool: PoolSection,
    data: DataSection,
    #[serde(default)]
    simulation: SimulationSection,
    #[serde(default)]
    output: OutputSection,
    #[serde(default)]
    what_if: WhatIfSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    pub name: String,
    #[serde(default)]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    pub games: String,
    pub picks: String,
    #[serde(default = "default_strict_winners")]
    pub strict_winners: bool,
}

fn default_strict_winners() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub iterations: u32,
    pub chunk_size: u32,
    /// Fixed RNG seed for reproducible runs. Entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        SimulationSection {
            iterations: DEFAULT_ITERATIONS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
        }
    }
}

impl SimulationSection {
    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            iterations: self.iterations,
            chunk_size: self.chunk_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WhatIfSection {
    #[serde(default)]
    overrides: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/pool.toml` relative to the
/// given `base_dir`.
///
/// This does not auto-copy defaults. Prefer `load_config()` or
/// `load_config_in()` which handle default initialization.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let pool_path = base_dir.join("config").join("pool.toml");
    let text = read_file(&pool_path)?;
    let file: PoolFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: pool_path.clone(),
        source: e,
    })?;

    let config = Config {
        base_dir: base_dir.to_path_buf(),
        pool: file.pool,
        data: file.data,
        simulation: file.simulation,
        output: file.output,
        what_if: file.what_if.overrides,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/`: every default file the pool has not
/// customized yet is copied over; existing files are never touched.
/// `.example` templates stay behind. Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, true) => return Ok(vec![]),
        (false, false) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "{} has neither defaults/ nor config/; pass the pool directory as BASE_DIR",
                    base_dir.display()
                ),
            })
        }
        (true, _) => {}
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| copy_error("create", &config_dir, e))?;

    let mut templates: Vec<PathBuf> = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error("read", &defaults_dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && !is_example_template(path))
        .collect();
    templates.sort();

    let mut seeded = Vec::new();
    for template in templates {
        let Some(file_name) = template.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if seed_file(&template, &target)? {
            seeded.push(target);
        }
    }

    Ok(seeded)
}

fn is_example_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "example")
}

/// Copy `template` to `target` unless `target` already exists. Returns
/// whether a file was written.
fn seed_file(template: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error("create", target, e)),
    };
    let mut src = std::fs::File::open(template).map_err(|e| copy_error("open", template, e))?;
    std::io::copy(&mut src, &mut dest).map_err(|e| copy_error("write", target, e))?;
    Ok(true)
}

fn copy_error(action: &str, path: &Path, e: std::io::Error) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("failed to {action} {}: {e}", path.display()),
    }
}

/// Copy defaults if needed, then load from `base_dir`.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Loads config relative to the current working directory, or from the
/// per-user data directory when the working directory has neither
/// `config/` nor `defaults/`.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&resolve_base_dir(&cwd))
}

/// Pick the base directory: `cwd` when it holds `config/` or `defaults/`,
/// otherwise the platform data directory for `bowlpool` if one exists.
pub fn resolve_base_dir(cwd: &Path) -> PathBuf {
    if cwd.join("config").exists() || cwd.join("defaults").exists() {
        return cwd.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "bowlpool")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| cwd.to_path_buf())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.pool.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "pool.name".into(),
            message: "must not be empty".into(),
        });
    }

    let paths: &[(&str, &str)] = &[
        ("data.games", config.data.games.as_str()),
        ("data.picks", config.data.picks.as_str()),
    ];
    for (name, val) in paths {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    let counts: &[(&str, u32)] = &[
        ("simulation.iterations", config.simulation.iterations),
        ("simulation.chunk_size", config.simulation.chunk_size),
    ];
    for (name, val) in counts {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
