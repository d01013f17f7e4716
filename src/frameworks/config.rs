// Runtime settings: defaults, then an optional TOML file, then environment.

use crate::domain::ActivePhasePolicy;
use serde::Deserialize;
use std::fmt::{self, Display};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

pub const CONFIG_PATH_VAR: &str = "GSI_OVERLAY_CONFIG";

const DEFAULT_PORT: u16 = 3002;
const DEFAULT_STALE_AFTER_SECS: u64 = 60;
const DEFAULT_STALE_CHECK_SECS: u64 = 30;
const DEFAULT_INGEST_CAPACITY: usize = 256;
// Full snapshots with every hero's abilities and items run to a few MB.
const DEFAULT_BODY_LIMIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub active_phases: ActivePhasePolicy,
    pub stale_after: Duration,
    pub stale_check_interval: Duration,
    pub ingest_capacity: usize,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            active_phases: ActivePhasePolicy::default(),
            stale_after: Duration::from_secs(DEFAULT_STALE_AFTER_SECS),
            stale_check_interval: Duration::from_secs(DEFAULT_STALE_CHECK_SECS),
            ingest_capacity: DEFAULT_INGEST_CAPACITY,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

// Shape of the optional settings file; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    bind_addr: Option<IpAddr>,
    port: Option<u16>,
    active_phases: Option<ActivePhasePolicy>,
    stale_after_secs: Option<u64>,
    stale_check_secs: Option<u64>,
    ingest_capacity: Option<usize>,
    body_limit_bytes: Option<usize>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(path) = lookup(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            settings
                .apply_toml(&text)
                .map_err(|source| ConfigError::Parse { path, source })?;
        }

        settings.apply_env(&lookup);
        settings.clamp();
        Ok(settings)
    }

    fn apply_toml(&mut self, text: &str) -> Result<(), toml::de::Error> {
        let file: FileSettings = toml::from_str(text)?;

        if let Some(bind_addr) = file.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(active_phases) = file.active_phases {
            self.active_phases = active_phases;
        }
        if let Some(secs) = file.stale_after_secs {
            self.stale_after = Duration::from_secs(secs);
        }
        if let Some(secs) = file.stale_check_secs {
            self.stale_check_interval = Duration::from_secs(secs);
        }
        if let Some(capacity) = file.ingest_capacity {
            self.ingest_capacity = capacity;
        }
        if let Some(limit) = file.body_limit_bytes {
            self.body_limit_bytes = limit;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.bind_addr = env_value(lookup, "GSI_OVERLAY_BIND", self.bind_addr);
        self.port = env_value(lookup, "GSI_OVERLAY_PORT", self.port);
        self.active_phases = env_value(lookup, "GSI_ACTIVE_PHASES", self.active_phases);
        self.stale_after = Duration::from_secs(env_value(
            lookup,
            "GSI_STALE_AFTER_SECS",
            self.stale_after.as_secs(),
        ));
        self.stale_check_interval = Duration::from_secs(env_value(
            lookup,
            "GSI_STALE_CHECK_SECS",
            self.stale_check_interval.as_secs(),
        ));
        self.ingest_capacity = env_value(lookup, "GSI_INGEST_CAPACITY", self.ingest_capacity);
        self.body_limit_bytes = env_value(lookup, "GSI_BODY_LIMIT_BYTES", self.body_limit_bytes);
    }

    // Channel capacity and timer periods must be non-zero.
    fn clamp(&mut self) {
        self.ingest_capacity = self.ingest_capacity.max(1);
        self.stale_check_interval = self.stale_check_interval.max(Duration::from_secs(1));
    }
}

fn env_value<F, T>(lookup: &F, key: &str, current: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return current;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(key, value = %raw, %error, "ignoring invalid setting");
            current
        }
    }
}
