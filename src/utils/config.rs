use crate::core::{Bandwidth, ConfigurationProfile};
use crate::validation::ValidationError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reading or writing the saved profile
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file I/O error
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A line could not be interpreted
    #[error("{path}:{line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },
}

/// Durable home of the last successfully applied profile
pub trait ProfileStore {
    /// Load the saved profile, or defaults when nothing was saved yet
    fn load(&self) -> Result<ConfigurationProfile, ConfigError>;

    /// Replace the saved profile
    fn save(&mut self, profile: &ConfigurationProfile) -> Result<(), ConfigError>;

    /// Where the profile lives, for messages
    fn location(&self) -> String;
}

/// Flat `key=value` text file, one field per line.
///
/// ```text
/// # SA818 last applied configuration
/// bandwidth=0
/// tx_frequency=150.0000
/// rx_frequency=150.0000
/// tx_sub_audio=0000
/// rx_sub_audio=0000
/// squelch=8
/// scan_frequency=150.0000
/// volume=8
/// filter=0,0,0
/// ```
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `~/.sa818` when a home directory is known, else `./.sa818`
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sa818")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render a profile in the on-disk format
    pub fn render(profile: &ConfigurationProfile) -> String {
        let mut out = String::from("# SA818 last applied configuration\n");
        let fields = [
            ("bandwidth", profile.bandwidth.flag().to_string()),
            ("tx_frequency", profile.tx_frequency.to_string()),
            ("rx_frequency", profile.rx_frequency.to_string()),
            ("tx_sub_audio", profile.tx_sub_audio.to_string()),
            ("rx_sub_audio", profile.rx_sub_audio.to_string()),
            ("squelch", profile.squelch.to_string()),
            ("scan_frequency", profile.scan_frequency.to_string()),
            ("volume", profile.volume.to_string()),
            ("filter", profile.filter.to_string()),
        ];
        for (key, value) in fields {
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        out
    }

    /// Parse the on-disk format; missing keys keep their defaults
    pub fn parse(&self, content: &str) -> Result<ConfigurationProfile, ConfigError> {
        let mut profile = ConfigurationProfile::default();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parse_error = |reason: String| ConfigError::Parse {
                path: self.path.display().to_string(),
                line: index + 1,
                reason,
            };

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_error(format!("expected key=value, got '{}'", line)))?;
            let (key, value) = (key.trim(), value.trim());

            let known = apply_field(&mut profile, key, value)
                .map_err(|e| parse_error(e.to_string()))?;
            if !known {
                warn!("ignoring unknown key '{}' in {}", key, self.path.display());
            }
        }

        Ok(profile)
    }
}

/// Set one field from its textual value; `false` for an unknown key
fn apply_field(
    profile: &mut ConfigurationProfile,
    key: &str,
    value: &str,
) -> Result<bool, ValidationError> {
    match key {
        "bandwidth" => profile.bandwidth = value.parse::<Bandwidth>()?,
        "tx_frequency" => profile.tx_frequency = value.parse()?,
        "rx_frequency" => profile.rx_frequency = value.parse()?,
        "tx_sub_audio" => profile.tx_sub_audio = value.parse()?,
        "rx_sub_audio" => profile.rx_sub_audio = value.parse()?,
        "squelch" => profile.squelch = parse_small("squelch", value)?,
        "scan_frequency" => profile.scan_frequency = value.parse()?,
        "volume" => profile.volume = parse_small("volume", value)?,
        "filter" => profile.filter = value.parse()?,
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_small(field: &'static str, value: &str) -> Result<u8, ValidationError> {
    value.parse().map_err(|_| ValidationError::Malformed {
        field,
        value: value.to_string(),
        reason: "expected a small integer".to_string(),
    })
}

impl ProfileStore for FileProfileStore {
    fn load(&self) -> Result<ConfigurationProfile, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no saved profile at {}, using defaults", self.path.display());
                return Ok(ConfigurationProfile::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        self.parse(&content)
    }

    fn save(&mut self, profile: &ConfigurationProfile) -> Result<(), ConfigError> {
        let io_error = |source: io::Error| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        };

        // Write beside the target and rename so a crash never leaves a
        // truncated file behind.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, Self::render(profile)).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)?;

        debug!("wrote profile to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
