use crate::bio::chunk::DEFAULT_CHUNK_SIZE;
use crate::bio::fasta::DEFAULT_MAX_SEQUENCE_LENGTH;
use crate::remote::DEFAULT_ENDPOINT;
use crate::BlastScanError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sequence: SequenceConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// Residues beyond this are dropped after loading
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    /// Residues per remote job
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Status requests allowed per job before giving up
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    /// Consecutive unrecognised status answers allowed per job
    #[serde(default = "default_max_indeterminate")]
    pub max_indeterminate: u32,
    #[serde(default = "default_indeterminate_backoff_ms")]
    pub indeterminate_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f32,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives blast_results_<timestamp>.txt
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Residues per output row
    #[serde(default = "default_display_width")]
    pub display_width: usize,
}

// Default value functions
fn default_max_sequence_length() -> usize { DEFAULT_MAX_SEQUENCE_LENGTH }
fn default_chunk_size() -> usize { DEFAULT_CHUNK_SIZE }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_database() -> String { "nt".to_string() }
fn default_program() -> String { "blastn".to_string() }
fn default_user_agent() -> String { format!("blastscan/{}", env!("CARGO_PKG_VERSION")) }
fn default_interval_secs() -> u64 { 5 }
fn default_max_polls() -> u32 { 720 }
fn default_max_indeterminate() -> u32 { 10 }
fn default_indeterminate_backoff_ms() -> u64 { 500 }
fn default_backoff_multiplier() -> f32 { 2.0 }
fn default_max_backoff_secs() -> u64 { 30 }
fn default_directory() -> PathBuf { PathBuf::from(".") }
fn default_display_width() -> usize { 20 }

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            max_sequence_length: default_max_sequence_length(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            database: default_database(),
            program: default_program(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_polls: default_max_polls(),
            max_indeterminate: default_max_indeterminate(),
            indeterminate_backoff_ms: default_indeterminate_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            display_width: default_display_width(),
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), BlastScanError> {
        if self.sequence.chunk_size == 0 {
            return Err(BlastScanError::Config("sequence.chunk_size must be positive".to_string()));
        }
        if self.output.display_width == 0 {
            return Err(BlastScanError::Config("output.display_width must be positive".to_string()));
        }
        if self.polling.max_polls == 0 {
            return Err(BlastScanError::Config("polling.max_polls must be positive".to_string()));
        }
        if self.polling.max_indeterminate == 0 {
            return Err(BlastScanError::Config(
                "polling.max_indeterminate must be positive".to_string(),
            ));
        }

        let endpoint = Url::parse(&self.remote.endpoint).map_err(|e| {
            BlastScanError::Config(format!("Invalid endpoint {}: {}", self.remote.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(BlastScanError::Config(format!(
                "Endpoint must be http or https, got {}",
                endpoint.scheme()
            )));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, BlastScanError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BlastScanError::Config(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| BlastScanError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), BlastScanError> {
    let contents = to_toml(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn to_toml(config: &Config) -> Result<String, BlastScanError> {
    toml::to_string_pretty(config)
        .map_err(|e| BlastScanError::Config(format!("Failed to serialize config: {}", e)))
}
