use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Narration language code (ISO 639-1)
    pub language: String,

    /// Speech synthesis config
    pub synthesis: SynthesisConfig,

    /// Speech recognition config
    pub transcription: TranscriptionConfig,

    /// Pipeline tuning config
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis engine type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisEngine {
    // @engine: Piper (local TTS process)
    #[default]
    Piper,
    // @engine: OpenAI-compatible speech API
    OpenAI,
}

impl SynthesisEngine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Piper => "Piper",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Piper => "piper".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

// Implement Display trait for SynthesisEngine
impl std::fmt::Display for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SynthesisEngine
impl std::str::FromStr for SynthesisEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "piper" => Ok(Self::Piper),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid synthesis engine type: {}", s)),
        }
    }
}

/// Speech recognition engine type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionEngine {
    // @engine: whisper.cpp CLI (local process)
    #[default]
    WhisperCli,
    // @engine: OpenAI-compatible transcription API
    OpenAI,
}

impl TranscriptionEngine {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::WhisperCli => "whisper.cpp",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::WhisperCli => "whispercli".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

// Implement Display trait for TranscriptionEngine
impl std::fmt::Display for TranscriptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranscriptionEngine
impl std::str::FromStr for TranscriptionEngine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "whispercli" | "whisper-cli" => Ok(Self::WhisperCli),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid transcription engine type: {}", s)),
        }
    }
}

/// Engine configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: String,

    // @field: Binary name or path for local engines
    #[serde(default = "String::new")]
    pub binary: String,

    // @field: Model name or model file path
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Voice or speaker identifier
    #[serde(default = "String::new")]
    pub voice: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per engine call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EngineConfig {
    // @param engine_type: Synthesis engine enum
    // @returns: Engine config with defaults
    pub fn for_synthesis(engine_type: SynthesisEngine) -> Self {
        match engine_type {
            SynthesisEngine::Piper => Self {
                engine_type: "piper".to_string(),
                binary: default_piper_binary(),
                model: default_piper_model(),
                voice: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
            SynthesisEngine::OpenAI => Self {
                engine_type: "openai".to_string(),
                binary: String::new(),
                model: default_openai_speech_model(),
                voice: default_openai_voice(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    // @param engine_type: Transcription engine enum
    // @returns: Engine config with defaults
    pub fn for_transcription(engine_type: TranscriptionEngine) -> Self {
        match engine_type {
            TranscriptionEngine::WhisperCli => Self {
                engine_type: "whispercli".to_string(),
                binary: default_whisper_binary(),
                model: default_whisper_model(),
                voice: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
            },
            TranscriptionEngine::OpenAI => Self {
                engine_type: "openai".to_string(),
                binary: String::new(),
                model: default_openai_transcription_model(),
                voice: String::new(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Synthesis engine to use
    #[serde(default)]
    pub engine: SynthesisEngine,

    /// Available synthesis engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,
}

impl SynthesisConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        let engine_str = self.engine.to_lowercase_string();
        self.available_engines
            .iter()
            .find(|e| e.engine_type == engine_str)
    }

    /// Get the binary for the active engine
    pub fn get_binary(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.binary.is_empty() {
                return engine_config.binary.clone();
            }
        }

        match self.engine {
            SynthesisEngine::Piper => default_piper_binary(),
            SynthesisEngine::OpenAI => String::new(),
        }
    }

    /// Get the model for the active engine
    pub fn get_model(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.model.is_empty() {
                return engine_config.model.clone();
            }
        }

        match self.engine {
            SynthesisEngine::Piper => default_piper_model(),
            SynthesisEngine::OpenAI => default_openai_speech_model(),
        }
    }

    /// Get the voice for the active engine
    pub fn get_voice(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.voice.is_empty() {
                return engine_config.voice.clone();
            }
        }

        match self.engine {
            SynthesisEngine::Piper => String::new(),
            SynthesisEngine::OpenAI => default_openai_voice(),
        }
    }

    /// Get the API key for the active engine
    pub fn get_api_key(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.api_key.is_empty() {
                return engine_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active engine
    pub fn get_endpoint(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.endpoint.is_empty() {
                return engine_config.endpoint.clone();
            }
        }

        match self.engine {
            SynthesisEngine::Piper => String::new(),
            SynthesisEngine::OpenAI => default_openai_endpoint(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            engine: SynthesisEngine::default(),
            available_engines: vec![
                EngineConfig::for_synthesis(SynthesisEngine::Piper),
                EngineConfig::for_synthesis(SynthesisEngine::OpenAI),
            ],
        }
    }
}

/// Speech recognition configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// Transcription engine to use
    #[serde(default)]
    pub engine: TranscriptionEngine,

    /// Available transcription engines
    #[serde(default)]
    pub available_engines: Vec<EngineConfig>,
}

impl TranscriptionConfig {
    /// Get the active engine configuration from the available_engines array
    pub fn get_active_engine_config(&self) -> Option<&EngineConfig> {
        let engine_str = self.engine.to_lowercase_string();
        self.available_engines
            .iter()
            .find(|e| e.engine_type == engine_str)
    }

    /// Get the binary for the active engine
    pub fn get_binary(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.binary.is_empty() {
                return engine_config.binary.clone();
            }
        }

        match self.engine {
            TranscriptionEngine::WhisperCli => default_whisper_binary(),
            TranscriptionEngine::OpenAI => String::new(),
        }
    }

    /// Get the model for the active engine
    pub fn get_model(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.model.is_empty() {
                return engine_config.model.clone();
            }
        }

        match self.engine {
            TranscriptionEngine::WhisperCli => default_whisper_model(),
            TranscriptionEngine::OpenAI => default_openai_transcription_model(),
        }
    }

    /// Get the API key for the active engine
    pub fn get_api_key(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.api_key.is_empty() {
                return engine_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active engine
    pub fn get_endpoint(&self) -> String {
        if let Some(engine_config) = self.get_active_engine_config() {
            if !engine_config.endpoint.is_empty() {
                return engine_config.endpoint.clone();
            }
        }

        match self.engine {
            TranscriptionEngine::WhisperCli => String::new(),
            TranscriptionEngine::OpenAI => default_openai_endpoint(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            engine: TranscriptionEngine::default(),
            available_engines: vec![
                EngineConfig::for_transcription(TranscriptionEngine::WhisperCli),
                EngineConfig::for_transcription(TranscriptionEngine::OpenAI),
            ],
        }
    }
}

/// Pipeline tuning knobs applicable to all engines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Maximum characters per synthesis chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Maximum synthesis attempts per chunk
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum transcript similarity for a chunk to be accepted
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Base backoff between attempts in milliseconds, doubled per retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            max_attempts: default_max_attempts(),
            similarity_threshold: default_similarity_threshold(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_max_chunk_chars() -> usize {
    250
}

fn default_max_attempts() -> u32 {
    3 // Default to 3 attempts per chunk
}

fn default_similarity_threshold() -> f32 {
    0.85
}

fn default_retry_backoff_ms() -> u64 {
    500 // 500ms base backoff, doubled on each retry
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_piper_binary() -> String {
    "piper".to_string()
}

fn default_piper_model() -> String {
    "en_US-lessac-medium.onnx".to_string()
}

fn default_whisper_binary() -> String {
    "whisper-cli".to_string()
}

fn default_whisper_model() -> String {
    "ggml-base.en.bin".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_speech_model() -> String {
    "tts-1".to_string()
}

fn default_openai_voice() -> String {
    "alloy".to_string()
}

fn default_openai_transcription_model() -> String {
    "whisper-1".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate narration language
        isolang::Language::from_639_1(&self.language)
            .ok_or_else(|| anyhow!("Invalid narration language code: {}", self.language))?;

        // Validate pipeline knobs
        if self.pipeline.max_attempts == 0 {
            return Err(anyhow!("Pipeline max_attempts must be at least 1"));
        }
        if self.pipeline.max_chunk_chars < 50 {
            return Err(anyhow!(
                "Pipeline max_chunk_chars must be at least 50, got {}",
                self.pipeline.max_chunk_chars
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.similarity_threshold) {
            return Err(anyhow!(
                "Pipeline similarity_threshold must be within [0, 1], got {}",
                self.pipeline.similarity_threshold
            ));
        }

        // Validate API key and endpoint for hosted engines
        if self.synthesis.engine == SynthesisEngine::OpenAI {
            if self.synthesis.get_api_key().is_empty() {
                return Err(anyhow!("Synthesis API key is required for OpenAI engine"));
            }
            validate_endpoint(&self.synthesis.get_endpoint())?;
        }
        if self.transcription.engine == TranscriptionEngine::OpenAI {
            if self.transcription.get_api_key().is_empty() {
                return Err(anyhow!(
                    "Transcription API key is required for OpenAI engine"
                ));
            }
            validate_endpoint(&self.transcription.get_endpoint())?;
        }

        Ok(())
    }
}

/// Check that an engine endpoint parses as an HTTP(S) URL
fn validate_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = url::Url::parse(endpoint)
        .map_err(|e| anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!(
            "Endpoint must use http or https, got: {}",
            endpoint
        ));
    }

    Ok(())
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: "en".to_string(),
            synthesis: SynthesisConfig::default(),
            transcription: TranscriptionConfig::default(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
