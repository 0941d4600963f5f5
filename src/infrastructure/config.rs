use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
    InvalidChunking(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
            ConfigError::InvalidChunking(msg) => write!(f, "Invalid chunking settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub service_url: String,
    pub model_name: String,
    pub dimension: usize,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct LanguageModelSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct VisionSettings {
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub command: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub index_path: PathBuf,
    pub temp_docs_path: PathBuf,
    pub documents_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_k: usize,
    pub max_upload_bytes: usize,
    pub max_chat_sessions: usize,
    pub provider_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub embedding: EmbeddingSettings,
    pub language_model: LanguageModelSettings,
    pub vision: VisionSettings,
    pub search: SearchSettings,
    pub ocr: OcrSettings,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up
    /// a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            server_port: parse(&lookup, "SERVER_PORT", 3000)?,
            index_path: PathBuf::from(text("INDEX_PATH", "vector_index")),
            temp_docs_path: PathBuf::from(text("TEMP_DOCS_PATH", "temp_docs")),
            documents_path: PathBuf::from(text("DOCUMENTS_PATH", "documents")),
            chunk_size: parse(&lookup, "CHUNK_SIZE", 1000)?,
            chunk_overlap: parse(&lookup, "CHUNK_OVERLAP", 200)?,
            retrieval_k: parse(&lookup, "RETRIEVAL_K", 3)?,
            max_upload_bytes: parse(&lookup, "MAX_UPLOAD_BYTES", 250 * 1024 * 1024)?,
            max_chat_sessions: parse(&lookup, "MAX_CHAT_SESSIONS", 1000)?,
            provider_timeout_secs: parse(&lookup, "PROVIDER_TIMEOUT_SECS", 60)?,
            provider_max_retries: parse(&lookup, "PROVIDER_MAX_RETRIES", 0)?,
            embedding: EmbeddingSettings {
                service_url: text("EMBEDDINGS_SERVICE_URL", "http://localhost:8000/embed"),
                model_name: text("EMBEDDING_MODEL", "all-MiniLM-L6-v2"),
                dimension: parse(&lookup, "EMBEDDING_DIMENSION", 384)?,
                max_retries: parse(&lookup, "EMBEDDING_MAX_RETRIES", 3)?,
                backoff_factor: parse(&lookup, "EMBEDDING_BACKOFF_FACTOR", 1.5)?,
            },
            language_model: LanguageModelSettings {
                base_url: text("LLM_BASE_URL", "https://api.groq.com/openai/v1"),
                api_key: secret("GROQ_API_KEY"),
                model: text("LLM_MODEL", "llama-3.1-8b-instant"),
                temperature: parse(&lookup, "LLM_TEMPERATURE", 0.7)?,
            },
            vision: VisionSettings {
                api_key: secret("GOOGLE_API_KEY"),
                model: text("VISION_MODEL", "gemini-1.5-flash-latest"),
            },
            search: SearchSettings {
                api_key: secret("TAVILY_API_KEY"),
                max_results: parse(&lookup, "SEARCH_MAX_RESULTS", 5)?,
            },
            ocr: OcrSettings {
                command: text("TESSERACT_CMD", "tesseract"),
                language: text("OCR_LANGUAGE", "eng"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunking(
                "CHUNK_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.retrieval_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RETRIEVAL_K".to_string(),
                value: "0".to_string(),
            });
        }
        if self.max_chat_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                key: "MAX_CHAT_SESSIONS".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
    }
}
