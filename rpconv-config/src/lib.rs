use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rpconv_core::TARGET_FORMAT_VERSION;
use serde::Deserialize;
use thiserror::Error;

/// 转换器配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：寻找 `./config/default.toml`，若文件缺失则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 输入、输出与临时解包目录。相对路径以当前工作目录为基准。
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "PathsConfig::default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "PathsConfig::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "PathsConfig::default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl PathsConfig {
    fn default_input_dir() -> PathBuf {
        PathBuf::from("import")
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("export")
    }

    fn default_scratch_dir() -> PathBuf {
        PathBuf::from("temp_pack")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: Self::default_input_dir(),
            output_dir: Self::default_output_dir(),
            scratch_dir: Self::default_scratch_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionConfig {
    #[serde(default = "ConversionConfig::default_target_version")]
    pub target_version: String,
    #[serde(default = "ConversionConfig::default_archive_extension")]
    pub archive_extension: String,
    #[serde(default = "ConversionConfig::default_output_suffix")]
    pub output_suffix: String,
}

impl ConversionConfig {
    fn default_target_version() -> String {
        TARGET_FORMAT_VERSION.to_string()
    }

    fn default_archive_extension() -> String {
        "zip".to_string()
    }

    fn default_output_suffix() -> String {
        "_converted".to_string()
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            target_version: Self::default_target_version(),
            archive_extension: Self::default_archive_extension(),
            output_suffix: Self::default_output_suffix(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
