//! 装配来源抽象接口

use crate::wiring::WiringDocument;
use async_trait::async_trait;
use std::path::Path;
use wirebox_common::ConfigError;

/// 装配文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringFormat {
    /// TOML
    Toml,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

impl WiringFormat {
    /// 按文件扩展名判断格式
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// 装配来源 trait
///
/// 定义从不同来源读取装配文档的统一接口
#[async_trait]
pub trait WiringSource: Send + Sync {
    /// 读取装配文档
    async fn load(&self) -> Result<WiringDocument, ConfigError>;

    /// 来源名称，用于日志
    fn name(&self) -> &str;
}
