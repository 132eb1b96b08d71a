//! 装配来源实现

use async_trait::async_trait;
use config_abstractions::{WiringDocument, WiringFormat, WiringSource};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use wirebox_common::ConfigError;

/// 按格式解析装配文档
pub fn parse_document(format: WiringFormat, content: &str) -> Result<WiringDocument, ConfigError> {
    match format {
        WiringFormat::Toml => toml::from_str(content).map_err(ConfigError::parse),
        WiringFormat::Json => serde_json::from_str(content).map_err(ConfigError::parse),
        WiringFormat::Yaml => serde_yaml::from_str(content).map_err(ConfigError::parse),
    }
}

/// 文件装配来源，格式由扩展名决定
#[derive(Debug, Clone)]
pub struct FileWiringSource {
    file_path: PathBuf,
    format: WiringFormat,
    name: String,
}

impl FileWiringSource {
    /// 创建文件装配来源
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file_path = path.as_ref().to_path_buf();
        let format = WiringFormat::from_path(&file_path)?;
        Ok(Self {
            name: file_path.display().to_string(),
            file_path,
            format,
        })
    }

    /// 文件路径
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 文件格式
    pub fn format(&self) -> WiringFormat {
        self.format
    }
}

#[async_trait]
impl WiringSource for FileWiringSource {
    async fn load(&self) -> Result<WiringDocument, ConfigError> {
        debug!("加载装配文件: {}", self.file_path.display());

        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ConfigError::FileNotFound {
                    path: self.file_path.display().to_string(),
                },
                _ => ConfigError::FileReadError { source: e },
            })?;

        let document = parse_document(self.format, &content)?;
        debug!("装配文件加载完成: {} 个组件", document.components.len());
        Ok(document)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 内联装配来源，测试和程序内嵌配置使用
#[derive(Debug, Clone)]
pub struct InlineWiringSource {
    name: String,
    format: WiringFormat,
    content: String,
}

impl InlineWiringSource {
    /// 创建内联装配来源
    pub fn new(name: impl Into<String>, format: WiringFormat, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format,
            content: content.into(),
        }
    }

    /// TOML 内联来源
    pub fn toml(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(name, WiringFormat::Toml, content)
    }
}

#[async_trait]
impl WiringSource for InlineWiringSource {
    async fn load(&self) -> Result<WiringDocument, ConfigError> {
        parse_document(self.format, &self.content)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
