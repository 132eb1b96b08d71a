//! 应用设置模型

use di_abstractions::ContainerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use wirebox_common::LineEnding;

/// 应用设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 日志设置
    pub logging: LoggingSettings,
    /// 容器设置
    pub container: ContainerConfig,
    /// 输出设置
    pub output: OutputSettings,
    /// 装配文件
    pub wiring: WiringSettings,
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志级别或 env-filter 指令
    pub level: String,
    /// 是否输出 JSON
    pub json: bool,
    /// 是否输出 target
    pub target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            target: false,
        }
    }
}

/// 输出设置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// 行结束符
    pub line_ending: LineEnding,
}

/// 装配文件设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringSettings {
    /// 装配文件路径，按顺序加载
    pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.output.line_ending, LineEnding::Lf);
        assert_eq!(settings.container.max_resolution_depth, 100);
        assert!(settings.wiring.files.is_empty());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"output": {"line_ending": "crlf"}, "logging": {"json": true}}"#).unwrap();
        assert_eq!(settings.output.line_ending, LineEnding::CrLf);
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
    }
}
