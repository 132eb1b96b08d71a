//! 应用设置加载
//!
//! 配置文件（可选）加上 `WIREBOX__` 前缀的环境变量覆盖，
//! 例如 `WIREBOX__OUTPUT__LINE_ENDING=crlf`。

use config::{Config, Environment, File};
use config_abstractions::AppSettings;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error};
use wirebox_common::ConfigError;

/// 默认的环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "WIREBOX";

/// 默认配置文件（不带扩展名）
pub const DEFAULT_SETTINGS_FILE: &str = "config/app";

/// 应用设置加载器
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file: Option<PathBuf>,
    env_prefix: String,
    environment: Option<HashMap<String, String>>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            environment: None,
        }
    }
}

impl SettingsLoader {
    /// 创建加载器，默认读取可选的 `config/app.*`
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定配置文件，文件必须存在
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// 设置环境变量前缀
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// 使用给定的变量表代替进程环境变量
    #[must_use]
    pub fn with_environment(mut self, variables: HashMap<String, String>) -> Self {
        self.environment = Some(variables);
        self
    }

    /// 加载设置
    pub fn load(&self) -> Result<AppSettings, ConfigError> {
        let mut builder = Config::builder();

        builder = match &self.file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                debug!("加载设置文件: {}", path.display());
                builder.add_source(File::from(path.as_path()))
            }
            None => builder.add_source(File::with_name(DEFAULT_SETTINGS_FILE).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("wiring.files")
                .source(self.environment.clone()),
        );

        let settings = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppSettings>())
            .map_err(|e| {
                error!("设置加载失败: {}", e);
                ConfigError::parse(e)
            })?;

        debug!("设置加载完成: {:?}", settings);
        Ok(settings)
    }
}
