//! 应用上下文构建器

use crate::context::ApplicationContext;
use config_abstractions::{AppSettings, LoggingSettings, ScanSpec, WiringSource};
use config_impl::{FileWiringSource, SettingsLoader, WiringLoader};
use di_abstractions::{ComponentDefinition, DefinitionBuilder, TypeCatalog};
use di_impl::ContainerBuilder;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wirebox_common::{ApplicationError, Capability, ConsoleSink, OutputSink};

/// 输出组件的标识
pub const OUTPUT_SINK_ID: &str = "console";

/// 应用上下文构建器
///
/// 使用建造者模式组装设置、日志、装配来源和容器
pub struct ApplicationContextBuilder {
    /// 类型目录
    catalog: TypeCatalog,
    /// 装配来源列表
    wiring_sources: Vec<Box<dyn WiringSource>>,
    /// 程序注册的组件定义
    definitions: Vec<ComponentDefinition>,
    /// 代码配置的组件扫描
    scan: Option<ScanSpec>,
    /// 显式设置，优先于设置加载器
    settings: Option<AppSettings>,
    /// 设置加载器
    settings_loader: SettingsLoader,
    /// 自定义输出组件，缺省使用标准输出
    output_sink: Option<ComponentDefinition>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置，缺省取自设置
    logging_config: Option<LoggingConfig>,
}

impl ApplicationContextBuilder {
    /// 创建新的上下文构建器
    pub fn new() -> Self {
        Self {
            catalog: TypeCatalog::new(),
            wiring_sources: Vec::new(),
            definitions: Vec::new(),
            scan: None,
            settings: None,
            settings_loader: SettingsLoader::new(),
            output_sink: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: None,
        }
    }

    /// 设置类型目录
    #[must_use]
    pub fn with_catalog(mut self, catalog: TypeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// 添加装配文件，格式由扩展名决定
    pub fn add_wiring_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ApplicationError> {
        let path = path.as_ref();
        info!("添加装配文件: {}", path.display());
        self.wiring_sources.push(Box::new(FileWiringSource::new(path)?));
        Ok(self)
    }

    /// 添加自定义装配来源
    #[must_use]
    pub fn add_wiring_source<T: WiringSource + 'static>(mut self, source: T) -> Self {
        info!("添加装配来源: {}", source.name());
        self.wiring_sources.push(Box::new(source));
        self
    }

    /// 程序注册组件定义
    #[must_use]
    pub fn register(mut self, definition: ComponentDefinition) -> Self {
        debug!("添加组件定义: {}", definition.id());
        self.definitions.push(definition);
        self
    }

    /// 启用组件扫描
    #[must_use]
    pub fn enable_component_scan(mut self, scan: ScanSpec) -> Self {
        info!("启用组件扫描");
        self.scan = Some(scan);
        self
    }

    /// 使用显式设置，不再读取配置文件和环境变量
    #[must_use]
    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 使用自定义设置加载器
    #[must_use]
    pub fn with_settings_loader(mut self, loader: SettingsLoader) -> Self {
        self.settings_loader = loader;
        self
    }

    /// 使用自定义输出组件，例如测试中的缓冲输出
    #[must_use]
    pub fn with_output_sink<S: OutputSink + 'static>(mut self, sink: Arc<S>) -> Self {
        self.output_sink = Some(Self::sink_definition(sink));
        self
    }

    /// 配置日志
    #[must_use]
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 按设置中的日志配置初始化日志
    #[must_use]
    pub fn with_logging_from_settings(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    /// 构建应用上下文
    pub async fn build(self) -> Result<ApplicationContext, ApplicationError> {
        let settings = match self.settings {
            Some(settings) => settings,
            None => self.settings_loader.load()?,
        };

        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            let config = self
                .logging_config
                .unwrap_or_else(|| LoggingConfig::from(&settings.logging));
            initialize_logging(&config)?;
        }

        info!("开始构建应用上下文");

        let mut sources = Vec::with_capacity(settings.wiring.files.len() + self.wiring_sources.len());
        for path in &settings.wiring.files {
            sources.push(Box::new(FileWiringSource::new(path)?) as Box<dyn WiringSource>);
        }
        sources.extend(self.wiring_sources);

        let mut document = WiringLoader::read_sources(&sources).await?;
        if let Some(scan) = self.scan {
            document.scan = Some(scan);
        }

        let mut catalog = self.catalog;
        catalog.register_capability(Capability::of::<dyn OutputSink>());
        let wired = WiringLoader::new(Arc::new(catalog)).load(&document)?;

        let output_sink = self.output_sink.unwrap_or_else(|| {
            Self::sink_definition(Arc::new(ConsoleSink::new(settings.output.line_ending)))
        });

        let container = ContainerBuilder::new()
            .with_config(settings.container.clone())
            .register(output_sink)
            .register_all(self.definitions)
            .register_all(wired)
            .build()?;

        info!("应用上下文构建完成");
        Ok(ApplicationContext::new(Arc::new(container), settings))
    }

    fn sink_definition<S: OutputSink + 'static>(sink: Arc<S>) -> ComponentDefinition {
        DefinitionBuilder::from_instance(OUTPUT_SINK_ID, sink)
            .provides::<dyn OutputSink>(|sink| sink as Arc<dyn OutputSink>)
            .description("输出组件")
            .build()
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 初始化日志系统
fn initialize_logging(config: &LoggingConfig) -> Result<(), ApplicationError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| ApplicationError::BootstrapFailed {
        message: format!("日志过滤器无效: {}", e),
    })?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| ApplicationError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// 日志级别或 env-filter 指令
    pub filter: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            filter: settings.level.clone(),
            show_target: settings.target,
            json_format: settings.json,
            ..Self::default()
        }
    }
}
