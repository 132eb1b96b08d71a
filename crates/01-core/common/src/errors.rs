//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
///
/// 所有变体只携带字符串信息，因此可以克隆：失败的实例槽位会保存首次失败的错误，
/// 之后每次重试都返回同一个错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("组件标识重复: {id}")]
    DuplicateIdentifier { id: String },

    #[error("组件不存在: {key}")]
    NoSuchComponent { key: String },

    #[error("组件不唯一: {key}, 候选: {candidates:?}")]
    AmbiguousComponent {
        key: String,
        candidates: Vec<String>,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("容器已关闭")]
    ContainerClosed,

    #[error("容器已启动，不再接受注册: {id}")]
    ContainerAlreadyStarted { id: String },

    #[error("组件类型不匹配: {id}, 期望 {expected}")]
    TypeMismatch { id: String, expected: String },

    #[error("组件创建失败: {id}, 原因: {message}")]
    ConstructionFailed { id: String, message: String },

    #[error("注入参数无效: {id}, 位置 {position}, 原因: {message}")]
    InvalidArgument {
        id: String,
        position: String,
        message: String,
    },

    #[error("解析深度超出限制: {depth} > {max_depth}, 解析链: {dependency_chain}")]
    ResolutionDepthExceeded {
        depth: usize,
        max_depth: usize,
        dependency_chain: String,
    },
}

impl DependencyError {
    /// 创建组件不存在错误
    pub fn no_such_component(key: impl Into<String>) -> Self {
        Self::NoSuchComponent { key: key.into() }
    }

    /// 创建组件创建失败错误
    pub fn construction_failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstructionFailed {
            id: id.into(),
            message: message.into(),
        }
    }

    /// 创建注入参数无效错误
    pub fn invalid_argument(
        id: impl Into<String>,
        position: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            id: id.into(),
            position: position.into(),
            message: message.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("不支持的配置格式: {path}")]
    UnsupportedFormat { path: String },

    #[error("未知的组件类型: {type_name} (组件 {id})")]
    UnknownComponentType { id: String, type_name: String },

    #[error("未知的组件属性: {property} (组件 {id})")]
    UnknownProperty { id: String, property: String },

    #[error("未知的能力: {capability} (组件 {id})")]
    UnknownCapability { id: String, capability: String },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 包装解析错误
    pub fn parse(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 应用错误类型
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("应用启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("应用关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
