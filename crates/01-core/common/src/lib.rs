//! # Wirebox Common
//!
//! 这个 crate 提供了 Wirebox 各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] / [`ConfigError`] / [`ApplicationError`] - 错误类型
//! - [`ComponentId`] / [`TypeInfo`] / [`Capability`] - 组件标识与类型元数据
//! - [`Scope`] / [`InstanceState`] / [`ContainerPhase`] - 生命周期状态
//! - [`NamingConvention`] - 组件扫描命名约定
//! - [`OutputSink`] - 叶子组件使用的输出能力

pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod output;

pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use output::*;
