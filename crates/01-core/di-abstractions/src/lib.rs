//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件定义、注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentDefinition`] - 组件定义及其注入点
//! - [`TypeCatalog`] - 组件类型目录，替代运行时反射
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`ComponentResolver`] - 依赖解析器接口
//! - [`DiContainer`] - 容器接口

pub mod catalog;
pub mod container;
pub mod definition;
pub mod registry;
pub mod resolver;

pub use catalog::*;
pub use container::*;
pub use definition::*;
pub use registry::*;
pub use resolver::*;
