//! # Configuration Implementation
//!
//! 配置实现层：TOML / JSON / YAML 装配文档读取、装配文档到组件定义的转换，
//! 以及基于 `config` crate 的应用设置加载。

pub mod loader;
pub mod providers;
pub mod settings;

pub use loader::*;
pub use providers::*;
pub use settings::*;
