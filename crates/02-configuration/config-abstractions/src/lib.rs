//! # Configuration Abstractions
//!
//! 配置抽象层：声明式装配文档的数据模型、装配来源接口和应用设置模型。
//!
//! ## 核心接口
//!
//! - [`WiringDocument`] - 装配文档
//! - [`WiringSource`] - 装配来源接口
//! - [`AppSettings`] - 应用设置

pub mod provider;
pub mod settings;
pub mod wiring;

pub use provider::*;
pub use settings::*;
pub use wiring::*;
