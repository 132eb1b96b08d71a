//! # 应用上下文组合层
//!
//! 这个 crate 负责把设置、类型目录、装配文档和程序注册的组件组合成一个
//! 可运行的应用上下文。
//!
//! ## 主要功能
//!
//! - **上下文构建器**: 使用构建者模式组装设置、日志、装配来源和容器
//! - **应用上下文**: 类型化的解析入口，运行结束后总是关闭容器
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use wirebox_composition::ApplicationContextBuilder;
//! use di_abstractions::TypeCatalog;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ApplicationContextBuilder::new()
//!         .with_catalog(TypeCatalog::new())
//!         .add_wiring_file("wiring/soundsystem.toml")?
//!         .build()
//!         .await?;
//!
//!     context.close().await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;

pub use builder::{ApplicationContextBuilder, LoggingConfig, OUTPUT_SINK_ID};
pub use context::ApplicationContext;
