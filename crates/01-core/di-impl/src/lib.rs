//! # 依赖注入具体实现
//!
//! 提供具体的依赖注入容器和容器构建器实现

mod builder;
mod container;
mod registry;
mod state;

pub use builder::ContainerBuilder;
pub use container::Container;
