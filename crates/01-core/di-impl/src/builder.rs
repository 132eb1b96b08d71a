//! 容器构建器

use crate::container::Container;
use di_abstractions::{ComponentDefinition, ComponentRegistry, ContainerConfig, DiContainer};
use tracing::info;
use wirebox_common::DependencyError;

/// 容器构建器
///
/// 收集定义和配置，`build` 时依次注册、验证、预实例化
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    config: ContainerConfig,
    definitions: Vec<ComponentDefinition>,
}

impl ContainerBuilder {
    /// 创建构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置容器配置
    #[must_use]
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加组件定义
    #[must_use]
    pub fn register(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 添加多个组件定义
    #[must_use]
    pub fn register_all(mut self, definitions: impl IntoIterator<Item = ComponentDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// 构建容器
    pub fn build(self) -> Result<Container, DependencyError> {
        let registration_count = self.definitions.len();
        let container = Container::with_config(self.config.clone());

        for definition in self.definitions {
            container.register(definition)?;
        }
        if self.config.validate_on_build {
            container.validate()?;
        }
        if self.config.eager_singletons {
            container.pre_instantiate_singletons()?;
        }

        info!("构建容器完成，注册了 {} 个组件", registration_count);
        Ok(container)
    }
}
