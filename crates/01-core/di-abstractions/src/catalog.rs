//! 组件类型目录
//!
//! Rust 没有运行时反射，配置文件里的类型名需要事先登记到 [`TypeCatalog`]。
//! 每个 [`ComponentType`] 记录一个具体类型的构造方式、默认构造参数、可注入的属性
//! 以及它满足的能力，代码配置、配置文件装配和组件扫描都从这里生成组件定义。

use crate::definition::{
    Arguments, ComponentDefinition, DefinitionBuilder, DependencyReference, Injection,
    SetterInjection,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use wirebox_common::{Capability, ComponentId, DependencyError, NamingConvention, Scope};

/// 可注入属性
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// setter 注入点（带默认引用）
    pub setter: SetterInjection,
    /// 是否默认注入（相当于在 setter 上声明自动装配）
    pub autowired: bool,
}

/// 组件类型
#[derive(Debug, Clone)]
pub struct ComponentType {
    name: String,
    template: ComponentDefinition,
    properties: Vec<PropertyDescriptor>,
    scannable: bool,
}

impl ComponentType {
    /// 创建类型构建器
    pub fn builder<T, F>(name: impl Into<String>, constructor: F) -> ComponentTypeBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, DependencyError> + Send + Sync + 'static,
    {
        let name = name.into();
        ComponentTypeBuilder {
            definition: DefinitionBuilder::new(name.clone(), constructor),
            name,
            properties: Vec::new(),
            scannable: false,
        }
    }

    /// 目录中的类型名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 是否参与组件扫描
    pub fn is_scannable(&self) -> bool {
        self.scannable
    }

    /// 按名称查找属性
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|descriptor| descriptor.setter.property() == name)
    }

    /// 生成组件定义：默认构造参数加上所有自动装配属性
    pub fn definition(&self, id: impl Into<ComponentId>) -> ComponentDefinition {
        self.properties
            .iter()
            .filter(|descriptor| descriptor.autowired)
            .fold(self.template.clone().with_id(id), |definition, descriptor| {
                definition.with_setter(descriptor.setter.clone())
            })
    }
}

/// 类型化的组件类型构建器
pub struct ComponentTypeBuilder<T> {
    name: String,
    definition: DefinitionBuilder<T>,
    properties: Vec<PropertyDescriptor>,
    scannable: bool,
}

impl<T> ComponentTypeBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// 追加默认构造参数引用
    #[must_use]
    pub fn arg(mut self, reference: DependencyReference) -> Self {
        self.definition = self.definition.arg(reference);
        self
    }

    /// 声明可注入属性，只有在装配中显式引用时才注入
    #[must_use]
    pub fn property<F>(self, name: impl Into<String>, default: DependencyReference, apply: F) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        self.push_property(name, default, true, false, apply)
    }

    /// 声明自动装配属性，每个定义默认注入
    #[must_use]
    pub fn autowired_property<F>(
        self,
        name: impl Into<String>,
        default: DependencyReference,
        apply: F,
    ) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        self.push_property(name, default, true, true, apply)
    }

    /// 声明可选的自动装配属性，没有候选时跳过
    #[must_use]
    pub fn optional_property<F>(
        self,
        name: impl Into<String>,
        default: DependencyReference,
        apply: F,
    ) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        self.push_property(name, default, false, true, apply)
    }

    /// 声明满足能力 `I`
    #[must_use]
    pub fn provides<I>(mut self, upcast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.definition = self.definition.provides(upcast);
        self
    }

    /// 默认作用域
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.definition = self.definition.scope(scope);
        self
    }

    /// 参与组件扫描
    #[must_use]
    pub fn scannable(mut self) -> Self {
        self.scannable = true;
        self
    }

    /// 构建组件类型
    pub fn build(self) -> ComponentType {
        ComponentType {
            name: self.name,
            template: self.definition.build(),
            properties: self.properties,
            scannable: self.scannable,
        }
    }

    fn push_property<F>(
        mut self,
        name: impl Into<String>,
        default: DependencyReference,
        required: bool,
        autowired: bool,
        apply: F,
    ) -> Self
    where
        F: Fn(&T, &Injection<'_>) -> Result<(), DependencyError> + Send + Sync + 'static,
    {
        let setter = DefinitionBuilder::<T>::setter_injection(name, default, required, apply);
        self.properties
            .retain(|descriptor| descriptor.setter.property() != setter.property());
        self.properties.push(PropertyDescriptor { setter, autowired });
        self
    }
}

/// 组件类型目录
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    types: Vec<ComponentType>,
    index: HashMap<String, usize>,
    capabilities: HashMap<String, Capability>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记组件类型，同名类型会报 `DuplicateIdentifier`
    pub fn register(&mut self, component_type: ComponentType) -> Result<(), DependencyError> {
        if self.index.contains_key(component_type.name()) {
            return Err(DependencyError::DuplicateIdentifier {
                id: component_type.name().to_string(),
            });
        }

        debug!("登记组件类型: {}", component_type.name());
        for capability in component_type.template.capabilities() {
            self.capabilities
                .entry(capability.name.clone())
                .or_insert_with(|| capability.clone());
        }
        self.index
            .insert(component_type.name().to_string(), self.types.len());
        self.types.push(component_type);
        Ok(())
    }

    /// 登记没有目录类型提供、由程序直接注册的组件满足的能力
    pub fn register_capability(&mut self, capability: Capability) {
        self.capabilities
            .entry(capability.name.clone())
            .or_insert(capability);
    }

    /// 链式登记
    pub fn with(mut self, component_type: ComponentType) -> Result<Self, DependencyError> {
        self.register(component_type)?;
        Ok(self)
    }

    /// 按名称查找类型
    pub fn get(&self, name: &str) -> Option<&ComponentType> {
        self.index.get(name).map(|&position| &self.types[position])
    }

    /// 按名称查找能力
    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// 组件扫描：为每个可扫描、未被排除的类型按命名约定生成定义
    pub fn scan(&self, convention: &NamingConvention, exclude: &[String]) -> Vec<ComponentDefinition> {
        self.types
            .iter()
            .filter(|component_type| component_type.is_scannable())
            .filter(|component_type| !exclude.iter().any(|name| name == component_type.name()))
            .map(|component_type| {
                let id = convention.component_id_for_name(component_type.name());
                debug!("扫描到组件: {} -> {}", component_type.name(), id);
                component_type.definition(id)
            })
            .collect()
    }
}
