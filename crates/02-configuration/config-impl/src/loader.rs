//! 装配文档加载器
//!
//! 把装配文档中的组件声明转换为组件定义。类型名、属性名和能力名都在
//! [`TypeCatalog`] 中查找，找不到时在加载阶段报错，而不是等到解析时。

use config_abstractions::{
    ComponentSpec, ReferenceKind, ReferenceSpec, ScanSpec, WiringDocument, WiringSource,
};
use di_abstractions::{ComponentDefinition, DependencyReference, TypeCatalog};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use wirebox_common::{ConfigError, NamingConvention};

/// 装配文档加载器
#[derive(Debug, Clone)]
pub struct WiringLoader {
    catalog: Arc<TypeCatalog>,
}

impl WiringLoader {
    /// 创建加载器
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// 类型目录
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// 依次读取所有来源并合并
    pub async fn read_sources(sources: &[Box<dyn WiringSource>]) -> Result<WiringDocument, ConfigError> {
        let mut document = WiringDocument::default();
        for source in sources {
            info!("读取装配来源: {}", source.name());
            document.merge(source.load().await?);
        }
        Ok(document)
    }

    /// 依次读取所有来源，合并后转换为组件定义
    pub async fn load_sources(
        &self,
        sources: &[Box<dyn WiringSource>],
    ) -> Result<Vec<ComponentDefinition>, ConfigError> {
        let document = Self::read_sources(sources).await?;
        self.load(&document)
    }

    /// 转换装配文档
    pub fn load(&self, document: &WiringDocument) -> Result<Vec<ComponentDefinition>, ConfigError> {
        let mut definitions = document
            .components
            .iter()
            .map(|spec| self.definition(spec))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(scan) = document.scan.as_ref().filter(|scan| scan.enabled) {
            let scanned = self.scan(scan, &definitions);
            definitions.extend(scanned);
        }

        debug!("装配文档转换完成: {} 个组件定义", definitions.len());
        Ok(definitions)
    }

    /// 转换单个组件声明
    pub fn definition(&self, spec: &ComponentSpec) -> Result<ComponentDefinition, ConfigError> {
        let component_type =
            self.catalog
                .get(&spec.type_name)
                .ok_or_else(|| ConfigError::UnknownComponentType {
                    id: spec.id.clone(),
                    type_name: spec.type_name.clone(),
                })?;

        let mut definition = component_type.definition(spec.id.as_str());

        if let Some(args) = &spec.constructor_args {
            let references = args
                .iter()
                .enumerate()
                .map(|(index, arg)| self.reference(&spec.id, &format!("constructor-arg[{index}]"), arg))
                .collect::<Result<Vec<_>, _>>()?;
            definition = definition.with_constructor_args(references);
        }

        for property in &spec.properties {
            let descriptor = component_type
                .property(&property.name)
                .ok_or_else(|| ConfigError::UnknownProperty {
                    id: spec.id.clone(),
                    property: property.name.clone(),
                })?;

            let mut setter = descriptor.setter.clone();
            if !property.reference.is_empty() {
                let position = format!("property '{}'", property.name);
                setter = setter.with_reference(self.reference(&spec.id, &position, &property.reference)?);
            }
            if let Some(required) = property.required {
                setter = setter.with_required(required);
            }
            definition = definition.with_setter(setter);
        }

        if let Some(scope) = spec.scope {
            definition = definition.with_scope(scope);
        }
        if let Some(lazy) = spec.lazy {
            definition = definition.with_lazy(lazy);
        }
        if let Some(description) = &spec.description {
            definition = definition.with_description(description.as_str());
        }

        debug!("装配组件: {} ({})", spec.id, spec.type_name);
        Ok(definition)
    }

    fn reference(
        &self,
        owner: &str,
        position: &str,
        spec: &ReferenceSpec,
    ) -> Result<DependencyReference, ConfigError> {
        match spec.kind(owner, position)? {
            ReferenceKind::Component(id) => Ok(DependencyReference::component(id)),
            ReferenceKind::Value(value) => Ok(DependencyReference::value(value)),
            ReferenceKind::Capability(name) => self
                .catalog
                .capability(name)
                .map(|capability| DependencyReference::Capability(capability.clone()))
                .ok_or_else(|| ConfigError::UnknownCapability {
                    id: owner.to_string(),
                    capability: name.to_string(),
                }),
        }
    }

    /// 组件扫描；与显式声明同名的扫描结果让位于显式声明
    fn scan(&self, scan: &ScanSpec, declared: &[ComponentDefinition]) -> Vec<ComponentDefinition> {
        let convention = scan
            .strip_suffixes
            .iter()
            .fold(NamingConvention::new(), |convention, suffix| {
                convention.with_stripped_suffix(suffix.as_str())
            });
        let declared_ids: HashSet<&str> = declared.iter().map(|d| d.id().as_str()).collect();

        self.catalog
            .scan(&convention, &scan.exclude)
            .into_iter()
            .filter(|definition| {
                let keep = !declared_ids.contains(definition.id().as_str());
                if !keep {
                    debug!("扫描结果与显式声明同名，跳过: {}", definition.id());
                }
                keep
            })
            .collect()
    }
}
