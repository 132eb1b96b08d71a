//! 组件注册表抽象接口

use crate::definition::{ComponentDefinition, DependencyReference};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use wirebox_common::{Capability, ComponentId, DependencyError};

/// 组件注册表 trait
///
/// 注册只允许在容器启动（首次解析）之前进行
pub trait ComponentRegistry: Send + Sync {
    /// 注册组件定义
    fn register(&self, definition: ComponentDefinition) -> Result<(), DependencyError>;

    /// 是否已注册指定标识
    fn contains(&self, id: &ComponentId) -> bool;

    /// 按标识获取定义
    fn definition(&self, id: &ComponentId) -> Option<Arc<ComponentDefinition>>;

    /// 所有定义，按注册顺序
    fn definitions(&self) -> Vec<Arc<ComponentDefinition>>;

    /// 满足指定能力的定义，按注册顺序
    fn candidates(&self, capability: &Capability) -> Vec<Arc<ComponentDefinition>>;
}

/// 依赖图节点
#[derive(Debug, Clone)]
pub struct DependencyGraphNode {
    /// 组件标识
    pub id: ComponentId,
    /// 构造依赖的组件标识
    pub constructor_dependencies: Vec<ComponentId>,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Result<(), DependencyError>;

    /// 构建依赖图，只保留构造注入边
    fn build_dependency_graph(
        &self,
        definitions: &[Arc<ComponentDefinition>],
    ) -> Result<Vec<DependencyGraphNode>, DependencyError>;
}

/// 默认循环依赖检测器
///
/// 只有全部由构造注入组成的环在静态检查时报错；带 setter 的环是否可解析
/// 取决于解析顺序，由容器在运行时判断。
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Result<(), DependencyError> {
        // 使用深度优先搜索检测循环依赖
        let nodes: HashMap<&ComponentId, &DependencyGraphNode> =
            graph.iter().map(|node| (&node.id, node)).collect();
        let mut visited = HashSet::new();
        let mut visiting = Vec::new();

        for node in graph {
            if !visited.contains(&node.id) {
                Self::dfs_check(&node.id, &nodes, &mut visited, &mut visiting)?;
            }
        }

        Ok(())
    }

    fn build_dependency_graph(
        &self,
        definitions: &[Arc<ComponentDefinition>],
    ) -> Result<Vec<DependencyGraphNode>, DependencyError> {
        definitions
            .iter()
            .map(|definition| {
                let constructor_dependencies = definition
                    .constructor_args()
                    .iter()
                    .map(|reference| resolve_reference_statically(reference, definitions))
                    .filter_map(Result::transpose)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DependencyGraphNode {
                    id: definition.id().clone(),
                    constructor_dependencies,
                })
            })
            .collect()
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check(
        current: &ComponentId,
        nodes: &HashMap<&ComponentId, &DependencyGraphNode>,
        visited: &mut HashSet<ComponentId>,
        visiting: &mut Vec<ComponentId>,
    ) -> Result<(), DependencyError> {
        if let Some(start) = visiting.iter().position(|id| id == current) {
            // 检测到循环依赖
            let chain = visiting[start..]
                .iter()
                .chain(std::iter::once(current))
                .map(ComponentId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DependencyError::CircularDependency {
                dependency_chain: chain,
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        visiting.push(current.clone());
        if let Some(node) = nodes.get(current) {
            for dependency in &node.constructor_dependencies {
                Self::dfs_check(dependency, nodes, visited, visiting)?;
            }
        }
        visiting.pop();
        visited.insert(current.clone());

        Ok(())
    }
}

/// 静态解析一个依赖引用，字面量返回 `None`
///
/// 引用的组件不存在报 `NoSuchComponent`，能力有多个候选报 `AmbiguousComponent`。
pub fn resolve_reference_statically(
    reference: &DependencyReference,
    definitions: &[Arc<ComponentDefinition>],
) -> Result<Option<ComponentId>, DependencyError> {
    match reference {
        DependencyReference::Value(_) => Ok(None),
        DependencyReference::Component(id) => definitions
            .iter()
            .find(|definition| definition.id() == id)
            .map(|definition| Some(definition.id().clone()))
            .ok_or_else(|| DependencyError::no_such_component(id.as_str())),
        DependencyReference::Capability(capability) => {
            let candidates: Vec<&Arc<ComponentDefinition>> = definitions
                .iter()
                .filter(|definition| definition.provides(capability.type_id))
                .collect();
            match candidates.as_slice() {
                [] => Err(DependencyError::no_such_component(capability.name.as_str())),
                [single] => Ok(Some(single.id().clone())),
                many => Err(DependencyError::AmbiguousComponent {
                    key: capability.name.clone(),
                    candidates: many.iter().map(|d| d.id().to_string()).collect(),
                }),
            }
        }
    }
}
