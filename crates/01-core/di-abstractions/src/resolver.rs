//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use crate::definition::ResolvedComponent;
use std::fmt;
use std::sync::Arc;
use wirebox_common::{Capability, ComponentId, DependencyError};

/// 解析请求：按标识或按能力
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// 按组件标识
    Id(ComponentId),
    /// 按能力，必须恰好有一个候选
    Capability(Capability),
}

impl ComponentKey {
    /// 按标识
    pub fn id(id: impl Into<ComponentId>) -> Self {
        Self::Id(id.into())
    }

    /// 按能力
    pub fn capability<I: ?Sized + 'static>() -> Self {
        Self::Capability(Capability::of::<I>())
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Capability(capability) => write!(f, "{capability}"),
        }
    }
}

/// 组件解析器 trait
///
/// 负责解析组件依赖并创建组件实例
pub trait ComponentResolver: Send + Sync {
    /// 解析一个组件
    fn resolve_key(&self, key: &ComponentKey) -> Result<ResolvedComponent, DependencyError>;

    /// 解析满足能力的全部组件，按注册顺序
    fn resolve_all_of(&self, capability: &Capability) -> Result<Vec<ResolvedComponent>, DependencyError>;
}

/// 类型化的解析辅助方法
pub trait ComponentResolverExt: ComponentResolver {
    /// 按能力（或具体类型）解析
    fn resolve<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DependencyError> {
        self.resolve_key(&ComponentKey::capability::<I>())?.cast::<I>()
    }

    /// 按标识解析并转换为 `I`
    fn resolve_named<I: ?Sized + Send + Sync + 'static>(
        &self,
        id: impl Into<ComponentId>,
    ) -> Result<Arc<I>, DependencyError> {
        self.resolve_key(&ComponentKey::Id(id.into()))?.cast::<I>()
    }

    /// 解析满足能力 `I` 的全部组件
    fn resolve_all<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>, DependencyError> {
        self.resolve_all_of(&Capability::of::<I>())?
            .iter()
            .map(ResolvedComponent::cast::<I>)
            .collect()
    }
}

impl<R: ComponentResolver + ?Sized> ComponentResolverExt for R {}

/// 解析上下文
///
/// 记录当前解析链，用于检测循环依赖和限制解析深度
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<ComponentId>,
    /// 最大递归深度
    max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 添加组件到解析链
    pub fn push(&mut self, id: &ComponentId) -> Result<(), DependencyError> {
        if self.contains(id) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.chain_to(id),
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                depth: self.resolution_chain.len() + 1,
                max_depth: self.max_depth,
                dependency_chain: self.chain_to(id),
            });
        }
        self.resolution_chain.push(id.clone());
        Ok(())
    }

    /// 从解析链中移除最后一个组件
    pub fn pop(&mut self) {
        self.resolution_chain.pop();
    }

    /// 组件是否在解析链上
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.resolution_chain.contains(id)
    }

    /// 当前解析链，最外层在前
    pub fn chain(&self) -> &[ComponentId] {
        &self.resolution_chain
    }

    /// 当前深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 从 `id` 第一次出现处开始的解析链描述，末尾追加 `id`
    pub fn chain_to(&self, id: &ComponentId) -> String {
        let start = self
            .resolution_chain
            .iter()
            .position(|existing| existing == id)
            .unwrap_or(0);
        self.resolution_chain[start..]
            .iter()
            .chain(std::iter::once(id))
            .map(ComponentId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
