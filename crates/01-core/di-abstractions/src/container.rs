//! 依赖注入容器抽象接口
//!
//! 提供依赖注入容器的核心抽象

use crate::registry::ComponentRegistry;
use crate::resolver::ComponentResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wirebox_common::{ComponentId, ContainerPhase, DependencyError, InstanceState};

/// 依赖注入容器 trait
///
/// 组合注册和解析能力，并提供验证、预实例化和关闭
pub trait DiContainer: ComponentRegistry + ComponentResolver {
    /// 静态验证：引用存在、能力引用无歧义、没有纯构造注入的循环
    fn validate(&self) -> Result<(), DependencyError>;

    /// 按注册顺序创建所有非延迟单例，返回创建的数量
    fn pre_instantiate_singletons(&self) -> Result<usize, DependencyError>;

    /// 单例槽位状态，未注册时返回 `None`
    fn state_of(&self, id: &ComponentId) -> Option<InstanceState>;

    /// 容器阶段
    fn phase(&self) -> ContainerPhase;

    /// 容器统计信息
    fn stats(&self) -> ContainerStats;

    /// 关闭容器，重复调用无副作用
    fn close(&self);
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 构建时执行静态验证
    pub validate_on_build: bool,
    /// 构建时创建非延迟单例
    pub eager_singletons: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            validate_on_build: true,
            eager_singletons: true,
            max_resolution_depth: 100,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone)]
pub struct ContainerStats {
    /// 容器实例标识
    pub container_id: Uuid,
    /// 首次解析时间
    pub started_at: Option<DateTime<Utc>>,
    /// 当前阶段
    pub phase: ContainerPhase,
    /// 已注册组件数量
    pub registered_components: usize,
    /// 已解析的单例数量
    pub resolved_singletons: usize,
    /// 失败的单例数量
    pub failed_singletons: usize,
    /// 创建的原型实例数量
    pub prototype_instances: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}

impl ContainerStats {
    /// 空统计
    pub fn new(container_id: Uuid) -> Self {
        Self {
            container_id,
            started_at: None,
            phase: ContainerPhase::Configuring,
            registered_components: 0,
            resolved_singletons: 0,
            failed_singletons: 0,
            prototype_instances: 0,
            resolution_errors: 0,
        }
    }
}
