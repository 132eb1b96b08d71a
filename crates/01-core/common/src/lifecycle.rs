//! 组件生命周期管理

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 单例模式 - 容器生命周期内只创建一个实例
    #[default]
    Singleton,
    /// 原型模式 - 每次请求都创建新实例
    Prototype,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

/// 单例实例槽位状态
///
/// `Unresolved → Resolving → Resolved`，或 `Resolving → Failed`。
/// `Resolved` 和 `Failed` 都是终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceState {
    /// 未解析
    #[default]
    Unresolved,
    /// 解析中
    Resolving,
    /// 已解析
    Resolved,
    /// 解析失败
    Failed,
}

impl InstanceState {
    /// 是否为终态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

/// 容器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerPhase {
    /// 注册阶段，可以添加定义
    #[default]
    Configuring,
    /// 首次解析之后，注册表不可变
    Started,
    /// 已关闭
    Closed,
}

impl fmt::Display for ContainerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuring => f.write_str("configuring"),
            Self::Started => f.write_str("started"),
            Self::Closed => f.write_str("closed"),
        }
    }
}
