//! 元数据定义
//!
//! 组件标识、类型信息和能力（capability）信息

use std::any::TypeId;
use std::fmt;

/// 组件标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(String);

impl ComponentId {
    /// 创建新的组件标识
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息，`T` 可以是 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            name: short_type_name(full),
            id: TypeId::of::<T>(),
            module_path: full.to_string(),
        }
    }

    /// 获取简短的类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 能力
///
/// 组件可以满足的抽象行为契约，通常是一个 `dyn Trait`，
/// 也可以是具体类型本身。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    /// 能力名称
    pub name: String,
    /// 能力类型ID
    pub type_id: TypeId,
}

impl Capability {
    /// 从类型获取能力
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<I>()),
            type_id: TypeId::of::<I>(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&TypeInfo> for Capability {
    fn from(info: &TypeInfo) -> Self {
        Self {
            name: info.name.clone(),
            type_id: info.id,
        }
    }
}

/// 去掉模块路径和 `dyn ` 前缀，泛型参数保留
fn short_type_name(full: &str) -> String {
    let trimmed = full.trim_start_matches("dyn ");
    let (head, generics) = match trimmed.find('<') {
        Some(pos) => trimmed.split_at(pos),
        None => (trimmed, ""),
    };
    let base = head.rsplit("::").next().unwrap_or(head);
    format!("{base}{generics}")
}
