//! 声明式装配文档
//!
//! ```toml
//! [[components]]
//! id = "cdPlayer"
//! type = "CDPlayer"
//! properties = [{ name = "compactDisc", ref = "compactDisc" }]
//! ```

use serde::{Deserialize, Serialize};
use wirebox_common::{ConfigError, Scope};

/// 装配文档
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringDocument {
    /// 组件声明
    pub components: Vec<ComponentSpec>,
    /// 组件扫描
    pub scan: Option<ScanSpec>,
}

impl WiringDocument {
    /// 合并另一个文档；扫描设置以后出现的为准
    pub fn merge(&mut self, other: Self) {
        self.components.extend(other.components);
        if other.scan.is_some() {
            self.scan = other.scan;
        }
    }
}

/// 组件声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// 组件标识
    pub id: String,
    /// 类型目录中的类型名
    #[serde(rename = "type")]
    pub type_name: String,
    /// 作用域，缺省使用类型的默认作用域
    #[serde(default)]
    pub scope: Option<Scope>,
    /// 是否延迟初始化
    #[serde(default)]
    pub lazy: Option<bool>,
    /// 描述
    #[serde(default)]
    pub description: Option<String>,
    /// 构造参数，缺省使用类型的默认构造参数
    #[serde(default, rename = "constructor-args", alias = "constructor_args")]
    pub constructor_args: Option<Vec<ReferenceSpec>>,
    /// 属性注入
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

/// 依赖引用声明，三个字段必须且只能设置一个
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSpec {
    /// 按标识引用
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// 字面量
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 按能力名称自动装配
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
}

/// 已校验的引用声明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind<'a> {
    /// 按标识
    Component(&'a str),
    /// 字面量
    Value(&'a str),
    /// 按能力
    Capability(&'a str),
}

impl ReferenceSpec {
    /// 按标识引用
    pub fn component(id: impl Into<String>) -> Self {
        Self {
            reference: Some(id.into()),
            ..Self::default()
        }
    }

    /// 字面量
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// 是否没有指定任何引用
    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.value.is_none() && self.capability.is_none()
    }

    /// 校验并返回引用种类；`owner` 和 `position` 只用于报错
    pub fn kind(&self, owner: &str, position: &str) -> Result<ReferenceKind<'_>, ConfigError> {
        match (&self.reference, &self.value, &self.capability) {
            (Some(id), None, None) => Ok(ReferenceKind::Component(id)),
            (None, Some(value), None) => Ok(ReferenceKind::Value(value)),
            (None, None, Some(capability)) => Ok(ReferenceKind::Capability(capability)),
            _ => Err(ConfigError::validation(format!(
                "组件 {owner} 的 {position} 必须且只能指定 ref、value、capability 之一"
            ))),
        }
    }
}

/// 属性注入声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// 属性名称
    pub name: String,
    /// 引用；全部缺省时使用类型声明的默认引用
    #[serde(flatten)]
    pub reference: ReferenceSpec,
    /// 是否必需，缺省使用类型声明
    #[serde(default)]
    pub required: Option<bool>,
}

/// 组件扫描设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSpec {
    /// 是否启用
    pub enabled: bool,
    /// 生成标识前去掉的类型名后缀
    pub strip_suffixes: Vec<String>,
    /// 排除的类型名
    pub exclude: Vec<String>,
}

impl Default for ScanSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            strip_suffixes: Vec::new(),
            exclude: Vec::new(),
        }
    }
}
