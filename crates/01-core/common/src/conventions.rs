//! 约定规范定义
//!
//! 组件扫描时使用的命名约定

use crate::metadata::{ComponentId, TypeInfo};

/// 组件命名约定
#[derive(Debug, Clone, Default)]
pub struct NamingConvention {
    /// 需要去掉的类型名后缀，例如 `Impl`
    pub strip_suffixes: Vec<String>,
}

impl NamingConvention {
    /// 创建默认命名约定
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加需要去掉的后缀
    pub fn with_stripped_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.strip_suffixes.push(suffix.into());
        self
    }

    /// 由类型信息生成默认组件标识
    pub fn component_id(&self, type_info: &TypeInfo) -> ComponentId {
        self.component_id_for_name(type_info.short_name())
    }

    /// 由类型名称生成默认组件标识，`SgtPeppers` → `sgtPeppers`
    pub fn component_id_for_name(&self, type_name: &str) -> ComponentId {
        let base = type_name.split('<').next().unwrap_or(type_name);
        let mut base = base.to_string();
        for suffix in &self.strip_suffixes {
            if base.len() > suffix.len() && base.ends_with(suffix.as_str()) {
                base.truncate(base.len() - suffix.len());
                break;
            }
        }
        ComponentId::new(decapitalize(&base))
    }
}

/// 首字母小写；前两个字母都大写时保持原样（`CDPlayer` 不变）
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => {
            let mut result: String = first.to_lowercase().collect();
            result.push_str(&name[first.len_utf8()..]);
            result
        }
        (None, _) => String::new(),
    }
}
