//! # Substitute 模块
//!
//! 分词之前的文本替换：变量插值 `{$name}` 和作者自定义标签。
//!
//! 所有处理器由调用方显式持有并传入 [`Substituter`]，不存在全局注册表。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 变量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarValue {
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 布尔值
    Bool(bool),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Int(v) => write!(f, "{v}"),
            VarValue::Float(v) => write!(f, "{v}"),
            VarValue::String(v) => f.write_str(v),
            VarValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl VarValue {
    /// 从命令行风格的字面量推断类型：整数、浮点、布尔，否则为字符串
    pub fn parse_literal(s: &str) -> Self {
        if let Ok(v) = s.parse::<i64>() {
            VarValue::Int(v)
        } else if let Ok(v) = s.parse::<f64>() {
            VarValue::Float(v)
        } else if let Ok(v) = s.parse::<bool>() {
            VarValue::Bool(v)
        } else {
            VarValue::String(s.to_string())
        }
    }
}

/// 文本替换处理器
pub trait SubstitutionHandler {
    /// 对文本做一次替换，返回文本是否被修改
    fn substitute(&self, text: &mut String) -> bool;
}

/// 变量表，替换 `{$name}`
///
/// 未定义的变量保持原样。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    values: HashMap<String, VarValue>,
}

impl Variables {
    /// 创建空变量表
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置变量
    pub fn set(&mut self, name: impl Into<String>, value: VarValue) {
        self.values.insert(name.into(), value);
    }

    /// 获取变量
    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.values.get(name)
    }

    /// 变量个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SubstitutionHandler for Variables {
    fn substitute(&self, text: &mut String) -> bool {
        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();
        let mut modified = false;

        while let Some(start) = rest.find("{$") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            let name = &after[..end];

            out.push_str(&rest[..start]);
            match self.values.get(name) {
                Some(value) => {
                    out.push_str(&value.to_string());
                    modified = true;
                }
                None => out.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }

        if modified {
            out.push_str(rest);
            *text = out;
        }
        modified
    }
}

/// 自定义标签
///
/// 将作者定义的起止符号替换为其他文本（通常是内置标签）。
/// 结束符号只在 `end` 与 `replace_end` 都非空时替换。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTag {
    /// 起始符号
    pub start: String,
    /// 结束符号
    #[serde(default)]
    pub end: String,
    /// 起始符号替换为
    pub replace_start: String,
    /// 结束符号替换为
    #[serde(default)]
    pub replace_end: String,
}

impl CustomTag {
    /// 创建自定义标签
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        replace_start: impl Into<String>,
        replace_end: impl Into<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            replace_start: replace_start.into(),
            replace_end: replace_end.into(),
        }
    }
}

impl SubstitutionHandler for CustomTag {
    fn substitute(&self, text: &mut String) -> bool {
        let mut modified = false;

        if !self.start.is_empty() && text.contains(&self.start) {
            *text = text.replace(&self.start, &self.replace_start);
            modified = true;
        }

        if !self.end.is_empty() && !self.replace_end.is_empty() && text.contains(&self.end) {
            *text = text.replace(&self.end, &self.replace_end);
            modified = true;
        }

        modified
    }
}

/// 默认最大替换轮数
pub const DEFAULT_RECURSION_DEPTH: usize = 5;

/// 文本替换器
///
/// 按顺序运行所有处理器，重复直到没有处理器修改文本，
/// 或达到 `recursion_depth` 轮（防止互相引用的变量无限展开）。
pub struct Substituter<'a> {
    handlers: Vec<&'a dyn SubstitutionHandler>,
    recursion_depth: usize,
}

impl<'a> Substituter<'a> {
    /// 创建替换器
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_RECURSION_DEPTH)
    }

    /// 创建指定最大轮数的替换器
    pub fn with_depth(recursion_depth: usize) -> Self {
        Self {
            handlers: Vec::new(),
            recursion_depth,
        }
    }

    /// 添加处理器
    pub fn add(mut self, handler: &'a dyn SubstitutionHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// 执行替换
    pub fn substitute(&self, input: &str) -> String {
        let mut text = input.to_string();
        for _ in 0..self.recursion_depth {
            let mut modified = false;
            for handler in &self.handlers {
                modified |= handler.substitute(&mut text);
            }
            if !modified {
                break;
            }
        }
        text
    }
}

impl Default for Substituter<'_> {
    fn default() -> Self {
        Self::new()
    }
}
