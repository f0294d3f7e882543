//! # Error 模块
//!
//! 定义 vn-writer 中使用的错误类型。
//!
//! 标签相关的错误（[`TagError`]）永远不会中断分词或播放，
//! 只作为诊断信息收集或写入日志。

use thiserror::Error;

/// 文本标签诊断
///
/// 分词器和 Writer 遇到有问题的指令时产生，指令被跳过或回退到默认值。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TagError {
    /// 标签内部为空或格式不完整，如 `{}`
    #[error("无效的标签格式 '{tag}'")]
    Malformed { tag: String },

    /// 未知标签
    #[error("未知标签 '{{{tag}}}'")]
    UnknownTag { tag: String },

    /// 参数个数不符
    #[error("标签 '{tag}' 需要 {expected} 个参数，实际 {actual} 个")]
    ParamCount {
        tag: String,
        expected: usize,
        actual: usize,
    },

    /// 数值参数无法解析，已使用默认值
    #[error("标签 '{tag}' 的参数 '{value}' 不是有效数字，使用默认值 {default}")]
    InvalidNumber {
        tag: String,
        value: String,
        default: f32,
    },
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读写配置文件失败
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化失败
    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置值不合法
    #[error("配置验证失败: {0}")]
    Validation(String),
}
