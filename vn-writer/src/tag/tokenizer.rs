//! # Tokenizer
//!
//! 手写扫描器，将带标签的文本切分为 [`Token`] 序列。
//!
//! ## 规则
//!
//! - 非贪婪匹配 `{...}`，内部不能跨行
//! - 标签前的非空文本产生 `PlainText`
//! - 无法识别的标签被丢弃并记录警告，不会中断扫描
//! - `{c}` / `{wc}` 之后的文本去掉前导空白

use tracing::warn;

use super::token::{Token, TokenKind};
use crate::error::TagError;

/// 标签对 `=` 的要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EqPolicy {
    /// 只能是裸标签，如 `{b}`
    Bare,
    /// 必须带参数，如 `{color=red}`
    Required,
    /// 两者皆可，如 `{w}` / `{w=1}`
    Optional,
}

/// 标签词表（大小写敏感）
const TAG_TABLE: &[(&str, TokenKind, EqPolicy)] = &[
    ("b", TokenKind::BoldOn, EqPolicy::Bare),
    ("/b", TokenKind::BoldOff, EqPolicy::Bare),
    ("i", TokenKind::ItalicOn, EqPolicy::Bare),
    ("/i", TokenKind::ItalicOff, EqPolicy::Bare),
    ("color", TokenKind::ColorOn, EqPolicy::Required),
    ("/color", TokenKind::ColorOff, EqPolicy::Bare),
    ("size", TokenKind::SizeOn, EqPolicy::Required),
    ("/size", TokenKind::SizeOff, EqPolicy::Bare),
    ("wi", TokenKind::WaitForInputNoClear, EqPolicy::Bare),
    ("wc", TokenKind::WaitForInputAndClear, EqPolicy::Bare),
    ("wvo", TokenKind::WaitForExternalCompletion, EqPolicy::Bare),
    ("wp", TokenKind::PunctuationWaitOn, EqPolicy::Optional),
    ("/wp", TokenKind::PunctuationWaitOff, EqPolicy::Bare),
    ("w", TokenKind::Wait, EqPolicy::Optional),
    ("c", TokenKind::Clear, EqPolicy::Bare),
    ("s", TokenKind::SpeedOn, EqPolicy::Optional),
    ("/s", TokenKind::SpeedOff, EqPolicy::Bare),
    ("x", TokenKind::Exit, EqPolicy::Bare),
    ("m", TokenKind::BroadcastMessage, EqPolicy::Required),
    ("vpunch", TokenKind::ScreenShakeVertical, EqPolicy::Optional),
    ("hpunch", TokenKind::ScreenShakeHorizontal, EqPolicy::Optional),
    ("punch", TokenKind::ScreenShakeOmni, EqPolicy::Optional),
    ("flash", TokenKind::ScreenFlash, EqPolicy::Optional),
    ("audio", TokenKind::AudioPlay, EqPolicy::Required),
    ("audioloop", TokenKind::AudioLoop, EqPolicy::Required),
    ("audiopause", TokenKind::AudioPause, EqPolicy::Required),
    ("audiostop", TokenKind::AudioStop, EqPolicy::Required),
];

/// 分词器
///
/// 分词本身是纯函数；`Tokenizer` 只额外保存最近一次分词的诊断信息。
#[derive(Debug, Default)]
pub struct Tokenizer {
    warnings: Vec<TagError>,
}

impl Tokenizer {
    /// 创建新的分词器
    pub fn new() -> Self {
        Self::default()
    }

    /// 分词
    ///
    /// 永远不会失败，最坏情况返回空序列。
    pub fn tokenize(&mut self, text: &str) -> Vec<Token> {
        self.warnings.clear();

        let mut tokens = Vec::new();
        let mut position = 0;

        while let Some((start, end)) = find_tag_span(text, position) {
            let pre_text = &text[position..start];
            if !pre_text.is_empty() {
                tokens.push(Token::text(pre_text));
            }

            match classify_tag(&text[start + 1..end]) {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    warn!(error = %e, "丢弃无效标签");
                    self.warnings.push(e);
                }
            }

            position = end + 1;
        }

        if position < text.len() {
            tokens.push(Token::text(&text[position..]));
        }

        trim_after_clear(&mut tokens);
        tokens
    }

    /// 最近一次分词产生的诊断
    pub fn warnings(&self) -> &[TagError] {
        &self.warnings
    }
}

/// 分词（便捷函数，诊断只写入日志）
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::new().tokenize(text)
}

/// 将字面量 `\n` 转换为换行符
pub fn resolve_escapes(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// 从 `from` 开始查找下一个 `{...}`，返回 `{` 与 `}` 的字节位置
///
/// 等价于非贪婪的 `\{.*?\}`：内部不跨行，遇到换行则从下一个 `{` 重新尝试。
fn find_tag_span(text: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut search = from;

    while let Some(offset) = text[search..].find('{') {
        let start = search + offset;
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'}' => return Some((start, i)),
                b'\n' => break,
                _ => i += 1,
            }
        }
        search = start + 1;
    }

    None
}

/// 将标签内部文本分类为 Token
fn classify_tag(tag: &str) -> Result<Token, TagError> {
    if tag.is_empty() {
        return Err(TagError::Malformed {
            tag: format!("{{{tag}}}"),
        });
    }

    let (name, has_eq) = match tag.find('=') {
        Some(index) => (&tag[..index], true),
        None => (tag, false),
    };

    let (_, kind, policy) = TAG_TABLE
        .iter()
        .find(|(tag_name, _, _)| *tag_name == name)
        .ok_or_else(|| TagError::UnknownTag {
            tag: tag.to_string(),
        })?;

    let accepted = match policy {
        EqPolicy::Bare => !has_eq,
        EqPolicy::Required => has_eq,
        EqPolicy::Optional => true,
    };
    if !accepted {
        return Err(TagError::UnknownTag {
            tag: tag.to_string(),
        });
    }

    Ok(Token::with_params(*kind, extract_params(tag)))
}

/// 提取 `=` 之后以逗号分隔的参数，每个参数去掉首尾空白
fn extract_params(tag: &str) -> Vec<String> {
    match tag.split_once('=') {
        Some((_, params)) => params.split(',').map(|p| p.trim().to_string()).collect(),
        None => Vec::new(),
    }
}

/// 清屏类指令之后的文本去掉前导空白和换行
fn trim_after_clear(tokens: &mut [Token]) {
    let mut trim_leading = false;
    for token in tokens.iter_mut() {
        if trim_leading
            && token.kind == TokenKind::PlainText
            && let Some(text) = token.params.first_mut()
        {
            *text = trim_leading_blank(text).to_string();
        }
        trim_leading = token.kind.is_clear();
    }
}

/// 去掉前导的空格、制表符、回车、换行
pub(crate) fn trim_leading_blank(text: &str) -> &str {
    text.trim_start_matches([' ', '\t', '\r', '\n'])
}
