//! # Reveal
//!
//! 单个文本段的逐字/逐词显示状态与输出合成。

use crate::tag::{Token, TokenKind, resolve_escapes};

/// 触发标点停顿的字符
const PUNCTUATION: [char; 7] = ['.', '?', '!', ',', ':', ';', ')'];

/// 显示过程中的子阶段
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RevealStage {
    /// 即将显示下一步
    Emit,
    /// 标点停顿中
    Punctuation { remaining: f32 },
    /// 字间延迟中
    Delay { remaining: f32 },
}

/// 一个文本段的显示状态
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reveal {
    /// 已解析转义的文本
    pub text: String,
    /// 本段开始前输出端中已确定的文本
    pub start_text: String,
    pub open: String,
    pub close: String,
    /// 隐藏文字的开标签，`None` 表示输出端不支持富文本
    pub hidden_open: Option<String>,
    /// 后续文本（直到下一个 `{wc}`），隐藏显示以稳定排版
    pub read_ahead: String,
    /// 已显示到的字节位置
    pub cursor: usize,
    pub stage: RevealStage,
}

impl Reveal {
    /// 是否已全部显示
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.text.len()
    }

    /// 前进一步，返回本步新显示的文本
    pub fn advance(&mut self, whole_words: bool) -> &str {
        let prev = self.cursor;
        self.cursor = next_cursor(&self.text, prev, whole_words);
        &self.text[prev..self.cursor]
    }

    /// 合成当前输出，返回 (输出文本, 可见部分的字节长度)
    ///
    /// ```text
    /// start_text + open + 已显示 + close [+ hidden_open + 未显示 + read_ahead + </color>]
    /// ```
    pub fn compose(&self) -> (String, usize) {
        let revealed = &self.text[..self.cursor];
        let remainder = &self.text[self.cursor..];

        let mut out = String::with_capacity(
            self.start_text.len() + self.text.len() + self.read_ahead.len() + 64,
        );
        out.push_str(&self.start_text);
        out.push_str(&self.open);
        out.push_str(revealed);
        out.push_str(&self.close);
        let visible_len = out.len();

        if let Some(hidden_open) = &self.hidden_open
            && !(remainder.is_empty() && self.read_ahead.is_empty())
        {
            out.push_str(hidden_open);
            out.push_str(remainder);
            out.push_str(&self.read_ahead);
            out.push_str("</color>");
        }

        (out, visible_len)
    }
}

/// 计算下一步的显示位置
///
/// - 逐字模式：前进一个字符
/// - 整词模式：前进到下一个单词的开头（包含当前单词及其后的空白）
pub(crate) fn next_cursor(text: &str, cursor: usize, whole_words: bool) -> usize {
    let rest = &text[cursor..];
    if !whole_words {
        return cursor + rest.chars().next().map_or(0, char::len_utf8);
    }

    let mut seen_word = false;
    let mut in_trailing = false;
    for (i, c) in rest.char_indices() {
        if c.is_whitespace() {
            in_trailing |= seen_word;
        } else if in_trailing {
            return cursor + i;
        } else {
            seen_word = true;
        }
    }
    text.len()
}

/// 本步显示的最后一个非空白字符是否为标点
pub(crate) fn ends_with_punctuation(step: &str) -> bool {
    step.trim_end()
        .chars()
        .last()
        .is_some_and(|c| PUNCTUATION.contains(&c))
}

/// 收集 `from` 之后的文本，直到下一个 `{wc}`
pub(crate) fn read_ahead(tokens: &[Token], from: usize) -> String {
    let mut out = String::new();
    for token in tokens.iter().skip(from) {
        if token.kind == TokenKind::WaitForInputAndClear {
            break;
        }
        if let Some(text) = token.as_text() {
            out.push_str(&resolve_escapes(text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::tokenize;

    fn steps(text: &str, whole_words: bool) -> Vec<String> {
        let mut cursor = 0;
        let mut out = Vec::new();
        while cursor < text.len() {
            cursor = next_cursor(text, cursor, whole_words);
            out.push(text[..cursor].to_string());
        }
        out
    }

    #[test]
    fn test_char_steps() {
        assert_eq!(steps("Hi.", false), vec!["H", "Hi", "Hi."]);
    }

    #[test]
    fn test_char_steps_multibyte() {
        assert_eq!(steps("你好", false), vec!["你", "你好"]);
    }

    #[test]
    fn test_word_steps() {
        assert_eq!(steps("ab cd", true), vec!["ab ", "ab cd"]);
        assert_eq!(steps("  ab  cd ", true), vec!["  ab  ", "  ab  cd "]);
        assert_eq!(steps("   ", true), vec!["   "]);
    }

    #[test]
    fn test_punctuation() {
        assert!(ends_with_punctuation("."));
        assert!(ends_with_punctuation("Hi, "));
        assert!(ends_with_punctuation(")"));
        assert!(!ends_with_punctuation("a"));
        assert!(!ends_with_punctuation(" "));
        assert!(!ends_with_punctuation(""));
    }

    #[test]
    fn test_read_ahead_stops_at_wc() {
        let tokens = tokenize("a{b}b\\nc{wi}d{wc}e");
        // 从 "a" 之后开始收集
        assert_eq!(read_ahead(&tokens, 1), "b\ncd");
    }

    #[test]
    fn test_compose_with_hidden() {
        let mut reveal = Reveal {
            text: "Hi".to_string(),
            start_text: "x".to_string(),
            open: "<b>".to_string(),
            close: "</b>".to_string(),
            hidden_open: Some("<color=#FFFFFF00>".to_string()),
            read_ahead: " yo".to_string(),
            cursor: 0,
            stage: RevealStage::Emit,
        };
        assert_eq!(reveal.advance(false), "H");
        let (out, visible) = reveal.compose();
        assert_eq!(out, "x<b>H</b><color=#FFFFFF00>i yo</color>");
        assert_eq!(&out[..visible], "x<b>H</b>");
    }

    #[test]
    fn test_compose_plain_has_no_hidden() {
        let mut reveal = Reveal {
            text: "Hi".to_string(),
            start_text: String::new(),
            open: String::new(),
            close: String::new(),
            hidden_open: None,
            read_ahead: "more".to_string(),
            cursor: 0,
            stage: RevealStage::Emit,
        };
        reveal.advance(false);
        assert_eq!(reveal.compose(), ("H".to_string(), 1));
    }
}
