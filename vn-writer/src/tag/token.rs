//! # Token 定义
//!
//! 分词器产出的指令流单元。

use serde::{Deserialize, Serialize};

/// Token 类型
///
/// 与标签语法一一对应，见 [`super::tag_help`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// 普通文本
    PlainText,
    /// `{b}`
    BoldOn,
    /// `{/b}`
    BoldOff,
    /// `{i}`
    ItalicOn,
    /// `{/i}`
    ItalicOff,
    /// `{color=red}`
    ColorOn,
    /// `{/color}`
    ColorOff,
    /// `{size=30}`
    SizeOn,
    /// `{/size}`
    SizeOff,
    /// `{w}` / `{w=0.5}`
    Wait,
    /// `{wi}`
    WaitForInputNoClear,
    /// `{wc}`
    WaitForInputAndClear,
    /// `{wvo}`，等待外部播放（语音）完成
    WaitForExternalCompletion,
    /// `{wp}` / `{wp=0.5}`
    PunctuationWaitOn,
    /// `{/wp}`
    PunctuationWaitOff,
    /// `{c}`
    Clear,
    /// `{s}` / `{s=60}`
    SpeedOn,
    /// `{/s}`
    SpeedOff,
    /// `{x}`
    Exit,
    /// `{m=Name}`
    BroadcastMessage,
    /// `{vpunch=10,0.5}`
    ScreenShakeVertical,
    /// `{hpunch=10,0.5}`
    ScreenShakeHorizontal,
    /// `{punch=10,0.5}`
    ScreenShakeOmni,
    /// `{flash=0.5}`
    ScreenFlash,
    /// `{audio=Name}`
    AudioPlay,
    /// `{audioloop=Name}`
    AudioLoop,
    /// `{audiopause=Name}`
    AudioPause,
    /// `{audiostop=Name}`
    AudioStop,
}

impl TokenKind {
    /// 是否为清屏类指令（其后的文本需要去掉前导空白）
    pub fn is_clear(self) -> bool {
        matches!(self, Self::Clear | Self::WaitForInputAndClear)
    }
}

/// 指令流中的一个 Token
///
/// 构造后不可变。`PlainText` 总是恰好携带一个参数（文本本身）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token 类型
    pub kind: TokenKind,
    /// 参数列表，语义取决于 `kind`
    pub params: Vec<String>,
}

impl Token {
    /// 创建文本 Token
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::PlainText,
            params: vec![text.into()],
        }
    }

    /// 创建无参数的指令 Token
    pub fn directive(kind: TokenKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// 创建带参数的指令 Token
    pub fn with_params(kind: TokenKind, params: Vec<String>) -> Self {
        Self { kind, params }
    }

    /// 若为文本 Token，返回其文本
    pub fn as_text(&self) -> Option<&str> {
        match (self.kind, self.params.as_slice()) {
            (TokenKind::PlainText, [text]) => Some(text),
            _ => None,
        }
    }

    /// 获取第 `index` 个参数
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}
