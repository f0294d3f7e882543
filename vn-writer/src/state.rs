//! # State 模块
//!
//! Writer 的可观察状态与单次播放的样式/计时状态。
//!
//! ## 生命周期
//!
//! - [`PlaybackState`] 在每次 `play` 开始时重建，播放结束后丢弃
//! - [`WriterStatus`] 是 Host 每次 `tick` 后拿到的状态快照

use serde::{Deserialize, Serialize};

/// Writer 状态
///
/// ```text
/// Idle            -> 没有播放
/// Writing         -> 正在显示文字或执行计时等待
/// WaitingForInput -> 停在 {wi}/{wc}，需要 Advance 输入
/// Paused          -> 被暂停，不推进
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriterStatus {
    /// 空闲
    #[default]
    Idle,
    /// 正在写
    Writing,
    /// 等待输入
    WaitingForInput,
    /// 已暂停
    Paused,
}

impl WriterStatus {
    /// 是否处于活动状态（写或等待）
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// 一次播放的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
    /// 指令流执行完毕，或遇到 `{x}`
    Completed,
    /// 被 `request_stop` 中断
    Stopped,
}

/// 文本样式状态
///
/// 跨文本段保持，直到被显式关闭或播放结束。
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    pub size: Option<f32>,
}

impl StyleState {
    /// 无任何样式
    pub fn new() -> Self {
        Self {
            bold: false,
            italic: false,
            color: None,
            size: None,
        }
    }

    /// 开标签，顺序：size, color, b, i
    pub fn open_markup(&self) -> String {
        let mut out = String::new();
        if let Some(size) = self.size {
            out.push_str(&format!("<size={size}>"));
        }
        if let Some(color) = &self.color {
            out.push_str(&format!("<color={color}>"));
        }
        if self.bold {
            out.push_str("<b>");
        }
        if self.italic {
            out.push_str("<i>");
        }
        out
    }

    /// 闭标签，与开标签顺序相反
    pub fn close_markup(&self) -> String {
        let mut out = String::new();
        if self.italic {
            out.push_str("</i>");
        }
        if self.bold {
            out.push_str("</b>");
        }
        if self.color.is_some() {
            out.push_str("</color>");
        }
        if self.size.is_some() {
            out.push_str("</size>");
        }
        out
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::new()
    }
}

/// 单次播放的状态
///
/// 由一次 `play` 独占，不在多次播放间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// 样式
    pub style: StyleState,
    /// 当前显示速度（字/秒）
    pub writing_speed: f32,
    /// 当前标点停顿（秒）
    pub punctuation_pause: f32,
    /// 本次播放的默认速度，`{/s}` 恢复到此值
    pub default_speed: f32,
    /// 本次播放的默认标点停顿，`{/wp}` 恢复到此值
    pub default_pause: f32,
    /// 是否按整词显示
    pub whole_words: bool,
    /// 下一个要处理的 token 下标
    pub token_index: usize,
    /// 上一个处理的 token 是否为清屏类指令
    pub after_clear: bool,
    /// 收到了加速/继续输入
    pub input_flag: bool,
    /// 请求退出（`{x}` 或 stop）
    pub exit_flag: bool,
    /// 退出是否来自 stop
    pub stop_requested: bool,
    /// 结束时是否通知停止音频
    pub stop_audio: bool,
}

impl PlaybackState {
    /// 创建新一次播放的状态
    pub fn new(writing_speed: f32, punctuation_pause: f32, whole_words: bool) -> Self {
        Self {
            style: StyleState::new(),
            writing_speed,
            punctuation_pause,
            default_speed: writing_speed,
            default_pause: punctuation_pause,
            whole_words,
            token_index: 0,
            after_clear: false,
            input_flag: false,
            exit_flag: false,
            stop_requested: false,
            stop_audio: false,
        }
    }
}
