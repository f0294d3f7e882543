//! # Sink 模块
//!
//! Writer 的输出端与外部时长来源。
//!
//! 宿主必须显式提供实现了 [`ContentSink`] 的对象，Writer 不会在运行时探测
//! 任意对象是否"有文本属性"。

/// 文本输出端
///
/// 接收 Writer 每一步合成的完整文本。
pub trait ContentSink {
    /// 当前文本
    fn text(&self) -> &str;

    /// 替换当前文本
    fn set_text(&mut self, text: &str);

    /// 是否支持富文本标记（`<b>`、`<color=...>` 等）
    fn supports_rich_text(&self) -> bool {
        true
    }

    /// 请求切换到富文本模式；无法切换的输出端忽略即可
    fn force_rich_text(&mut self) {}

    /// 清空文本
    fn clear(&mut self) {
        self.set_text("");
    }
}

/// 内存文本缓冲区
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    rich_text: bool,
}

impl TextBuffer {
    /// 创建支持富文本的缓冲区
    pub fn new() -> Self {
        Self {
            text: String::new(),
            rich_text: true,
        }
    }

    /// 创建纯文本缓冲区
    pub fn plain() -> Self {
        Self {
            text: String::new(),
            rich_text: false,
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSink for TextBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn supports_rich_text(&self) -> bool {
        self.rich_text
    }

    fn force_rich_text(&mut self) {
        self.rich_text = true;
    }
}

/// 外部播放剩余时长来源（如语音）
///
/// `{wvo}` 开始时查询一次，之后不再轮询。
pub trait DurationSource {
    /// 剩余秒数
    fn seconds_remaining(&self) -> f32;
}

impl<F> DurationSource for F
where
    F: Fn() -> f32,
{
    fn seconds_remaining(&self) -> f32 {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_buffer_can_be_forced_rich() {
        let mut buffer = TextBuffer::plain();
        assert!(!buffer.supports_rich_text());
        buffer.force_rich_text();
        assert!(buffer.supports_rich_text());
    }

    #[test]
    fn test_text_buffer() {
        let mut buffer = TextBuffer::new();
        assert!(buffer.supports_rich_text());
        buffer.set_text("hello");
        assert_eq!(buffer.text(), "hello");
        buffer.clear();
        assert_eq!(buffer.text(), "");

        assert!(!TextBuffer::plain().supports_rich_text());
    }

    #[test]
    fn test_closure_duration_source() {
        let source = || 2.5_f32;
        assert_eq!(source.seconds_remaining(), 2.5);
    }
}
