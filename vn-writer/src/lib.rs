//! # VN Writer
//!
//! 视觉小说对话文本的标签解析与打字机播放核心库。
//!
//! ## 架构概述
//!
//! `vn-writer` 是纯逻辑核心，不依赖任何渲染、音频或 UI 引擎。
//!
//! ```text
//! 原始文本 → [Substituter] → [Tokenizer] → Vec<Token> → [Writer] → ContentSink
//!                                                          │
//!                                                          ├─► WriterListener 事件
//!                                                          └─► Vec<WriterCommand>
//! ```
//!
//! Host 每帧调用 [`Writer::tick`]，传入经过的时间：
//!
//! ```text
//! Host                          Writer
//!   │                              │
//!   │──── play(tokens) ──────────►│
//!   │──── tick(dt) ──────────────►│
//!   │◄─── WriterTick { commands, status } ──│
//!   │──── WriterInput ───────────►│
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! use vn_writer::{TextBuffer, WriteRequest, Writer, WriterConfig, WriterStatus};
//!
//! let mut writer = Writer::with_sink(WriterConfig::default(), TextBuffer::new());
//! writer.write("Hello {b}World{/b}!{wi}", WriteRequest::default(), |outcome| {
//!     println!("done: {outcome:?}");
//! });
//!
//! loop {
//!     let tick = writer.tick(frame_dt);
//!     for cmd in tick.commands {
//!         host.execute(cmd);
//!     }
//!     match tick.status {
//!         WriterStatus::Idle => break,
//!         WriterStatus::WaitingForInput if clicked() => writer.request_instant_advance(),
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`tag`]：标签分词
//! - [`substitute`]：变量与自定义标签替换
//! - [`writer`]：打字机播放器
//! - [`command`]：Writer 向 Host 发出的指令
//! - [`input`]：Host 向 Writer 传递的输入
//! - [`sink`]：输出端与时长来源
//! - [`listener`]：事件监听
//! - [`state`]：状态定义
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod listener;
pub mod sink;
pub mod state;
pub mod substitute;
pub mod tag;
pub mod writer;

// 重导出核心类型
pub use command::{AudioAction, PunchAxis, WriterCommand};
pub use config::WriterConfig;
pub use error::{ConfigError, TagError};
pub use input::WriterInput;
pub use listener::{ListenerId, Listeners, WriterListener};
pub use sink::{ContentSink, DurationSource, TextBuffer};
pub use state::{WriteOutcome, WriterStatus};
pub use substitute::{CustomTag, SubstitutionHandler, Substituter, VarValue, Variables};
pub use tag::{Token, TokenKind, Tokenizer, resolve_escapes, tag_help, tokenize};
pub use writer::{WriteRequest, Writer, WriterTick};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let tokens = tokenize("Hi{wi}");
        assert_eq!(tokens.len(), 2);

        let mut writer = Writer::with_sink(WriterConfig::default(), TextBuffer::new());
        writer.play(tokens, WriteRequest::default(), |_| {});
        assert_eq!(writer.status(), WriterStatus::Writing);

        let _input = WriterInput::Advance;
        let _cmd = WriterCommand::Flash { duration: 0.2 };
    }
}
