//! # Tag 模块
//!
//! 文本标签分词，把作者书写的带标签文本转换为指令流。
//!
//! ```text
//! "Hello {b}World{/b}!"
//!   → [PlainText("Hello "), BoldOn, PlainText("World"), BoldOff, PlainText("!")]
//! ```
//!
//! ## 模块结构
//!
//! - [`token`]：Token 定义
//! - [`tokenizer`]：扫描与分类

pub mod token;
pub mod tokenizer;

#[cfg(test)]
mod tests;

pub use token::{Token, TokenKind};
pub use tokenizer::{Tokenizer, resolve_escapes, tokenize};

pub(crate) use tokenizer::trim_leading_blank;

/// 返回所有支持标签的说明
pub fn tag_help() -> &'static str {
    "\t{b} Bold Text {/b}\n\
     \t{i} Italic Text {/i}\n\
     \t{color=red} Color Text (color){/color}\n\
     \t{size=30} Text size {/size}\n\
     \n\
     \t{s}, {s=60} Writing speed (chars per sec){/s}\n\
     \t{w}, {w=0.5} Wait (seconds)\n\
     \t{wi} Wait for input\n\
     \t{wc} Wait for input and clear\n\
     \t{wvo} Wait for voice over line to complete\n\
     \t{wp}, {wp=0.5} Wait on punctuation (seconds){/wp}\n\
     \t{c} Clear\n\
     \t{x} Exit, advance to the next command without waiting for input\n\
     \n\
     \t{vpunch=10,0.5} Vertically punch screen (intensity,time)\n\
     \t{hpunch=10,0.5} Horizontally punch screen (intensity,time)\n\
     \t{punch=10,0.5} Punch screen (intensity,time)\n\
     \t{flash=0.5} Flash screen (duration)\n\
     \n\
     \t{audio=AudioObjectName} Play Audio Once\n\
     \t{audioloop=AudioObjectName} Play Audio Loop\n\
     \t{audiopause=AudioObjectName} Pause Audio\n\
     \t{audiostop=AudioObjectName} Stop Audio\n\
     \n\
     \t{m=MessageName} Broadcast message\n\
     \t{$VarName} Substitute variable"
}
