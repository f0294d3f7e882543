//! # Input 模块
//!
//! 定义 Host 向 Writer 传递的输入事件。
//!
//! Writer 不直接处理鼠标/键盘事件，只处理语义化的输入；
//! 时间流逝通过 [`crate::Writer::tick`] 的 `dt` 传入。

use serde::{Deserialize, Serialize};

/// Host 向 Writer 传递的输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriterInput {
    /// 用户点击：加速显示当前文本，或解除等待输入
    Advance,
    /// 立即停止当前播放
    Stop,
    /// 暂停
    Pause,
    /// 取消暂停
    Resume,
}
