//! # Command 模块
//!
//! 定义 Writer 向 Host 发出的副作用指令。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"做什么"，不描述"怎么做"
//! - **即发即弃**：Writer 不等待 Command 的执行结果
//! - **引擎无关**：不包含任何渲染或音频引擎的类型

use serde::{Deserialize, Serialize};

/// 震屏方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PunchAxis {
    /// 垂直（`{vpunch}`）
    Vertical,
    /// 水平（`{hpunch}`）
    Horizontal,
    /// 双向（`{punch}`）
    Omni,
}

/// 音频操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioAction {
    /// 播放一次（`{audio}`）
    Play,
    /// 循环播放（`{audioloop}`）
    Loop,
    /// 暂停（`{audiopause}`）
    Pause,
    /// 停止（`{audiostop}`）
    Stop,
}

/// Writer 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriterCommand {
    /// 广播消息（`{m=Name}`）
    Broadcast { message: String },

    /// 震屏
    Punch {
        axis: PunchAxis,
        intensity: f32,
        duration: f32,
    },

    /// 闪屏
    Flash { duration: f32 },

    /// 音频控制，`name` 为宿主中音频对象的名字
    Audio { action: AudioAction, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = WriterCommand::Punch {
            axis: PunchAxis::Vertical,
            intensity: 10.0,
            duration: 0.5,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: WriterCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }

    #[test]
    fn test_audio_command_json_shape() {
        let cmd = WriterCommand::Audio {
            action: AudioAction::Loop,
            name: "Rain".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"Audio":{"action":"Loop","name":"Rain"}}"#
        );
    }
}
