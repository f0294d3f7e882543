//! # Config 模块
//!
//! Writer 的默认参数。
//!
//! ## 配置优先级
//!
//! 1. 单次播放的 [`crate::WriteRequest`] 覆盖（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）
//!
//! 配置在 Writer 构造时确定，播放期间只读。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ConfigError;

/// Writer 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// 显示速度（字/秒），0 表示不等待
    #[serde(default = "default_writing_speed")]
    pub writing_speed: f32,

    /// 标点停顿（秒）
    #[serde(default = "default_punctuation_pause")]
    pub punctuation_pause: f32,

    /// 尚未显示文字的颜色 (RGBA)
    ///
    /// 默认完全透明，用于在显示前占住排版位置。
    #[serde(default = "default_hidden_text_color")]
    pub hidden_text_color: [u8; 4],

    /// 是否整词显示
    #[serde(default)]
    pub write_whole_words: bool,

    /// 连接输出端时请求其切换到富文本模式
    ///
    /// 无法切换的输出端仍按纯文本处理。
    #[serde(default = "default_force_rich_text")]
    pub force_rich_text: bool,

    /// 收到输入后立即完成当前文本和计时等待
    #[serde(default = "default_instant_complete")]
    pub instant_complete: bool,

    /// `{size=...}` 参数无效时使用的字号
    #[serde(default = "default_text_size")]
    pub default_text_size: f32,
}

fn default_writing_speed() -> f32 {
    60.0
}

fn default_punctuation_pause() -> f32 {
    0.25
}

fn default_hidden_text_color() -> [u8; 4] {
    [255, 255, 255, 0]
}

fn default_force_rich_text() -> bool {
    true
}

fn default_instant_complete() -> bool {
    true
}

fn default_text_size() -> f32 {
    16.0
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            writing_speed: default_writing_speed(),
            punctuation_pause: default_punctuation_pause(),
            hidden_text_color: default_hidden_text_color(),
            write_whole_words: false,
            force_rich_text: default_force_rich_text(),
            instant_complete: default_instant_complete(),
            default_text_size: default_text_size(),
        }
    }
}

impl WriterConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载并验证配置文件
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.writing_speed.is_finite() || self.writing_speed < 0.0 {
            return Err(ConfigError::Validation(
                "writing_speed 必须是非负数".to_string(),
            ));
        }
        if !self.punctuation_pause.is_finite() || self.punctuation_pause < 0.0 {
            return Err(ConfigError::Validation(
                "punctuation_pause 必须是非负数".to_string(),
            ));
        }
        if !self.default_text_size.is_finite() || self.default_text_size <= 0.0 {
            return Err(ConfigError::Validation(
                "default_text_size 必须是正数".to_string(),
            ));
        }
        Ok(())
    }

    /// 隐藏文字的颜色开标签，如 `<color=#FFFFFF00>`
    pub fn hidden_color_open(&self) -> String {
        let [r, g, b, a] = self.hidden_text_color;
        format!("<color=#{r:02X}{g:02X}{b:02X}{a:02X}>")
    }
}
