//! # Writer 模块
//!
//! 打字机式的指令流播放器。
//!
//! ## 执行模型
//!
//! ```text
//! play(tokens, request, on_complete)
//! loop {
//!     tick(dt) -> WriterTick { commands, status }
//! }
//! ```
//!
//! Writer 不持有时钟，也不会阻塞。Host 每帧调用 [`Writer::tick`] 传入经过的时间，
//! Writer 推进到下一个挂起点（字间延迟、标点停顿、计时等待、等待输入、暂停）后返回。
//! 未用完的时间会累积到下一次 `tick`。
//!
//! 同一个 Writer 同时只有一次播放；在播放中再次 `play` 会先以
//! [`WriteOutcome::Stopped`] 结束上一次播放。
//!
//! ## 模块结构
//!
//! - `engine`：指令分发与挂起点处理
//! - `reveal`：文本段显示状态与输出合成

mod engine;
mod reveal;

use tracing::{debug, warn};

use crate::command::WriterCommand;
use crate::config::WriterConfig;
use crate::input::WriterInput;
use crate::listener::Listeners;
use crate::sink::{ContentSink, DurationSource};
use crate::state::{PlaybackState, WriteOutcome, WriterStatus};
use crate::tag::{Token, tokenize};

use reveal::Reveal;

/// 单次播放的参数
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    /// 开始前清空输出端；为 `false` 时接在已有文本之后
    pub clear: bool,
    /// 结束时通知监听器停止音频
    pub stop_audio: bool,
    /// 传给 `on_start` 的音频片段引用
    pub audio_clip: Option<String>,
    /// 结束前等待输入（仅 [`Writer::write`]，追加 `{wi}`）
    pub wait_for_input: bool,
    /// 结束前等待语音结束（仅 [`Writer::write`]，追加 `{wvo}`）
    pub wait_for_voice_over: bool,
    /// 覆盖配置中的显示速度
    pub writing_speed: Option<f32>,
    /// 覆盖配置中的标点停顿
    pub punctuation_pause: Option<f32>,
    /// 覆盖配置中的整词模式
    pub whole_words: Option<bool>,
}

impl Default for WriteRequest {
    fn default() -> Self {
        Self {
            clear: true,
            stop_audio: false,
            audio_clip: None,
            wait_for_input: false,
            wait_for_voice_over: false,
            writing_speed: None,
            punctuation_pause: None,
            whole_words: None,
        }
    }
}

/// `tick` 的结果
#[derive(Debug, Clone, PartialEq)]
pub struct WriterTick {
    /// 本次产生的副作用指令
    pub commands: Vec<WriterCommand>,
    /// 当前状态
    pub status: WriterStatus,
}

/// 当前执行阶段
#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    NextToken,
    Reveal(Reveal),
    TimedWait { remaining: f32 },
    WaitForInput { clear: bool },
}

type CompletionCallback = Box<dyn FnOnce(WriteOutcome)>;

/// 打字机播放器
pub struct Writer {
    config: WriterConfig,
    sink: Option<Box<dyn ContentSink>>,
    duration_source: Option<Box<dyn DurationSource>>,
    listeners: Listeners,

    tokens: Vec<Token>,
    playback: Option<PlaybackState>,
    phase: Phase,
    paused: bool,
    /// 可用的时间预算（秒）
    budget: f32,
    /// 输出端中已确定（非隐藏）部分的字节长度
    visible_len: usize,
    on_complete: Option<CompletionCallback>,
    commands: Vec<WriterCommand>,
}

impl Writer {
    /// 创建 Writer（尚未连接输出端）
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config,
            sink: None,
            duration_source: None,
            listeners: Listeners::new(),
            tokens: Vec::new(),
            playback: None,
            phase: Phase::Idle,
            paused: false,
            budget: 0.0,
            visible_len: 0,
            on_complete: None,
            commands: Vec::new(),
        }
    }

    /// 创建并连接输出端
    pub fn with_sink(config: WriterConfig, sink: impl ContentSink + 'static) -> Self {
        let mut writer = Self::new(config);
        writer.set_sink(sink);
        writer
    }

    /// 连接输出端
    ///
    /// 配置了 `force_rich_text` 时请求输出端切换到富文本模式。
    pub fn set_sink(&mut self, sink: impl ContentSink + 'static) {
        let mut sink: Box<dyn ContentSink> = Box::new(sink);
        if self.config.force_rich_text {
            sink.force_rich_text();
        }
        self.sink = Some(sink);
        self.visible_len = 0;
    }

    /// 当前输出端
    pub fn sink(&self) -> Option<&dyn ContentSink> {
        self.sink.as_deref()
    }

    /// 设置 `{wvo}` 的时长来源
    pub fn set_duration_source(&mut self, source: impl DurationSource + 'static) {
        self.duration_source = Some(Box::new(source));
    }

    /// 监听器注册表
    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    /// 配置
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// 开始播放指令流
    ///
    /// `on_complete` 在播放结束时恰好调用一次。没有输出端时立即以
    /// [`WriteOutcome::Completed`] 调用。
    pub fn play(
        &mut self,
        tokens: Vec<Token>,
        request: WriteRequest,
        on_complete: impl FnOnce(WriteOutcome) + 'static,
    ) {
        if self.playback.is_some() {
            debug!("新的播放开始前停止当前播放");
            if let Some(playback) = self.playback.take() {
                self.finish(playback, WriteOutcome::Stopped);
            }
        }

        if request.clear {
            if let Some(sink) = self.sink.as_mut() {
                sink.clear();
            }
            self.visible_len = 0;
        }

        if self.sink.is_none() {
            warn!("Writer 没有输出端，跳过播放");
            on_complete(WriteOutcome::Completed);
            return;
        }

        let clip = request.audio_clip.as_deref();
        self.listeners.notify(|l| l.on_start(clip));

        let mut playback = PlaybackState::new(
            request.writing_speed.unwrap_or(self.config.writing_speed),
            request
                .punctuation_pause
                .unwrap_or(self.config.punctuation_pause),
            request.whole_words.unwrap_or(self.config.write_whole_words),
        );
        playback.stop_audio = request.stop_audio;

        debug!(tokens = tokens.len(), "开始播放");
        self.tokens = tokens;
        self.playback = Some(playback);
        self.phase = Phase::NextToken;
        self.paused = false;
        self.budget = 0.0;
        self.on_complete = Some(Box::new(on_complete));
    }

    /// 分词并播放
    ///
    /// 根据 `request` 在文本末尾追加 `{wi}` / `{wvo}`。
    pub fn write(
        &mut self,
        text: &str,
        request: WriteRequest,
        on_complete: impl FnOnce(WriteOutcome) + 'static,
    ) {
        let mut text = text.to_string();
        if request.wait_for_input {
            text.push_str("{wi}");
        }
        if request.wait_for_voice_over {
            text.push_str("{wvo}");
        }
        let tokens = tokenize(&text);
        self.play(tokens, request, on_complete);
    }

    /// 推进播放
    ///
    /// # 参数
    ///
    /// - `dt`: 距上次调用经过的秒数
    pub fn tick(&mut self, dt: f32) -> WriterTick {
        if self.playback.is_some() && !self.paused && dt > 0.0 {
            self.budget += dt;
        }
        self.run();
        WriterTick {
            commands: std::mem::take(&mut self.commands),
            status: self.status(),
        }
    }

    /// 处理 Host 输入
    pub fn handle_input(&mut self, input: WriterInput) {
        match input {
            WriterInput::Advance => self.request_instant_advance(),
            WriterInput::Stop => self.request_stop(),
            WriterInput::Pause => self.set_paused(true),
            WriterInput::Resume => self.set_paused(false),
        }
    }

    /// 加速：立即显示当前文本段并跳过计时等待，或解除等待输入
    pub fn request_instant_advance(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.input_flag = true;
            self.listeners.notify(|l| l.on_input());
        }
    }

    /// 停止播放，在下一次 `tick` 时生效
    pub fn request_stop(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            debug!("请求停止播放");
            playback.exit_flag = true;
            playback.stop_requested = true;
        }
    }

    /// 暂停/取消暂停
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// 是否暂停
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 是否正在播放（包括等待中）
    pub fn is_writing(&self) -> bool {
        self.playback.is_some()
    }

    /// 是否停在等待输入
    pub fn is_waiting_for_input(&self) -> bool {
        matches!(self.phase, Phase::WaitForInput { .. })
    }

    /// 是否处于活动状态
    pub fn is_active(&self) -> bool {
        self.status().is_active()
    }

    /// 当前状态
    pub fn status(&self) -> WriterStatus {
        if self.playback.is_none() {
            WriterStatus::Idle
        } else if self.paused {
            WriterStatus::Paused
        } else if self.is_waiting_for_input() {
            WriterStatus::WaitingForInput
        } else {
            WriterStatus::Writing
        }
    }

    /// 结束播放：补发未配对的 `on_resume`，重置控制状态，通知监听器，调用完成回调
    fn finish(&mut self, playback: PlaybackState, outcome: WriteOutcome) {
        debug!(?outcome, "播放结束");
        if self.in_notified_wait() {
            self.listeners.notify(|l| l.on_resume());
        }
        self.phase = Phase::Idle;
        self.paused = false;
        self.budget = 0.0;

        let stop_audio = playback.stop_audio;
        self.listeners.notify(|l| l.on_end(stop_audio));

        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome);
        }
    }
}

impl std::fmt::Debug for Writer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .field("listeners", &self.listeners)
            .field("tokens", &self.tokens.len())
            .field("phase", &self.phase)
            .field("paused", &self.paused)
            .finish()
    }
}
