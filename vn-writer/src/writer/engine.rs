//! # Engine
//!
//! 指令分发与挂起点处理。
//!
//! 每个阶段处理函数返回 [`Step`]：
//! - `Continue`：立即处理下一个阶段
//! - `Suspend`：时间预算用完或需要外部输入，本次 `tick` 结束
//! - `Finish`：指令流执行完毕

use std::mem;

use tracing::{trace, warn};

use super::reveal::{Reveal, RevealStage, ends_with_punctuation, read_ahead};
use super::{Phase, Writer};
use crate::command::{AudioAction, PunchAxis, WriterCommand};
use crate::error::TagError;
use crate::state::{PlaybackState, WriteOutcome};
use crate::tag::{Token, TokenKind, resolve_escapes, trim_leading_blank};

/// `{w}` 缺省时长
const DEFAULT_WAIT: f32 = 1.0;
/// 震屏缺省强度
const DEFAULT_PUNCH_INTENSITY: f32 = 10.0;
/// 震屏缺省时长
const DEFAULT_PUNCH_DURATION: f32 = 0.5;
/// 闪屏缺省时长
const DEFAULT_FLASH_DURATION: f32 = 0.2;

enum Step {
    Continue(Phase),
    Suspend(Phase),
    Finish,
}

impl Writer {
    /// 运行到下一个挂起点
    pub(super) fn run(&mut self) {
        let Some(mut playback) = self.playback.take() else {
            return;
        };

        let outcome = loop {
            if playback.exit_flag {
                break if playback.stop_requested {
                    WriteOutcome::Stopped
                } else {
                    WriteOutcome::Completed
                };
            }

            let phase = mem::replace(&mut self.phase, Phase::Idle);
            match self.step(&mut playback, phase) {
                Step::Continue(next) => self.phase = next,
                Step::Suspend(next) => {
                    self.phase = next;
                    self.playback = Some(playback);
                    return;
                }
                Step::Finish => break WriteOutcome::Completed,
            }
        };

        self.finish(playback, outcome);
    }

    /// 当前是否停在已通知过 `on_pause` 的等待中
    pub(super) fn in_notified_wait(&self) -> bool {
        match &self.phase {
            Phase::TimedWait { .. } | Phase::WaitForInput { .. } => true,
            Phase::Reveal(reveal) => matches!(reveal.stage, RevealStage::Punctuation { .. }),
            Phase::Idle | Phase::NextToken => false,
        }
    }

    fn step(&mut self, playback: &mut PlaybackState, phase: Phase) -> Step {
        match phase {
            Phase::Idle => Step::Finish,
            Phase::NextToken => self.next_token(playback),
            Phase::Reveal(reveal) => self.reveal_step(playback, reveal),
            Phase::TimedWait { remaining } => self.timed_wait(playback, remaining),
            Phase::WaitForInput { clear } => self.wait_for_input(playback, clear),
        }
    }

    // ---------------------------------------------------------------------
    // Token 分发
    // ---------------------------------------------------------------------

    fn next_token(&mut self, playback: &mut PlaybackState) -> Step {
        // 暂停时不处理新的 token
        if self.paused {
            return Step::Suspend(Phase::NextToken);
        }

        let index = playback.token_index;
        let Some(token) = self.tokens.get(index).cloned() else {
            return Step::Finish;
        };
        playback.token_index += 1;

        let after_clear = playback.after_clear;
        playback.after_clear = token.kind.is_clear();

        trace!(index, kind = ?token.kind, "处理 token");
        self.dispatch(playback, &token, after_clear)
    }

    fn dispatch(&mut self, playback: &mut PlaybackState, token: &Token, after_clear: bool) -> Step {
        if let Some(max) = numeric_arity(token.kind)
            && token.params.len() > max
        {
            report(param_count(token, max));
            return Step::Continue(Phase::NextToken);
        }

        match token.kind {
            TokenKind::PlainText => match token.as_text() {
                Some(text) => return self.start_reveal(playback, text, after_clear),
                None => report(param_count(token, 1)),
            },

            TokenKind::BoldOn => playback.style.bold = true,
            TokenKind::BoldOff => playback.style.bold = false,
            TokenKind::ItalicOn => playback.style.italic = true,
            TokenKind::ItalicOff => playback.style.italic = false,
            TokenKind::ColorOn => {
                if let Some(color) = single_param(token) {
                    playback.style.color = Some(color.to_string());
                }
            }
            TokenKind::ColorOff => playback.style.color = None,
            TokenKind::SizeOn => {
                playback.style.size = Some(number_param(token, 0, self.config.default_text_size));
            }
            TokenKind::SizeOff => playback.style.size = None,

            TokenKind::Wait => {
                let duration = number_param(token, 0, DEFAULT_WAIT);
                return self.begin_timed_wait(duration);
            }
            TokenKind::WaitForExternalCompletion => {
                let duration = self
                    .duration_source
                    .as_ref()
                    .map_or(0.0, |source| source.seconds_remaining());
                return self.begin_timed_wait(duration);
            }
            TokenKind::WaitForInputNoClear => return self.begin_wait_for_input(playback, false),
            TokenKind::WaitForInputAndClear => return self.begin_wait_for_input(playback, true),

            TokenKind::PunctuationWaitOn => {
                playback.punctuation_pause = number_param(token, 0, playback.default_pause);
            }
            TokenKind::PunctuationWaitOff => playback.punctuation_pause = playback.default_pause,
            TokenKind::SpeedOn => {
                playback.writing_speed = number_param(token, 0, playback.default_speed);
            }
            TokenKind::SpeedOff => playback.writing_speed = playback.default_speed,

            TokenKind::Clear => self.clear_sink(),
            TokenKind::Exit => playback.exit_flag = true,

            TokenKind::BroadcastMessage => {
                if let Some(message) = single_param(token) {
                    self.commands.push(WriterCommand::Broadcast {
                        message: message.to_string(),
                    });
                }
            }
            TokenKind::ScreenShakeVertical => self.punch(token, PunchAxis::Vertical),
            TokenKind::ScreenShakeHorizontal => self.punch(token, PunchAxis::Horizontal),
            TokenKind::ScreenShakeOmni => self.punch(token, PunchAxis::Omni),
            TokenKind::ScreenFlash => {
                let duration = number_param(token, 0, DEFAULT_FLASH_DURATION);
                self.commands.push(WriterCommand::Flash { duration });
            }

            TokenKind::AudioPlay => self.audio(token, AudioAction::Play),
            TokenKind::AudioLoop => self.audio(token, AudioAction::Loop),
            TokenKind::AudioPause => self.audio(token, AudioAction::Pause),
            TokenKind::AudioStop => self.audio(token, AudioAction::Stop),
        }

        Step::Continue(Phase::NextToken)
    }

    fn punch(&mut self, token: &Token, axis: PunchAxis) {
        let intensity = number_param(token, 0, DEFAULT_PUNCH_INTENSITY);
        let duration = number_param(token, 1, DEFAULT_PUNCH_DURATION);
        self.commands.push(WriterCommand::Punch {
            axis,
            intensity,
            duration,
        });
    }

    fn audio(&mut self, token: &Token, action: AudioAction) {
        if let Some(name) = single_param(token) {
            self.commands.push(WriterCommand::Audio {
                action,
                name: name.to_string(),
            });
        }
    }

    fn clear_sink(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.clear();
        }
        self.visible_len = 0;
    }

    /// 时间预算中扣除，返回剩余等待时间
    fn consume(&mut self, remaining: f32) -> f32 {
        let used = remaining.min(self.budget);
        self.budget -= used;
        remaining - used
    }

    // ---------------------------------------------------------------------
    // 文本显示
    // ---------------------------------------------------------------------

    fn start_reveal(&mut self, playback: &PlaybackState, raw: &str, after_clear: bool) -> Step {
        let mut text = resolve_escapes(raw);
        if after_clear {
            text = trim_leading_blank(&text).to_string();
        }
        if text.is_empty() {
            return Step::Continue(Phase::NextToken);
        }

        let rich = self
            .sink
            .as_ref()
            .is_some_and(|sink| sink.supports_rich_text());

        let (open, close, hidden_open, read_ahead) = if rich {
            (
                playback.style.open_markup(),
                playback.style.close_markup(),
                Some(self.config.hidden_color_open()),
                read_ahead(&self.tokens, playback.token_index),
            )
        } else {
            (String::new(), String::new(), None, String::new())
        };

        Step::Continue(Phase::Reveal(Reveal {
            text,
            start_text: self.committed_text(),
            open,
            close,
            hidden_open,
            read_ahead,
            cursor: 0,
            stage: RevealStage::Emit,
        }))
    }

    /// 输出端中已确定的文本（不含隐藏部分）
    fn committed_text(&self) -> String {
        let Some(sink) = self.sink.as_ref() else {
            return String::new();
        };
        let current = sink.text();
        if self.visible_len > 0
            && self.visible_len <= current.len()
            && current.is_char_boundary(self.visible_len)
        {
            current[..self.visible_len].to_string()
        } else {
            String::new()
        }
    }

    fn reveal_step(&mut self, playback: &mut PlaybackState, mut reveal: Reveal) -> Step {
        let instant = playback.input_flag && self.config.instant_complete;

        match reveal.stage {
            RevealStage::Emit => {
                if self.paused {
                    return Step::Suspend(Phase::Reveal(reveal));
                }

                // 最后一个字符是标点时同样停顿
                let punctuated = ends_with_punctuation(reveal.advance(playback.whole_words));
                self.emit(&reveal);

                if punctuated && !instant && playback.punctuation_pause > 0.0 {
                    self.listeners.notify(|l| l.on_pause());
                    reveal.stage = RevealStage::Punctuation {
                        remaining: playback.punctuation_pause,
                    };
                    return Step::Continue(Phase::Reveal(reveal));
                }
                after_glyph(playback, reveal, instant)
            }

            RevealStage::Punctuation { remaining } => {
                if !instant {
                    if self.paused {
                        return Step::Suspend(Phase::Reveal(reveal));
                    }
                    let remaining = self.consume(remaining);
                    if remaining > 0.0 {
                        reveal.stage = RevealStage::Punctuation { remaining };
                        return Step::Suspend(Phase::Reveal(reveal));
                    }
                }
                self.listeners.notify(|l| l.on_resume());
                after_glyph(playback, reveal, instant)
            }

            RevealStage::Delay { remaining } => {
                if !instant {
                    if self.paused {
                        return Step::Suspend(Phase::Reveal(reveal));
                    }
                    let remaining = self.consume(remaining);
                    if remaining > 0.0 {
                        reveal.stage = RevealStage::Delay { remaining };
                        return Step::Suspend(Phase::Reveal(reveal));
                    }
                }
                reveal.stage = RevealStage::Emit;
                Step::Continue(Phase::Reveal(reveal))
            }
        }
    }

    /// 推送当前输出并通知监听器
    fn emit(&mut self, reveal: &Reveal) {
        let (output, visible_len) = reveal.compose();
        trace!(output = %output, "显示");
        if let Some(sink) = self.sink.as_mut() {
            sink.set_text(&output);
        }
        self.visible_len = visible_len;
        self.listeners.notify(|l| l.on_glyph());
    }

    // ---------------------------------------------------------------------
    // 等待
    // ---------------------------------------------------------------------

    fn begin_timed_wait(&mut self, duration: f32) -> Step {
        self.listeners.notify(|l| l.on_pause());
        Step::Continue(Phase::TimedWait {
            remaining: duration.max(0.0),
        })
    }

    fn timed_wait(&mut self, playback: &PlaybackState, remaining: f32) -> Step {
        let instant = playback.input_flag && self.config.instant_complete;
        if !instant {
            if self.paused {
                return Step::Suspend(Phase::TimedWait { remaining });
            }
            let remaining = self.consume(remaining);
            if remaining > 0.0 {
                return Step::Suspend(Phase::TimedWait { remaining });
            }
        }
        self.listeners.notify(|l| l.on_resume());
        Step::Continue(Phase::NextToken)
    }

    fn begin_wait_for_input(&mut self, playback: &mut PlaybackState, clear: bool) -> Step {
        self.listeners.notify(|l| l.on_pause());
        playback.input_flag = false;
        Step::Continue(Phase::WaitForInput { clear })
    }

    /// 等待输入；暂停时仍然接受输入，但之后的 token 要等取消暂停才处理
    fn wait_for_input(&mut self, playback: &mut PlaybackState, clear: bool) -> Step {
        if !playback.input_flag {
            self.budget = 0.0;
            return Step::Suspend(Phase::WaitForInput { clear });
        }

        playback.input_flag = false;
        if clear {
            self.clear_sink();
        }
        self.listeners.notify(|l| l.on_resume());
        Step::Continue(Phase::NextToken)
    }
}

/// 一步显示（及其标点停顿）完成后的去向
fn after_glyph(playback: &PlaybackState, mut reveal: Reveal, instant: bool) -> Step {
    if reveal.is_finished() {
        return Step::Continue(Phase::NextToken);
    }
    reveal.stage = if !instant && playback.writing_speed > 0.0 {
        RevealStage::Delay {
            remaining: 1.0 / playback.writing_speed,
        }
    } else {
        RevealStage::Emit
    };
    Step::Continue(Phase::Reveal(reveal))
}

fn report(error: TagError) {
    warn!(error = %error, "忽略指令");
}

fn param_count(token: &Token, expected: usize) -> TagError {
    TagError::ParamCount {
        tag: format!("{:?}", token.kind),
        expected,
        actual: token.params.len(),
    }
}

/// 数值指令最多接受的参数个数
fn numeric_arity(kind: TokenKind) -> Option<usize> {
    match kind {
        TokenKind::Wait
        | TokenKind::SizeOn
        | TokenKind::PunctuationWaitOn
        | TokenKind::SpeedOn
        | TokenKind::ScreenFlash => Some(1),
        TokenKind::ScreenShakeVertical
        | TokenKind::ScreenShakeHorizontal
        | TokenKind::ScreenShakeOmni => Some(2),
        _ => None,
    }
}

/// 要求恰好一个参数，否则记录并跳过指令
fn single_param(token: &Token) -> Option<&str> {
    match token.params.as_slice() {
        [param] => Some(param),
        _ => {
            report(param_count(token, 1));
            None
        }
    }
}

/// 读取数值参数；缺省时使用默认值，无法解析时记录并使用默认值
fn number_param(token: &Token, index: usize, default: f32) -> f32 {
    let Some(raw) = token.param(index) else {
        return default;
    };
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            report(TagError::InvalidNumber {
                tag: format!("{:?}", token.kind),
                value: raw.to_string(),
                default,
            });
            default
        }
    }
}
