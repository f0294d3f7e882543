//! # VN Writer CLI
//!
//! 命令行宿主：在终端里驱动 Writer，逐帧打印输出和指令。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli -- play "Hello {b}World{/b}!{wi} Bye."
//! cargo run -p host-cli -- play --file line.txt --speed 20 --auto
//! cargo run -p host-cli -- play "Hi {$name}." --var name=Alice
//! cargo run -p host-cli -- tokens "{color=red}Hi{/color}"
//! cargo run -p host-cli -- tags
//! ```

use std::cell::Cell;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info, warn};

use vn_writer::{
    ContentSink, Substituter, Tokenizer, VarValue, Variables, WriteOutcome, WriteRequest, Writer,
    WriterConfig, WriterInput, WriterListener, WriterStatus, tag_help,
};

#[derive(Parser)]
#[command(name = "vn-writer")]
#[command(about = "视觉小说文本标签解析与打字机播放")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放一段文本
    Play {
        /// 要播放的文本
        #[arg(required_unless_present = "file")]
        text: Option<String>,

        /// 从文件读取文本
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// 模拟帧率
        #[arg(long, default_value_t = 30.0)]
        fps: f32,

        /// 覆盖显示速度（字/秒）
        #[arg(short, long)]
        speed: Option<f32>,

        /// 整词显示
        #[arg(short, long)]
        whole_words: bool,

        /// 自动跳过等待输入
        #[arg(short, long)]
        auto: bool,

        /// 按真实时间播放
        #[arg(long)]
        realtime: bool,

        /// 不输出富文本标记
        #[arg(long)]
        plain: bool,

        /// 配置文件 (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 变量，用于 {$name} 替换
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, VarValue)>,

        /// 最长播放时间（秒），超时后停止
        #[arg(long, default_value_t = 600.0)]
        max_seconds: f32,
    },

    /// 输出分词结果 (JSON)
    Tokens {
        /// 要分词的文本
        text: String,
    },

    /// 列出支持的标签
    Tags,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Play {
            text,
            file,
            fps,
            speed,
            whole_words,
            auto,
            realtime,
            plain,
            config,
            vars,
            max_seconds,
        } => {
            let raw = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("无法读取文件: {}", path.display()))?,
                (None, None) => bail!("需要提供文本或 --file"),
            };

            let mut config = match config {
                Some(path) => WriterConfig::load_from(&path)
                    .with_context(|| format!("无法加载配置: {}", path.display()))?,
                None => WriterConfig::default(),
            };
            if plain {
                config.force_rich_text = false;
            }

            let options = PlayOptions {
                fps,
                speed,
                whole_words,
                auto,
                realtime,
                plain,
                max_seconds,
            };
            play(&raw, config, &vars, &options)
        }
        Commands::Tokens { text } => print_tokens(&text),
        Commands::Tags => {
            println!("{}", tag_help());
            Ok(())
        }
    }
}

struct PlayOptions {
    fps: f32,
    speed: Option<f32>,
    whole_words: bool,
    auto: bool,
    realtime: bool,
    plain: bool,
    max_seconds: f32,
}

fn play(
    raw: &str,
    config: WriterConfig,
    vars: &[(String, VarValue)],
    options: &PlayOptions,
) -> Result<()> {
    ensure!(
        options.fps.is_finite() && options.fps > 0.0,
        "fps 必须是正数"
    );

    let mut variables = Variables::new();
    for (name, value) in vars {
        variables.set(name.clone(), value.clone());
    }
    let text = Substituter::new().add(&variables).substitute(raw);
    debug!(text = %text, "替换后的文本");

    let clock = Rc::new(Cell::new(0.0_f32));
    let sink = ConsoleSink {
        text: String::new(),
        rich: !options.plain,
        clock: clock.clone(),
    };

    let mut writer = Writer::with_sink(config, sink);
    writer.listeners_mut().register(Box::new(LogListener));

    let outcome = Rc::new(Cell::new(None));
    let capture = outcome.clone();
    let request = WriteRequest {
        writing_speed: options.speed,
        whole_words: options.whole_words.then_some(true),
        ..WriteRequest::default()
    };
    writer.write(&text, request, move |o| capture.set(Some(o)));

    let dt = 1.0 / options.fps;
    let mut lines = io::stdin().lock().lines();
    let mut stopping = false;

    loop {
        let tick = writer.tick(dt);
        clock.set(clock.get() + dt);

        for command in &tick.commands {
            println!("[{:>8.3}s] ! {}", clock.get(), serde_json::to_string(command)?);
        }

        match tick.status {
            WriterStatus::Idle => break,
            WriterStatus::WaitingForInput if options.auto => {
                writer.handle_input(WriterInput::Advance);
            }
            WriterStatus::WaitingForInput => {
                eprint!("(回车继续) ");
                io::stderr().flush()?;
                match lines.next() {
                    Some(line) => {
                        line?;
                        writer.handle_input(WriterInput::Advance);
                    }
                    None => writer.handle_input(WriterInput::Stop),
                }
            }
            WriterStatus::Writing | WriterStatus::Paused => {}
        }

        if !stopping && clock.get() >= options.max_seconds {
            warn!(max_seconds = options.max_seconds, "播放超时，停止");
            writer.handle_input(WriterInput::Stop);
            stopping = true;
        }

        if options.realtime {
            std::thread::sleep(Duration::from_secs_f32(dt));
        }
    }

    match outcome.get() {
        Some(WriteOutcome::Completed) => info!(seconds = clock.get(), "播放完成"),
        Some(WriteOutcome::Stopped) => info!(seconds = clock.get(), "播放被停止"),
        None => warn!("播放未结束"),
    }
    Ok(())
}

fn print_tokens(text: &str) -> Result<()> {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize(text);
    println!("{}", serde_json::to_string_pretty(&tokens)?);
    for warning in tokenizer.warnings() {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn parse_var(s: &str) -> Result<(String, VarValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("变量格式应为 NAME=VALUE: '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("变量名为空: '{s}'"));
    }
    Ok((name.to_string(), VarValue::parse_literal(value)))
}

/// 打印每一帧的输出端
struct ConsoleSink {
    text: String,
    rich: bool,
    clock: Rc<Cell<f32>>,
}

impl ContentSink for ConsoleSink {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        println!("[{:>8.3}s] {}", self.clock.get(), text.replace('\n', "\\n"));
    }

    fn supports_rich_text(&self) -> bool {
        self.rich
    }
}

/// 把 Writer 事件写进日志
struct LogListener;

impl WriterListener for LogListener {
    fn on_start(&mut self, clip: Option<&str>) {
        info!(clip, "开始播放");
    }

    fn on_pause(&mut self) {
        debug!("等待");
    }

    fn on_resume(&mut self) {
        debug!("继续");
    }

    fn on_input(&mut self) {
        debug!("收到输入");
    }

    fn on_end(&mut self, stop_audio: bool) {
        info!(stop_audio, "结束播放");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("name=Alice").unwrap(),
            ("name".to_string(), VarValue::String("Alice".to_string()))
        );
        assert_eq!(
            parse_var("hp=3").unwrap(),
            ("hp".to_string(), VarValue::Int(3))
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=1").is_err());
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from([
            "vn-writer", "play", "Hi", "--speed", "20", "--auto", "--var", "a=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Play {
                text, speed, auto, vars, ..
            } => {
                assert_eq!(text.as_deref(), Some("Hi"));
                assert_eq!(speed, Some(20.0));
                assert!(auto);
                assert_eq!(vars.len(), 1);
            }
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn test_console_sink_keeps_text() {
        let mut sink = ConsoleSink {
            text: String::new(),
            rich: false,
            clock: Rc::new(Cell::new(0.0)),
        };
        sink.set_text("abc");
        assert_eq!(sink.text(), "abc");
        sink.clear();
        assert_eq!(sink.text(), "");
        assert!(!sink.supports_rich_text());
    }
}
