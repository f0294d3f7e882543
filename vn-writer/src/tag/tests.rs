//! # Tokenizer 测试

use super::*;
use crate::error::TagError;

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

// -------------------------------------------------------------------------
// 基本分词
// -------------------------------------------------------------------------

#[test]
fn test_tokenize_bold() {
    let tokens = tokenize("Hello {b}World{/b}!");
    assert_eq!(
        tokens,
        vec![
            Token::text("Hello "),
            Token::directive(TokenKind::BoldOn),
            Token::text("World"),
            Token::directive(TokenKind::BoldOff),
            Token::text("!"),
        ]
    );
}

#[test]
fn test_tokenize_snapshot() {
    let tokens = tokenize("{color=red}Hi{/color}{w=0.5}");
    insta::assert_debug_snapshot!(tokens, @r#"
    [
        Token {
            kind: ColorOn,
            params: [
                "red",
            ],
        },
        Token {
            kind: PlainText,
            params: [
                "Hi",
            ],
        },
        Token {
            kind: ColorOff,
            params: [],
        },
        Token {
            kind: Wait,
            params: [
                "0.5",
            ],
        },
    ]
    "#);
}

#[test]
fn test_tokenize_empty() {
    assert!(tokenize("").is_empty());
}

#[test]
fn test_tokenize_plain_only() {
    assert_eq!(tokenize("just text"), vec![Token::text("just text")]);
}

#[test]
fn test_tokenize_all_bare_tags() {
    let tokens = tokenize("{b}{/b}{i}{/i}{/color}{/size}{wi}{wc}{wvo}{wp}{/wp}{w}{c}{s}{/s}{x}");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::BoldOn,
            TokenKind::BoldOff,
            TokenKind::ItalicOn,
            TokenKind::ItalicOff,
            TokenKind::ColorOff,
            TokenKind::SizeOff,
            TokenKind::WaitForInputNoClear,
            TokenKind::WaitForInputAndClear,
            TokenKind::WaitForExternalCompletion,
            TokenKind::PunctuationWaitOn,
            TokenKind::PunctuationWaitOff,
            TokenKind::Wait,
            TokenKind::Clear,
            TokenKind::SpeedOn,
            TokenKind::SpeedOff,
            TokenKind::Exit,
        ]
    );
    assert!(tokens.iter().all(|t| t.params.is_empty()));
}

#[test]
fn test_tokenize_parameterized_tags() {
    let tokens = tokenize(
        "{size=30}{wp=0.1}{w=2}{s=10}{m=Door}{vpunch=5,1}{hpunch=3, 0.2}{punch=1,2}{flash=0.3}\
         {audio=Beep}{audioloop=Rain}{audiopause=Rain}{audiostop=Rain}",
    );
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::SizeOn,
            TokenKind::PunctuationWaitOn,
            TokenKind::Wait,
            TokenKind::SpeedOn,
            TokenKind::BroadcastMessage,
            TokenKind::ScreenShakeVertical,
            TokenKind::ScreenShakeHorizontal,
            TokenKind::ScreenShakeOmni,
            TokenKind::ScreenFlash,
            TokenKind::AudioPlay,
            TokenKind::AudioLoop,
            TokenKind::AudioPause,
            TokenKind::AudioStop,
        ]
    );
    assert_eq!(tokens[6].params, vec!["3", "0.2"]);
    assert_eq!(tokens[12].param(0), Some("Rain"));
}

#[test]
fn test_params_are_trimmed() {
    let tokens = tokenize("{punch= 10 ,  0.5 }");
    assert_eq!(tokens[0].params, vec!["10", "0.5"]);
}

#[test]
fn test_bare_punch_accepted() {
    let tokens = tokenize("{vpunch}{flash}");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::ScreenShakeVertical, TokenKind::ScreenFlash]
    );
}

// -------------------------------------------------------------------------
// 容错
// -------------------------------------------------------------------------

#[test]
fn test_unknown_tag_dropped() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize("a{frobnicate}b");
    assert_eq!(tokens, vec![Token::text("a"), Token::text("b")]);
    assert_eq!(
        tokenizer.warnings(),
        &[TagError::UnknownTag {
            tag: "frobnicate".to_string()
        }]
    );
}

#[test]
fn test_unknown_tag_alone() {
    assert!(tokenize("{frobnicate}").is_empty());
}

#[test]
fn test_tags_are_case_sensitive() {
    let mut tokenizer = Tokenizer::new();
    assert!(tokenizer.tokenize("{B}").is_empty());
    assert_eq!(tokenizer.warnings().len(), 1);
}

#[test]
fn test_eq_policy_violations() {
    let mut tokenizer = Tokenizer::new();
    // 裸标签不接受参数，必需参数的标签不接受裸形式
    let tokens = tokenizer.tokenize("{b=1}{color}{audio}{x=1}");
    assert!(tokens.is_empty());
    assert_eq!(tokenizer.warnings().len(), 4);
}

#[test]
fn test_empty_braces_malformed() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenizer.tokenize("a{}b");
    assert_eq!(tokens, vec![Token::text("a"), Token::text("b")]);
    assert!(matches!(tokenizer.warnings()[0], TagError::Malformed { .. }));
}

#[test]
fn test_unclosed_brace_is_text() {
    assert_eq!(tokenize("a {b"), vec![Token::text("a {b")]);
}

#[test]
fn test_tag_does_not_span_lines() {
    let tokens = tokenize("{oops\n{b}x");
    assert_eq!(
        tokens,
        vec![
            Token::text("{oops\n"),
            Token::directive(TokenKind::BoldOn),
            Token::text("x"),
        ]
    );
}

#[test]
fn test_non_greedy_match() {
    let tokens = tokenize("{b}x{/b}");
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_warnings_reset_between_calls() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.tokenize("{nope}");
    assert_eq!(tokenizer.warnings().len(), 1);
    tokenizer.tokenize("fine");
    assert!(tokenizer.warnings().is_empty());
}

// -------------------------------------------------------------------------
// 清屏后去空白 / 转义
// -------------------------------------------------------------------------

#[test]
fn test_trim_after_clear() {
    assert_eq!(
        tokenize("{c}   Hi"),
        vec![Token::directive(TokenKind::Clear), Token::text("Hi")]
    );
    assert_eq!(
        tokenize("{wc}\n\t Bye"),
        vec![
            Token::directive(TokenKind::WaitForInputAndClear),
            Token::text("Bye")
        ]
    );
}

#[test]
fn test_no_trim_after_other_tags() {
    assert_eq!(
        tokenize("{wi}  Hi"),
        vec![
            Token::directive(TokenKind::WaitForInputNoClear),
            Token::text("  Hi")
        ]
    );
}

#[test]
fn test_newline_escape_left_verbatim() {
    let tokens = tokenize("a\\nb");
    assert_eq!(tokens[0].as_text(), Some("a\\nb"));
    assert_eq!(resolve_escapes("a\\nb"), "a\nb");
}

#[test]
fn test_multibyte_text() {
    let tokens = tokenize("你好{b}世界{/b}");
    assert_eq!(tokens[0].as_text(), Some("你好"));
    assert_eq!(tokens[2].as_text(), Some("世界"));
}

// -------------------------------------------------------------------------
// 性质
// -------------------------------------------------------------------------

#[test]
fn test_tokenize_is_deterministic() {
    let inputs = [
        "",
        "Hello {b}World{/b}!",
        "{wc} a {nope} {w=1}b\\nc{x}",
        "{{b}}",
    ];
    for input in inputs {
        assert_eq!(tokenize(input), tokenize(input));
    }
}

#[test]
fn test_plain_text_concatenation_strips_directives() {
    let input = "Line one{w=0.2}\\nLine {b}two{/b}{m=Ping}{unknown}.";
    let joined: String = tokenize(input)
        .iter()
        .filter_map(Token::as_text)
        .map(resolve_escapes)
        .collect();
    assert_eq!(joined, "Line one\nLine two.");
}

#[test]
fn test_tag_help_lists_tags() {
    let help = tag_help();
    assert!(help.contains("{wc}"));
    assert!(help.contains("{audiostop=AudioObjectName}"));
}
