//! Line tokenizer for directive commands, built on logos.
//!
//! A directive line splits on whitespace, except that a double-quoted
//! region (escapes allowed) becomes one token with the quotes stripped.
//! Two legacy line families are tokenized from fixed sub-patterns instead
//! of the generic rules: part lines beginning `1`, whose trailing file
//! name may contain spaces, and `0 MLCAD BTG <group>` tags whose group
//! name is the whole tail of the line.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Quoted(String),

    #[regex(r#"[^ \t\r\n"]+"#, |lex| lex.slice().to_string())]
    Word(String),
}

/// Strip the surrounding quotes and resolve `\"` and `\\` escapes.
fn unescape(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split one line into ordered tokens.
///
/// An unterminated quote stops tokenization at the malformed token; the
/// caller sees a short list and treats the line as a parse failure.
pub fn tokenize(line: &str) -> Vec<String> {
    if let Some(argv) = tokenize_part_line(line) {
        return argv;
    }
    if let Some(argv) = tokenize_group_tag(line) {
        return argv;
    }

    let mut argv = Vec::new();
    for token in RawToken::lexer(line) {
        match token {
            Ok(RawToken::Quoted(s)) | Ok(RawToken::Word(s)) => argv.push(s),
            Err(()) => break,
        }
    }
    argv
}

/// Part lines carry exactly fourteen fixed fields (line type, color, a
/// position vector and a rotation matrix) followed by a file name that may
/// itself contain spaces. The file name is one token.
fn tokenize_part_line(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with("1 ") {
        return None;
    }

    let mut argv = Vec::with_capacity(15);
    let mut rest = trimmed;
    for _ in 0..14 {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        argv.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    let name = rest.trim();
    if name.is_empty() {
        return None;
    }
    argv.push(name.to_string());
    Some(argv)
}

/// `0 MLCAD BTG <group name>` keeps the whole tail as one token.
fn tokenize_group_tag(line: &str) -> Option<Vec<String>> {
    let mut rest = line.trim_start();
    for expected in ["0", "MLCAD", "BTG"] {
        let end = rest.find(char::is_whitespace)?;
        if &rest[..end] != expected {
            return None;
        }
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        return None;
    }
    Some(vec![
        "0".to_string(),
        "MLCAD".to_string(),
        "BTG".to_string(),
        rest.trim_end().to_string(),
    ])
}
