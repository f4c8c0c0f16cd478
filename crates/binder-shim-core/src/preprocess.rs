//! Minimal conditional-directive evaluator for the rendered headers.
//!
//! Understands exactly what the shim and wrapper headers use: `#ifndef`,
//! `#ifdef`, `#if defined(X)`, `#if !defined(X)`, `#else`, `#endif`,
//! `#define`, `#undef`, `#include`, `typedef` lines and C comments. Anything
//! else inside an active region is rejected rather than guessed at.

use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("line {line}: #else without matching #if")]
    StrayElse { line: usize },
    #[error("line {line}: duplicate #else")]
    DuplicateElse { line: usize },
    #[error("line {line}: #endif without matching #if")]
    StrayEndif { line: usize },
    #[error("line {line}: conditional is never closed")]
    Unterminated { line: usize },
    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },
    #[error("line {line}: unsupported directive `#{directive}`")]
    UnsupportedDirective { line: usize, directive: String },
    #[error("line {line}: cannot interpret `{text}`")]
    Malformed { line: usize, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typedef {
    pub c_type: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub path: String,
    /// `<...>` rather than `"..."`.
    pub system: bool,
}

/// What survived preprocessing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub typedefs: Vec<Typedef>,
    pub includes: Vec<IncludeDirective>,
    pub defined: BTreeSet<String>,
}

impl Evaluation {
    #[must_use]
    pub fn typedef(&self, name: &str) -> Option<&Typedef> {
        self.typedefs.iter().find(|t| t.name == name)
    }
}

#[derive(Debug)]
struct Frame {
    opened_at: usize,
    parent_active: bool,
    taken: bool,
    seen_else: bool,
}

impl Frame {
    fn active(&self) -> bool {
        self.parent_active && self.taken
    }
}

/// Evaluate `text` with `predefined` macros already set.
pub fn evaluate(text: &str, predefined: &BTreeSet<String>) -> Result<Evaluation, PreprocessError> {
    let mut eval = Evaluation {
        defined: predefined.clone(),
        ..Evaluation::default()
    };
    let mut stack: Vec<Frame> = Vec::new();
    let mut in_comment: Option<usize> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comments(raw, &mut in_comment, line_no);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let active = stack.last().is_none_or(Frame::active);

        if let Some(directive) = line.strip_prefix('#') {
            let directive = directive.trim_start();
            let (keyword, rest) = split_keyword(directive);
            match keyword {
                "ifdef" | "ifndef" | "if" => {
                    let cond = if active {
                        condition(keyword, rest, &eval.defined, line_no)?
                    } else {
                        false
                    };
                    stack.push(Frame {
                        opened_at: line_no,
                        parent_active: active,
                        taken: cond,
                        seen_else: false,
                    });
                }
                "else" => {
                    let frame = stack
                        .last_mut()
                        .ok_or(PreprocessError::StrayElse { line: line_no })?;
                    if frame.seen_else {
                        return Err(PreprocessError::DuplicateElse { line: line_no });
                    }
                    frame.seen_else = true;
                    frame.taken = !frame.taken;
                }
                "endif" => {
                    stack
                        .pop()
                        .ok_or(PreprocessError::StrayEndif { line: line_no })?;
                }
                "define" if active => {
                    let name = macro_name(rest, line_no)?;
                    eval.defined.insert(name);
                }
                "undef" if active => {
                    let name = macro_name(rest, line_no)?;
                    eval.defined.remove(&name);
                }
                "include" if active => eval.includes.push(parse_include(rest, line_no)?),
                "define" | "undef" | "include" => {}
                other if active => {
                    return Err(PreprocessError::UnsupportedDirective {
                        line: line_no,
                        directive: other.to_string(),
                    });
                }
                _ => {}
            }
            continue;
        }

        if active {
            eval.typedefs.push(parse_typedef(line, line_no)?);
        }
    }

    if let Some(line) = in_comment {
        return Err(PreprocessError::UnterminatedComment { line });
    }
    if let Some(frame) = stack.last() {
        return Err(PreprocessError::Unterminated {
            line: frame.opened_at,
        });
    }
    Ok(eval)
}

fn strip_comments(raw: &str, in_comment: &mut Option<usize>, line_no: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        if in_comment.is_some() {
            match rest.find("*/") {
                Some(end) => {
                    *in_comment = None;
                    rest = &rest[end + 2..];
                }
                None => return out,
            }
        }
        let block = rest.find("/*");
        let line = rest.find("//");
        match (block, line) {
            (Some(b), Some(l)) if l < b => {
                out.push_str(&rest[..l]);
                return out;
            }
            (Some(b), _) => {
                out.push_str(&rest[..b]);
                out.push(' ');
                *in_comment = Some(line_no);
                rest = &rest[b + 2..];
            }
            (None, Some(l)) => {
                out.push_str(&rest[..l]);
                return out;
            }
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

fn split_keyword(directive: &str) -> (&str, &str) {
    let end = directive
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(directive.len());
    (&directive[..end], directive[end..].trim())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn macro_name(rest: &str, line_no: usize) -> Result<String, PreprocessError> {
    let name = rest.split_whitespace().next().unwrap_or("");
    if is_identifier(name) {
        Ok(name.to_string())
    } else {
        Err(PreprocessError::Malformed {
            line: line_no,
            text: rest.to_string(),
        })
    }
}

fn condition(
    keyword: &str,
    rest: &str,
    defined: &BTreeSet<String>,
    line_no: usize,
) -> Result<bool, PreprocessError> {
    match keyword {
        "ifdef" => Ok(defined.contains(&macro_name(rest, line_no)?)),
        "ifndef" => Ok(!defined.contains(&macro_name(rest, line_no)?)),
        _ => {
            let (negate, expr) = match rest.strip_prefix('!') {
                Some(e) => (true, e.trim_start()),
                None => (false, rest),
            };
            let inner = expr
                .strip_prefix("defined")
                .map(str::trim)
                .ok_or_else(|| PreprocessError::Malformed {
                    line: line_no,
                    text: rest.to_string(),
                })?;
            let inner = inner
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or(inner)
                .trim();
            let name = macro_name(inner, line_no)?;
            if inner != name {
                return Err(PreprocessError::Malformed {
                    line: line_no,
                    text: rest.to_string(),
                });
            }
            Ok(defined.contains(&name) != negate)
        }
    }
}

fn parse_include(rest: &str, line_no: usize) -> Result<IncludeDirective, PreprocessError> {
    let malformed = || PreprocessError::Malformed {
        line: line_no,
        text: rest.to_string(),
    };
    if let Some(path) = rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        return Ok(IncludeDirective {
            path: path.to_string(),
            system: true,
        });
    }
    let path = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .ok_or_else(malformed)?;
    Ok(IncludeDirective {
        path: path.to_string(),
        system: false,
    })
}

fn parse_typedef(line: &str, line_no: usize) -> Result<Typedef, PreprocessError> {
    let malformed = || PreprocessError::Malformed {
        line: line_no,
        text: line.to_string(),
    };
    let body = line
        .strip_prefix("typedef")
        .and_then(|b| b.strip_suffix(';'))
        .ok_or_else(malformed)?;
    let words: Vec<&str> = body.split_whitespace().collect();
    let (name, c_type) = words.split_last().ok_or_else(malformed)?;
    if c_type.is_empty() || !is_identifier(name) {
        return Err(malformed());
    }
    Ok(Typedef {
        c_type: c_type.join(" "),
        name: (*name).to_string(),
    })
}
