//! Bootstrap module compiler
//!
//! A bootstrap module is a line-oriented script:
//!
//! ```text
//! # comment
//! stylesheet <url> [media]
//! script <url>
//! components <url-pattern>        # pattern contains {component}
//! mount <tag> [name=value ...]
//! capture-attributes [key]
//! set <key> <json>
//! render
//! resolve
//! reject <message>
//! ```
//!
//! Arguments may use `{resources}`, `{template}` and `{wrapper}`;
//! `{component}` is only valid in a `components` pattern. Everything is
//! checked here so that a module which compiles can only fail at run time
//! because of a failed load or render.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Placeholders available to every instruction
const PLACEHOLDERS: &[&str] = &["resources", "template", "wrapper"];
const COMPONENT_PLACEHOLDER: &str = "component";

/// Globals key used by `capture-attributes` when none is given
pub const DEFAULT_ATTRIBUTES_KEY: &str = "attributes";

/// Errors found while compiling a bootstrap module
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("line {line}: unknown instruction '{name}'")]
    UnknownInstruction { line: usize, name: String },

    #[error("line {line}: '{instruction}' expects {expected}")]
    MissingArgument {
        line: usize,
        instruction: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: unexpected argument '{argument}' for '{instruction}'")]
    UnexpectedArgument {
        line: usize,
        instruction: &'static str,
        argument: String,
    },

    #[error("line {line}: unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder { line: usize, name: String },

    #[error("line {line}: unterminated placeholder")]
    UnterminatedPlaceholder { line: usize },

    #[error("line {line}: 'components' pattern must contain {{component}}")]
    MissingComponentPlaceholder { line: usize },

    #[error("line {line}: invalid attribute '{attribute}', expected name=value")]
    InvalidAttribute { line: usize, attribute: String },

    #[error("line {line}: invalid JSON value: {reason}")]
    InvalidJson { line: usize, reason: String },

    #[error("line {line}: instruction after '{settled_by}' is never reached")]
    Unreachable { line: usize, settled_by: &'static str },
}

/// Values substituted into instruction arguments
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub resources: &'a str,
    pub template: &'a str,
    pub wrapper: &'a str,
    pub component: Option<&'a str>,
}

impl<'a> Scope<'a> {
    fn value(&self, name: &str) -> Option<&'a str> {
        match name {
            "resources" => Some(self.resources),
            "template" => Some(self.template),
            "wrapper" => Some(self.wrapper),
            COMPONENT_PLACEHOLDER => self.component,
            _ => None,
        }
    }
}

/// An argument with validated `{placeholder}`s
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(String);

impl Text {
    fn parse(raw: &str, line: usize, allow_component: bool) -> Result<Self, CompileError> {
        for name in placeholders(raw, line)? {
            let known = PLACEHOLDERS.contains(&name) || (allow_component && name == COMPONENT_PLACEHOLDER);
            if !known {
                return Err(CompileError::UnknownPlaceholder {
                    line,
                    name: name.to_string(),
                });
            }
        }
        Ok(Self(raw.to_string()))
    }

    fn mentions(&self, name: &str) -> bool {
        self.0.contains(&format!("{{{}}}", name))
    }

    /// Substitute placeholders in one left-to-right pass
    ///
    /// Substituted values are copied verbatim and never rescanned. A
    /// `{component}` outside a component scope is left as written.
    pub fn render(&self, scope: &Scope<'_>) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let name = &after[..close];
            match scope.value(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn placeholders(raw: &str, line: usize) -> Result<Vec<&str>, CompileError> {
    let mut names = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or(CompileError::UnterminatedPlaceholder { line })?;
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// One step of a bootstrap module
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Stylesheet { url: Text, media: Option<String> },
    Script { url: Text },
    Components { pattern: Text },
    Mount { tag: String, attributes: Vec<(String, Text)> },
    CaptureAttributes { key: String },
    Set { key: String, value: Value },
    Render,
    Resolve,
    Reject { message: Text },
}

impl Instruction {
    /// Whether the instruction settles the bootstrap
    pub fn settles(&self) -> Option<&'static str> {
        match self {
            Self::Resolve => Some("resolve"),
            Self::Reject { .. } => Some("reject"),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stylesheet { url, media } => match media {
                Some(media) => write!(f, "stylesheet {} {}", url, media),
                None => write!(f, "stylesheet {}", url),
            },
            Self::Script { url } => write!(f, "script {}", url),
            Self::Components { pattern } => write!(f, "components {}", pattern),
            Self::Mount { tag, attributes } => {
                write!(f, "mount {}", tag)?;
                for (name, value) in attributes {
                    write!(f, " {}={}", name, value)?;
                }
                Ok(())
            }
            Self::CaptureAttributes { key } => write!(f, "capture-attributes {}", key),
            Self::Set { key, value } => write!(f, "set {} {}", key, value),
            Self::Render => write!(f, "render"),
            Self::Resolve => write!(f, "resolve"),
            Self::Reject { message } => write!(f, "reject {}", message),
        }
    }
}

/// A compiled bootstrap module: instructions with their source line numbers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub instructions: Vec<(usize, Instruction)>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether the program settles on its own once every step succeeded
    pub fn settles(&self) -> bool {
        self.instructions.last().and_then(|(_, i)| i.settles()).is_some()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, instruction) in &self.instructions {
            writeln!(f, "{:>4}  {}", line, instruction)?;
        }
        Ok(())
    }
}

/// Compile a bootstrap module's source text
pub fn compile(source: &str) -> Result<Program, CompileError> {
    debug!(source_len = source.len(), "compile: called");
    let mut program = Program::default();
    let mut settled_by: Option<&'static str> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw_line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        if let Some(settled_by) = settled_by {
            debug!(line, "compile: instruction after settlement");
            return Err(CompileError::Unreachable { line, settled_by });
        }

        let instruction = parse_line(text, line)?;
        settled_by = instruction.settles();
        program.instructions.push((line, instruction));
    }

    debug!(instructions = program.len(), "compile: done");
    Ok(program)
}

fn parse_line(text: &str, line: usize) -> Result<Instruction, CompileError> {
    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (text, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match keyword {
        "stylesheet" => {
            let (url, media) = match args.as_slice() {
                [url] => (*url, None),
                [url, media] => (*url, Some(media.to_string())),
                [] => return Err(missing(line, "stylesheet", "a URL and an optional media")),
                [_, _, extra, ..] => return Err(unexpected(line, "stylesheet", extra)),
            };
            Ok(Instruction::Stylesheet {
                url: Text::parse(url, line, false)?,
                media,
            })
        }
        "script" => {
            let url = single(&args, line, "script", "a URL")?;
            Ok(Instruction::Script {
                url: Text::parse(url, line, false)?,
            })
        }
        "components" => {
            let raw = single(&args, line, "components", "a URL pattern")?;
            let pattern = Text::parse(raw, line, true)?;
            if !pattern.mentions(COMPONENT_PLACEHOLDER) {
                return Err(CompileError::MissingComponentPlaceholder { line });
            }
            Ok(Instruction::Components { pattern })
        }
        "mount" => {
            let Some((tag, attrs)) = args.split_first() else {
                return Err(missing(line, "mount", "a tag name"));
            };
            let attributes = attrs
                .iter()
                .map(|attr| match attr.split_once('=') {
                    Some((name, value)) if !name.is_empty() => {
                        Ok((name.to_string(), Text::parse(value, line, false)?))
                    }
                    _ => Err(CompileError::InvalidAttribute {
                        line,
                        attribute: attr.to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Instruction::Mount {
                tag: tag.to_string(),
                attributes,
            })
        }
        "capture-attributes" => {
            let key = match args.as_slice() {
                [] => DEFAULT_ATTRIBUTES_KEY.to_string(),
                [key] => key.to_string(),
                [_, extra, ..] => return Err(unexpected(line, "capture-attributes", extra)),
            };
            Ok(Instruction::CaptureAttributes { key })
        }
        "set" => {
            let Some((key, json)) = rest.split_once(char::is_whitespace) else {
                return Err(missing(line, "set", "a key and a JSON value"));
            };
            let value = serde_json::from_str(json.trim()).map_err(|e| CompileError::InvalidJson {
                line,
                reason: e.to_string(),
            })?;
            Ok(Instruction::Set {
                key: key.to_string(),
                value,
            })
        }
        "render" => none(&args, line, "render").map(|_| Instruction::Render),
        "resolve" => none(&args, line, "resolve").map(|_| Instruction::Resolve),
        "reject" => {
            if rest.is_empty() {
                return Err(missing(line, "reject", "a message"));
            }
            Ok(Instruction::Reject {
                message: Text::parse(rest, line, false)?,
            })
        }
        other => Err(CompileError::UnknownInstruction {
            line,
            name: other.to_string(),
        }),
    }
}

fn single<'a>(
    args: &[&'a str],
    line: usize,
    instruction: &'static str,
    expected: &'static str,
) -> Result<&'a str, CompileError> {
    match args {
        [arg] => Ok(*arg),
        [] => Err(missing(line, instruction, expected)),
        [_, extra, ..] => Err(unexpected(line, instruction, extra)),
    }
}

fn none(args: &[&str], line: usize, instruction: &'static str) -> Result<(), CompileError> {
    match args.first() {
        None => Ok(()),
        Some(extra) => Err(unexpected(line, instruction, extra)),
    }
}

fn missing(line: usize, instruction: &'static str, expected: &'static str) -> CompileError {
    CompileError::MissingArgument {
        line,
        instruction,
        expected,
    }
}

fn unexpected(line: usize, instruction: &'static str, argument: &str) -> CompileError {
    CompileError::UnexpectedArgument {
        line,
        instruction,
        argument: argument.to_string(),
    }
}
