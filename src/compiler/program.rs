//! Parsing of the two section bodies into executable form.
//!
//! There is no intermediate representation: the `Start` walk yields the
//! final instruction list and the `Data` walk allocates and initializes
//! memory as it goes, yielding the variable table. Lines beginning with
//! `;;` are comments in both sections.

use std::ops::Range;

use super::error::CompileError;
use super::lexer::{tokenize, TokenClasses};
use super::memory::Memory;
use super::value::parse_value;

pub const MAX_OPERANDS: usize = 4;

/// One operand slot. Identifiers resolve to a pointer at execution time,
/// never at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(i32),
    Identifier(String),
    Empty,
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Empty
    }
}

/// One parsed instruction: an opcode (or label) name and its operand slots,
/// unused trailing slots left `Empty`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    pub name: String,
    pub args: [Operand; MAX_OPERANDS],
}

impl Instr {
    /// Labels are accepted with zero operands and are inert at execution;
    /// nothing references them.
    pub fn is_label(&self) -> bool {
        self.name.ends_with(':')
    }
}

/// One `Data` declaration, in declaration order. Lookup is first-match, so
/// a duplicate name shadows later declarations of itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ptr: u16,
}

/// Walks the `Start` body producing the instruction list.
pub fn parse_instructions(
    lines: &[String],
    body: Range<usize>,
    classes: &TokenClasses,
) -> Result<Vec<Instr>, CompileError> {
    let mut instructions = Vec::new();

    for i in body {
        let line = &lines[i];
        if line.starts_with(";;") {
            continue;
        }

        let words = tokenize(line, ' ');
        if !classes.is_opcode(&words[0]) {
            return Err(CompileError::UnexpectedToken {
                line: i,
                token: words[0].clone(),
            });
        }

        let mut instr = Instr {
            name: words[0].clone(),
            args: Default::default(),
        };

        if instr.is_label() {
            if words.len() > 1 {
                return Err(CompileError::UnexpectedToken {
                    line: i,
                    token: words[1].clone(),
                });
            }
        } else if words.len() == 1 {
            return Err(CompileError::MissingArguments {
                line: i,
                name: instr.name,
            });
        }

        if words.len() > 1 + MAX_OPERANDS {
            return Err(CompileError::UnexpectedToken {
                line: i,
                token: words[1 + MAX_OPERANDS].clone(),
            });
        }

        for (slot, word) in words.iter().skip(1).enumerate() {
            instr.args[slot] = if classes.is_number(word) {
                let lit = word.parse::<i32>().map_err(|_| CompileError::UnexpectedToken {
                    line: i,
                    token: word.clone(),
                })?;
                Operand::Literal(lit)
            } else if classes.is_ident(word) {
                Operand::Identifier(word.clone())
            } else {
                return Err(CompileError::UnexpectedToken {
                    line: i,
                    token: word.clone(),
                });
            };
        }

        instructions.push(instr);
    }

    Ok(instructions)
}

/// Walks the `Data` body, allocating each declaration and appending it to
/// the variable table. Exhausting memory here is not an ordinary parse
/// failure; the caller maps `OutOfMemory` to its own dedicated exit path.
pub fn parse_data(
    lines: &[String],
    body: Range<usize>,
    classes: &TokenClasses,
    mem: &mut Memory,
) -> Result<Vec<Variable>, CompileError> {
    let mut variables = Vec::new();

    for i in body {
        let line = &lines[i];
        if line.starts_with(";;") {
            continue;
        }

        let words = tokenize(line, ' ');
        if !classes.is_ident(&words[0]) {
            return Err(CompileError::UnexpectedToken {
                line: i,
                token: words[0].clone(),
            });
        }
        if words.len() < 2 {
            return Err(CompileError::BadDeclaration {
                line: i,
                reason: "expected `= <value>` or `var <size>`",
            });
        }

        let ptr = match words[1].as_str() {
            "=" => {
                let expr = words[2..].join(" ");
                let values = parse_value(&expr).map_err(|token| {
                    CompileError::UnexpectedToken { line: i, token }
                })?;
                if values.is_empty() {
                    return Err(CompileError::BadDeclaration {
                        line: i,
                        reason: "missing value",
                    });
                }
                let ptr = mem.allocate_and_fill(&values);
                if ptr == 0 {
                    return Err(CompileError::OutOfMemory);
                }
                debug!("allocated {} cell(s) at {} for {}", values.len(), ptr, words[0]);
                ptr
            }
            "var" => {
                if words.len() != 3 {
                    return Err(CompileError::BadDeclaration {
                        line: i,
                        reason: "var takes exactly one size",
                    });
                }
                let size = match words[2].parse::<usize>() {
                    Ok(size) if size > 0 => size,
                    _ => {
                        return Err(CompileError::BadDeclaration {
                            line: i,
                            reason: "size must be a positive number",
                        })
                    }
                };
                let ptr = mem.allocate(size);
                if ptr == 0 {
                    return Err(CompileError::OutOfMemory);
                }
                debug!("allocated {} cell(s) at {} for {}", size, ptr, words[0]);
                ptr
            }
            other => {
                return Err(CompileError::UnexpectedToken {
                    line: i,
                    token: other.to_string(),
                });
            }
        };

        variables.push(Variable {
            name: words[0].clone(),
            ptr,
        });
    }

    Ok(variables)
}
