//! The Riddical compiler and interpreter.
//!
//! Compilation and execution share one process and one memory image: the
//! `Start` section becomes the instruction list, the `Data` section is
//! allocated straight into memory, and the interpreter then executes the
//! list against that same image. There is no bytecode step.
//!
//! `Compiler` is the facade the binary drives: hand it a file-path label
//! (for diagnostics) and the source text, then `compile` and `run`.

pub mod error;
pub mod interp;
pub mod lexer;
pub mod memory;
pub mod program;
pub mod value;

use std::io::{self, Write};

use error::{CompileError, RunError};
use interp::Interp;
use lexer::{find_section, tokenize, TokenClasses};
use memory::Memory;
use program::{parse_data, parse_instructions, Instr, Variable};

pub struct Compiler {
    file_path: String,
    source: String,
    classes: TokenClasses,
    instructions: Vec<Instr>,
    variables: Vec<Variable>,
    mem: Memory,
}

impl Compiler {
    pub fn new(file_path: &str) -> Self {
        Compiler {
            file_path: file_path.to_string(),
            source: String::new(),
            classes: TokenClasses::new(),
            instructions: Vec::new(),
            variables: Vec::new(),
            mem: Memory::new(),
        }
    }

    /// The file-path label used in diagnostics.
    pub fn path(&self) -> &str {
        &self.file_path
    }

    pub fn read_source(&mut self, text: &str) {
        self.source = text.to_string();
    }

    /// Translates the source into the instruction list and variable table,
    /// initializing memory first so compiling twice on one instance starts
    /// from a clean image both times.
    pub fn compile(&mut self) -> Result<(), CompileError> {
        let lines = tokenize(&self.source, '\n');
        if lines.is_empty() {
            return Err(CompileError::EmptySource);
        }

        let start = find_section(&lines, "Start")
            .ok_or(CompileError::MalformedSection("Start"))?;
        let data = find_section(&lines, "Data")
            .ok_or(CompileError::MalformedSection("Data"))?;
        if start.overlaps(&data) {
            return Err(CompileError::SectionOverlap);
        }
        debug!(
            "sections: Start {:?}, Data {:?}",
            start.body(),
            data.body()
        );

        self.mem.init();
        self.instructions = parse_instructions(&lines, start.body(), &self.classes)?;
        self.variables = parse_data(&lines, data.body(), &self.classes, &mut self.mem)?;
        debug!(
            "compiled {} instruction(s), {} variable(s)",
            self.instructions.len(),
            self.variables.len()
        );

        Ok(())
    }

    /// Executes the compiled program against its memory image, writing
    /// program output to `out`. Returns the program's exit value.
    pub fn run_with<W: Write>(&mut self, out: &mut W) -> Result<i32, RunError> {
        Interp::new(&self.instructions, &self.variables, &mut self.mem).run(out)
    }

    /// `run_with` against stdout.
    pub fn run(&mut self) -> Result<i32, RunError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let value = self.run_with(&mut out)?;
        out.flush()?;
        Ok(value)
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }
}
