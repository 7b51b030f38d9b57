//! The execution loop.
//!
//! Control flow is strictly linear: there are no branch opcodes, so the
//! machine runs Start's instruction list top to bottom until an `exit` or
//! the end of the list. Identifier operands are resolved against the
//! variable table on every step, into a per-step local; the stored program
//! is never mutated.

use std::io::Write;

use super::error::RunError;
use super::memory::Memory;
use super::program::{Instr, Operand, Variable, MAX_OPERANDS};

/// An operand after per-step resolution.
#[derive(Debug, Clone, Copy)]
enum Resolved {
    Literal(i32),
    Cell(u16),
    Empty,
}

pub struct Interp<'a> {
    instructions: &'a [Instr],
    variables: &'a [Variable],
    mem: &'a mut Memory,
}

impl<'a> Interp<'a> {
    pub fn new(
        instructions: &'a [Instr],
        variables: &'a [Variable],
        mem: &'a mut Memory,
    ) -> Self {
        Interp {
            instructions,
            variables,
            mem,
        }
    }

    /// Runs the program to completion, writing `write` output to `out`.
    /// Returns the program's exit value; falling off the end of the
    /// instruction list exits with 0.
    pub fn run<W: Write>(mut self, out: &mut W) -> Result<i32, RunError> {
        let mut exit_value = 0;

        for instr in self.instructions {
            if instr.is_label() {
                continue;
            }

            let mut args = [Resolved::Empty; MAX_OPERANDS];
            for (slot, arg) in instr.args.iter().enumerate() {
                args[slot] = self.resolve(arg)?;
            }

            debug!("step: {} {:?}", instr.name, args);
            match instr.name.as_str() {
                "exit" => {
                    exit_value = self.source_value(args[0]);
                    break;
                }
                "write" => self.write_op(out, args[0], args[1])?,
                "move" | "add" | "sub" | "mul" | "div" => {
                    self.bin_op(&instr.name, args[0], args[1])?
                }
                other => return Err(RunError::NotImplemented(other.to_string())),
            }
        }

        Ok(exit_value)
    }

    /// Linear first-match lookup; duplicate declarations shadow by order.
    fn resolve(&self, arg: &Operand) -> Result<Resolved, RunError> {
        match arg {
            Operand::Literal(v) => Ok(Resolved::Literal(*v)),
            Operand::Empty => Ok(Resolved::Empty),
            Operand::Identifier(name) => self
                .variables
                .iter()
                .find(|var| var.name == *name)
                .map(|var| Resolved::Cell(var.ptr))
                .ok_or_else(|| RunError::UnknownVariable(name.clone())),
        }
    }

    /// The value a source operand contributes: a literal as itself, a cell
    /// by its current contents, an empty slot as 0.
    fn source_value(&self, arg: Resolved) -> i32 {
        match arg {
            Resolved::Literal(v) => v,
            Resolved::Cell(ptr) => self.mem.read(ptr),
            Resolved::Empty => 0,
        }
    }

    /// `write src mode`. Mode 0 prints one character; mode 1 prints the
    /// zero-terminated run starting at src's pointer. A literal src under
    /// mode 1 degrades to the single character.
    fn write_op<W: Write>(
        &mut self,
        out: &mut W,
        src: Resolved,
        mode: Resolved,
    ) -> Result<(), RunError> {
        let mode = match mode {
            Resolved::Literal(m) => m,
            _ => return Err(RunError::BadWriteMode),
        };

        match (mode, src) {
            (0, src) => write_char(out, self.source_value(src))?,
            (1, Resolved::Cell(start)) => {
                let mut ptr = start;
                loop {
                    let v = self.mem.read(ptr);
                    if v == 0 {
                        break;
                    }
                    write_char(out, v)?;
                    ptr += 1;
                }
            }
            (1, src) => write_char(out, self.source_value(src))?,
            _ => return Err(RunError::BadWriteMode),
        }
        Ok(())
    }

    /// `move`/`add`/`sub`/`mul`/`div`: reads the destination cell, combines
    /// it with the source value, and writes the result back in the same
    /// step. The destination must resolve to a cell. Arithmetic wraps.
    fn bin_op(&mut self, op: &str, src: Resolved, dst: Resolved) -> Result<(), RunError> {
        let ptr = match dst {
            Resolved::Cell(ptr) => ptr,
            _ => return Err(RunError::BadDestination(op.to_string())),
        };

        let v = self.source_value(src);
        let old = self.mem.read(ptr);
        let result = match op {
            "move" => v,
            "add" => old.wrapping_add(v),
            "sub" => old.wrapping_sub(v),
            "mul" => old.wrapping_mul(v),
            "div" => {
                if v == 0 {
                    return Err(RunError::DivisionByZero);
                }
                old.wrapping_div(v)
            }
            other => return Err(RunError::NotImplemented(other.to_string())),
        };

        self.mem.write(ptr, result);
        Ok(())
    }
}

/// Prints a cell value as a character, the low byte of the value.
fn write_char<W: Write>(out: &mut W, v: i32) -> std::io::Result<()> {
    write!(out, "{}", (v as u8) as char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(name: &str, args: Vec<Operand>) -> Instr {
        let mut instr = Instr {
            name: name.to_string(),
            args: Default::default(),
        };
        for (slot, arg) in args.into_iter().enumerate() {
            instr.args[slot] = arg;
        }
        instr
    }

    fn var(name: &str, ptr: u16) -> Variable {
        Variable {
            name: name.to_string(),
            ptr,
        }
    }

    fn lit(v: i32) -> Operand {
        Operand::Literal(v)
    }

    fn ident(name: &str) -> Operand {
        Operand::Identifier(name.to_string())
    }

    fn run(
        instructions: &[Instr],
        variables: &[Variable],
        mem: &mut Memory,
    ) -> (Result<i32, RunError>, Vec<u8>) {
        let mut out = Vec::new();
        let result = Interp::new(instructions, variables, mem).run(&mut out);
        (result, out)
    }

    fn memory_with_x(initial: i32) -> (Memory, Vec<Variable>) {
        let mut mem = Memory::with_capacity(16);
        let ptr = mem.allocate_and_fill(&[initial]);
        (mem, vec![var("x", ptr)])
    }

    #[test]
    fn test_add_literal_to_variable() {
        let (mut mem, vars) = memory_with_x(5);
        let prog = [instr("add", vec![lit(3), ident("x")])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 0);
        assert_eq!(mem.read(vars[0].ptr), 8);
    }

    #[test]
    fn test_move_sub_mul_div() {
        let (mut mem, vars) = memory_with_x(0);
        let prog = [
            instr("move", vec![lit(10), ident("x")]),
            instr("sub", vec![lit(4), ident("x")]),
            instr("mul", vec![lit(5), ident("x")]),
            instr("div", vec![lit(3), ident("x")]),
            instr("exit", vec![ident("x")]),
        ];
        let (result, _) = run(&prog, &vars, &mut mem);
        // ((10 - 4) * 5) / 3
        assert_eq!(result.unwrap(), 10);
    }

    #[test]
    fn test_div_by_zero() {
        let (mut mem, vars) = memory_with_x(5);
        let prog = [instr("div", vec![lit(0), ident("x")])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert!(matches!(result, Err(RunError::DivisionByZero)));
    }

    #[test]
    fn test_bin_op_destination_must_be_cell() {
        let (mut mem, vars) = memory_with_x(5);
        let prog = [instr("add", vec![ident("x"), lit(3)])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert!(matches!(result, Err(RunError::BadDestination(_))));

        let prog = [instr("add", vec![lit(3)])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert!(matches!(result, Err(RunError::BadDestination(_))));
    }

    #[test]
    fn test_exit_value() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("exit", vec![lit(7)])];
        let (result, _) = run(&prog, &[], &mut mem);
        assert_eq!(result.unwrap(), 7);

        let (mut mem, vars) = memory_with_x(42);
        let prog = [
            instr("exit", vec![ident("x")]),
            // Nothing past an exit executes.
            instr("move", vec![lit(0), ident("x")]),
        ];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 42);
        assert_eq!(mem.read(vars[0].ptr), 42);
    }

    #[test]
    fn test_end_of_program_exits_zero() {
        let (mut mem, vars) = memory_with_x(5);
        let prog = [instr("add", vec![lit(1), ident("x")])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_write_char_mode() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("write", vec![lit(72), lit(0)])];
        let (result, out) = run(&prog, &[], &mut mem);
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, b"H");
    }

    #[test]
    fn test_write_string_mode() {
        let mut mem = Memory::with_capacity(16);
        let ptr = mem.allocate_and_fill(&[72, 105, 0]);
        let vars = vec![var("msg", ptr)];
        let prog = [instr("write", vec![ident("msg"), lit(1)])];
        let (result, out) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, b"Hi");
    }

    #[test]
    fn test_write_string_mode_with_literal_prints_one_char() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("write", vec![lit(72), lit(1)])];
        let (_, out) = run(&prog, &[], &mut mem);
        assert_eq!(out, b"H");
    }

    #[test]
    fn test_write_bad_mode() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("write", vec![lit(72), lit(2)])];
        let (result, _) = run(&prog, &[], &mut mem);
        assert!(matches!(result, Err(RunError::BadWriteMode)));

        let (mut mem, vars) = memory_with_x(1);
        let prog = [instr("write", vec![lit(72), ident("x")])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert!(matches!(result, Err(RunError::BadWriteMode)));
    }

    #[test]
    fn test_unknown_variable() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("exit", vec![ident("ghost")])];
        let (result, _) = run(&prog, &[], &mut mem);
        assert!(matches!(result, Err(RunError::UnknownVariable(_))));
    }

    #[test]
    fn test_duplicate_names_shadow_by_declaration_order() {
        let mut mem = Memory::with_capacity(16);
        let p1 = mem.allocate_and_fill(&[1]);
        let p2 = mem.allocate_and_fill(&[2]);
        let vars = vec![var("x", p1), var("x", p2)];
        let prog = [instr("exit", vec![ident("x")])];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_unknown_opcode() {
        let mut mem = Memory::with_capacity(16);
        let prog = [instr("jump", vec![lit(0)])];
        let (result, _) = run(&prog, &[], &mut mem);
        let err = result.unwrap_err();
        assert_eq!(err.status(), -2);
        assert!(matches!(err, RunError::NotImplemented(_)));
    }

    #[test]
    fn test_labels_are_inert() {
        let (mut mem, vars) = memory_with_x(5);
        let prog = [
            instr("loop:", vec![]),
            instr("exit", vec![ident("x")]),
        ];
        let (result, _) = run(&prog, &vars, &mut mem);
        assert_eq!(result.unwrap(), 5);
    }
}
