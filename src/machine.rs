/*!

  Structures and functions for the IntCode virtual machine: the registers, the
  decode–dispatch loop, and the cooperative suspension protocol.

  A machine runs until it halts or until an `Input` instruction finds its
  input queue empty. The empty queue is not an error; `run` returns
  `Run::Suspended` with the instruction pointer still on the `Input`
  instruction, so the caller can feed the queue and call `run` again to retry
  the very same instruction. This is what lets several machines interleave on
  one thread: a driver runs each machine to its own suspension or halt before
  moving on, and FIFO queues keep the ordering deterministic.

*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::channel::Channel;
use crate::error::MachineError;
use crate::instruction::{Instruction, Mode, Opcode};
use crate::memory::Memory;
use crate::program::Program;

/// Outcome of executing a single instruction.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Step {
  /// The instruction completed and the machine can take another step.
  Continue,
  /// The instruction completed and enqueued this value on the output channel.
  Output(i64),
  /// `Input` found the input queue empty; the instruction pointer did not move.
  Suspended,
  /// `Halt` executed; the machine is in its terminal state.
  Halted,
}

/// Outcome of running until the machine can make no further progress on its own.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Run {
  Halted,
  Suspended,
}

pub struct Machine {

  // Flags
  halted: bool, // Terminal state; a halted machine must not be resumed

  // Memory store
  memory: Memory,

  // Registers //
  ip            : usize, // Instruction Pointer, index of the next instruction
  relative_base : i64,   // Offset applied to relative-mode operands

  // I/O channels. Shared by reference with the driver or with sibling
  // machines in a ring.
  input  : Channel,
  output : Channel,

}

impl Machine {

  // region Construction and accessors

  /// Builds a machine over a fresh memory copy of `program`, with private
  /// I/O channels.
  pub fn new(program: &Program) -> Machine {
    Machine::with_channels(program, Channel::new(), Channel::new())
  }

  /// Builds a machine whose I/O runs over the given shared channels.
  pub fn with_channels(program: &Program, input: Channel, output: Channel) -> Machine {
    Machine {
      halted        : false,
      memory        : Memory::load(program),
      ip            : 0,
      relative_base : 0,
      input,
      output,
    }
  }

  pub fn is_halted(&self) -> bool {
    self.halted
  }

  pub fn instruction_pointer(&self) -> usize {
    self.ip
  }

  pub fn relative_base(&self) -> i64 {
    self.relative_base
  }

  /// Reads a memory cell without executing anything.
  pub fn read(&self, address: usize) -> i64 {
    self.memory.read(address)
  }

  /// A handle to the input queue. Values pushed here are consumed by `Input`
  /// instructions in FIFO order.
  pub fn input(&self) -> Channel {
    self.input.clone()
  }

  /// A handle to the output queue, fed by `Output` instructions.
  pub fn output(&self) -> Channel {
    self.output.clone()
  }

  /// Convenience for drivers: append one input value.
  pub fn push_input(&self, value: i64) {
    self.input.push(value);
  }

  /// Convenience for drivers: harvest everything produced so far.
  pub fn drain_output(&self) -> Vec<i64> {
    self.output.drain()
  }

  // endregion

  // region Decode–dispatch loop

  /**
    Executes instructions until the machine halts or suspends on empty input.

    The caller is expected to drain the output channel after each return and
    to replenish the input channel before calling `run` again. Calling `run`
    on a machine that has already halted is an error, not a no-op; the
    distinction matters to ring drivers, which must never revisit a halted
    machine.
  */
  pub fn run(&mut self) -> Result<Run, MachineError> {
    loop {
      match self.step()? {

        | Step::Continue
        | Step::Output(_) => {
          continue;
        }

        Step::Suspended   => {
          return Ok(Run::Suspended);
        }

        Step::Halted      => {
          return Ok(Run::Halted);
        }

      }
    }
  }

  /// Decodes and executes the single instruction at the instruction pointer.
  pub fn step(&mut self) -> Result<Step, MachineError> {
    if self.halted {
      return Err(MachineError::ResumedAfterHalt);
    }

    let word        = self.memory.read(self.ip);
    let instruction = Instruction::decode(word, self.ip)?;

    #[cfg(feature = "trace_computation")]
      println!("M[{}] = {}: {}", self.ip, word, instruction);

    let step = match instruction.opcode {
      Opcode::Add                => self.add(&instruction)?,
      Opcode::Multiply           => self.multiply(&instruction)?,
      Opcode::Input              => self.read_input(&instruction)?,
      Opcode::Output             => self.write_output(&instruction)?,
      Opcode::JumpIfTrue         => self.jump_if_true(&instruction)?,
      Opcode::JumpIfFalse        => self.jump_if_false(&instruction)?,
      Opcode::LessThan           => self.less_than(&instruction)?,
      Opcode::Equals             => self.equals(&instruction)?,
      Opcode::AdjustRelativeBase => self.adjust_relative_base(&instruction)?,
      Opcode::Halt               => self.halt(),
    };

    #[cfg(feature = "trace_computation")]
      println!("{}", self);

    Ok(step)
  }

  // endregion

  // region Operand resolution

  /**
    Resolves the value of operand `slot` (1, 2, or 3) of the instruction at
    the instruction pointer. Pure with respect to machine state.
  */
  fn value(&self, instruction: &Instruction, slot: usize) -> Result<i64, MachineError> {
    let literal = self.memory.read(self.ip + slot);
    match instruction.modes[slot - 1] {

      Mode::Immediate => Ok(literal),

      Mode::Position  => {
        let address = to_address(literal)?;
        Ok(self.memory.read(address))
      }

      Mode::Relative  => {
        let address = to_address(self.relative_base + literal)?;
        Ok(self.memory.read(address))
      }

    }
  }

  /**
    Resolves the effective address of write-target operand `slot`. Immediate
    mode is never a legal write target; the original machine silently treated
    it as the literal cell, which no well-formed program relies on, so here it
    is a fatal error.
  */
  fn address(&self, instruction: &Instruction, slot: usize) -> Result<usize, MachineError> {
    let literal = self.memory.read(self.ip + slot);
    match instruction.modes[slot - 1] {
      Mode::Position  => to_address(literal),
      Mode::Relative  => to_address(self.relative_base + literal),
      Mode::Immediate => Err(MachineError::ImmediateWriteTarget(self.ip + slot))
    }
  }

  // endregion

  // region VM instruction methods

  fn add(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a   = self.value(instruction, 1)?;
    let b   = self.value(instruction, 2)?;
    let dst = self.address(instruction, 3)?;
    #[cfg(feature = "trace_computation")]
      println!("add: M[{}] <- {} + {}", dst, a, b);

    self.memory.write(dst, a + b);
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  fn multiply(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a   = self.value(instruction, 1)?;
    let b   = self.value(instruction, 2)?;
    let dst = self.address(instruction, 3)?;
    #[cfg(feature = "trace_computation")]
      println!("multiply: M[{}] <- {} * {}", dst, a, b);

    self.memory.write(dst, a * b);
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  /**
    Dequeues one input value into the target cell, or suspends if the queue is
    empty. On suspension the instruction pointer is left on this instruction
    so that the next `run` retries it unchanged.
  */
  fn read_input(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let value = match self.input.pop() {
      Some(value) => value,
      None        => {
        #[cfg(feature = "trace_computation")]
          println!("input: queue empty, suspending at M[{}]", self.ip);
        return Ok(Step::Suspended);
      }
    };

    let dst = self.address(instruction, 1)?;
    #[cfg(feature = "trace_computation")]
      println!("input: M[{}] <- {}", dst, value);

    self.memory.write(dst, value);
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  fn write_output(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a = self.value(instruction, 1)?;
    #[cfg(feature = "trace_computation")]
      println!("output: {}", a);

    self.output.push(a);
    self.ip += instruction.opcode.width();
    Ok(Step::Output(a))
  }

  fn jump_if_true(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a = self.value(instruction, 1)?;
    let b = self.value(instruction, 2)?;
    self.ip = match a != 0 {
      true  => to_address(b)?,
      false => self.ip + instruction.opcode.width()
    };
    Ok(Step::Continue)
  }

  fn jump_if_false(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a = self.value(instruction, 1)?;
    let b = self.value(instruction, 2)?;
    self.ip = match a == 0 {
      true  => to_address(b)?,
      false => self.ip + instruction.opcode.width()
    };
    Ok(Step::Continue)
  }

  fn less_than(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a   = self.value(instruction, 1)?;
    let b   = self.value(instruction, 2)?;
    let dst = self.address(instruction, 3)?;
    self.memory.write(dst, (a < b) as i64);
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  fn equals(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a   = self.value(instruction, 1)?;
    let b   = self.value(instruction, 2)?;
    let dst = self.address(instruction, 3)?;
    self.memory.write(dst, (a == b) as i64);
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  fn adjust_relative_base(&mut self, instruction: &Instruction) -> Result<Step, MachineError> {
    let a = self.value(instruction, 1)?;
    #[cfg(feature = "trace_computation")]
      println!("adjust_relative_base: {} + {} = {}",
               self.relative_base, a, self.relative_base + a);

    self.relative_base += a;
    self.ip += instruction.opcode.width();
    Ok(Step::Continue)
  }

  /// The instruction pointer stays on the `Halt` instruction.
  fn halt(&mut self) -> Step {
    self.halted = true;
    Step::Halted
  }

  // endregion

  // region Display methods

  fn make_cell_table(name: &str, cells: &[i64], highlight: usize, start: usize) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in cells.iter().enumerate() {
      match i == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i + start), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i + start), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  /// The slice of memory shown by `Display`: a short window starting at the
  /// instruction pointer.
  fn memory_window(&self) -> Vec<i64> {
    const WINDOW: usize = 8;
    (self.ip..self.ip + WINDOW)
      .map(|address| self.memory.read(address))
      .collect()
  }

  // endregion

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let m_table = Machine::make_cell_table("M", &self.memory_window(), 0, self.ip);
    let i_table = Machine::make_cell_table("I", &self.input.snapshot(), usize::max_value(), 0);
    let o_table = Machine::make_cell_table("O", &self.output.snapshot(), usize::max_value(), 0);

    let mut combined_table = table!([m_table, i_table, o_table]);

    combined_table.set_titles(row![ub->"Memory", ub->"Input", ub->"Output"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let state = match self.halted {
      true  => "Halted.",
      false => "Running."
    };

    write!(
      f,
      "IP: {}\tRelativeBase: {}\t{}\n{}",
      self.ip, self.relative_base, state, combined_table
    )
  }
}

/// Converts a resolved address to an index into memory. Addresses are
/// non-negative; anything else is fatal.
fn to_address(value: i64) -> Result<usize, MachineError> {
  usize::try_from(value).map_err(|_| MachineError::NegativeAddress(value))
}
