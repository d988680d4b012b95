/*!

  Opcodes, parameter modes, and instruction decoding.

  An encoded instruction is a single memory cell. The two low decimal digits
  are the opcode; the next three digits, read least significant first, are the
  parameter modes of operand slots 1 through 3. A cell of `1002` therefore
  decodes to `Multiply` with modes `{position, immediate, position}`.

  Decoding is strict: an opcode outside the instruction set or a mode digit
  outside {0, 1, 2} is a fatal error, never a silent fallthrough. All three
  mode digits are validated even when the opcode consumes fewer operands, so
  that a malformed cell fails at decode time rather than when (or whether) a
  particular operand happens to be touched.

*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::error::MachineError;

/**
  Opcodes of the virtual machine.

  The numeric values are fixed by the instruction set, not by declaration
  order, so every variant carries its discriminant explicitly. `Halt` is the
  lone outlier at 99.
*/
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,    Debug,         Hash
)]
#[repr(u8)]
pub enum Opcode {
  Add                =  1, // dst = a + b
  Multiply           =  2, // dst = a * b
  Input              =  3, // dst = dequeue(input), suspends on empty input
  Output             =  4, // enqueue(output, a)
  JumpIfTrue         =  5, // ip = b if a != 0
  JumpIfFalse        =  6, // ip = b if a == 0
  LessThan           =  7, // dst = (a < b) as integer
  Equals             =  8, // dst = (a == b) as integer
  AdjustRelativeBase =  9, // relative_base += a
  Halt               = 99, // terminal state
}

impl Opcode {

  /// Number of operand cells following the opcode cell.
  pub fn arity(&self) -> usize {
    match self {

      | Opcode::Add
      | Opcode::Multiply
      | Opcode::LessThan
      | Opcode::Equals      => 3,

      | Opcode::JumpIfTrue
      | Opcode::JumpIfFalse => 2,

      | Opcode::Input
      | Opcode::Output
      | Opcode::AdjustRelativeBase => 1,

      Opcode::Halt          => 0,

    }
  }

  /// Width in cells of the whole instruction, opcode included. The jumps
  /// advance by this amount only when their condition fails.
  pub fn width(&self) -> usize {
    self.arity() + 1
  }

}

/// How an operand is interpreted to find a value or an address.
#[derive(
StrumDisplay, IntoStaticStr, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,    Debug,         Hash
)]
#[repr(u8)]
pub enum Mode {
  /// The operand cell holds an address.
  Position  = 0,
  /// The operand cell holds the value itself. Never a write target.
  Immediate = 1,
  /// The operand cell holds an offset from the relative base register.
  Relative  = 2,
}

/// A decoded instruction: an opcode and one mode per operand slot. Slots
/// beyond `opcode.arity()` decode to `Position` in well-formed programs and
/// are never consulted.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Instruction {
  pub opcode : Opcode,
  pub modes  : [Mode; 3],
}

impl Instruction {

  /**
    Decodes the cell `word` fetched from `address`. Pure: reads nothing but
    its arguments. The `address` is carried only for error reporting.
  */
  pub fn decode(word: i64, address: usize) -> Result<Instruction, MachineError> {
    let opcode_value = word % 100;
    let opcode =
      u8::try_from(opcode_value)
        .ok()
        .and_then(|value| Opcode::try_from(value).ok())
        .ok_or(MachineError::InvalidOpcode{ opcode: opcode_value, address })?;

    let mut modes  = [Mode::Position; 3];
    let mut digits = word / 100;
    for slot in 0..3 {
      let digit = digits % 10;
      modes[slot] =
        u8::try_from(digit)
          .ok()
          .and_then(|value| Mode::try_from(value).ok())
          .ok_or(MachineError::InvalidMode{ mode: digit, address })?;
      digits /= 10;
    }

    Ok(Instruction{ opcode, modes })
  }

}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.opcode.arity() {

      0 => write!(f, "{}", self.opcode),

      arity => {
        let modes =
          self.modes[..arity]
              .iter()
              .map(|mode| format!("{}", mode))
              .collect::<Vec<String>>()
              .join(", ");
        write!(f, "{}({})", self.opcode, modes)
      }

    }
  }
}
