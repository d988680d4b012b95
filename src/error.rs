/*!

  Error types for the virtual machine and the program parser.

  Suspension is deliberately absent from this taxonomy: a machine that runs dry
  on input reports `Run::Suspended`, which is data the caller branches on, not
  an error. Everything here is fatal to the machine that produced it.

*/

use thiserror::Error;

/// Fatal execution errors. A machine that returns one of these cannot be resumed.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum MachineError {

  /// The cell at the instruction pointer does not decode to a known opcode.
  #[error("invalid opcode {opcode} at address {address}")]
  InvalidOpcode{
    opcode  : i64,
    address : usize
  },

  /// A parameter mode digit outside of {0, 1, 2}.
  #[error("invalid parameter mode {mode} at address {address}")]
  InvalidMode{
    mode    : i64,
    address : usize
  },

  /// An effective address resolved to a negative value.
  #[error("negative address {0}")]
  NegativeAddress(i64),

  /// A write target was encoded in immediate mode.
  #[error("immediate mode write target at address {0}")]
  ImmediateWriteTarget(usize),

  /// A halted machine was asked to execute another instruction.
  #[error("machine resumed after halting")]
  ResumedAfterHalt,

  /// A feedback circuit ran to completion without a terminal output value.
  #[error("circuit halted without producing a signal")]
  NoSignal,

}

/// Errors produced while parsing program text.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum ProgramError {

  #[error("empty program text")]
  Empty,

  #[error("malformed program text near `{0}`")]
  Malformed(String),

}
