/*!

  Program text parsing.

  A program is a single line of comma-separated base-10 signed integers, with
  no separators other than the commas and no leading `+` on positive values.
  The parsed image becomes the initial contents of memory starting at
  address 0.

*/

use std::fmt::{Display, Formatter};

use nom::{
  character::complete::{
    char as one_char,
    digit1
  },
  combinator::{all_consuming, map_res, opt, recognize},
  error::ErrorKind,
  multi::separated_list,
  sequence::pair,
  IResult
};

use crate::error::ProgramError;

/// An ordered sequence of signed integer cells, as loaded into a fresh
/// machine's memory. Several machines may be built from one `Program`; each
/// gets an independent memory copy.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Program {
  cells: Vec<i64>,
}

impl Program {

  pub fn new(cells: Vec<i64>) -> Program {
    Program{ cells }
  }

  /// Parses one line of program text.
  pub fn parse(text: &str) -> Result<Program, ProgramError> {
    let text = text.trim();
    if text.is_empty() {
      return Err(ProgramError::Empty);
    }

    match all_consuming(program_p)(text) {
      Ok((_rest, cells)) => Ok(Program{ cells }),
      Err(_)             => Err(ProgramError::Malformed(truncated(text)))
    }
  }

  pub fn cells(&self) -> &[i64] {
    &self.cells
  }

}

impl Display for Program {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let text =
      self.cells
          .iter()
          .map(i64::to_string)
          .collect::<Vec<String>>()
          .join(",");
    write!(f, "{}", text)
  }
}

fn integer_p(input: &str) -> IResult<&str, i64, (&str, ErrorKind)> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |out: &str| out.parse::<i64>()
  )(input)
}

fn program_p(input: &str) -> IResult<&str, Vec<i64>, (&str, ErrorKind)> {
  separated_list(one_char(','), integer_p)(input)
}

/// Clips overlong program text for error messages.
fn truncated(text: &str) -> String {
  const LIMIT: usize = 32;
  match text.char_indices().nth(LIMIT) {
    Some((offset, _)) => format!("{}…", &text[..offset]),
    None              => text.to_string()
  }
}
