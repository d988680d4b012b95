/*!

  Driver binary for the IntCode virtual machine.

  Runs every line of a program file as an independent machine. The default
  mode queues any trailing integer arguments as input and reports the output
  queue once the machine halts (or reports that it suspended wanting more
  input). `--chain` and `--feedback` instead wire five machines into the
  amplifier ring and search the phase-setting permutations for the strongest
  terminal signal.

*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

mod channel;
mod circuit;
mod error;
mod instruction;
mod machine;
mod memory;
mod program;

use std::env;
use std::fs;
use std::process;
use std::time::Instant;

use crate::machine::{Machine, Run};
use crate::program::Program;

const USAGE: &str = "Usage: intcode [--chain | --feedback] <program-file> [input...]";

enum DriverMode {
  /// One machine per line, driven with the inputs from the command line.
  Single,
  /// Five amplifiers in a single pass, phase candidates 0 through 4.
  Chain,
  /// Five amplifiers in a feedback ring, phase candidates 5 through 9.
  Feedback,
}

fn main() {
  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let arguments: Vec<String> = env::args().skip(1).collect();

  let (mode, rest) = match arguments.split_first() {
    Some((flag, rest)) if flag == "--chain"    => (DriverMode::Chain, rest),
    Some((flag, rest)) if flag == "--feedback" => (DriverMode::Feedback, rest),
    Some(_)                                    => (DriverMode::Single, &arguments[..]),
    None => {
      eprintln!("{}", USAGE);
      process::exit(2);
    }
  };

  if rest.is_empty() {
    eprintln!("{}", USAGE);
    process::exit(2);
  }

  if let Err(error) = drive(&mode, &rest[0], &rest[1..]) {
    eprintln!("error: {}", error);
    process::exit(1);
  }
}

fn drive(
  mode: &DriverMode,
  path: &str,
  input_arguments: &[String]
) -> Result<(), Box<dyn std::error::Error>> {
  let mut inputs: Vec<i64> = Vec::new();
  for argument in input_arguments {
    inputs.push(argument.parse::<i64>()?);
  }

  let text  = fs::read_to_string(path)?;
  let start = Instant::now();

  for line in text.lines().filter(|line| !line.trim().is_empty()) {
    let program = Program::parse(line)?;

    match mode {

      DriverMode::Single => {
        run_single(&program, &inputs)?;
      }

      DriverMode::Chain => {
        let (signal, phases) = circuit::max_signal(&program, &[0, 1, 2, 3, 4], 0)?;
        println!("Max thruster signal: {} from {}", signal, join(&phases));
      }

      DriverMode::Feedback => {
        let (signal, phases) = circuit::max_signal(&program, &[5, 6, 7, 8, 9], 0)?;
        println!("Max thruster signal: {} from {}", signal, join(&phases));
      }

    }
  }

  println!("Elapsed Time: {} ms", start.elapsed().as_millis());
  Ok(())
}

fn run_single(program: &Program, inputs: &[i64]) -> Result<(), Box<dyn std::error::Error>> {
  let mut machine = Machine::new(program);
  for input in inputs {
    machine.push_input(*input);
  }

  match machine.run()? {

    Run::Halted    => {
      let outputs = machine.drain_output();
      println!("Output: {} ({})", join(&outputs), outputs.len());
    }

    Run::Suspended => {
      let outputs = machine.drain_output();
      println!(
        "Suspended waiting for input at M[{}]. Output so far: {} ({})",
        machine.instruction_pointer(),
        join(&outputs),
        outputs.len()
      );
    }

  }

  Ok(())
}

fn join(values: &[i64]) -> String {
  values
    .iter()
    .map(i64::to_string)
    .collect::<Vec<String>>()
    .join(",")
}
