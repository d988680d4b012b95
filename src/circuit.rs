/*!

  The feedback ring: N machines built from one program, chained so that each
  machine's output queue is the next machine's input queue and the last
  machine feeds back into the first.

  The driver is strict round-robin. Each turn runs one machine until it halts
  or suspends on empty input; suspension hands control to the next machine in
  the ring, whose output may replenish the suspended machine's queue before
  its turn comes around again. Because every queue is FIFO with one producer
  and one consumer, the signal order along the ring is deterministic for a
  fixed program and phase assignment. The ring is done when the terminal
  machine halts; its newest output value is the result signal.

*/

use crate::channel::Channel;
use crate::error::MachineError;
use crate::machine::{Machine, Run};
use crate::program::Program;

pub struct Circuit {

  machines: Vec<Machine>,

  // The terminal machine's output queue, which doubles as machine 0's input
  // queue. The seed signal goes in here, and the result signal comes out.
  ring_head: Channel,

}

impl Circuit {

  /**
    Builds one machine per phase setting, each over an independent memory copy
    of `program`, wires them into a ring, and seeds every input queue with its
    phase setting.
  */
  pub fn new(program: &Program, phases: &[i64]) -> Circuit {
    let channels: Vec<Channel> =
      phases.iter().map(|_| Channel::new()).collect();

    let machines: Vec<Machine> =
      (0..phases.len())
        .map(|i| {
          Machine::with_channels(
            program,
            channels[i].clone(),
            channels[(i + 1) % channels.len()].clone()
          )
        })
        .collect();

    for (channel, phase) in channels.iter().zip(phases) {
      channel.push(*phase);
    }

    let ring_head = match channels.first() {
      Some(channel) => channel.clone(),
      None          => Channel::new()
    };

    Circuit{ machines, ring_head }
  }

  /**
    Feeds `seed` to the first machine and round-robins the ring until the
    terminal machine halts, returning its newest output value.

    A turn that lands on a machine that halted in an earlier round is a
    `ResumedAfterHalt` error; in a well-formed circuit every machine halts
    within one round of the terminal machine.
  */
  pub fn run(&mut self, seed: i64) -> Result<i64, MachineError> {
    if self.machines.is_empty() {
      return Err(MachineError::NoSignal);
    }

    self.ring_head.push(seed);
    let terminal = self.machines.len() - 1;

    for turn in 0.. {
      let index   = turn % self.machines.len();
      let machine = &mut self.machines[index];

      if machine.is_halted() {
        return Err(MachineError::ResumedAfterHalt);
      }

      match machine.run()? {

        Run::Suspended => {
          // The next machine in the ring gets a chance to produce input.
        }

        Run::Halted if index == terminal => {
          return self.ring_head.newest().ok_or(MachineError::NoSignal);
        }

        Run::Halted    => {
          // An upstream machine is done; the rest of the ring drains.
        }

      }
    }

    unreachable!("the round-robin loop only exits by return");
  }

}

/**
  Runs the ring once for every permutation of `candidates` as the phase
  assignment, returning the best terminal signal and the permutation that
  produced it.
*/
pub fn max_signal(
  program: &Program,
  candidates: &[i64],
  seed: i64
) -> Result<(i64, Vec<i64>), MachineError> {
  let mut best: Option<(i64, Vec<i64>)> = None;

  for phases in permutations(candidates) {
    let signal = Circuit::new(program, &phases).run(seed)?;
    let better = match &best {
      None              => true,
      Some((value, _))  => signal > *value
    };
    if better {
      best = Some((signal, phases));
    }
  }

  best.ok_or(MachineError::NoSignal)
}

/// Every ordering of `items`, built by prepending each element to the
/// permutations of the rest.
fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
  if items.len() <= 1 {
    return vec![items.to_vec()];
  }

  let mut all = Vec::new();
  for (i, item) in items.iter().enumerate() {
    let mut rest = items.to_vec();
    rest.remove(i);
    for mut sub in permutations(&rest) {
      sub.insert(0, *item);
      all.push(sub);
    }
  }
  all
}


#[cfg(test)]
mod tests {
  use super::*;

  fn program_for(text: &str) -> Program {
    Program::parse(text).unwrap()
  }

  #[test]
  fn permutation_count_and_contents() {
    let all = permutations(&[1, 2, 3]);
    assert_eq!(all.len(), 6);
    assert!(all.contains(&vec![1, 2, 3]));
    assert!(all.contains(&vec![3, 1, 2]));

    assert_eq!(permutations(&[7]), vec![vec![7]]);
  }

  #[test]
  fn single_pass_chain_examples() {
    // Each machine consumes its phase and the forwarded signal, emits once,
    // and halts, so the ring completes in one round.
    let cases: &[(&str, &[i64], i64)] = &[
      (
        "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0",
        &[4, 3, 2, 1, 0],
        43210
      ),
      (
        "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0",
        &[0, 1, 2, 3, 4],
        54321
      ),
      (
        "3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0",
        &[1, 0, 4, 3, 2],
        65210
      ),
    ];

    for (text, phases, expected) in cases {
      let signal = Circuit::new(&program_for(text), phases).run(0).unwrap();
      assert_eq!(signal, *expected);
    }
  }

  #[test]
  fn feedback_loop_examples() {
    let cases: &[(&str, &[i64], i64)] = &[
      (
        "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5",
        &[9, 8, 7, 6, 5],
        139629729
      ),
      (
        "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10",
        &[9, 7, 8, 5, 6],
        18216
      ),
    ];

    for (text, phases, expected) in cases {
      let signal = Circuit::new(&program_for(text), phases).run(0).unwrap();
      assert_eq!(signal, *expected);
    }
  }

  #[test]
  fn feedback_loop_is_deterministic() {
    let program = program_for(
      "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5"
    );
    let phases = [9, 8, 7, 6, 5];

    let first  = Circuit::new(&program, &phases).run(0).unwrap();
    let second = Circuit::new(&program, &phases).run(0).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn max_signal_finds_best_single_pass_phases() {
    let program = program_for("3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0");
    let (signal, phases) = max_signal(&program, &[0, 1, 2, 3, 4], 0).unwrap();
    assert_eq!(signal, 43210);
    assert_eq!(phases, vec![4, 3, 2, 1, 0]);
  }

  #[test]
  fn max_signal_finds_best_feedback_phases() {
    let program = program_for(
      "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10"
    );
    let (signal, phases) = max_signal(&program, &[5, 6, 7, 8, 9], 0).unwrap();
    assert_eq!(signal, 18216);
    assert_eq!(phases, vec![9, 7, 8, 5, 6]);
  }

  #[test]
  fn empty_ring_has_no_signal() {
    let program = program_for("99");
    assert_eq!(
      Circuit::new(&program, &[]).run(0),
      Err(MachineError::NoSignal)
    );
  }

  #[test]
  fn ring_of_one_feeds_itself() {
    // Consumes its phase, doubles the seed, halts.
    let program = program_for("3,9,3,10,1002,10,2,10,4,10,99");
    let signal  = Circuit::new(&program, &[0]).run(21).unwrap();
    assert_eq!(signal, 42);
  }

  #[test]
  fn machine_that_never_outputs_has_no_signal() {
    // A lone machine that consumes its inputs and halts without producing
    // anything leaves the ring head empty.
    let program = program_for("3,0,3,0,99");
    assert_eq!(
      Circuit::new(&program, &[1]).run(0),
      Err(MachineError::NoSignal)
    );
  }
}
