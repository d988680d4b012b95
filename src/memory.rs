/*!

  The machine's flat, linear, integer-addressed store.

  A store is seeded from a program image and pre-sized well beyond it; every
  cell past the image is zero. Reads past the current end yield zero without
  touching the store. Writes past the current end grow the store with zero
  fill, so generous pre-sizing is a fast path rather than a correctness
  requirement.

*/

use crate::program::Program;

/// Cells reserved beyond the program image at load time. The store still
/// grows on a write past this point.
pub const RESERVED_CELLS: usize = 10_000;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Memory {
  cells: Vec<i64>,
}

impl Memory {

  /// Loads a program image at address 0 with the default reserve.
  pub fn load(program: &Program) -> Memory {
    Memory::with_capacity(program, RESERVED_CELLS)
  }

  /// Loads a program image at address 0 into a store of at least `capacity` cells.
  pub fn with_capacity(program: &Program, capacity: usize) -> Memory {
    let image = program.cells();
    let mut cells = vec![0i64; capacity.max(image.len())];
    cells[..image.len()].copy_from_slice(image);
    Memory{ cells }
  }

  /// Reads the cell at `address`. Never grows the store.
  pub fn read(&self, address: usize) -> i64 {
    match self.cells.get(address) {
      Some(value) => *value,
      None        => 0
    }
  }

  /// Writes `value` to the cell at `address`, growing the store if the
  /// address lies past the current end.
  pub fn write(&mut self, address: usize, value: i64) {
    if address >= self.cells.len() {
      self.cells.resize(address + 1, 0);
    }
    self.cells[address] = value;
  }

  /// Current extent of the store in cells.
  pub fn len(&self) -> usize {
    self.cells.len()
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  fn image(cells: Vec<i64>) -> Program {
    Program::new(cells)
  }

  #[test]
  fn load_zero_fills_beyond_image() {
    let memory = Memory::load(&image(vec![1, 2, 3]));
    assert_eq!(memory.len(), RESERVED_CELLS);
    assert_eq!(memory.read(0), 1);
    assert_eq!(memory.read(2), 3);
    assert_eq!(memory.read(3), 0);
    assert_eq!(memory.read(RESERVED_CELLS - 1), 0);
  }

  #[test]
  fn image_larger_than_capacity() {
    let program = image((0..20).collect());
    let memory  = Memory::with_capacity(&program, 4);
    assert_eq!(memory.len(), 20);
    assert_eq!(memory.read(19), 19);
  }

  #[test]
  fn read_past_end_is_zero_without_growth() {
    let memory = Memory::with_capacity(&image(vec![99]), 1);
    assert_eq!(memory.read(5_000_000), 0);
    assert_eq!(memory.len(), 1);
  }

  #[test]
  fn write_past_end_grows() {
    let mut memory = Memory::with_capacity(&image(vec![99]), 1);
    memory.write(100, 42);
    assert_eq!(memory.len(), 101);
    assert_eq!(memory.read(100), 42);
    assert_eq!(memory.read(50), 0);
  }

  #[test]
  fn write_in_place() {
    let mut memory = Memory::load(&image(vec![1, 0, 0, 0, 99]));
    memory.write(0, 2);
    assert_eq!(memory.read(0), 2);
    assert_eq!(memory.read(4), 99);
  }
}
