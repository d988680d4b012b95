/*!

  The FIFO queue connecting a machine to its driver, or two machines to each
  other.

  A `Channel` is a cheaply cloneable handle; clones share one queue. That is
  the whole wiring mechanism of a feedback ring: the producer holds one handle
  as its output, the consumer holds a clone as its input. Execution is
  single-threaded and cooperative, so `Rc<RefCell<…>>` suffices; nothing here
  is `Send`.

*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Clone, Default, Debug)]
pub struct Channel {
  queue: Rc<RefCell<VecDeque<i64>>>,
}

impl Channel {

  pub fn new() -> Channel {
    Channel::default()
  }

  /// Appends a value at the tail.
  pub fn push(&self, value: i64) {
    self.queue.borrow_mut().push_back(value);
  }

  /// Removes and returns the value at the head, if any.
  pub fn pop(&self) -> Option<i64> {
    self.queue.borrow_mut().pop_front()
  }

  /// The most recently pushed value, without removing it.
  pub fn newest(&self) -> Option<i64> {
    self.queue.borrow().back().copied()
  }

  /// Copies the queue contents in FIFO order, for display.
  pub fn snapshot(&self) -> Vec<i64> {
    self.queue.borrow().iter().copied().collect()
  }

  /// Empties the queue, returning its contents in FIFO order.
  pub fn drain(&self) -> Vec<i64> {
    self.queue.borrow_mut().drain(..).collect()
  }

  pub fn len(&self) -> usize {
    self.queue.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.borrow().is_empty()
  }

}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fifo_order() {
    let channel = Channel::new();
    channel.push(1);
    channel.push(2);
    channel.push(3);
    assert_eq!(channel.pop(), Some(1));
    assert_eq!(channel.pop(), Some(2));
    assert_eq!(channel.pop(), Some(3));
    assert_eq!(channel.pop(), None);
  }

  #[test]
  fn clones_share_the_queue() {
    let producer = Channel::new();
    let consumer = producer.clone();
    producer.push(7);
    assert_eq!(consumer.len(), 1);
    assert_eq!(consumer.pop(), Some(7));
    assert!(producer.is_empty());
  }

  #[test]
  fn newest_peeks_the_tail() {
    let channel = Channel::new();
    assert_eq!(channel.newest(), None);
    channel.push(4);
    channel.push(9);
    assert_eq!(channel.newest(), Some(9));
    assert_eq!(channel.len(), 2);
  }

  #[test]
  fn drain_empties_in_order() {
    let channel = Channel::new();
    channel.push(5);
    channel.push(6);
    assert_eq!(channel.drain(), vec![5, 6]);
    assert!(channel.is_empty());
  }
}
