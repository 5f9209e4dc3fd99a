//! Frame-pointer stack walking over a thread's saved register state.
//!
//! Every frame in the back chain is two machine words:
//!
//! ```text
//! frame + 0: link to the caller's frame
//! frame + 4: saved return address
//! ```
//!
//! All reads of target memory in the crate go through [`walk`], and every
//! frame address is checked with the validity oracle before it is read.

use super::key::{SampleKey, MAX_STACK_DEPTH};
use crate::utils::config::END_OF_STACK;
use crate::utils::error::WalkError;

/// Size of one machine word on the target
pub const WORD_SIZE: u32 = 4;

/// Register state of the sampled thread at one instant.
///
/// Only the stack pointer is consumed. Snapshots are taken per tick and
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSnapshot {
    /// Stack pointer register (r1 on the target), the address of the newest frame
    pub stack_pointer: u32,
}

impl ExecutionSnapshot {
    pub fn new(stack_pointer: u32) -> Self {
        Self { stack_pointer }
    }
}

/// Read access to the sampled program's memory.
pub trait FrameMemory: Send + Sync {
    /// Address-validity oracle, consulted once per frame
    fn is_valid(&self, address: u32) -> bool;

    /// Read one word, `None` if the address cannot be read
    fn read_word(&self, address: u32) -> Option<u32>;
}

/// Walk the back chain starting at the snapshot's stack pointer.
///
/// Return addresses are stored deepest call first. The walk stops at a null
/// or end-of-stack link, at a zero return address, or after
/// `MAX_STACK_DEPTH` frames, so a chain that loops back on itself still
/// terminates. Any frame that fails validation aborts the whole walk; a
/// partial stack is never returned.
pub fn walk<M: FrameMemory + ?Sized>(
    snapshot: &ExecutionSnapshot,
    memory: &M,
) -> Result<SampleKey, WalkError> {
    let mut key = SampleKey::new();
    let mut frame = snapshot.stack_pointer;

    for _ in 0..MAX_STACK_DEPTH {
        if frame == 0 || frame == END_OF_STACK {
            break;
        }

        if !memory.is_valid(frame) {
            return Err(WalkError::InvalidFrame { address: frame });
        }

        let (next, return_address) = read_frame(memory, frame)?;

        if !key.push(return_address) {
            // zero return address: nothing above this frame is trustworthy
            break;
        }

        frame = next;
    }

    if key.is_empty() {
        return Err(WalkError::EmptyStack);
    }

    Ok(key)
}

fn read_frame<M: FrameMemory + ?Sized>(memory: &M, frame: u32) -> Result<(u32, u32), WalkError> {
    let invalid = WalkError::InvalidFrame { address: frame };

    let link_slot = frame;
    let lr_slot = frame.checked_add(WORD_SIZE).ok_or(invalid)?;

    let next = memory.read_word(link_slot).ok_or(invalid)?;
    let return_address = memory.read_word(lr_slot).ok_or(invalid)?;

    Ok((next, return_address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Word-addressed memory with an explicit set of readable words
    #[derive(Default)]
    struct TestMemory {
        words: HashMap<u32, u32>,
    }

    impl TestMemory {
        fn frame(mut self, at: u32, next: u32, lr: u32) -> Self {
            self.words.insert(at, next);
            self.words.insert(at + WORD_SIZE, lr);
            self
        }
    }

    impl FrameMemory for TestMemory {
        fn is_valid(&self, address: u32) -> bool {
            self.words.contains_key(&address)
        }

        fn read_word(&self, address: u32) -> Option<u32> {
            self.words.get(&address).copied()
        }
    }

    #[test]
    fn test_walk_records_deepest_first() {
        let memory = TestMemory::default()
            .frame(0x1000, 0x1010, 0xA)
            .frame(0x1010, 0x1020, 0xB)
            .frame(0x1020, 0, 0xC);

        let key = walk(&ExecutionSnapshot::new(0x1000), &memory).unwrap();
        assert_eq!(key.frames(), &[0xA, 0xB, 0xC]);
    }

    #[test]
    fn test_walk_stops_at_end_of_stack_sentinel() {
        let memory = TestMemory::default()
            .frame(0x1000, 0x1010, 0xA)
            .frame(0x1010, END_OF_STACK, 0xB);

        let key = walk(&ExecutionSnapshot::new(0x1000), &memory).unwrap();
        assert_eq!(key.frames(), &[0xA, 0xB]);
    }

    #[test]
    fn test_walk_invalid_first_frame() {
        let memory = TestMemory::default();
        let result = walk(&ExecutionSnapshot::new(0xDEAD_0000), &memory);
        assert_eq!(result, Err(WalkError::InvalidFrame { address: 0xDEAD_0000 }));
    }

    #[test]
    fn test_walk_invalid_link_aborts_without_partial_stack() {
        let memory = TestMemory::default()
            .frame(0x1000, 0x1010, 0xA)
            .frame(0x1010, 0x6666_0000, 0xB);

        let result = walk(&ExecutionSnapshot::new(0x1000), &memory);
        assert_eq!(result, Err(WalkError::InvalidFrame { address: 0x6666_0000 }));
    }

    #[test]
    fn test_walk_unreadable_return_slot() {
        let mut memory = TestMemory::default();
        memory.words.insert(0x1000, 0);

        let result = walk(&ExecutionSnapshot::new(0x1000), &memory);
        assert_eq!(result, Err(WalkError::InvalidFrame { address: 0x1000 }));
    }

    #[test]
    fn test_walk_self_loop_terminates_at_capacity() {
        let memory = TestMemory::default().frame(0x1000, 0x1000, 0xA);

        let key = walk(&ExecutionSnapshot::new(0x1000), &memory).unwrap();
        assert!(key.is_full());
        assert!(key.frames().iter().all(|&a| a == 0xA));
    }

    #[test]
    fn test_walk_zero_return_address_truncates() {
        let memory = TestMemory::default()
            .frame(0x1000, 0x1010, 0xA)
            .frame(0x1010, 0x1020, 0)
            .frame(0x1020, 0, 0xC);

        let key = walk(&ExecutionSnapshot::new(0x1000), &memory).unwrap();
        assert_eq!(key.frames(), &[0xA]);
    }

    #[test]
    fn test_walk_null_stack_pointer_is_empty() {
        let memory = TestMemory::default();
        assert_eq!(
            walk(&ExecutionSnapshot::new(0), &memory),
            Err(WalkError::EmptyStack)
        );
        assert_eq!(
            walk(&ExecutionSnapshot::new(END_OF_STACK), &memory),
            Err(WalkError::EmptyStack)
        );
    }

    #[test]
    fn test_walk_checks_oracle_once_per_frame() {
        struct Counting {
            inner: TestMemory,
            checks: AtomicUsize,
        }

        impl FrameMemory for Counting {
            fn is_valid(&self, address: u32) -> bool {
                self.checks.fetch_add(1, Ordering::Relaxed);
                self.inner.is_valid(address)
            }

            fn read_word(&self, address: u32) -> Option<u32> {
                self.inner.read_word(address)
            }
        }

        let memory = Counting {
            inner: TestMemory::default()
                .frame(0x1000, 0x1010, 0xA)
                .frame(0x1010, 0, 0xB),
            checks: AtomicUsize::new(0),
        };

        walk(&ExecutionSnapshot::new(0x1000), &memory).unwrap();
        assert_eq!(memory.checks.load(Ordering::Relaxed), 2);
    }
}
