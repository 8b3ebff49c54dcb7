use crate::{
    common::{Message, Revision},
    host::Host,
};
use arrayvec::ArrayVec;
use bytes::Bytes;
use ethereum_types::U256;
use serde::Serialize;
use std::fmt;

const SIZE: usize = 1024;

/// The stack of 256-bit EVM words, limited to 1024 items.
///
/// Bounds are not checked here; the analyzer's per-block prechecks make
/// out-of-bounds access unreachable at runtime.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Stack(pub ArrayVec<U256, SIZE>);

impl Stack {
    pub const fn limit() -> usize {
        SIZE
    }

    fn get_pos(&self, pos: usize) -> usize {
        self.len() - 1 - pos
    }

    pub fn get(&self, pos: usize) -> &U256 {
        &self.0[self.get_pos(pos)]
    }

    pub fn get_mut(&mut self, pos: usize) -> &mut U256 {
        let pos = self.get_pos(pos);
        &mut self.0[pos]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, v: U256) {
        self.0.push(v)
    }

    pub fn pop(&mut self) -> U256 {
        self.0.pop().expect("underflow")
    }

    pub fn swap_top(&mut self, pos: usize) {
        let top = self.0.len() - 1;
        let pos = self.get_pos(pos);
        self.0.swap(top, pos);
    }
}

pub type Memory = Vec<u8>;

/// The initial memory allocation, covering most messages without regrowth.
const INITIAL_MEMORY_CAPACITY: usize = 4 * 1024;

/// Mutable i/o of a single message execution.
///
/// Created per invocation and never shared; nested calls build their own.
pub struct ExecutionState<'h> {
    pub(crate) gas_left: i64,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) message: Message,
    pub(crate) evm_revision: Revision,
    pub(crate) return_data: Bytes,
    pub(crate) output_data: Bytes,
    /// Gas charged upfront for the basic block being executed.
    /// Needed to report exact mid-block values for the GAS instruction.
    pub(crate) current_block_cost: i64,
    pub(crate) host: &'h mut dyn Host,
}

impl<'h> ExecutionState<'h> {
    pub fn new(host: &'h mut dyn Host, message: Message, evm_revision: Revision) -> Self {
        Self {
            gas_left: message.gas,
            stack: Default::default(),
            memory: Memory::with_capacity(INITIAL_MEMORY_CAPACITY),
            message,
            evm_revision,
            return_data: Default::default(),
            output_data: Bytes::new(),
            current_block_cost: 0,
            host,
        }
    }

    pub fn gas_left(&self) -> i64 {
        self.gas_left
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn memory_size(&self) -> usize {
        self.memory.len()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn revision(&self) -> Revision {
        self.evm_revision
    }
}

impl fmt::Debug for ExecutionState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionState")
            .field("gas_left", &self.gas_left)
            .field("stack", &self.stack)
            .field("memory_size", &self.memory.len())
            .field("message", &self.message)
            .field("evm_revision", &self.evm_revision)
            .field("return_data", &self.return_data)
            .field("output_data", &self.output_data)
            .field("current_block_cost", &self.current_block_cost)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack() {
        let mut stack = Stack::default();

        let items = [0xde, 0xad, 0xbe, 0xef];

        for (i, item) in items.iter().copied().enumerate() {
            stack.push(item.into());
            assert_eq!(stack.len(), i + 1);
        }

        assert_eq!(*stack.get(2), 0xad.into());

        assert_eq!(stack.pop(), 0xef.into());

        assert_eq!(*stack.get(2), 0xde.into());
    }

    #[test]
    fn stack_swap_top() {
        let mut stack = Stack::default();
        for v in [1, 2, 3] {
            stack.push(v.into());
        }

        stack.swap_top(2);
        assert_eq!(stack.pop(), 1.into());
        assert_eq!(stack.pop(), 2.into());
        assert_eq!(stack.pop(), 3.into());
    }
}
