use crate::{common::StatusCode, interpreter::AnalyzedCode, state::ExecutionState};

pub(crate) mod arithmetic;
pub(crate) mod bitwise;
pub(crate) mod boolean;
pub(crate) mod call;
pub(crate) mod control;
pub(crate) mod external;
pub(crate) mod instruction_table;
pub(crate) mod memory;
pub(crate) mod properties;
pub(crate) mod stack_manip;

pub use properties::{Properties, PROPERTIES};

/// What the dispatch loop should do after executing an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InstructionResolution {
    /// Proceed to the next pre-decoded instruction.
    Continue,
    /// Redirect execution to the given pre-decoded instruction index.
    Jump(usize),
    /// Terminate the message with the given status.
    Exit(StatusCode),
}

/// Pre-decoded instruction argument.
///
/// Small push immediates are stored inline; larger values live in the
/// analysis argument pool so the hot instruction record stays two words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InstrArg {
    None,
    /// `PUSH1..PUSH8` immediate, big-endian.
    Push(u64),
    /// Argument pool index holding a `PUSH9..PUSH32` word.
    BigPush(u32),
    /// DUP/SWAP height, LOG topic count, or the original PC value.
    Number(u32),
    /// Block gas accumulated up to and including this instruction.
    /// Lets GAS report the exact mid-block value.
    BlockGas(u64),
    /// Basic block index for the block-entry precheck.
    Block(u32),
}

impl InstrArg {
    #[inline]
    pub(crate) fn number(self) -> usize {
        match self {
            InstrArg::Number(v) => v as usize,
            _ => unreachable!("invalid instruction argument"),
        }
    }

    #[inline]
    pub(crate) fn push_value(self) -> u64 {
        match self {
            InstrArg::Push(v) => v,
            _ => unreachable!("invalid instruction argument"),
        }
    }

    #[inline]
    pub(crate) fn big_push(self) -> usize {
        match self {
            InstrArg::BigPush(v) => v as usize,
            _ => unreachable!("invalid instruction argument"),
        }
    }

    #[inline]
    pub(crate) fn block_gas(self) -> i64 {
        match self {
            InstrArg::BlockGas(v) => v as i64,
            _ => unreachable!("invalid instruction argument"),
        }
    }

    #[inline]
    pub(crate) fn block(self) -> usize {
        match self {
            InstrArg::Block(v) => v as usize,
            _ => unreachable!("invalid instruction argument"),
        }
    }
}

/// Implementation of a pre-decoded instruction.
pub(crate) type InstrFn =
    fn(&mut ExecutionState<'_>, &AnalyzedCode, InstrArg) -> InstructionResolution;
