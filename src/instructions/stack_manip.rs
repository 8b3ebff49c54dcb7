use super::{InstrArg, InstructionResolution::*, *};
use ethereum_types::U256;

/// `PUSH1..PUSH8` with the immediate pre-decoded into the instruction record.
pub(crate) fn push_inline(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    state.stack.push(arg.push_value().into());
    Continue
}

/// `PUSH9..PUSH32` with the immediate stored in the analysis argument pool.
pub(crate) fn push_pooled(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    let value = U256::from_big_endian(&analysis.args_pool[arg.big_push()]);
    state.stack.push(value);
    Continue
}

pub(crate) fn dup(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    state.stack.push(*state.stack.get(arg.number() - 1));
    Continue
}

pub(crate) fn swap(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    state.stack.swap_top(arg.number());
    Continue
}

pub(crate) fn pop(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.pop();
    Continue
}
