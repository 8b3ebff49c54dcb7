use super::{memory, InstrArg, InstructionResolution, InstructionResolution::*};
use crate::{
    interpreter::AnalyzedCode,
    state::{ExecutionState, Stack},
    StatusCode,
};
use ethereum_types::U256;
use std::cmp::min;

/// The intrinsic block-entry instruction.
///
/// Emitted by the analyzer at every basic block boundary, replacing
/// JUMPDEST where one is present. Enforces the whole block's gas and
/// stack requirements in a single step, so the instructions inside the
/// block only have to charge their dynamic costs.
pub(crate) fn beginblock(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    let block = &analysis.blocks[arg.block()];

    state.gas_left -= block.gas_cost;
    if state.gas_left < 0 {
        return Exit(StatusCode::OutOfGas);
    }

    if (state.stack.len() as i32) < block.stack_req {
        return Exit(StatusCode::StackUnderflow);
    }

    if state.stack.len() as i32 + block.stack_max > Stack::limit() as i32 {
        return Exit(StatusCode::StackOverflow);
    }

    state.current_block_cost = block.gas_cost;
    Continue
}

pub(crate) fn stop(
    _: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    Exit(StatusCode::Success)
}

pub(crate) fn invalid(
    _: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    Exit(StatusCode::InvalidInstruction)
}

/// Stand-in for opcodes which are not assigned in the active revision.
pub(crate) fn undefined(
    _: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    Exit(StatusCode::UndefinedInstruction)
}

fn jump_to(analysis: &AnalyzedCode, dst: U256) -> InstructionResolution {
    match analysis.find_jumpdest(dst) {
        Some(target) => Jump(target),
        None => Exit(StatusCode::BadJumpDestination),
    }
}

pub(crate) fn jump(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let dst = state.stack.pop();
    jump_to(analysis, dst)
}

pub(crate) fn jumpi(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let dst = state.stack.pop();
    let condition = state.stack.pop();

    if condition.is_zero() {
        Continue
    } else {
        jump_to(analysis, dst)
    }
}

/// Pushes the original code offset recorded by the analyzer,
/// not the pre-decoded instruction index.
pub(crate) fn pc(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    state.stack.push(arg.number().into());
    Continue
}

/// The whole block's gas was taken at block entry, so the remaining gas is
/// corrected by the part belonging to instructions not yet executed.
pub(crate) fn gas(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    let correction = state.current_block_cost - arg.block_gas();
    let gas = (state.gas_left + correction) as u64;
    state.stack.push(gas.into());
    Continue
}

fn ret(state: &mut ExecutionState, status_code: StatusCode) -> InstructionResolution {
    let offset = *state.stack.get(0);
    let size = *state.stack.get(1);

    let region = match memory::verify_memory_region(state, offset, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    if let Some(region) = region {
        state.output_data = state.memory[region.offset..region.offset + region.size.get()]
            .to_vec()
            .into();
    }

    Exit(status_code)
}

pub(crate) fn op_return(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    ret(state, StatusCode::Success)
}

pub(crate) fn op_revert(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    ret(state, StatusCode::Revert)
}

pub(crate) fn calldataload(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let index = state.stack.pop();

    let input_len = state.message.input_data.len();

    let value = if index > U256::from(input_len) {
        U256::zero()
    } else {
        let index = index.as_usize();
        let end = min(index + 32, input_len);

        let mut data = [0; 32];
        data[..end - index].copy_from_slice(&state.message.input_data[index..end]);

        data.into()
    };

    state.stack.push(value);
    Continue
}

pub(crate) fn calldatasize(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(state.message.input_data.len().into());
    Continue
}
