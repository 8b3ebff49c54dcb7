use super::{InstrArg, InstructionResolution, InstructionResolution::*};
use crate::{common::u256_to_address, interpreter::AnalyzedCode, state::ExecutionState, StatusCode};
use ethereum_types::U256;
use sha3::{Digest, Keccak256};
use std::{cmp::min, num::NonZeroUsize};

const MAX_BUFFER_SIZE: u32 = u32::MAX;

/// The size of the EVM 256-bit word.
const WORD_SIZE: i64 = 32;

/// Returns number of words what would fit to provided number of bytes,
/// i.e. it rounds up the number bytes to number of words.
#[inline]
pub(crate) fn num_words(size_in_bytes: usize) -> i64 {
    ((size_in_bytes as i64) + (WORD_SIZE - 1)) / WORD_SIZE
}

pub(crate) struct MemoryRegion {
    pub offset: usize,
    pub size: NonZeroUsize,
}

/// Grows memory to cover `[offset, offset + size)`, charging the expansion
/// cost difference. Memory is always sized in 32-byte words and zero-filled
/// on growth.
#[inline]
pub(crate) fn verify_memory_region_nonzero(
    state: &mut ExecutionState,
    offset: U256,
    size: NonZeroUsize,
) -> Result<MemoryRegion, ()> {
    if offset > U256::from(MAX_BUFFER_SIZE) {
        return Err(());
    }

    let new_size = offset.as_usize() + size.get();
    let current_size = state.memory.len();
    if new_size > current_size {
        let new_words = num_words(new_size);
        let current_words = (current_size / 32) as i64;
        let new_cost = 3 * new_words + new_words * new_words / 512;
        let current_cost = 3 * current_words + current_words * current_words / 512;
        let cost = new_cost - current_cost;

        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Err(());
        }

        state
            .memory
            .resize((new_words * WORD_SIZE) as usize, Default::default());
    }

    Ok(MemoryRegion {
        offset: offset.as_usize(),
        size,
    })
}

/// Like `verify_memory_region_nonzero`, but zero-size accesses resolve to
/// no region and charge nothing.
#[inline]
pub(crate) fn verify_memory_region(
    state: &mut ExecutionState,
    offset: U256,
    size: U256,
) -> Result<Option<MemoryRegion>, ()> {
    if size.is_zero() {
        return Ok(None);
    }

    if size > U256::from(MAX_BUFFER_SIZE) {
        return Err(());
    }

    let size = NonZeroUsize::new(size.as_usize()).expect("checked non-zero");
    verify_memory_region_nonzero(state, offset, size).map(Some)
}

pub(crate) fn mload(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let index = state.stack.pop();

    let region = match verify_memory_region_nonzero(state, index, word()) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let value =
        U256::from_big_endian(&state.memory[region.offset..region.offset + region.size.get()]);
    state.stack.push(value);
    Continue
}

pub(crate) fn mstore(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let index = state.stack.pop();
    let value = state.stack.pop();

    let region = match verify_memory_region_nonzero(state, index, word()) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let mut b = [0; 32];
    value.to_big_endian(&mut b);
    state.memory[region.offset..region.offset + 32].copy_from_slice(&b);
    Continue
}

pub(crate) fn mstore8(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let index = state.stack.pop();
    let value = state.stack.pop();

    let region = match verify_memory_region_nonzero(state, index, byte()) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    state.memory[region.offset] = (value.low_u32() & 0xff) as u8;
    Continue
}

pub(crate) fn msize(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(state.memory.len().into());
    Continue
}

pub(crate) fn keccak256(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let index = state.stack.pop();
    let size = state.stack.pop();

    let region = match verify_memory_region(state, index, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let hash = if let Some(region) = region {
        let cost = num_words(region.size.get()) * 6;
        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }

        Keccak256::digest(&state.memory[region.offset..region.offset + region.size.get()])
    } else {
        Keccak256::digest([])
    };

    state.stack.push(U256::from_big_endian(&*hash));
    Continue
}

pub(crate) fn calldatacopy(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let mem_index = state.stack.pop();
    let input_index = state.stack.pop();
    let size = state.stack.pop();

    let region = match verify_memory_region(state, mem_index, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    if let Some(region) = region {
        let copy_cost = num_words(region.size.get()) * 3;
        state.gas_left -= copy_cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }

        let input_len = U256::from(state.message.input_data.len());

        let src = min(input_len, input_index).as_usize();
        let copy_size = min(region.size.get(), state.message.input_data.len() - src);

        if copy_size > 0 {
            state.memory[region.offset..region.offset + copy_size]
                .copy_from_slice(&state.message.input_data[src..src + copy_size]);
        }

        if region.size.get() - copy_size > 0 {
            state.memory[region.offset + copy_size..region.offset + region.size.get()].fill(0);
        }
    }

    Continue
}

pub(crate) fn codesize(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(analysis.code.len().into());
    Continue
}

pub(crate) fn codecopy(
    state: &mut ExecutionState,
    analysis: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let mem_index = state.stack.pop();
    let input_index = state.stack.pop();
    let size = state.stack.pop();

    let region = match verify_memory_region(state, mem_index, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    if let Some(region) = region {
        let copy_cost = num_words(region.size.get()) * 3;
        state.gas_left -= copy_cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }

        let code = &analysis.code[..];
        let src = min(U256::from(code.len()), input_index).as_usize();
        let copy_size = min(region.size.get(), code.len() - src);

        if copy_size > 0 {
            state.memory[region.offset..region.offset + copy_size]
                .copy_from_slice(&code[src..src + copy_size]);
        }

        if region.size.get() - copy_size > 0 {
            state.memory[region.offset + copy_size..region.offset + region.size.get()].fill(0);
        }
    }

    Continue
}

pub(crate) fn extcodecopy(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let addr = u256_to_address(state.stack.pop());
    let mem_index = state.stack.pop();
    let input_index = state.stack.pop();
    let size = state.stack.pop();

    let region = match verify_memory_region(state, mem_index, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    if let Some(region) = region {
        let copy_cost = num_words(region.size.get()) * 3;
        state.gas_left -= copy_cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }

        let src = min(U256::from(MAX_BUFFER_SIZE), input_index).as_usize();

        let buffer = &mut state.memory[region.offset..region.offset + region.size.get()];
        let num_bytes_copied = state.host.copy_code(addr, src, buffer);
        if region.size.get() - num_bytes_copied > 0 {
            state.memory[region.offset + num_bytes_copied..region.offset + region.size.get()]
                .fill(0);
        }
    }

    Continue
}

pub(crate) fn returndatasize(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(state.return_data.len().into());
    Continue
}

pub(crate) fn returndatacopy(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let mem_index = state.stack.pop();
    let input_index = state.stack.pop();
    let size = state.stack.pop();

    let region = match verify_memory_region(state, mem_index, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    // Reading past the return data buffer is a hard failure,
    // unlike the zero-filling copy opcodes.
    if input_index > U256::from(state.return_data.len()) {
        return Exit(StatusCode::InvalidMemoryAccess);
    }
    let src = input_index.as_usize();

    if src + region.as_ref().map(|r| r.size.get()).unwrap_or(0) > state.return_data.len() {
        return Exit(StatusCode::InvalidMemoryAccess);
    }

    if let Some(region) = region {
        let copy_cost = num_words(region.size.get()) * 3;
        state.gas_left -= copy_cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }

        state.memory[region.offset..region.offset + region.size.get()]
            .copy_from_slice(&state.return_data[src..src + region.size.get()]);
    }

    Continue
}

pub(crate) fn extcodehash(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let addr = u256_to_address(state.stack.pop());
    let hash = state.host.get_code_hash(addr);
    state.stack.push(U256::from_big_endian(&hash.0));
    Continue
}

#[inline]
fn word() -> NonZeroUsize {
    NonZeroUsize::new(32).expect("const non-zero")
}

#[inline]
fn byte() -> NonZeroUsize {
    NonZeroUsize::new(1).expect("const non-zero")
}
