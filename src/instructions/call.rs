use super::{
    memory::{self, MemoryRegion},
    InstrArg, InstructionResolution,
    InstructionResolution::*,
};
use crate::{
    common::{address_to_u256, u256_to_address},
    interpreter::AnalyzedCode,
    state::ExecutionState,
    CallKind, Message, Revision, StatusCode,
};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use std::cmp::min;

const CALL_DEPTH_LIMIT: i32 = 1024;
const VALUE_TRANSFER_COST: i64 = 9000;
const NEW_ACCOUNT_COST: i64 = 25000;
const CALL_STIPEND: i64 = 2300;

pub(crate) fn call(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_call(state, CallKind::Call, false)
}

pub(crate) fn callcode(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_call(state, CallKind::CallCode, false)
}

pub(crate) fn delegatecall(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_call(state, CallKind::DelegateCall, false)
}

pub(crate) fn staticcall(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_call(state, CallKind::Call, true)
}

pub(crate) fn create(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_create(state, false)
}

pub(crate) fn create2(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    do_create(state, true)
}

fn do_call(
    state: &mut ExecutionState,
    kind: CallKind,
    is_static_call: bool,
) -> InstructionResolution {
    let gas = state.stack.pop();
    let dst = u256_to_address(state.stack.pop());
    let value = if is_static_call || matches!(kind, CallKind::DelegateCall) {
        U256::zero()
    } else {
        state.stack.pop()
    };
    let has_value = !value.is_zero();
    let input_offset = state.stack.pop();
    let input_size = state.stack.pop();
    let output_offset = state.stack.pop();
    let output_size = state.stack.pop();

    state.stack.push(U256::zero()); // Assume failure.

    let input_region = match memory::verify_memory_region(state, input_offset, input_size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let output_region = match memory::verify_memory_region(state, output_offset, output_size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let mut msg = Message {
        kind,
        is_static: is_static_call || state.message.is_static,
        depth: state.message.depth + 1,
        destination: dst,
        sender: if matches!(kind, CallKind::DelegateCall) {
            state.message.sender
        } else {
            state.message.destination
        },
        gas: i64::MAX,
        value: if matches!(kind, CallKind::DelegateCall) {
            state.message.value
        } else {
            value
        },
        input_data: input_region
            .map(|MemoryRegion { offset, size }| {
                state.memory[offset..offset + size.get()].to_vec().into()
            })
            .unwrap_or_default(),
    };

    let mut cost = if has_value { VALUE_TRANSFER_COST } else { 0 };

    if matches!(kind, CallKind::Call) {
        if has_value && state.message.is_static {
            return Exit(StatusCode::StaticModeViolation);
        }

        // Forcing a nonexistent account into existence costs extra:
        // on every call before Spurious Dragon, and only on value
        // transfers afterwards.
        if (has_value || state.evm_revision < Revision::Spurious)
            && !state.host.account_exists(dst)
        {
            cost += NEW_ACCOUNT_COST;
        }
    }
    state.gas_left -= cost;
    if state.gas_left < 0 {
        return Exit(StatusCode::OutOfGas);
    }

    if gas < U256::from(msg.gas) {
        msg.gas = gas.as_u64() as i64;
    }

    if state.evm_revision >= Revision::Tangerine {
        // All-but-one-64th of the remaining gas caps the forwarded amount.
        msg.gas = min(msg.gas, state.gas_left - state.gas_left / 64);
    } else if msg.gas > state.gas_left {
        return Exit(StatusCode::OutOfGas);
    }

    if has_value {
        msg.gas += CALL_STIPEND;
        state.gas_left += CALL_STIPEND;
    }

    state.return_data.clear();

    if state.message.depth >= CALL_DEPTH_LIMIT {
        return Continue;
    }

    if has_value && state.host.get_balance(state.message.destination) < value {
        return Continue;
    }

    let msg_gas = msg.gas;
    let result = state.host.call(&msg);
    state.return_data = result.output_data.clone();
    *state.stack.get_mut(0) = if matches!(result.status_code, StatusCode::Success) {
        U256::one()
    } else {
        U256::zero()
    };

    if let Some(MemoryRegion { offset, size }) = output_region {
        let copy_size = min(size.get(), result.output_data.len());
        if copy_size > 0 {
            state.memory[offset..offset + copy_size]
                .copy_from_slice(&result.output_data[..copy_size]);
        }
    }

    let gas_used = msg_gas - result.gas_left;
    state.gas_left -= gas_used;
    Continue
}

fn do_create(state: &mut ExecutionState, create2: bool) -> InstructionResolution {
    if state.message.is_static {
        return Exit(StatusCode::StaticModeViolation);
    }

    let endowment = state.stack.pop();
    let init_code_offset = state.stack.pop();
    let init_code_size = state.stack.pop();

    let region = match memory::verify_memory_region(state, init_code_offset, init_code_size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    let call_kind = if create2 {
        let salt = state.stack.pop();

        // Hashing of the init code for the address derivation.
        if let Some(region) = &region {
            let salt_cost = memory::num_words(region.size.get()) * 6;
            state.gas_left -= salt_cost;
            if state.gas_left < 0 {
                return Exit(StatusCode::OutOfGas);
            }
        }

        CallKind::Create2 {
            salt: H256(salt.into()),
        }
    } else {
        CallKind::Create
    };

    state.stack.push(U256::zero()); // Assume failure.
    state.return_data.clear();

    if state.message.depth >= CALL_DEPTH_LIMIT {
        return Continue;
    }

    if !endowment.is_zero()
        && state.host.get_balance(state.message.destination) < endowment
    {
        return Continue;
    }

    let msg = Message {
        kind: call_kind,
        is_static: false,
        depth: state.message.depth + 1,
        gas: if state.evm_revision >= Revision::Tangerine {
            state.gas_left - state.gas_left / 64
        } else {
            state.gas_left
        },
        destination: Address::zero(),
        sender: state.message.destination,
        input_data: region
            .map(|MemoryRegion { offset, size }| {
                state.memory[offset..offset + size.get()].to_vec().into()
            })
            .unwrap_or_else(Bytes::new),
        value: endowment,
    };

    let msg_gas = msg.gas;
    let result = state.host.call(&msg);
    state.gas_left -= msg_gas - result.gas_left;

    state.return_data = result.output_data;
    if result.status_code == StatusCode::Success {
        if let Some(created) = result.create_address {
            *state.stack.get_mut(0) = address_to_u256(created);
        }
    }

    Continue
}
