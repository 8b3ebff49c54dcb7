use super::{memory, InstrArg, InstructionResolution, InstructionResolution::*};
use crate::{
    common::{address_to_u256, u256_to_address},
    host::{StorageStatus, TxContext},
    interpreter::AnalyzedCode,
    state::ExecutionState,
    Revision, StatusCode,
};
use arrayvec::ArrayVec;
use ethereum_types::{H256, U256};

pub(crate) fn address(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(address_to_u256(state.message.destination));
    Continue
}

pub(crate) fn caller(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(address_to_u256(state.message.sender));
    Continue
}

pub(crate) fn callvalue(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    state.stack.push(state.message.value);
    Continue
}

pub(crate) fn balance(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let address = u256_to_address(state.stack.pop());
    let balance = state.host.get_balance(address);
    state.stack.push(balance);
    Continue
}

pub(crate) fn selfbalance(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let balance = state.host.get_balance(state.message.destination);
    state.stack.push(balance);
    Continue
}

pub(crate) fn extcodesize(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let address = u256_to_address(state.stack.pop());
    let code_size = state.host.get_code_size(address);
    state.stack.push(code_size);
    Continue
}

fn push_tx_context(
    state: &mut ExecutionState,
    accessor: fn(TxContext) -> U256,
) -> InstructionResolution {
    let tx_context = state.host.get_tx_context();
    state.stack.push(accessor(tx_context));
    Continue
}

pub(crate) fn origin(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| address_to_u256(c.tx_origin))
}

pub(crate) fn coinbase(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| address_to_u256(c.block_coinbase))
}

pub(crate) fn gasprice(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.tx_gas_price)
}

pub(crate) fn timestamp(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.block_timestamp.into())
}

pub(crate) fn number(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.block_number.into())
}

pub(crate) fn difficulty(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.block_difficulty)
}

pub(crate) fn gaslimit(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.block_gas_limit.into())
}

pub(crate) fn chainid(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    push_tx_context(state, |c| c.chain_id)
}

pub(crate) fn blockhash(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let number = state.stack.pop();

    // Only the 256 most recent blocks are addressable.
    let upper_bound = state.host.get_tx_context().block_number;
    let lower_bound = upper_bound.saturating_sub(256);

    let mut header = H256::zero();
    if number <= U256::from(u64::MAX) {
        let n = number.as_u64();
        if (lower_bound..upper_bound).contains(&n) {
            header = state.host.get_block_hash(n);
        }
    }

    state.stack.push(U256::from_big_endian(&header.0));
    Continue
}

pub(crate) fn sload(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let key = H256(state.stack.pop().into());
    let value = state.host.get_storage(state.message.destination, key);
    state.stack.push(U256::from_big_endian(value.as_bytes()));
    Continue
}

pub(crate) fn sstore(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    if state.message.is_static {
        return Exit(StatusCode::StaticModeViolation);
    }

    // EIP-2200 gas sentry.
    if state.evm_revision >= Revision::Istanbul && state.gas_left <= 2300 {
        return Exit(StatusCode::OutOfGas);
    }

    let key = H256(state.stack.pop().into());
    let value = H256(state.stack.pop().into());

    let status = state
        .host
        .set_storage(state.message.destination, key, value);

    // Net gas metering applies in Constantinople (EIP-1283) and Istanbul
    // (EIP-2200); Petersburg reverted to the legacy schedule. Refund
    // bookkeeping is on the host side of the interface: it observes the
    // same storage status stream.
    let cost: u16 = match status {
        StorageStatus::Unchanged | StorageStatus::ModifiedAgain => {
            if state.evm_revision == Revision::Istanbul {
                800
            } else if state.evm_revision == Revision::Constantinople {
                200
            } else {
                5000
            }
        }
        StorageStatus::Modified | StorageStatus::Deleted => 5000,
        StorageStatus::Added => 20000,
    };
    state.gas_left -= i64::from(cost);
    if state.gas_left < 0 {
        return Exit(StatusCode::OutOfGas);
    }

    Continue
}

pub(crate) fn log(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    arg: InstrArg,
) -> InstructionResolution {
    let num_topics = arg.number();

    if state.message.is_static {
        return Exit(StatusCode::StaticModeViolation);
    }

    let offset = state.stack.pop();
    let size = state.stack.pop();

    let region = match memory::verify_memory_region(state, offset, size) {
        Ok(r) => r,
        Err(_) => return Exit(StatusCode::OutOfGas),
    };

    if let Some(region) = &region {
        let cost = region.size.get() as i64 * 8;
        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }
    }

    let mut topics = ArrayVec::<H256, 4>::new();
    for _ in 0..num_topics {
        topics.push(H256(state.stack.pop().into()));
    }

    let data = region
        .map(|region| state.memory[region.offset..region.offset + region.size.get()].to_vec())
        .unwrap_or_default();
    state
        .host
        .emit_log(state.message.destination, &data, topics.as_slice());
    Continue
}

pub(crate) fn selfdestruct(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    if state.message.is_static {
        return Exit(StatusCode::StaticModeViolation);
    }

    let beneficiary = u256_to_address(state.stack.pop());

    if state.evm_revision >= Revision::Tangerine
        && (state.evm_revision == Revision::Tangerine
            || !state.host.get_balance(state.message.destination).is_zero())
    {
        // Cost of forcing a new account into existence to receive the funds.
        if !state.host.account_exists(beneficiary) {
            state.gas_left -= 25000;
            if state.gas_left < 0 {
                return Exit(StatusCode::OutOfGas);
            }
        }
    }

    state
        .host
        .selfdestruct(state.message.destination, beneficiary);
    Exit(StatusCode::Success)
}
