use super::{InstrArg, InstructionResolution, InstructionResolution::*};
use crate::{interpreter::AnalyzedCode, state::ExecutionState, Revision, StatusCode};
use ethereum_types::{U256, U512};

pub(crate) fn add(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.overflowing_add(b).0);
    Continue
}

pub(crate) fn mul(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.overflowing_mul(b).0);
    Continue
}

pub(crate) fn sub(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.overflowing_sub(b).0);
    Continue
}

pub(crate) fn div(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state
        .stack
        .push(if b.is_zero() { U256::zero() } else { a / b });
    Continue
}

pub(crate) fn sdiv(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let (a, sign_a) = get_and_reset_sign(state.stack.pop());
    let (b, sign_b) = get_and_reset_sign(state.stack.pop());

    // Wrapping semantics give -2^255 / -1 = -2^255 with no special case:
    // both magnitudes are 2^255 and the quotient re-encodes to itself.
    let v = if b.is_zero() {
        U256::zero()
    } else {
        set_sign(a / b, sign_a ^ sign_b)
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn modulo(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state
        .stack
        .push(if b.is_zero() { U256::zero() } else { a % b });
    Continue
}

pub(crate) fn smod(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let (a, sign_a) = get_and_reset_sign(state.stack.pop());
    let (b, _) = get_and_reset_sign(state.stack.pop());

    // The result takes the sign of the dividend.
    let v = if b.is_zero() {
        U256::zero()
    } else {
        set_sign(a % b, sign_a)
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn addmod(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = U512::from(state.stack.pop());
    let b = U512::from(state.stack.pop());
    let c = U512::from(state.stack.pop());

    let v = if c.is_zero() {
        U256::zero()
    } else {
        let v = (a + b) % c;
        v.try_into().expect("modulus fits 256 bits")
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn mulmod(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = U512::from(state.stack.pop());
    let b = U512::from(state.stack.pop());
    let c = U512::from(state.stack.pop());

    let v = if c.is_zero() {
        U256::zero()
    } else {
        let v = (a * b) % c;
        v.try_into().expect("modulus fits 256 bits")
    };

    state.stack.push(v);
    Continue
}

fn log2floor(value: U256) -> u64 {
    debug_assert!(value != U256::zero());
    let mut l: u64 = 256;
    for i in 0..4 {
        let i = 3 - i;
        if value.0[i] == 0u64 {
            l -= 64;
        } else {
            l -= u64::from(value.0[i].leading_zeros());
            if l == 0 {
                return l;
            } else {
                return l - 1;
            }
        }
    }
    l
}

pub(crate) fn exp(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let base = state.stack.pop();
    let power = state.stack.pop();

    if !power.is_zero() {
        let per_byte = if state.evm_revision >= Revision::Spurious {
            50
        } else {
            10
        };
        let additional_gas = per_byte * (log2floor(power) / 8 + 1);

        state.gas_left -= additional_gas as i64;
        if state.gas_left < 0 {
            return Exit(StatusCode::OutOfGas);
        }
    }

    state.stack.push(base.overflowing_pow(power).0);
    Continue
}

pub(crate) fn signextend(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();

    let v = if a < U256::from(32) {
        let bit_position = (a.low_u64() * 8 + 7) as usize;
        let mask = (U256::one() << bit_position) - U256::one();
        if b.bit(bit_position) {
            b | !mask
        } else {
            b & mask
        }
    } else {
        b
    };

    state.stack.push(v);
    Continue
}

/// Splits a two's complement word into its magnitude and sign.
pub(crate) fn get_and_reset_sign(value: U256) -> (U256, bool) {
    let U256(arr) = value;
    let sign = arr[3].leading_zeros() == 0;
    (set_sign(value, sign), sign)
}

/// Re-encodes a magnitude as a two's complement word with the given sign.
pub(crate) fn set_sign(value: U256, sign: bool) -> U256 {
    if sign {
        (!U256::zero() ^ value).overflowing_add(U256::one()).0
    } else {
        value
    }
}
