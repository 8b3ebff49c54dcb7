use super::{InstrArg, InstructionResolution::*, *};
use ethereum_types::U256;

pub(crate) fn byte(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let n = state.stack.pop();
    let value = state.stack.pop();

    let v = if n < U256::from(32) {
        (value >> (8 * (31 - n.low_u64() as usize))) & U256::from(0xff)
    } else {
        U256::zero()
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn shl(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let shift = state.stack.pop();
    let value = state.stack.pop();

    let v = if value.is_zero() || shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.as_usize()
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn shr(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let shift = state.stack.pop();
    let value = state.stack.pop();

    let v = if value.is_zero() || shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.as_usize()
    };

    state.stack.push(v);
    Continue
}

pub(crate) fn sar(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let shift = state.stack.pop();
    let value = state.stack.pop();
    let sign = value.bit(255);

    let v = if shift >= U256::from(256) {
        if sign {
            U256::max_value()
        } else {
            U256::zero()
        }
    } else {
        let shift = shift.as_usize();
        let mut shifted = value >> shift;
        if sign && shift > 0 {
            // The vacated high bits replicate the sign.
            shifted = shifted | (U256::max_value() << (256 - shift));
        }
        shifted
    };

    state.stack.push(v);
    Continue
}
