use super::{arithmetic::get_and_reset_sign, InstrArg, InstructionResolution::*, *};
use ethereum_types::U256;

fn bool_to_u256(v: bool) -> U256 {
    if v {
        U256::one()
    } else {
        U256::zero()
    }
}

pub(crate) fn lt(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_to_u256(a < b));
    Continue
}

pub(crate) fn gt(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_to_u256(a > b));
    Continue
}

pub(crate) fn slt(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let (a, neg_a) = get_and_reset_sign(state.stack.pop());
    let (b, neg_b) = get_and_reset_sign(state.stack.pop());

    let is_positive_lt = a < b && !(neg_a | neg_b);
    let is_negative_lt = a > b && (neg_a & neg_b);
    let has_different_signs = neg_a && !neg_b;

    state
        .stack
        .push(bool_to_u256(is_positive_lt | is_negative_lt | has_different_signs));
    Continue
}

pub(crate) fn sgt(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let (a, neg_a) = get_and_reset_sign(state.stack.pop());
    let (b, neg_b) = get_and_reset_sign(state.stack.pop());

    let is_positive_gt = a > b && !(neg_a | neg_b);
    let is_negative_gt = a < b && (neg_a & neg_b);
    let has_different_signs = !neg_a && neg_b;

    state
        .stack
        .push(bool_to_u256(is_positive_gt | is_negative_gt | has_different_signs));
    Continue
}

pub(crate) fn eq(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_to_u256(a == b));
    Continue
}

pub(crate) fn iszero(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    state.stack.push(bool_to_u256(a.is_zero()));
    Continue
}

pub(crate) fn and(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a & b);
    Continue
}

pub(crate) fn or(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a | b);
    Continue
}

pub(crate) fn xor(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a ^ b);
    Continue
}

pub(crate) fn not(
    state: &mut ExecutionState,
    _: &AnalyzedCode,
    _: InstrArg,
) -> InstructionResolution {
    let a = state.stack.get_mut(0);
    *a = !*a;
    Continue
}
