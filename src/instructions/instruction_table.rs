use super::{
    arithmetic, bitwise, boolean, call, control, external, memory, properties, stack_manip,
    InstrFn,
};
use crate::{opcode::OpCode, Revision};
use once_cell::sync::Lazy;

pub(crate) type ExecTable = [InstrFn; 256];

/// Implementations of every opcode ever assigned.
///
/// Revision tables below disable the entries not priced in that revision.
static ALL_FNS: Lazy<ExecTable> = Lazy::new(|| {
    let mut table: ExecTable = [control::undefined as InstrFn; 256];

    table[OpCode::STOP.to_usize()] = control::stop;
    table[OpCode::ADD.to_usize()] = arithmetic::add;
    table[OpCode::MUL.to_usize()] = arithmetic::mul;
    table[OpCode::SUB.to_usize()] = arithmetic::sub;
    table[OpCode::DIV.to_usize()] = arithmetic::div;
    table[OpCode::SDIV.to_usize()] = arithmetic::sdiv;
    table[OpCode::MOD.to_usize()] = arithmetic::modulo;
    table[OpCode::SMOD.to_usize()] = arithmetic::smod;
    table[OpCode::ADDMOD.to_usize()] = arithmetic::addmod;
    table[OpCode::MULMOD.to_usize()] = arithmetic::mulmod;
    table[OpCode::EXP.to_usize()] = arithmetic::exp;
    table[OpCode::SIGNEXTEND.to_usize()] = arithmetic::signextend;

    table[OpCode::LT.to_usize()] = boolean::lt;
    table[OpCode::GT.to_usize()] = boolean::gt;
    table[OpCode::SLT.to_usize()] = boolean::slt;
    table[OpCode::SGT.to_usize()] = boolean::sgt;
    table[OpCode::EQ.to_usize()] = boolean::eq;
    table[OpCode::ISZERO.to_usize()] = boolean::iszero;
    table[OpCode::AND.to_usize()] = boolean::and;
    table[OpCode::OR.to_usize()] = boolean::or;
    table[OpCode::XOR.to_usize()] = boolean::xor;
    table[OpCode::NOT.to_usize()] = boolean::not;
    table[OpCode::BYTE.to_usize()] = bitwise::byte;
    table[OpCode::SHL.to_usize()] = bitwise::shl;
    table[OpCode::SHR.to_usize()] = bitwise::shr;
    table[OpCode::SAR.to_usize()] = bitwise::sar;

    table[OpCode::KECCAK256.to_usize()] = memory::keccak256;

    table[OpCode::ADDRESS.to_usize()] = external::address;
    table[OpCode::BALANCE.to_usize()] = external::balance;
    table[OpCode::ORIGIN.to_usize()] = external::origin;
    table[OpCode::CALLER.to_usize()] = external::caller;
    table[OpCode::CALLVALUE.to_usize()] = external::callvalue;
    table[OpCode::CALLDATALOAD.to_usize()] = control::calldataload;
    table[OpCode::CALLDATASIZE.to_usize()] = control::calldatasize;
    table[OpCode::CALLDATACOPY.to_usize()] = memory::calldatacopy;
    table[OpCode::CODESIZE.to_usize()] = memory::codesize;
    table[OpCode::CODECOPY.to_usize()] = memory::codecopy;
    table[OpCode::GASPRICE.to_usize()] = external::gasprice;
    table[OpCode::EXTCODESIZE.to_usize()] = external::extcodesize;
    table[OpCode::EXTCODECOPY.to_usize()] = memory::extcodecopy;
    table[OpCode::RETURNDATASIZE.to_usize()] = memory::returndatasize;
    table[OpCode::RETURNDATACOPY.to_usize()] = memory::returndatacopy;
    table[OpCode::EXTCODEHASH.to_usize()] = memory::extcodehash;

    table[OpCode::BLOCKHASH.to_usize()] = external::blockhash;
    table[OpCode::COINBASE.to_usize()] = external::coinbase;
    table[OpCode::TIMESTAMP.to_usize()] = external::timestamp;
    table[OpCode::NUMBER.to_usize()] = external::number;
    table[OpCode::DIFFICULTY.to_usize()] = external::difficulty;
    table[OpCode::GASLIMIT.to_usize()] = external::gaslimit;
    table[OpCode::CHAINID.to_usize()] = external::chainid;
    table[OpCode::SELFBALANCE.to_usize()] = external::selfbalance;

    table[OpCode::POP.to_usize()] = stack_manip::pop;
    table[OpCode::MLOAD.to_usize()] = memory::mload;
    table[OpCode::MSTORE.to_usize()] = memory::mstore;
    table[OpCode::MSTORE8.to_usize()] = memory::mstore8;
    table[OpCode::SLOAD.to_usize()] = external::sload;
    table[OpCode::SSTORE.to_usize()] = external::sstore;
    table[OpCode::JUMP.to_usize()] = control::jump;
    table[OpCode::JUMPI.to_usize()] = control::jumpi;
    table[OpCode::PC.to_usize()] = control::pc;
    table[OpCode::MSIZE.to_usize()] = memory::msize;
    table[OpCode::GAS.to_usize()] = control::gas;
    // JUMPDEST is replaced by the block-entry instruction during analysis.
    table[OpCode::JUMPDEST.to_usize()] = control::beginblock;

    for op in OpCode::PUSH1.to_usize()..=OpCode::PUSH8.to_usize() {
        table[op] = stack_manip::push_inline;
    }
    for op in OpCode::PUSH9.to_usize()..=OpCode::PUSH32.to_usize() {
        table[op] = stack_manip::push_pooled;
    }

    for op in OpCode::DUP1.to_usize()..=OpCode::DUP16.to_usize() {
        table[op] = stack_manip::dup;
    }

    for op in OpCode::SWAP1.to_usize()..=OpCode::SWAP16.to_usize() {
        table[op] = stack_manip::swap;
    }

    for op in OpCode::LOG0.to_usize()..=OpCode::LOG4.to_usize() {
        table[op] = external::log;
    }

    table[OpCode::CREATE.to_usize()] = call::create;
    table[OpCode::CALL.to_usize()] = call::call;
    table[OpCode::CALLCODE.to_usize()] = call::callcode;
    table[OpCode::RETURN.to_usize()] = control::op_return;
    table[OpCode::DELEGATECALL.to_usize()] = call::delegatecall;
    table[OpCode::CREATE2.to_usize()] = call::create2;
    table[OpCode::STATICCALL.to_usize()] = call::staticcall;
    table[OpCode::REVERT.to_usize()] = control::op_revert;
    table[OpCode::INVALID.to_usize()] = control::invalid;
    table[OpCode::SELFDESTRUCT.to_usize()] = external::selfdestruct;

    table
});

static EXEC_TABLES: Lazy<[ExecTable; Revision::len()]> = Lazy::new(|| {
    let mut tables = [[control::undefined as InstrFn; 256]; Revision::len()];
    for revision in Revision::iter() {
        let costs = properties::gas_costs(revision);
        let table = &mut tables[revision as usize];
        for op in 0..256 {
            if costs[op].is_some() {
                table[op] = ALL_FNS[op];
            }
        }
    }
    tables
});

/// The exec-fn table of the given revision; undefined opcodes map to an
/// instruction reporting `StatusCode::UndefinedInstruction`.
pub(crate) fn exec_table(revision: Revision) -> &'static ExecTable {
    &EXEC_TABLES[revision as usize]
}
