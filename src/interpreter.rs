use crate::{
    common::{Message, Output, Revision, StatusCode},
    host::Host,
    instructions::{
        control, instruction_table, properties, InstrArg, InstrFn, InstructionResolution,
    },
    opcode::OpCode,
    state::ExecutionState,
    tracing::Tracer,
};
use bytes::Bytes;
use ethereum_types::U256;

/// A pre-decoded instruction: implementation paired with its argument.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Instruction {
    pub(crate) exec: InstrFn,
    pub(crate) arg: InstrArg,
}

/// Execution requirements of one basic block, enforced in a single step
/// by the block-entry instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct BlockInfo {
    /// Sum of the base gas costs of all instructions in the block.
    pub(crate) gas_cost: i64,
    /// The stack height required to execute the block.
    pub(crate) stack_req: i32,
    /// The maximum stack height growth relative to the block entry.
    pub(crate) stack_max: i32,
}

/// Code with analysis: the pre-decoded instruction stream, per-block
/// requirements, the argument pool for large push immediates, and the
/// jump destination mapping.
///
/// Pure function of (code, revision); safe to share between threads for
/// concurrent dispatch over independent execution states.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzedCode {
    pub(crate) instrs: Vec<Instruction>,
    pub(crate) blocks: Vec<BlockInfo>,
    /// Storage for `PUSH9..PUSH32` immediates, big-endian, left zero-padded.
    pub(crate) args_pool: Vec<[u8; 32]>,
    /// The offsets of JUMPDESTs in the original code, sorted.
    /// These are values that JUMP/JUMPI receive as an argument.
    pub(crate) jumpdest_offsets: Vec<u32>,
    /// The indices of pre-decoded instructions matching `jumpdest_offsets`.
    pub(crate) jumpdest_targets: Vec<u32>,
    /// Original (offset, opcode) of each pre-decoded instruction, used for
    /// tracing. `None` for injected block entries and the terminating STOP.
    pub(crate) instr_origins: Vec<Option<(u32, OpCode)>>,
    pub(crate) code: Bytes,
    revision: Revision,
}

impl AnalyzedCode {
    /// Analyze code and prepare it for execution.
    ///
    /// A single forward pass splits the code into basic blocks, accumulates
    /// each block's gas cost and stack requirements, pre-decodes push
    /// immediates, and records the mapping from jump destinations in the
    /// original code to positions in the instruction stream.
    pub fn analyze(code: impl Into<Vec<u8>>, revision: Revision) -> Self {
        let code = code.into();

        let costs = properties::gas_costs(revision);
        let props = &*properties::PROPERTIES;
        let fns = instruction_table::exec_table(revision);

        let mut instrs = Vec::with_capacity(code.len() + 2);
        let mut blocks = Vec::<BlockInfo>::new();
        let mut args_pool = Vec::new();
        let mut jumpdest_offsets = Vec::new();
        let mut jumpdest_targets = Vec::new();
        let mut instr_origins = Vec::with_capacity(code.len() + 2);

        let mut open_block: Option<usize> = None;
        // Net stack height change since block entry, tracked only while
        // analyzing; the block record keeps the required and max heights.
        let mut stack_change = 0i32;

        let mut i = 0;
        while i < code.len() {
            let offset = i;
            let op = OpCode(code[i]);
            let is_jumpdest = op == OpCode::JUMPDEST;

            if open_block.is_none() || is_jumpdest {
                let block_index = blocks.len();
                blocks.push(BlockInfo::default());
                open_block = Some(block_index);
                stack_change = 0;

                // The block-entry instruction replaces JUMPDEST, or is
                // injected when the boundary has none.
                instrs.push(Instruction {
                    exec: control::beginblock,
                    arg: InstrArg::Block(block_index as u32),
                });

                if is_jumpdest {
                    jumpdest_offsets.push(offset as u32);
                    jumpdest_targets.push((instrs.len() - 1) as u32);
                    instr_origins.push(Some((offset as u32, op)));
                } else {
                    instr_origins.push(None);
                }
            }

            let block = &mut blocks[open_block.expect("a block is open here")];

            // Undefined opcodes have no metrics and contribute nothing;
            // they still emit an instruction that reports the failure.
            if let (Some(cost), Some(p)) = (costs[op.to_usize()], props[op.to_usize()]) {
                block.gas_cost += i64::from(cost);

                let stack_req = i32::from(p.stack_height_required);
                block.stack_req = block.stack_req.max(stack_req - stack_change);
                stack_change += i32::from(p.stack_height_change);
                block.stack_max = block.stack_max.max(stack_change);
            }

            if !is_jumpdest {
                let arg = if let Some(push_size) = op.push_size() {
                    // Code may end in the middle of the immediate; the
                    // missing trailing bytes read as zero.
                    let arg = if push_size <= 8 {
                        let mut data = [0u8; 8];
                        let leading_zeros = 8 - push_size;
                        for j in 0..push_size {
                            if let Some(b) = code.get(i + 1 + j) {
                                data[leading_zeros + j] = *b;
                            }
                        }
                        InstrArg::Push(u64::from_be_bytes(data))
                    } else {
                        let mut data = [0u8; 32];
                        let leading_zeros = 32 - push_size;
                        for j in 0..push_size {
                            if let Some(b) = code.get(i + 1 + j) {
                                data[leading_zeros + j] = *b;
                            }
                        }
                        let index = args_pool.len();
                        args_pool.push(data);
                        InstrArg::BigPush(index as u32)
                    };
                    i += push_size;
                    arg
                } else if let Some(height) = op.dup_height() {
                    InstrArg::Number(height as u32)
                } else if let Some(height) = op.swap_height() {
                    InstrArg::Number(height as u32)
                } else if let Some(topics) = op.log_topics() {
                    InstrArg::Number(topics as u32)
                } else {
                    match op {
                        // JUMP and JUMPI resolve targets against original
                        // code offsets, so PC must push exactly those.
                        OpCode::PC => InstrArg::Number(offset as u32),
                        // GAS needs the block gas charged so far to undo
                        // the part of the upfront charge that belongs to
                        // instructions after it.
                        OpCode::GAS => InstrArg::BlockGas(block.gas_cost as u64),
                        _ => InstrArg::None,
                    }
                };

                instrs.push(Instruction {
                    exec: fns[op.to_usize()],
                    arg,
                });
                instr_origins.push(Some((offset as u32, op)));
            }

            match op {
                OpCode::JUMP
                | OpCode::JUMPI
                | OpCode::STOP
                | OpCode::RETURN
                | OpCode::REVERT
                | OpCode::SELFDESTRUCT
                | OpCode::INVALID
                | OpCode::CALL
                | OpCode::CALLCODE
                | OpCode::DELEGATECALL
                | OpCode::STATICCALL
                | OpCode::CREATE
                | OpCode::CREATE2 => {
                    open_block = None;
                }
                _ => {}
            }

            i += 1;
        }

        // Unterminated code falls through here; the injected STOP makes
        // dispatch end deterministically in every case.
        instrs.push(Instruction {
            exec: control::stop,
            arg: InstrArg::None,
        });
        instr_origins.push(None);

        Self {
            instrs,
            blocks,
            args_pool,
            jumpdest_offsets,
            jumpdest_targets,
            instr_origins,
            code: Bytes::from(code),
            revision,
        }
    }

    /// The revision this analysis was produced for.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Translates a jump target in original code coordinates into the
    /// pre-decoded instruction index, if it is a valid destination.
    pub(crate) fn find_jumpdest(&self, offset: U256) -> Option<usize> {
        if offset > U256::from(u32::MAX) {
            return None;
        }
        let offset = offset.low_u32();
        self.jumpdest_offsets
            .binary_search(&offset)
            .ok()
            .map(|i| self.jumpdest_targets[i] as usize)
    }

    /// Execute analyzed EVM bytecode using provided `Host` context.
    pub fn execute<H, T>(&self, host: &mut H, mut tracer: T, message: Message) -> Output
    where
        H: Host,
        T: Tracer,
    {
        if !T::DUMMY {
            tracer.notify_execution_start(self.revision, message.clone(), self.code.clone());
        }

        let mut state = ExecutionState::new(host, message, self.revision);

        let mut pc = 0;
        let status = loop {
            let Instruction { exec, arg } = self.instrs[pc];

            if !T::DUMMY {
                if let Some((offset, opcode)) = self.instr_origins[pc] {
                    tracer.notify_instruction_start(offset as usize, opcode, &state);
                }
            }

            // Advance first so jump instructions may overwrite the cursor.
            pc += 1;

            match exec(&mut state, self, arg) {
                InstructionResolution::Continue => {}
                InstructionResolution::Jump(target) => pc = target,
                InstructionResolution::Exit(status) => break status,
            }
        };

        // Only a normal or reverted completion keeps the remaining gas
        // and the output window; every failure consumes everything.
        let output = match status {
            StatusCode::Success | StatusCode::Revert => Output {
                status_code: status,
                gas_left: state.gas_left,
                output_data: state.output_data.clone(),
                create_address: None,
            },
            _ => Output {
                status_code: status,
                gas_left: 0,
                output_data: Bytes::new(),
                create_address: None,
            },
        };

        if !T::DUMMY {
            tracer.notify_execution_end(&output);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn analyze(code: &[u8]) -> AnalyzedCode {
        AnalyzedCode::analyze(code.to_vec(), Revision::latest())
    }

    #[test]
    fn empty_code_terminates() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.instrs.len(), 1);
        assert!(analysis.blocks.is_empty());
    }

    #[test]
    fn synthetic_stop_always_appended() {
        // Unterminated code and code ending in JUMPI both need it.
        for code in [&hex!("6001") as &[u8], &hex!("600157")] {
            let analysis = analyze(code);
            let last = analysis.instrs.last().unwrap();
            assert_eq!(last.arg, InstrArg::None);
            assert_eq!(*analysis.instr_origins.last().unwrap(), None);
        }
    }

    #[test]
    fn single_block_metrics() {
        // PUSH1 1, PUSH1 2, ADD, STOP
        let analysis = analyze(&hex!("600160020100"));
        assert_eq!(analysis.blocks.len(), 1);
        assert_eq!(
            analysis.blocks[0],
            BlockInfo {
                gas_cost: 9,
                stack_req: 0,
                stack_max: 2,
            }
        );
    }

    #[test]
    fn stack_requirements_propagate_into_block() {
        // DUP1 needs one item already on the stack at block entry.
        let analysis = analyze(&hex!("8000"));
        assert_eq!(analysis.blocks[0].stack_req, 1);

        // PUSH1, SWAP2: two more items needed beneath the push.
        let analysis = analyze(&hex!("60019100"));
        assert_eq!(analysis.blocks[0].stack_req, 2);
        assert_eq!(analysis.blocks[0].stack_max, 1);
    }

    #[test]
    fn jumpdest_mapping_follows_original_pc() {
        // PUSH1 4, JUMP, STOP, JUMPDEST, STOP
        let analysis = analyze(&hex!("600456005b00"));
        assert_eq!(analysis.jumpdest_offsets, vec![4]);

        let target = analysis.find_jumpdest(4.into()).unwrap();
        assert_eq!(analysis.instrs[target].arg, InstrArg::Block(2));
        assert_eq!(analysis.instr_origins[target], Some((4, OpCode::JUMPDEST)));

        assert_eq!(analysis.find_jumpdest(3.into()), None);
        assert_eq!(analysis.find_jumpdest(U256::MAX), None);
    }

    #[test]
    fn push_immediate_shadows_jumpdest() {
        // The 0x5b at offset 1 is PUSH1 data; only offset 2 is real.
        let analysis = analyze(&hex!("605b5b"));
        assert_eq!(analysis.jumpdest_offsets, vec![2]);
    }

    #[test]
    fn small_push_inlined() {
        let analysis = analyze(&hex!("6801020304050607080900"));
        assert!(!analysis.args_pool.is_empty());

        let analysis = analyze(&hex!("60ff00"));
        assert!(analysis.args_pool.is_empty());
        assert_eq!(analysis.instrs[1].arg, InstrArg::Push(0xff));
    }

    #[test]
    fn large_push_pooled() {
        let mut code = vec![OpCode::PUSH32.to_u8()];
        code.extend_from_slice(&[0xaa; 32]);
        let analysis = analyze(&code);
        assert_eq!(analysis.args_pool.len(), 1);
        assert_eq!(analysis.args_pool[0], [0xaa; 32]);
        assert_eq!(analysis.instrs[1].arg, InstrArg::BigPush(0));
    }

    #[test]
    fn truncated_push_reads_as_zero_padded() {
        // PUSH2 with only one immediate byte left.
        let analysis = analyze(&hex!("61ab"));
        assert_eq!(analysis.instrs[1].arg, InstrArg::Push(0xab00));

        // PUSH32 with a single byte: left-aligned in the 32-byte word.
        let analysis = analyze(&hex!("7fab"));
        let mut expected = [0u8; 32];
        expected[0] = 0xab;
        assert_eq!(analysis.args_pool[0], expected);
    }

    #[test]
    fn blocks_close_at_branches_and_calls() {
        // PUSH1 0, PUSH1 0, PUSH1 0, PUSH1 0, PUSH1 0, PUSH1 0, PUSH1 0,
        // CALL, POP, STOP: the call ends its block.
        let analysis = analyze(&hex!("6000600060006000600060006000f15000"));
        assert_eq!(analysis.blocks.len(), 2);
        assert_eq!(analysis.blocks[1].stack_req, 1);
    }

    #[test]
    fn jumpdest_starts_new_block() {
        // ADD runs in the block opened by the JUMPDEST.
        let analysis = analyze(&hex!("60015b60010100"));
        assert_eq!(analysis.blocks.len(), 2);
        assert_eq!(analysis.blocks[0].gas_cost, 3);
        assert_eq!(analysis.blocks[1].gas_cost, 1 + 3 + 3);
    }

    #[test]
    fn undefined_opcode_contributes_no_gas() {
        // 0x0c is unassigned in every revision.
        let analysis = analyze(&hex!("60010c00"));
        assert_eq!(analysis.blocks[0].gas_cost, 3);
    }

    #[test]
    fn revision_gates_opcodes() {
        let byzantium = AnalyzedCode::analyze(hex!("600160021b00").to_vec(), Revision::Byzantium);
        let constantinople =
            AnalyzedCode::analyze(hex!("600160021b00").to_vec(), Revision::Constantinople);
        // SHL priced only from Constantinople on.
        assert_eq!(byzantium.blocks[0].gas_cost, 6);
        assert_eq!(constantinople.blocks[0].gas_cost, 9);
    }

    #[test]
    fn analysis_is_idempotent() {
        let code = hex!("600456005b60016002017f0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f2000");
        assert_eq!(analyze(&code), analyze(&code));
    }
}
