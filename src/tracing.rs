use crate::{
    common::{Message, Output, Revision},
    opcode::OpCode,
    state::ExecutionState,
};
use bytes::Bytes;

/// Hooks observing EVM execution.
pub trait Tracer {
    /// If true, all tracing plumbing is compiled out of the dispatch loop.
    const DUMMY: bool = false;

    fn notify_execution_start(&mut self, revision: Revision, message: Message, code: Bytes);
    fn notify_instruction_start(&mut self, pc: usize, opcode: OpCode, state: &ExecutionState);
    fn notify_execution_end(&mut self, output: &Output);
}

/// Tracer that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    const DUMMY: bool = true;

    fn notify_execution_start(&mut self, _: Revision, _: Message, _: Bytes) {}
    fn notify_instruction_start(&mut self, _: usize, _: OpCode, _: &ExecutionState) {}
    fn notify_execution_end(&mut self, _: &Output) {}
}

/// Tracer that prints each executed instruction to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutTracer;

impl Tracer for StdoutTracer {
    fn notify_execution_start(&mut self, revision: Revision, message: Message, code: Bytes) {
        println!(
            "Executing message in {} revision with gas {} against code {}",
            revision,
            message.gas,
            hex::encode(&code)
        );
    }

    fn notify_instruction_start(&mut self, pc: usize, opcode: OpCode, state: &ExecutionState) {
        println!(
            "{:>5}: {} (gas left: {}, stack height: {}, memory size: {})",
            pc,
            opcode,
            state.gas_left(),
            state.stack().len(),
            state.memory_size()
        );
    }

    fn notify_execution_end(&mut self, output: &Output) {
        println!(
            "Execution ended with {}, gas left {}, output {}",
            output.status_code,
            output.gas_left,
            hex::encode(&output.output_data)
        );
    }
}
