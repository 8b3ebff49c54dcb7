//! Fast EVM interpreter built around pre-decoded instruction streams.
//!
//! Code is analyzed once per invocation into basic blocks whose gas and
//! stack requirements are checked in a single step at block entry, so the
//! dispatch loop itself stays branch-light.
//!
//! # Usage
//! ```
//! use evmjet::{*, host::*, tracing::*, util::*};
//! use ethereum_types::{Address, U256};
//!
//! let my_code = Bytecode::new()
//!     .mstore8_value(0, b'h')
//!     .mstore8_value(1, b'e')
//!     .mstore8_value(2, b'l')
//!     .mstore8_value(3, b'l')
//!     .mstore8_value(4, b'o')
//!     .ret(0, 5)
//!     .build();
//!
//! let message = Message {
//!     kind: CallKind::Call,
//!     is_static: true,
//!     depth: 0,
//!     gas: 200,
//!     destination: Address::zero(),
//!     sender: Address::zero(),
//!     input_data: vec![].into(),
//!     value: U256::zero(),
//! };
//!
//! assert_eq!(
//!     AnalyzedCode::analyze(my_code, Revision::latest())
//!         .execute(&mut DummyHost, NoopTracer, message),
//!     Output {
//!         status_code: StatusCode::Success,
//!         gas_left: 146,
//!         output_data: b"hello".to_vec().into(),
//!         create_address: None,
//!     }
//! )
//! ```
pub use common::{CallKind, Message, Output, Revision, StatusCode};
pub use host::Host;
pub use interpreter::AnalyzedCode;
pub use opcode::OpCode;

mod common;
pub mod host;
#[doc(hidden)]
pub mod instructions;
mod interpreter;
pub mod opcode;
mod state;
pub mod tracing;

#[cfg(feature = "util")]
pub mod util;

pub use state::{ExecutionState, Stack};

/// Analyze and execute `code` in one shot.
pub fn execute<H: Host>(
    host: &mut H,
    revision: Revision,
    message: Message,
    code: &[u8],
) -> Output {
    AnalyzedCode::analyze(code.to_vec(), revision).execute(host, crate::tracing::NoopTracer, message)
}
