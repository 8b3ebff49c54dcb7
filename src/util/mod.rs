mod bytecode;
mod mocked_host;
mod tester;

pub use bytecode::*;
pub use mocked_host::*;
pub use tester::*;
