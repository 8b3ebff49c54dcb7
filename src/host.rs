use crate::common::{Message, Output, StatusCode};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

/// Effect of a storage write as seen by the world state.
///
/// Fed back into the SSTORE gas and refund schedule of the active revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// The value of a storage item has been left unchanged: 0 -> 0 and X -> X.
    Unchanged,
    /// The value of a storage item has been modified: X -> Y.
    Modified,
    /// A storage item has been modified after being modified before: X -> Y -> Z.
    ModifiedAgain,
    /// A new storage item has been added: 0 -> X.
    Added,
    /// A storage item has been deleted: X -> 0.
    Deleted,
}

/// The transaction and block data for execution.
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// The transaction gas price.
    pub tx_gas_price: U256,
    /// The transaction origin account.
    pub tx_origin: Address,
    /// The miner of the block.
    pub block_coinbase: Address,
    /// The block number.
    pub block_number: u64,
    /// The block timestamp.
    pub block_timestamp: u64,
    /// The block gas limit.
    pub block_gas_limit: u64,
    /// The block difficulty.
    pub block_difficulty: U256,
    /// The blockchain's ChainID.
    pub chain_id: U256,
}

/// Abstraction that exposes host context to EVM.
///
/// All calls are synchronous; nested EVM messages recurse through `call`
/// on the same thread.
pub trait Host {
    /// Check if an account exists.
    fn account_exists(&self, address: Address) -> bool;
    /// Get value of a storage key.
    ///
    /// Returns `H256::zero()` if does not exist.
    fn get_storage(&self, address: Address, key: H256) -> H256;
    /// Set value of a storage key.
    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus;
    /// Get balance of an account.
    ///
    /// Returns `0` if account does not exist.
    fn get_balance(&self, address: Address) -> U256;
    /// Get code size of an account.
    ///
    /// Returns `0` if account does not exist.
    fn get_code_size(&self, address: Address) -> U256;
    /// Get code hash of an account.
    ///
    /// Returns `H256::zero()` if account does not exist.
    fn get_code_hash(&self, address: Address) -> H256;
    /// Copy code of an account starting at `offset` into `buffer`,
    /// returning the number of bytes copied.
    ///
    /// Returns `0` if offset is invalid.
    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize;
    /// Self-destruct account.
    fn selfdestruct(&mut self, address: Address, beneficiary: Address);
    /// Call to another account.
    fn call(&mut self, msg: &Message) -> Output;
    /// Retrieve transaction context.
    fn get_tx_context(&self) -> TxContext;
    /// Get block hash.
    ///
    /// Returns `H256::zero()` if block does not exist.
    fn get_block_hash(&self, block_number: u64) -> H256;
    /// Emit a log.
    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]);
}

/// Host that does not support any ops.
///
/// Useful for executing pure computation without world state access.
pub struct DummyHost;

impl Host for DummyHost {
    fn account_exists(&self, _: Address) -> bool {
        false
    }

    fn get_storage(&self, _: Address, _: H256) -> H256 {
        H256::zero()
    }

    fn set_storage(&mut self, _: Address, _: H256, _: H256) -> StorageStatus {
        StorageStatus::Unchanged
    }

    fn get_balance(&self, _: Address) -> U256 {
        U256::zero()
    }

    fn get_code_size(&self, _: Address) -> U256 {
        U256::zero()
    }

    fn get_code_hash(&self, _: Address) -> H256 {
        H256::zero()
    }

    fn copy_code(&self, _: Address, _: usize, _: &mut [u8]) -> usize {
        0
    }

    fn selfdestruct(&mut self, _: Address, _: Address) {}

    fn call(&mut self, _: &Message) -> Output {
        Output {
            status_code: StatusCode::Failure,
            gas_left: 0,
            output_data: Bytes::new(),
            create_address: None,
        }
    }

    fn get_tx_context(&self) -> TxContext {
        TxContext::default()
    }

    fn get_block_hash(&self, _: u64) -> H256 {
        H256::zero()
    }

    fn emit_log(&mut self, _: Address, _: &[u8], _: &[H256]) {}
}
