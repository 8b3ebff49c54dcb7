use crate::{
    host::{Host, StorageStatus, TxContext},
    Message, Output, StatusCode,
};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use parking_lot::Mutex;
use std::{cmp::min, collections::HashMap};

/// Single storage slot of a mocked account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageValue {
    pub value: H256,
    /// True once the slot has been written in the current execution,
    /// turning further modifications into `ModifiedAgain`.
    pub dirty: bool,
}

/// In-memory account of `MockedHost`.
#[derive(Clone, Debug, Default)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    pub code: Bytes,
    pub code_hash: H256,
    pub storage: HashMap<H256, StorageValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub creator: Address,
    pub data: Bytes,
    pub topics: Vec<H256>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfdestructRecord {
    pub selfdestructed: Address,
    pub beneficiary: Address,
}

/// Operations observed by the host during execution, in order.
#[derive(Clone, Debug, Default)]
pub struct Records {
    /// Addresses of accounts the interpreter asked about.
    pub account_accesses: Vec<Address>,
    /// Messages of nested calls and creates.
    pub calls: Vec<Message>,
    pub logs: Vec<LogRecord>,
    pub selfdestructs: Vec<SelfdestructRecord>,
    pub blockhashes: Vec<u64>,
}

/// In-memory host for tests.
///
/// World state reads and writes operate on `accounts`; nested calls are not
/// dispatched but answered with a clone of `call_result`.
#[derive(Debug)]
pub struct MockedHost {
    pub accounts: HashMap<Address, Account>,
    pub tx_context: TxContext,
    pub block_hash: H256,
    /// Canned reply for nested calls and creates.
    pub call_result: Output,
    pub recorded: Mutex<Records>,
}

impl Default for MockedHost {
    fn default() -> Self {
        Self {
            accounts: Default::default(),
            tx_context: Default::default(),
            block_hash: Default::default(),
            call_result: Output {
                status_code: StatusCode::Success,
                gas_left: 0,
                output_data: Bytes::new(),
                create_address: None,
            },
            recorded: Default::default(),
        }
    }
}

impl Clone for MockedHost {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            tx_context: self.tx_context.clone(),
            block_hash: self.block_hash,
            call_result: self.call_result.clone(),
            recorded: Mutex::new(self.recorded.lock().clone()),
        }
    }
}

impl MockedHost {
    fn record_account_access(&self, address: Address) {
        self.recorded.lock().account_accesses.push(address);
    }
}

impl Host for MockedHost {
    fn account_exists(&self, address: Address) -> bool {
        self.record_account_access(address);
        self.accounts.contains_key(&address)
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        self.accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .map(|slot| slot.value)
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus {
        let slot = self
            .accounts
            .entry(address)
            .or_default()
            .storage
            .entry(key)
            .or_default();

        let status = if slot.value == value {
            StorageStatus::Unchanged
        } else if slot.value.is_zero() {
            StorageStatus::Added
        } else if value.is_zero() {
            StorageStatus::Deleted
        } else if slot.dirty {
            StorageStatus::ModifiedAgain
        } else {
            StorageStatus::Modified
        };

        slot.dirty = true;
        slot.value = value;

        status
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.record_account_access(address);
        self.accounts
            .get(&address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    fn get_code_size(&self, address: Address) -> U256 {
        self.record_account_access(address);
        self.accounts
            .get(&address)
            .map(|account| account.code.len().into())
            .unwrap_or_default()
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        self.record_account_access(address);
        self.accounts
            .get(&address)
            .map(|account| account.code_hash)
            .unwrap_or_default()
    }

    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize {
        self.record_account_access(address);

        let code = match self.accounts.get(&address) {
            Some(account) => &account.code,
            None => return 0,
        };

        if offset >= code.len() {
            return 0;
        }

        let n = min(buffer.len(), code.len() - offset);
        buffer[..n].copy_from_slice(&code[offset..offset + n]);
        n
    }

    fn selfdestruct(&mut self, address: Address, beneficiary: Address) {
        self.recorded.lock().selfdestructs.push(SelfdestructRecord {
            selfdestructed: address,
            beneficiary,
        });
    }

    fn call(&mut self, msg: &Message) -> Output {
        let mut recorded = self.recorded.lock();
        recorded.account_accesses.push(msg.destination);
        recorded.calls.push(msg.clone());
        self.call_result.clone()
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, block_number: u64) -> H256 {
        self.recorded.lock().blockhashes.push(block_number);
        self.block_hash
    }

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]) {
        self.recorded.lock().logs.push(LogRecord {
            creator: address,
            data: data.to_vec().into(),
            topics: topics.to_vec(),
        });
    }
}
