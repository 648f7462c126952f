//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use swaplock_custody::{MemoryTokenLedger, TokenLedger};
use swaplock_engine::SwapEngine;
use swaplock_gateway::VenueRegistry;
use swaplock_gateway::testing::{FixedRateVenue, fill_quote_exact};
use swaplock_types::{Address, Bytes, EngineConfig, Result, SwapReceipt, SwapRequest, U256};

pub const TOKEN_A: Address = Address::repeat_byte(0xaa);
pub const TOKEN_B: Address = Address::repeat_byte(0xbb);
pub const ENGINE: Address = Address::repeat_byte(0xee);
pub const VENUE: Address = Address::repeat_byte(0xde);
pub const ADMIN: Address = Address::repeat_byte(0xad);
pub const DEPLOYER: Address = Address::repeat_byte(0xd0);
pub const CALLER: Address = Address::repeat_byte(0x01);
pub const RECIPIENT: Address = Address::repeat_byte(0x02);
pub const MALLORY: Address = Address::repeat_byte(0x66);

/// `n` thousandths of one 18-decimal token.
pub fn milli(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(15u64))
}

/// `n` whole 18-decimal tokens.
pub fn whole(n: u64) -> U256 {
    milli(n * 1_000)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Harness {
    pub ledger: Arc<MemoryTokenLedger>,
    pub engine: Arc<SwapEngine<MemoryTokenLedger>>,
}

impl Harness {
    /// Engine bootstrapped with a fixed-rate venue holding 1000 B.
    pub fn new() -> Self {
        init_tracing();

        let ledger = Arc::new(MemoryTokenLedger::new());
        ledger.mint(TOKEN_B, VENUE, whole(1_000)).unwrap();

        let registry = Arc::new(VenueRegistry::new());
        registry
            .deploy(VENUE, Arc::new(FixedRateVenue::new(VENUE, Arc::clone(&ledger))))
            .unwrap();

        let config = EngineConfig {
            engine_address: ENGINE,
            deployer: DEPLOYER,
            administrator: ADMIN,
            venue: Some(VENUE),
        };
        let engine = SwapEngine::bootstrap(&config, Arc::clone(&ledger), registry).unwrap();

        Self {
            ledger,
            engine: Arc::new(engine),
        }
    }

    /// Mint `amount` of `token` to `who` and authorize the engine for
    /// `authorized` of it.
    pub fn fund(&self, who: Address, token: Address, amount: U256, authorized: U256) {
        self.ledger.mint(token, who, amount).unwrap();
        self.ledger.approve(token, who, ENGINE, authorized).unwrap();
    }

    pub fn swap(&self, declared: U256, instructions: impl Into<Bytes>) -> Result<SwapReceipt> {
        let blob = SwapRequest::new(TOKEN_A, TOKEN_B, declared, instructions).encode();
        self.engine.execute_swap(CALLER, &blob, RECIPIENT)
    }

    /// Quote selling `amount_in` A for `amount_out` B at the fixed-rate venue.
    pub fn quote(&self, amount_in: U256, amount_out: U256) -> Bytes {
        fill_quote_exact(TOKEN_A, TOKEN_B, amount_in, amount_out)
    }

    pub fn balance(&self, token: Address, who: Address) -> U256 {
        self.ledger.balance_of(token, who)
    }

    /// Every balance and engine figure a failed call must leave untouched.
    pub fn snapshot(&self) -> Snapshot {
        let holders = [CALLER, RECIPIENT, ENGINE, VENUE, ADMIN];
        let mut balances = Vec::new();
        for token in [TOKEN_A, TOKEN_B] {
            for holder in holders {
                balances.push(self.balance(token, holder));
            }
        }
        Snapshot {
            balances,
            caller_allowance: self.ledger.allowance(TOKEN_A, CALLER, ENGINE),
            retained_a: self.engine.retained_balance(TOKEN_A),
            retained_b: self.engine.retained_balance(TOKEN_B),
            events: self.engine.events().len(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot {
    balances: Vec<U256>,
    caller_allowance: U256,
    retained_a: U256,
    retained_b: U256,
    events: usize,
}
