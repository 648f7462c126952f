//! Administration module and initialization.
//!
//! Only the administrator can point swaps at a new venue and recover retained
//! funds, either all at once with a sweep or in part to a named user with a
//! release. The role itself can be handed over. Every rejected call leaves
//! the engine untouched.

use std::sync::Arc;

use swaplock_custody::TokenLedger;
use swaplock_gateway::VenueRegistry;
use swaplock_types::constants::{ENGINE_NAME, VERSION};
use swaplock_types::{
    Address, AdministrationTransferred, ContractEvent, EngineConfig, ExchangeConfig,
    Initialized, Released, Result, RetainedSwept, SwaplockError, U256, VenueChanged,
};

use crate::engine::SwapEngine;

impl<L: TokenLedger> SwapEngine<L> {
    /// Build an engine from deployment config and initialize it.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation, otherwise as
    /// [`SwapEngine::initialize`].
    pub fn bootstrap(
        config: &EngineConfig,
        ledger: Arc<L>,
        registry: Arc<VenueRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        let engine = Self::new(ledger, config.engine_address, registry);
        engine.initialize(config.deployer, config.administrator, config.initial_venue())?;
        Ok(engine)
    }

    /// One-time setup of the administrator and the initial venue.
    ///
    /// `venue` may be zero; swaps then lock until one is set.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on any call after the first successful one.
    /// - `InvalidAdministrator` for a zero administrator, or the engine's
    ///   own address.
    pub fn initialize(
        &self,
        deployer: Address,
        administrator: Address,
        venue: Address,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if state.config.is_some() {
            return Err(SwaplockError::AlreadyInitialized);
        }
        self.check_administrator(administrator)?;

        state.audit.append(ContractEvent::Initialized(Initialized {
            deployer,
            administrator,
            venue,
        }))?;
        let config = ExchangeConfig {
            venue,
            administrator,
        };
        if !config.has_venue() {
            tracing::warn!("No venue configured; swaps lock until one is set");
        }
        state.config = Some(config);

        tracing::info!(
            engine = ENGINE_NAME,
            version = VERSION,
            %deployer,
            %administrator,
            %venue,
            "Engine initialized"
        );
        Ok(())
    }

    /// Point subsequent swaps at `new_venue`. Zero unsets it.
    ///
    /// # Errors
    /// `Reentrancy`, `NotInitialized`, or `Unauthorized`.
    pub fn set_venue(&self, caller: Address, new_venue: Address) -> Result<()> {
        let _entered = self.guard.enter()?;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let config = state.config()?;
        authorize(config, caller)?;

        let previous = config.venue;
        state.audit.append(ContractEvent::VenueChanged(VenueChanged {
            previous,
            current: new_venue,
        }))?;
        if let Some(config) = state.config.as_mut() {
            config.venue = new_venue;
        }

        tracing::info!(%previous, current = %new_venue, "Venue changed");
        Ok(())
    }

    /// Send everything retained for `token` to `destination`.
    ///
    /// Returns the amount swept.
    ///
    /// # Errors
    /// - `Reentrancy`, `NotInitialized`, or `Unauthorized`.
    /// - `NothingRetained` if the entry is zero.
    /// - `CustodyInvariantViolation` if custody no longer covers the entry.
    /// - The ledger's transfer error (e.g. zero `destination`).
    pub fn sweep_retained(
        &self,
        caller: Address,
        token: Address,
        destination: Address,
    ) -> Result<U256> {
        let _entered = self.guard.enter()?;
        // Ledger session before engine state, the same order a swap takes.
        let checkpoint = self.custody.checkpoint();
        let mut state = self.state.lock();
        authorize(state.config()?, caller)?;

        let amount = state.retained.get(token);
        if amount.is_zero() {
            return Err(SwaplockError::NothingRetained { token });
        }
        self.check_custody_covers(token, amount)?;

        self.custody.push(token, destination, amount)?;
        let appended = state.audit.append(ContractEvent::RetainedSwept(RetainedSwept {
            token,
            destination,
            amount,
        }));
        if let Err(err) = appended {
            self.custody.restore(checkpoint);
            return Err(err);
        }
        state.retained.take(token)?;

        tracing::info!(%token, %destination, %amount, "Retained balance swept");
        Ok(amount)
    }

    /// Pay `amount` of the retained `token` out to `user`, leaving the rest
    /// retained.
    ///
    /// Returns what is still retained for `token`.
    ///
    /// # Errors
    /// - `Reentrancy`, `NotInitialized`, or `Unauthorized`.
    /// - `MalformedRequest` for a zero `amount`.
    /// - `NothingRetained` if the entry is zero, `ReleaseExceedsRetained` if
    ///   it is smaller than `amount`.
    /// - `CustodyInvariantViolation` if custody no longer covers the entry.
    /// - The ledger's transfer error (e.g. zero `user`).
    pub fn release(
        &self,
        caller: Address,
        token: Address,
        user: Address,
        amount: U256,
    ) -> Result<U256> {
        let _entered = self.guard.enter()?;
        let checkpoint = self.custody.checkpoint();
        let mut state = self.state.lock();
        authorize(state.config()?, caller)?;

        if amount.is_zero() {
            return Err(SwaplockError::malformed("release amount is zero"));
        }
        let held = state.retained.get(token);
        if held.is_zero() {
            return Err(SwaplockError::NothingRetained { token });
        }
        let remaining = held
            .checked_sub(amount)
            .ok_or(SwaplockError::ReleaseExceedsRetained {
                token,
                requested: amount,
                retained: held,
            })?;
        self.check_custody_covers(token, held)?;

        self.custody.push(token, user, amount)?;
        let appended = state.audit.append(ContractEvent::Released(Released {
            token,
            user,
            amount,
            remaining,
        }));
        if let Err(err) = appended {
            self.custody.restore(checkpoint);
            return Err(err);
        }
        state.retained.debit(token, amount)?;

        tracing::info!(%token, %user, %amount, %remaining, "Retained balance released");
        Ok(remaining)
    }

    /// Hand the administrator role to `new_administrator`.
    ///
    /// # Errors
    /// - `Reentrancy`, `NotInitialized`, or `Unauthorized`.
    /// - `InvalidAdministrator` for a zero identity or the engine's own
    ///   address.
    pub fn transfer_administration(
        &self,
        caller: Address,
        new_administrator: Address,
    ) -> Result<()> {
        let _entered = self.guard.enter()?;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let config = state.config()?;
        authorize(config, caller)?;
        self.check_administrator(new_administrator)?;

        let previous = config.administrator;
        state
            .audit
            .append(ContractEvent::AdministrationTransferred(
                AdministrationTransferred {
                    previous,
                    current: new_administrator,
                },
            ))?;
        if let Some(config) = state.config.as_mut() {
            config.administrator = new_administrator;
        }

        tracing::info!(%previous, current = %new_administrator, "Administration transferred");
        Ok(())
    }

    fn check_custody_covers(&self, token: Address, retained: U256) -> Result<()> {
        let custody = self.custody.balance(token);
        if retained > custody {
            tracing::error!(%token, %retained, %custody, "Custody invariant violated");
            return Err(SwaplockError::CustodyInvariantViolation {
                token,
                retained,
                custody,
            });
        }
        Ok(())
    }

    fn check_administrator(&self, candidate: Address) -> Result<()> {
        if candidate.is_zero() {
            return Err(SwaplockError::InvalidAdministrator {
                reason: "zero address".into(),
            });
        }
        if candidate == self.address() {
            return Err(SwaplockError::InvalidAdministrator {
                reason: "the engine cannot administer itself".into(),
            });
        }
        Ok(())
    }
}

fn authorize(config: &ExchangeConfig, caller: Address) -> Result<()> {
    if config.is_administrator(caller) {
        Ok(())
    } else {
        tracing::warn!(%caller, "Administrative call rejected");
        Err(SwaplockError::Unauthorized { caller })
    }
}
