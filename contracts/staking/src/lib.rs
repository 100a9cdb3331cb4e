#![no_std]

//! Fixed-term staking with lock tiers.
//!
//! Users lock the stake token under one of a few [`LockTier`]s, each with its
//! own duration, annual rate and capacity. Each stake is a separate
//! [`Position`] that earns simple interest and is closed exactly once, either
//! by `unstake` (paid out under the penalty schedule in [`settlement`]) or by
//! `rollover` (matured value re-committed at a bonus rate).
//!
//! The contract keeps global aggregates in [`LedgerState`]: open principal,
//! open principal per tier, and the reward liability booked for open
//! positions.

pub mod events;
pub mod ledger;
pub mod rewards;
pub mod settlement;
pub mod tiers;
pub mod vault;

use common::{pausable, roles};
use soroban_sdk::{contract, contractimpl, contracttype, log, symbol_short, Address, Env, Symbol, Vec};

pub use ledger::{LedgerState, Position};
pub use settlement::{ExitRegime, SettlementPolicy};
pub use tiers::{LockTier, TierConfig};

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const TREASURY: Symbol = symbol_short!("TREASURY");
const POLICY: Symbol = symbol_short!("POLICY");

const INSTANCE_TTL_THRESHOLD: u32 = 518_400; // ~30 days
const INSTANCE_TTL_EXTEND_TO: u32 = 1_036_800; // ~60 days

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    CapacityExceeded = 5,
    InvalidIndex = 6,
    AlreadySettled = 7,
    NotMatured = 8,
    TreasuryUnset = 9,
    SystemPaused = 10,
    InsufficientFunds = 11,
    InvalidConfig = 12,
    /// Aggregate counters would leave their valid range. Never returned;
    /// raised with `panic_with_error!`.
    LedgerInvariant = 13,
}

// ── Return types ─────────────────────────────────────────────────────────────

/// What an unstake paid out.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub principal: i128,
    pub reward: i128,
    pub penalty: i128,
}

/// The position a rollover opened.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RolloverReceipt {
    pub new_index: u32,
    pub new_principal: i128,
    pub new_rate: u32,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct TermStakingContract;

#[contractimpl]
impl TermStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `admin`       – may add and remove managers; is itself a manager.
    /// * `stake_token` – SAC address of the token staked and paid as reward.
    ///
    /// Tiers start from their defaults; no treasury is set, so unstaking is
    /// unavailable until a manager calls `set_treasury`.
    pub fn initialize(env: Env, admin: Address, stake_token: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage()
            .instance()
            .set(&POLICY, &SettlementPolicy::standard());
        vault::set_stake_token(&env, &stake_token);
        roles::grant_manager(&env, &admin);
        Self::extend_instance(&env);

        events::publish_initialized(&env, admin, stake_token);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` under `tier` and return the new position's index.
    ///
    /// The position copies the tier's current duration and rate, and the
    /// full-term reward is booked as liability straight away.
    pub fn stake(env: Env, user: Address, amount: i128, tier: LockTier) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        Self::require_not_paused(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        // 1. Checks: tier room and the user's funds.
        let config = tiers::tier_config(&env, tier);
        let mut state = LedgerState::load(&env);
        if let Err(err) = tiers::check_capacity(state.tier_principal(tier), amount, config.capacity) {
            log!(&env, "stake rejected: tier capacity {}", config.capacity);
            return Err(err);
        }
        vault::ensure_balance(&env, &user, amount)?;

        // 2. Effects: open the position and book it.
        let now = env.ledger().timestamp();
        let position = Position {
            principal: amount,
            start_time: now,
            lock_duration: config.duration,
            annual_rate: config.annual_rate,
            tier,
            settled: false,
        };
        let index = ledger::append_position(&env, &user, &position);
        let booked = rewards::full_term_reward(amount, config.annual_rate, config.duration);
        state.book(&env, tier, amount, booked);
        state.save(&env);
        Self::extend_instance(&env);

        // 3. Interactions.
        vault::pull(&env, &user, amount)?;

        events::publish_staked(&env, user, amount, tier, config.annual_rate, index);

        Ok(index)
    }

    // ── Settlement ──────────────────────────────────────────────────────────

    /// Close a position and pay it out.
    ///
    /// How much interest the user keeps depends on how far through the lock
    /// the position is; see [`settlement`]. Forfeited interest goes to the
    /// treasury.
    pub fn unstake(env: Env, user: Address, index: u32) -> Result<Payout, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        Self::require_not_paused(&env)?;

        // 1. Checks.
        let mut position = ledger::load_position(&env, &user, index)?;
        if position.settled {
            return Err(ContractError::AlreadySettled);
        }
        let treasury: Address = env
            .storage()
            .instance()
            .get(&TREASURY)
            .ok_or(ContractError::TreasuryUnset)?;

        let now = env.ledger().timestamp();
        let settlement = settlement::settle_unstake(&position, now, &Self::policy(&env));
        log!(
            &env,
            "unstake index {}: reward {} penalty {}",
            index,
            settlement.reward,
            settlement.penalty
        );
        // Principal comes back out of the pool; interest and penalty only
        // out of the reservoir, never out of other stakers' principal.
        let mut state = LedgerState::load(&env);
        vault::ensure_reservoir_covers(
            &env,
            state.total_principal,
            settlement.reward.saturating_add(settlement.penalty),
        )?;

        // 2. Effects: close the position before any token leaves.
        position.settled = true;
        ledger::store_position(&env, &user, index, &position);
        state.release(&env, position.tier, position.principal, settlement.liability_release);
        state.save(&env);
        Self::extend_instance(&env);

        // 3. Interactions.
        vault::push(&env, &user, settlement.payout())?;
        vault::push(&env, &treasury, settlement.penalty)?;

        events::publish_unstaked(
            &env,
            user,
            index,
            settlement.principal,
            settlement.reward,
            settlement.penalty,
            settlement.regime,
        );

        Ok(Payout {
            principal: settlement.principal,
            reward: settlement.reward,
            penalty: settlement.penalty,
        })
    }

    /// Re-commit a matured position, including its full-term reward, into a
    /// new position of the same tier and duration at the bonus rate.
    ///
    /// No tokens move; the old position is closed and kept as history. The
    /// reward reservoir must hold the carried reward.
    pub fn rollover(env: Env, user: Address, index: u32) -> Result<RolloverReceipt, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        Self::require_not_paused(&env)?;

        // 1. Checks.
        let mut position = ledger::load_position(&env, &user, index)?;
        let now = env.ledger().timestamp();
        let plan = settlement::plan_rollover(&position, now, &Self::policy(&env))?;
        // The carried reward turns into principal, so it must already sit in
        // the reservoir.
        let mut state = LedgerState::load(&env);
        vault::ensure_reservoir_covers(&env, state.total_principal, plan.carried_reward)?;

        // 2. Effects.
        position.settled = true;
        ledger::store_position(&env, &user, index, &position);
        let new_index = ledger::append_position(&env, &user, &plan.successor);

        state.release(&env, position.tier, position.principal, plan.liability_release);
        state.book(
            &env,
            plan.successor.tier,
            plan.successor.principal,
            plan.liability_booking,
        );
        state.save(&env);
        Self::extend_instance(&env);

        events::publish_rolled_over(
            &env,
            user,
            index,
            new_index,
            plan.successor.principal,
            plan.successor.annual_rate,
        );

        Ok(RolloverReceipt {
            new_index,
            new_principal: plan.successor.principal,
            new_rate: plan.successor.annual_rate,
        })
    }

    /// Top up the reward reservoir. Anyone may fund it.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        funder.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        vault::ensure_balance(&env, &funder, amount)?;
        vault::pull(&env, &funder, amount)?;

        events::publish_rewards_funded(&env, funder, amount);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Every position the user has opened, settled ones included, by index.
    pub fn list_positions(env: Env, user: Address) -> Vec<Position> {
        ledger::positions(&env, &user)
    }

    pub fn get_position(env: Env, user: Address, index: u32) -> Result<Position, ContractError> {
        ledger::load_position(&env, &user, index)
    }

    pub fn position_count(env: Env, user: Address) -> u32 {
        ledger::position_count(&env, &user)
    }

    /// Full-term reward `amount` would earn if staked under `tier` now.
    pub fn estimate_reward(env: Env, amount: i128, tier: LockTier) -> i128 {
        let config = tiers::tier_config(&env, tier);
        rewards::full_term_reward(amount, config.annual_rate, config.duration)
    }

    pub fn get_tier_config(env: Env, tier: LockTier) -> TierConfig {
        tiers::tier_config(&env, tier)
    }

    pub fn get_ledger_state(env: Env) -> LedgerState {
        LedgerState::load(&env)
    }

    /// Open principal currently accounted under `tier`.
    pub fn get_tier_principal(env: Env, tier: LockTier) -> i128 {
        LedgerState::load(&env).tier_principal(tier)
    }

    pub fn get_treasury(env: Env) -> Option<Address> {
        env.storage().instance().get(&TREASURY)
    }

    pub fn get_settlement_policy(env: Env) -> SettlementPolicy {
        Self::policy(&env)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        vault::stake_token(&env)
    }

    /// Stake-token balance held by the contract (pool plus reservoir).
    pub fn get_pool_balance(env: Env) -> Result<i128, ContractError> {
        vault::pool_balance(&env)
    }

    /// Pool balance above open principal, available to pay interest.
    pub fn get_reward_reservoir(env: Env) -> Result<i128, ContractError> {
        vault::reservoir(&env, LedgerState::load(&env).total_principal)
    }

    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_manager(env: Env, address: Address) -> bool {
        roles::is_manager(&env, &address)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    // ── Manager functions ────────────────────────────────────────────────────

    /// Change a tier's duration and rate for positions opened from now on.
    pub fn set_tier_config(
        env: Env,
        caller: Address,
        tier: LockTier,
        duration: u64,
        annual_rate: u32,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        let mut config = tiers::tier_config(&env, tier);
        config.duration = duration;
        config.annual_rate = annual_rate;
        tiers::store_tier_config(&env, tier, &config)?;

        events::publish_tier_configured(&env, tier, duration, annual_rate);

        Ok(())
    }

    /// Change the most open principal `tier` may hold.
    ///
    /// Lowering it below what the tier already holds only blocks new stakes.
    pub fn set_tier_capacity(
        env: Env,
        caller: Address,
        tier: LockTier,
        capacity: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        let mut config = tiers::tier_config(&env, tier);
        config.capacity = capacity;
        tiers::store_tier_config(&env, tier, &config)?;

        events::publish_capacity_set(&env, tier, capacity);

        Ok(())
    }

    /// Set the address that receives forfeited interest.
    pub fn set_treasury(env: Env, caller: Address, treasury: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        env.storage().instance().set(&TREASURY, &treasury);

        events::publish_treasury_set(&env, treasury);

        Ok(())
    }

    /// Replace the settlement schedule. Applies to every later settlement,
    /// including positions already open.
    pub fn set_settlement_policy(
        env: Env,
        caller: Address,
        policy: SettlementPolicy,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        policy.validate()?;
        env.storage().instance().set(&POLICY, &policy);

        events::publish_policy_set(&env, policy);

        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        pausable::set_paused(&env, true);

        events::publish_paused(&env, caller);

        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_manager(&env, &caller)?;

        pausable::set_paused(&env, false);

        events::publish_unpaused(&env, caller);

        Ok(())
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    pub fn add_manager(env: Env, caller: Address, manager: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        roles::grant_manager(&env, &manager);

        events::publish_manager_added(&env, manager);

        Ok(())
    }

    /// Revoke a manager. The admin's own capability cannot be revoked.
    pub fn remove_manager(env: Env, caller: Address, manager: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        if manager == caller {
            return Err(ContractError::InvalidConfig);
        }
        roles::revoke_manager(&env, &manager);

        events::publish_manager_removed(&env, manager);

        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_not_paused(env: &Env) -> Result<(), ContractError> {
        if pausable::is_paused(env) {
            return Err(ContractError::SystemPaused);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_manager(env: &Env, caller: &Address) -> Result<(), ContractError> {
        if roles::is_manager(env, caller) {
            return Ok(());
        }
        Self::require_admin(env, caller)
    }

    fn policy(env: &Env) -> SettlementPolicy {
        env.storage()
            .instance()
            .get(&POLICY)
            .unwrap_or_else(SettlementPolicy::standard)
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }
}
