use soroban_sdk::{contracttype, panic_with_error, symbol_short, Address, Env, Map, Symbol, Vec};

use crate::tiers::LockTier;
use crate::ContractError;

// ── Storage key constants ───────────────────────────────────────────────────

const LEDGER: Symbol = symbol_short!("LEDGER");
const POS: Symbol = symbol_short!("POS");
const POS_CNT: Symbol = symbol_short!("POS_CNT");

const POS_TTL_THRESHOLD: u32 = 518_400; // ~30 days
const POS_TTL_EXTEND_TO: u32 = 3_110_400; // ~180 days

// ── Types ───────────────────────────────────────────────────────────────────

/// One staking commitment.
///
/// Only `settled` ever changes after creation, and only from `false` to
/// `true`. Settled positions stay in storage as the user's audit history.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    pub principal: i128,
    /// Ledger timestamp at which the position was opened.
    pub start_time: u64,
    /// Lock duration copied from the tier at open time.
    pub lock_duration: u64,
    /// Annual rate copied from the tier at open time.
    pub annual_rate: u32,
    /// Tier the principal is accounted under.
    pub tier: LockTier,
    pub settled: bool,
}

impl Position {
    /// Timestamp from which the position counts as matured.
    pub fn matures_at(&self) -> u64 {
        self.start_time.saturating_add(self.lock_duration)
    }
}

/// Aggregate counters across every user's open positions.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerState {
    /// Sum of principal over unsettled positions.
    pub total_principal: i128,
    /// Sum of principal over unsettled positions, per creation tier.
    pub principal_per_tier: Map<LockTier, i128>,
    /// Reward booked at stake time and not yet released by a settlement.
    pub reward_liability: i128,
}

impl LedgerState {
    fn empty(env: &Env) -> Self {
        LedgerState {
            total_principal: 0,
            principal_per_tier: Map::new(env),
            reward_liability: 0,
        }
    }

    pub fn load(env: &Env) -> Self {
        env.storage()
            .instance()
            .get(&LEDGER)
            .unwrap_or_else(|| Self::empty(env))
    }

    pub fn save(&self, env: &Env) {
        env.storage().instance().set(&LEDGER, self);
    }

    /// Open principal currently held by `tier`.
    pub fn tier_principal(&self, tier: LockTier) -> i128 {
        self.principal_per_tier.get(tier).unwrap_or(0)
    }

    /// Account for newly opened principal and the reward it is expected to earn.
    pub fn book(&mut self, env: &Env, tier: LockTier, principal: i128, liability: i128) {
        self.total_principal = checked(env, self.total_principal.checked_add(principal));
        let per_tier = checked(env, self.tier_principal(tier).checked_add(principal));
        self.principal_per_tier.set(tier, per_tier);
        self.reward_liability = checked(env, self.reward_liability.checked_add(liability));
    }

    /// Remove settled principal and the reward obligation it discharges.
    ///
    /// Going below zero means the counters no longer describe the open
    /// positions; the invocation is aborted.
    pub fn release(&mut self, env: &Env, tier: LockTier, principal: i128, liability: i128) {
        self.total_principal = non_negative(env, self.total_principal.checked_sub(principal));
        let per_tier = non_negative(env, self.tier_principal(tier).checked_sub(principal));
        self.principal_per_tier.set(tier, per_tier);
        self.reward_liability = non_negative(env, self.reward_liability.checked_sub(liability));
    }
}

fn checked(env: &Env, value: Option<i128>) -> i128 {
    value.unwrap_or_else(|| panic_with_error!(env, ContractError::LedgerInvariant))
}

fn non_negative(env: &Env, value: Option<i128>) -> i128 {
    match value {
        Some(v) if v >= 0 => v,
        _ => panic_with_error!(env, ContractError::LedgerInvariant),
    }
}

// ── Position storage ────────────────────────────────────────────────────────

fn position_key(user: &Address, index: u32) -> (Symbol, Address, u32) {
    (POS, user.clone(), index)
}

fn count_key(user: &Address) -> (Symbol, Address) {
    (POS_CNT, user.clone())
}

/// Number of positions ever opened by `user`. Indices run `0..count`.
pub fn position_count(env: &Env, user: &Address) -> u32 {
    let key = count_key(user);
    let count = env.storage().persistent().get(&key).unwrap_or(0u32);
    if count > 0 {
        env.storage()
            .persistent()
            .extend_ttl(&key, POS_TTL_THRESHOLD, POS_TTL_EXTEND_TO);
    }
    count
}

/// Append a position to the user's arena and return its index.
pub fn append_position(env: &Env, user: &Address, position: &Position) -> u32 {
    let index = position_count(env, user);
    store_position(env, user, index, position);

    let key = count_key(user);
    env.storage().persistent().set(&key, &(index + 1));
    env.storage()
        .persistent()
        .extend_ttl(&key, POS_TTL_THRESHOLD, POS_TTL_EXTEND_TO);
    index
}

/// Overwrite the position stored at an existing index.
pub fn store_position(env: &Env, user: &Address, index: u32, position: &Position) {
    let key = position_key(user, index);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, POS_TTL_THRESHOLD, POS_TTL_EXTEND_TO);
}

/// Fetch one position, failing with `InvalidIndex` when it was never opened.
pub fn load_position(env: &Env, user: &Address, index: u32) -> Result<Position, ContractError> {
    if index >= position_count(env, user) {
        return Err(ContractError::InvalidIndex);
    }
    let key = position_key(user, index);
    let position = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::InvalidIndex)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, POS_TTL_THRESHOLD, POS_TTL_EXTEND_TO);
    Ok(position)
}

/// Every position the user has opened, settled or not, in index order.
pub fn positions(env: &Env, user: &Address) -> Vec<Position> {
    let mut out = Vec::new(env);
    for index in 0..position_count(env, user) {
        let key = position_key(user, index);
        if let Some(position) = env.storage().persistent().get(&key) {
            env.storage()
                .persistent()
                .extend_ttl(&key, POS_TTL_THRESHOLD, POS_TTL_EXTEND_TO);
            out.push_back(position);
        }
    }
    out
}
