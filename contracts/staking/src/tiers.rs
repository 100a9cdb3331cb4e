use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::ContractError;

// ── Storage key constants ───────────────────────────────────────────────────

const TIER_CFG: Symbol = symbol_short!("TIER_CFG");

const DAY: u64 = 86_400;

/// Capacity each tier starts with until a manager sets one explicitly.
/// 10 million whole tokens at 7 decimals.
pub const DEFAULT_TIER_CAPACITY: i128 = 100_000_000_000_000;

// ── Types ───────────────────────────────────────────────────────────────────

/// The fixed set of lock tiers a stake can be opened under.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum LockTier {
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl LockTier {
    pub const ALL: [LockTier; 4] = [
        LockTier::Month,
        LockTier::Quarter,
        LockTier::HalfYear,
        LockTier::Year,
    ];
}

/// Lock terms for one tier.
///
/// Editing a tier only affects positions opened afterwards; open positions
/// carry their own copy of `duration` and `annual_rate`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierConfig {
    /// Lock duration in seconds.
    pub duration: u64,
    /// Interest in whole percentage points per year.
    pub annual_rate: u32,
    /// Maximum aggregate open principal the tier may hold.
    pub capacity: i128,
}

/// Terms a freshly initialised contract offers.
pub fn default_tier_config(tier: LockTier) -> TierConfig {
    let (days, annual_rate) = match tier {
        LockTier::Month => (30, 2),
        LockTier::Quarter => (90, 3),
        LockTier::HalfYear => (180, 5),
        LockTier::Year => (365, 8),
    };
    TierConfig {
        duration: days * DAY,
        annual_rate,
        capacity: DEFAULT_TIER_CAPACITY,
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn config_key(tier: LockTier) -> (Symbol, LockTier) {
    (TIER_CFG, tier)
}

/// Current configuration for `tier`, falling back to the defaults.
pub fn tier_config(env: &Env, tier: LockTier) -> TierConfig {
    env.storage()
        .instance()
        .get(&config_key(tier))
        .unwrap_or_else(|| default_tier_config(tier))
}

/// Persist a tier configuration after validating it.
pub fn store_tier_config(env: &Env, tier: LockTier, config: &TierConfig) -> Result<(), ContractError> {
    validate_tier_config(config)?;
    env.storage().instance().set(&config_key(tier), config);
    Ok(())
}

/// A tier must lock for a non-zero duration and cannot have negative room.
pub fn validate_tier_config(config: &TierConfig) -> Result<(), ContractError> {
    if config.duration == 0 || config.capacity < 0 {
        return Err(ContractError::InvalidConfig);
    }
    Ok(())
}

// ── Capacity guard ──────────────────────────────────────────────────────────

/// Reject a stake of `amount` that would lift the tier's open principal past
/// its capacity.
///
/// Nothing is reserved here. The caller commits the new principal together
/// with the position it opens, so a failed stake leaves no trace.
pub fn check_capacity(reserved: i128, amount: i128, capacity: i128) -> Result<(), ContractError> {
    match reserved.checked_add(amount) {
        Some(total) if total <= capacity => Ok(()),
        _ => Err(ContractError::CapacityExceeded),
    }
}
