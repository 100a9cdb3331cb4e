use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::settlement::{ExitRegime, SettlementPolicy};
use crate::tiers::LockTier;

// ── Payloads ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub stake_token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub user: Address,
    pub amount: i128,
    pub tier: LockTier,
    pub annual_rate: u32,
    pub index: u32,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub user: Address,
    pub index: u32,
    pub amount: i128,
    pub reward: i128,
    pub penalty: i128,
    pub regime: ExitRegime,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RolledOverEvent {
    pub user: Address,
    pub old_index: u32,
    pub new_index: u32,
    pub new_principal: i128,
    pub bonus_rate: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierConfiguredEvent {
    pub tier: LockTier,
    pub duration: u64,
    pub annual_rate: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapacitySetEvent {
    pub tier: LockTier,
    pub capacity: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsFundedEvent {
    pub funder: Address,
    pub amount: i128,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, admin: Address, stake_token: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent { admin, stake_token },
    );
}

pub fn publish_staked(
    env: &Env,
    user: Address,
    amount: i128,
    tier: LockTier,
    annual_rate: u32,
    index: u32,
) {
    env.events().publish(
        (symbol_short!("STAKED"), user.clone()),
        StakedEvent {
            user,
            amount,
            tier,
            annual_rate,
            index,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    user: Address,
    index: u32,
    amount: i128,
    reward: i128,
    penalty: i128,
    regime: ExitRegime,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), user.clone()),
        UnstakedEvent {
            user,
            index,
            amount,
            reward,
            penalty,
            regime,
        },
    );
}

pub fn publish_rolled_over(
    env: &Env,
    user: Address,
    old_index: u32,
    new_index: u32,
    new_principal: i128,
    bonus_rate: u32,
) {
    env.events().publish(
        (symbol_short!("ROLLOVER"), user.clone()),
        RolledOverEvent {
            user,
            old_index,
            new_index,
            new_principal,
            bonus_rate,
        },
    );
}

pub fn publish_tier_configured(env: &Env, tier: LockTier, duration: u64, annual_rate: u32) {
    env.events().publish(
        (symbol_short!("TIER_SET"),),
        TierConfiguredEvent {
            tier,
            duration,
            annual_rate,
        },
    );
}

pub fn publish_capacity_set(env: &Env, tier: LockTier, capacity: i128) {
    env.events().publish(
        (symbol_short!("CAP_SET"),),
        CapacitySetEvent { tier, capacity },
    );
}

pub fn publish_treasury_set(env: &Env, treasury: Address) {
    env.events().publish((symbol_short!("TRSY_SET"),), treasury);
}

pub fn publish_policy_set(env: &Env, policy: SettlementPolicy) {
    env.events().publish((symbol_short!("POLICY"),), policy);
}

pub fn publish_paused(env: &Env, by: Address) {
    env.events().publish((symbol_short!("PAUSED"),), by);
}

pub fn publish_unpaused(env: &Env, by: Address) {
    env.events().publish((symbol_short!("UNPAUSED"),), by);
}

pub fn publish_rewards_funded(env: &Env, funder: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("FUNDED"),),
        RewardsFundedEvent { funder, amount },
    );
}

pub fn publish_manager_added(env: &Env, manager: Address) {
    env.events().publish((symbol_short!("MGR_ADD"),), manager);
}

pub fn publish_manager_removed(env: &Env, manager: Address) {
    env.events().publish((symbol_short!("MGR_DEL"),), manager);
}
