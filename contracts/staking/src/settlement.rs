//! Settlement of staking positions.
//!
//! A position is closed either by `unstake`, which pays it out, or by
//! `rollover`, which carries its value into a new position. Everything in
//! this module is pure: it decides amounts from a position, the current
//! ledger time and the active [`SettlementPolicy`], and leaves storage and
//! token movement to the caller.
//!
//! ## Unstake regimes
//!
//! With `elapsed = now - start_time` and `full = lock_duration`:
//!
//! | Regime     | Condition                            | User gets                 | Penalty            |
//! |------------|--------------------------------------|---------------------------|--------------------|
//! | Early      | `elapsed < 66% · full`               | principal                 | all accrued        |
//! | Mid window | `66% · full ≤ elapsed < full`        | principal + 66% accrued   | 34% accrued        |
//! | Matured    | `elapsed ≥ full`                     | principal + full-term     | 0                  |
//!
//! Percentages are the default policy. Time past maturity earns nothing.

use soroban_sdk::contracttype;

use crate::ledger::Position;
use crate::rewards::{full_term_reward, reward};
use crate::ContractError;

/// Basis points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

pub const DEFAULT_EARLY_EXIT_THRESHOLD_BPS: u32 = 6_600;
pub const DEFAULT_MID_WINDOW_REWARD_BPS: u32 = 6_600;
pub const DEFAULT_ROLLOVER_BONUS_BPS: u32 = 11_000;

// ── Policy ──────────────────────────────────────────────────────────────────

/// Tunable constants of the settlement schedule.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SettlementPolicy {
    /// Fraction of the lock below which an exit forfeits all interest.
    pub early_exit_threshold_bps: u32,
    /// Share of accrued interest a mid-window exit keeps.
    pub mid_window_reward_bps: u32,
    /// Rate multiplier applied to a rolled-over position.
    pub rollover_bonus_bps: u32,
}

impl SettlementPolicy {
    pub fn standard() -> Self {
        SettlementPolicy {
            early_exit_threshold_bps: DEFAULT_EARLY_EXIT_THRESHOLD_BPS,
            mid_window_reward_bps: DEFAULT_MID_WINDOW_REWARD_BPS,
            rollover_bonus_bps: DEFAULT_ROLLOVER_BONUS_BPS,
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        if self.early_exit_threshold_bps > BPS_DENOMINATOR
            || self.mid_window_reward_bps > BPS_DENOMINATOR
            || self.rollover_bonus_bps < BPS_DENOMINATOR
        {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }

    /// Rate a rolled-over position earns, floored to whole percentage points.
    pub fn bonus_rate(&self, annual_rate: u32) -> u32 {
        let boosted = annual_rate as u64 * self.rollover_bonus_bps as u64 / BPS_DENOMINATOR as u64;
        u32::try_from(boosted).unwrap_or(u32::MAX)
    }
}

// ── Unstake ─────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitRegime {
    Early,
    MidWindow,
    Matured,
}

/// Amounts an unstake moves and the liability it discharges.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub regime: ExitRegime,
    pub principal: i128,
    /// Interest paid to the user on top of principal.
    pub reward: i128,
    /// Interest withheld and paid to the treasury.
    pub penalty: i128,
    /// Amount to take off the ledger's reward liability.
    pub liability_release: i128,
}

impl Settlement {
    /// Total transferred to the position owner.
    pub fn payout(&self) -> i128 {
        self.principal.saturating_add(self.reward)
    }
}

/// Classify how far through its lock a position is at `now`.
///
/// Both boundaries are compared in exact integer arithmetic; the mid-window
/// boundary belongs to the mid window and `elapsed == full` is matured.
pub fn exit_regime(position: &Position, now: u64, policy: &SettlementPolicy) -> ExitRegime {
    let elapsed = now.saturating_sub(position.start_time);
    let full = position.lock_duration;

    if elapsed >= full {
        return ExitRegime::Matured;
    }

    let scaled_elapsed = elapsed as u128 * BPS_DENOMINATOR as u128;
    let threshold = full as u128 * policy.early_exit_threshold_bps as u128;
    if scaled_elapsed < threshold {
        ExitRegime::Early
    } else {
        ExitRegime::MidWindow
    }
}

/// Work out what unstaking `position` at `now` pays and withholds.
///
/// # Arguments
/// * `position` – the open position being closed
/// * `now`      – current ledger timestamp
/// * `policy`   – active settlement schedule
pub fn settle_unstake(position: &Position, now: u64, policy: &SettlementPolicy) -> Settlement {
    let elapsed = now.saturating_sub(position.start_time);
    let regime = exit_regime(position, now, policy);

    let (reward_paid, penalty, liability_release) = match regime {
        ExitRegime::Early => {
            let accrued = reward(position.principal, position.annual_rate, elapsed);
            (0, accrued, accrued)
        }
        ExitRegime::MidWindow => {
            let accrued = reward(position.principal, position.annual_rate, elapsed);
            let kept = share_of(accrued, policy.mid_window_reward_bps);
            (kept, accrued - kept, accrued)
        }
        ExitRegime::Matured => {
            let full = full_term_reward(
                position.principal,
                position.annual_rate,
                position.lock_duration,
            );
            (full, 0, full)
        }
    };

    Settlement {
        regime,
        principal: position.principal,
        reward: reward_paid,
        penalty,
        liability_release,
    }
}

/// `⌊amount × bps / 10_000⌋`, never more than `amount` for bps ≤ 10_000.
///
/// # Arguments
/// * `amount` – non-negative interest to divide
/// * `bps`    – share kept, in basis points
#[allow(clippy::arithmetic_side_effects)]
fn share_of(amount: i128, bps: u32) -> i128 {
    let whole = amount / BPS_DENOMINATOR as i128;
    let rest = amount % BPS_DENOMINATOR as i128;
    whole * bps as i128 + rest * bps as i128 / BPS_DENOMINATOR as i128
}

// ── Rollover ────────────────────────────────────────────────────────────────

/// The replacement position a rollover opens and the liability it moves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RolloverPlan {
    /// Full-term reward of the old position, folded into principal.
    pub carried_reward: i128,
    /// Liability booked for the old position, released on close.
    pub liability_release: i128,
    /// Full-term reward estimate booked for the new position.
    pub liability_booking: i128,
    pub successor: Position,
}

/// Plan the rollover of a matured position at `now`.
///
/// The successor keeps the old lock duration and tier, starts at `now`, and
/// earns the bonus rate on principal plus the old full-term reward.
pub fn plan_rollover(
    position: &Position,
    now: u64,
    policy: &SettlementPolicy,
) -> Result<RolloverPlan, ContractError> {
    if position.settled {
        return Err(ContractError::AlreadySettled);
    }
    if now < position.matures_at() {
        return Err(ContractError::NotMatured);
    }

    let carried_reward = full_term_reward(
        position.principal,
        position.annual_rate,
        position.lock_duration,
    );
    let new_principal = position.principal.saturating_add(carried_reward);
    let new_rate = policy.bonus_rate(position.annual_rate);

    Ok(RolloverPlan {
        carried_reward,
        liability_release: carried_reward,
        liability_booking: full_term_reward(new_principal, new_rate, position.lock_duration),
        successor: Position {
            principal: new_principal,
            start_time: now,
            lock_duration: position.lock_duration,
            annual_rate: new_rate,
            tier: position.tier,
            settled: false,
        },
    })
}
