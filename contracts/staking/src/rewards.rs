/// Seconds in the 365-day year used to annualise rates.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Rates are whole percentage points, so the formula divides by 100.
const PERCENT: u128 = 100;

// ── Core reward formula ─────────────────────────────────────────────────────

/// Simple interest earned by `principal` at `annual_rate` percent over
/// `elapsed` seconds.
///
/// ```text
/// reward = ⌊ principal × annual_rate × elapsed / (100 × SECONDS_PER_YEAR) ⌋
/// ```
///
/// Interest does not compound within a position. The result is floored so
/// every rounding step favours the pool.
///
/// The product is split into quotient and remainder against the denominator
/// before multiplying, which keeps the whole computation inside `u128` for
/// any `i128` principal and any `u32` rate × `u64` duration. Results that
/// cannot be represented as `i128` saturate at `i128::MAX`.
///
/// Non-positive principals earn nothing.
///
/// # Arguments
/// * `principal`   – amount locked in the position
/// * `annual_rate` – whole percentage points per year
/// * `elapsed`     – seconds the principal has been locked
#[allow(clippy::arithmetic_side_effects)]
pub fn reward(principal: i128, annual_rate: u32, elapsed: u64) -> i128 {
    if principal <= 0 || annual_rate == 0 || elapsed == 0 {
        return 0;
    }

    let denominator = PERCENT * SECONDS_PER_YEAR as u128;
    // u32::MAX × u64::MAX < 2^96, always fits.
    let factor = annual_rate as u128 * elapsed as u128;
    let principal = principal as u128;

    let whole = (principal / denominator).saturating_mul(factor);
    // remainder < 2^32, factor < 2^96 → product < 2^128.
    let fractional = (principal % denominator).saturating_mul(factor) / denominator;

    i128::try_from(whole.saturating_add(fractional)).unwrap_or(i128::MAX)
}

/// Reward for holding a position for its whole lock duration.
///
/// This is what gets booked as liability at stake time and what a matured
/// position pays out.
///
/// # Arguments
/// * `principal`     – amount locked in the position
/// * `annual_rate`   – whole percentage points per year
/// * `lock_duration` – seconds the position is locked for
pub fn full_term_reward(principal: i128, annual_rate: u32, lock_duration: u64) -> i128 {
    reward(principal, annual_rate, lock_duration)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
