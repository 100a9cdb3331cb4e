//! Fuzz the staking contract with arbitrary operation sequences.
//!
//! Goals:
//! - Find panics that are not contract errors.
//! - Verify the aggregate counters always match the open positions.
//! - Verify tokens are only ever moved, never created or lost.
//! - Verify the pool never drops below open principal.
//! - Verify a position settles at most once.

#![no_main]

use {
    arbitrary::{Arbitrary, Unstructured},
    libfuzzer_sys::fuzz_target,
    soroban_sdk::{
        testutils::{Address as _, Ledger},
        token, Address, Env,
    },
    term_staking::{LockTier, SettlementPolicy, TermStakingContract, TermStakingContractClient},
};

const START: u64 = 1_700_000_000;
const USERS: usize = 3;
const USER_FUNDS: i128 = 1_000_000_000_000;
const RESERVE: i128 = 1_000_000_000_000;

#[derive(Debug)]
enum FuzzAction {
    Stake { user: u8, amount: i128, tier: u8 },
    Unstake { user: u8, index: u32 },
    Rollover { user: u8, index: u32 },
    AdvanceTime { seconds: u64 },
    SetTier { tier: u8, duration: u64, rate: u32 },
    SetCapacity { tier: u8, capacity: i128 },
    SetPolicy { threshold_bps: u32, reward_bps: u32, bonus_bps: u32 },
    TogglePause,
}

impl<'a> Arbitrary<'a> for FuzzAction {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let variant = u.int_in_range(0..=7)?;
        match variant {
            0 => Ok(FuzzAction::Stake {
                user: u.arbitrary()?,
                amount: u.int_in_range(-10..=10_000_000_000)?,
                tier: u.arbitrary()?,
            }),
            1 => Ok(FuzzAction::Unstake {
                user: u.arbitrary()?,
                index: u.int_in_range(0..=8)?,
            }),
            2 => Ok(FuzzAction::Rollover {
                user: u.arbitrary()?,
                index: u.int_in_range(0..=8)?,
            }),
            3 => Ok(FuzzAction::AdvanceTime {
                seconds: u.int_in_range(0..=400 * 86_400)?,
            }),
            4 => Ok(FuzzAction::SetTier {
                tier: u.arbitrary()?,
                duration: u.int_in_range(0..=800 * 86_400)?,
                rate: u.int_in_range(0..=200)?,
            }),
            5 => Ok(FuzzAction::SetCapacity {
                tier: u.arbitrary()?,
                capacity: u.int_in_range(-1..=100_000_000_000)?,
            }),
            6 => Ok(FuzzAction::SetPolicy {
                threshold_bps: u.int_in_range(0..=12_000)?,
                reward_bps: u.int_in_range(0..=12_000)?,
                bonus_bps: u.int_in_range(9_000..=20_000)?,
            }),
            7 => Ok(FuzzAction::TogglePause),
            _ => unreachable!(),
        }
    }
}

fn tier(idx: u8) -> LockTier {
    LockTier::ALL[idx as usize % LockTier::ALL.len()]
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let token = token::Client::new(&env, &sac.address());
    let minter = token::StellarAssetClient::new(&env, &sac.address());

    let contract_id = env.register(TermStakingContract, ());
    let client = TermStakingContractClient::new(&env, &contract_id);
    client.initialize(&admin, &sac.address());
    let treasury = Address::generate(&env);
    client.set_treasury(&admin, &treasury);
    minter.mint(&admin, &RESERVE);
    client.fund_rewards(&admin, &RESERVE);

    let users: Vec<Address> = (0..USERS).map(|_| Address::generate(&env)).collect();
    for user in &users {
        minter.mint(user, &USER_FUNDS);
    }
    let supply = RESERVE + USER_FUNDS * USERS as i128;

    let num_actions: usize = match u.int_in_range(1..=60) {
        Ok(n) => n,
        Err(_) => return,
    };

    let mut now = START;
    let mut paused = false;
    for _ in 0..num_actions {
        let action: FuzzAction = match u.arbitrary() {
            Ok(a) => a,
            Err(_) => break,
        };

        match action {
            FuzzAction::Stake { user, amount, tier: t } => {
                let user = &users[user as usize % USERS];
                let before = client.position_count(user);
                let result = client.try_stake(user, &amount, &tier(t));
                if amount <= 0 || paused {
                    assert!(result.is_err());
                }
                if result.is_ok() {
                    assert_eq!(client.position_count(user), before + 1);
                }
            }

            FuzzAction::Unstake { user, index } => {
                let user = &users[user as usize % USERS];
                let was_settled = client
                    .try_get_position(user, &index)
                    .ok()
                    .and_then(|r| r.ok())
                    .map(|p| p.settled);
                let result = client.try_unstake(user, &index);
                if was_settled != Some(false) || paused {
                    assert!(result.is_err(), "settled or missing position paid out");
                }
                if let Ok(Ok(payout)) = result {
                    assert!(payout.reward >= 0 && payout.penalty >= 0);
                    assert!(client.get_position(user, &index).settled);
                }
            }

            FuzzAction::Rollover { user, index } => {
                let user = &users[user as usize % USERS];
                let position = client
                    .try_get_position(user, &index)
                    .ok()
                    .and_then(|r| r.ok());
                let result = client.try_rollover(user, &index);
                if let Ok(Ok(receipt)) = result {
                    let old = position.expect("rolled a missing position");
                    assert!(!old.settled);
                    assert!(now >= old.start_time + old.lock_duration);
                    assert!(receipt.new_principal >= old.principal);
                    assert!(receipt.new_rate >= old.annual_rate);
                }
            }

            FuzzAction::AdvanceTime { seconds } => {
                now = now.saturating_add(seconds);
                env.ledger().set_timestamp(now);
            }

            FuzzAction::SetTier { tier: t, duration, rate } => {
                let result = client.try_set_tier_config(&admin, &tier(t), &duration, &rate);
                if duration == 0 {
                    assert!(result.is_err());
                }
            }

            FuzzAction::SetCapacity { tier: t, capacity } => {
                let result = client.try_set_tier_capacity(&admin, &tier(t), &capacity);
                if capacity < 0 {
                    assert!(result.is_err());
                }
            }

            FuzzAction::SetPolicy {
                threshold_bps,
                reward_bps,
                bonus_bps,
            } => {
                let _ = client.try_set_settlement_policy(
                    &admin,
                    &SettlementPolicy {
                        early_exit_threshold_bps: threshold_bps,
                        mid_window_reward_bps: reward_bps,
                        rollover_bonus_bps: bonus_bps,
                    },
                );
            }

            FuzzAction::TogglePause => {
                if paused {
                    client.unpause(&admin);
                } else {
                    client.pause(&admin);
                }
                paused = !paused;
            }
        }

        // ── INVARIANT: counters equal the sums over open positions ──
        let state = client.get_ledger_state();
        let mut total = 0i128;
        let mut per_tier = [0i128; 4];
        for user in &users {
            for position in client.list_positions(user).iter() {
                if !position.settled {
                    total += position.principal;
                    per_tier[position.tier as usize] += position.principal;
                }
            }
        }
        assert_eq!(state.total_principal, total);
        for t in LockTier::ALL {
            assert_eq!(client.get_tier_principal(&t), per_tier[t as usize]);
        }
        assert!(state.reward_liability >= 0);

        // ── INVARIANT: interest never eats into open principal ──
        assert!(token.balance(&contract_id) >= state.total_principal);

        // ── INVARIANT: tokens are conserved ──
        let held = token.balance(&contract_id)
            + token.balance(&treasury)
            + users.iter().map(|u| token.balance(u)).sum::<i128>();
        assert_eq!(held, supply);
    }
});
