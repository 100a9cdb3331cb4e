//! Token movement in and out of the pool.
//!
//! The contract holds a single balance of the stake token. The part of it
//! matching the ledger's open principal belongs to stakers; only the rest,
//! the reward reservoir, may pay out interest or penalties. Callers check
//! balances before committing any state, then move tokens only after their
//! writes are done.

use soroban_sdk::{log, symbol_short, token, Address, Env, Symbol};

use crate::ContractError;

const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");

pub fn set_stake_token(env: &Env, stake_token: &Address) {
    env.storage().instance().set(&STAKE_TOKEN, stake_token);
}

pub fn stake_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&STAKE_TOKEN)
        .ok_or(ContractError::NotInitialized)
}

fn client(env: &Env) -> Result<token::Client<'_>, ContractError> {
    Ok(token::Client::new(env, &stake_token(env)?))
}

/// Fail with `InsufficientFunds` unless `holder` owns at least `amount`.
pub fn ensure_balance(env: &Env, holder: &Address, amount: i128) -> Result<(), ContractError> {
    let balance = client(env)?.balance(holder);
    if balance < amount {
        log!(env, "insufficient funds: balance {} < required {}", balance, amount);
        return Err(ContractError::InsufficientFunds);
    }
    Ok(())
}

/// Part of the pool not owed back to stakers as principal.
pub fn reservoir(env: &Env, open_principal: i128) -> Result<i128, ContractError> {
    Ok(pool_balance(env)?.saturating_sub(open_principal).max(0))
}

/// Fail with `InsufficientFunds` unless the reservoir alone can cover
/// `amount` of interest and penalty.
pub fn ensure_reservoir_covers(
    env: &Env,
    open_principal: i128,
    amount: i128,
) -> Result<(), ContractError> {
    let available = reservoir(env, open_principal)?;
    if available < amount {
        log!(env, "reservoir short: available {} < required {}", available, amount);
        return Err(ContractError::InsufficientFunds);
    }
    Ok(())
}

/// Move `amount` from `from` into the pool.
pub fn pull(env: &Env, from: &Address, amount: i128) -> Result<(), ContractError> {
    if amount > 0 {
        client(env)?.transfer(from, &env.current_contract_address(), &amount);
    }
    Ok(())
}

/// Move `amount` from the pool to `to`.
pub fn push(env: &Env, to: &Address, amount: i128) -> Result<(), ContractError> {
    if amount > 0 {
        client(env)?.transfer(&env.current_contract_address(), to, &amount);
    }
    Ok(())
}

/// Pool balance of the stake token.
pub fn pool_balance(env: &Env) -> Result<i128, ContractError> {
    Ok(client(env)?.balance(&env.current_contract_address()))
}
