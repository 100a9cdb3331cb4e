use soroban_sdk::{symbol_short, Address, Env, Symbol};

const MANAGER: Symbol = symbol_short!("MGR");
const MGR_TTL_THRESHOLD: u32 = 518_400; // ~30 days
const MGR_TTL_EXTEND_TO: u32 = 3_110_400; // ~180 days

fn manager_key(address: &Address) -> (Symbol, Address) {
    (MANAGER, address.clone())
}

fn extend_manager_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, MGR_TTL_THRESHOLD, MGR_TTL_EXTEND_TO);
}

/// Grants the manager capability to an address.
pub fn grant_manager(env: &Env, address: &Address) {
    let key = manager_key(address);
    env.storage().persistent().set(&key, &true);
    extend_manager_ttl(env, &key);
}

/// Revokes the manager capability. Revoking an address that never held it is a no-op.
pub fn revoke_manager(env: &Env, address: &Address) {
    env.storage().persistent().remove(&manager_key(address));
}

/// Returns whether an address currently holds the manager capability.
pub fn is_manager(env: &Env, address: &Address) -> bool {
    let key = manager_key(address);
    let granted = env.storage().persistent().get(&key).unwrap_or(false);
    if granted {
        extend_manager_ttl(env, &key);
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{contract, testutils::Address as _};

    #[contract]
    struct Host;

    #[test]
    fn grant_and_revoke() {
        let env = Env::default();
        let host = env.register(Host, ());
        let alice = Address::generate(&env);

        env.as_contract(&host, || {
            assert!(!is_manager(&env, &alice));
            grant_manager(&env, &alice);
            assert!(is_manager(&env, &alice));
            revoke_manager(&env, &alice);
            assert!(!is_manager(&env, &alice));
        });
    }

    #[test]
    fn revoke_unknown_is_noop() {
        let env = Env::default();
        let host = env.register(Host, ());
        let bob = Address::generate(&env);

        env.as_contract(&host, || {
            revoke_manager(&env, &bob);
            assert!(!is_manager(&env, &bob));
        });
    }
}
