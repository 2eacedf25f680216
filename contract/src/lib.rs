mod admin;
mod config;
mod credits;
mod services;

use near_plugins::{AccessControllable, access_control};
use near_sdk::{BorshStorageKey, PanicOnDefault, borsh::BorshSerialize, near};
use vcred_access::DelayedAdmin;
use vcred_credits_core::CreditsEngine;
use vcred_services_core::ServicesEngine;

pub use self::config::{Config, RolesConfig};
pub use vcred_access::Role;

/// Ordinary, immediately-effective role membership (`CreatorsChecker`,
/// `CreditsTransfer`, `DisputeResolver`, `TreasuryManager`) is
/// `vcred_access::Role`, backed by `near_plugins::AccessControllable`.
/// [`DelayedAdmin`] layers the timelocked super-admin rotation from
/// spec.md §4.3 on top of the super admin `AccessControllable` already
/// tracks; it is not itself a role in the enum.
#[access_control(role_type(Role))]
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    credits: CreditsEngine,
    services: ServicesEngine,
    delayed_admin: DelayedAdmin,
}

#[near]
impl Contract {
    #[init]
    pub fn new(config: Config) -> Self {
        let mut contract = Self {
            credits: CreditsEngine::new(Prefix::Credits, config.treasury)
                .unwrap_or_else(|e| near_sdk::env::panic_str(&e.to_string())),
            services: ServicesEngine::new(Prefix::Services),
            delayed_admin: DelayedAdmin::new(
                config.roles.initial_admin.clone(),
                config.roles.initial_delay_nanos,
            ),
        };

        let mut acl = contract.acl_get_or_init();
        near_sdk::require!(
            acl.add_super_admin_unchecked(&config.roles.initial_admin)
                && config
                    .roles
                    .grantees
                    .into_iter()
                    .flat_map(|(role, grantees)| grantees.into_iter().map(move |g| (role, g)))
                    .all(|(role, grantee)| acl.grant_role_unchecked(role, &grantee)),
            "failed to set roles"
        );

        contract
    }
}

#[derive(BorshSerialize, BorshStorageKey)]
#[borsh(crate = "::near_sdk::borsh")]
enum Prefix {
    Credits,
    Services,
}

#[cfg(test)]
mod tests {
    use near_sdk::{test_utils::VMContextBuilder, testing_env};
    use rstest::rstest;
    use std::collections::HashMap;

    use super::*;

    fn account(s: &str) -> near_sdk::AccountId {
        s.parse().unwrap()
    }

    fn set_context(predecessor: &str, attached_deposit: u128, block_timestamp: u64) {
        let mut builder = VMContextBuilder::new();
        builder
            .current_account_id(account("vcred.near"))
            .predecessor_account_id(account(predecessor))
            .attached_deposit(near_sdk::NearToken::from_yoctonear(attached_deposit))
            .block_timestamp(block_timestamp);
        testing_env!(builder.build());
    }

    fn init() -> Contract {
        set_context("admin.near", 0, 0);
        Contract::new(Config {
            treasury: account("treasury.near"),
            roles: RolesConfig {
                initial_admin: account("admin.near"),
                initial_delay_nanos: 3 * 86_400 * 1_000_000_000,
                grantees: HashMap::from([
                    (Role::CreatorsChecker, [account("admin.near")].into()),
                    (Role::DisputeResolver, [account("resolver.near")].into()),
                ]),
            },
        })
    }

    #[rstest]
    fn buy_credits_updates_visibility() {
        let mut contract = init();
        set_context("user1.near", 120_000_000_000_000, 0);
        contract
            .buy_credits("x-V".to_string(), 1, None)
            .expect("buy should succeed");

        let view = contract.get_visibility("x-V".to_string()).unwrap();
        assert_eq!(view.total_supply.0, 1);
        assert_eq!(
            contract
                .get_visibility_balance("x-V".to_string(), account("user1.near"))
                .0,
            1
        );
    }

    #[rstest]
    #[should_panic]
    fn set_creator_visibility_requires_role() {
        let mut contract = init();
        set_context("stranger.near", 0, 0);
        contract.set_creator_visibility("x-V".to_string(), Some(account("creator.near")));
    }

    #[rstest]
    fn service_happy_path() {
        let mut contract = init();
        set_context("admin.near", 0, 0);
        contract.set_creator_visibility("x-V".to_string(), Some(account("creator.near")));

        set_context("user1.near", 120_000_000_000_000 * 50, 0);
        contract.buy_credits("x-V".to_string(), 50, None).unwrap();

        set_context("creator.near", 0, 0);
        let nonce = contract
            .create_service("x-post".to_string(), "x-V".to_string(), 10)
            .unwrap();

        set_context("user1.near", 0, 0);
        let en = contract
            .request_service_execution(nonce, "req".to_string())
            .unwrap();
        assert_eq!(
            contract
                .get_visibility_balance("x-V".to_string(), account("user1.near"))
                .0,
            40
        );

        set_context("creator.near", 0, 1);
        contract
            .accept_service_execution(nonce, en, "ok".to_string())
            .unwrap();

        set_context("user1.near", 0, 2);
        contract.validate_service_execution(nonce, en).unwrap();

        assert_eq!(
            contract
                .get_visibility_balance("x-V".to_string(), account("creator.near"))
                .0,
            10
        );
    }

    #[rstest]
    fn dispute_resolution_refunds() {
        let mut contract = init();
        set_context("admin.near", 0, 0);
        contract.set_creator_visibility("x-V".to_string(), Some(account("creator.near")));

        set_context("user1.near", 120_000_000_000_000 * 50, 0);
        contract.buy_credits("x-V".to_string(), 50, None).unwrap();

        set_context("creator.near", 0, 0);
        let nonce = contract
            .create_service("x-post".to_string(), "x-V".to_string(), 10)
            .unwrap();

        set_context("user1.near", 0, 0);
        let en = contract
            .request_service_execution(nonce, "req".to_string())
            .unwrap();

        set_context("creator.near", 0, 1);
        contract
            .accept_service_execution(nonce, en, "ok".to_string())
            .unwrap();

        set_context("user1.near", 0, 2);
        contract
            .dispute_service_execution(nonce, en, "D".to_string())
            .unwrap();

        set_context("resolver.near", 0, 3);
        contract
            .resolve_service_execution(nonce, en, true, "refund".to_string())
            .unwrap();

        assert_eq!(
            contract
                .get_visibility_balance("x-V".to_string(), account("user1.near"))
                .0,
            50
        );
    }

    #[rstest]
    fn admin_transfer_round_trip() {
        let mut contract = init();
        set_context("admin.near", 0, 1_000);
        contract
            .begin_admin_transfer(account("next.near"))
            .unwrap();

        set_context("next.near", 0, 1_000 + 3 * 86_400 * 1_000_000_000);
        contract.accept_admin_transfer().unwrap();
        assert_eq!(contract.current_admin(), &account("next.near"));
    }
}
