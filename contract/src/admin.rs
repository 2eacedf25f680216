//! Bindings for the delayed-admin-transfer / delayed-delay-change
//! sub-protocol (spec.md §4.3). Ordinary role grant/revoke
//! (`acl_grant_role`, `acl_revoke_role`, `acl_add_super_admin`, ...) are
//! generated for free by `near_plugins`' `#[access_control(role_type(Role))]`
//! on [`Contract`] in `lib.rs` and are not repeated here.

use near_plugins::AccessControllable;
use near_sdk::{AccountId, env, json_types::U64, near};
use vcred_access::Error;

use crate::{Contract, ContractExt};

#[near]
impl Contract {
    /// `beginTransfer(newAdmin)`.
    pub fn begin_admin_transfer(&mut self, new_admin: AccountId) -> Result<(), Error> {
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        self.delayed_admin.begin_transfer(&caller, new_admin, now)
    }

    /// Cancels a pending `beginTransfer`.
    pub fn cancel_admin_transfer(&mut self) -> Result<(), Error> {
        let caller = env::predecessor_account_id();
        self.delayed_admin.cancel_transfer(&caller)
    }

    /// `acceptTransfer()`. Rotates the `near_plugins` super-admin set to
    /// match the now-accepted admin.
    pub fn accept_admin_transfer(&mut self) -> Result<(), Error> {
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        let previous = self.delayed_admin.admin().clone();

        self.delayed_admin.accept_transfer(&caller, now)?;

        let mut acl = self.acl_get_or_init();
        near_sdk::require!(
            acl.revoke_super_admin_unchecked(&previous) && acl.add_super_admin_unchecked(&caller),
            "failed to rotate super admin"
        );
        Ok(())
    }

    /// `beginDelayChange(newDelay)`.
    pub fn begin_admin_delay_change(&mut self, new_delay_nanos: U64) -> Result<(), Error> {
        let caller = env::predecessor_account_id();
        let now = env::block_timestamp();
        self.delayed_admin
            .begin_delay_change(&caller, new_delay_nanos.0, now)
    }

    /// Cancels a pending `beginDelayChange`.
    pub fn cancel_admin_delay_change(&mut self) -> Result<(), Error> {
        let caller = env::predecessor_account_id();
        self.delayed_admin.cancel_delay_change(&caller)
    }

    /// Enacts a scheduled delay change once its effect schedule has passed.
    /// Callable by anyone, same as auto-validation: it only executes a
    /// decision the admin already authorized.
    pub fn execute_admin_delay_change(&mut self) -> Result<(), Error> {
        let now = env::block_timestamp();
        self.delayed_admin.execute_delay_change(now)
    }

    pub fn current_admin(&self) -> &AccountId {
        self.delayed_admin.admin()
    }

    pub fn current_admin_delay(&self) -> U64 {
        U64(self.delayed_admin.delay())
    }
}
