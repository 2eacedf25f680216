use near_sdk::{AccountId, near};

use crate::{
    DefaultAdminDelayChangeScheduled, DefaultAdminTransferScheduled, DelayedAdminEmit, Error,
    Event, Result,
};

/// `INITIAL_ADMIN_DELAY`: 3 days in nanoseconds, the default constructor
/// argument for [`DelayedAdmin::new`].
pub const INITIAL_ADMIN_DELAY_NANOS: u64 = 3 * 86_400 * 1_000_000_000;

/// Two-phase `{stable, transferPending, delayChangePending}` state machine
/// for rotating the default admin and for changing its own timelock delay.
/// Everything else in the role registry is immediate; this is the only
/// place authority changes are time-gated.
#[near(serializers = [borsh, json])]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedAdmin {
    admin: AccountId,
    delay: u64,
    pending_transfer: Option<PendingTransfer>,
    pending_delay_change: Option<PendingDelayChange>,
}

#[near(serializers = [borsh, json])]
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTransfer {
    new_admin: AccountId,
    accept_schedule: u64,
}

#[near(serializers = [borsh, json])]
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDelayChange {
    new_delay: u64,
    effect_schedule: u64,
}

impl DelayedAdmin {
    #[inline]
    pub fn new(admin: AccountId, initial_delay: u64) -> Self {
        Self {
            admin,
            delay: initial_delay,
            pending_transfer: None,
            pending_delay_change: None,
        }
    }

    #[inline]
    pub const fn admin(&self) -> &AccountId {
        &self.admin
    }

    #[inline]
    pub const fn delay(&self) -> u64 {
        self.delay
    }

    fn require_admin(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.admin {
            return Err(Error::Unauthorized);
        }
        Ok(())
    }

    /// `beginTransfer(newAdmin)`. Schedules an acceptance time of `now + delay`.
    /// Overwrites any previously scheduled transfer.
    pub fn begin_transfer(&mut self, caller: &AccountId, new_admin: AccountId, now: u64) -> Result<()> {
        self.require_admin(caller)?;
        let accept_schedule = now.saturating_add(self.delay);
        self.pending_transfer = Some(PendingTransfer {
            new_admin: new_admin.clone(),
            accept_schedule,
        });
        DefaultAdminTransferScheduled {
            new_admin,
            accept_schedule,
        }
        .emit();
        Ok(())
    }

    /// `DefaultAdminTransferCanceled`. Only the current admin may cancel.
    pub fn cancel_transfer(&mut self, caller: &AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if self.pending_transfer.take().is_none() {
            return Err(Error::NoPendingTransfer);
        }
        Event::DefaultAdminTransferCanceled.emit();
        Ok(())
    }

    /// `acceptTransfer()`. Must be called by the pending new admin, after
    /// `accept_schedule` has passed.
    pub fn accept_transfer(&mut self, caller: &AccountId, now: u64) -> Result<()> {
        let pending = self.pending_transfer.as_ref().ok_or(Error::NoPendingTransfer)?;
        if caller != &pending.new_admin {
            return Err(Error::Unauthorized);
        }
        if now < pending.accept_schedule {
            return Err(Error::TransferNotReady);
        }
        self.admin = pending.new_admin.clone();
        self.pending_transfer = None;
        Ok(())
    }

    /// `beginDelayChange(newDelay)`. Effect schedule uses the *current*
    /// delay, mirroring the transfer schedule's own timelock.
    pub fn begin_delay_change(&mut self, caller: &AccountId, new_delay: u64, now: u64) -> Result<()> {
        self.require_admin(caller)?;
        let effect_schedule = now.saturating_add(self.delay);
        self.pending_delay_change = Some(PendingDelayChange {
            new_delay,
            effect_schedule,
        });
        DefaultAdminDelayChangeScheduled {
            new_delay,
            effect_schedule,
        }
        .emit();
        Ok(())
    }

    /// `DefaultAdminDelayChangeCanceled`.
    pub fn cancel_delay_change(&mut self, caller: &AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if self.pending_delay_change.take().is_none() {
            return Err(Error::NoPendingDelayChange);
        }
        Event::DefaultAdminDelayChangeCanceled.emit();
        Ok(())
    }

    /// Enacts a scheduled delay change once `effect_schedule` has passed.
    /// Callable by anyone, same as auto-validation elsewhere: it only
    /// executes a decision the admin already authorized, granting no new
    /// authority to the caller.
    pub fn execute_delay_change(&mut self, now: u64) -> Result<()> {
        let pending = self
            .pending_delay_change
            .as_ref()
            .ok_or(Error::NoPendingDelayChange)?;
        if now < pending.effect_schedule {
            return Err(Error::DelayChangeNotReady);
        }
        self.delay = pending.new_delay;
        self.pending_delay_change = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use near_sdk::{test_utils::VMContextBuilder, testing_env};
    use rstest::rstest;

    use super::*;

    fn account(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    #[rstest]
    fn transfer_happy_path() {
        testing_env!(VMContextBuilder::new().build());
        let admin = account("admin.near");
        let next = account("next.near");
        let mut da = DelayedAdmin::new(admin.clone(), 3 * 86_400 * 1_000_000_000);

        da.begin_transfer(&admin, next.clone(), 1_000).unwrap();
        assert_eq!(
            da.accept_transfer(&next, 1_000),
            Err(Error::TransferNotReady)
        );
        da.accept_transfer(&next, 1_000 + 3 * 86_400 * 1_000_000_000)
            .unwrap();
        assert_eq!(da.admin(), &next);
    }

    #[rstest]
    fn only_admin_can_begin_transfer() {
        let admin = account("admin.near");
        let stranger = account("stranger.near");
        let mut da = DelayedAdmin::new(admin, 1_000);
        assert_eq!(
            da.begin_transfer(&stranger, account("x.near"), 0),
            Err(Error::Unauthorized)
        );
    }

    #[rstest]
    fn cancel_without_pending_fails() {
        let admin = account("admin.near");
        let mut da = DelayedAdmin::new(admin.clone(), 1_000);
        assert_eq!(da.cancel_transfer(&admin), Err(Error::NoPendingTransfer));
    }

    #[rstest]
    fn delay_change_happy_path() {
        testing_env!(VMContextBuilder::new().build());
        let admin = account("admin.near");
        let mut da = DelayedAdmin::new(admin.clone(), 1_000);
        da.begin_delay_change(&admin, 500, 0).unwrap();
        assert_eq!(da.execute_delay_change(999), Err(Error::DelayChangeNotReady));
        da.execute_delay_change(1_000).unwrap();
        assert_eq!(da.delay(), 500);
    }
}
