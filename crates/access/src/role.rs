use near_plugins::AccessControlRole;
use near_sdk::near;

/// Ordinary, ungated-by-time role membership, backed by `near_plugins`'
/// `AccessControllable`. The timelocked super-admin rotation lives in
/// [`crate::DelayedAdmin`] instead, since `near_plugins` has no equivalent.
#[near(serializers = [json])]
#[derive(AccessControlRole, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// May link/unlink a creator account to a visibility id.
    CreatorsChecker,
    /// May move credits between accounts without touching supply or fees.
    /// Granted to the services contract's own account so it can escrow.
    CreditsTransfer,
    /// May resolve a disputed execution.
    DisputeResolver,
    /// May replace the protocol fee treasury address.
    TreasuryManager,
}
