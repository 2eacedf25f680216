use std::collections::{HashMap, HashSet};

use near_sdk::{AccountId, near};
use vcred_access::{INITIAL_ADMIN_DELAY_NANOS, Role};

/// `#[init]` argument, analogous to the teacher's `DefuseConfig`/
/// `RolesConfig` (`defuse/src/contract/config.rs`).
#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct Config {
    /// Protocol fee recipient (`updateTreasury` target, spec.md §4.1.3).
    pub treasury: AccountId,
    pub roles: RolesConfig,
}

#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct RolesConfig {
    /// The initial `DEFAULT_ADMIN_ROLE` holder (spec.md §4.3).
    pub initial_admin: AccountId,
    /// Initial admin-rotation timelock, in nanoseconds. Defaults to
    /// `INITIAL_ADMIN_DELAY` (3 days) per spec.md §6's normative constants.
    #[serde(default = "default_initial_delay_nanos")]
    pub initial_delay_nanos: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub grantees: HashMap<Role, HashSet<AccountId>>,
}

fn default_initial_delay_nanos() -> u64 {
    INITIAL_ADMIN_DELAY_NANOS
}
