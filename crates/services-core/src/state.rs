use near_sdk::{
    AccountId, BorshStorageKey, IntoStorageKey,
    borsh::BorshSerialize,
    near,
    store::LookupMap,
};
use vcred_near_utils::NestPrefix;

pub const AUTO_VALIDATION_DELAY_NANOS: u64 = 5 * 86_400 * 1_000_000_000;

/// The sixth, implicit value, an unknown `(service_nonce, execution_nonce)`
/// key, is modeled as `Option::None`/absence in the executions map rather
/// than a variant here.
#[near(serializers = [borsh, json])]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Requested,
    Accepted,
    Disputed,
    Refunded,
    Validated,
}

impl ExecutionState {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Refunded | Self::Validated)
    }
}

#[near(serializers = [borsh, json])]
#[derive(Debug, Clone)]
pub struct Execution {
    pub state: ExecutionState,
    pub requester: AccountId,
    pub last_update_ts: u64,
}

#[near(serializers = [borsh])]
#[derive(Debug)]
pub struct Service {
    pub enabled: bool,
    pub service_type: String,
    pub visibility_id: String,
    pub credits_cost: u64,
    pub executions_nonce: u64,
    pub executions: LookupMap<u64, Execution>,
}

impl Service {
    pub(crate) fn new<S>(prefix: S, service_type: String, visibility_id: String, credits_cost: u64) -> Self
    where
        S: IntoStorageKey,
    {
        Self {
            enabled: true,
            service_type,
            visibility_id,
            credits_cost,
            executions_nonce: 0,
            executions: LookupMap::new(prefix.into_storage_key().nest(Prefix::Executions)),
        }
    }
}

#[derive(BorshSerialize, BorshStorageKey)]
#[borsh(crate = "::near_sdk::borsh")]
enum Prefix {
    Executions,
}
