use near_sdk::{AccountId, near};

#[near(event_json(standard = "vcred-access"))]
#[derive(Debug, Clone)]
pub enum Event {
    #[event_version("0.1.0")]
    DefaultAdminTransferScheduled(DefaultAdminTransferScheduled),

    #[event_version("0.1.0")]
    DefaultAdminTransferCanceled,

    #[event_version("0.1.0")]
    DefaultAdminDelayChangeScheduled(DefaultAdminDelayChangeScheduled),

    #[event_version("0.1.0")]
    DefaultAdminDelayChangeCanceled,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct DefaultAdminTransferScheduled {
    pub new_admin: AccountId,
    pub accept_schedule: u64,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct DefaultAdminDelayChangeScheduled {
    pub new_delay: u64,
    pub effect_schedule: u64,
}

pub trait DelayedAdminEmit: Into<Event> {
    #[inline]
    fn emit(self) {
        Event::emit(&self.into());
    }
}
impl<T> DelayedAdminEmit for T where T: Into<Event> {}

impl From<DefaultAdminTransferScheduled> for Event {
    fn from(e: DefaultAdminTransferScheduled) -> Self {
        Self::DefaultAdminTransferScheduled(e)
    }
}

impl From<DefaultAdminDelayChangeScheduled> for Event {
    fn from(e: DefaultAdminDelayChangeScheduled) -> Self {
        Self::DefaultAdminDelayChangeScheduled(e)
    }
}
