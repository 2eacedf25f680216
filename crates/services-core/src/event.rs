use derive_more::From;
use near_sdk::{AccountId, near};
use serde_with::{DisplayFromStr, serde_as};

#[near(event_json(standard = "vcred"))]
#[derive(Debug, Clone, From)]
pub enum Event {
    #[event_version("0.1.0")]
    ServiceCreated(ServiceCreated),

    #[event_version("0.1.0")]
    ServiceUpdated(ServiceUpdated),

    #[event_version("0.1.0")]
    ServiceExecutionRequested(ServiceExecutionRequested),

    #[event_version("0.1.0")]
    ServiceExecutionCanceled(ServiceExecutionCanceled),

    #[event_version("0.1.0")]
    ServiceExecutionAccepted(ServiceExecutionAccepted),

    #[event_version("0.1.0")]
    ServiceExecutionValidated(ServiceExecutionValidated),

    #[event_version("0.1.0")]
    ServiceExecutionDisputed(ServiceExecutionDisputed),

    #[event_version("0.1.0")]
    ServiceExecutionResolved(ServiceExecutionResolved),
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceCreated {
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
    pub service_type: String,
    pub visibility_id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub credits_cost_amount: u64,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceUpdated {
    #[serde_as(as = "DisplayFromStr")]
    pub nonce: u64,
    pub enabled: bool,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionRequested {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
    pub requester: AccountId,
    pub request_data: String,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionCanceled {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
    pub from: AccountId,
    pub cancel_data: String,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionAccepted {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
    pub response_data: String,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionValidated {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionDisputed {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
    pub dispute_data: String,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct ServiceExecutionResolved {
    #[serde_as(as = "DisplayFromStr")]
    pub service_nonce: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub execution_nonce: u64,
    pub refund: bool,
    pub resolve_data: String,
}

pub trait ServicesEventEmit: Into<Event> {
    #[inline]
    fn emit(self) {
        Event::emit(&self.into());
    }
}
impl<T> ServicesEventEmit for T where T: Into<Event> {}
