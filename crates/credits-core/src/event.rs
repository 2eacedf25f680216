use derive_more::From;
use near_sdk::{AccountId, near};
use serde_with::{DisplayFromStr, serde_as};

#[near(event_json(standard = "vcred"))]
#[derive(Debug, Clone, From)]
pub enum Event {
    #[event_version("0.1.0")]
    CreatorFeeClaimed(CreatorFeeClaimed),

    #[event_version("0.1.0")]
    CreatorVisibilitySet(CreatorVisibilitySet),

    #[event_version("0.1.0")]
    CreditsTrade(CreditsTrade),

    #[event_version("0.1.0")]
    CreditsTransfer(CreditsTransfer),
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct CreatorFeeClaimed {
    pub creator: AccountId,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct CreatorVisibilitySet {
    pub visibility_id: String,
    pub creator: Option<AccountId>,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct CreditsTrade {
    pub from: AccountId,
    pub visibility_id: String,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
    pub is_buy: bool,
    #[serde_as(as = "DisplayFromStr")]
    pub trade_cost: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub creator_fee: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub protocol_fee: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub referrer_fee: u128,
    pub referrer: Option<AccountId>,
    #[serde_as(as = "DisplayFromStr")]
    pub new_total_supply: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub new_current_price: u128,
}

#[must_use = "make sure to `.emit()` this event"]
#[near(serializers = [json])]
#[serde_as]
#[serde(rename_all = "camelCase")]
#[derive(Debug, Clone)]
pub struct CreditsTransfer {
    pub visibility_id: String,
    pub from: AccountId,
    pub to: AccountId,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u64,
}

pub trait CreditsEventEmit: Into<Event> {
    #[inline]
    fn emit(self) {
        Event::emit(&self.into());
    }
}
impl<T> CreditsEventEmit for T where T: Into<Event> {}
