use near_plugins::{AccessControllable, access_control_any};
use near_sdk::{
    AccountId, NearToken, Promise, PromiseOrValue,
    env, json_types::{Base58CryptoHash, U128},
    log, near,
};
use vcred_credits_core::Error;
use vcred_near_utils::PREDECESSOR_ACCOUNT_ID;

use crate::{Contract, ContractExt, Role};

/// Read-only projection of a `Visibility` row: the stored type holds a
/// `LookupMap` of per-account balances that cannot be serialized wholesale,
/// so queries return this view plus a separate per-account balance lookup.
#[near(serializers = [json])]
#[derive(Debug, Clone)]
pub struct VisibilityView {
    pub creator: Option<AccountId>,
    pub total_supply: U128,
    pub claimable_fee_balance: U128,
}

#[near]
impl Contract {
    /// `buyCredits(vid, amount, referrer?)`.
    #[payable]
    pub fn buy_credits(
        &mut self,
        visibility_id: String,
        amount: u64,
        referrer: Option<AccountId>,
    ) -> Result<PromiseOrValue<()>, Error> {
        let buyer = PREDECESSOR_ACCOUNT_ID.clone();
        let attached = env::attached_deposit().as_yoctonear();

        let outcome = self.credits.buy_credits(
            &visibility_id,
            buyer.clone(),
            amount,
            referrer.clone(),
            attached,
        )?;
        log!(
            "buyCredits: {} bought {} credits of {} for {} yN (+{} fees)",
            buyer,
            amount,
            visibility_id,
            outcome.trade_cost,
            outcome.creator_fee + outcome.protocol_fee + outcome.referrer_fee
        );

        let treasury = self.credits.treasury().clone();
        let mut promise = disburse(None, &treasury, outcome.protocol_fee);
        if let Some(referrer) = referrer {
            promise = disburse(promise, &referrer, outcome.referrer_fee);
        }
        promise = disburse(promise, &buyer, outcome.refund);

        Ok(promise.map_or(PromiseOrValue::Value(()), PromiseOrValue::Promise))
    }

    /// `sellCredits(vid, amount, referrer?)`.
    pub fn sell_credits(
        &mut self,
        visibility_id: String,
        amount: u64,
        referrer: Option<AccountId>,
    ) -> Result<PromiseOrValue<()>, Error> {
        let seller = PREDECESSOR_ACCOUNT_ID.clone();

        let outcome =
            self.credits
                .sell_credits(&visibility_id, seller.clone(), amount, referrer.clone())?;
        log!(
            "sellCredits: {} sold {} credits of {} for {} yN",
            seller,
            amount,
            visibility_id,
            outcome.reimbursement
        );

        let treasury = self.credits.treasury().clone();
        let mut promise = disburse(None, &treasury, outcome.protocol_fee);
        if let Some(referrer) = referrer {
            promise = disburse(promise, &referrer, outcome.referrer_fee);
        }
        promise = disburse(promise, &seller, outcome.reimbursement);

        Ok(promise.map_or(PromiseOrValue::Value(()), PromiseOrValue::Promise))
    }

    /// `claimCreatorFee(vid)`. Callable by anyone; pays out to the bound
    /// creator, not the caller.
    pub fn claim_creator_fee(&mut self, visibility_id: String) -> Result<Promise, Error> {
        let outcome = self.credits.claim_creator_fee(&visibility_id)?;
        log!(
            "claimCreatorFee: {} claimed {} yN for {}",
            outcome.creator,
            outcome.amount,
            visibility_id
        );
        Ok(Promise::new(outcome.creator).transfer(NearToken::from_yoctonear(outcome.amount)))
    }

    /// `setCreatorVisibility(vid, creator)`.
    #[access_control_any(roles(Role::CreatorsChecker))]
    pub fn set_creator_visibility(&mut self, visibility_id: String, creator: Option<AccountId>) {
        self.credits.set_creator_visibility(&visibility_id, creator);
    }

    /// `transferCredits(vid, from, to, amount)`. Also the primitive the
    /// Services Engine escrows through (called in-process, not via this
    /// bound method).
    #[access_control_any(roles(Role::CreditsTransfer))]
    pub fn transfer_credits(
        &mut self,
        visibility_id: String,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<(), Error> {
        self.credits.transfer_credits(&visibility_id, from, to, amount)
    }

    /// `updateTreasury(addr)`.
    #[access_control_any(roles(Role::TreasuryManager))]
    pub fn update_treasury(&mut self, new_treasury: AccountId) {
        self.credits.set_treasury(new_treasury);
    }

    /// `buyCostWithFees(vid, amount, referrer?)`.
    pub fn buy_cost_with_fees(
        &self,
        visibility_id: String,
        amount: u64,
        has_referrer: bool,
    ) -> Result<BuyCostView, Error> {
        self.credits
            .buy_cost_with_fees(&visibility_id, amount, has_referrer)
            .map(Into::into)
    }

    /// `sellCostWithFees(vid, amount, referrer?)`.
    pub fn sell_cost_with_fees(
        &self,
        visibility_id: String,
        amount: u64,
        has_referrer: bool,
    ) -> Result<SellCostView, Error> {
        self.credits
            .sell_cost_with_fees(&visibility_id, amount, has_referrer)
            .map(Into::into)
    }

    /// `getVisibility(vid)`.
    pub fn get_visibility(&self, visibility_id: String) -> Option<VisibilityView> {
        let key = self.credits.visibility_key(&visibility_id);
        self.credits.get_visibility(&key).map(|v| VisibilityView {
            creator: v.creator.clone(),
            total_supply: U128(u128::from(v.total_supply)),
            claimable_fee_balance: U128(v.claimable_fee_balance),
        })
    }

    /// `getVisibilityBalance(vid, account)`: per-account credit balance.
    pub fn get_visibility_balance(&self, visibility_id: String, account_id: AccountId) -> U128 {
        let key = self.credits.visibility_key(&visibility_id);
        U128(u128::from(
            self.credits
                .get_visibility(&key)
                .map_or(0, |v| v.balance_of(&account_id)),
        ))
    }

    /// `getVisibilityKey(vid)`: the domain-separated hash used as the
    /// storage key, exposed for downstream indexers that key by hash.
    pub fn get_visibility_key(&self, visibility_id: String) -> Base58CryptoHash {
        self.credits.visibility_key(&visibility_id).into()
    }
}

#[near(serializers = [json])]
#[derive(Debug, Clone, Copy)]
pub struct BuyCostView {
    pub trade_cost: U128,
    pub creator_fee: U128,
    pub protocol_fee: U128,
    pub referrer_fee: U128,
    pub total_cost: U128,
}

#[near(serializers = [json])]
#[derive(Debug, Clone, Copy)]
pub struct SellCostView {
    pub trade_cost: U128,
    pub creator_fee: U128,
    pub protocol_fee: U128,
    pub referrer_fee: U128,
    pub reimbursement: U128,
}

impl From<vcred_credits_core::BuyCost> for BuyCostView {
    fn from(c: vcred_credits_core::BuyCost) -> Self {
        Self {
            trade_cost: U128(c.trade_cost),
            creator_fee: U128(c.creator_fee),
            protocol_fee: U128(c.protocol_fee),
            referrer_fee: U128(c.referrer_fee),
            total_cost: U128(c.total_cost),
        }
    }
}

impl From<vcred_credits_core::SellCost> for SellCostView {
    fn from(c: vcred_credits_core::SellCost) -> Self {
        Self {
            trade_cost: U128(c.trade_cost),
            creator_fee: U128(c.creator_fee),
            protocol_fee: U128(c.protocol_fee),
            referrer_fee: U128(c.referrer_fee),
            reimbursement: U128(c.reimbursement),
        }
    }
}

fn disburse(existing: Option<Promise>, to: &AccountId, amount: u128) -> Option<Promise> {
    if amount == 0 {
        return existing;
    }
    let next = Promise::new(to.clone()).transfer(NearToken::from_yoctonear(amount));
    Some(match existing {
        Some(p) => p.and(next),
        None => next,
    })
}
