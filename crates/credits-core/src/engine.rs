use near_sdk::{
    AccountId, BorshStorageKey, IntoStorageKey,
    borsh::BorshSerialize,
    near,
    store::LookupMap,
};
use vcred_near_utils::NestPrefix;

use crate::{
    curve,
    error::{Error, Result},
    event::{CreatorFeeClaimed, CreatorVisibilitySet, CreditsEventEmit, CreditsTrade, CreditsTransfer},
    fees,
    visibility::{Visibility, VisibilityKey, visibility_key},
};

#[near(serializers = [borsh])]
#[derive(Debug)]
pub struct CreditsEngine {
    visibilities: LookupMap<VisibilityKey, Visibility>,
    storage_prefix: Vec<u8>,
    treasury: AccountId,
}

/// Native-currency side effects a `#[near_bindgen]` method must perform
/// *after* the state mutation that produced them, per the "mutate first,
/// disburse after" discipline (no synchronous external-call hazard exists
/// on NEAR, but the ordering is preserved structurally regardless).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOutcome {
    pub trade_cost: u128,
    pub creator_fee: u128,
    pub protocol_fee: u128,
    pub referrer_fee: u128,
    pub total_cost: u128,
    pub refund: u128,
    pub new_total_supply: u64,
    pub new_current_price: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellOutcome {
    pub trade_cost: u128,
    pub creator_fee: u128,
    pub protocol_fee: u128,
    pub referrer_fee: u128,
    pub reimbursement: u128,
    pub new_total_supply: u64,
    pub new_current_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub creator: AccountId,
    pub amount: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyCost {
    pub trade_cost: u128,
    pub creator_fee: u128,
    pub protocol_fee: u128,
    pub referrer_fee: u128,
    pub total_cost: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellCost {
    pub trade_cost: u128,
    pub creator_fee: u128,
    pub protocol_fee: u128,
    pub referrer_fee: u128,
    pub reimbursement: u128,
}

impl CreditsEngine {
    pub fn new<S>(prefix: S, treasury: AccountId) -> Result<Self>
    where
        S: IntoStorageKey,
    {
        fees::validate_fee_params()?;
        let storage_prefix = prefix.into_storage_key();
        Ok(Self {
            visibilities: LookupMap::new(storage_prefix.clone().nest(Prefix::Visibilities)),
            storage_prefix,
            treasury,
        })
    }

    #[inline]
    pub const fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    pub fn set_treasury(&mut self, new_treasury: AccountId) {
        self.treasury = new_treasury;
    }

    #[inline]
    pub fn visibility_key(&self, vid: &str) -> VisibilityKey {
        visibility_key(vid)
    }

    pub fn get_visibility(&self, key: &VisibilityKey) -> Option<&Visibility> {
        self.visibilities.get(key)
    }

    fn total_supply_of(&self, vid: &str) -> u64 {
        let key = visibility_key(vid);
        self.get_visibility(&key).map_or(0, |v| v.total_supply)
    }

    /// `buyCostWithFees(vid, amount, referrer?)`. Pure/read-only: the exact
    /// cost a `buyCredits` call at the current supply would charge.
    pub fn buy_cost_with_fees(&self, vid: &str, amount: u64, has_referrer: bool) -> Result<BuyCost> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        let from_supply = self.total_supply_of(vid);
        let to_supply = from_supply
            .checked_add(amount)
            .filter(|&s| s <= curve::MAX_TOTAL_SUPPLY)
            .ok_or(Error::InvalidAmount)?
            - 1;

        let trade_cost = curve::trade_cost(from_supply, to_supply);
        let split = fees::split(trade_cost, has_referrer)?;

        let trade_cost = amount_to_u128(trade_cost)?;
        let creator_fee = amount_to_u128(split.creator_fee)?;
        let protocol_fee = amount_to_u128(split.protocol_fee)?;
        let referrer_fee = amount_to_u128(split.referrer_fee)?;
        let total_cost = trade_cost
            .checked_add(creator_fee)
            .and_then(|v| v.checked_add(protocol_fee))
            .and_then(|v| v.checked_add(referrer_fee))
            .ok_or(Error::InvalidAmount)?;

        Ok(BuyCost {
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            total_cost,
        })
    }

    /// `sellCostWithFees(vid, amount, referrer?)`. Pure/read-only: the exact
    /// reimbursement a `sellCredits` call at the current supply would pay.
    pub fn sell_cost_with_fees(&self, vid: &str, amount: u64, has_referrer: bool) -> Result<SellCost> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        let total_supply = self.total_supply_of(vid);
        if amount > total_supply {
            return Err(Error::InvalidAmount);
        }
        let from_supply = total_supply - amount;
        let to_supply = total_supply - 1;

        let trade_cost = curve::trade_cost(from_supply, to_supply);
        let split = fees::split(trade_cost, has_referrer)?;

        let trade_cost = amount_to_u128(trade_cost)?;
        let creator_fee = amount_to_u128(split.creator_fee)?;
        let protocol_fee = amount_to_u128(split.protocol_fee)?;
        let referrer_fee = amount_to_u128(split.referrer_fee)?;
        let reimbursement = trade_cost
            .checked_sub(creator_fee)
            .and_then(|v| v.checked_sub(protocol_fee))
            .and_then(|v| v.checked_sub(referrer_fee))
            .ok_or(Error::InvalidAmount)?;

        Ok(SellCost {
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            reimbursement,
        })
    }

    fn visibility_mut(&mut self, key: VisibilityKey) -> &mut Visibility {
        if !self.visibilities.contains_key(&key) {
            let row = Visibility::new(
                self.storage_prefix
                    .clone()
                    .nest(Prefix::VisibilityRows)
                    .nest(key),
            );
            self.visibilities.insert(key, row);
        }
        self.visibilities
            .get_mut(&key)
            .unwrap_or_else(|| unreachable!())
    }

    /// `buyCredits(vid, amount, referrer?)`.
    pub fn buy_credits(
        &mut self,
        vid: &str,
        buyer: AccountId,
        amount: u64,
        referrer: Option<AccountId>,
        attached: u128,
    ) -> Result<BuyOutcome> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        let key = visibility_key(vid);
        let visibility = self.visibility_mut(key);
        let from_supply = visibility.total_supply;
        let new_total_supply = from_supply
            .checked_add(amount)
            .filter(|&s| s <= curve::MAX_TOTAL_SUPPLY)
            .ok_or(Error::InvalidAmount)?;
        let to_supply = new_total_supply - 1;

        let trade_cost = curve::trade_cost(from_supply, to_supply);
        let split = fees::split(trade_cost, referrer.is_some())?;

        let trade_cost = amount_to_u128(trade_cost)?;
        let creator_fee = amount_to_u128(split.creator_fee)?;
        let protocol_fee = amount_to_u128(split.protocol_fee)?;
        let referrer_fee = amount_to_u128(split.referrer_fee)?;
        let new_current_price = amount_to_u128(curve::spot_price(new_total_supply))?;

        let total_cost = trade_cost
            .checked_add(creator_fee)
            .and_then(|v| v.checked_add(protocol_fee))
            .and_then(|v| v.checked_add(referrer_fee))
            .ok_or(Error::InvalidAmount)?;

        if attached < total_cost {
            return Err(Error::NotEnoughEthSent);
        }
        let refund = attached - total_cost;

        visibility.total_supply = new_total_supply;
        visibility.increase_balance(&buyer, amount);
        visibility.claimable_fee_balance = visibility
            .claimable_fee_balance
            .checked_add(creator_fee)
            .ok_or(Error::InvalidAmount)?;

        CreditsTrade {
            from: buyer,
            visibility_id: vid.to_string(),
            amount,
            is_buy: true,
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            referrer,
            new_total_supply,
            new_current_price,
        }
        .emit();

        Ok(BuyOutcome {
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            total_cost,
            refund,
            new_total_supply,
            new_current_price,
        })
    }

    /// `sellCredits(vid, amount, referrer?)`.
    pub fn sell_credits(
        &mut self,
        vid: &str,
        seller: AccountId,
        amount: u64,
        referrer: Option<AccountId>,
    ) -> Result<SellOutcome> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }

        let key = visibility_key(vid);
        let visibility = self.visibility_mut(key);
        let total_supply = visibility.total_supply;
        if amount > total_supply {
            return Err(Error::InvalidAmount);
        }
        if visibility.balance_of(&seller) < amount {
            return Err(Error::NotEnoughCreditsOwned);
        }

        let from_supply = total_supply - amount;
        let to_supply = total_supply - 1;
        let new_total_supply = from_supply;

        let trade_cost = curve::trade_cost(from_supply, to_supply);
        let split = fees::split(trade_cost, referrer.is_some())?;

        let trade_cost = amount_to_u128(trade_cost)?;
        let creator_fee = amount_to_u128(split.creator_fee)?;
        let protocol_fee = amount_to_u128(split.protocol_fee)?;
        let referrer_fee = amount_to_u128(split.referrer_fee)?;
        let new_current_price = amount_to_u128(curve::spot_price(new_total_supply))?;

        let reimbursement = trade_cost
            .checked_sub(creator_fee)
            .and_then(|v| v.checked_sub(protocol_fee))
            .and_then(|v| v.checked_sub(referrer_fee))
            .ok_or(Error::InvalidAmount)?;

        visibility.total_supply = new_total_supply;
        visibility
            .decrease_balance(&seller, amount)
            .ok_or(Error::NotEnoughCreditsOwned)?;
        visibility.claimable_fee_balance = visibility
            .claimable_fee_balance
            .checked_add(creator_fee)
            .ok_or(Error::InvalidAmount)?;

        CreditsTrade {
            from: seller,
            visibility_id: vid.to_string(),
            amount,
            is_buy: false,
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            referrer,
            new_total_supply,
            new_current_price,
        }
        .emit();

        Ok(SellOutcome {
            trade_cost,
            creator_fee,
            protocol_fee,
            referrer_fee,
            reimbursement,
            new_total_supply,
            new_current_price,
        })
    }

    /// `claimCreatorFee(vid)`.
    pub fn claim_creator_fee(&mut self, vid: &str) -> Result<ClaimOutcome> {
        let key = visibility_key(vid);
        let visibility = self.visibility_mut(key);
        let creator = visibility.creator.clone().ok_or(Error::InvalidCreator)?;
        let amount = visibility.claimable_fee_balance;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        visibility.claimable_fee_balance = 0;

        CreatorFeeClaimed {
            creator: creator.clone(),
            amount,
        }
        .emit();

        Ok(ClaimOutcome { creator, amount })
    }

    /// `setCreatorVisibility(vid, creator)`. Role-gated by the caller
    /// (`CreatorsChecker`) at the contract binding layer.
    pub fn set_creator_visibility(&mut self, vid: &str, creator: Option<AccountId>) {
        let key = visibility_key(vid);
        let visibility = self.visibility_mut(key);
        visibility.creator = creator.clone();

        CreatorVisibilitySet {
            visibility_id: vid.to_string(),
            creator,
        }
        .emit();
    }

    /// `transferCredits(vid, from, to, amount)`. Role-gated by the caller
    /// (`CreditsTransfer`) at the contract binding layer, and also the
    /// primitive the Services Engine escrows through.
    pub fn transfer_credits(
        &mut self,
        vid: &str,
        from: AccountId,
        to: AccountId,
        amount: u64,
    ) -> Result<()> {
        let key = visibility_key(vid);
        let visibility = self.visibility_mut(key);
        visibility
            .decrease_balance(&from, amount)
            .ok_or(Error::NotEnoughCreditsOwned)?;
        visibility.increase_balance(&to, amount);

        CreditsTransfer {
            visibility_id: vid.to_string(),
            from,
            to,
            amount,
        }
        .emit();

        Ok(())
    }
}

fn amount_to_u128(amount: curve::U256) -> Result<u128> {
    u128::try_from(amount).map_err(|_| Error::InvalidAmount)
}

#[derive(BorshSerialize, BorshStorageKey)]
#[borsh(crate = "::near_sdk::borsh")]
enum Prefix {
    Visibilities,
    VisibilityRows,
}

#[cfg(test)]
mod tests {
    use near_sdk::{test_utils::VMContextBuilder, testing_env};
    use rstest::rstest;

    use super::*;

    fn account(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn engine() -> CreditsEngine {
        testing_env!(VMContextBuilder::new().build());
        CreditsEngine::new(b"t".to_vec(), account("treasury.near")).unwrap()
    }

    #[rstest]
    fn first_unit_purchase() {
        let mut e = engine();
        let user1 = account("user1.near");
        let outcome = e
            .buy_credits("x-V", user1.clone(), 1, None, 120_000_000_000_000)
            .unwrap();

        assert_eq!(outcome.trade_cost, 100_000_000_000_000);
        assert_eq!(outcome.creator_fee, 2_000_000_000_000);
        assert_eq!(outcome.protocol_fee, 2_000_000_000_000);
        assert_eq!(outcome.referrer_fee, 0);
        assert_eq!(outcome.total_cost, 104_000_000_000_000);
        assert_eq!(outcome.refund, 16_000_000_000_000);
        assert_eq!(outcome.new_total_supply, 1);

        let key = e.visibility_key("x-V");
        let v = e.get_visibility(&key).unwrap();
        assert_eq!(v.total_supply, 1);
        assert_eq!(v.balance_of(&user1), 1);
        assert_eq!(v.claimable_fee_balance, 2_000_000_000_000);
    }

    #[rstest]
    fn underpaying_buy_fails() {
        let mut e = engine();
        let user1 = account("user1.near");
        assert_eq!(
            e.buy_credits("x-V", user1, 1, None, 1),
            Err(Error::NotEnoughEthSent)
        );
    }

    #[rstest]
    fn sell_to_zero_then_claim() {
        let mut e = engine();
        let user2 = account("user2.near");
        e.set_creator_visibility("x-V", Some(account("creator.near")));
        e.buy_credits("x-V", user2.clone(), 6, None, u128::MAX / 2).unwrap();

        let mut total_creator_fee = 0u128;
        for amount in [2u64, 1, 3] {
            let outcome = e.sell_credits("x-V", user2.clone(), amount, None).unwrap();
            total_creator_fee += outcome.creator_fee;
        }

        let key = e.visibility_key("x-V");
        let v = e.get_visibility(&key).unwrap();
        assert_eq!(v.total_supply, 0);
        assert_eq!(v.balance_of(&user2), 0);
        assert_eq!(v.claimable_fee_balance, total_creator_fee);

        let claimed = e.claim_creator_fee("x-V").unwrap();
        assert_eq!(claimed.amount, total_creator_fee);
        assert_eq!(e.claim_creator_fee("x-V"), Err(Error::InvalidAmount));
    }

    #[rstest]
    fn buy_and_sell_cost_match_at_same_supply() {
        let mut e = engine();
        let user1 = account("user1.near");
        e.buy_credits("x-V", user1, 1_000, None, u128::MAX / 2).unwrap();

        let buy = e.buy_cost_with_fees("x-V", 5, false).unwrap();
        let sell = e.sell_cost_with_fees("x-V", 5, false).unwrap();
        assert_eq!(buy.trade_cost, sell.trade_cost);
        assert_eq!(buy.creator_fee, sell.creator_fee);
        assert!(sell.reimbursement <= buy.total_cost);
    }

    #[rstest]
    fn selling_more_than_owned_fails() {
        let mut e = engine();
        let user1 = account("user1.near");
        e.buy_credits("x-V", user1.clone(), 1, None, u128::MAX / 2).unwrap();
        assert_eq!(
            e.sell_credits("x-V", user1, 2, None),
            Err(Error::NotEnoughCreditsOwned)
        );
    }

    #[rstest]
    fn transfer_moves_without_touching_supply() {
        let mut e = engine();
        let user1 = account("user1.near");
        let escrow = account("services.near");
        e.buy_credits("x-V", user1.clone(), 10, None, u128::MAX / 2).unwrap();

        e.transfer_credits("x-V", user1.clone(), escrow.clone(), 4).unwrap();

        let key = e.visibility_key("x-V");
        let v = e.get_visibility(&key).unwrap();
        assert_eq!(v.total_supply, 10);
        assert_eq!(v.balance_of(&user1), 6);
        assert_eq!(v.balance_of(&escrow), 4);
    }
}
