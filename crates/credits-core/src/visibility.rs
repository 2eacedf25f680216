use near_sdk::{
    AccountId, BorshStorageKey, CryptoHash, IntoStorageKey,
    borsh::BorshSerialize,
    env, near,
    store::LookupMap,
};
use vcred_near_utils::NestPrefix;

pub type VisibilityKey = CryptoHash;

const DOMAIN: &[u8] = b"vcred.visibility.v1:";

/// Domain-separated hash of the visibility id, used as the storage key.
/// NFC normalization of `vid` is left to callers (not part of this crate's
/// stack): this hashes the raw UTF-8 bytes it is given.
pub fn visibility_key(vid: &str) -> VisibilityKey {
    let mut buf = Vec::with_capacity(DOMAIN.len() + vid.len());
    buf.extend_from_slice(DOMAIN);
    buf.extend_from_slice(vid.as_bytes());
    env::sha256_array(&buf)
}

#[near(serializers = [borsh])]
#[derive(Debug)]
pub struct Visibility {
    pub creator: Option<AccountId>,
    pub total_supply: u64,
    pub claimable_fee_balance: u128,
    pub credit_balances: LookupMap<AccountId, u64>,
}

impl Visibility {
    pub(crate) fn new<S>(prefix: S) -> Self
    where
        S: IntoStorageKey,
    {
        Self {
            creator: None,
            total_supply: 0,
            claimable_fee_balance: 0,
            credit_balances: LookupMap::new(prefix.into_storage_key().nest(Prefix::CreditBalances)),
        }
    }

    #[inline]
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.credit_balances.get(account).copied().unwrap_or_default()
    }

    pub(crate) fn increase_balance(&mut self, account: &AccountId, amount: u64) {
        let balance = self.balance_of(account);
        self.credit_balances
            .insert(account.clone(), balance + amount);
    }

    pub(crate) fn decrease_balance(&mut self, account: &AccountId, amount: u64) -> Option<()> {
        let balance = self.balance_of(account);
        let new_balance = balance.checked_sub(amount)?;
        self.credit_balances.insert(account.clone(), new_balance);
        Some(())
    }
}

#[derive(BorshSerialize, BorshStorageKey)]
#[borsh(crate = "::near_sdk::borsh")]
enum Prefix {
    CreditBalances,
}
