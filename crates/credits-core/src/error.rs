use near_sdk::FunctionError;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

#[derive(Debug, ThisError, FunctionError, PartialEq, Eq)]
pub enum Error {
    /// Part of the spec's error taxonomy ("null account supplied where
    /// disallowed"), but unconstructible here: `AccountId` has no null
    /// value on NEAR, so a caller can never supply one. Kept so the
    /// taxonomy stays complete for anyone matching on `Error` by name.
    #[error("invalid address")]
    InvalidAddress,
    #[error("invalid creator")]
    InvalidCreator,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid fee params")]
    InvalidFeeParams,
    #[error("not enough attached deposit")]
    NotEnoughEthSent,
    #[error("not enough credits owned")]
    NotEnoughCreditsOwned,
    /// Role gates (`setCreatorVisibility`, `transferCredits`,
    /// `updateTreasury`) are enforced by `near_plugins`' own
    /// `#[access_control_any]`, which aborts the call before this `Error`
    /// type is ever constructed. Kept for the same reason as
    /// `InvalidAddress`.
    #[error("unauthorized")]
    Unauthorized,
}
