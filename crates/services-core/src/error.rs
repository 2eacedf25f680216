use near_sdk::FunctionError;
use thiserror::Error as ThisError;
use vcred_credits_core::Error as CreditsError;

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

#[derive(Debug, ThisError, FunctionError, PartialEq, Eq)]
pub enum Error {
    #[error("service is disabled")]
    DisabledService,
    #[error("invalid execution state")]
    InvalidExecutionState,
    #[error("unauthorized execution action")]
    UnauthorizedExecutionAction,
    #[error("invalid creator")]
    InvalidCreator,
    #[error(transparent)]
    Credits(#[from] CreditsError),
}
