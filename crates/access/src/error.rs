use near_sdk::FunctionError;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

#[derive(Debug, ThisError, FunctionError, PartialEq, Eq)]
pub enum Error {
    #[error("unauthorized")]
    Unauthorized,
    #[error("no admin transfer is pending")]
    NoPendingTransfer,
    #[error("pending admin transfer has not reached its accept schedule yet")]
    TransferNotReady,
    #[error("no delay change is pending")]
    NoPendingDelayChange,
    #[error("pending delay change has not reached its effect schedule yet")]
    DelayChangeNotReady,
}
