use domain::ListDescriptor;
use thiserror::Error;

/// Everything a receive cycle can fail with. All variants are contained
/// within the failing cycle; the loop reschedules on its normal interval.
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("remote fetch failed: {0}")]
    Transport(String),

    /// Credentials rejected by the remote end. Retried like any other
    /// failure; disabling the account is the account manager's call, not ours.
    #[error("authorization rejected: {0}")]
    Authorization(String),

    #[error("could not resolve list {descriptor}: {reason}")]
    ListResolution {
        descriptor: ListDescriptor,
        reason: String,
    },

    #[error("snapshot store failure: {0}")]
    Store(#[from] anyhow::Error),
}
