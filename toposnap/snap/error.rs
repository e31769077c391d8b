use thiserror::Error;

/// Failure modes of the snapping engine.
///
/// Every variant is fatal to the snap call in progress: there is no partial output, and the
/// caller always gets back either a fully snapped geometry or one of these.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("edge store backend failed: {0}")]
    BackendFailure(String),

    #[error("geometry kernel failed: {0}")]
    KernelFailure(String),

    #[error("failed to mutate point array")]
    MutationFailure,

    #[error("exceeded the maximum number of snap iterations")]
    BoundsExceeded,
}
