use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by negotiation, candidate handling and data channels.
///
/// Every error is scoped to the session that produced it. State-machine
/// violations are surfaced immediately and never corrected or retried by
/// the crate; recovery policy belongs to the caller.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// ErrInvalidRole indicates an operation reserved for the other
    /// negotiation role, such as a responder creating an offer.
    #[error("operation not allowed for this negotiation role")]
    ErrInvalidRole,

    /// ErrInvalidState indicates an operation executed in a negotiation
    /// state that does not allow it.
    #[error("operation can not be run in current negotiation state: {0}")]
    ErrInvalidState(String),

    /// ErrUnexpectedDescriptionKind indicates a description whose kind does
    /// not fit the current state, such as an answer while no offer is
    /// outstanding.
    #[error("description kind does not fit current negotiation state")]
    ErrUnexpectedDescriptionKind,

    /// ErrStaleDescription indicates a description that belongs to no
    /// exchange in progress, such as a duplicate or replayed offer.
    #[error("description does not belong to the exchange in progress")]
    ErrStaleDescription,

    /// ErrOutOfOrderCommit indicates a description commit attempted before
    /// its prerequisite commit, or repeated.
    #[error("description commit out of order")]
    ErrOutOfOrderCommit,

    /// ErrChannelNotOpen indicates a send on a data channel that is not
    /// open. Payloads are never queued across channel states.
    #[error("data channel is not open")]
    ErrChannelNotOpen,

    /// ErrUnknownMediaLine indicates a candidate that references a media
    /// line absent from the negotiated descriptions.
    #[error("candidate references unknown media line {0}")]
    ErrUnknownMediaLine(u16),

    /// ErrTransportFailure indicates a delivery or platform failure in a
    /// collaborator. The crate never retries on behalf of the caller.
    #[error("transport failure: {0}")]
    ErrTransportFailure(String),

    /// ErrAlreadyClosed indicates an operation executed after the session
    /// has already been closed.
    #[error("session already closed")]
    ErrAlreadyClosed,
}
