use std::fmt;

use crate::description::SdpKind;
use crate::error::{Error, Result};
use crate::session::config::UNSPECIFIED_STR;

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub(crate) enum StateChangeOp {
    #[default]
    SetLocal,
    SetRemote,
}

impl fmt::Display for StateChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StateChangeOp::SetLocal => write!(f, "SetLocal"),
            StateChangeOp::SetRemote => write!(f, "SetRemote"),
        }
    }
}

/// Tracks the progress of one offer/answer exchange.
///
/// Each session runs at most one exchange, and the state advances
/// monotonically along one of two ladders depending on the session's role.
///
/// **Initiator:**
/// ```text
/// Idle → (create offer) → LocalOfferPending
///      → (answer received) → RemoteAnswerPending
///      → (answer committed) → Stable
/// ```
///
/// **Responder:**
/// ```text
/// Idle → (offer received) → RemoteOfferPending
///      → (answer created) → LocalAnswerPending
///      → (answer committed) → Stable
/// ```
///
/// `Stable` is reached exactly once per exchange and is terminal for
/// negotiation; a completed exchange is never reopened. `Closed` is
/// terminal for the session and reachable from every state.
///
/// # String Conversion
///
/// ```
/// use peerlink::negotiation::NegotiationState;
///
/// let state = NegotiationState::LocalOfferPending;
/// assert_eq!(state.to_string(), "local-offer-pending");
///
/// let parsed: NegotiationState = "stable".into();
/// assert_eq!(parsed, NegotiationState::Stable);
/// ```
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum NegotiationState {
    /// State not specified. This should not occur in normal operation.
    Unspecified = 0,

    /// No exchange has started. This is the initial state; the initiator
    /// leaves it by creating an offer, the responder by receiving one.
    #[default]
    Idle,

    /// A local offer has been created and is awaiting the remote answer.
    LocalOfferPending,

    /// A remote offer has been received and awaits the local answer.
    RemoteOfferPending,

    /// The local answer has been created but not yet committed.
    LocalAnswerPending,

    /// The remote answer has been received but not yet committed.
    RemoteAnswerPending,

    /// The exchange completed; both descriptions are committed.
    Stable,

    /// The session has been closed. No further negotiation is possible.
    Closed,
}

const NEGOTIATION_STATE_IDLE_STR: &str = "idle";
const NEGOTIATION_STATE_LOCAL_OFFER_PENDING_STR: &str = "local-offer-pending";
const NEGOTIATION_STATE_REMOTE_OFFER_PENDING_STR: &str = "remote-offer-pending";
const NEGOTIATION_STATE_LOCAL_ANSWER_PENDING_STR: &str = "local-answer-pending";
const NEGOTIATION_STATE_REMOTE_ANSWER_PENDING_STR: &str = "remote-answer-pending";
const NEGOTIATION_STATE_STABLE_STR: &str = "stable";
const NEGOTIATION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for NegotiationState {
    fn from(raw: &str) -> Self {
        match raw {
            NEGOTIATION_STATE_IDLE_STR => NegotiationState::Idle,
            NEGOTIATION_STATE_LOCAL_OFFER_PENDING_STR => NegotiationState::LocalOfferPending,
            NEGOTIATION_STATE_REMOTE_OFFER_PENDING_STR => NegotiationState::RemoteOfferPending,
            NEGOTIATION_STATE_LOCAL_ANSWER_PENDING_STR => NegotiationState::LocalAnswerPending,
            NEGOTIATION_STATE_REMOTE_ANSWER_PENDING_STR => NegotiationState::RemoteAnswerPending,
            NEGOTIATION_STATE_STABLE_STR => NegotiationState::Stable,
            NEGOTIATION_STATE_CLOSED_STR => NegotiationState::Closed,
            _ => NegotiationState::Unspecified,
        }
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NegotiationState::Idle => write!(f, "{NEGOTIATION_STATE_IDLE_STR}"),
            NegotiationState::LocalOfferPending => {
                write!(f, "{NEGOTIATION_STATE_LOCAL_OFFER_PENDING_STR}")
            }
            NegotiationState::RemoteOfferPending => {
                write!(f, "{NEGOTIATION_STATE_REMOTE_OFFER_PENDING_STR}")
            }
            NegotiationState::LocalAnswerPending => {
                write!(f, "{NEGOTIATION_STATE_LOCAL_ANSWER_PENDING_STR}")
            }
            NegotiationState::RemoteAnswerPending => {
                write!(f, "{NEGOTIATION_STATE_REMOTE_ANSWER_PENDING_STR}")
            }
            NegotiationState::Stable => write!(f, "{NEGOTIATION_STATE_STABLE_STR}"),
            NegotiationState::Closed => write!(f, "{NEGOTIATION_STATE_CLOSED_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

impl From<u8> for NegotiationState {
    fn from(v: u8) -> Self {
        match v {
            1 => NegotiationState::Idle,
            2 => NegotiationState::LocalOfferPending,
            3 => NegotiationState::RemoteOfferPending,
            4 => NegotiationState::LocalAnswerPending,
            5 => NegotiationState::RemoteAnswerPending,
            6 => NegotiationState::Stable,
            7 => NegotiationState::Closed,
            _ => NegotiationState::Unspecified,
        }
    }
}

pub(crate) fn check_next_negotiation_state(
    cur: NegotiationState,
    next: NegotiationState,
    op: StateChangeOp,
    kind: SdpKind,
) -> Result<NegotiationState> {
    if kind == SdpKind::Unspecified {
        return Err(Error::ErrUnexpectedDescriptionKind);
    }

    match cur {
        NegotiationState::Idle => match op {
            StateChangeOp::SetLocal => {
                // idle->SetLocal(offer)->local-offer-pending
                if kind == SdpKind::Offer && next == NegotiationState::LocalOfferPending {
                    return Ok(next);
                }
            }
            StateChangeOp::SetRemote => {
                // idle->SetRemote(offer)->remote-offer-pending
                if kind == SdpKind::Offer && next == NegotiationState::RemoteOfferPending {
                    return Ok(next);
                }
                // an answer with no offer outstanding
                if kind == SdpKind::Answer {
                    return Err(Error::ErrUnexpectedDescriptionKind);
                }
            }
        },
        NegotiationState::LocalOfferPending => {
            if op == StateChangeOp::SetRemote {
                match kind {
                    // local-offer-pending->SetRemote(answer)->remote-answer-pending
                    SdpKind::Answer => {
                        if next == NegotiationState::RemoteAnswerPending {
                            return Ok(next);
                        }
                    }
                    // an offer while our own offer is outstanding (glare)
                    SdpKind::Offer => {
                        return Err(Error::ErrUnexpectedDescriptionKind);
                    }
                    _ => {}
                }
            }
        }
        NegotiationState::RemoteOfferPending => {
            if op == StateChangeOp::SetLocal && kind == SdpKind::Answer {
                // remote-offer-pending->SetLocal(answer)->local-answer-pending
                if next == NegotiationState::LocalAnswerPending {
                    return Ok(next);
                }
            }
            // the exchange already holds a remote description
            if op == StateChangeOp::SetRemote {
                return Err(Error::ErrStaleDescription);
            }
        }
        NegotiationState::LocalAnswerPending => {
            if op == StateChangeOp::SetLocal && kind == SdpKind::Answer {
                // local-answer-pending->SetLocal(answer)->stable
                if next == NegotiationState::Stable {
                    return Ok(next);
                }
            }
            if op == StateChangeOp::SetRemote {
                return Err(Error::ErrStaleDescription);
            }
        }
        NegotiationState::RemoteAnswerPending => {
            if op == StateChangeOp::SetRemote && kind == SdpKind::Answer {
                // remote-answer-pending->SetRemote(answer)->stable
                if next == NegotiationState::Stable {
                    return Ok(next);
                }
            }
            if op == StateChangeOp::SetRemote {
                return Err(Error::ErrStaleDescription);
            }
        }
        NegotiationState::Stable => {
            // a completed exchange accepts no further descriptions
            return Err(Error::ErrStaleDescription);
        }
        NegotiationState::Closed => {
            return Err(Error::ErrAlreadyClosed);
        }
        NegotiationState::Unspecified => {}
    };

    Err(Error::ErrInvalidState(format!(
        "from {cur} applying {op} {kind}"
    )))
}
