use std::fmt;

use crate::session::config::UNSPECIFIED_STR;

/// Which side of the exchange a session plays.
///
/// Fixed when the session is created and never changes. Exactly one
/// endpoint of a session pair is the initiator; it creates the offer and
/// the data channel, while the responder answers and accepts. Operations
/// reserved for the other role fail with
/// [`Error::ErrInvalidRole`](crate::error::Error::ErrInvalidRole).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionRole {
    /// Creates the offer that opens the exchange.
    Initiator,

    /// Receives the offer and produces the answer.
    Responder,
}

const SESSION_ROLE_INITIATOR_STR: &str = "initiator";
const SESSION_ROLE_RESPONDER_STR: &str = "responder";

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SessionRole::Initiator => write!(f, "{SESSION_ROLE_INITIATOR_STR}"),
            SessionRole::Responder => write!(f, "{SESSION_ROLE_RESPONDER_STR}"),
        }
    }
}

/// The observable lifecycle of a session.
///
/// ```text
/// Open → Negotiating → Connected → Closed
/// ```
///
/// `Connected` corresponds to the negotiation reaching
/// [`NegotiationState::Stable`](crate::negotiation::NegotiationState::Stable).
/// `Closed` is terminal and reachable from every state.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// State not specified. This should not occur in normal operation.
    Unspecified = 0,

    /// The session exists but no exchange has started.
    #[default]
    Open,

    /// An offer/answer exchange is in flight.
    Negotiating,

    /// The exchange completed; both descriptions are committed.
    Connected,

    /// The session has been torn down.
    Closed,
}

const SESSION_STATE_OPEN_STR: &str = "open";
const SESSION_STATE_NEGOTIATING_STR: &str = "negotiating";
const SESSION_STATE_CONNECTED_STR: &str = "connected";
const SESSION_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for SessionState {
    fn from(raw: &str) -> Self {
        match raw {
            SESSION_STATE_OPEN_STR => SessionState::Open,
            SESSION_STATE_NEGOTIATING_STR => SessionState::Negotiating,
            SESSION_STATE_CONNECTED_STR => SessionState::Connected,
            SESSION_STATE_CLOSED_STR => SessionState::Closed,
            _ => SessionState::Unspecified,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SessionState::Open => write!(f, "{SESSION_STATE_OPEN_STR}"),
            SessionState::Negotiating => write!(f, "{SESSION_STATE_NEGOTIATING_STR}"),
            SessionState::Connected => write!(f, "{SESSION_STATE_CONNECTED_STR}"),
            SessionState::Closed => write!(f, "{SESSION_STATE_CLOSED_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

impl From<u8> for SessionState {
    fn from(v: u8) -> Self {
        match v {
            1 => SessionState::Open,
            2 => SessionState::Negotiating,
            3 => SessionState::Connected,
            4 => SessionState::Closed,
            _ => SessionState::Unspecified,
        }
    }
}
