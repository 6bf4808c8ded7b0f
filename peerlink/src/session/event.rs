use crate::candidate::IceCandidate;
use crate::data_channel::event::DataChannelEvent;
use crate::negotiation::NegotiationState;
use crate::session::state::SessionState;

/// Events surfaced by a [`PeerSession`](crate::session::PeerSession).
///
/// Events accumulate in the session's queue in the order they occurred
/// and drain through
/// [`PeerSession::poll_event`](crate::session::PeerSession::poll_event).
#[derive(Debug, Clone, PartialEq)]
pub enum PeerSessionEvent {
    /// The observable session lifecycle advanced.
    OnSessionStateChangeEvent(SessionState),

    /// The negotiation state machine advanced.
    OnNegotiationStateChangeEvent(NegotiationState),

    /// The data channel reported a lifecycle change or a payload.
    OnDataChannel(DataChannelEvent),

    /// A remote candidate was dropped because it references a media line
    /// the negotiated descriptions do not contain.
    OnCandidateDroppedEvent(IceCandidate),
}
