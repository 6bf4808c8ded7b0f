use bytes::Bytes;

use crate::candidate::IceCandidate;
use crate::description::SessionDescription;
use crate::error::Result;

/// The platform capabilities a session consumes while negotiating.
///
/// This is the only surface the crate requires from the underlying media
/// machinery. Everything behind it is opaque: description payloads and
/// candidate data are produced here, relayed by the session, and applied
/// here on the remote side without interpretation in between. No media
/// flows through this trait and no encoding happens behind it on the
/// session's behalf.
///
/// Calls return control immediately. An implementation that must wait for
/// its platform resolves that wait itself; the session never blocks on it.
pub trait MediaTransport {
    /// Starts candidate gathering for the negotiation attempt in progress.
    ///
    /// Gathered candidates are delivered by the driver through
    /// [`PeerSession::handle_local_candidate`](crate::session::PeerSession::handle_local_candidate),
    /// one at a time, while gathering continues in the background.
    fn gather_candidates(&mut self) -> Result<()>;

    /// Produces the opaque offer payload describing the local endpoint.
    fn create_offer(&mut self) -> Result<String>;

    /// Produces the opaque answer payload for the committed remote offer.
    fn create_answer(&mut self) -> Result<String>;

    /// Applies a local description that negotiation has committed.
    fn set_local_description(&mut self, description: &SessionDescription) -> Result<()>;

    /// Applies a remote description that negotiation has committed.
    fn set_remote_description(&mut self, description: &SessionDescription) -> Result<()>;

    /// Applies one remote candidate.
    ///
    /// Fails with [`Error::ErrUnknownMediaLine`](crate::error::Error::ErrUnknownMediaLine)
    /// when the candidate references a media line absent from the
    /// negotiated descriptions; the session drops such candidates and
    /// keeps negotiating.
    fn add_candidate(&mut self, candidate: &IceCandidate) -> Result<()>;

    /// Stops gathering and releases platform resources. Called once, on
    /// session teardown.
    fn close(&mut self);
}

/// Byte conduit backing one established data channel.
///
/// The controller owns a handle to this conduit while the channel lives
/// and releases it when the channel closes. Readiness and inbound payloads
/// travel the other way: the driver reports them through the session's
/// `handle_channel_*` methods.
pub trait DataChannelTransport {
    /// Hands one payload to the conduit for delivery in submission order.
    fn send(&mut self, data: Bytes) -> Result<()>;

    /// Tears the conduit down. Called at most once.
    fn close(&mut self);
}
