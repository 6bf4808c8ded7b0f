use bytes::Bytes;

/// Events surfaced by a data channel, in the order they occurred.
///
/// Delivered through the owning session's event queue, wrapped in
/// [`PeerSessionEvent::OnDataChannel`](crate::session::PeerSessionEvent::OnDataChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataChannelEvent {
    /// The transport is ready; the channel moved to `Open`.
    OnOpen,

    /// A local close started; no further sends are accepted.
    OnClosing,

    /// The channel is fully closed. Emitted exactly once.
    OnClose,

    /// One inbound payload, delivered in arrival order.
    OnMessage(Bytes),
}
