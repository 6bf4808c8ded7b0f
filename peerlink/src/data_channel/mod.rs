use bytes::Bytes;

pub mod event;
pub mod init;
pub mod state;

use crate::data_channel::event::DataChannelEvent;
use crate::data_channel::init::DataChannelInit;
use crate::data_channel::state::ChannelReadyState;
use crate::error::{Error, Result};
use crate::session::PeerSession;
use crate::transport::DataChannelTransport;

/// Owns the lifecycle of one data channel.
///
/// The controller tracks the ready state, gates sends on it and turns
/// transport notifications into ordered [`DataChannelEvent`]s. It holds
/// the transport handle while the channel lives and releases it on close.
///
/// Sends are accepted in `Open` only. Nothing is queued across states: a
/// send while connecting or closing fails with
/// [`Error::ErrChannelNotOpen`], so backpressure stays visible to the
/// caller instead of hiding in a buffer that may never drain.
pub struct DataChannelController {
    label: String,
    init: DataChannelInit,
    ready_state: ChannelReadyState,
    transport: Option<Box<dyn DataChannelTransport>>,
}

impl DataChannelController {
    /// Opens the creating side of a channel. Starts out `Connecting`.
    pub fn create(
        label: &str,
        init: DataChannelInit,
        transport: Box<dyn DataChannelTransport>,
    ) -> Self {
        log::info!("creating data channel '{label}'");
        DataChannelController {
            label: label.to_owned(),
            init,
            ready_state: ChannelReadyState::Connecting,
            transport: Some(transport),
        }
    }

    /// Opens the accepting side of a channel the peer announced. Starts
    /// out `Connecting`.
    pub fn accept(label: &str, transport: Box<dyn DataChannelTransport>) -> Self {
        log::info!("accepting data channel '{label}'");
        DataChannelController {
            label: label.to_owned(),
            init: DataChannelInit::default(),
            ready_state: ChannelReadyState::Connecting,
            transport: Some(transport),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn init(&self) -> &DataChannelInit {
        &self.init
    }

    pub fn ready_state(&self) -> ChannelReadyState {
        self.ready_state
    }

    /// Hands one payload to the transport. `Open` only.
    pub fn send(&mut self, data: Bytes) -> Result<()> {
        if self.ready_state != ChannelReadyState::Open {
            return Err(Error::ErrChannelNotOpen);
        }
        if let Some(transport) = self.transport.as_mut() {
            transport.send(data)
        } else {
            Err(Error::ErrChannelNotOpen)
        }
    }

    /// The transport reports readiness. Only a connecting channel opens;
    /// a late notification on a closing or closed channel changes nothing.
    pub fn on_opened(&mut self) -> Option<DataChannelEvent> {
        if self.ready_state != ChannelReadyState::Connecting {
            log::debug!(
                "data channel '{}' open notification in state {}, ignored",
                self.label,
                self.ready_state
            );
            return None;
        }
        self.set_ready_state(ChannelReadyState::Open);
        Some(DataChannelEvent::OnOpen)
    }

    /// The transport reports teardown, ours or the peer's. Accepted from
    /// any live state, so an abrupt remote close skips `Closing`.
    pub fn on_closed(&mut self) -> Option<DataChannelEvent> {
        if self.ready_state == ChannelReadyState::Closed {
            return None;
        }
        self.transport = None;
        self.set_ready_state(ChannelReadyState::Closed);
        Some(DataChannelEvent::OnClose)
    }

    /// One inbound payload from the transport.
    ///
    /// Delivered in arrival order, without inspection. The `Open` gate
    /// applies to local sends only: a payload the peer sent while the
    /// channel was still open on its side is delivered even if our side
    /// is already closing.
    pub fn on_message(&mut self, data: Bytes) -> Option<DataChannelEvent> {
        if self.ready_state == ChannelReadyState::Closed {
            log::debug!(
                "data channel '{}' dropping {} byte(s) received after close",
                self.label,
                data.len()
            );
            return None;
        }
        Some(DataChannelEvent::OnMessage(data))
    }

    /// Closes the channel, telling the transport to tear down and
    /// releasing its handle. Idempotent; the first call emits `OnClosing`
    /// followed by `OnClose`, later calls emit nothing.
    pub fn close(&mut self) -> Vec<DataChannelEvent> {
        if self.ready_state == ChannelReadyState::Closed {
            return Vec::new();
        }

        self.set_ready_state(ChannelReadyState::Closing);
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.set_ready_state(ChannelReadyState::Closed);

        vec![DataChannelEvent::OnClosing, DataChannelEvent::OnClose]
    }

    fn set_ready_state(&mut self, next: ChannelReadyState) {
        if self.ready_state != next {
            self.ready_state = next;
            log::info!("data channel '{}' state changed to {next}", self.label);
        }
    }
}

/// Borrowed handle to the session's data channel.
///
/// Obtained from [`PeerSession::data_channel`](crate::session::PeerSession::data_channel);
/// all operations route through the owning session, which keeps every
/// mutation on the session's single writer.
pub struct DataChannel<'a> {
    pub(crate) session: &'a mut PeerSession,
}

impl DataChannel<'_> {
    /// The label the channel was created with.
    pub fn label(&self) -> Result<String> {
        if let Some(controller) = self.session.channel() {
            Ok(controller.label().to_owned())
        } else {
            Err(Error::ErrChannelNotOpen)
        }
    }

    /// Whether payloads are delivered in submission order.
    pub fn ordered(&self) -> Result<bool> {
        if let Some(controller) = self.session.channel() {
            Ok(controller.init().ordered)
        } else {
            Err(Error::ErrChannelNotOpen)
        }
    }

    /// The sub-protocol name the channel was created with.
    pub fn protocol(&self) -> Result<String> {
        if let Some(controller) = self.session.channel() {
            Ok(controller.init().protocol.clone())
        } else {
            Err(Error::ErrChannelNotOpen)
        }
    }

    pub fn ready_state(&self) -> Result<ChannelReadyState> {
        if let Some(controller) = self.session.channel() {
            Ok(controller.ready_state())
        } else {
            Err(Error::ErrChannelNotOpen)
        }
    }

    /// Sends one binary payload to the peer.
    pub fn send(&mut self, data: Bytes) -> Result<()> {
        self.session.send_channel_data(data)
    }

    /// Sends a text payload to the peer.
    pub fn send_text(&mut self, s: impl Into<String>) -> Result<()> {
        self.session.send_channel_data(Bytes::from(s.into()))
    }

    /// Closes the channel without closing the session. Idempotent.
    pub fn close(&mut self) {
        self.session.close_channel();
    }
}
