//! In-memory collaborators for the peerlink examples.
//!
//! Real deployments back a [`peerlink::session::PeerSession`] with a
//! signaling service and a platform session engine. The examples in this
//! crate run two sessions inside one process instead, connected through the
//! shared queues defined here: the example's main loop shuttles signaling
//! messages, gathered candidates and channel payloads between the peers the
//! way a network would.

#![warn(rust_2018_idioms)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use peerlink::candidate::IceCandidate;
use peerlink::description::SessionDescription;
use peerlink::error::{Error, Result};
use peerlink::signaling::{SignalingChannel, SignalingMessage};
use peerlink::transport::{DataChannelTransport, MediaTransport};

/// One direction of the in-memory signaling service.
pub type SignalWire = Arc<Mutex<VecDeque<SignalingMessage>>>;

/// One direction of an in-memory data channel pipe.
pub type BytePipe = Arc<Mutex<VecDeque<Bytes>>>;

/// Candidates a [`LoopbackMedia`] gathered, waiting for the driver to relay.
pub type GatheredCandidates = Arc<Mutex<VecDeque<IceCandidate>>>;

pub fn signal_wire() -> SignalWire {
    Arc::new(Mutex::new(VecDeque::new()))
}

pub fn byte_pipe() -> BytePipe {
    Arc::new(Mutex::new(VecDeque::new()))
}

/// Takes everything currently queued on a signaling wire.
pub fn drain_signals(wire: &SignalWire) -> Result<Vec<SignalingMessage>> {
    let mut queue = wire
        .lock()
        .map_err(|_| Error::ErrTransportFailure("signaling wire poisoned".to_owned()))?;
    Ok(queue.drain(..).collect())
}

/// Takes everything currently queued on a byte pipe.
pub fn drain_pipe(pipe: &BytePipe) -> Result<Vec<Bytes>> {
    let mut queue = pipe
        .lock()
        .map_err(|_| Error::ErrTransportFailure("byte pipe poisoned".to_owned()))?;
    Ok(queue.drain(..).collect())
}

/// Takes the candidates a media transport gathered since the last poll.
pub fn drain_gathered(gathered: &GatheredCandidates) -> Result<Vec<IceCandidate>> {
    let mut queue = gathered
        .lock()
        .map_err(|_| Error::ErrTransportFailure("candidate queue poisoned".to_owned()))?;
    Ok(queue.drain(..).collect())
}

/// Signaling endpoint that appends every message to a shared queue.
///
/// The driver owns the other end of the queue and delivers its contents to
/// the peer session in order, which is exactly the per-direction ordering
/// guarantee [`SignalingChannel`] asks for.
pub struct MemorySignaling {
    outbound: SignalWire,
}

impl MemorySignaling {
    pub fn new(outbound: SignalWire) -> Self {
        MemorySignaling { outbound }
    }
}

impl SignalingChannel for MemorySignaling {
    fn send(&mut self, message: SignalingMessage) -> Result<()> {
        let mut queue = self
            .outbound
            .lock()
            .map_err(|_| Error::ErrTransportFailure("signaling wire poisoned".to_owned()))?;
        queue.push_back(message);
        Ok(())
    }
}

/// Stand-in platform session engine.
///
/// Descriptions are opaque one-liners naming the peer that minted them, and
/// gathering fabricates one host candidate per media line. The driver polls
/// the shared [`GatheredCandidates`] handle and relays its contents through
/// [`peerlink::session::PeerSession::handle_local_candidate`].
pub struct LoopbackMedia {
    name: String,
    media_lines: u16,
    gathered: GatheredCandidates,
    closed: bool,
}

impl LoopbackMedia {
    pub fn new(name: impl Into<String>, media_lines: u16) -> Self {
        LoopbackMedia {
            name: name.into(),
            media_lines,
            gathered: Arc::new(Mutex::new(VecDeque::new())),
            closed: false,
        }
    }

    /// Handle the driver polls to relay gathered candidates.
    pub fn gathered(&self) -> GatheredCandidates {
        self.gathered.clone()
    }
}

impl MediaTransport for LoopbackMedia {
    fn gather_candidates(&mut self) -> Result<()> {
        let mut gathered = self
            .gathered
            .lock()
            .map_err(|_| Error::ErrTransportFailure("candidate queue poisoned".to_owned()))?;
        for index in 0..self.media_lines {
            gathered.push_back(IceCandidate {
                media_line_index: index,
                media_id: Some(format!("m{index}")),
                data: format!(
                    "candidate:{} 1 udp 2130706431 198.51.100.{} 5000 typ host",
                    self.name, index
                ),
            });
        }
        Ok(())
    }

    fn create_offer(&mut self) -> Result<String> {
        Ok(format!(
            "v=0 {} offer ({} media lines)",
            self.name, self.media_lines
        ))
    }

    fn create_answer(&mut self) -> Result<String> {
        Ok(format!(
            "v=0 {} answer ({} media lines)",
            self.name, self.media_lines
        ))
    }

    fn set_local_description(&mut self, description: &SessionDescription) -> Result<()> {
        log::debug!(
            "{}: local description committed ({})",
            self.name,
            description.kind
        );
        Ok(())
    }

    fn set_remote_description(&mut self, description: &SessionDescription) -> Result<()> {
        log::debug!(
            "{}: remote description committed ({})",
            self.name,
            description.kind
        );
        Ok(())
    }

    fn add_candidate(&mut self, candidate: &IceCandidate) -> Result<()> {
        if candidate.media_line_index >= self.media_lines {
            return Err(Error::ErrUnknownMediaLine(candidate.media_line_index));
        }
        log::debug!(
            "{}: paired remote candidate on media line {}",
            self.name,
            candidate.media_line_index
        );
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            log::debug!("{}: media transport closed", self.name);
        }
    }
}

/// Data channel transport that forwards payloads into the peer's inbox.
pub struct PipeTransport {
    name: String,
    peer_inbox: BytePipe,
}

impl PipeTransport {
    pub fn new(name: impl Into<String>, peer_inbox: BytePipe) -> Self {
        PipeTransport {
            name: name.into(),
            peer_inbox,
        }
    }
}

impl DataChannelTransport for PipeTransport {
    fn send(&mut self, data: Bytes) -> Result<()> {
        let mut queue = self
            .peer_inbox
            .lock()
            .map_err(|_| Error::ErrTransportFailure("byte pipe poisoned".to_owned()))?;
        queue.push_back(data);
        Ok(())
    }

    fn close(&mut self) {
        log::debug!("{}: data channel transport closed", self.name);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_memory_signaling_preserves_order() -> Result<()> {
        let wire = signal_wire();
        let mut signaling = MemorySignaling::new(wire.clone());

        signaling.send(SignalingMessage::Offer {
            sdp: "first".to_owned(),
        })?;
        signaling.send(SignalingMessage::Bye)?;

        let drained = drain_signals(&wire)?;
        assert_eq!(
            drained,
            vec![
                SignalingMessage::Offer {
                    sdp: "first".to_owned(),
                },
                SignalingMessage::Bye,
            ]
        );
        assert!(drain_signals(&wire)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_loopback_media_gathers_per_media_line() -> Result<()> {
        let mut media = LoopbackMedia::new("alice", 2);
        let gathered = media.gathered();

        media.gather_candidates()?;
        let candidates = drain_gathered(&gathered)?;
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].media_line_index, 0);
        assert_eq!(candidates[1].media_line_index, 1);

        assert!(media.add_candidate(&candidates[0]).is_ok());
        assert!(matches!(
            media.add_candidate(&IceCandidate {
                media_line_index: 9,
                media_id: None,
                data: "bogus".to_owned(),
            }),
            Err(Error::ErrUnknownMediaLine(9))
        ));

        Ok(())
    }

    #[test]
    fn test_pipe_transport_delivers() -> Result<()> {
        let inbox = byte_pipe();
        let mut pipe = PipeTransport::new("alice", inbox.clone());

        pipe.send(Bytes::from_static(b"hello"))?;
        assert_eq!(drain_pipe(&inbox)?, vec![Bytes::from_static(b"hello")]);

        Ok(())
    }
}
