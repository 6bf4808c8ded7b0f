/// Integration test for offer/answer between two peerlink sessions
///
/// This test wires an initiator and a responder together through in-memory
/// collaborators and verifies that the two sessions can negotiate, exchange
/// trickled candidates in order, open a data channel and deliver payloads,
/// all without any real I/O.
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;
use bytes::Bytes;

use peerlink::candidate::IceCandidate;
use peerlink::data_channel::event::DataChannelEvent;
use peerlink::data_channel::init::DataChannelInit;
use peerlink::data_channel::state::ChannelReadyState;
use peerlink::description::SessionDescription;
use peerlink::error::Error;
use peerlink::negotiation::NegotiationState;
use peerlink::session::{
    PeerSession, PeerSessionEvent, SessionConfigBuilder, SessionRole, SessionState,
};
use peerlink::signaling::{SignalingChannel, SignalingMessage};
use peerlink::transport::{DataChannelTransport, MediaTransport};

const CHANNEL_LABEL: &str = "test-channel";
const TEST_MESSAGE: &str = "Hello from initiator!";
const ECHO_MESSAGE: &str = "Echo from responder!";

type Outbox = Rc<RefCell<VecDeque<SignalingMessage>>>;
type Inbox = Rc<RefCell<VecDeque<Bytes>>>;

struct MailboxSignaling {
    outbound: Outbox,
}

impl SignalingChannel for MailboxSignaling {
    fn send(&mut self, message: SignalingMessage) -> peerlink::error::Result<()> {
        self.outbound.borrow_mut().push_back(message);
        Ok(())
    }
}

#[derive(Default)]
struct MediaRecords {
    applied: Vec<IceCandidate>,
    local: Vec<String>,
    remote: Vec<String>,
    closed: bool,
}

struct FakeMedia {
    name: &'static str,
    media_lines: u16,
    records: Rc<RefCell<MediaRecords>>,
}

impl MediaTransport for FakeMedia {
    fn gather_candidates(&mut self) -> peerlink::error::Result<()> {
        Ok(())
    }

    fn create_offer(&mut self) -> peerlink::error::Result<String> {
        Ok(format!("v=0 offer from {}", self.name))
    }

    fn create_answer(&mut self) -> peerlink::error::Result<String> {
        Ok(format!("v=0 answer from {}", self.name))
    }

    fn set_local_description(
        &mut self,
        description: &SessionDescription,
    ) -> peerlink::error::Result<()> {
        self.records.borrow_mut().local.push(description.sdp.clone());
        Ok(())
    }

    fn set_remote_description(
        &mut self,
        description: &SessionDescription,
    ) -> peerlink::error::Result<()> {
        self.records
            .borrow_mut()
            .remote
            .push(description.sdp.clone());
        Ok(())
    }

    fn add_candidate(&mut self, candidate: &IceCandidate) -> peerlink::error::Result<()> {
        if candidate.media_line_index >= self.media_lines {
            return Err(Error::ErrUnknownMediaLine(candidate.media_line_index));
        }
        self.records.borrow_mut().applied.push(candidate.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.records.borrow_mut().closed = true;
    }
}

struct PipeTransport {
    peer_inbox: Inbox,
    closed: Rc<RefCell<bool>>,
}

impl DataChannelTransport for PipeTransport {
    fn send(&mut self, data: Bytes) -> peerlink::error::Result<()> {
        self.peer_inbox.borrow_mut().push_back(data);
        Ok(())
    }

    fn close(&mut self) {
        *self.closed.borrow_mut() = true;
    }
}

struct Peer {
    session: PeerSession,
    outbox: Outbox,
    media: Rc<RefCell<MediaRecords>>,
}

fn new_peer(name: &'static str, role: SessionRole) -> Peer {
    let outbox: Outbox = Rc::new(RefCell::new(VecDeque::new()));
    let media = Rc::new(RefCell::new(MediaRecords::default()));
    let session = PeerSession::new(
        SessionConfigBuilder::new(role)
            .with_session_id(name.to_owned())
            .build(),
        Box::new(MailboxSignaling {
            outbound: outbox.clone(),
        }),
        Box::new(FakeMedia {
            name,
            media_lines: 2,
            records: media.clone(),
        }),
    );
    Peer {
        session,
        outbox,
        media,
    }
}

fn candidate(media_line_index: u16, data: &str) -> IceCandidate {
    IceCandidate {
        media_line_index,
        media_id: None,
        data: data.to_owned(),
    }
}

fn drain_events(session: &mut PeerSession) -> Vec<PeerSessionEvent> {
    let mut events = vec![];
    while let Some(event) = session.poll_event() {
        events.push(event);
    }
    events
}

/// Shuttles signaling messages between the two peers until both mailboxes
/// stay empty.
fn pump(a: &mut Peer, b: &mut Peer) -> Result<()> {
    loop {
        let to_b: Vec<SignalingMessage> = a.outbox.borrow_mut().drain(..).collect();
        let to_a: Vec<SignalingMessage> = b.outbox.borrow_mut().drain(..).collect();
        if to_b.is_empty() && to_a.is_empty() {
            return Ok(());
        }
        for message in to_b {
            b.session.handle_signal(message)?;
        }
        for message in to_a {
            a.session.handle_signal(message)?;
        }
    }
}

#[test]
fn test_offer_answer_with_trickled_candidates() -> Result<()> {
    env_logger::builder().is_test(true).try_init().ok();

    let mut a = new_peer("peer-a", SessionRole::Initiator);
    let mut b = new_peer("peer-b", SessionRole::Responder);

    // Initiator opens the exchange; its candidates trickle out afterwards,
    // so signaling order guarantees the offer arrives first.
    a.session.create_offer()?;
    a.session.handle_local_candidate(candidate(0, "a-host"))?;
    a.session.handle_local_candidate(candidate(1, "a-srflx"))?;
    pump(&mut a, &mut b)?;

    // Responder answered within the same pump; its candidates come later.
    b.session.handle_local_candidate(candidate(0, "b-host"))?;
    pump(&mut a, &mut b)?;

    assert_eq!(a.session.negotiation_state(), NegotiationState::Stable);
    assert_eq!(b.session.negotiation_state(), NegotiationState::Stable);
    assert_eq!(a.session.session_state(), SessionState::Connected);
    assert_eq!(b.session.session_state(), SessionState::Connected);

    // Each side committed the other's description.
    assert_eq!(a.media.borrow().remote, vec!["v=0 answer from peer-b"]);
    assert_eq!(b.media.borrow().remote, vec!["v=0 offer from peer-a"]);
    assert_eq!(a.media.borrow().local, vec!["v=0 offer from peer-a"]);
    assert_eq!(b.media.borrow().local, vec!["v=0 answer from peer-b"]);

    // Candidates landed in signaling order on both sides.
    assert_eq!(
        b.media.borrow().applied,
        vec![candidate(0, "a-host"), candidate(1, "a-srflx")]
    );
    assert_eq!(a.media.borrow().applied, vec![candidate(0, "b-host")]);

    let a_events = drain_events(&mut a.session);
    assert!(a_events.contains(&PeerSessionEvent::OnSessionStateChangeEvent(
        SessionState::Connected
    )));
    let b_events = drain_events(&mut b.session);
    assert!(b_events.contains(&PeerSessionEvent::OnSessionStateChangeEvent(
        SessionState::Connected
    )));

    Ok(())
}

#[test]
fn test_candidates_ahead_of_offer_are_buffered_in_order() -> Result<()> {
    env_logger::builder().is_test(true).try_init().ok();

    let mut a = new_peer("peer-a", SessionRole::Initiator);
    let mut b = new_peer("peer-b", SessionRole::Responder);

    // Deliver the initiator's candidates out of band first, before any
    // description reached the responder.
    b.session
        .handle_signal(SignalingMessage::from(candidate(0, "c0")))?;
    b.session
        .handle_signal(SignalingMessage::from(candidate(1, "c1")))?;
    b.session
        .handle_signal(SignalingMessage::from(candidate(0, "c2")))?;
    assert!(b.media.borrow().applied.is_empty());
    assert_eq!(b.session.negotiation_state(), NegotiationState::Idle);

    // The offer arrives and the buffered candidates flush in arrival order.
    a.session.create_offer()?;
    pump(&mut a, &mut b)?;

    assert_eq!(
        b.media.borrow().applied,
        vec![candidate(0, "c0"), candidate(1, "c1"), candidate(0, "c2")]
    );
    assert_eq!(b.session.session_state(), SessionState::Connected);

    // The buffer only ever primes once; new candidates apply immediately.
    b.session
        .handle_signal(SignalingMessage::from(candidate(1, "c3")))?;
    assert_eq!(b.media.borrow().applied.len(), 4);

    Ok(())
}

#[test]
fn test_data_channel_between_sessions() -> Result<()> {
    env_logger::builder().is_test(true).try_init().ok();

    let mut a = new_peer("peer-a", SessionRole::Initiator);
    let mut b = new_peer("peer-b", SessionRole::Responder);

    let a_inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
    let b_inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
    let a_pipe_closed = Rc::new(RefCell::new(false));
    let b_pipe_closed = Rc::new(RefCell::new(false));

    // The initiator opens the channel before negotiating, like the browser
    // API allows; payloads stay queued behind the open notification.
    a.session.create_data_channel(
        CHANNEL_LABEL,
        DataChannelInit::default(),
        Box::new(PipeTransport {
            peer_inbox: b_inbox.clone(),
            closed: a_pipe_closed.clone(),
        }),
    )?;
    a.session.create_offer()?;
    pump(&mut a, &mut b)?;

    // The platform announces the channel on the responder once negotiation
    // settles, then reports both ends open.
    b.session.handle_remote_data_channel(
        CHANNEL_LABEL,
        Box::new(PipeTransport {
            peer_inbox: a_inbox.clone(),
            closed: b_pipe_closed.clone(),
        }),
    )?;
    a.session.handle_channel_opened();
    b.session.handle_channel_opened();

    let mut a_channel = a.session.data_channel().ok_or(Error::ErrChannelNotOpen)?;
    assert_eq!(a_channel.label()?, CHANNEL_LABEL);
    assert_eq!(a_channel.ready_state()?, ChannelReadyState::Open);
    a_channel.send_text(TEST_MESSAGE)?;

    // Shuttle the payload to the responder and let it echo back.
    let inbound: Vec<Bytes> = b_inbox.borrow_mut().drain(..).collect();
    for data in inbound {
        b.session.handle_channel_message(data);
    }
    let mut b_channel = b.session.data_channel().ok_or(Error::ErrChannelNotOpen)?;
    b_channel.send_text(ECHO_MESSAGE)?;
    let inbound: Vec<Bytes> = a_inbox.borrow_mut().drain(..).collect();
    for data in inbound {
        a.session.handle_channel_message(data);
    }

    let b_events = drain_events(&mut b.session);
    assert!(b_events.contains(&PeerSessionEvent::OnDataChannel(DataChannelEvent::OnOpen)));
    assert!(b_events.contains(&PeerSessionEvent::OnDataChannel(
        DataChannelEvent::OnMessage(Bytes::from_static(TEST_MESSAGE.as_bytes()))
    )));
    let a_events = drain_events(&mut a.session);
    assert!(a_events.contains(&PeerSessionEvent::OnDataChannel(
        DataChannelEvent::OnMessage(Bytes::from_static(ECHO_MESSAGE.as_bytes()))
    )));

    Ok(())
}

#[test]
fn test_sends_queue_behind_open() -> Result<()> {
    env_logger::builder().is_test(true).try_init().ok();

    let mut a = new_peer("peer-a", SessionRole::Initiator);
    let b_inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));

    a.session.create_data_channel(
        CHANNEL_LABEL,
        DataChannelInit::default(),
        Box::new(PipeTransport {
            peer_inbox: b_inbox.clone(),
            closed: Rc::new(RefCell::new(false)),
        }),
    )?;

    let mut channel = a.session.data_channel().ok_or(Error::ErrChannelNotOpen)?;
    assert_eq!(channel.ready_state()?, ChannelReadyState::Connecting);
    assert!(matches!(
        channel.send(Bytes::from_static(b"too early")),
        Err(Error::ErrChannelNotOpen)
    ));
    assert!(b_inbox.borrow().is_empty());

    a.session.handle_channel_opened();
    let mut channel = a.session.data_channel().ok_or(Error::ErrChannelNotOpen)?;
    channel.send(Bytes::from_static(b"on time"))?;
    assert_eq!(b_inbox.borrow().len(), 1);

    Ok(())
}
