
pub mod config;
pub mod event;
pub mod state;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use event::PeerSessionEvent;
pub use state::{SessionRole, SessionState};

use std::collections::VecDeque;
use std::time::Instant;

use bytes::Bytes;

use crate::candidate::IceCandidate;
use crate::candidate::buffer::IceCandidateBuffer;
use crate::data_channel::init::DataChannelInit;
use crate::data_channel::{DataChannel, DataChannelController};
use crate::description::SessionDescription;
use crate::error::{Error, Result};
use crate::negotiation::{NegotiationEngine, NegotiationState};
use crate::signaling::{SignalingChannel, SignalingMessage};
use crate::transport::{DataChannelTransport, MediaTransport};

/// PeerSession ties one negotiation exchange, one candidate buffer and at
/// most one data channel together behind a single synchronous object.
///
/// The session owns no sockets and spawns no tasks. It talks to the outside
/// world through the [`SignalingChannel`] and [`MediaTransport`] collaborators
/// handed to [`PeerSession::new`], and reports progress through events the
/// driver drains with [`PeerSession::poll_event`]:
///
/// ```text
/// loop {
///     // 1. feed inbound signaling messages
///     session.handle_signal(message)?;
///
///     // 2. feed platform notifications (candidates, channel callbacks)
///     session.handle_local_candidate(candidate)?;
///
///     // 3. drain whatever the session decided
///     while let Some(event) = session.poll_event() {
///         /* dispatch */
///     }
/// }
/// ```
///
/// Every method runs to completion on the caller's thread; reentrancy is
/// impossible because each call holds `&mut self`.
pub struct PeerSession {
    session_id: String,
    session_state: SessionState,
    engine: NegotiationEngine,
    candidates: IceCandidateBuffer,
    channel: Option<DataChannelController>,
    signaling: Box<dyn SignalingChannel>,
    media: Option<Box<dyn MediaTransport>>,
    events: VecDeque<PeerSessionEvent>,
    negotiation_started_at: Option<Instant>,
    bye_sent: bool,
}

impl PeerSession {
    /// Creates a session from its configuration and collaborators.
    ///
    /// When the configuration carries no session id a random one is drawn so
    /// that log lines from concurrent sessions stay distinguishable.
    pub fn new(
        config: SessionConfig,
        signaling: Box<dyn SignalingChannel>,
        media: Box<dyn MediaTransport>,
    ) -> Self {
        let session_id = if config.session_id.is_empty() {
            format!("{:016x}", rand::random::<u64>())
        } else {
            config.session_id.clone()
        };
        log::info!("session {}: new {} session", session_id, config.role);

        PeerSession {
            session_id,
            session_state: SessionState::default(),
            engine: NegotiationEngine::new(config.role),
            candidates: IceCandidateBuffer::default(),
            channel: None,
            signaling,
            media: Some(media),
            events: VecDeque::new(),
            negotiation_started_at: None,
            bye_sent: false,
        }
    }

    /// Returns the identifier used to tag this session's log output.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the role this session negotiates with.
    pub fn role(&self) -> SessionRole {
        self.engine.role()
    }

    /// Returns the current session state.
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    /// Returns the current negotiation state.
    pub fn negotiation_state(&self) -> NegotiationState {
        self.engine.state()
    }

    /// Returns the committed local description, if any.
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.engine.local_description()
    }

    /// Returns the committed remote description, if any.
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.engine.remote_description()
    }

    /// Opens the exchange: builds an offer, commits it locally, starts
    /// candidate gathering and sends the offer to the peer.
    ///
    /// Only the initiator may call this, and only once per session.
    pub fn create_offer(&mut self) -> Result<SessionDescription> {
        let Some(media) = self.media.as_mut() else {
            return Err(Error::ErrAlreadyClosed);
        };

        let prev = self.engine.state();
        let offer = self.engine.create_offer(media.as_mut())?;
        self.negotiation_started_at = Some(Instant::now());
        self.engine.commit_local(&offer, media.as_mut())?;
        self.sync_negotiation_state(prev);

        self.signaling.send(SignalingMessage::Offer {
            sdp: offer.sdp.clone(),
        })?;
        log::debug!("session {}: offer sent", self.session_id);

        Ok(offer)
    }

    /// Registers a locally created data channel and returns a handle to it.
    ///
    /// The channel starts out connecting; it opens once the platform
    /// transport reports readiness through [`PeerSession::handle_channel_opened`].
    pub fn create_data_channel(
        &mut self,
        label: &str,
        init: DataChannelInit,
        transport: Box<dyn DataChannelTransport>,
    ) -> Result<DataChannel<'_>> {
        if self.session_state == SessionState::Closed {
            return Err(Error::ErrAlreadyClosed);
        }
        if self.engine.role() != SessionRole::Initiator {
            return Err(Error::ErrInvalidRole);
        }
        if self.channel.is_some() {
            return Err(Error::ErrInvalidState(
                "data channel already created".to_owned(),
            ));
        }

        self.channel = Some(DataChannelController::create(label, init, transport));
        Ok(DataChannel { session: self })
    }

    /// Borrowed handle to this session's data channel, once one exists.
    pub fn data_channel(&mut self) -> Option<DataChannel<'_>> {
        if self.channel.is_some() {
            Some(DataChannel { session: self })
        } else {
            None
        }
    }

    /// Feeds one message from the signaling service into the session.
    ///
    /// Descriptions advance the negotiation, candidates are applied or
    /// buffered, and `bye` tears the session down without echoing another
    /// `bye` back. Messages arriving after close are dropped.
    pub fn handle_signal(&mut self, message: SignalingMessage) -> Result<()> {
        if self.session_state == SessionState::Closed {
            log::debug!(
                "session {}: signaling message after close, dropped",
                self.session_id
            );
            return Ok(());
        }

        match message {
            SignalingMessage::Offer { sdp } => {
                self.handle_remote_description(SessionDescription::offer(sdp))
            }
            SignalingMessage::Answer { sdp } => {
                self.handle_remote_description(SessionDescription::answer(sdp))
            }
            SignalingMessage::Candidate {
                media_line_index,
                media_id,
                data,
            } => self.handle_remote_candidate(IceCandidate {
                media_line_index,
                media_id,
                data,
            }),
            SignalingMessage::Bye => {
                log::info!("session {}: bye received", self.session_id);
                self.close_internal(false);
                Ok(())
            }
        }
    }

    /// Relays a candidate the local platform gathered to the peer.
    ///
    /// Candidates produced after close are dropped.
    pub fn handle_local_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        if self.session_state == SessionState::Closed {
            log::debug!(
                "session {}: local candidate after close, dropped",
                self.session_id
            );
            return Ok(());
        }

        log::trace!(
            "session {}: relaying local candidate for media line {}",
            self.session_id,
            candidate.media_line_index
        );
        self.signaling.send(SignalingMessage::from(candidate))
    }

    /// Registers a data channel the peer opened towards us.
    ///
    /// Announcements arriving after close are ignored.
    pub fn handle_remote_data_channel(
        &mut self,
        label: &str,
        transport: Box<dyn DataChannelTransport>,
    ) -> Result<()> {
        if self.session_state == SessionState::Closed {
            log::debug!(
                "session {}: remote data channel after close, ignored",
                self.session_id
            );
            return Ok(());
        }
        if self.channel.is_some() {
            return Err(Error::ErrInvalidState(
                "data channel already created".to_owned(),
            ));
        }

        self.channel = Some(DataChannelController::accept(label, transport));
        Ok(())
    }

    /// Tells the session its channel transport finished connecting.
    pub fn handle_channel_opened(&mut self) {
        let Some(channel) = self.channel.as_mut() else {
            log::debug!(
                "session {}: channel open notification without a channel",
                self.session_id
            );
            return;
        };
        if let Some(event) = channel.on_opened() {
            self.events.push_back(PeerSessionEvent::OnDataChannel(event));
        }
    }

    /// Tells the session the peer closed the channel underneath it.
    pub fn handle_channel_closed(&mut self) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        if let Some(event) = channel.on_closed() {
            self.events.push_back(PeerSessionEvent::OnDataChannel(event));
        }
    }

    /// Delivers one inbound payload from the channel transport.
    pub fn handle_channel_message(&mut self, data: Bytes) {
        let Some(channel) = self.channel.as_mut() else {
            log::debug!(
                "session {}: channel payload without a channel, dropped",
                self.session_id
            );
            return;
        };
        if let Some(event) = channel.on_message(data) {
            self.events.push_back(PeerSessionEvent::OnDataChannel(event));
        }
    }

    /// Returns the next pending event, oldest first.
    pub fn poll_event(&mut self) -> Option<PeerSessionEvent> {
        self.events.pop_front()
    }

    /// Closes the session: the data channel first, then negotiation, then
    /// the platform transport, and finally a single `bye` to the peer.
    ///
    /// Closing an already closed session does nothing.
    pub fn close(&mut self) {
        self.close_internal(true);
    }

    pub(crate) fn channel(&self) -> Option<&DataChannelController> {
        self.channel.as_ref()
    }

    pub(crate) fn send_channel_data(&mut self, data: Bytes) -> Result<()> {
        match self.channel.as_mut() {
            Some(channel) => channel.send(data),
            None => Err(Error::ErrChannelNotOpen),
        }
    }

    pub(crate) fn close_channel(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            for event in channel.close() {
                self.events.push_back(PeerSessionEvent::OnDataChannel(event));
            }
        }
    }

    fn handle_remote_description(&mut self, description: SessionDescription) -> Result<()> {
        let prev = self.engine.state();
        self.engine.apply_remote(description.clone())?;
        if prev == NegotiationState::Idle {
            // the responder's clock starts on the first remote description
            self.negotiation_started_at.get_or_insert_with(Instant::now);
        }
        self.sync_negotiation_state(prev);

        let prev = self.engine.state();
        let Some(media) = self.media.as_mut() else {
            return Err(Error::ErrAlreadyClosed);
        };
        self.engine.commit_remote(&description, media.as_mut())?;

        let flushed = self.candidates.on_remote_description_committed();
        if !flushed.is_empty() {
            log::debug!(
                "session {}: applying {} buffered candidate(s)",
                self.session_id,
                flushed.len()
            );
        }
        for candidate in flushed {
            self.apply_candidate(candidate)?;
        }
        self.sync_negotiation_state(prev);

        if self.engine.state() == NegotiationState::RemoteOfferPending {
            self.answer_remote_offer()?;
        }

        Ok(())
    }

    fn answer_remote_offer(&mut self) -> Result<()> {
        let prev = self.engine.state();
        let Some(media) = self.media.as_mut() else {
            return Err(Error::ErrAlreadyClosed);
        };
        let answer = self.engine.create_answer(media.as_mut())?;
        self.sync_negotiation_state(prev);

        let prev = self.engine.state();
        let Some(media) = self.media.as_mut() else {
            return Err(Error::ErrAlreadyClosed);
        };
        self.engine.commit_local(&answer, media.as_mut())?;
        self.sync_negotiation_state(prev);

        self.signaling.send(SignalingMessage::Answer {
            sdp: answer.sdp.clone(),
        })?;
        log::debug!("session {}: answer sent", self.session_id);

        Ok(())
    }

    fn handle_remote_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        match self.candidates.enqueue(candidate) {
            Some(candidate) => self.apply_candidate(candidate),
            None => {
                log::trace!("session {}: buffered remote candidate", self.session_id);
                Ok(())
            }
        }
    }

    fn apply_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        let Some(media) = self.media.as_mut() else {
            return Err(Error::ErrAlreadyClosed);
        };
        match media.add_candidate(&candidate) {
            Ok(()) => {
                log::trace!(
                    "session {}: applied remote candidate for media line {}",
                    self.session_id,
                    candidate.media_line_index
                );
                Ok(())
            }
            Err(Error::ErrUnknownMediaLine(index)) => {
                log::warn!(
                    "session {}: dropping candidate for unknown media line {index}",
                    self.session_id
                );
                self.events
                    .push_back(PeerSessionEvent::OnCandidateDroppedEvent(candidate));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn sync_negotiation_state(&mut self, prev: NegotiationState) {
        let state = self.engine.state();
        if state == prev {
            return;
        }
        self.events
            .push_back(PeerSessionEvent::OnNegotiationStateChangeEvent(state));

        match state {
            NegotiationState::LocalOfferPending
            | NegotiationState::RemoteOfferPending
            | NegotiationState::LocalAnswerPending
            | NegotiationState::RemoteAnswerPending => {
                self.set_session_state(SessionState::Negotiating);
            }
            NegotiationState::Stable => {
                if let Some(started_at) = self.negotiation_started_at.take() {
                    log::info!(
                        "session {}: setup time {}ms",
                        self.session_id,
                        started_at.elapsed().as_millis()
                    );
                }
                self.set_session_state(SessionState::Connected);
            }
            // close_internal drives the session state itself
            _ => {}
        }
    }

    fn set_session_state(&mut self, next: SessionState) {
        if self.session_state == next {
            return;
        }
        self.session_state = next;
        log::info!("session {}: state changed to {next}", self.session_id);
        self.events
            .push_back(PeerSessionEvent::OnSessionStateChangeEvent(next));
    }

    fn close_internal(&mut self, send_bye: bool) {
        if self.session_state == SessionState::Closed {
            return;
        }
        log::info!("session {}: closing", self.session_id);

        self.close_channel();

        let prev = self.engine.state();
        self.engine.close();
        self.sync_negotiation_state(prev);

        let discarded = self.candidates.discard();
        if discarded > 0 {
            log::debug!(
                "session {}: discarded {discarded} buffered candidate(s)",
                self.session_id
            );
        }

        if let Some(mut media) = self.media.take() {
            media.close();
        }

        if send_bye && !self.bye_sent {
            self.bye_sent = true;
            if let Err(err) = self.signaling.send(SignalingMessage::Bye) {
                log::warn!("session {}: bye delivery failed: {err}", self.session_id);
            }
        }

        self.set_session_state(SessionState::Closed);
    }
}
