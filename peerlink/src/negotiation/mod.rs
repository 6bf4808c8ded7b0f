pub mod state;

pub use state::NegotiationState;

use state::{StateChangeOp, check_next_negotiation_state};

use crate::description::{SdpKind, SessionDescription};
use crate::error::{Error, Result};
use crate::session::state::SessionRole;
use crate::transport::MediaTransport;

/// Drives one offer/answer exchange between two endpoints.
///
/// The engine owns the negotiation state machine and the description
/// bookkeeping, nothing else: descriptions are produced and applied by the
/// [`MediaTransport`] the caller lends to each operation, and relaying them
/// to the peer is the caller's concern. Descriptions move through two
/// stages, mirroring how they travel:
///
/// - **pending**: created locally (or received from the peer) but not yet
///   handed to the platform;
/// - **committed**: applied to the platform exactly once, never replaced.
///
/// A commit must match the pending description it completes; anything else
/// is rejected as stale. The moment the *remote* description commits is
/// significant to callers: buffered remote candidates become applicable
/// exactly then, and never earlier.
///
/// Violations surface as errors and leave the engine unchanged. There is
/// no rollback: a second offer, a replayed description or a glare offer is
/// refused, and recovery policy stays with the caller.
pub struct NegotiationEngine {
    role: SessionRole,
    state: NegotiationState,

    pending_local: Option<SessionDescription>,
    pending_remote: Option<SessionDescription>,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,

    last_offer: String,
    last_answer: String,
}

impl NegotiationEngine {
    pub fn new(role: SessionRole) -> Self {
        NegotiationEngine {
            role,
            state: NegotiationState::default(),
            pending_local: None,
            pending_remote: None,
            local_description: None,
            remote_description: None,
            last_offer: String::new(),
            last_answer: String::new(),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// The committed local description, once there is one.
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    /// The committed remote description, once there is one.
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    /// Produces the offer opening the exchange and starts candidate
    /// gathering.
    ///
    /// Initiator only, and only from `Idle`: one exchange per session, so
    /// an offer after `Stable` is refused as stale rather than starting a
    /// renegotiation.
    pub fn create_offer(
        &mut self,
        transport: &mut dyn MediaTransport,
    ) -> Result<SessionDescription> {
        if self.role != SessionRole::Initiator {
            return Err(Error::ErrInvalidRole);
        }
        let next = check_next_negotiation_state(
            self.state,
            NegotiationState::LocalOfferPending,
            StateChangeOp::SetLocal,
            SdpKind::Offer,
        )?;

        let sdp = transport.create_offer()?;
        transport.gather_candidates()?;

        let offer = SessionDescription::offer(sdp);
        self.last_offer = offer.sdp.clone();
        self.pending_local = Some(offer.clone());
        self.set_state(next);
        Ok(offer)
    }

    /// Accepts a description received from the peer, making it the pending
    /// remote description.
    ///
    /// The description is only staged here; it reaches the platform when
    /// [`NegotiationEngine::commit_remote`] runs. A kind that does not fit
    /// the current state is rejected, as is any description once the
    /// exchange holds a remote one already.
    pub fn apply_remote(&mut self, description: SessionDescription) -> Result<()> {
        let target = match description.kind {
            SdpKind::Offer => {
                if self.role == SessionRole::Initiator && self.state == NegotiationState::Idle {
                    // an initiator never answers
                    return Err(Error::ErrInvalidRole);
                }
                NegotiationState::RemoteOfferPending
            }
            SdpKind::Answer => NegotiationState::RemoteAnswerPending,
            SdpKind::Unspecified => return Err(Error::ErrUnexpectedDescriptionKind),
        };
        let next = check_next_negotiation_state(
            self.state,
            target,
            StateChangeOp::SetRemote,
            description.kind,
        )?;

        self.pending_remote = Some(description);
        self.set_state(next);
        Ok(())
    }

    /// Produces the answer for the committed remote offer and starts
    /// candidate gathering.
    ///
    /// Responder only. The remote offer must already be committed; the
    /// platform answers what it has applied, not what is merely pending.
    pub fn create_answer(
        &mut self,
        transport: &mut dyn MediaTransport,
    ) -> Result<SessionDescription> {
        if self.role != SessionRole::Responder {
            return Err(Error::ErrInvalidRole);
        }
        let next = check_next_negotiation_state(
            self.state,
            NegotiationState::LocalAnswerPending,
            StateChangeOp::SetLocal,
            SdpKind::Answer,
        )?;
        if self.remote_description.is_none() {
            return Err(Error::ErrOutOfOrderCommit);
        }

        let sdp = transport.create_answer()?;
        transport.gather_candidates()?;

        let answer = SessionDescription::answer(sdp);
        self.last_answer = answer.sdp.clone();
        self.pending_local = Some(answer.clone());
        self.set_state(next);
        Ok(answer)
    }

    /// Commits a locally created description, applying it to the platform.
    ///
    /// The description must be the pending local one. A local offer may be
    /// committed while the remote answer is still uncommitted, in either
    /// order with respect to [`NegotiationEngine::apply_remote`]; a local
    /// answer completes the exchange and requires the remote offer to be
    /// committed first.
    pub fn commit_local(
        &mut self,
        description: &SessionDescription,
        transport: &mut dyn MediaTransport,
    ) -> Result<()> {
        if self.state == NegotiationState::Closed {
            return Err(Error::ErrAlreadyClosed);
        }
        match description.kind {
            SdpKind::Offer => {
                if !matches!(
                    self.state,
                    NegotiationState::LocalOfferPending | NegotiationState::RemoteAnswerPending
                ) {
                    return Err(Error::ErrInvalidState(format!(
                        "local offer commit in {}",
                        self.state
                    )));
                }
                if description.sdp != self.last_offer {
                    return Err(Error::ErrStaleDescription);
                }
                if self.local_description.is_some() {
                    return Err(Error::ErrOutOfOrderCommit);
                }

                transport.set_local_description(description)?;
                self.local_description = Some(description.clone());
                self.pending_local = None;
                Ok(())
            }
            SdpKind::Answer => {
                match self.state {
                    NegotiationState::LocalAnswerPending => {}
                    NegotiationState::Stable => {
                        let repeated = self
                            .local_description
                            .as_ref()
                            .is_some_and(|d| d.sdp == description.sdp);
                        return Err(if repeated {
                            Error::ErrOutOfOrderCommit
                        } else {
                            Error::ErrStaleDescription
                        });
                    }
                    _ => {
                        return Err(Error::ErrInvalidState(format!(
                            "local answer commit in {}",
                            self.state
                        )));
                    }
                }
                if description.sdp != self.last_answer {
                    return Err(Error::ErrStaleDescription);
                }
                let next = check_next_negotiation_state(
                    self.state,
                    NegotiationState::Stable,
                    StateChangeOp::SetLocal,
                    SdpKind::Answer,
                )?;

                transport.set_local_description(description)?;
                self.local_description = Some(description.clone());
                self.pending_local = None;
                self.set_state(next);
                Ok(())
            }
            SdpKind::Unspecified => Err(Error::ErrUnexpectedDescriptionKind),
        }
    }

    /// Commits the pending remote description, applying it to the platform.
    ///
    /// On success the exchange holds a committed remote description, which
    /// is the caller's cue to release any candidates buffered for it. A
    /// remote answer completes the exchange and requires the local offer
    /// to be committed first.
    pub fn commit_remote(
        &mut self,
        description: &SessionDescription,
        transport: &mut dyn MediaTransport,
    ) -> Result<()> {
        if self.state == NegotiationState::Closed {
            return Err(Error::ErrAlreadyClosed);
        }
        match description.kind {
            SdpKind::Offer => {
                if self.state != NegotiationState::RemoteOfferPending {
                    return Err(Error::ErrInvalidState(format!(
                        "remote offer commit in {}",
                        self.state
                    )));
                }
                if self.remote_description.is_some() {
                    return Err(Error::ErrOutOfOrderCommit);
                }
                match &self.pending_remote {
                    Some(pending) if pending.sdp == description.sdp => {}
                    _ => return Err(Error::ErrStaleDescription),
                }

                transport.set_remote_description(description)?;
                self.remote_description = Some(description.clone());
                self.pending_remote = None;
                Ok(())
            }
            SdpKind::Answer => {
                match self.state {
                    NegotiationState::RemoteAnswerPending => {}
                    NegotiationState::Stable => {
                        let repeated = self
                            .remote_description
                            .as_ref()
                            .is_some_and(|d| d.sdp == description.sdp);
                        return Err(if repeated {
                            Error::ErrOutOfOrderCommit
                        } else {
                            Error::ErrStaleDescription
                        });
                    }
                    _ => {
                        return Err(Error::ErrInvalidState(format!(
                            "remote answer commit in {}",
                            self.state
                        )));
                    }
                }
                match &self.pending_remote {
                    Some(pending) if pending.sdp == description.sdp => {}
                    _ => return Err(Error::ErrStaleDescription),
                }
                if self.local_description.is_none() {
                    return Err(Error::ErrOutOfOrderCommit);
                }
                let next = check_next_negotiation_state(
                    self.state,
                    NegotiationState::Stable,
                    StateChangeOp::SetRemote,
                    SdpKind::Answer,
                )?;

                transport.set_remote_description(description)?;
                self.remote_description = Some(description.clone());
                self.pending_remote = None;
                self.set_state(next);
                Ok(())
            }
            SdpKind::Unspecified => Err(Error::ErrUnexpectedDescriptionKind),
        }
    }

    /// Ends negotiation from any state. Idempotent; pending descriptions
    /// are dropped, committed ones stay readable.
    pub fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.pending_local = None;
        self.pending_remote = None;
        self.set_state(NegotiationState::Closed);
    }

    fn set_state(&mut self, next: NegotiationState) {
        if self.state != next {
            self.state = next;
            log::info!("negotiation state changed to {next}");
        }
    }
}
