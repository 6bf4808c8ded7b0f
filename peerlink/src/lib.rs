//! # Peerlink - Sans-I/O Peer Session Negotiation
//!
//! A small engine for driving one peer-to-peer session from first offer to
//! teardown: description exchange, trickled candidate handling and a single
//! message-oriented data channel, all in a **sans-I/O architecture**. The
//! crate never touches the network and never spawns a task; it decides, and
//! the embedding application performs.
//!
//! ## What is Sans-I/O?
//!
//! Sans-I/O (without I/O) separates protocol logic from I/O operations.
//! Instead of the library performing reads and writes directly, **you** feed
//! it inbound data and carry out its outputs. This gives you:
//!
//! - **Runtime Independence**: works with tokio, threads, or a plain loop
//! - **Full Control**: you own sockets, scheduling and backpressure
//! - **Testability**: every flow in this crate is tested without a network
//!
//! ## Quick Start
//!
//! ```
//! use peerlink::candidate::IceCandidate;
//! use peerlink::description::SessionDescription;
//! use peerlink::error::Result;
//! use peerlink::session::{PeerSession, PeerSessionEvent, SessionConfigBuilder, SessionRole};
//! use peerlink::signaling::{SignalingChannel, SignalingMessage};
//! use peerlink::transport::MediaTransport;
//!
//! // Collaborators are supplied by the embedding application. These two are
//! // the smallest possible stand-ins.
//! struct Signaling;
//! impl SignalingChannel for Signaling {
//!     fn send(&mut self, _message: SignalingMessage) -> Result<()> {
//!         // hand the message to the wire here
//!         Ok(())
//!     }
//! }
//!
//! struct Media;
//! impl MediaTransport for Media {
//!     fn gather_candidates(&mut self) -> Result<()> { Ok(()) }
//!     fn create_offer(&mut self) -> Result<String> { Ok("v=0 ...".to_string()) }
//!     fn create_answer(&mut self) -> Result<String> { Ok("v=0 ...".to_string()) }
//!     fn set_local_description(&mut self, _: &SessionDescription) -> Result<()> { Ok(()) }
//!     fn set_remote_description(&mut self, _: &SessionDescription) -> Result<()> { Ok(()) }
//!     fn add_candidate(&mut self, _: &IceCandidate) -> Result<()> { Ok(()) }
//!     fn close(&mut self) {}
//! }
//!
//! # fn main() -> Result<()> {
//! // 1. Create a session for the side that opens the exchange
//! let config = SessionConfigBuilder::new(SessionRole::Initiator).build();
//! let mut session = PeerSession::new(config, Box::new(Signaling), Box::new(Media));
//!
//! // 2. Produce the offer; it goes out over the signaling channel
//! session.create_offer()?;
//!
//! // 3. Feed everything the peer sends back into the session
//! session.handle_signal(SignalingMessage::Answer { sdp: "v=0 ...".to_string() })?;
//!
//! // 4. Drain events to observe progress
//! while let Some(event) = session.poll_event() {
//!     if let PeerSessionEvent::OnSessionStateChangeEvent(state) = event {
//!         println!("session is now {state}");
//!     }
//! }
//!
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## The Driver Loop
//!
//! A [`session::PeerSession`] is driven entirely through `handle_*` inputs
//! and [`session::PeerSession::poll_event`] outputs:
//!
//! - `handle_signal` takes each [`signaling::SignalingMessage`] the peer
//!   sent; descriptions advance negotiation, candidates are applied or
//!   buffered until the matching description commits, and `bye` tears the
//!   session down.
//! - `handle_local_candidate` relays what the local gatherer produced.
//! - `handle_channel_opened` / `handle_channel_closed` /
//!   `handle_channel_message` forward data channel transport callbacks.
//! - `poll_event` returns what happened, oldest first, so the application
//!   can react after every input.
//!
//! Calls never block and never call back into the application; reentrancy
//! is ruled out by `&mut self`.
//!
//! ## Collaborators
//!
//! Two traits mark the I/O boundary. [`signaling::SignalingChannel`] is the
//! out-of-band rendezvous path (delivery must keep per-direction order).
//! [`transport::MediaTransport`] is the platform session engine that mints
//! and applies descriptions and gathers candidates. A data channel adds a
//! [`transport::DataChannelTransport`] for its payload bytes.
//!
//! Runnable two-peer wirings live in the `peerlink-demos` member crate:
//! `cargo run -p peerlink-demos --example loopback-call` and
//! `cargo run -p peerlink-demos --example data-channel-chat`.

#![warn(rust_2018_idioms)]

pub mod candidate;
pub mod data_channel;
pub mod description;
pub mod error;
pub mod negotiation;
pub mod session;
pub mod signaling;
pub mod transport;
