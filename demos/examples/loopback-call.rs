use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use log::{info, trace};

use peerlink::data_channel::event::DataChannelEvent;
use peerlink::data_channel::init::DataChannelInit;
use peerlink::session::{PeerSession, PeerSessionEvent, SessionConfigBuilder, SessionRole};

use peerlink_demos::{
    BytePipe, GatheredCandidates, LoopbackMedia, MemorySignaling, PipeTransport, SignalWire,
    byte_pipe, drain_gathered, drain_pipe, drain_signals, signal_wire,
};

const CHANNEL_LABEL: &str = "loopback";

#[derive(Parser)]
#[command(name = "loopback-call")]
#[command(version = "0.1.0")]
#[command(about = "Two peerlink sessions calling each other inside one process", long_about = None)]
struct Cli {
    #[arg(short, long)]
    debug: bool,
    #[arg(long, default_value_t = 2)]
    media_lines: u16,
    #[arg(long, default_value_t = 3)]
    pings: u32,
    #[arg(long, default_value_t = format!("INFO"))]
    log_level: String,
}

struct Endpoint {
    name: &'static str,
    session: PeerSession,
    wire_out: SignalWire,
    gathered: GatheredCandidates,
    inbox: BytePipe,
}

fn endpoint(
    name: &'static str,
    role: SessionRole,
    media_lines: u16,
    wire_out: SignalWire,
    inbox: BytePipe,
) -> Endpoint {
    let media = LoopbackMedia::new(name, media_lines);
    let gathered = media.gathered();
    let session = PeerSession::new(
        SessionConfigBuilder::new(role)
            .with_session_id(name.to_owned())
            .build(),
        Box::new(MemorySignaling::new(wire_out.clone())),
        Box::new(media),
    );
    Endpoint {
        name,
        session,
        wire_out,
        gathered,
        inbox,
    }
}

/// Plays the network: relays gathered candidates, shuttles signaling
/// messages and channel payloads until everything settles.
fn pump(a: &mut Endpoint, b: &mut Endpoint) -> Result<()> {
    loop {
        let mut moved = false;

        for candidate in drain_gathered(&a.gathered)? {
            a.session.handle_local_candidate(candidate)?;
            moved = true;
        }
        for candidate in drain_gathered(&b.gathered)? {
            b.session.handle_local_candidate(candidate)?;
            moved = true;
        }

        for message in drain_signals(&a.wire_out)? {
            trace!(
                "{} -> {}: {}",
                a.name,
                b.name,
                serde_json::to_string(&message)?
            );
            b.session.handle_signal(message)?;
            moved = true;
        }
        for message in drain_signals(&b.wire_out)? {
            trace!(
                "{} -> {}: {}",
                b.name,
                a.name,
                serde_json::to_string(&message)?
            );
            a.session.handle_signal(message)?;
            moved = true;
        }

        for data in drain_pipe(&a.inbox)? {
            a.session.handle_channel_message(data);
            moved = true;
        }
        for data in drain_pipe(&b.inbox)? {
            b.session.handle_channel_message(data);
            moved = true;
        }

        if !moved {
            return Ok(());
        }
    }
}

fn dispatch(endpoint: &mut Endpoint) {
    while let Some(event) = endpoint.session.poll_event() {
        match event {
            PeerSessionEvent::OnSessionStateChangeEvent(state) => {
                info!("{}: session state {}", endpoint.name, state);
            }
            PeerSessionEvent::OnNegotiationStateChangeEvent(state) => {
                info!("{}: negotiation state {}", endpoint.name, state);
            }
            PeerSessionEvent::OnDataChannel(DataChannelEvent::OnMessage(data)) => {
                info!(
                    "{}: received '{}'",
                    endpoint.name,
                    String::from_utf8_lossy(&data)
                );
            }
            PeerSessionEvent::OnDataChannel(event) => {
                info!("{}: data channel {:?}", endpoint.name, event);
            }
            PeerSessionEvent::OnCandidateDroppedEvent(candidate) => {
                info!(
                    "{}: dropped candidate for media line {}",
                    endpoint.name, candidate.media_line_index
                );
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::from_str(&cli.log_level)?
    };
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%H:%M:%S.%6f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log_level)
        .init();

    run(cli.media_lines, cli.pings)
}

fn run(media_lines: u16, pings: u32) -> Result<()> {
    let alice_wire = signal_wire();
    let bob_wire = signal_wire();
    let alice_inbox = byte_pipe();
    let bob_inbox = byte_pipe();

    let mut alice = endpoint(
        "alice",
        SessionRole::Initiator,
        media_lines,
        alice_wire,
        alice_inbox.clone(),
    );
    let mut bob = endpoint(
        "bob",
        SessionRole::Responder,
        media_lines,
        bob_wire,
        bob_inbox.clone(),
    );

    // Alice opens a channel first, browser style, then starts the exchange.
    alice.session.create_data_channel(
        CHANNEL_LABEL,
        DataChannelInit::default(),
        Box::new(PipeTransport::new("alice", bob_inbox.clone())),
    )?;
    let offer = alice.session.create_offer()?;
    info!("alice: created offer '{}'", offer.sdp);

    pump(&mut alice, &mut bob)?;
    dispatch(&mut alice);
    dispatch(&mut bob);

    // The platform announces the channel on bob's side, then both channel
    // transports report open.
    bob.session.handle_remote_data_channel(
        CHANNEL_LABEL,
        Box::new(PipeTransport::new("bob", alice_inbox.clone())),
    )?;
    alice.session.handle_channel_opened();
    bob.session.handle_channel_opened();
    dispatch(&mut alice);
    dispatch(&mut bob);

    // Ping from alice, echo from bob.
    for i in 1..=pings {
        if let Some(mut channel) = alice.session.data_channel() {
            channel.send_text(format!("ping {i}"))?;
        }
    }
    pump(&mut alice, &mut bob)?;

    let mut received = vec![];
    while let Some(event) = bob.session.poll_event() {
        if let PeerSessionEvent::OnDataChannel(DataChannelEvent::OnMessage(data)) = event {
            info!("bob: received '{}'", String::from_utf8_lossy(&data));
            received.push(data);
        }
    }
    for data in received {
        if let Some(mut channel) = bob.session.data_channel() {
            channel.send_text(format!("echo {}", String::from_utf8_lossy(&data)))?;
        }
    }
    pump(&mut alice, &mut bob)?;
    dispatch(&mut alice);

    // Hang up; the bye cascades to bob.
    info!("alice: hanging up");
    alice.session.close();
    pump(&mut alice, &mut bob)?;
    dispatch(&mut alice);
    dispatch(&mut bob);

    info!(
        "final states: alice {} / bob {}",
        alice.session.session_state(),
        bob.session.session_state()
    );

    Ok(())
}
