use std::io::Write;
use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use log::{info, trace};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use peerlink::data_channel::event::DataChannelEvent;
use peerlink::data_channel::init::DataChannelInit;
use peerlink::session::{PeerSession, PeerSessionEvent, SessionConfigBuilder, SessionRole};

use peerlink_demos::{
    BytePipe, GatheredCandidates, LoopbackMedia, MemorySignaling, PipeTransport, SignalWire,
    byte_pipe, drain_gathered, drain_pipe, drain_signals, signal_wire,
};

const CHANNEL_LABEL: &str = "chat";

#[derive(Parser)]
#[command(name = "data-channel-chat")]
#[command(version = "0.1.0")]
#[command(about = "Chat with an in-process peer over a peerlink data channel", long_about = None)]
struct Cli {
    #[arg(short, long)]
    debug: bool,
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
    wire_out: SignalWire,
    inbox: BytePipe,
) -> Endpoint {
    let media = LoopbackMedia::new(name, 1);
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

/// Drains bob's events and auto-replies to every payload.
fn answer_chat(bob: &mut Endpoint) -> Result<()> {
    let mut replies = vec![];
    while let Some(event) = bob.session.poll_event() {
        if let PeerSessionEvent::OnDataChannel(DataChannelEvent::OnMessage(data)) = event {
            let text = String::from_utf8_lossy(&data).to_string();
            info!("bob: heard '{text}'");
            replies.push(format!("I heard '{text}'"));
        }
    }
    for reply in replies {
        if let Some(mut channel) = bob.session.data_channel() {
            channel.send_text(reply)?;
        }
    }
    Ok(())
}

fn print_alice_events(alice: &mut Endpoint) {
    while let Some(event) = alice.session.poll_event() {
        match event {
            PeerSessionEvent::OnDataChannel(DataChannelEvent::OnMessage(data)) => {
                println!("bob> {}", String::from_utf8_lossy(&data));
            }
            PeerSessionEvent::OnSessionStateChangeEvent(state) => {
                info!("alice: session state {state}");
            }
            PeerSessionEvent::OnNegotiationStateChangeEvent(state) => {
                info!("alice: negotiation state {state}");
            }
            event => {
                info!("alice: {event:?}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let (stop_tx, stop_rx) = broadcast::channel::<()>(1);

    info!("Press Ctrl-C to hang up");
    std::thread::spawn(move || {
        let mut stop_tx = Some(stop_tx);
        ctrlc::set_handler(move || {
            if let Some(stop_tx) = stop_tx.take() {
                let _ = stop_tx.send(());
            }
        })
        .expect("Error setting Ctrl-C handler");
    });

    run(stop_rx).await
}

async fn run(mut stop_rx: broadcast::Receiver<()>) -> Result<()> {
    let alice_wire = signal_wire();
    let bob_wire = signal_wire();
    let alice_inbox = byte_pipe();
    let bob_inbox = byte_pipe();

    let mut alice = endpoint(
        "alice",
        SessionRole::Initiator,
        alice_wire,
        alice_inbox.clone(),
    );
    let mut bob = endpoint("bob", SessionRole::Responder, bob_wire, bob_inbox.clone());

    // Negotiate the call and open the chat channel on both sides.
    alice.session.create_data_channel(
        CHANNEL_LABEL,
        DataChannelInit::default(),
        Box::new(PipeTransport::new("alice", bob_inbox.clone())),
    )?;
    alice.session.create_offer()?;
    pump(&mut alice, &mut bob)?;

    bob.session.handle_remote_data_channel(
        CHANNEL_LABEL,
        Box::new(PipeTransport::new("bob", alice_inbox.clone())),
    )?;
    alice.session.handle_channel_opened();
    bob.session.handle_channel_opened();
    print_alice_events(&mut alice);
    while bob.session.poll_event().is_some() {}

    println!("connected; type a message and press enter");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                break;
            }
            line = lines.next_line() => {
                let Some(text) = line? else {
                    break;
                };
                if text.is_empty() {
                    continue;
                }
                if let Some(mut channel) = alice.session.data_channel() {
                    channel.send_text(text)?;
                }
                pump(&mut alice, &mut bob)?;
                answer_chat(&mut bob)?;
                pump(&mut alice, &mut bob)?;
                print_alice_events(&mut alice);
            }
        }
    }

    info!("alice: hanging up");
    alice.session.close();
    pump(&mut alice, &mut bob)?;
    print_alice_events(&mut alice);
    while bob.session.poll_event().is_some() {}

    info!(
        "final states: alice {} / bob {}",
        alice.session.session_state(),
        bob.session.session_state()
    );

    Ok(())
}
