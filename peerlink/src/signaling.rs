use serde::{Deserialize, Serialize};

use crate::candidate::IceCandidate;
use crate::description::{SdpKind, SessionDescription};
use crate::error::Result;

/// The message vocabulary exchanged between two endpoints while a session
/// is negotiated and torn down.
///
/// Four message types exist on the wire: `offer` and `answer` carry opaque
/// description payloads, `candidate` carries one transport route
/// advertisement, and `bye` announces teardown. The JSON encoding is tagged
/// by a `type` field.
///
/// # Wire Encoding
///
/// ```
/// use peerlink::signaling::SignalingMessage;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let msg = SignalingMessage::Offer {
///     sdp: "v=0...".to_string(),
/// };
/// assert_eq!(
///     serde_json::to_string(&msg)?,
///     r#"{"type":"offer","sdp":"v=0..."}"#
/// );
///
/// let bye: SignalingMessage = serde_json::from_str(r#"{"type":"bye"}"#)?;
/// assert_eq!(bye, SignalingMessage::Bye);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalingMessage {
    /// An offer description opening an exchange.
    Offer { sdp: String },

    /// The answer description completing the exchange.
    Answer { sdp: String },

    /// One trickled transport route advertisement.
    Candidate {
        #[serde(rename = "mediaLineIndex")]
        media_line_index: u16,
        #[serde(rename = "mediaId")]
        media_id: Option<String>,
        data: String,
    },

    /// The sender is tearing the session down. Sent at most once per
    /// session; a receiver does not echo one back.
    Bye,
}

impl SignalingMessage {
    /// Extracts the description carried by an `offer` or `answer` message.
    pub fn description(&self) -> Option<SessionDescription> {
        match self {
            SignalingMessage::Offer { sdp } => Some(SessionDescription::offer(sdp.clone())),
            SignalingMessage::Answer { sdp } => Some(SessionDescription::answer(sdp.clone())),
            _ => None,
        }
    }

    /// The description kind announced by this message, if any.
    pub fn kind(&self) -> Option<SdpKind> {
        match self {
            SignalingMessage::Offer { .. } => Some(SdpKind::Offer),
            SignalingMessage::Answer { .. } => Some(SdpKind::Answer),
            _ => None,
        }
    }
}

impl From<IceCandidate> for SignalingMessage {
    fn from(candidate: IceCandidate) -> Self {
        SignalingMessage::Candidate {
            media_line_index: candidate.media_line_index,
            media_id: candidate.media_id,
            data: candidate.data,
        }
    }
}

/// Outbound half of the signaling conduit between the two endpoints.
///
/// Implementations deliver messages to the remote peer in submission
/// order; the conduit is FIFO per direction but gives no ordering promise
/// across directions. Delivery is fire-and-forget: a failure surfaces as
/// [`Error::ErrTransportFailure`](crate::error::Error::ErrTransportFailure)
/// and is never retried by this crate.
///
/// There is no receiving half to implement. The driver owning the session
/// pumps received messages into
/// [`PeerSession::handle_signal`](crate::session::PeerSession::handle_signal)
/// in receipt order.
pub trait SignalingChannel {
    /// Queues one message for delivery to the peer.
    fn send(&mut self, message: SignalingMessage) -> Result<()>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_signaling_message_json() {
        let tests = vec![
            (
                SignalingMessage::Offer {
                    sdp: "o1".to_owned(),
                },
                r#"{"type":"offer","sdp":"o1"}"#,
            ),
            (
                SignalingMessage::Answer {
                    sdp: "a1".to_owned(),
                },
                r#"{"type":"answer","sdp":"a1"}"#,
            ),
            (
                SignalingMessage::Candidate {
                    media_line_index: 1,
                    media_id: Some("audio".to_owned()),
                    data: "c0".to_owned(),
                },
                r#"{"type":"candidate","mediaLineIndex":1,"mediaId":"audio","data":"c0"}"#,
            ),
            (
                SignalingMessage::Candidate {
                    media_line_index: 0,
                    media_id: None,
                    data: "c1".to_owned(),
                },
                r#"{"type":"candidate","mediaLineIndex":0,"mediaId":null,"data":"c1"}"#,
            ),
            (SignalingMessage::Bye, r#"{"type":"bye"}"#),
        ];

        for (message, expected_string) in tests {
            let result = serde_json::to_string(&message);
            assert!(result.is_ok(), "testCase: marshal err: {result:?}");
            let message_data = result.unwrap();
            assert_eq!(message_data, expected_string, "string is not expected");

            let result = serde_json::from_str::<SignalingMessage>(&message_data);
            assert!(result.is_ok(), "testCase: unmarshal err: {result:?}");
            if let Ok(m) = result {
                assert_eq!(m, message);
            }
        }
    }

    #[test]
    fn test_signaling_message_description() {
        let offer = SignalingMessage::Offer {
            sdp: "o1".to_owned(),
        };
        let desc = offer.description();
        assert!(desc.is_some());
        if let Some(d) = desc {
            assert_eq!(d.kind, SdpKind::Offer);
            assert_eq!(d.sdp, "o1");
        }
        assert_eq!(offer.kind(), Some(SdpKind::Offer));

        assert!(SignalingMessage::Bye.description().is_none());
        assert!(SignalingMessage::Bye.kind().is_none());
    }

    #[test]
    fn test_signaling_message_from_candidate() {
        let candidate = IceCandidate {
            media_line_index: 3,
            media_id: Some("video".to_owned()),
            data: "c3".to_owned(),
        };

        let message = SignalingMessage::from(candidate);
        assert_eq!(
            message,
            SignalingMessage::Candidate {
                media_line_index: 3,
                media_id: Some("video".to_owned()),
                data: "c3".to_owned(),
            }
        );
    }
}
