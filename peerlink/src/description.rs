use std::fmt;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::session::config::UNSPECIFIED_STR;

/// Describes the kind of a session description in the offer/answer exchange.
///
/// The initiating peer produces an **Offer** describing its view of the
/// session; the responding peer replies with exactly one **Answer**. No
/// provisional answers and no rollbacks exist in this model: a kind that
/// does not fit the current negotiation state is rejected, never replayed.
///
/// # Examples
///
/// ```
/// use peerlink::description::SdpKind;
///
/// let kind = SdpKind::Offer;
/// assert_eq!(kind.to_string(), "offer");
///
/// let parsed: SdpKind = "answer".into();
/// assert_eq!(parsed, SdpKind::Answer);
/// ```
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum SdpKind {
    /// Kind not specified. Descriptions of this kind are rejected by the
    /// negotiation engine; the variant only absorbs unknown input.
    #[default]
    Unspecified = 0,

    /// The description MUST be treated as an offer opening an exchange.
    #[serde(rename = "offer")]
    Offer,

    /// The description MUST be treated as the final answer completing an
    /// exchange.
    #[serde(rename = "answer")]
    Answer,
}

const SDP_KIND_OFFER_STR: &str = "offer";
const SDP_KIND_ANSWER_STR: &str = "answer";

impl From<&str> for SdpKind {
    fn from(raw: &str) -> Self {
        match raw {
            SDP_KIND_OFFER_STR => SdpKind::Offer,
            SDP_KIND_ANSWER_STR => SdpKind::Answer,
            _ => SdpKind::Unspecified,
        }
    }
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SdpKind::Offer => write!(f, "{SDP_KIND_OFFER_STR}"),
            SdpKind::Answer => write!(f, "{SDP_KIND_ANSWER_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

/// A session description produced or consumed during negotiation.
///
/// The payload is opaque to this crate: it is produced by the media
/// transport on one side and applied by the media transport on the other,
/// and is relayed verbatim over the signaling channel in between. The
/// negotiation engine only inspects [`SessionDescription::kind`] and uses
/// the payload for identity comparison when a commit is validated.
///
/// # Signaling Exchange via JSON
///
/// ```
/// use peerlink::description::{SdpKind, SessionDescription};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let offer = SessionDescription::offer("v=0...".to_string());
/// let json = serde_json::to_string(&offer)?;
///
/// let received: SessionDescription = serde_json::from_str(&json)?;
/// assert_eq!(received.kind, SdpKind::Offer);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescription {
    /// The kind of this description (offer or answer).
    #[serde(rename = "type")]
    pub kind: SdpKind,

    /// The opaque description payload.
    pub sdp: String,
}

impl Display for SessionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "kind: {}, sdp:\n{}",
            self.kind,
            self.sdp.replace("\r\n", "\n")
        )
    }
}

impl SessionDescription {
    /// Creates an offer description from an opaque payload.
    pub fn offer(sdp: String) -> Self {
        SessionDescription {
            kind: SdpKind::Offer,
            sdp,
        }
    }

    /// Creates an answer description from an opaque payload.
    pub fn answer(sdp: String) -> Self {
        SessionDescription {
            kind: SdpKind::Answer,
            sdp,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_sdp_kind() {
        let tests = vec![
            ("Unspecified", SdpKind::Unspecified),
            ("offer", SdpKind::Offer),
            ("answer", SdpKind::Answer),
        ];

        for (kind_string, expected_kind) in tests {
            assert_eq!(SdpKind::from(kind_string), expected_kind);
        }
    }

    #[test]
    fn test_sdp_kind_string() {
        let tests = vec![
            (SdpKind::Unspecified, "Unspecified"),
            (SdpKind::Offer, "offer"),
            (SdpKind::Answer, "answer"),
        ];

        for (kind, expected_string) in tests {
            assert_eq!(kind.to_string(), expected_string);
        }
    }

    #[test]
    fn test_session_description_json() {
        let tests = vec![
            (
                SessionDescription {
                    kind: SdpKind::Offer,
                    sdp: "sdp".to_owned(),
                },
                r#"{"type":"offer","sdp":"sdp"}"#,
            ),
            (
                SessionDescription {
                    kind: SdpKind::Answer,
                    sdp: "sdp".to_owned(),
                },
                r#"{"type":"answer","sdp":"sdp"}"#,
            ),
            (
                SessionDescription {
                    kind: SdpKind::Unspecified,
                    sdp: "sdp".to_owned(),
                },
                r#"{"type":"Unspecified","sdp":"sdp"}"#,
            ),
        ];

        for (desc, expected_string) in tests {
            let result = serde_json::to_string(&desc);
            assert!(result.is_ok(), "testCase: marshal err: {result:?}");
            let desc_data = result.unwrap();
            assert_eq!(desc_data, expected_string, "string is not expected");

            let result = serde_json::from_str::<SessionDescription>(&desc_data);
            assert!(result.is_ok(), "testCase: unmarshal err: {result:?}");
            if let Ok(sd) = result {
                assert!(sd.sdp == desc.sdp && sd.kind == desc.kind);
            }
        }
    }

    #[test]
    fn test_session_description_constructors() {
        let offer = SessionDescription::offer("o1".to_owned());
        assert_eq!(offer.kind, SdpKind::Offer);
        assert_eq!(offer.sdp, "o1");

        let answer = SessionDescription::answer("a1".to_owned());
        assert_eq!(answer.kind, SdpKind::Answer);
        assert_eq!(answer.sdp, "a1");
    }
}
