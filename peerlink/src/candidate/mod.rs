pub mod buffer;

use serde::{Deserialize, Serialize};

/// A transport route advertisement for one media line.
///
/// Candidates trickle in while negotiation is still in flight: each one is
/// produced by the local gatherer, relayed over the signaling channel and
/// applied on the remote side, independently of the offer/answer exchange.
/// The payload in [`IceCandidate::data`] is opaque to this crate. A
/// candidate is transient and consumed exactly once; it is never part of a
/// session description.
///
/// # Examples
///
/// ```
/// use peerlink::candidate::IceCandidate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let candidate = IceCandidate {
///     media_line_index: 0,
///     media_id: Some("0".to_string()),
///     data: "candidate:1 1 UDP 2122252543 192.168.1.100 49152 typ host".to_string(),
/// };
///
/// let json = serde_json::to_string(&candidate)?;
/// let received: IceCandidate = serde_json::from_str(&json)?;
/// assert_eq!(received.media_line_index, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    /// Index of the media line the candidate belongs to.
    pub media_line_index: u16,

    /// Identifier of the media line, when the producing platform labels
    /// lines by name as well as by index.
    pub media_id: Option<String>,

    /// The opaque candidate payload.
    pub data: String,
}
