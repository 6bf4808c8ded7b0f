use std::fmt;

use crate::session::config::UNSPECIFIED_STR;

/// The lifecycle state of a data channel.
///
/// The state advances monotonically:
///
/// ```text
/// Connecting → Open → Closing → Closed
/// ```
///
/// There is no way back. A channel that has closed never reopens; a new
/// channel must be created instead. An abrupt transport teardown may skip
/// `Closing` and land on `Closed` directly.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelReadyState {
    /// State not specified. This should not occur in normal operation.
    Unspecified = 0,

    /// The underlying transport is being established. Sends are rejected
    /// in this state; nothing is queued on the channel's behalf.
    #[default]
    Connecting,

    /// The transport is ready in both directions. This is the only state
    /// in which sends are accepted.
    Open,

    /// Teardown has started and no further sends are accepted.
    Closing,

    /// The channel is fully closed and its transport handle released.
    Closed,
}

const CHANNEL_READY_STATE_CONNECTING_STR: &str = "connecting";
const CHANNEL_READY_STATE_OPEN_STR: &str = "open";
const CHANNEL_READY_STATE_CLOSING_STR: &str = "closing";
const CHANNEL_READY_STATE_CLOSED_STR: &str = "closed";

impl From<&str> for ChannelReadyState {
    fn from(raw: &str) -> Self {
        match raw {
            CHANNEL_READY_STATE_CONNECTING_STR => ChannelReadyState::Connecting,
            CHANNEL_READY_STATE_OPEN_STR => ChannelReadyState::Open,
            CHANNEL_READY_STATE_CLOSING_STR => ChannelReadyState::Closing,
            CHANNEL_READY_STATE_CLOSED_STR => ChannelReadyState::Closed,
            _ => ChannelReadyState::Unspecified,
        }
    }
}

impl fmt::Display for ChannelReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ChannelReadyState::Connecting => write!(f, "{CHANNEL_READY_STATE_CONNECTING_STR}"),
            ChannelReadyState::Open => write!(f, "{CHANNEL_READY_STATE_OPEN_STR}"),
            ChannelReadyState::Closing => write!(f, "{CHANNEL_READY_STATE_CLOSING_STR}"),
            ChannelReadyState::Closed => write!(f, "{CHANNEL_READY_STATE_CLOSED_STR}"),
            _ => write!(f, "{UNSPECIFIED_STR}"),
        }
    }
}

impl From<u8> for ChannelReadyState {
    fn from(v: u8) -> Self {
        match v {
            1 => ChannelReadyState::Connecting,
            2 => ChannelReadyState::Open,
            3 => ChannelReadyState::Closing,
            4 => ChannelReadyState::Closed,
            _ => ChannelReadyState::Unspecified,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_channel_ready_state() {
        let tests = vec![
            ("Unspecified", ChannelReadyState::Unspecified),
            ("connecting", ChannelReadyState::Connecting),
            ("open", ChannelReadyState::Open),
            ("closing", ChannelReadyState::Closing),
            ("closed", ChannelReadyState::Closed),
        ];

        for (state_string, expected_state) in tests {
            assert_eq!(ChannelReadyState::from(state_string), expected_state);
        }
    }

    #[test]
    fn test_channel_ready_state_string() {
        let tests = vec![
            (ChannelReadyState::Unspecified, "Unspecified"),
            (ChannelReadyState::Connecting, "connecting"),
            (ChannelReadyState::Open, "open"),
            (ChannelReadyState::Closing, "closing"),
            (ChannelReadyState::Closed, "closed"),
        ];

        for (state, expected_string) in tests {
            assert_eq!(state.to_string(), expected_string);
        }
    }

    #[test]
    fn test_channel_ready_state_from_u8() {
        let tests = vec![
            (0u8, ChannelReadyState::Unspecified),
            (1, ChannelReadyState::Connecting),
            (2, ChannelReadyState::Open),
            (3, ChannelReadyState::Closing),
            (4, ChannelReadyState::Closed),
            (5, ChannelReadyState::Unspecified),
        ];

        for (value, expected_state) in tests {
            assert_eq!(ChannelReadyState::from(value), expected_state);
        }
    }
}
