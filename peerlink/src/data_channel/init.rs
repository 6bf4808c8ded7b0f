use serde::{Deserialize, Serialize};

/// Reliability and protocol options fixed when a channel is created.
///
/// These never change over a channel's lifetime; reconfiguring means
/// closing the channel and creating a new one. The options are passed
/// through to the transport that backs the channel, this crate does not
/// interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChannelInit {
    /// Whether payloads are delivered in submission order.
    pub ordered: bool,

    /// Upper bound on delivery attempts for unreliable channels.
    pub max_retransmits: Option<u16>,

    /// Upper bound, in milliseconds, on the time an unreliable channel
    /// keeps retrying a payload.
    pub max_packet_life_time: Option<u16>,

    /// Application subprotocol name carried to the peer.
    pub protocol: String,
}

impl Default for DataChannelInit {
    fn default() -> Self {
        DataChannelInit {
            ordered: true,
            max_retransmits: None,
            max_packet_life_time: None,
            protocol: String::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_data_channel_init_default() {
        let init = DataChannelInit::default();
        assert!(init.ordered);
        assert!(init.max_retransmits.is_none());
        assert!(init.max_packet_life_time.is_none());
        assert_eq!(init.protocol, "");
    }

    #[test]
    fn test_data_channel_init_json() {
        let init = DataChannelInit {
            ordered: false,
            max_retransmits: Some(3),
            max_packet_life_time: None,
            protocol: "chat".to_owned(),
        };

        let result = serde_json::to_string(&init);
        assert!(result.is_ok(), "testCase: marshal err: {result:?}");
        let init_data = result.unwrap();
        assert_eq!(
            init_data,
            r#"{"ordered":false,"maxRetransmits":3,"maxPacketLifeTime":null,"protocol":"chat"}"#
        );

        let result = serde_json::from_str::<DataChannelInit>(&init_data);
        assert!(result.is_ok(), "testCase: unmarshal err: {result:?}");
        if let Ok(parsed) = result {
            assert_eq!(parsed, init);
        }
    }
}
