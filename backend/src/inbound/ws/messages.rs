//! Wire-level message envelopes for the subscription transport.
//!
//! Clients drive the connection with `connection_init` followed by any
//! number of `subscribe` messages; the server answers with an
//! acknowledgement, error frames, and one `event` frame per published
//! payload.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentEvent, ErrorCode, Topic};

/// Inbound frame sent by the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open the logical connection, optionally presenting a bearer token.
    ConnectionInit {
        /// Signed bearer token; absent for anonymous subscribers.
        #[serde(default)]
        token: Option<String>,
    },
    /// Subscribe to one topic; repeatable.
    Subscribe {
        /// Topic wire name (`postAdded`, `postUpdated`, `commentAdded`).
        topic: Topic,
    },
}

/// Outbound frame sent by the server.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// `connection_init` was accepted.
    ConnectionAck,
    /// A published content event, forwarded as-is.
    Event {
        /// The event envelope (`event` discriminator plus `payload`).
        #[serde(flatten)]
        event: ContentEvent,
    },
    /// A recoverable protocol error; the connection stays open.
    Error {
        /// Stable machine-readable code.
        code: ErrorCode,
        /// Human-readable description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, PostEvent, PostId, Title, UserId};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn connection_init_parses_with_and_without_token() {
        let with: ClientMessage =
            serde_json::from_value(json!({ "type": "connection_init", "token": "abc.def" }))
                .expect("frame parses");
        assert!(matches!(with, ClientMessage::ConnectionInit { token: Some(t) } if t == "abc.def"));

        let without: ClientMessage =
            serde_json::from_value(json!({ "type": "connection_init" })).expect("frame parses");
        assert!(matches!(
            without,
            ClientMessage::ConnectionInit { token: None }
        ));
    }

    #[rstest]
    #[case("postAdded", Topic::PostAdded)]
    #[case("postUpdated", Topic::PostUpdated)]
    #[case("commentAdded", Topic::CommentAdded)]
    fn subscribe_parses_topic_wire_names(#[case] wire: &str, #[case] expected: Topic) {
        let frame: ClientMessage =
            serde_json::from_value(json!({ "type": "subscribe", "topic": wire }))
                .expect("frame parses");
        assert!(matches!(frame, ClientMessage::Subscribe { topic } if topic == expected));
    }

    #[rstest]
    fn event_frames_flatten_the_content_envelope() {
        let title = Title::new("Hello").expect("valid title");
        let post = Post::new(PostId::random(), title, UserId::random());
        let frame = ServerMessage::Event {
            event: ContentEvent::PostAdded(PostEvent::from(&post)),
        };

        let value = serde_json::to_value(&frame).expect("frame serializes");
        assert_eq!(value["type"], json!("event"));
        assert_eq!(value["event"], json!("postAdded"));
        assert_eq!(value["payload"]["title"], json!("Hello"));
    }

    #[rstest]
    fn error_frames_carry_code_and_message() {
        let frame = ServerMessage::Error {
            code: ErrorCode::InvalidRequest,
            message: "connection already initialised".to_owned(),
        };
        let value = serde_json::to_value(&frame).expect("frame serializes");
        assert_eq!(value["type"], json!("error"));
        assert_eq!(value["code"], json!("invalid_request"));
    }
}
