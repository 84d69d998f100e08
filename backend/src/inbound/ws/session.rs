//! Per-connection WebSocket handler.
//!
//! Keeps framing, heartbeats, and the subscription registry at the edge
//! while deferring credential verification to the injected context builder
//! and event delivery to the bus. The public contract pings every 5s and
//! considers a connection idle after 10s without client traffic. Tests
//! shorten these intervals to speed up feedback; adjust the constants below
//! if SLAs change so clients and intermediaries stay aligned.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use futures_util::future::select_all;
use tokio::time;
use tracing::{debug, warn};

use crate::domain::{
    AuthContextBuilder, ContentEvent, Error, ErrorCode, EventBus, Subscription,
};
use crate::inbound::ws::messages::{ClientMessage, ServerMessage};

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_session(
    context_builder: AuthContextBuilder,
    bus: EventBus,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(context_builder, bus).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Unauthorized(Error),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

/// Which select branch fired; resolved before any handler mutates state so
/// the subscription registry is not borrowed across branches.
enum Turn {
    Heartbeat,
    Frame(Option<Result<Message, ProtocolError>>),
    Event(Option<ContentEvent>),
}

struct WsSession {
    context_builder: AuthContextBuilder,
    bus: EventBus,
    initialised: bool,
    subscriptions: Vec<Subscription>,
}

impl WsSession {
    fn new(context_builder: AuthContextBuilder, bus: EventBus) -> Self {
        Self {
            context_builder,
            bus,
            initialised: false,
            subscriptions: Vec::new(),
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let turn = tokio::select! {
                _ = heartbeat.tick() => Turn::Heartbeat,
                message = stream.recv() => Turn::Frame(message),
                event = next_event(&mut self.subscriptions) => Turn::Event(event),
            };

            let result = match turn {
                Turn::Heartbeat => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat)
                        .await
                }
                Turn::Frame(message) => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Turn::Event(event) => self.forward_event(&mut session, event).await,
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let frame = match serde_json::from_str::<ClientMessage>(text) {
            Ok(frame) => frame,
            Err(error) => {
                warn!(error = %error, "rejected malformed subscription frame");
                return Err(SessionError::InvalidPayload);
            }
        };

        match frame {
            ClientMessage::ConnectionInit { token } => {
                self.handle_connection_init(session, token).await
            }
            ClientMessage::Subscribe { topic } => {
                if !self.initialised {
                    return self
                        .send_error(
                            session,
                            ErrorCode::Unauthorized,
                            "connection is not initialised",
                        )
                        .await;
                }
                self.subscriptions.push(self.bus.subscribe(topic));
                Ok(())
            }
        }
    }

    /// Verify the optional credential and acknowledge the connection.
    ///
    /// A presented but unverifiable token is a hard failure for the whole
    /// connection, mirroring the per-request contract.
    async fn handle_connection_init(
        &mut self,
        session: &mut Session,
        token: Option<String>,
    ) -> Result<(), SessionError> {
        if self.initialised {
            return self
                .send_error(
                    session,
                    ErrorCode::InvalidRequest,
                    "connection already initialised",
                )
                .await;
        }

        let header = token.map(|token| format!("Bearer {token}"));
        let context = self
            .context_builder
            .build(header.as_deref())
            .await
            .map_err(SessionError::Unauthorized)?;
        if let Some(caller) = context.user() {
            debug!(subject = %caller.id(), "subscription connection authenticated");
        }

        self.initialised = true;
        self.send_json(session, &ServerMessage::ConnectionAck)
            .await
            .map_err(SessionError::Network)
    }

    async fn forward_event(
        &self,
        session: &mut Session,
        event: Option<ContentEvent>,
    ) -> Result<(), SessionError> {
        let Some(event) = event else {
            return Err(SessionError::StreamClosed);
        };
        self.send_json(session, &ServerMessage::Event { event })
            .await
            .map_err(SessionError::Network)
    }

    async fn send_error(
        &self,
        session: &mut Session,
        code: ErrorCode,
        message: &str,
    ) -> Result<(), SessionError> {
        let frame = ServerMessage::Error {
            code,
            message: message.to_owned(),
        };
        self.send_json(session, &frame)
            .await
            .map_err(SessionError::Network)
    }

    async fn send_json<T: serde::Serialize>(
        &self,
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                // In debug builds fail fast so schema drift is fixed; in release we log and keep the connection alive.
                if cfg!(debug_assertions) {
                    panic!("content events must serialize: {error}");
                } else {
                    warn!(error = %error, "failed to serialize subscription frame");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("subscription heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "subscription protocol error");
            }
            SessionError::Unauthorized(error) => {
                warn!(error = %error, "subscription credential rejected; closing connection");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "subscription send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::Unauthorized(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid credentials".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "failed to close subscription session");
            }
        }
    }
}

/// Wait for the next event across every open subscription.
///
/// Pending forever while no subscription exists, so the select loop stays
/// driven by heartbeats and client frames alone.
async fn next_event(subscriptions: &mut [Subscription]) -> Option<ContentEvent> {
    if subscriptions.is_empty() {
        return std::future::pending().await;
    }
    let waiters = subscriptions
        .iter_mut()
        .map(|subscription| Box::pin(subscription.next()));
    let (event, _, _) = select_all(waiters).await;
    event
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
