//! Connection bootstrap.
//!
//! One call per frame: open the channel, wait for the host to confirm it,
//! fetch the context once and build the matching facade.

use std::sync::{Arc, Mutex, PoisonError};

use frameport_channel::events::{context, lifecycle};
use frameport_channel::{ChannelError, Connection, RequestOptions, Responder};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::context::Context;
use crate::error::{Result, SdkError};
use crate::extension::{extension_factory, Extension};
use crate::options::InitOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeOutcome {
    Connected,
    TimedOut,
}

type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<HandshakeOutcome>>>>;

/// Connect to the host and build the extension facade it asks for.
///
/// Fails with [`SdkError::HandshakeTimeout`] when the connection timeout
/// elapses first, and with [`SdkError::ContextUnavailable`] when the context
/// fetch fails. Facade construction errors are returned as they are. No retry
/// is attempted.
pub async fn init(connection: Arc<dyn Connection>, options: InitOptions) -> Result<Extension> {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let slot: OutcomeSlot = Arc::new(Mutex::new(Some(outcome_tx)));

    register_outcome(
        connection.as_ref(),
        lifecycle::CONNECTED,
        &slot,
        HandshakeOutcome::Connected,
    );
    register_outcome(
        connection.as_ref(),
        lifecycle::CONNECTION_TIMEOUT,
        &slot,
        HandshakeOutcome::TimedOut,
    );
    // The handlers own the slot from here on; if the transport drops them
    // unfired, the receiver below observes a closed channel.
    drop(slot);

    debug!(options = ?options, "opening channel");
    connection.init(&options.connection_config());

    match outcome_rx.await {
        Ok(HandshakeOutcome::Connected) => debug!("connected"),
        Ok(HandshakeOutcome::TimedOut) => {
            debug!("connection timed out");
            return Err(SdkError::HandshakeTimeout);
        }
        Err(_) => return Err(SdkError::Channel(ChannelError::Disconnected)),
    }

    // The context fetch must not race a request timeout of its own.
    let payload = connection
        .request(context::GET, None, RequestOptions::no_timeout())
        .await
        .map_err(|err| {
            debug!(error = %err, "context fetch failed");
            SdkError::ContextUnavailable
        })?;

    let context = Context::from_value(payload)?;
    debug!(category = %context.category, read_only = context.read_only, "context received");
    extension_factory(&context, connection, &options)
}

fn register_outcome(
    connection: &dyn Connection,
    event: &str,
    slot: &OutcomeSlot,
    outcome: HandshakeOutcome,
) {
    let slot = Arc::clone(slot);
    connection.on(
        event,
        Arc::new(move |_: Value, _: Responder| {
            let sender = slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            match sender {
                Some(sender) => {
                    let _ = sender.send(outcome);
                }
                None => debug!(?outcome, "handshake already settled; ignoring"),
            }
        }),
    );
}
