use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::registry::{self, ValidationError};
use crate::routes;

/// What a handler resolves to. An `Err` aborts the remaining handlers for
/// the request and surfaces as a server error.
pub type HandlerResult = eyre::Result<()>;

type Callback = Box<dyn Fn(Event) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Why a notification was not dispatched. Everything except `Handler` is a
/// client-side failure and collapses into one generic 400 response; the
/// variants only exist so logs can tell them apart.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request body has no `data` field")]
    MissingData,
    #[error("`data` field is not a valid JSON object")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("payload has no string `{0}` field")]
    MissingField(&'static str),
    #[error("verification token or event type not accepted")]
    Rejected,
    #[error(transparent)]
    Schema(#[from] ValidationError),
    #[error("handler failed: {0}")]
    Handler(eyre::Report),
}

/// Verifies, classifies, and routes Ko-fi webhook notifications.
///
/// Handlers are registered per [`EventKind`] before serving; requests for a
/// kind with no handlers of its own fall back to the `Global` list. Serving
/// consumes the dispatcher, so the registry is immutable once traffic
/// starts.
pub struct Dispatcher {
    verification_token: String,
    callbacks: HashMap<EventKind, Vec<Callback>>,
}

impl Dispatcher {
    pub fn new(verification_token: impl Into<String>) -> Self {
        Self {
            verification_token: verification_token.into(),
            callbacks: HashMap::new(),
        }
    }

    /// Appends `handler` to the list for `kind`. Lists keep registration
    /// order and allow duplicates; dispatch invokes them sequentially.
    pub fn on<F, Fut>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.callbacks
            .entry(kind)
            .or_default()
            .push(Box::new(move |event| Box::pin(handler(event))));
    }

    /// Runs one decoded form body through the whole pipeline: extract the
    /// `data` field, parse it, verify token and type, construct the typed
    /// event, and invoke the selected handler list in order. Each handler
    /// receives its own clone of the event and is awaited before the next
    /// one starts.
    #[tracing::instrument(skip(self, form))]
    pub async fn dispatch(&self, form: &HashMap<String, String>) -> Result<(), DispatchError> {
        let data = form.get("data").ok_or(DispatchError::MissingData)?;
        let payload: serde_json::Value = serde_json::from_str(data)?;

        let raw_type = payload
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(DispatchError::MissingField("type"))?;
        let token = payload
            .get("verification_token")
            .and_then(serde_json::Value::as_str)
            .ok_or(DispatchError::MissingField("verification_token"))?;

        // One rejection point for both checks; the response must not reveal
        // whether the token or the type was the problem.
        let kind = match EventKind::from_wire(raw_type) {
            Some(kind) if token == self.verification_token => kind,
            _ => {
                warn!(raw_type, "rejected webhook notification");
                return Err(DispatchError::Rejected);
            }
        };

        let event = registry::construct(kind, &payload)?;

        let specific = self.callbacks.get(&kind).map(Vec::as_slice).unwrap_or_default();
        let callbacks: &[Callback] = if specific.is_empty() {
            self.callbacks
                .get(&EventKind::Global)
                .map(Vec::as_slice)
                .unwrap_or_default()
        } else {
            specific
        };

        for callback in callbacks {
            callback(event.clone()).await.map_err(DispatchError::Handler)?;
        }
        info!(
            kind = kind.registry_key(),
            handlers = callbacks.len(),
            "webhook notification dispatched"
        );
        Ok(())
    }

    /// Turns the dispatcher into a router for embedding into a larger axum
    /// application. The webhook endpoint is `POST /`.
    pub fn into_router(self) -> Router {
        routes::router().with_state(Arc::new(self))
    }

    /// Binds a listener and serves the webhook endpoint until CTRL+C.
    pub async fn serve(self, addr: SocketAddr) -> eyre::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::debug!("listening on {}", listener.local_addr()?);

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => info!("received CTRL+C, shutting down"),
                    Err(error) => warn!(%error, "failed to install CTRL+C handler"),
                }
            })
            .await?;
        Ok(())
    }
}
