//! Receive, verify, and dispatch Ko-fi webhook notifications.
//!
//! A [`Dispatcher`] holds the shared verification token and an ordered list
//! of handlers per [`EventKind`]. Incoming notifications are checked against
//! the token, classified into one of the known event shapes, validated, and
//! routed to the matching handlers — or to the `Global` list when no
//! specific handler is registered.
//!
//! ```no_run
//! use kofi_webhook::{Dispatcher, Event, EventKind};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let mut dispatcher = Dispatcher::new("my-verification-token");
//!     dispatcher.on(EventKind::Donation, |event| async move {
//!         if let Event::Donation(donation) = event {
//!             println!("{} sent {} {}", donation.from_name, donation.amount, donation.currency);
//!         }
//!         Ok(())
//!     });
//!     dispatcher.serve(([127, 0, 0, 1], 8000).into()).await
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod dispatch;
pub mod events;
pub mod registry;
pub mod routes;

pub use crate::config::Config;
pub use crate::dispatch::{DispatchError, Dispatcher, HandlerResult};
pub use crate::events::{
    Donation, Event, EventKind, GlobalEvent, Shipping, ShopItem, ShopOrder, Subscription,
};
pub use crate::registry::ValidationError;

pub type SharedDispatcher = Arc<Dispatcher>;
