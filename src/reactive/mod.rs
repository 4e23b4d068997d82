//! Change notification — a typed synchronous emitter and the store events
//! delivered through it.

pub mod emitter;
pub mod event;

pub use emitter::{EventEmitter, SubscriptionId};
pub use event::StoreEvent;
