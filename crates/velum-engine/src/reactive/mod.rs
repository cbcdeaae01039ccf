//! Typed publish/subscribe channels for lifecycle events.
//!
//! Caches publish disposal requests and listen for shutdown here, so GPU and
//! audio backends never hold references to the caches themselves.

pub mod data;
pub mod reactable;

pub use data::{DisposeSoundData, DisposeTextureData, ShutDownData};
pub use reactable::{Reactable, Reactor, Subscription};
