mod accessory;
mod command_dispatcher;
mod device_client;
mod event_bus;
mod reconciler;
mod status_cache;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use accessory::*;
pub use command_dispatcher::*;
pub use device_client::*;
pub use event_bus::*;
pub use reconciler::*;
pub use status_cache::*;
