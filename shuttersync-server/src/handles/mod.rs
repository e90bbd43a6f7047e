mod accessory_handle;
mod notification_handle;

pub use accessory_handle::*;
pub use notification_handle::*;
