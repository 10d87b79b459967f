use crate::{error::Result, family::WidgetFamily};

/// One-way request to the main application to run its own fetch cycle and
/// repopulate the fallback tier.
///
/// No response is returned: the outcome is observed only by watching the
/// fallback tier's timestamp.
///
/// Implementations must return without waiting for the peer.
pub trait AppSignal: Send + Sync {
    fn request_refresh(&self, family: WidgetFamily) -> Result<()>;
}
