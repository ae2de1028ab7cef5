pub mod broadcaster;
pub mod registry;
pub mod sink;
pub mod stream;
pub mod text_sync;

pub use broadcaster::{BroadcastReport, Broadcaster};
pub use registry::ConnectionRegistry;
pub use sink::{DeliveryError, DeliveryOutcome};
pub use stream::StreamSettings;
pub use text_sync::{TextSync, TEXT_SYNC_CHANNEL};
