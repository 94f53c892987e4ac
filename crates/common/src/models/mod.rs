pub mod review;
pub mod signal;

pub use review::{ActionAck, ActionPayload, Filter, ListParams};
pub use signal::{Side, Signal, SignalId, SignalStatus};
