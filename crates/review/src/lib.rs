pub mod services;
pub mod traits;
pub mod transitions;

pub use services::{DetailPanel, PollHandle, ReviewController, ReviewState};
pub use traits::SignalSource;

#[cfg(test)]
mod test_support;
