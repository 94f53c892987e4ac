pub mod detail_panel;
pub mod poller;
pub mod review_controller;

pub use detail_panel::DetailPanel;
pub use poller::PollHandle;
pub use review_controller::{ReviewController, ReviewState};
