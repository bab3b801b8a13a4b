//! Client-side move reconciler: turns a server's `gameStateUpdate` into an
//! ordered `FeedbackEvent` plan and plays it back through a single-threaded
//! cooperative queue, with a state-diff fallback for updates that omit
//! move metadata.

pub mod diff;
pub mod overlay;
pub mod plan;
pub mod queue;

pub use overlay::Overlay;
pub use plan::{build_plan, FeedbackEvent};
pub use queue::{FeedbackQueue, FeedbackSink};

