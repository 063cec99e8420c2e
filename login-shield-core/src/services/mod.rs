//! Services layered over the repository: the merging attempt store, the
//! windowed tracker, and the request-time blocking gate.

pub mod gate;
pub mod store;
pub mod tracker;

pub use gate::{BlockingGate, GateRequest, Verdict};
pub use store::AttemptStore;
pub use tracker::AttemptTracker;
