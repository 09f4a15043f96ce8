//! Test harness: deterministic session fixtures shared by the integration
//! tests.

pub mod session;

pub use session::{sample_document, FailingStore, ManualTime, TestSession};
