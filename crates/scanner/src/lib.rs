//! Scan Orchestration - Detection polling for Framescan
//!
//! The `ScanController` drives the sample -> analyze -> publish
//! pipeline, either as a one-shot scan or on a recurring timer, and
//! owns the `Idle` / `ScanningOnce` / `PollingActive` state machine.

mod controller;

pub use controller::*;
