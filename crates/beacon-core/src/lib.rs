//! beacon-core - Live Signal Coordinator domain logic
//!
//! This crate holds the pure domain logic for the beacon client's signal
//! coordination layer: the location fix value type with consecutive-duplicate
//! suppression, the location permission state machine, stream request
//! validation, and pending event reference parsing.
//!
//! Nothing in this crate performs I/O or touches an async runtime. The
//! runtime glue (provider bridging, durable storage, dispatch) lives in
//! `beacon-client`, which consumes these types.
//!
//! # Modules
//!
//! - [`fix`]: `LocationFix` value type and the [`fix::DuplicateFilter`] that
//!   suppresses consecutive bit-identical fixes
//! - [`permission`]: location permission lifecycle state machine with an
//!   explicit transition table
//! - [`request`]: `StreamRequest` configuration and its validation bounds
//! - [`pending`]: `PendingEventRef` and push payload parsing

pub mod fix;
pub mod pending;
pub mod permission;
pub mod request;

pub use fix::{DuplicateFilter, LocationFix};
pub use pending::PendingEventRef;
pub use permission::{PermissionError, PermissionMachine, PermissionState};
pub use request::{Precision, RequestValidationError, StreamRequest};
