//! beacon-client - Live Signal Coordinator runtime
//!
//! This crate is the runtime glue between the platform's callback-driven
//! primitives and the pure domain logic in `beacon-core`. It coordinates the
//! signals of a single foreground client session:
//!
//! - the permission gate drives the location permission state machine
//!   against the platform permission provider and publishes distinct state
//!   transitions on a watch channel;
//! - the location stream adapts the provider's callback registration into a
//!   cancellable, deduplicated channel of fixes that only runs while the
//!   permission is granted;
//! - the pending event store is a durable single-slot inbox surviving
//!   process restarts, written by notification dispatch and drained at most
//!   once by deep-link resolution.
//!
//! # Runtime Requirements
//!
//! Stream activation spawns a pump task and therefore requires a running
//! tokio runtime. The gate and the stores work from any async context.
//!
//! # Modules
//!
//! - [`provider`]: traits abstracting the platform permission/location
//!   providers and the alert/navigation sinks
//! - [`gate`]: permission acquisition and state-change publication
//! - [`stream`]: callback-to-channel location stream with guaranteed
//!   deregistration
//! - [`store`]: durable single-slot pending event store
//! - [`dispatch`]: inbound push handling
//! - [`resolver`]: drain-once deep-link resolution on process attach
//! - [`coordinator`]: session-scoped wiring of the above
//! - [`config`]: TOML configuration loading

pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod gate;
pub mod provider;
pub mod resolver;
pub mod store;
pub mod stream;

pub use config::{ConfigError, CoordinatorConfig};
pub use coordinator::{Providers, SignalCoordinator};
pub use dispatch::{DispatchError, DispatchOutcome, NotificationDispatcher};
pub use gate::{GateError, PermissionGate};
pub use provider::{
    AlertSink, EventAlert, FixSink, LocationProvider, NavigationSink, PermissionKind,
    PermissionProvider, PermissionProviderError, PermissionResponse, RegistrationError,
    RegistrationHandle,
};
pub use resolver::{DeepLinkResolver, NavigationTarget};
pub use store::{PendingEventStore, StoreError};
pub use stream::{ActivateError, FixStream, LocationStream};
