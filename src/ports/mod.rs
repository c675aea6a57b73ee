//! Ports - Interfaces for optional external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the gateway and the outside world. Adapters implement these ports.
//! Every port has a no-op adapter, selected when the real backend is not
//! configured or cannot be constructed.
//!
//! - `LimitStore` - per-key quota overrides in an external key-value store
//! - `AlertNotifier` - credit alert delivery to a webhook sink
//! - `RequestTracer` - span creation around the request lifecycle

mod alert_notifier;
mod limit_store;
mod request_tracer;

pub use alert_notifier::{AlertNotifier, NotifyError};
pub use limit_store::{LimitOverride, LimitStore, LimitStoreError};
pub use request_tracer::{with_span, RequestTracer};
