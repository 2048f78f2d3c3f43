//! Observability hooks for tool, request, and agent phases.
//!
//! ```rust
//! use fobserve::{MetricsObservabilityHooks, SafeRequestHooks, TracingObservabilityHooks};
//!
//! let _request_hooks = SafeRequestHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeAgentHooks, SafeRequestHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeAgentHooks, SafeRequestHooks, SafeToolHooks,
        TracingObservabilityHooks,
    };
}
