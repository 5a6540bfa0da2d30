//! HTTP boundary for leakscout: a single scan endpoint over the core
//! pipeline, plus a liveness probe.

pub mod api;
