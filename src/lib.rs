//! LLM Gateway - metered reverse proxy for LLM providers
//!
//! Every caller is identified by the `Authorization` header it presents.
//! Per key, the gateway bounds in-flight requests, rate over a rolling
//! window and cumulative spend, then forwards to the provider selected by
//! `X-LLM-Provider` and accounts the cost reported by the upstream.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
