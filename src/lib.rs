// Wire model for upstream update messages
pub mod update;

// Canonical aggregated building state
pub mod snapshot;

// Derived statistics over a snapshot
pub mod metrics;

// Aggregated view engine (update reducer + publication)
pub mod state;

// Upstream push-channel integration
pub mod stream;

// Node -> coordinate table for path rendering
pub mod layout;

// WebSocket subscription management
pub mod subscription;

// HTTP and WebSocket APIs
pub mod api;

// Configuration
pub mod config;
