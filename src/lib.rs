//! Pitchside - booking and entitlement rules for youth sports clubs
//!
//! Pitchside is the rules engine behind a multi-tenant club platform: it
//! decides who may book, who must pay, and which features a subscription
//! plan unlocks. Persistence, payments, and notifications stay behind trait
//! seams; the evaluators themselves are pure.
//!
//! # Features
//!
//! - **Age/consent policy**: maps a date of birth and a tenant's policy to a
//!   permission outcome (booking agent, payer, visible UI sections)
//! - **Plan entitlements**: static tier table for fast gating plus audited,
//!   storage-backed per-plan overrides
//! - **Booking windows**: time-gated booking with waitlist promotion and a
//!   periodic offer-expiry sweep
//! - **HTTP**: Axum routes and feature-gating middleware
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pitchside::entitlements::{FeatureCatalog, PlanFeatureTable};
//! use pitchside::entitlements::{InMemoryFeatureAuditStore, InMemoryPlanFeatureStore};
//! use pitchside::policy::InMemoryPolicyStore;
//! use pitchside::http::{AppState, router};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     pitchside::init_tracing();
//!
//!     let state = AppState::new(
//!         InMemoryPolicyStore::new(),
//!         InMemoryPlanFeatureStore::new(),
//!         InMemoryFeatureAuditStore::new(),
//!         FeatureCatalog::standard(),
//!         PlanFeatureTable::standard(),
//!     );
//!
//!     let app = router(state);
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod booking;
mod config;
pub mod entitlements;
mod error;
pub mod http;
pub mod jobs;
pub mod policy;
pub mod validation;

// Re-exports for public API
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig, SweepConfig};
pub use error::{PitchsideError, Result};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "pitchside=debug")
/// - `PITCHSIDE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("PITCHSIDE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
