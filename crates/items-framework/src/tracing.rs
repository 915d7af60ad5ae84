//! # Tracing Setup
//!
//! Stores and resolvers log with structured fields (`model`, `resource`, `action`, `id`,
//! `total`), so a single request can be followed from the service down to the store:
//!
//! ```text
//! INFO get_items{resource="Order" action=index}: Resolving list
//! DEBUG Paginate model="Order" query=Query { .. } page=PageRequest { page: 1, per_page: 10 }
//! DEBUG Paginated model="Order" total=3
//! ```
//!
//! Verbosity comes from `RUST_LOG`:
//! - `RUST_LOG=info` - resource lookups, store start/shutdown, mutations
//! - `RUST_LOG=debug` - every store request with its query
//! - `RUST_LOG=items_framework=debug,items_sample=info` - per crate

/// Initializes the global `tracing` subscriber.
///
/// Compact format without module targets; spans show inline (`get_items:...`). Calling it
/// twice is harmless, the second call leaves the first subscriber in place.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
