// ==========================================
// Fiber-splice billing - storage layer
// ==========================================
// External storage collaborator: persisted batches plus read-only
// tariff configuration.
// ==========================================

pub mod billing_repo;
pub mod billing_repo_impl;

pub use billing_repo::BillingRepository;
pub use billing_repo_impl::BillingRepositoryImpl;
