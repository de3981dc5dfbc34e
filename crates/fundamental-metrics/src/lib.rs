pub mod dcf;
pub mod ratios;
pub mod snapshot;

pub use dcf::{value_per_share, DcfParams};
pub use ratios::derive_metrics;
pub use snapshot::build_snapshot;
