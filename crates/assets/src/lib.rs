//! 原版資源擷取與進度回報。 / Vanilla asset extraction with progress reporting.

pub mod progress;
pub mod vanilla;

pub use progress::{Progress, ProgressSnapshot, ProgressState};
pub use vanilla::{AssetsError, VanillaAssets};
