//! Named units of synthetic work and the registry that resolves them.
mod builtins;
mod device;
mod registry;
mod sha256;
mod sleep;
mod traits;


pub use device::DeviceSha256;
pub use registry::OperationRegistry;
pub use sha256::Sha256Cpu;
pub use sleep::SleepUs;
pub use traits::{Operation, OperationOutput, Payload};

/// Operation used when neither the config nor the request names one.
pub const DEFAULT_OPERATION: &str = "sha256_cpu";
