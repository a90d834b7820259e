use std::path::PathBuf;
use std::sync::Arc;

use super::{DeviceSha256, Operation, Sha256Cpu, SleepUs};

pub(super) fn builtins(hash_output: Option<PathBuf>) -> Vec<Arc<dyn Operation>> {
    vec![
        Arc::new(Sha256Cpu::new(hash_output)),
        Arc::new(SleepUs),
        Arc::new(DeviceSha256::new()),
    ]
}
