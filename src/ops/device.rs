use std::sync::Mutex;

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::OperationError;

use super::sha256::BLOCK_BYTES;
use super::{Operation, OperationOutput, Payload};

/// Hashing through a device that tolerates one caller at a time.
///
/// The device is modelled by a mutex owned by this operation. The registry
/// holds a single instance per process, so every executor contends on the same
/// lock, and only the digest itself runs under it.
pub struct DeviceSha256 {
    device: Mutex<()>,
}

impl DeviceSha256 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            device: Mutex::new(()),
        }
    }
}

impl Default for DeviceSha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for DeviceSha256 {
    fn name(&self) -> &'static str {
        "device_sha256"
    }

    fn description(&self) -> &'static str {
        "SHA-256 serialized through a single exclusive device"
    }

    fn run(
        &self,
        _shard: usize,
        iterations: u64,
        _payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        if iterations == 0 {
            return Ok(OperationOutput::completed(0));
        }

        let mut rng = rand::thread_rng();
        let mut block = [0u8; BLOCK_BYTES];
        let mut last_digest = None;
        for _ in 0..iterations {
            rng.fill_bytes(&mut block);
            let _device = self
                .device
                .lock()
                .map_err(|_poisoned| OperationError::DeviceLockPoisoned)?;
            last_digest = Some(Sha256::digest(block));
        }

        let mut output = OperationOutput::completed(iterations);
        if let Some(digest) = last_digest {
            output
                .details
                .insert("last_digest".to_owned(), format!("{:x}", digest).into());
        }
        Ok(output)
    }
}
