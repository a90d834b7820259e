use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::OperationError;

use super::{Operation, OperationOutput, Payload};

/// Size of the random block hashed per iteration.
pub(super) const BLOCK_BYTES: usize = 1024;
/// Digest bytes buffered before anything reaches the sink.
const FLUSH_THRESHOLD: usize = 256 * 1024;
/// 64 hex characters plus the newline delimiter.
const DIGEST_LINE_BYTES: u64 = 65;

/// CPU-bound hashing: one fresh random block per iteration, hex digest
/// appended to a sink as one line.
///
/// With an output directory, shard `n` writes `hashdb-<n>.bin`, truncating
/// whatever the previous request left there. The directory therefore holds at
/// most one file per shard index.
pub struct Sha256Cpu {
    output_dir: Option<PathBuf>,
}

impl Sha256Cpu {
    #[must_use]
    pub const fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }
}

pub(super) fn digest_path(dir: &Path, shard: usize) -> PathBuf {
    dir.join(format!("hashdb-{}.bin", shard))
}

impl Operation for Sha256Cpu {
    fn name(&self) -> &'static str {
        "sha256_cpu"
    }

    fn description(&self) -> &'static str {
        "SHA-256 of a fresh 1 KiB random block per iteration"
    }

    fn run(
        &self,
        shard: usize,
        iterations: u64,
        _payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        if iterations == 0 {
            return Ok(OperationOutput::completed(0));
        }

        let bytes_written = match self.output_dir.as_deref() {
            Some(dir) => {
                let path = digest_path(dir, shard);
                let file = File::create(&path).map_err(|source| OperationError::Io {
                    context: "create digest file",
                    source,
                })?;
                hash_blocks(iterations, file)
            }
            None => hash_blocks(iterations, std::io::sink()),
        }
        .map_err(|source| OperationError::Io {
            context: "write digests",
            source,
        })?;

        let mut output = OperationOutput::completed(iterations);
        output
            .details
            .insert("bytes_written".to_owned(), bytes_written.into());
        Ok(output)
    }
}

pub(super) fn hash_blocks<W: Write>(iterations: u64, sink: W) -> std::io::Result<u64> {
    let mut writer = BufWriter::with_capacity(FLUSH_THRESHOLD, sink);
    let mut rng = rand::thread_rng();
    let mut block = [0u8; BLOCK_BYTES];
    let mut written = 0u64;
    for _ in 0..iterations {
        rng.fill_bytes(&mut block);
        let digest = Sha256::digest(block);
        writeln!(writer, "{:x}", digest)?;
        written = written.saturating_add(DIGEST_LINE_BYTES);
    }
    writer.flush()?;
    Ok(written)
}
