use std::time::Duration;

use serde_json::Value;

use crate::error::OperationError;

use super::{Operation, OperationOutput, Payload};

/// Pause per iteration when the payload does not set `micros`.
const DEFAULT_MICROS: u64 = 1_000;

/// Simulated device latency: sleeps `payload.micros` per iteration.
pub struct SleepUs;

impl SleepUs {
    fn micros(payload: &Payload) -> Result<u64, OperationError> {
        let invalid = || OperationError::InvalidPayload {
            operation: "sleep_us",
            field: "micros",
            reason: "expected a non-negative number",
        };
        match payload.get("micros") {
            None | Some(Value::Null) => Ok(DEFAULT_MICROS),
            Some(Value::String(text)) => text.trim().parse::<u64>().map_err(|_parse| invalid()),
            Some(Value::Number(number)) => number
                .as_u64()
                .or_else(|| number.as_f64().and_then(whole_micros))
                .ok_or_else(invalid),
            Some(Value::Bool(_) | Value::Array(_) | Value::Object(_)) => Err(invalid()),
        }
    }
}

/// Non-negative finite floats are truncated to whole microseconds.
fn whole_micros(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then_some(value as u64)
}

impl Operation for SleepUs {
    fn name(&self) -> &'static str {
        "sleep_us"
    }

    fn description(&self) -> &'static str {
        "Sleeps payload.micros microseconds per iteration (default 1000)"
    }

    fn run(
        &self,
        _shard: usize,
        iterations: u64,
        payload: &Payload,
    ) -> Result<OperationOutput, OperationError> {
        if iterations == 0 {
            return Ok(OperationOutput::completed(0));
        }
        let pause = Duration::from_micros(Self::micros(payload)?);
        for _ in 0..iterations {
            std::thread::sleep(pause);
        }
        Ok(OperationOutput::completed(iterations))
    }
}
