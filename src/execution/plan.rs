use crate::args::PositiveUsize;

/// Shard sizes for one fan-out, one entry per target.
///
/// Every shard but the last holds `total / parts`; the last one also carries
/// the remainder, so the shards always sum to the requested total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPlan {
    shards: Vec<u64>,
}

impl WorkPlan {
    #[must_use]
    pub fn shards(&self) -> &[u64] {
        &self.shards
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.shards.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.shards
            .iter()
            .fold(0u64, |sum, shard| sum.saturating_add(*shard))
    }
}

/// Splits `total` iterations into `parts` shards.
#[must_use]
pub fn plan(total: u64, parts: PositiveUsize) -> WorkPlan {
    let count = parts.get();
    let divisor = u64::try_from(count).unwrap_or(u64::MAX);
    let base = total.checked_div(divisor).unwrap_or(0);
    let remainder = total.checked_rem(divisor).unwrap_or(0);

    let mut shards = vec![base; count];
    if let Some(last) = shards.last_mut() {
        *last = base.saturating_add(remainder);
    }
    WorkPlan { shards }
}
