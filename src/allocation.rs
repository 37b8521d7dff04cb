use crate::config::HoldOutSize;

/// Train/test row counts for one user group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GroupAllocation {
    /// Rows kept for training.
    pub train: usize,
    /// Rows held out.
    pub test: usize,
}

impl GroupAllocation {
    /// True when the requested hold-out could not be honoured for this group.
    pub fn is_degenerate(&self, size: HoldOutSize) -> bool {
        match size {
            HoldOutSize::LeaveNOut(n) => self.test < n,
            HoldOutSize::Ratio(_) => false,
        }
    }
}

/// Train rows kept by a ratio hold-out: `floor(count * (1 - ratio))`.
pub fn train_count_for_ratio(count: usize, ratio: f64) -> usize {
    let kept = ((count as f64) * (1.0 - ratio)).floor();
    (kept.max(0.0) as usize).min(count)
}

/// Split `count` rows of one user according to `size`.
///
/// Leave-n-out saturates at the group size, so a user with fewer than `n` rows ends up
/// entirely in test.
pub fn allocate_group(count: usize, size: HoldOutSize) -> GroupAllocation {
    let train = match size {
        HoldOutSize::Ratio(ratio) => train_count_for_ratio(count, ratio),
        HoldOutSize::LeaveNOut(n) => count.saturating_sub(n),
    };
    GroupAllocation {
        train,
        test: count - train,
    }
}
