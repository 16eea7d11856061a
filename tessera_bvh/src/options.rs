// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build tuning knobs.

/// Upper bound on [`BuildOptions::bin_count`].
pub const MAX_BINS: usize = 32;

/// Parameters of the binned SAH build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Number of bins per axis when searching for a split. Clamped to `2..=MAX_BINS`.
    pub bin_count: usize,
    /// Children holding this many primitives or fewer are left as leaves without
    /// evaluating a split.
    pub min_split_primitives: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            bin_count: 8,
            min_split_primitives: 2,
        }
    }
}

impl BuildOptions {
    /// Set the number of bins per axis.
    #[must_use]
    pub const fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    /// Set the leaf floor below which children are not subdivided.
    #[must_use]
    pub const fn with_min_split_primitives(mut self, count: u32) -> Self {
        self.min_split_primitives = count;
        self
    }

    pub(crate) fn effective_bin_count(&self) -> usize {
        self.bin_count.clamp(2, MAX_BINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_count_is_clamped() {
        assert_eq!(BuildOptions::default().effective_bin_count(), 8);
        let o = BuildOptions::default().with_bin_count(0);
        assert_eq!(o.effective_bin_count(), 2);
        let o = BuildOptions::default().with_bin_count(1000);
        assert_eq!(o.effective_bin_count(), MAX_BINS);
    }
}
