// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::common::entropy_seed;
use crate::common::Pcg32;
use crate::common::RandomSource;

use super::buffer::BufferSet;
use super::buffer::CLEARED;
use super::helper::params_from_eps;
use super::merge::BufferMerger;
use super::summary::build_summary;
use super::summary::Summary;

/// Streaming collector for the randomized quantile estimator.
///
/// The expected usage is to create one, [`update`](Self::update) the
/// observations as they arrive, and then call [`finish`](Self::finish) or
/// [`summarize`](Self::summarize); both consume the collector, so it
/// cannot be touched afterwards.
#[derive(Debug, Clone)]
pub struct RandomSketch {
    eps: f64,
    b: usize,

    buffers: BufferSet,
    merger: BufferMerger<Pcg32>,
    cur: usize,

    // One sample is retained per 1 << level arrivals. Always taking the
    // arrival that lands when `count` reaches the run length would bias
    // the sample whenever upstream sources interleave in a pattern, say
    // two servers reporting A B A B; `chosen` is drawn ahead of time so
    // every position in the run is equally likely to be the one retained.
    count: u64,
    chosen: u64,
    rng: Pcg32,
    reservoir: f64,

    // `level` is the level the current buffer fills at. When `n` reaches
    // `next`, the level increments and `next` doubles.
    level: u32,
    next: u64,
    n: u64,
}

impl RandomSketch {
    /// Creates a collector with the given epsilon tolerance for error in
    /// the CDF, seeded from ambient entropy.
    ///
    /// # Panics
    ///
    /// Panics if `eps` is not in (0, 1) or its footprint is unallocatable.
    pub fn new(eps: f64) -> Self {
        Self::with_seed(eps, entropy_seed())
    }

    /// Creates a collector with the given epsilon tolerance and the seed
    /// to use for the collection of the stream.
    ///
    /// # Panics
    ///
    /// Panics if `eps` is not in (0, 1) or its footprint is unallocatable.
    pub fn with_seed(eps: f64, seed: u64) -> Self {
        assert!(
            eps > 0.0 && eps < 1.0,
            "eps must be in (0, 1), got {eps}"
        );
        let (b, s) = params_from_eps(eps);
        b.checked_mul(s)
            .filter(|total| total.checked_mul(8).is_some())
            .unwrap_or_else(|| panic!("eps {eps} requires an unallocatable footprint"));

        let mut buffers = BufferSet::new(b, s);
        buffers.set_level(0, 0);

        Self {
            eps,
            b,
            buffers,
            merger: BufferMerger::new(s, Pcg32::new(seed, 0)),
            cur: 0,
            count: 0,
            chosen: 1,
            rng: Pcg32::new(seed, 1),
            reservoir: 0.0,
            level: 0,
            next: (s as u64) << (b - 1),
            n: 0,
        }
    }

    /// Returns the epsilon this collector was configured with.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Returns the number of values observed so far.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns true if the collector has not seen any data.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Resets the run counter and pre-draws which arrival of the next run
    /// will be retained.
    fn reset_count(&mut self) {
        self.count = 0;
        self.chosen = self.rng.index(1 << self.level) + 1;
    }

    /// Puts the value in the quantile estimator.
    ///
    /// NaN values are ignored.
    pub fn update(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }

        self.n += 1;
        self.count += 1;

        // Check if we should keep this value in the reservoir.
        if self.count == self.chosen {
            self.reservoir = value;
        }

        // Check if the run is complete.
        if self.count < 1 << self.level {
            return;
        }

        self.buffers.push(self.cur, self.reservoir);

        // If there is still room, all that is left is picking which value
        // of the next run to store.
        if !self.buffers.is_full(self.cur) {
            self.reset_count();
            return;
        }

        // The buffer is full. Sort it and find another buffer to fill,
        // merging a pair of others if required.
        self.buffers.sort(self.cur);

        // Since a buffer filled, check whether the level bump is due.
        if self.n == self.next {
            self.next <<= 1;
            self.level += 1;
        }
        self.reset_count();

        // First look for an empty buffer.
        for i in 0..self.b {
            if self.buffers.level(i) == CLEARED {
                self.cur = i;
                self.buffers.set_level(i, self.level as i32);
                return;
            }
        }

        // None left, so free one up: find the lowest level held by two
        // buffers and merge that pair. The O(b^2) search is fine because b
        // is tiny and full ladders are rare on the update path.
        //
        // `floor` tracks the levels already ruled out during the search.
        let mut floor = CLEARED;
        loop {
            let mut min_level = CLEARED;
            for i in 0..self.b {
                let level = self.buffers.level(i);
                if (min_level == CLEARED || level < min_level) && level > floor {
                    min_level = level;
                }
            }

            // Unreachable: b buffers can never occupy b distinct levels,
            // because the level only reaches b - 1 after `next` has
            // doubled enough times to have filled multiple buffers per
            // historic level.
            if min_level == CLEARED {
                panic!("ran out of buffers to merge");
            }

            // Find the first two buffers with that level. The later one
            // becomes the merge destination, so the earlier slot is the
            // one cleared and reused; it is the most recently touched and
            // stays warm for the next append cycle.
            let mut first = None;
            for i in 0..self.b {
                if self.buffers.level(i) != min_level {
                    continue;
                }
                match first {
                    None => first = Some(i),
                    Some(f) => {
                        self.merger.merge(&mut self.buffers, i, f);
                        self.cur = f;
                        self.buffers.set_level(f, self.level as i32);
                        return;
                    }
                }
            }

            // No pair at that level; retry above it.
            floor = min_level;
        }
    }

    /// Finishes the collection, producing a value that can be merged and
    /// summarized. Consumes the collector, which makes updating after a
    /// finish unrepresentable.
    pub fn finish(self) -> FinishedRandom {
        FinishedRandom {
            eps: self.eps,
            n: self.n,
            buffers: self.buffers,
        }
    }

    /// Shorthand for `finish().summarize()`.
    pub fn summarize(self) -> Summary {
        self.finish().summarize()
    }
}

/// A completed collection: immutable, mergeable, and summarizable.
#[derive(Debug, Clone)]
pub struct FinishedRandom {
    pub(crate) eps: f64,
    pub(crate) n: u64,
    pub(crate) buffers: BufferSet,
}

impl FinishedRandom {
    /// Returns the epsilon the collection was configured with.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Returns the number of values the collection observed.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Creates a [`Summary`] for querying.
    pub fn summarize(&self) -> Summary {
        build_summary(&self.buffers, self.n)
    }
}
