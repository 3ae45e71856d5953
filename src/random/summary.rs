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

use std::borrow::Cow;

use super::buffer::BufferSet;
use super::merge::MergeItem;
use super::merge::MergeSorter;

/// One retained sample with its cumulative weighted rank: the approximate
/// count of observations not greater than the value.
#[derive(Debug, Clone, Copy)]
struct SummaryElement {
    rank: i64,
    value: f64,
}

/// A read-only snapshot of a finished collection, organized for fast
/// percentile queries.
#[derive(Debug, Clone)]
pub struct Summary {
    n: f64,
    elements: Vec<SummaryElement>,
}

/// Builds a summary from the finished buffers. Unsorted buffers (in
/// practice only the final partial one) are sorted into a copy, so the
/// source is never mutated.
pub(crate) fn build_summary(buffers: &BufferSet, n: u64) -> Summary {
    let mut sources: Vec<(Cow<'_, [f64]>, i32)> = Vec::with_capacity(buffers.count());
    for i in 0..buffers.count() {
        if buffers.len(i) == 0 {
            continue;
        }
        let data = if buffers.is_sorted(i) {
            Cow::Borrowed(buffers.data(i))
        } else {
            let mut copy = buffers.data(i).to_vec();
            copy.sort_unstable_by(f64::total_cmp);
            Cow::Owned(copy)
        };
        sources.push((data, buffers.level(i)));
    }

    let items = sources
        .iter()
        .map(|(data, level)| MergeItem {
            data: data.as_ref(),
            level: *level,
        })
        .collect();

    // Emit in value order; each element takes the running rank and then
    // advances it by the weight of the buffer the value came from.
    let mut elements = Vec::with_capacity(buffers.count() * buffers.cap());
    let mut sorter = MergeSorter::new(items);
    let mut rank = 0i64;
    while let Some((value, level)) = sorter.next() {
        elements.push(SummaryElement { rank, value });
        rank += 1 << level;
    }

    Summary {
        n: n as f64,
        elements,
    }
}

impl Summary {
    /// Returns the number of values the summarized collection observed.
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Returns the number of retained elements backing the summary.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the summary retains no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the estimated value at the given percentile.
    ///
    /// Out-of-range percentiles resolve to the endpoint elements, so the
    /// result is always one of the retained values or an interpolation
    /// between two of them.
    ///
    /// # Panics
    ///
    /// Panics if the summary is empty.
    pub fn query(&self, ptile: f64) -> f64 {
        assert!(
            !self.elements.is_empty(),
            "query is undefined for an empty summary"
        );

        let target = (self.n * ptile).ceil() as i64;
        let idx = self.elements.partition_point(|element| element.rank < target);
        if idx >= self.elements.len() {
            return self.elements[self.elements.len() - 1].value;
        }

        let below = self.elements[if idx > 0 { idx - 1 } else { 0 }];
        let above = self.elements[idx];
        if above.rank == below.rank {
            return above.value;
        }
        let x = (target - below.rank) as f64 / (above.rank - below.rank) as f64;
        below.value + (above.value - below.value) * x
    }
}
