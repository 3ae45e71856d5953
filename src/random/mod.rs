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

//! Randomized streaming quantile estimation.
//!
//! A [`RandomSketch`] consumes a one-pass stream of `f64` observations and
//! supports approximate percentile queries with an additive rank error of
//! at most `eps`. The working set is a fixed ladder of `b` buffers of `s`
//! samples each, where a sample in a level-`l` buffer stands for `2^l`
//! observed values; reservoir sampling picks the representative of each
//! run of `2^l` arrivals, and a coin-flip merge of two same-level buffers
//! produces one buffer of the next level whenever the ladder is full.
//!
//! Sketches collected independently over the same `eps` can be combined
//! with [`merge`]; [`estimate_epsilon`] inverts the memory footprint to
//! find the most accurate `eps` that fits a float budget.
//!
//! # Usage
//!
//! ```rust
//! use quantile_sketches::random::RandomSketch;
//!
//! let mut sketch = RandomSketch::with_seed(0.01, 7);
//! for i in 0..10_000 {
//!     sketch.update(i as f64);
//! }
//! let summary = sketch.summarize();
//! let p90 = summary.query(0.9);
//! assert!(p90 > 8_500.0 && p90 < 9_500.0);
//! ```

mod buffer;
mod helper;
mod merge;
mod sketch;
mod summary;

pub use self::helper::estimate_epsilon;
pub use self::merge::merge;
pub use self::sketch::FinishedRandom;
pub use self::sketch::RandomSketch;
pub use self::summary::Summary;
