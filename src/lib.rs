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

//! Bounded-memory streaming quantile estimation.
//!
//! The [`random`] module implements a single-pass, randomized quantile
//! estimator: it ingests an arbitrarily long stream of `f64` observations
//! and answers percentile queries with an additive error of at most a
//! caller-chosen epsilon on the empirical CDF, in memory proportional to
//! `(1/eps) * sqrt(log2(1/eps))` rather than to the stream length.
//! Independently collected streams can be combined with
//! [`random::merge`] without re-observing the data.
//!
//! # Usage
//!
//! ```rust
//! use quantile_sketches::random::RandomSketch;
//!
//! let mut sketch = RandomSketch::with_seed(0.01, 42);
//! for i in 0..100_000 {
//!     sketch.update(i as f64);
//! }
//! let summary = sketch.summarize();
//! let median = summary.query(0.5);
//! assert!(median > 45_000.0 && median < 55_000.0);
//! ```

pub mod common;
pub mod error;
pub mod random;
