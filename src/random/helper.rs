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

/// Returns the parameters `(b, s)` used by the estimator for a given
/// epsilon: `b` buffers of `s` samples each.
pub(crate) fn params_from_eps(eps: f64) -> (usize, usize) {
    let log = -eps.log2();
    let b = log.ceil() as usize + 1;
    let s = (log.sqrt() / eps).ceil() as usize;
    (b, s)
}

/// Returns the number of floats a sketch allocates for a given epsilon.
pub(crate) fn block_size(eps: f64) -> usize {
    let (b, s) = params_from_eps(eps);
    b * s
}

/// Finds, within `tol`, the largest epsilon whose sketch footprint fits in
/// `floats` values. Smaller epsilon means a larger footprint, so the
/// footprint is non-increasing in epsilon and bisection applies.
pub fn estimate_epsilon(floats: usize, tol: f64) -> f64 {
    let mut lo = 1.0; // larger eps, smaller footprint
    let mut hi = 0.0;
    let mut lo_size = None;
    let mut hi_size = None;
    loop {
        let guess = (lo + hi) / 2.0;
        let guess_size = block_size(guess);
        if guess_size == floats {
            return guess;
        }
        if guess_size < floats {
            lo = guess;
            lo_size = Some(guess_size);
        } else {
            hi = guess;
            hi_size = Some(guess_size);
        }
        // Bail once the footprint stops moving or the interval closes.
        // `lo` is always safe to return: it only ever takes values whose
        // footprint was observed to fit.
        if (lo_size.is_some() && lo_size == hi_size) || lo - hi < tol {
            return lo;
        }
    }
}
