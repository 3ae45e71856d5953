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

//! Shared random utilities for sketches.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Random number source for sketches.
pub trait RandomSource {
    /// Returns the next random 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Returns a uniform value in `[0, bound)`.
    ///
    /// Fixed-point multiply on one 32-bit word; widened through u128 so
    /// bounds at or above 2^32 cannot overflow.
    fn index(&mut self, bound: u64) -> u64 {
        ((self.next_u32() as u128 * bound as u128) >> 32) as u64
    }
}

const PCG_MUL: u64 = 6364136223846793005;

/// PCG-XSH-RR generator (pcg-random.org): 64-bit LCG state permuted down
/// to 32-bit outputs. Distinct `stream` values on the same seed give
/// independent sequences.
#[derive(Debug, Clone, Copy)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Pcg32 {
    /// Creates a generator for the given seed and stream identifier.
    pub fn new(seed: u64, stream: u64) -> Self {
        // Equivalent to starting from a zero state with this increment,
        // stepping once, adding the seed, and stepping again.
        let inc = (stream << 1) | 1;
        Self {
            state: inc.wrapping_add(seed).wrapping_mul(PCG_MUL).wrapping_add(inc),
            inc,
        }
    }
}

impl RandomSource for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate.wrapping_mul(PCG_MUL).wrapping_add(self.inc);

        // Output permutation of the old state.
        let xorshifted = (((oldstate >> 18) ^ oldstate) >> 27) as u32;
        let rot = (oldstate >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

// See Knuth, MMIX.
const LCG_A: u64 = 6364136223846793005;
const LCG_C: u64 = 1442695040888963407;

/// Simple linear congruential generator based on Knuth's MMIX constants.
/// Only the high half of the state is emitted; the low bits of an LCG
/// have short periods.
#[derive(Debug, Clone, Copy)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    /// Creates a generator with the given seed as its state.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl RandomSource for Lcg64 {
    fn next_u32(&mut self) -> u32 {
        self.state = LCG_A.wrapping_mul(self.state).wrapping_add(LCG_C);
        (self.state >> 32) as u32
    }
}

/// Vends single random bits while making the minimum number of calls to
/// the underlying generator: one 32-bit word is drawn and then consumed
/// one bit per toss.
#[derive(Debug, Clone)]
pub struct Coin<R> {
    rng: R,
    word: u32,
    bits: u32,
}

impl<R: RandomSource> Coin<R> {
    /// Creates a coin over the given source with an empty reserve.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            word: 0,
            bits: 0,
        }
    }

    /// Returns one random bit.
    pub fn toss(&mut self) -> bool {
        if self.bits == 0 {
            self.word = self.rng.next_u32();
            self.bits = 32;
        }
        self.bits -= 1;
        let val = self.word & 1 > 0;
        self.word >>= 1;
        val
    }
}

/// Returns a seed from ambient entropy for callers that do not supply one.
pub fn entropy_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut seed = nanos as u64 ^ (std::process::id() as u64);
    if seed == 0 {
        seed = 0x9e3779b97f4a7c15;
    }
    seed
}
