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

/// Level of a buffer that holds no data.
pub(crate) const CLEARED: i32 = -1;

/// Per-buffer metadata. The higher the level, the more observations each
/// stored sample stands for.
#[derive(Debug, Clone, Copy)]
struct Slot {
    len: usize,
    level: i32,
    sorted: bool,
}

impl Slot {
    fn cleared() -> Self {
        Self {
            len: 0,
            level: CLEARED,
            sorted: false,
        }
    }
}

/// A fixed set of equal-capacity buffers carved out of one contiguous
/// value arena. Buffers are addressed by index; slot metadata tracks each
/// buffer's length, level, and sorted flag.
#[derive(Debug, Clone)]
pub(crate) struct BufferSet {
    block: Box<[f64]>,
    slots: Box<[Slot]>,
    cap: usize,
}

impl BufferSet {
    /// Allocates `count` cleared buffers of `cap` values each, backed by a
    /// single `count * cap` arena.
    pub fn new(count: usize, cap: usize) -> Self {
        Self {
            block: vec![0.0; count * cap].into_boxed_slice(),
            slots: vec![Slot::cleared(); count].into_boxed_slice(),
            cap,
        }
    }

    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self, i: usize) -> usize {
        self.slots[i].len
    }

    pub fn level(&self, i: usize) -> i32 {
        self.slots[i].level
    }

    pub fn is_sorted(&self, i: usize) -> bool {
        self.slots[i].sorted
    }

    pub fn is_full(&self, i: usize) -> bool {
        self.slots[i].len == self.cap
    }

    /// Values currently held by buffer `i`.
    pub fn data(&self, i: usize) -> &[f64] {
        let start = i * self.cap;
        &self.block[start..start + self.slots[i].len]
    }

    /// Appends a value to buffer `i`, which must have spare capacity.
    pub fn push(&mut self, i: usize, value: f64) {
        let slot = &mut self.slots[i];
        debug_assert!(slot.len < self.cap, "push into full buffer {i}");
        self.block[i * self.cap + slot.len] = value;
        slot.len += 1;
        slot.sorted = false;
    }

    /// Sorts buffer `i` in place and flags it as sorted.
    pub fn sort(&mut self, i: usize) {
        let start = i * self.cap;
        let len = self.slots[i].len;
        self.block[start..start + len].sort_unstable_by(f64::total_cmp);
        self.slots[i].sorted = true;
    }

    /// Resets buffer `i` to the cleared state.
    pub fn clear(&mut self, i: usize) {
        self.slots[i] = Slot::cleared();
    }

    pub fn set_level(&mut self, i: usize, level: i32) {
        self.slots[i].level = level;
    }

    /// Overwrites buffer `i` with the result of a pairwise merge: the
    /// values replace its contents, its level increments, and it is
    /// flagged sorted.
    pub fn store_merged(&mut self, i: usize, values: &[f64]) {
        debug_assert!(values.len() <= self.cap);
        let start = i * self.cap;
        self.block[start..start + values.len()].copy_from_slice(values);
        let slot = &mut self.slots[i];
        slot.len = values.len();
        slot.level += 1;
        slot.sorted = true;
    }

    /// Deep-copies buffer `src` of `other` into buffer `dst` of `self`.
    /// Both sets must share the same per-buffer capacity.
    pub fn copy_slot_from(&mut self, dst: usize, other: &BufferSet, src: usize) {
        debug_assert_eq!(self.cap, other.cap);
        let data = other.data(src);
        let start = dst * self.cap;
        self.block[start..start + data.len()].copy_from_slice(data);
        self.slots[dst] = other.slots[src];
    }
}
