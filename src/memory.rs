// SPDX-FileCopyrightText: 2025 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Shared zero returned by reads of unwritten cells
static ZERO: i64 = 0;

/// How far past the end of the dense cells a write can land and still extend them.
/// Anything further goes in the sparse map instead.
const DENSE_REACH: u64 = 0x200;

/// Growable program memory.
///
/// The program and anything written close to its end live in a contiguous vector. Writes far
/// beyond it are kept in a sparse map, so a single write to a huge address costs one cell rather
/// than the whole gap. Reads of cells never written yield `0` without allocating.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<i64>,
    // every key is at or past `cells.len()`
    far: BTreeMap<u64, i64>,
}

impl Memory {
    /// Read the int at `address`, or `0` if nothing has been written there yet
    pub fn read(&self, address: u64) -> i64 {
        self[address]
    }

    /// Write `value` to `address`, growing memory as needed
    pub fn write(&mut self, address: u64, value: i64) {
        *self.cell_mut(address) = value;
    }

    fn dense_index(&self, address: u64) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&i| i < self.cells.len())
    }

    fn cell_mut(&mut self, address: u64) -> &mut i64 {
        if let Some(i) = self.dense_index(address) {
            return &mut self.cells[i];
        }
        let len = self.cells.len() as u64;
        let Ok(i) = usize::try_from(address) else {
            return self.far.entry(address).or_insert(0);
        };
        if address - len >= DENSE_REACH {
            return self.far.entry(address).or_insert(0);
        }
        self.cells.resize(i + 1, 0);
        // pull in sparse cells the dense part now covers
        let beyond = self.far.split_off(&(address + 1));
        for (covered, value) in std::mem::replace(&mut self.far, beyond) {
            // keys were in `len..=address`, so they fit
            self.cells[covered as usize] = value;
        }
        &mut self.cells[i]
    }

    /// View of the contiguous cells, starting at address 0
    ///
    /// Cells written far past the end aren't included, but are still reachable by address.
    pub fn as_slice(&self) -> &[i64] {
        &self.cells
    }
}

impl FromIterator<i64> for Memory {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
            far: BTreeMap::new(),
        }
    }
}

impl Index<u64> for Memory {
    type Output = i64;
    fn index(&self, address: u64) -> &i64 {
        match self.dense_index(address) {
            Some(i) => &self.cells[i],
            None => self.far.get(&address).unwrap_or(&ZERO),
        }
    }
}

impl IndexMut<u64> for Memory {
    fn index_mut(&mut self, address: u64) -> &mut i64 {
        self.cell_mut(address)
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "[{}]", self.cells.iter().join(", "))?;
        if !self.far.is_empty() {
            write!(
                fmt,
                " + {{{}}}",
                self.far
                    .iter()
                    .map(|(address, value)| format!("{address}: {value}"))
                    .join(", ")
            )?;
        }
        Ok(())
    }
}
