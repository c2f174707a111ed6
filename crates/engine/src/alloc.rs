//! The adaptive allocation governor.
//!
//! Container encodes size their initial buffer as
//! `children * avg_item + avg_realloc`. The two averages are running
//! estimates shared by the whole process: encodes that had to reallocate
//! push them up by half the observed shortfall, encodes that
//! over-allocated pull them down gently (a sixteenth and a thirty-second
//! of the excess), clamped at the minima. Updates use relaxed atomics;
//! concurrent encodes race on the estimate, which only perturbs buffer
//! sizing, never the wire bytes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use thiserror::Error;

/// Lower bound of the realloc-slack estimate.
const REALLOC_MIN: usize = 64;

/// Lower bound of the bytes-per-item estimate.
const ITEM_MIN: usize = 4;

/// The argument to a governor knob was not strictly positive.
#[derive(Debug, Error)]
#[error("size values must be larger than zero")]
pub struct InvalidAllocation;

/// Running allocation estimates.
#[derive(Debug)]
pub(crate) struct Governor {
    item: AtomicUsize,
    realloc: AtomicUsize,
    dynamic: AtomicBool,
}

static GOVERNOR: Governor = Governor::new();

impl Governor {
    const fn new() -> Self {
        Self {
            item: AtomicUsize::new(ITEM_MIN),
            realloc: AtomicUsize::new(REALLOC_MIN),
            dynamic: AtomicBool::new(true),
        }
    }

    /// Current `(avg_item, avg_realloc)` estimates.
    pub(crate) fn estimates(&self) -> (usize, usize) {
        (
            self.item.load(Ordering::Relaxed),
            self.realloc.load(Ordering::Relaxed),
        )
    }

    /// Feeds the outcome of one top-level container encode back into the
    /// estimates. `num_items` counts child frames (pairs count twice).
    pub(crate) fn update(
        &self,
        reallocs: u32,
        final_len: usize,
        initial_alloc: usize,
        num_items: usize,
    ) {
        if !self.dynamic.load(Ordering::Relaxed) {
            return;
        }

        if reallocs != 0 {
            let difference = final_len.saturating_sub(initial_alloc);
            self.realloc.fetch_add(difference >> 1, Ordering::Relaxed);
            self.item
                .fetch_add((difference / (num_items + 1)) >> 1, Ordering::Relaxed);
        } else {
            let difference = initial_alloc.saturating_sub(final_len);
            let med_diff = difference / (num_items + 1);
            sub_clamped(&self.realloc, difference >> 4, REALLOC_MIN);
            sub_clamped(&self.item, med_diff >> 5, ITEM_MIN);
        }
    }

    fn set_manual(&self, item_size: usize, realloc_size: usize) {
        self.dynamic.store(false, Ordering::Relaxed);
        self.item.store(item_size, Ordering::Relaxed);
        self.realloc.store(realloc_size, Ordering::Relaxed);
    }

    fn set_dynamic(&self, item_size: Option<usize>, realloc_size: Option<usize>) {
        self.dynamic.store(true, Ordering::Relaxed);
        if let Some(item) = item_size {
            self.item.store(item, Ordering::Relaxed);
        }
        if let Some(realloc) = realloc_size {
            self.realloc.store(realloc, Ordering::Relaxed);
        }
    }
}

fn sub_clamped(cell: &AtomicUsize, amount: usize, min: usize) {
    let current = cell.load(Ordering::Relaxed);
    let next = if amount + min < current {
        current - amount
    } else {
        min
    };
    cell.store(next, Ordering::Relaxed);
}

/// The process-wide governor that the encode drivers consult.
pub(crate) fn governor() -> &'static Governor {
    &GOVERNOR
}

/// Fixes the estimates and disables adaptation.
///
/// Both sizes must be strictly positive.
pub fn manual_allocations(item_size: usize, realloc_size: usize) -> Result<(), InvalidAllocation> {
    if item_size == 0 || realloc_size == 0 {
        return Err(InvalidAllocation);
    }
    GOVERNOR.set_manual(item_size, realloc_size);
    Ok(())
}

/// Re-enables adaptation, optionally seeding the estimates.
///
/// Provided seeds must be strictly positive.
pub fn dynamic_allocations(
    item_size: Option<usize>,
    realloc_size: Option<usize>,
) -> Result<(), InvalidAllocation> {
    if item_size == Some(0) || realloc_size == Some(0) {
        return Err(InvalidAllocation);
    }
    GOVERNOR.set_dynamic(item_size, realloc_size);
    Ok(())
}
