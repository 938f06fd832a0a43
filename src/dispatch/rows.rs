//! Disjoint mutable row bands that can be moved to worker threads.
//!
//! The pool only accepts `'static` jobs, so a band cannot borrow the
//! buffer. It carries a raw pointer instead, and [`Bands::new`] makes the
//! caller promise to keep the buffer borrowed until every band is gone.

use core::marker::PhantomData;
use core::num::NonZeroUsize;
use core::ops::Range;

use rgb::AsPixels as _;

use crate::pixel::{BYTES_PER_PIXEL, Bgra8, PixelBuffer};

/// Exclusive access to `rows` of one pixel buffer.
pub(crate) struct BandMut {
    base: *mut u8,
    stride: usize,
    row_len: usize,
    rows: Range<usize>,
}

// SAFETY: a band is the only handle to its rows (see `Bands::new`), so
// moving it to another thread cannot create shared mutable access.
unsafe impl Send for BandMut {}

impl BandMut {
    pub(crate) fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Pixels of absolute row `y`, which must lie inside the band.
    pub(crate) fn row_pixels_mut(&mut self, y: usize) -> &mut [Bgra8] {
        assert!(self.rows.contains(&y), "row {y} outside band {:?}", self.rows);
        // SAFETY: `y` is inside the band, so the slice lies inside the buffer
        // allocation and no other band covers it. The returned borrow is tied
        // to `&mut self`, so it cannot outlive the band.
        let bytes = unsafe {
            core::slice::from_raw_parts_mut(self.base.add(y * self.stride), self.row_len)
        };
        bytes.as_pixels_mut()
    }
}

/// Splits a buffer into consecutive bands of at most `rows_per_task` rows.
pub(crate) struct Bands<'a> {
    base: *mut u8,
    stride: usize,
    row_len: usize,
    height: usize,
    rows_per_task: usize,
    next: usize,
    _buffer: PhantomData<&'a mut PixelBuffer>,
}

impl<'a> Bands<'a> {
    /// # Safety
    ///
    /// Bands outlive the `'a` borrow as far as the type system knows. The
    /// caller must make sure every yielded [`BandMut`] is dropped before the
    /// borrow of `buffer` ends, and must not touch `buffer` in between.
    pub(crate) unsafe fn new(buffer: &'a mut PixelBuffer, rows_per_task: NonZeroUsize) -> Self {
        Self {
            stride: buffer.stride(),
            row_len: buffer.width() * BYTES_PER_PIXEL,
            height: buffer.height(),
            rows_per_task: rows_per_task.get(),
            next: 0,
            base: buffer.base_ptr_mut(),
            _buffer: PhantomData,
        }
    }

    /// Rows not yet handed out.
    pub(crate) fn remaining_rows(&self) -> usize {
        self.height - self.next
    }
}

impl Iterator for Bands<'_> {
    type Item = BandMut;

    fn next(&mut self) -> Option<BandMut> {
        if self.next >= self.height {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.rows_per_task).min(self.height);
        self.next = end;
        Some(BandMut {
            base: self.base,
            stride: self.stride,
            row_len: self.row_len,
            rows: start..end,
        })
    }
}
