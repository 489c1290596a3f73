//! # Hilbert curve index
//!
//! Bijection between points of the `dims`-dimensional grid `[0, 2^bits)^dims` and scalar
//! indices `[0, 2^(dims·bits))`, following John Skilling's "transpose" formulation
//! (*Programming the Hilbert curve*, AIP Conf. Proc. 707, 2004).
//!
//! ## Properties
//! -----------------
//! * Consecutive indices map to grid cells at Manhattan distance exactly 1.
//! * The origin has index 0.
//! * Everything is integer arithmetic on `u64`; `dims·bits` is limited to 63 so an index
//!   always fits.
use smallvec::SmallVec;

use crate::ais_errors::AisError;

/// Grid coordinates, one entry per dimension.
pub type HilbertPoint = SmallVec<[u64; 4]>;

/// A Hilbert curve over `[0, 2^bits)^dims`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HilbertCurve {
    bits: u32,
    dims: usize,
}

impl HilbertCurve {
    /// Largest supported `dims·bits`.
    pub const MAX_TOTAL_BITS: u32 = 63;

    /// Arguments
    /// -----------------
    /// * `bits` – Bits per coordinate, at least 1.
    /// * `dims` – Number of dimensions, at least 1.
    ///
    /// Return
    /// ----------
    /// * The curve, or [`AisError::InvalidPartitionParameter`] when the index would not fit
    ///   in 63 bits.
    pub fn new(bits: u32, dims: usize) -> Result<Self, AisError> {
        if bits == 0 || dims == 0 {
            return Err(AisError::InvalidPartitionParameter(format!(
                "hilbert curve needs bits ≥ 1 and dims ≥ 1 (got bits={bits}, dims={dims})"
            )));
        }
        let total = u64::from(bits) * dims as u64;
        if total > u64::from(Self::MAX_TOTAL_BITS) {
            return Err(AisError::InvalidPartitionParameter(format!(
                "dims·bits = {total} exceeds {}",
                Self::MAX_TOTAL_BITS
            )));
        }
        Ok(HilbertCurve { bits, dims })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Exclusive upper bound of each coordinate.
    pub fn side(&self) -> u64 {
        1 << self.bits
    }

    /// Number of cells, i.e. the exclusive upper bound of the index.
    pub fn cells(&self) -> u64 {
        1 << (self.bits as usize * self.dims)
    }

    /// Index of a grid point.
    ///
    /// Coordinates are masked to `bits` bits; the caller is expected to quantize first.
    ///
    /// # Panics
    /// Panics if `point.len() != dims`.
    pub fn index(&self, point: &[u64]) -> u64 {
        assert_eq!(point.len(), self.dims, "point dimension mismatch");
        let mask = self.side() - 1;
        let mut x: HilbertPoint = point.iter().map(|c| c & mask).collect();
        self.axes_to_transpose(&mut x);
        self.interleave(&x)
    }

    /// Grid point of an index (inverse of [`HilbertCurve::index`]).
    pub fn point(&self, index: u64) -> HilbertPoint {
        let mut x = self.deinterleave(index & (self.cells() - 1));
        self.transpose_to_axes(&mut x);
        x
    }

    fn axes_to_transpose(&self, x: &mut [u64]) {
        let n = self.dims;
        let m = 1u64 << (self.bits - 1);

        // inverse undo
        let mut q = m;
        while q > 1 {
            let p = q - 1;
            for i in 0..n {
                if x[i] & q != 0 {
                    x[0] ^= p;
                } else {
                    let t = (x[0] ^ x[i]) & p;
                    x[0] ^= t;
                    x[i] ^= t;
                }
            }
            q >>= 1;
        }

        // gray encode
        for i in 1..n {
            x[i] ^= x[i - 1];
        }
        let mut t = 0;
        let mut q = m;
        while q > 1 {
            if x[n - 1] & q != 0 {
                t ^= q - 1;
            }
            q >>= 1;
        }
        for xi in x.iter_mut() {
            *xi ^= t;
        }
    }

    fn transpose_to_axes(&self, x: &mut [u64]) {
        let n = self.dims;
        let side = self.side();

        // gray decode
        let t = x[n - 1] >> 1;
        for i in (1..n).rev() {
            x[i] ^= x[i - 1];
        }
        x[0] ^= t;

        // undo excess work
        let mut q = 2;
        while q != side {
            let p = q - 1;
            for i in (0..n).rev() {
                if x[i] & q != 0 {
                    x[0] ^= p;
                } else {
                    let t = (x[0] ^ x[i]) & p;
                    x[0] ^= t;
                    x[i] ^= t;
                }
            }
            q <<= 1;
        }
    }

    /// Most significant bit first, dimension 0 first within each level.
    fn interleave(&self, x: &[u64]) -> u64 {
        let mut h = 0;
        for level in (0..self.bits).rev() {
            for xi in x {
                h = (h << 1) | ((xi >> level) & 1);
            }
        }
        h
    }

    fn deinterleave(&self, h: u64) -> HilbertPoint {
        let n = self.dims;
        let total = self.bits as usize * n;
        let mut x: HilbertPoint = SmallVec::from_elem(0, n);
        for k in 0..total {
            let bit = (h >> (total - 1 - k)) & 1;
            let level = self.bits as usize - 1 - k / n;
            x[k % n] |= bit << level;
        }
        x
    }
}
