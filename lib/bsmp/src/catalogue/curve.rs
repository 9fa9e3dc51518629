//! Curves: block-addressable large byte regions with MD5 integrity (§3,
//! §4.5). Block storage is owned externally via the read/write-block
//! capabilities, mirroring `struct sllp_curve`'s `read_block`/`write_block`
//! function pointers in the original C source.

use crate::error::{Error, Result};
use crate::wire::{CURVE_MAX_BLOCKS, CURVE_MAX_BLOCK_SIZE, CURVE_MIN_BLOCKS};
use md5::{Digest, Md5};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CurveId(pub u8);

/// Reads one block of a curve into `out`, returning the number of bytes
/// written. A short count (`< out.len()`) signals end-of-data to a
/// whole-curve client read (§4.8).
pub trait ReadBlock {
    fn read_block(&self, block: u32, out: &mut [u8]) -> usize;
}

/// Writes one block of a curve. Only called for curves registered as
/// writable.
pub trait WriteBlock {
    fn write_block(&mut self, block: u32, data: &[u8]);
}

pub struct Curve {
    id: CurveId,
    writable: bool,
    block_size: usize,
    nblocks: u32,
    checksum: [u8; 16],
    read: Box<dyn ReadBlock>,
    write: Option<Box<dyn WriteBlock>>,
}

impl Curve {
    /// `block_size` must be in `[1, 65520]` and `nblocks` in `[1, 65536]`.
    /// `write` is mandatory when `writable` is true (§4.2 step 1).
    pub fn new(
        block_size: usize,
        nblocks: u32,
        writable: bool,
        read: Box<dyn ReadBlock>,
        write: Option<Box<dyn WriteBlock>>,
    ) -> Result<Curve> {
        if block_size == 0 || block_size > CURVE_MAX_BLOCK_SIZE {
            return Err(Error::ParamOutOfRange("curve block size"));
        }
        if nblocks < CURVE_MIN_BLOCKS || nblocks > CURVE_MAX_BLOCKS {
            return Err(Error::ParamOutOfRange("curve block count"));
        }
        if writable && write.is_none() {
            return Err(Error::ParamInvalid("writable curve needs a write_block callback"));
        }

        Ok(Curve {
            id: CurveId(0),
            writable,
            block_size,
            nblocks,
            checksum: [0u8; 16],
            read,
            write,
        })
    }

    #[inline]
    pub fn id(&self) -> CurveId {
        self.id
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: CurveId) {
        self.id = id;
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn nblocks(&self) -> u32 {
        self.nblocks
    }

    #[inline]
    pub fn checksum(&self) -> [u8; 16] {
        self.checksum
    }

    /// Read block `offset` (up to `block_size` bytes, fewer at end-of-data).
    pub fn read_block(&self, offset: u32, out: &mut [u8]) -> usize {
        self.read.read_block(offset, out)
    }

    /// Write `data` into block `offset`. Panics if the curve is read-only;
    /// the dispatcher is responsible for rejecting that case with
    /// `READ_ONLY` before calling this.
    pub fn write_block(&mut self, offset: u32, data: &[u8]) {
        self.write
            .as_mut()
            .expect("dispatcher must reject writes to a read-only curve")
            .write_block(offset, data);
    }

    /// Recompute the MD5 over every block in order (§4.5). Reads
    /// `nblocks` blocks of exactly `block_size` bytes each into one
    /// scratch buffer, streaming them into the digest rather than
    /// materializing the whole curve.
    pub fn recalc_checksum(&mut self) -> [u8; 16] {
        let mut hasher = Md5::new();
        let mut block = vec![0u8; self.block_size];

        for offset in 0..self.nblocks {
            self.read.read_block(offset, &mut block);
            hasher.update(&block);
        }

        self.checksum = hasher.finalize().into();
        self.checksum
    }

    /// Encode this curve's CURVE_LIST record: writable, block_size(be16),
    /// nblocks(be16); `nblocks == 65536` encodes as 0 (§4.3).
    pub fn list_record(&self) -> [u8; 5] {
        let bs = self.block_size as u16;
        let nb = if self.nblocks == CURVE_MAX_BLOCKS {
            0u16
        } else {
            self.nblocks as u16
        };
        let bs_be = bs.to_be_bytes();
        let nb_be = nb.to_be_bytes();
        [
            if self.writable { 0x80 } else { 0 },
            bs_be[0],
            bs_be[1],
            nb_be[0],
            nb_be[1],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Zeroed;
    impl ReadBlock for Zeroed {
        fn read_block(&self, _block: u32, out: &mut [u8]) -> usize {
            out.fill(0);
            out.len()
        }
    }

    #[test]
    fn rejects_zero_block_size() {
        assert!(Curve::new(0, 4, false, Box::new(Zeroed), None).is_err());
    }

    #[test]
    fn writable_curve_requires_write_block() {
        assert_eq!(
            Curve::new(4, 4, true, Box::new(Zeroed), None).unwrap_err(),
            Error::ParamInvalid("writable curve needs a write_block callback")
        );
    }

    #[test]
    fn list_record_encodes_max_blocks_as_zero() {
        let curve = Curve::new(16, CURVE_MAX_BLOCKS, false, Box::new(Zeroed), None).unwrap();
        assert_eq!(curve.list_record(), [0x00, 0x00, 0x10, 0x00, 0x00]);
    }

    /// L4 groundwork: a curve whose blocks are all-zero must checksum to
    /// the MD5 of `nblocks * block_size` zero bytes.
    #[test]
    fn recalc_checksum_matches_known_digest() {
        let mut curve = Curve::new(4, 2, false, Box::new(Zeroed), None).unwrap();
        let digest = curve.recalc_checksum();

        let mut hasher = Md5::new();
        hasher.update([0u8; 8]);
        let expected: [u8; 16] = hasher.finalize().into();

        assert_eq!(digest, expected);
        assert_eq!(curve.checksum(), expected);
    }
}
