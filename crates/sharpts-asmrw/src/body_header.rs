//! Method body header selection, spec.md §4.8 step 4 / §6 (also Invariant 8
//! in spec.md §8): tiny bodies get a 1-byte header, everything else gets the
//! 12-byte fat header.

pub const TINY_FORMAT_FLAG: u8 = 0x02;
pub const FAT_FORMAT_FLAG: u16 = 0x3003;
pub const FAT_FLAG_INIT_LOCALS: u16 = 0x10;
pub const FAT_FLAG_MORE_SECTS: u16 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyShape {
    pub code_size: u32,
    pub max_stack: u16,
    pub has_exception_regions: bool,
    pub local_sig_token: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyHeader {
    Tiny { code_size: u8 },
    Fat {
        init_locals: bool,
        more_sects: bool,
        max_stack: u16,
        code_size: u32,
        local_sig_token: u32,
    },
}

/// A tiny header fits only when there's no exception data, no locals, the
/// code is short, and the stack never needs more than 8 slots.
fn fits_tiny(shape: &BodyShape) -> bool {
    !shape.has_exception_regions
        && shape.local_sig_token.is_none()
        && shape.code_size < 64
        && shape.max_stack <= 8
}

pub fn select_header(shape: &BodyShape) -> BodyHeader {
    if fits_tiny(shape) {
        BodyHeader::Tiny {
            code_size: shape.code_size as u8,
        }
    } else {
        BodyHeader::Fat {
            init_locals: shape.local_sig_token.is_some(),
            more_sects: shape.has_exception_regions,
            max_stack: shape.max_stack,
            code_size: shape.code_size,
            local_sig_token: shape.local_sig_token.unwrap_or(0),
        }
    }
}

pub fn encode_tiny(code_size: u8) -> [u8; 1] {
    [(code_size << 2) | TINY_FORMAT_FLAG]
}

pub fn encode_fat(init_locals: bool, more_sects: bool, max_stack: u16, code_size: u32, local_sig_token: u32) -> [u8; 12] {
    let mut flags = FAT_FORMAT_FLAG;
    if init_locals {
        flags |= FAT_FLAG_INIT_LOCALS;
    }
    if more_sects {
        flags |= FAT_FLAG_MORE_SECTS;
    }
    let mut out = [0u8; 12];
    out[0..2].copy_from_slice(&flags.to_le_bytes());
    out[2..4].copy_from_slice(&max_stack.to_le_bytes());
    out[4..8].copy_from_slice(&code_size.to_le_bytes());
    out[8..12].copy_from_slice(&local_sig_token.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_shape() -> BodyShape {
        BodyShape {
            code_size: 10,
            max_stack: 2,
            has_exception_regions: false,
            local_sig_token: None,
        }
    }

    #[test]
    fn small_body_gets_tiny_header() {
        assert_eq!(select_header(&small_shape()), BodyHeader::Tiny { code_size: 10 });
    }

    #[test]
    fn locals_force_fat_header() {
        let mut shape = small_shape();
        shape.local_sig_token = Some(0x1100_0007);
        let header = select_header(&shape);
        assert!(matches!(header, BodyHeader::Fat { init_locals: true, .. }));
    }

    #[test]
    fn long_code_forces_fat_header() {
        let mut shape = small_shape();
        shape.code_size = 64;
        assert!(matches!(select_header(&shape), BodyHeader::Fat { .. }));
    }

    #[test]
    fn deep_stack_forces_fat_header() {
        let mut shape = small_shape();
        shape.max_stack = 9;
        assert!(matches!(select_header(&shape), BodyHeader::Fat { .. }));
    }

    #[test]
    fn exception_regions_force_fat_header_with_more_sects() {
        let mut shape = small_shape();
        shape.has_exception_regions = true;
        let header = select_header(&shape);
        assert!(matches!(header, BodyHeader::Fat { more_sects: true, .. }));
    }

    #[test]
    fn tiny_encoding_packs_size_and_flag() {
        let bytes = encode_tiny(10);
        assert_eq!(bytes[0], (10 << 2) | TINY_FORMAT_FLAG);
    }

    #[test]
    fn fat_encoding_is_12_bytes_little_endian() {
        let bytes = encode_fat(true, false, 4, 20, 0x1100_0001);
        assert_eq!(bytes.len(), 12);
        let flags = u16::from_le_bytes([bytes[0], bytes[1]]);
        assert_eq!(flags, FAT_FORMAT_FLAG | FAT_FLAG_INIT_LOCALS);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 4);
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 20);
        assert_eq!(
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            0x1100_0001
        );
    }
}
