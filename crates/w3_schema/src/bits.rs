//! Packing of sub-byte fields into byte aligned units
//!

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::types::{BitOrder, BitPack};

/// Mask covering the low `width` bits
pub(crate) const fn mask(width: u32) -> u64 {
    if width == 0 {
        0
    } else {
        u64::MAX >> (64 - width)
    }
}

pub(crate) const fn fits(width: u32, value: u64) -> bool {
    value & !mask(width) == 0
}

/// Split a packed unit into its sub-field values, in declaration order
///
/// `bytes` must be exactly `pack.bytes` long and the pack must have passed [`BitPack::check`].
pub fn unpack(pack: &BitPack, bytes: &[u8]) -> Vec<u64> {
    let total = (pack.bytes * 8) as u32;
    let unit = match pack.order {
        BitOrder::MsbFirst => BigEndian::read_uint(bytes, pack.bytes),
        BitOrder::LsbFirst => LittleEndian::read_uint(bytes, pack.bytes),
    };

    let mut consumed = 0;
    pack.fields
        .iter()
        .map(|field| {
            let shift = match pack.order {
                BitOrder::MsbFirst => total - consumed - field.width,
                BitOrder::LsbFirst => consumed,
            };
            consumed += field.width;
            (unit >> shift) & mask(field.width)
        })
        .collect()
}

/// Inverse of [`unpack`]; values wider than their field are truncated
pub fn pack(pack: &BitPack, values: &[u64]) -> Vec<u8> {
    let total = (pack.bytes * 8) as u32;
    let mut unit = 0u64;
    let mut consumed = 0;
    for (field, value) in pack.fields.iter().zip(values) {
        let shift = match pack.order {
            BitOrder::MsbFirst => total - consumed - field.width,
            BitOrder::LsbFirst => consumed,
        };
        consumed += field.width;
        unit |= (value & mask(field.width)) << shift;
    }

    let mut bytes = vec![0; pack.bytes];
    match pack.order {
        BitOrder::MsbFirst => BigEndian::write_uint(&mut bytes, unit, pack.bytes),
        BitOrder::LsbFirst => LittleEndian::write_uint(&mut bytes, unit, pack.bytes),
    }
    bytes
}
