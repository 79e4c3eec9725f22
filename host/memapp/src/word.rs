//! Word level arithmetic: alignment, byte order and single bit access

/// Rounds `addr` down to a multiple of `align`, which must be a power of two
pub fn align(addr: u32, align: u32) -> u32 {
    (addr.wrapping_add(align) & !(align - 1)).wrapping_sub(align)
}

/// Reverses the byte order of `value`
pub fn swap_bytes(value: u32) -> u32 {
    ((value & 0xff) << 24)
        | (((value >> 8) & 0xff) << 16)
        | (((value >> 16) & 0xff) << 8)
        | ((value >> 24) & 0xff)
}

/// Splits `value` into the four bytes shown in a listing
///
/// Most significant byte first by default; `big_endian` shows them the other way around, which
/// is the in-memory order on a little endian machine.
pub fn line_bytes(value: u32, big_endian: bool) -> [u8; 4] {
    if big_endian {
        swap_bytes(value).to_be_bytes()
    } else {
        value.to_be_bytes()
    }
}

/// Returns bit `bit` of `value`, or `None` if `bit` is not in `0..=31`
pub fn read_bit(value: u32, bit: u32) -> Option<u8> {
    if bit < 32 {
        Some(((value >> bit) & 1) as u8)
    } else {
        None
    }
}

/// Returns `value` with bit `bit` set (`set == true`) or cleared, or `None` if `bit` is not in
/// `0..=31`
pub fn write_bit(value: u32, bit: u32, set: bool) -> Option<u32> {
    if bit >= 32 {
        return None;
    }

    Some(if set {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    })
}
