//! Filling transmit packets.

/// Repeat `pattern` over `packet`, truncating the last repetition.
///
/// An empty pattern leaves `packet` untouched.
pub fn tile(pattern: &[u8], packet: &mut [u8]) {
    if pattern.is_empty() {
        return;
    }
    for (dst, &src) in packet.iter_mut().zip(pattern.iter().cycle()) {
        *dst = src;
    }
}

/// Printable ramp: `0x20 + (k & 0x3f)`, i.e. `' '` through `'_'` over and over.
pub fn ramp(packet: &mut [u8]) {
    for (k, dst) in packet.iter_mut().enumerate() {
        *dst = 0x20 + (k & 0x3f) as u8;
    }
}
