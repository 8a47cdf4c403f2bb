pub(crate) fn to_u16(a: u8, b: u8) -> u16 {
    ((a as u16) << 8) + (b as u16)
}

/// Reads a little-endian u16 starting at `index`.
pub(crate) fn le_u16(data: &[u8], index: usize) -> u16 {
    to_u16(data[index + 1], data[index])
}

pub(crate) fn xor_bytes(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, e| acc ^ e)
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u16() {
        assert_eq!(to_u16(0x12, 0x34), 0x1234);
        assert_eq!(le_u16(&[0x00, 0x34, 0x12], 1), 0x1234);
    }

    #[test]
    fn test_xor_bytes() {
        assert_eq!(xor_bytes(&[]), 0);
        assert_eq!(xor_bytes(&[0xA5, 0xA8, 0x02, 0x05, 0x00]), 0xA5 ^ 0xA8 ^ 0x02 ^ 0x05);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&[0xA5, 0x5A, 0x03]), "A5 5A 03");
    }
}
