#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identification block returned by the device on request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    pub model_number: u8,
    pub firmware_major_version: u8,
    pub firmware_minor_version: u8,
    pub hardware_version: u8,
    pub serial_number: [u8; 16],
}

impl DeviceInfo {
    /// Serial number rendered as upper-case hex, as printed on the device label.
    pub fn serial_number_string(&self) -> String {
        self.serial_number
            .iter()
            .map(|e| format!("{:02X}", e))
            .collect::<String>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_number_string() {
        let info = DeviceInfo {
            model_number: 1,
            firmware_major_version: 1,
            firmware_minor_version: 0,
            hardware_version: 2,
            serial_number: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0xFF],
        };
        assert_eq!(info.serial_number_string(), "000102030405060708090A0B0C0D0EFF");
    }
}
