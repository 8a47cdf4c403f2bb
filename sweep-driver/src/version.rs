use crate::error::SweepError;

pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 0;

/// Major revision of the wire protocol spoken by the codec.
pub(crate) const PROTOCOL_VERSION_MAJOR: u32 = 1;

/// Driver version packed as `major << 16 | minor`.
pub fn get_version() -> u32 {
    (VERSION_MAJOR << 16) | VERSION_MINOR
}

/// Whether this driver build can talk the protocol revision its codec implements.
///
/// This checks the driver against its own codec, not the device firmware.
pub fn is_abi_compatible() -> bool {
    is_compatible_with(get_version())
}

fn is_compatible_with(version: u32) -> bool {
    version >> 16 == PROTOCOL_VERSION_MAJOR
}

pub(crate) fn ensure_abi_compatible(version: u32) -> Result<(), SweepError> {
    if is_compatible_with(version) {
        return Ok(());
    }
    Err(SweepError::IncompatibleAbi {
        driver: version,
        protocol: PROTOCOL_VERSION_MAJOR,
    })
}
