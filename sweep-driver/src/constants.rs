use std::ops::RangeInclusive;

pub(crate) const HEADER_SIZE: usize = 7;
pub(crate) const FRAME_HEADER_SIZE: usize = 6;
pub(crate) const FRAME_SAMPLE_SIZE: usize = 4;

pub(crate) const LIDAR_CMD_SYNC_BYTE: u8 = 0xA5;
pub(crate) const LIDAR_ANS_SYNC_BYTE: u8 = 0x5A;
pub(crate) const LIDAR_FRAME_SYNC_BYTES: [u8; 2] = [0xAA, 0x55];

pub(crate) const LIDAR_CMD_SCAN: u8 = 0x60;
pub(crate) const LIDAR_CMD_STOP: u8 = 0x65;
pub(crate) const LIDAR_CMD_RESET: u8 = 0x40;
pub(crate) const LIDAR_CMD_GET_DEVICE_INFO: u8 = 0x90;
pub(crate) const LIDAR_CMD_GET_DEVICE_HEALTH: u8 = 0x92;
pub(crate) const LIDAR_CMD_GET_MOTOR_SPEED: u8 = 0x0D;
pub(crate) const LIDAR_CMD_SET_MOTOR_SPEED: u8 = 0xA8;
pub(crate) const LIDAR_CMD_GET_SAMPLE_RATE: u8 = 0xD0;
pub(crate) const LIDAR_CMD_SET_SAMPLE_RATE: u8 = 0xD1;

pub(crate) const LIDAR_ANS_TYPE_DEVINFO: u8 = 0x04;
pub(crate) const LIDAR_ANS_LENGTH_DEVINFO: u8 = 20;
pub(crate) const LIDAR_ANS_TYPE_DEVHEALTH: u8 = 0x06;
pub(crate) const LIDAR_ANS_LENGTH_DEVHEALTH: u8 = 3;
pub(crate) const LIDAR_ANS_TYPE_STATUS: u8 = 0x20;
pub(crate) const LIDAR_ANS_LENGTH_STATUS: u8 = 1;
pub(crate) const LIDAR_ANS_TYPE_MOTOR_SPEED: u8 = 0x21;
pub(crate) const LIDAR_ANS_TYPE_SAMPLE_RATE: u8 = 0x22;
pub(crate) const LIDAR_ANS_LENGTH_U16: u8 = 2;

pub(crate) const LIDAR_STATUS_OK: u8 = 0x00;
pub(crate) const LIDAR_STATUS_MOTOR_NOT_STABLE: u8 = 0x12;
pub(crate) const LIDAR_STATUS_MOTOR_STATIONARY: u8 = 0x13;

pub(crate) const FRAME_SCAN_COMPLETE_BIT: u8 = 0x01;
pub(crate) const MAX_ANGLE: u16 = 36000;

pub(crate) const READ_CHUNK_SIZE: usize = 512;

/// Motor speeds accepted by the device, in Hz.
pub const MOTOR_SPEED_RANGE: RangeInclusive<i32> = 0..=10;
/// Sample rates accepted by the device, in samples per second.
pub const SAMPLE_RATES: [i32; 3] = [500, 750, 1000];

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 100;
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 2000;
