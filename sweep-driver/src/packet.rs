use crate::constants::{
    FRAME_HEADER_SIZE, FRAME_SAMPLE_SIZE, FRAME_SCAN_COMPLETE_BIT, HEADER_SIZE,
    LIDAR_ANS_LENGTH_DEVHEALTH, LIDAR_ANS_LENGTH_DEVINFO, LIDAR_ANS_LENGTH_STATUS,
    LIDAR_ANS_LENGTH_U16, LIDAR_ANS_SYNC_BYTE, LIDAR_ANS_TYPE_DEVHEALTH, LIDAR_ANS_TYPE_DEVINFO,
    LIDAR_ANS_TYPE_MOTOR_SPEED, LIDAR_ANS_TYPE_SAMPLE_RATE, LIDAR_ANS_TYPE_STATUS,
    LIDAR_CMD_SYNC_BYTE, LIDAR_FRAME_SYNC_BYTES, LIDAR_STATUS_MOTOR_NOT_STABLE,
    LIDAR_STATUS_MOTOR_STATIONARY, LIDAR_STATUS_OK, MAX_ANGLE,
};
use crate::error::SweepError;
use crate::numeric::{le_u16, to_string, to_u16, xor_bytes};
use std::collections::VecDeque;
use sweep_data::Sample;

/// Samples carried by one scan-data frame.
#[derive(Debug, PartialEq)]
pub(crate) struct ScanFrame {
    pub(crate) samples: Vec<Sample>,
    pub(crate) complete: bool,
}

pub(crate) fn encode_command(command: u8) -> [u8; 2] {
    [LIDAR_CMD_SYNC_BYTE, command]
}

pub(crate) fn encode_command_with_payload(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.push(LIDAR_CMD_SYNC_BYTE);
    data.push(command);
    data.push(payload.len() as u8);
    data.extend_from_slice(payload);
    data.push(xor_bytes(&data));
    data
}

/// Device side of [`validate_response_header`]. Used by the mock device.
pub(crate) fn encode_response(type_code: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![
        LIDAR_CMD_SYNC_BYTE,
        LIDAR_ANS_SYNC_BYTE,
        payload.len() as u8,
        0x00,
        0x00,
        0x00,
        type_code,
    ];
    data.extend_from_slice(payload);
    data
}

pub(crate) fn validate_response_header(
    header: &[u8],
    maybe_response_length: Option<u8>,
    type_code: u8,
) -> Result<(), SweepError> {
    if header.len() != HEADER_SIZE {
        return Err(SweepError::InvalidHeaderLength(header.len()));
    }
    if header[0..2] != [LIDAR_CMD_SYNC_BYTE, LIDAR_ANS_SYNC_BYTE] {
        return Err(SweepError::InvalidMagicNumber(to_string(&header[0..2])));
    }
    if let Some(len) = maybe_response_length {
        if header[2] != len {
            return Err(SweepError::InvalidResponseLength(
                len.into(),
                header[2].into(),
            ));
        }
    }
    if header[6] != type_code {
        return Err(SweepError::InvalidTypeCode(
            type_code.into(),
            header[6].into(),
        ));
    }
    Ok(())
}

/// Start of the next packet sent by the device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PacketStart {
    Response(usize),
    ScanFrame(usize),
}

/// Index and kind of the first response header or scan-data frame header in
/// `buffer`, whichever comes first.
pub(crate) fn find_packet_start(buffer: &VecDeque<u8>) -> Option<PacketStart> {
    let [f0, f1] = LIDAR_FRAME_SYNC_BYTES;
    (0..buffer.len().saturating_sub(1)).find_map(|i| match (buffer[i], buffer[i + 1]) {
        (LIDAR_CMD_SYNC_BYTE, LIDAR_ANS_SYNC_BYTE) => Some(PacketStart::Response(i)),
        (e0, e1) if e0 == f0 && e1 == f1 => Some(PacketStart::ScanFrame(i)),
        _ => None,
    })
}

/// Payload length of each response type the device sends.
pub(crate) fn known_response_length(type_code: u8) -> Option<u8> {
    match type_code {
        LIDAR_ANS_TYPE_STATUS => Some(LIDAR_ANS_LENGTH_STATUS),
        LIDAR_ANS_TYPE_DEVINFO => Some(LIDAR_ANS_LENGTH_DEVINFO),
        LIDAR_ANS_TYPE_DEVHEALTH => Some(LIDAR_ANS_LENGTH_DEVHEALTH),
        LIDAR_ANS_TYPE_MOTOR_SPEED | LIDAR_ANS_TYPE_SAMPLE_RATE => Some(LIDAR_ANS_LENGTH_U16),
        _ => None,
    }
}

pub(crate) fn decode_status(command: u8, status: u8) -> Result<(), SweepError> {
    match status {
        LIDAR_STATUS_OK => Ok(()),
        LIDAR_STATUS_MOTOR_NOT_STABLE | LIDAR_STATUS_MOTOR_STATIONARY => {
            Err(SweepError::DeviceFault(status))
        }
        _ => Err(SweepError::CommandRejected { command, status }),
    }
}

fn find_pair(buffer: &VecDeque<u8>, e0: u8, e1: u8) -> Option<usize> {
    if buffer.len() < 2 {
        return None;
    }
    (0..(buffer.len() - 1)).find(|&i| buffer[i] == e0 && buffer[i + 1] == e1)
}

/// Index of the first scan-data frame header in `buffer`.
pub(crate) fn find_frame_header(buffer: &VecDeque<u8>) -> Option<usize> {
    let [e0, e1] = LIDAR_FRAME_SYNC_BYTES;
    find_pair(buffer, e0, e1)
}

fn get_frame_size(buffer: &VecDeque<u8>, start_index: usize) -> Option<usize> {
    let n_samples = buffer.get(start_index + 3)?;
    Some(FRAME_HEADER_SIZE + (*n_samples as usize) * FRAME_SAMPLE_SIZE)
}

/// Start index and byte length of the next scan-data frame in `buffer`.
///
/// The frame may not be fully buffered yet; callers compare the length with
/// what they hold.
pub(crate) fn sendable_frame_range(buffer: &VecDeque<u8>) -> Option<(usize, usize)> {
    let start_index = find_frame_header(buffer)?;
    let frame_size = get_frame_size(buffer, start_index)?;
    Some((start_index, frame_size))
}

pub(crate) fn n_frame_samples(frame: &[u8]) -> usize {
    frame[3] as usize
}

pub(crate) fn sample_index(idx: usize) -> usize {
    FRAME_HEADER_SIZE + idx * FRAME_SAMPLE_SIZE
}

pub(crate) fn calc_checksum(frame: &[u8]) -> u16 {
    let mut checksum: u16 = to_u16(frame[1], frame[0]);
    checksum ^= to_u16(frame[3], frame[2]);
    for i in 0..n_frame_samples(frame) {
        let s = sample_index(i);
        checksum ^= le_u16(frame, s);
        checksum ^= le_u16(frame, s + 2);
    }
    checksum
}

pub(crate) fn err_if_checksum_mismatched(frame: &[u8]) -> Result<(), SweepError> {
    let calculated = calc_checksum(frame);
    let expected = le_u16(frame, 4);
    match calculated != expected {
        true => Err(SweepError::ChecksumMismatch(expected, calculated)),
        false => Ok(()),
    }
}

fn fault_code(frame: &[u8]) -> u8 {
    frame[2] >> 1
}

fn is_scan_complete(frame: &[u8]) -> bool {
    frame[2] & FRAME_SCAN_COMPLETE_BIT == FRAME_SCAN_COMPLETE_BIT
}

pub(crate) fn decode_scan_frame(frame: &[u8]) -> Result<ScanFrame, SweepError> {
    err_if_checksum_mismatched(frame)?;
    match fault_code(frame) {
        0 => (),
        code => return Err(SweepError::DeviceFault(code)),
    }
    let samples = (0..n_frame_samples(frame))
        .map(|i| {
            let s = sample_index(i);
            let angle = le_u16(frame, s);
            if angle >= MAX_ANGLE {
                return Err(SweepError::InvalidAngle(angle));
            }
            Ok(Sample::new(angle, le_u16(frame, s + 2)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ScanFrame {
        samples,
        complete: is_scan_complete(frame),
    })
}

/// Device side of [`decode_scan_frame`]. Used by the mock device.
pub(crate) fn encode_scan_frame(complete: bool, fault: u8, samples: &[Sample]) -> Vec<u8> {
    let ct = (fault << 1) | if complete { FRAME_SCAN_COMPLETE_BIT } else { 0 };
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + samples.len() * FRAME_SAMPLE_SIZE);
    frame.extend_from_slice(&LIDAR_FRAME_SYNC_BYTES);
    frame.push(ct);
    frame.push(samples.len() as u8);
    frame.extend_from_slice(&[0x00, 0x00]);
    for sample in samples {
        frame.extend_from_slice(&sample.angle.to_le_bytes());
        frame.extend_from_slice(&sample.distance.to_le_bytes());
    }
    let checksum = calc_checksum(&frame);
    frame[4..6].copy_from_slice(&checksum.to_le_bytes());
    frame
}
