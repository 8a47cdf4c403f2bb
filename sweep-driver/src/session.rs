use crate::config::DriverConfig;
use crate::constants::{
    HEADER_SIZE, LIDAR_ANS_LENGTH_DEVHEALTH, LIDAR_ANS_LENGTH_DEVINFO, LIDAR_ANS_LENGTH_STATUS,
    LIDAR_ANS_LENGTH_U16, LIDAR_ANS_TYPE_DEVHEALTH, LIDAR_ANS_TYPE_DEVINFO,
    LIDAR_ANS_TYPE_MOTOR_SPEED, LIDAR_ANS_TYPE_SAMPLE_RATE, LIDAR_ANS_TYPE_STATUS,
    LIDAR_CMD_GET_DEVICE_HEALTH, LIDAR_CMD_GET_DEVICE_INFO, LIDAR_CMD_GET_MOTOR_SPEED,
    LIDAR_CMD_GET_SAMPLE_RATE, LIDAR_CMD_RESET, LIDAR_CMD_SCAN, LIDAR_CMD_SET_MOTOR_SPEED,
    LIDAR_CMD_SET_SAMPLE_RATE, LIDAR_CMD_STOP, MOTOR_SPEED_RANGE, READ_CHUNK_SIZE, SAMPLE_RATES,
};
use crate::error::{Result, SweepError};
use crate::numeric::le_u16;
use crate::packet::{
    decode_scan_frame, decode_status, encode_command, encode_command_with_payload,
    err_if_checksum_mismatched, find_frame_header, find_packet_start, known_response_length,
    sendable_frame_range, validate_response_header, PacketStart, ScanFrame,
};
use crate::serial::SerialTransport;
use crate::stream::{ScanSource, ScanStream};
use crate::time::Deadline;
use crate::transport::Transport;
use crate::version::{ensure_abi_compatible, get_version};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::time::Duration;
use sweep_data::{DeviceInfo, Scan};

/// Lifecycle of a [`DeviceSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Constructed,
    Scanning,
    Stopped,
    Destroyed,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Constructed => "constructed",
            SessionState::Scanning => "scanning",
            SessionState::Stopped => "stopped",
            SessionState::Destroyed => "destroyed",
        }
    }
}

/// Connection to one device.
///
/// All methods take `&self`; an internal lock makes every call one critical
/// section over the link, so the session can be shared between threads while
/// commands and scan reads never interleave mid-frame.
///
/// The transport is released by [`DeviceSession::destroy`], by
/// [`DeviceSession::reset`], or when the session is dropped.
pub struct DeviceSession {
    inner: Mutex<Link>,
    config: DriverConfig,
}

struct Link {
    transport: Option<Box<dyn Transport>>,
    state: SessionState,
    buffer: VecDeque<u8>,
}

impl DeviceSession {
    /// Opens the serial port named in `config`.
    ///
    /// # Errors
    ///
    /// * Compatibility error if this driver build is not ABI compatible.
    /// * Connection error if the port cannot be opened.
    pub fn construct(config: DriverConfig) -> Result<DeviceSession> {
        ensure_abi_compatible(get_version())?;
        let transport = SerialTransport::open(&config)?;
        Ok(DeviceSession::new(Box::new(transport), config))
    }

    /// Builds a session over a transport opened by the caller.
    pub fn from_transport<T: Transport + 'static>(
        transport: T,
        config: DriverConfig,
    ) -> Result<DeviceSession> {
        DeviceSession::from_transport_with_version(transport, config, get_version())
    }

    pub(crate) fn from_transport_with_version<T: Transport + 'static>(
        transport: T,
        config: DriverConfig,
        version: u32,
    ) -> Result<DeviceSession> {
        ensure_abi_compatible(version)?;
        Ok(DeviceSession::new(Box::new(transport), config))
    }

    fn new(transport: Box<dyn Transport>, config: DriverConfig) -> DeviceSession {
        DeviceSession {
            inner: Mutex::new(Link {
                transport: Some(transport),
                state: SessionState::Constructed,
                buffer: VecDeque::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    fn lock(&self) -> Result<MutexGuard<'_, Link>> {
        let link = self.inner.lock();
        if link.state == SessionState::Destroyed {
            return Err(SweepError::SessionClosed);
        }
        Ok(link)
    }

    pub fn start_scanning(&self) -> Result<()> {
        let mut link = self.lock()?;
        if link.state == SessionState::Scanning {
            return Err(SweepError::InvalidState {
                operation: "start scanning",
                state: link.state.name(),
            });
        }
        link.buffer.clear();
        link.command_with_ack(&self.config, LIDAR_CMD_SCAN, &encode_command(LIDAR_CMD_SCAN))?;
        link.state = SessionState::Scanning;
        log::info!("Scanning started");
        Ok(())
    }

    pub fn stop_scanning(&self) -> Result<()> {
        let mut link = self.lock()?;
        if link.state != SessionState::Scanning {
            return Err(SweepError::InvalidState {
                operation: "stop scanning",
                state: link.state.name(),
            });
        }
        link.command_with_ack(&self.config, LIDAR_CMD_STOP, &encode_command(LIDAR_CMD_STOP))?;
        // Frames that raced the acknowledgement are stale now
        link.buffer.clear();
        link.state = SessionState::Stopped;
        log::info!("Scanning stopped");
        Ok(())
    }

    /// Motor speed in Hz.
    pub fn get_motor_speed(&self) -> Result<i32> {
        let mut link = self.lock()?;
        let speed = link.query_u16(
            &self.config,
            LIDAR_CMD_GET_MOTOR_SPEED,
            LIDAR_ANS_TYPE_MOTOR_SPEED,
        )?;
        Ok(speed.into())
    }

    /// Sets the motor speed in Hz, within [`MOTOR_SPEED_RANGE`].
    pub fn set_motor_speed(&self, speed: i32) -> Result<()> {
        let mut link = self.lock()?;
        let speed = validate_motor_speed(speed)?;
        let request = encode_command_with_payload(LIDAR_CMD_SET_MOTOR_SPEED, &speed.to_le_bytes());
        link.command_with_ack(&self.config, LIDAR_CMD_SET_MOTOR_SPEED, &request)
    }

    /// Samples per second the device is configured for.
    pub fn get_sample_rate(&self) -> Result<i32> {
        let mut link = self.lock()?;
        let rate = link.query_u16(
            &self.config,
            LIDAR_CMD_GET_SAMPLE_RATE,
            LIDAR_ANS_TYPE_SAMPLE_RATE,
        )?;
        Ok(rate.into())
    }

    /// Sets the sample rate to one of [`SAMPLE_RATES`].
    pub fn set_sample_rate(&self, rate: i32) -> Result<()> {
        let mut link = self.lock()?;
        let rate = validate_sample_rate(rate)?;
        let request = encode_command_with_payload(LIDAR_CMD_SET_SAMPLE_RATE, &rate.to_le_bytes());
        link.command_with_ack(&self.config, LIDAR_CMD_SET_SAMPLE_RATE, &request)
    }

    pub fn get_device_info(&self) -> Result<DeviceInfo> {
        let mut link = self.lock()?;
        let info = link.exchange(
            &self.config,
            &encode_command(LIDAR_CMD_GET_DEVICE_INFO),
            LIDAR_ANS_LENGTH_DEVINFO,
            LIDAR_ANS_TYPE_DEVINFO,
        )?;
        let mut serial_number = [0u8; 16];
        serial_number.copy_from_slice(&info[4..20]);
        Ok(DeviceInfo {
            model_number: info[0],
            firmware_major_version: info[2],
            firmware_minor_version: info[1],
            hardware_version: info[3],
            serial_number,
        })
    }

    pub fn check_device_health(&self) -> Result<()> {
        let mut link = self.lock()?;
        let health = link.exchange(
            &self.config,
            &encode_command(LIDAR_CMD_GET_DEVICE_HEALTH),
            LIDAR_ANS_LENGTH_DEVHEALTH,
            LIDAR_ANS_TYPE_DEVHEALTH,
        )?;
        match health[0] {
            0 => Ok(()),
            _ => Err(SweepError::DeviceHealthError(health[0].into())),
        }
    }

    /// Reboots the device.
    ///
    /// The link is released afterwards whether or not the command could be
    /// sent; build a new session to talk to the device again.
    pub fn reset(&self) -> Result<()> {
        let mut link = self.lock()?;
        let sent = link.send(&self.config, &encode_command(LIDAR_CMD_RESET));
        link.release();
        log::info!("Device reset, session closed");
        sent
    }

    /// Blocks until one full rotation is received or `timeout_ms` elapses.
    ///
    /// Samples of an unfinished rotation are never returned: on timeout or a
    /// malformed frame they are dropped together with the buffered bytes.
    pub fn get_scan(&self, timeout_ms: u64) -> Result<Scan> {
        let mut link = self.lock()?;
        let deadline = Deadline::after_ms(timeout_ms);
        let mut samples = Vec::new();
        loop {
            match link.next_frame()? {
                Some(frame) => {
                    samples.extend(frame.samples);
                    if frame.complete {
                        return Ok(Scan::new(samples));
                    }
                }
                None => {
                    if deadline.expired() {
                        log::debug!(
                            "Scan timed out, discarding {} samples and {} bytes",
                            samples.len(),
                            link.buffer.len()
                        );
                        link.buffer.clear();
                        return Err(SweepError::TimeoutError(deadline.timeout_ms()));
                    }
                    link.fill_buffer(deadline)?;
                }
            }
        }
    }

    /// Lazily yields scans, calling [`DeviceSession::get_scan`] once per item.
    pub fn scans(&self, timeout_ms: u64) -> ScanStream<'_, DeviceSession> {
        ScanStream::new(self, timeout_ms)
    }

    /// Releases the link. Calling it again does nothing.
    pub fn destroy(&self) {
        self.inner.lock().release();
    }
}

impl ScanSource for DeviceSession {
    fn get_scan(&self, timeout_ms: u64) -> Result<Scan> {
        DeviceSession::get_scan(self, timeout_ms)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl Link {
    fn transport(&mut self) -> Result<&mut Box<dyn Transport>> {
        self.transport.as_mut().ok_or(SweepError::SessionClosed)
    }

    fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            log::info!("Device session destroyed");
        }
        self.buffer.clear();
        self.state = SessionState::Destroyed;
    }

    fn send(&mut self, config: &DriverConfig, data: &[u8]) -> Result<()> {
        log::debug!("Sending command {:02X?}", data);
        let timeout = Duration::from_millis(config.write_timeout_ms);
        self.transport()?.write(data, timeout)
    }

    fn fill_buffer(&mut self, deadline: Deadline) -> Result<()> {
        let remaining = deadline.remaining();
        let data = self.transport()?.read(READ_CHUNK_SIZE, remaining)?;
        self.buffer.extend(data);
        Ok(())
    }

    /// Drops everything before index `n`, keeping the buffer aligned on a header.
    fn discard(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        log::debug!("Discarding {} unexpected bytes", n);
        self.buffer.drain(..n);
    }

    /// Drops bytes that cannot start a header while keeping a possible
    /// first header byte at the end.
    fn discard_all_but_last(&mut self) {
        let n = self.buffer.len().saturating_sub(1);
        self.discard(n);
    }

    /// Waits for the response of `type_code`.
    ///
    /// Scan-data frames and complete responses of other types ahead of it are
    /// skipped. A malformed header only loses its first byte; it is reported
    /// if nothing valid follows before the deadline.
    fn read_response(&mut self, length: u8, type_code: u8, deadline: Deadline) -> Result<Vec<u8>> {
        let mut malformed = None;
        loop {
            match self.next_response(length, type_code) {
                Ok(Some(payload)) => return Ok(payload),
                Ok(None) => (),
                Err(e) => {
                    log::debug!("{}, searching for the next header", e);
                    self.discard(1);
                    malformed = Some(e);
                    continue;
                }
            }
            if deadline.expired() {
                self.buffer.clear();
                return Err(malformed.unwrap_or(SweepError::TimeoutError(deadline.timeout_ms())));
            }
            self.fill_buffer(deadline)?;
        }
    }

    /// Takes the expected response out of the buffer once it is complete.
    fn next_response(&mut self, length: u8, type_code: u8) -> Result<Option<Vec<u8>>> {
        loop {
            match find_packet_start(&self.buffer) {
                Some(PacketStart::ScanFrame(start_index)) => {
                    self.discard(start_index);
                    if !self.skip_scan_frame() {
                        return Ok(None);
                    }
                    continue;
                }
                Some(PacketStart::Response(start_index)) => self.discard(start_index),
                None => {
                    self.discard_all_but_last();
                    return Ok(None);
                }
            }
            if self.buffer.len() < HEADER_SIZE {
                return Ok(None);
            }
            let header = self.buffer.range(..HEADER_SIZE).copied().collect::<Vec<_>>();
            let (found_length, found_type) = (header[2], header[6]);
            if found_type != type_code && known_response_length(found_type) == Some(found_length) {
                // late answer to an earlier command
                let response_size = HEADER_SIZE + found_length as usize;
                if self.buffer.len() < response_size {
                    return Ok(None);
                }
                log::debug!("Skipping stale response of type {:#04x}", found_type);
                self.buffer.drain(..response_size);
                continue;
            }
            validate_response_header(&header, Some(length), type_code)?;
            if self.buffer.len() < HEADER_SIZE + length as usize {
                return Ok(None);
            }
            self.buffer.drain(..HEADER_SIZE);
            return Ok(Some(self.buffer.drain(..length as usize).collect()));
        }
    }

    /// Drops the scan-data frame at the front of the buffer.
    ///
    /// Returns false while the frame is not fully buffered. A frame failing
    /// its checksum was a false header sign and only loses its first byte.
    fn skip_scan_frame(&mut self) -> bool {
        let n_frame_bytes = match sendable_frame_range(&self.buffer) {
            Some((_, n_frame_bytes)) => n_frame_bytes,
            None => return false,
        };
        if self.buffer.len() < n_frame_bytes {
            return false;
        }
        let frame = self.buffer.range(..n_frame_bytes).copied().collect::<Vec<_>>();
        match err_if_checksum_mismatched(&frame) {
            Ok(()) => self.discard(n_frame_bytes),
            Err(_) => self.discard(1),
        }
        true
    }

    fn exchange(
        &mut self,
        config: &DriverConfig,
        request: &[u8],
        length: u8,
        type_code: u8,
    ) -> Result<Vec<u8>> {
        self.send(config, request)?;
        let deadline = Deadline::after_ms(config.command_timeout_ms);
        self.read_response(length, type_code, deadline)
    }

    fn command_with_ack(&mut self, config: &DriverConfig, command: u8, request: &[u8]) -> Result<()> {
        let status = self.exchange(config, request, LIDAR_ANS_LENGTH_STATUS, LIDAR_ANS_TYPE_STATUS)?;
        decode_status(command, status[0])
    }

    fn query_u16(&mut self, config: &DriverConfig, command: u8, type_code: u8) -> Result<u16> {
        let value = self.exchange(
            config,
            &encode_command(command),
            LIDAR_ANS_LENGTH_U16,
            type_code,
        )?;
        Ok(le_u16(&value, 0))
    }

    /// Takes the next complete scan-data frame out of the buffer, if any.
    fn next_frame(&mut self) -> Result<Option<ScanFrame>> {
        match find_frame_header(&self.buffer) {
            Some(start_index) => self.discard(start_index),
            None => {
                self.discard_all_but_last();
                return Ok(None);
            }
        }
        let (_, n_frame_bytes) = match sendable_frame_range(&self.buffer) {
            Some(range) => range,
            None => return Ok(None),
        };
        if self.buffer.len() < n_frame_bytes {
            // insufficient buffer size to extract a frame
            return Ok(None);
        }
        let frame = self.buffer.drain(..n_frame_bytes).collect::<Vec<_>>();
        decode_scan_frame(&frame).map(Some)
    }
}

fn validate_motor_speed(speed: i32) -> Result<u16> {
    if !MOTOR_SPEED_RANGE.contains(&speed) {
        return Err(SweepError::OutOfRange {
            name: "Motor speed",
            expected: format!(
                "within {}..={} Hz",
                MOTOR_SPEED_RANGE.start(),
                MOTOR_SPEED_RANGE.end()
            ),
            value: speed,
        });
    }
    Ok(speed as u16)
}

fn validate_sample_rate(rate: i32) -> Result<u16> {
    if !SAMPLE_RATES.contains(&rate) {
        return Err(SweepError::OutOfRange {
            name: "Sample rate",
            expected: format!("one of {:?} samples per second", SAMPLE_RATES),
            value: rate,
        });
    }
    Ok(rate as u16)
}
