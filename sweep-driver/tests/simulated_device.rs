use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use sweep_driver::mock::{pair, MockDevice};
use sweep_driver::{
    DeviceSession, DriverConfig, ErrorKind, Sample, Scan, SessionState, MOTOR_SPEED_RANGE,
};

const ROTATIONS_PER_START: u16 = 4;
/// Reads as a response header sign (`A5 5A`) on the wire.
const ANSWER_SYNC_LOOKALIKE: u16 = 23205;

/// Answers commands the way the device firmware does.
struct Simulator {
    device: MockDevice,
    running: Arc<AtomicBool>,
    motor_speed: u16,
    sample_rate: u16,
    scanning: bool,
}

impl Simulator {
    fn spawn(device: MockDevice) -> (Arc<AtomicBool>, JoinHandle<()>) {
        let running = Arc::new(AtomicBool::new(true));
        let mut simulator = Simulator {
            device,
            running: Arc::clone(&running),
            motor_speed: 5,
            sample_rate: 500,
            scanning: false,
        };
        let handle = std::thread::spawn(move || simulator.run());
        (running, handle)
    }

    fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) {
            if let Some(command) = self.device.recv_command(Duration::from_millis(10)) {
                if !self.handle(&command) {
                    return;
                }
            }
        }
    }

    fn handle(&mut self, command: &[u8]) -> bool {
        assert_eq!(command[0], 0xA5);
        let payload_u16 = || u16::from_le_bytes([command[3], command[4]]);
        match command[1] {
            0x60 => {
                if self.scanning {
                    self.device.send_status(0x01);
                    return true;
                }
                self.scanning = true;
                self.device.send_status(0x00);
                for rotation in 0..ROTATIONS_PER_START {
                    self.device.send_scan_frame(&rotation_samples(0, 10, rotation), false);
                    self.device.send_scan_frame(&rotation_samples(10, 5, rotation), true);
                }
            }
            0x65 => {
                self.scanning = false;
                self.device.send_status(0x00);
            }
            0x0D => self
                .device
                .send_response(0x21, &self.motor_speed.to_le_bytes()),
            0xA8 => {
                self.motor_speed = payload_u16();
                self.device.send_status(0x00);
            }
            0xD0 => self
                .device
                .send_response(0x22, &self.sample_rate.to_le_bytes()),
            0xD1 => {
                self.sample_rate = payload_u16();
                self.device.send_status(0x00);
            }
            0x40 => return false,
            other => panic!("unexpected command {other:#04x}"),
        }
        true
    }
}

/// The first sample carries the rotation index; the others carry distances
/// that look like response headers.
fn rotation_samples(first: u16, n: u16, rotation: u16) -> Vec<Sample> {
    (first..first + n)
        .map(|i| match i {
            0 => Sample::new(0, rotation),
            _ => Sample::new(i * 2400, ANSWER_SYNC_LOOKALIKE),
        })
        .collect()
}

fn rotation_of(scan: &Scan) -> u16 {
    scan.samples()[0].distance
}

fn start() -> (DeviceSession, MockDevice, Arc<AtomicBool>, JoinHandle<()>) {
    let (transport, device) = pair();
    let config = DriverConfig::default().with_command_timeout_ms(500);
    let session = DeviceSession::from_transport(transport, config).unwrap();
    let (running, handle) = Simulator::spawn(device.clone());
    (session, device, running, handle)
}

fn shutdown(running: Arc<AtomicBool>, handle: JoinHandle<()>) {
    running.store(false, Ordering::SeqCst);
    handle.join().unwrap();
}

#[test]
fn test_motor_speed_round_trip() {
    let (session, _device, running, handle) = start();
    for speed in MOTOR_SPEED_RANGE {
        session.set_motor_speed(speed).unwrap();
        assert_eq!(session.get_motor_speed().unwrap(), speed);
    }
    shutdown(running, handle);
}

#[test]
fn test_sample_rate_round_trip() {
    let (session, _device, running, handle) = start();
    assert_eq!(session.get_sample_rate().unwrap(), 500);
    session.set_sample_rate(1000).unwrap();
    assert_eq!(session.get_sample_rate().unwrap(), 1000);
    shutdown(running, handle);
}

#[test]
fn test_scans_pull_one_rotation_per_item() {
    let (session, _device, running, handle) = start();
    session.start_scanning().unwrap();

    let scans = session
        .scans(500)
        .take(3)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(scans.iter().map(rotation_of).collect::<Vec<_>>(), vec![0, 1, 2]);
    for scan in &scans {
        assert_eq!(scan.len(), 15);
        let angles: Vec<u16> = scan.iter().map(|s| s.angle).collect();
        let expected: Vec<u16> = (0..15).map(|i| i * 2400).collect();
        assert_eq!(angles, expected);
    }

    // Only three rotations were consumed
    let scan = session.get_scan(500).unwrap();
    assert_eq!(rotation_of(&scan), 3);

    let mut scans = session.scans(50);
    assert_eq!(scans.next().unwrap().unwrap_err().kind(), ErrorKind::Timeout);
    assert!(scans.next().is_none());

    session.stop_scanning().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);
    shutdown(running, handle);
}

#[test]
fn test_queries_while_scanning() {
    let (session, _device, running, handle) = start();
    session.start_scanning().unwrap();
    // Rotations queued ahead of the reply are skipped to reach it
    assert_eq!(session.get_motor_speed().unwrap(), 5);
    assert_eq!(session.get_sample_rate().unwrap(), 500);
    session.stop_scanning().unwrap();

    session.start_scanning().unwrap();
    session.set_motor_speed(3).unwrap();
    assert_eq!(session.get_motor_speed().unwrap(), 3);
    session.stop_scanning().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);

    session.start_scanning().unwrap();
    assert_eq!(rotation_of(&session.get_scan(500).unwrap()), 0);
    shutdown(running, handle);
}

#[test]
fn test_concurrent_callers_are_serialized() {
    let (session, _device, running, handle) = start();
    crossbeam_utils::thread::scope(|s| {
        s.spawn(|_| {
            for _ in 0..20 {
                assert_eq!(session.get_motor_speed().unwrap(), 5);
            }
        });
        s.spawn(|_| {
            for _ in 0..20 {
                assert_eq!(session.get_sample_rate().unwrap(), 500);
            }
        });
    })
    .unwrap();
    shutdown(running, handle);
}

#[test]
fn test_reset_ends_session() {
    let (session, device, running, handle) = start();
    session.reset().unwrap();
    handle.join().unwrap();
    assert_eq!(session.state(), SessionState::Destroyed);
    assert_eq!(device.close_count(), 1);
    assert_eq!(
        session.start_scanning().unwrap_err().kind(),
        ErrorKind::Connection
    );
    session.destroy();
    assert_eq!(device.close_count(), 1);
    running.store(false, Ordering::SeqCst);
}
