pub mod device_info;
pub mod scan;

pub use device_info::DeviceInfo;
pub use scan::{Sample, Scan};
