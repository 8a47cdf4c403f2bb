#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of angle units in one degree. Angles are reported in centi-degrees.
pub const ANGLE_UNITS_PER_DEGREE: u16 = 100;

/// One range reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Beam angle in centi-degrees, in `0..36000`.
    pub angle: u16,
    /// Distance to an object in millimeters.
    pub distance: u16,
}

impl Sample {
    pub fn new(angle: u16, distance: u16) -> Sample {
        Sample { angle, distance }
    }

    pub fn angle_degree(&self) -> f64 {
        (self.angle as f64) / (ANGLE_UNITS_PER_DEGREE as f64)
    }

    pub fn angle_radian(&self) -> f64 {
        self.angle_degree() * std::f64::consts::PI / 180.
    }
}

/// Struct to hold one rotation of lidar scan data.
///
/// Samples keep the order in which the device reported them. A scan is
/// read-only once the driver has assembled it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scan {
    samples: Vec<Sample>,
}

impl Scan {
    pub fn new(samples: Vec<Sample>) -> Scan {
        Scan { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl IntoIterator for Scan {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Scan {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_conversion() {
        let sample = Sample::new(9000, 1200);
        assert!(f64::abs(sample.angle_degree() - 90.) < 1e-12);
        assert!(f64::abs(sample.angle_radian() - std::f64::consts::FRAC_PI_2) < 1e-12);

        let sample = Sample::new(35999, 10);
        assert!(f64::abs(sample.angle_degree() - 359.99) < 1e-9);
    }

    #[test]
    fn test_scan_keeps_order() {
        let scan = Scan::new(vec![Sample::new(300, 1), Sample::new(100, 2), Sample::new(200, 3)]);
        assert_eq!(scan.len(), 3);
        let angles: Vec<u16> = scan.iter().map(|s| s.angle).collect();
        assert_eq!(angles, vec![300, 100, 200]);
        let distances: Vec<u16> = scan.into_iter().map(|s| s.distance).collect();
        assert_eq!(distances, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_scan() {
        let scan = Scan::default();
        assert!(scan.is_empty());
        assert!(scan.samples().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_scan_serializes_samples() {
        let scan = Scan::new(vec![Sample::new(4500, 2000)]);
        let json = serde_json::to_string(&scan).unwrap();
        assert_eq!(json, r#"{"samples":[{"angle":4500,"distance":2000}]}"#);
    }
}
