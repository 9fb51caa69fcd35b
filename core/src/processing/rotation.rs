use num_complex::Complex64;

use crate::prelude::StationRecord;

/// Which angle, if any, the tipper channels are rotated by.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationMode {
    #[default]
    None,
    /// One angle in degrees for the whole dataset.
    Fixed(f64),
    /// Each line is rotated by its own flight bearing.
    FlightBearing,
}

impl RotationMode {
    /// Angle to apply on a line with the given bearing; `None` when the
    /// rotation would be a no-op or the bearing is unknown.
    pub fn angle_for(&self, bearing_deg: f64) -> Option<f64> {
        let angle = match self {
            RotationMode::None => return None,
            RotationMode::Fixed(angle) => *angle,
            RotationMode::FlightBearing => bearing_deg,
        };
        (angle.is_finite() && angle != 0.0).then_some(angle)
    }
}

/// Rotates the real pair and the imaginary pair of a station by
/// `angle_deg`. Zero leaves the record untouched.
pub fn rotate_station(station: &mut StationRecord, angle_deg: f64) {
    if angle_deg == 0.0 {
        return;
    }
    let turn = Complex64::from_polar(1.0, angle_deg.to_radians());
    rotate_pair(&mut station.tzxr, &mut station.tzyr, turn);
    rotate_pair(&mut station.tzxi, &mut station.tzyi, turn);
}

fn rotate_pair(xs: &mut [f64], ys: &mut [f64], turn: Complex64) {
    for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
        let rotated = Complex64::new(*x, *y) * turn;
        *x = rotated.re;
        *y = rotated.im;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::TipperField;

    fn station() -> StationRecord {
        StationRecord {
            name: "L10_000".into(),
            latitude: 54.0,
            longitude: -122.0,
            tzxr: vec![0.1, -0.2, 0.05],
            tzyr: vec![0.3, 0.0, -0.15],
            tzxi: vec![-0.01, 0.02, 0.7],
            tzyi: vec![0.04, -0.5, 0.0],
        }
    }

    #[test]
    fn zero_angle_is_exact_identity() {
        let mut rotated = station();
        rotate_station(&mut rotated, 0.0);
        assert_eq!(rotated, station());
    }

    #[test]
    fn rotation_round_trips() {
        let original = station();
        let mut rotated = original.clone();
        rotate_station(&mut rotated, 37.5);
        assert_ne!(rotated, original);
        rotate_station(&mut rotated, -37.5);
        for field in [
            TipperField::Tzxr,
            TipperField::Tzyr,
            TipperField::Tzxi,
            TipperField::Tzyi,
        ] {
            for (a, b) in rotated.field(field).iter().zip(original.field(field)) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn quarter_turn_maps_x_onto_y() {
        let mut record = station();
        record.tzxr = vec![1.0];
        record.tzyr = vec![0.0];
        record.tzxi = vec![0.0];
        record.tzyi = vec![2.0];
        rotate_station(&mut record, 90.0);
        assert!(record.tzxr[0].abs() < 1e-12);
        assert!((record.tzyr[0] - 1.0).abs() < 1e-12);
        assert!((record.tzxi[0] + 2.0).abs() < 1e-12);
        assert!(record.tzyi[0].abs() < 1e-12);
    }

    #[test]
    fn angle_selection_by_mode() {
        assert_eq!(RotationMode::None.angle_for(30.0), None);
        assert_eq!(RotationMode::Fixed(0.0).angle_for(30.0), None);
        assert_eq!(RotationMode::Fixed(15.0).angle_for(30.0), Some(15.0));
        assert_eq!(RotationMode::FlightBearing.angle_for(30.0), Some(30.0));
        assert_eq!(RotationMode::FlightBearing.angle_for(f64::NAN), None);
    }
}
