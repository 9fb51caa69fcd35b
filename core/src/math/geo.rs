use crate::survey::Position;

pub fn planar_distance(a: &Position, b: &Position) -> f64 {
    ((a.easting - b.easting).powi(2) + (a.northing - b.northing).powi(2)).sqrt()
}

/// Splits decimal degrees into degrees, minutes and seconds.
///
/// The sign is carried on all three parts, so `-45.5` becomes
/// `(-45, -30, -0.0)`.
pub fn dd_to_dms(dd: f64) -> (f64, f64, f64) {
    let sign = if dd < 0.0 { -1.0 } else { 1.0 };
    let total_seconds = dd.abs() * 3600.0;
    let minutes = (total_seconds / 60.0).floor();
    let seconds = total_seconds - minutes * 60.0;
    let degrees = (minutes / 60.0).floor();
    let minutes = minutes - degrees * 60.0;
    (sign * degrees, sign * minutes, sign * seconds)
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from
/// north in `(-180, 180]`. Both points are `(latitude, longitude)`.
///
/// Returns NaN when the longitude does not change between the points
/// (which includes coincident points) or either point is not finite.
pub fn bearing_deg(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;
    if ![lat1, lon1, lat2, lon2].iter().all(|v| v.is_finite()) {
        return f64::NAN;
    }
    if lon1 == lon2 {
        return f64::NAN;
    }
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let delta = (lon2 - lon1).to_radians();
    let y = delta.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta.cos();
    y.atan2(x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dms_of_positive_degrees() {
        assert_eq!(dd_to_dms(45.5), (45.0, 30.0, 0.0));
    }

    #[test]
    fn dms_sign_is_carried_on_every_part() {
        let (d, m, s) = dd_to_dms(-45.5);
        assert_eq!(d, -45.0);
        assert_eq!(m, -30.0);
        assert_eq!(s.abs(), 0.0);
        assert!(s.is_sign_negative());
    }

    #[test]
    fn dms_keeps_fractional_seconds() {
        let (d, m, s) = dd_to_dms(10.2567);
        assert_eq!((d, m), (10.0, 15.0));
        assert!((s - 24.12).abs() < 1e-6);
    }

    #[test]
    fn bearing_due_east_and_west() {
        assert!((bearing_deg((0.0, 10.0), (0.0, 11.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg((0.0, 11.0), (0.0, 10.0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_without_longitude_change_is_nan() {
        assert!(bearing_deg((50.0, -120.0), (51.0, -120.0)).is_nan());
        assert!(bearing_deg((51.0, -120.0), (50.0, -120.0)).is_nan());
    }

    #[test]
    fn bearing_of_coincident_points_is_nan() {
        assert!(bearing_deg((50.0, -120.0), (50.0, -120.0)).is_nan());
        assert!(bearing_deg((f64::NAN, -120.0), (50.0, -120.0)).is_nan());
    }

    #[test]
    fn planar_distance_is_euclidean() {
        let d = planar_distance(&Position::new(0.0, 0.0), &Position::new(3.0, 4.0));
        assert_eq!(d, 5.0);
    }
}
