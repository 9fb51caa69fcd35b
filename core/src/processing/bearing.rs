use crate::math::geo::bearing_deg;

/// Flight bearing of a line in degrees clockwise from north.
///
/// Uses the end samples first and walks inward, one sample from each end
/// at a time, until a finite bearing comes out. NaN if none does.
pub fn line_bearing(latitude: &[f64], longitude: &[f64]) -> f64 {
    let count = latitude.len().min(longitude.len());
    if count < 2 {
        return f64::NAN;
    }
    let (mut first, mut last) = (0, count - 1);
    while first < last {
        let bearing = bearing_deg(
            (latitude[first], longitude[first]),
            (latitude[last], longitude[last]),
        );
        if bearing.is_finite() {
            return bearing;
        }
        first += 1;
        last -= 1;
    }
    f64::NAN
}
