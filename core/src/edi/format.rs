//! Fixed-width number layouts used in EDI data blocks.

use crate::math::geo::dd_to_dms;

/// Exponent notation with an explicit exponent sign and at least two
/// exponent digits (`3.0000E+01`), right-justified to `width`.
pub fn format_exp(value: f64, precision: usize, width: usize) -> String {
    let text = if value.is_nan() {
        "NAN".to_string()
    } else if value == f64::INFINITY {
        "INF".to_string()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        let raw = format!("{:.*e}", precision, value);
        match raw.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}E{}{:02}", mantissa, sign, exponent.abs())
            }
            None => raw,
        }
    };
    format!("{:>width$}", text, width = width)
}

pub fn format_fixed(value: f64, precision: usize, width: usize) -> String {
    format!("{:>width$.precision$}", value, width = width, precision = precision)
}

/// `D:M:S.SS` with the sign carried on every part.
pub fn format_dms(decimal_degrees: f64) -> String {
    let (degrees, minutes, seconds) = dd_to_dms(decimal_degrees);
    format!("{}:{}:{:4.2}", degrees as i64, minutes as i64, seconds)
}

/// Plain float text; whole numbers keep a trailing `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_layout() {
        assert_eq!(format_exp(30.0, 4, 14), "    3.0000E+01");
        assert_eq!(format_exp(-0.0123456789, 7, 18), "    -1.2345679E-02");
        assert_eq!(format_exp(1e-10, 7, 18), "     1.0000000E-10");
        assert_eq!(format_exp(0.0, 4, 14), "    0.0000E+00");
        assert_eq!(format_exp(1.5e120, 4, 14), "   1.5000E+120");
        assert_eq!(format_exp(f64::NAN, 4, 14), "           NAN");
    }

    #[test]
    fn fixed_layout() {
        assert_eq!(format_fixed(0.0, 3, 14), "         0.000");
    }

    #[test]
    fn dms_layout() {
        assert_eq!(format_dms(45.5), "45:30:0.00");
        assert_eq!(format_dms(-45.5), "-45:-30:-0.00");
        assert_eq!(format_dms(54.1234), "54:7:24.24");
    }

    #[test]
    fn float_text() {
        assert_eq!(format_float(1.01), "1.01");
        assert_eq!(format_float(3.0), "3.0");
    }
}
