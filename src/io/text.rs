//! Number formatting for the text formats.
//!
//! OFF and TetGen files are written with a given number of significant
//! digits, using the shortest of fixed and scientific notation like C's `%g`
//! conversion. Rust's `{}` for floats does not offer that, so it's done here.

use std::fmt;


/// Displays a float like `printf("%.*g", precision, value)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct G(pub f64, pub usize);

impl fmt::Display for G {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let G(v, precision) = *self;

        if v == 0.0 {
            return f.write_str(if v.is_sign_negative() { "-0" } else { "0" });
        }
        if v.is_nan() {
            return f.write_str("nan");
        }
        if v.is_infinite() {
            return f.write_str(if v < 0.0 { "-inf" } else { "inf" });
        }

        let p = precision.max(1);

        // The exponent is taken after rounding to `p` significant digits.
        let sci = format!("{:.*e}", p - 1, v);
        let (mantissa, exp) = match sci.find('e') {
            Some(pos) => (&sci[..pos], sci[pos + 1..].parse::<i32>().unwrap_or(0)),
            None => (&sci[..], 0),
        };

        if exp < -4 || exp >= p as i32 {
            let sign = if exp < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", strip_zeros(mantissa), sign, exp.abs())
        } else {
            let decimals = (p as i32 - 1 - exp) as usize;
            let fixed = format!("{:.*}", decimals, v);
            f.write_str(strip_zeros(&fixed))
        }
    }
}

/// Removes trailing zeros after the decimal point, and the point itself if
/// nothing is left after it.
fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
