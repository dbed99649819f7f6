//! Mark parsing
//!
//! Marks come in three shapes: clock times (`"1:43.21"`, `"2:08:05"`),
//! plain decimals for distances and times under a minute (`"9.58"`,
//! `"8.95"`), and integer points for combined events (`"9126"`). Hand-timed
//! results carry a trailing `h` (`"10.0h"`).

/// Sentinel for marks that cannot be interpreted
pub const UNPARSEABLE: f64 = f64::INFINITY;

/// Convert a raw mark to a sortable number
///
/// Clock times become total seconds. Anything malformed, negative or
/// non-finite yields [`UNPARSEABLE`].
pub fn parse_mark(raw: &str) -> f64 {
    let mark = raw.trim().to_lowercase();
    let mark = mark.strip_suffix('h').unwrap_or(&mark).trim_end();

    let value = if mark.contains(':') {
        parse_clock(mark)
    } else {
        mark.parse::<f64>().ok()
    };

    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => UNPARSEABLE,
    }
}

/// `M:SS(.ff)` or `H:MM:SS(.ff)`
fn parse_clock(mark: &str) -> Option<f64> {
    let parts = mark
        .split(':')
        .map(|p| p.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    match parts.as_slice() {
        [m, s] => Some(m * 60.0 + s),
        [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
        _ => None,
    }
}
