//! Number rendering for the debug grammar.
//!
//! Floats are printed the way the historical string format expects: plain
//! decimal notation with at least one fractional digit for magnitudes in
//! `[1e-3, 1e7)`, and `d.dddE<exp>` otherwise.

/// Renders `value` as `1.0`, `0.001`, `1.0E7`, `1.5E-4`, ...
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let mut out = format!("{value}");
        if !out.contains('.') {
            out.push_str(".0");
        }
        return out;
    }

    let sci = format!("{value:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.to_string()
    } else {
        format!("{mantissa}.0")
    };
    format!("{mantissa}E{exponent}")
}

/// Six-decimal rendering used by the human-readable form.
pub fn format_double_fixed(value: f64) -> String {
    format!("{value:.6}")
}
