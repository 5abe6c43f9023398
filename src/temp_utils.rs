//! Utilities for temperature conversion, fluid energy transfer,
//! and formatting simulated time for reports.

use crate::constants::TO_KELVIN;

/// Converts Celsius to Kelvin.
pub fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + TO_KELVIN
}

/// Converts Kelvin to Celsius.
pub fn kelvin_to_celsius(temp_k: f64) -> f64 {
    temp_k - TO_KELVIN
}

/// Converts Celsius to Fahrenheit.
pub fn celsius_to_fahrenheit(temp_c: f64) -> f64 {
    temp_c * 9.0 / 5.0 + 32.0
}

/// Rate of thermal energy carried by a fluid stream (W).
///
/// # Arguments
/// - `mass_flow_rate_kg_s`: Mass flow rate in kg/s
/// - `specific_heat_j_per_kg_k`: Specific heat capacity in J/(kg·K)
/// - `temp_difference_c`: Temperature difference across the stream in °C
pub fn energy_transfer_rate(
    mass_flow_rate_kg_s: f64,
    specific_heat_j_per_kg_k: f64,
    temp_difference_c: f64,
) -> f64 {
    mass_flow_rate_kg_s * specific_heat_j_per_kg_k * temp_difference_c
}

/// Formats a minute-of-day value as HH:MM:SS.
pub fn minutes_to_hhmmss(minutes: f64) -> String {
    let total_seconds = (minutes * 60.0).floor() as u64;

    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// Formats a millisecond duration with an appropriate unit (ms, s, min, or hr).
pub fn format_milliseconds(milliseconds: f64) -> String {
    let abs_ms = milliseconds.abs();

    if abs_ms < 1000.0 {
        format!("{:.2} ms", milliseconds)
    } else if abs_ms < 60_000.0 {
        format!("{:.2} s", milliseconds / 1000.0)
    } else if abs_ms < 3_600_000.0 {
        format!("{:.2} min", milliseconds / 60_000.0)
    } else {
        format!("{:.2} hr", milliseconds / 3_600_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn celsius_kelvin_round_trip() {
        assert_abs_diff_eq!(celsius_to_kelvin(20.0), 293.15);
        assert_abs_diff_eq!(kelvin_to_celsius(celsius_to_kelvin(57.3)), 57.3, epsilon = 1e-12);
    }

    #[test]
    fn transfer_rate_scales_with_flow() {
        // 0.5 kg/s of water heated by 10°C
        let rate = energy_transfer_rate(0.5, 4186.0, 10.0);
        assert_abs_diff_eq!(rate, 20_930.0);
    }

    #[test]
    fn formats_minute_of_day() {
        assert_eq!(minutes_to_hhmmss(0.0), "00:00:00");
        assert_eq!(minutes_to_hhmmss(720.5), "12:00:30");
        assert_eq!(minutes_to_hhmmss(1439.0), "23:59:00");
    }

    #[test]
    fn formats_millisecond_spans() {
        assert_eq!(format_milliseconds(250.0), "250.00 ms");
        assert_eq!(format_milliseconds(1500.0), "1.50 s");
        assert_eq!(format_milliseconds(90_000.0), "1.50 min");
        assert_eq!(format_milliseconds(5_400_000.0), "1.50 hr");
    }
}
