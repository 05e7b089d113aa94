//! Rate units and formatting.

/// Multiplier between successive rate units (kilo, mega, giga).
pub const KILO: u64 = 1024;

/// Bit-rate units, smallest first.
const UNITS: &[&str] = &["bps", "Kbps", "Mbps", "Gbps"];

/// Convert a kilobytes/sec value to the native rate unit (bytes/sec).
pub fn kilobytes_to_rate(kilobytes: u64) -> u64 {
    kilobytes.saturating_mul(KILO)
}

/// Format a byte rate as a human readable bit rate, e.g. "12.50 Kbps".
pub fn format_bit_rate(bytes_per_sec: u64) -> String {
    let bits = bytes_per_sec.saturating_mul(8);
    if bits < KILO {
        return format!("{} {}", bits, UNITS[0]);
    }

    let mut value = bits as f64;
    let mut unit = 0;
    while value >= KILO as f64 && unit < UNITS.len() - 1 {
        value /= KILO as f64;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}
