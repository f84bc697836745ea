//! Unit conversion and display formatting.
//!
//! The contracts use three numeric domains:
//!
//! | Domain | Scale  | Type here |
//! |--------|--------|-----------|
//! | wei    | 10^18  | `U256`    |
//! | USD-8  | 10^8   | `U256`    |
//! | human ETH / USD | 1 | `f64` |
//!
//! Fixed-point values stay `U256` until they are turned into a display
//! decimal by one of the functions below. Everything here is pure; anything
//! time-dependent takes `now` as an argument.

use alloy_primitives::{Address, U256};

pub const ETH_DECIMALS: usize = 18;
pub const USD_DECIMALS: usize = 8;

const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;
const USD8_PER_USD: u64 = 100_000_000;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

// ─────────────────────────────────────────────────────────
// Fixed-point parsing
// ─────────────────────────────────────────────────────────

/// A parsed decimal string scaled to a fixed number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaled {
    pub negative: bool,
    pub magnitude: U256,
}

impl Scaled {
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }
}

/// Parse a plain decimal string (`"12"`, `"0.25"`, `"-1"`, `".5"`) into an
/// integer scaled by `10^decimals`.
///
/// Returns `None` for anything that is not a plain decimal, or that carries
/// more fractional digits than `decimals`.
pub fn parse_scaled(input: &str, decimals: usize) -> Option<Scaled> {
    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.len() > decimals {
        return None;
    }

    let digits = format!("{int_part}{frac_trimmed:0<decimals$}");
    let magnitude = U256::from_str_radix(&digits, 10).ok()?;
    Some(Scaled {
        negative,
        magnitude,
    })
}

// ─────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────

/// Wei to decimal ETH.
pub fn wei_to_eth(wei: U256) -> f64 {
    let (whole, frac) = wei.div_rem(U256::from(WEI_PER_ETH));
    u256_to_f64(whole) + u256_to_f64(frac) / WEI_PER_ETH as f64
}

/// USD-8 fixed point to decimal USD.
pub fn usd8_to_decimal(amount: U256) -> f64 {
    let (whole, frac) = amount.div_rem(U256::from(USD8_PER_USD));
    u256_to_f64(whole) + u256_to_f64(frac) / USD8_PER_USD as f64
}

pub fn eth_to_usd(eth: f64, eth_usd_rate: f64) -> f64 {
    eth * eth_usd_rate
}

/// Returns `0.0` when the rate is not positive.
pub fn usd_to_eth(usd: f64, eth_usd_rate: f64) -> f64 {
    if eth_usd_rate <= 0.0 || !eth_usd_rate.is_finite() {
        return 0.0;
    }
    usd / eth_usd_rate
}

/// Exact `wei * rate8 / 10^18`, i.e. the USD-8 value of a wei amount.
/// `None` when the product does not fit in 256 bits.
pub fn wei_to_usd8(wei: U256, eth_usd_rate8: U256) -> Option<U256> {
    wei.checked_mul(eth_usd_rate8).map(|product| product / U256::from(WEI_PER_ETH))
}

fn u256_to_f64(value: U256) -> f64 {
    // A U256 never exceeds f64::MAX, so the decimal string always parses.
    value.to_string().parse().unwrap_or(f64::INFINITY)
}

// ─────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────

/// Percentage of `goal` reached, clamped to `0..=100`. A non-positive goal
/// yields `0`.
pub fn progress_percent(raised: f64, goal: f64) -> f64 {
    if goal.is_nan() || goal <= 0.0 || !raised.is_finite() {
        return 0.0;
    }
    (raised / goal * 100.0).clamp(0.0, 100.0)
}

/// Amount still missing to reach `goal`, never negative.
pub fn remaining(goal: f64, raised: f64) -> f64 {
    (goal - raised).max(0.0)
}

// ─────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────

/// Format a USD amount the way the campaign pages display money.
///
/// * `>= 1,000,000` uses compact notation with one optional decimal (`$1.2M`).
/// * whole amounts have no decimals (`$500`, `$12,000`).
/// * anything else gets two decimals (`$1,234.50`).
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    if abs >= 1_000_000.0 {
        return format!("{sign}${}", format_compact(abs));
    }
    if abs.fract() == 0.0 {
        return format!("{sign}${}", format_with_commas(abs as u64));
    }

    let cents = (abs * 100.0).round() as u64;
    format!(
        "{sign}${}.{:02}",
        format_with_commas(cents / 100),
        cents % 100
    )
}

fn format_compact(abs: f64) -> String {
    const SCALES: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];

    let mut idx = SCALES
        .iter()
        .position(|(div, _)| abs >= *div)
        .unwrap_or(SCALES.len() - 1);
    let round1 = |div: f64| (abs / div * 10.0).round() / 10.0;

    let mut scaled = round1(SCALES[idx].0);
    // 999.96M rounds to 1000.0M, which reads as $1B.
    if scaled >= 1000.0 && idx > 0 {
        idx -= 1;
        scaled = round1(SCALES[idx].0);
    }

    let suffix = SCALES[idx].1;
    if scaled.fract() == 0.0 {
        format!("{}{suffix}", format_with_commas(scaled as u64))
    } else {
        format!("{scaled:.1}{suffix}")
    }
}

/// ETH with at most six fractional digits, trailing zeros trimmed.
pub fn format_eth(eth: f64) -> String {
    if !eth.is_finite() {
        return "0 ETH".to_string();
    }
    let fixed = format!("{eth:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let trimmed = if trimmed == "-0" { "0" } else { trimmed };
    format!("{trimmed} ETH")
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.1}%")
}

/// Format a number with commas for thousands separators.
pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

// ─────────────────────────────────────────────────────────
// Time
// ─────────────────────────────────────────────────────────

/// Time left until `deadline`, e.g. `"2d 4h"`, `"1h 0m"`, `"15m"`.
///
/// Shows the most significant non-zero unit and the unit below it. Returns
/// `"Ended"` once `deadline <= now`.
pub fn format_countdown(deadline: u64, now: u64) -> String {
    if deadline <= now {
        return "Ended".to_string();
    }
    let secs = deadline - now;
    let days = secs / SECS_PER_DAY;
    let hours = (secs % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / SECS_PER_MINUTE;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "<1m".to_string()
    }
}

/// Whole days left, rounded up, never negative.
pub fn days_left(deadline: u64, now: u64) -> u64 {
    deadline.saturating_sub(now).div_ceil(SECS_PER_DAY)
}

/// `"Jan 5, 2025"`. Empty for timestamps chrono cannot represent.
pub fn format_date(unix: u64) -> String {
    i64::try_from(unix)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────
// Addresses
// ─────────────────────────────────────────────────────────

/// `0x1234...abcd` using the checksummed form.
pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn explorer_address_url(explorer_base: &str, address: &Address) -> String {
    format!("{explorer_base}/address/{address}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decimal ETH to wei, the inverse of [`wei_to_eth`].
    fn eth_to_wei(eth: f64) -> U256 {
        if !eth.is_finite() || eth <= 0.0 {
            return U256::ZERO;
        }
        parse_scaled(&format!("{eth:.prec$}", prec = ETH_DECIMALS), ETH_DECIMALS)
            .map(|s| s.magnitude)
            .unwrap_or(U256::ZERO)
    }

    #[test]
    fn parse_scaled_accepts_plain_decimals() {
        let s = parse_scaled("0.25", ETH_DECIMALS).unwrap();
        assert!(!s.negative);
        assert_eq!(s.magnitude, U256::from(250_000_000_000_000_000u64));

        assert_eq!(
            parse_scaled("1000", USD_DECIMALS).unwrap().magnitude,
            U256::from(100_000_000_000u64)
        );
        assert_eq!(
            parse_scaled(".5", USD_DECIMALS).unwrap().magnitude,
            U256::from(50_000_000u64)
        );
        assert_eq!(
            parse_scaled(" 12.50000000000 ", USD_DECIMALS).unwrap().magnitude,
            U256::from(1_250_000_000u64)
        );
    }

    #[test]
    fn parse_scaled_reports_sign() {
        let s = parse_scaled("-1", ETH_DECIMALS).unwrap();
        assert!(s.negative);
        assert!(!s.is_positive());
        assert!(!parse_scaled("0", ETH_DECIMALS).unwrap().is_positive());
    }

    #[test]
    fn parse_scaled_rejects_garbage() {
        assert!(parse_scaled("", USD_DECIMALS).is_none());
        assert!(parse_scaled(".", USD_DECIMALS).is_none());
        assert!(parse_scaled("1e5", USD_DECIMALS).is_none());
        assert!(parse_scaled("1,000", USD_DECIMALS).is_none());
        assert!(parse_scaled("abc", USD_DECIMALS).is_none());
        assert!(parse_scaled("0.000000001", USD_DECIMALS).is_none());
    }

    #[test]
    fn wei_eth_roundtrip_within_tolerance() {
        for eth in [0.25, 1.0, 2.5, 0.1, 123.456789, 1e-6] {
            let back = wei_to_eth(eth_to_wei(eth));
            assert!((back - eth).abs() < 1e-9, "{eth} came back as {back}");
        }
        assert_eq!(eth_to_wei(-1.0), U256::ZERO);
        assert_eq!(eth_to_wei(f64::NAN), U256::ZERO);
    }

    #[test]
    fn wei_to_eth_keeps_fractions() {
        assert_eq!(wei_to_eth(U256::ZERO), 0.0);
        assert!((wei_to_eth(U256::from(250_000_000_000_000_000u64)) - 0.25).abs() < 1e-12);
        assert!((wei_to_eth(U256::from(1_000_000_000_000u64)) - 1e-6).abs() < 1e-15);
        let large = U256::from(123_456u64) * U256::from(WEI_PER_ETH);
        assert!((wei_to_eth(large) - 123_456.0).abs() < 1e-6);
    }

    #[test]
    fn usd8_scale() {
        assert!((usd8_to_decimal(U256::from(100_000_000_000u64)) - 1000.0).abs() < 1e-9);
        assert!((usd8_to_decimal(U256::from(1_250_000_000u64)) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn usd_eth_conversions() {
        assert!((usd_to_eth(500.0, 2000.0) - 0.25).abs() < 1e-12);
        assert!((eth_to_usd(0.25, 2000.0) - 500.0).abs() < 1e-12);
        assert_eq!(usd_to_eth(500.0, 0.0), 0.0);
        assert_eq!(usd_to_eth(500.0, -3.0), 0.0);
    }

    #[test]
    fn wei_to_usd8_is_exact() {
        // 0.25 ETH at $2000 = $500
        let wei = U256::from(250_000_000_000_000_000u64);
        let rate8 = U256::from(200_000_000_000u64);
        assert_eq!(wei_to_usd8(wei, rate8), Some(U256::from(50_000_000_000u64)));
    }

    #[test]
    fn wei_to_usd8_overflow_is_none() {
        let rate8 = U256::from(200_000_000_000u64);
        assert_eq!(wei_to_usd8(U256::MAX, rate8), None);
        assert_eq!(wei_to_usd8(U256::MAX, U256::ZERO), Some(U256::ZERO));
    }

    #[test]
    fn progress_is_bounded() {
        for goal in [0.0, 1.0, 10.0, 1000.0, 1e9] {
            for raised in [0.0, 0.5, 10.0, 999.0, 5000.0, 1e12] {
                let p = progress_percent(raised, goal);
                assert!((0.0..=100.0).contains(&p), "raised={raised} goal={goal} -> {p}");
            }
        }
        assert_eq!(progress_percent(10.0, 0.0), 0.0);
        assert_eq!(progress_percent(10.0, -5.0), 0.0);
        assert_eq!(progress_percent(2000.0, 1000.0), 100.0);
    }

    #[test]
    fn remaining_never_negative() {
        assert_eq!(remaining(1000.0, 400.0), 600.0);
        assert_eq!(remaining(1000.0, 1500.0), 0.0);
        assert_eq!(remaining(0.0, 0.0), 0.0);
    }

    #[test]
    fn half_funded_campaign() {
        let goal = usd8_to_decimal(U256::from(100_000_000_000u64));
        let raised = usd8_to_decimal(U256::from(50_000_000_000u64));
        assert!((progress_percent(raised, goal) - 50.0).abs() < 1e-9);
        assert!((usd_to_eth(raised, 2000.0) - 0.25).abs() < 1e-12);
        assert_eq!(format_usd(raised), "$500");
    }

    #[test]
    fn format_usd_variants() {
        assert_eq!(format_usd(500.0), "$500");
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(12_000.0), "$12,000");
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(0.1), "$0.10");
        assert_eq!(format_usd(-42.25), "-$42.25");
        assert_eq!(format_usd(999_999.99), "$999,999.99");
    }

    #[test]
    fn format_usd_compact() {
        assert_eq!(format_usd(1_000_000.0), "$1M");
        assert_eq!(format_usd(1_200_000.0), "$1.2M");
        assert_eq!(format_usd(2_500_000_000.0), "$2.5B");
        assert_eq!(format_usd(999_960_000.0), "$1B");
        assert_eq!(format_usd(3_000_000_000_000.0), "$3T");
    }

    #[test]
    fn format_eth_trims() {
        assert_eq!(format_eth(0.25), "0.25 ETH");
        assert_eq!(format_eth(1.0), "1 ETH");
        assert_eq!(format_eth(0.1234567), "0.123457 ETH");
        assert_eq!(format_eth(0.0), "0 ETH");
    }

    #[test]
    fn countdown_ended_at_or_after_deadline() {
        assert_eq!(format_countdown(100, 100), "Ended");
        assert_eq!(format_countdown(100, 101), "Ended");
        assert_eq!(format_countdown(0, 1_700_000_000), "Ended");
    }

    #[test]
    fn countdown_units() {
        let now = 1_700_000_000;
        assert_eq!(format_countdown(now + 3600, now), "1h 0m");
        assert_eq!(
            format_countdown(now + 2 * SECS_PER_DAY + 4 * SECS_PER_HOUR + 300, now),
            "2d 4h"
        );
        assert_eq!(format_countdown(now + 3 * SECS_PER_DAY, now), "3d 0h");
        assert_eq!(format_countdown(now + 15 * 60 + 30, now), "15m");
        assert_eq!(format_countdown(now + 30, now), "<1m");
    }

    #[test]
    fn days_left_rounds_up() {
        assert_eq!(days_left(100, 200), 0);
        assert_eq!(days_left(SECS_PER_DAY, 0), 1);
        assert_eq!(days_left(SECS_PER_DAY + 1, 0), 2);
        assert_eq!(days_left(1, 0), 1);
    }

    #[test]
    fn format_date_utc() {
        assert_eq!(format_date(1_704_067_200), "Jan 1, 2024");
        assert_eq!(format_date(u64::MAX), "");
    }

    #[test]
    fn shorten_address_keeps_ends() {
        let addr = Address::repeat_byte(0xab);
        let short = shorten_address(&addr);
        assert!(short.starts_with("0x"));
        assert_eq!(short.len(), 6 + 3 + 4);
        assert!(short.to_lowercase().starts_with("0xabab"));
        assert!(short.to_lowercase().ends_with("abab"));
    }

    #[test]
    fn commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}
