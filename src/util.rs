// Utility helpers for cell parsing and number formatting.
//
// This module centralizes the "dirty" spreadsheet/number handling so the
// rest of the code can assume clean, typed values.
use calamine::Data;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`NaN`, `inf`, `12E`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok()
}

/// Render a spreadsheet cell as text. Whole floats lose their fractional
/// part so a bank code stored as `10.0` reads back as `"10"`.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        other => format!("{}", other),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in log lines and the startup table (`9,855 rows`).
    n.to_formatted_string(&Locale::en)
}

/// Abbreviate a number to 3 significant digits with a K/M/B/T suffix.
///
/// `900 -> "900"`, `1500 -> "1.5K"`, `2_500_000 -> "2.5M"`, `1e9 -> "1B"`.
pub fn human_format(n: f64) -> String {
    const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];
    let mut num = round_significant(n, 3);
    let mut magnitude = 0;
    while num.abs() >= 1000.0 && magnitude < SUFFIXES.len() - 1 {
        magnitude += 1;
        num /= 1000.0;
    }
    let text = format!("{:.6}", num);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", text, SUFFIXES[magnitude])
}

fn round_significant(n: f64, digits: i32) -> f64 {
    if n == 0.0 || !n.is_finite() {
        return n;
    }
    let shift = digits - 1 - n.abs().log10().floor() as i32;
    // Keep the scale factor integral on both sides so 1500 stays exactly 1500.
    // Exact halves go to the even digit: 1245 -> 1240.
    if shift >= 0 {
        let p = 10f64.powi(shift);
        (n * p).round_ties_even() / p
    } else {
        let p = 10f64.powi(-shift);
        (n / p).round_ties_even() * p
    }
}
