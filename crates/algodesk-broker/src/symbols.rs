//! Symbol format helpers
//!
//! Pure, stateless builders for the platform's canonical instrument
//! identifiers:
//!
//! - equity: the bare upper-cased symbol (`INFY`, `SBIN`)
//! - futures: `[BASE][YY][MON][DD?]FUT`, e.g. `BANKNIFTY24APR24FUT`
//! - options: `[BASE][DD][MON][YY][STRIKE][CE|PE]`, e.g. `NIFTY28MAR2420800CE`

use crate::error::{BrokerError, Result};

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// NSE index symbols
pub const NSE_INDICES: &[&str] = &[
    "NIFTY",
    "BANKNIFTY",
    "FINNIFTY",
    "NIFTYNXT50",
    "MIDCPNIFTY",
    "INDIAVIX",
];

/// BSE index symbols
pub const BSE_INDICES: &[&str] = &["SENSEX", "BANKEX", "SENSEX50"];

fn month_code(month: u8) -> Result<&'static str> {
    MONTHS
        .get(month.checked_sub(1).map(usize::from).unwrap_or(usize::MAX))
        .copied()
        .ok_or_else(|| {
            BrokerError::Validation(format!("expiry month must be 1-12, got {month}"))
        })
}

fn short_year(year: u16) -> String {
    if year > 2000 {
        format!("{:02}", year % 100)
    } else {
        format!("{year:02}")
    }
}

fn base_symbol(symbol: &str) -> Result<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(BrokerError::Validation("base symbol is required".into()));
    }
    Ok(trimmed.to_uppercase())
}

/// Format an equity symbol
#[must_use]
pub fn format_equity(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Format a futures symbol.
///
/// `expiry_day` is optional; monthly contracts omit it.
pub fn format_future(
    base: &str,
    expiry_year: u16,
    expiry_month: u8,
    expiry_day: Option<u8>,
) -> Result<String> {
    let base = base_symbol(base)?;
    let month = month_code(expiry_month)?;
    let day = match expiry_day {
        Some(day @ 1..=31) => day.to_string(),
        Some(day) => {
            return Err(BrokerError::Validation(format!(
                "expiry day must be 1-31, got {day}"
            )))
        }
        None => String::new(),
    };

    Ok(format!("{base}{}{month}{day}FUT", short_year(expiry_year)))
}

/// Format an options symbol.
pub fn format_option(
    base: &str,
    expiry_day: u8,
    expiry_month: u8,
    expiry_year: u16,
    strike: f64,
    option_type: &str,
) -> Result<String> {
    let base = base_symbol(base)?;
    if !(1..=31).contains(&expiry_day) {
        return Err(BrokerError::Validation(format!(
            "expiry day must be 1-31, got {expiry_day}"
        )));
    }
    let month = month_code(expiry_month)?;
    if !strike.is_finite() || strike <= 0.0 {
        return Err(BrokerError::Validation(format!(
            "strike must be positive, got {strike}"
        )));
    }

    let option_code = match option_type.to_uppercase().as_str() {
        "C" | "CALL" | "CE" => "CE",
        "P" | "PUT" | "PE" => "PE",
        other => {
            return Err(BrokerError::Validation(format!(
                "option type must be call or put, got '{other}'"
            )))
        }
    };

    Ok(format!(
        "{base}{expiry_day}{month}{}{}{option_code}",
        short_year(expiry_year),
        format_strike(strike),
    ))
}

/// Common index symbols for an index exchange code
#[must_use]
pub fn common_indices(exchange: &str) -> &'static [&'static str] {
    match exchange.to_uppercase().as_str() {
        "NSE_INDEX" => NSE_INDICES,
        "BSE_INDEX" => BSE_INDICES,
        _ => &[],
    }
}

/// Render a strike price, dropping a trailing `.0` for whole numbers
fn format_strike(strike: f64) -> String {
    if strike.fract() == 0.0 {
        format!("{}", strike as i64)
    } else {
        format!("{strike}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_equity() {
        assert_eq!(format_equity(" infy "), "INFY");
        assert_eq!(format_equity("SBIN"), "SBIN");
    }

    #[test]
    fn test_format_future_monthly() {
        let symbol = format_future("banknifty", 2024, 4, Some(24)).unwrap();
        assert_eq!(symbol, "BANKNIFTY24APR24FUT");
    }

    #[test]
    fn test_format_future_without_day() {
        let symbol = format_future("USDINR", 2024, 5, None).unwrap();
        assert_eq!(symbol, "USDINR24MAYFUT");
    }

    #[test]
    fn test_format_future_rejects_bad_month() {
        assert!(format_future("NIFTY", 2024, 13, None).is_err());
        assert!(format_future("NIFTY", 2024, 0, None).is_err());
    }

    #[test]
    fn test_format_option_call() {
        let symbol = format_option("nifty", 28, 3, 2024, 20800.0, "CE").unwrap();
        assert_eq!(symbol, "NIFTY28MAR2420800CE");
    }

    #[test]
    fn test_format_option_fractional_strike() {
        let symbol = format_option("VEDL", 25, 4, 2024, 292.5, "call").unwrap();
        assert_eq!(symbol, "VEDL25APR24292.5CE");
    }

    #[test]
    fn test_format_option_put_aliases() {
        for alias in ["P", "put", "PE"] {
            let symbol = format_option("NIFTY", 28, 3, 2024, 20800.0, alias).unwrap();
            assert!(symbol.ends_with("PE"));
        }
    }

    #[test]
    fn test_format_option_rejects_unknown_type() {
        assert!(format_option("NIFTY", 28, 3, 2024, 20800.0, "straddle").is_err());
    }

    #[test]
    fn test_format_option_rejects_missing_base() {
        assert!(format_option("  ", 28, 3, 2024, 20800.0, "CE").is_err());
    }

    #[test]
    fn test_common_indices() {
        assert!(common_indices("nse_index").contains(&"BANKNIFTY"));
        assert!(common_indices("BSE_INDEX").contains(&"SENSEX"));
        assert!(common_indices("NSE").is_empty());
    }
}
