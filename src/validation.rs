//! Form input checks for the deposit and storefront pages.

use std::sync::LazyLock;

use regex::Regex;

pub const MIN_AMOUNT: f64 = 1.0;
pub const MAX_AMOUNT: f64 = 10_000.0;

static GHANA_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+?233|0)([235]\d{8})$").expect("phone pattern compiles")
});

static SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("subdomain pattern compiles")
});

/// Accept amounts between GH₵1.00 and GH₵10,000.00 with at most two decimals
pub fn validate_amount(amount: f64) -> Result<f64, String> {
    if !amount.is_finite() {
        return Err("Amount must be a number".to_string());
    }
    if amount < MIN_AMOUNT {
        return Err(format!(
            "Minimum amount is {}",
            crate::format::format_cedis(MIN_AMOUNT)
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(format!(
            "Maximum amount is {}",
            crate::format::format_cedis(MAX_AMOUNT)
        ));
    }

    let pesewas = amount * 100.0;
    if (pesewas - pesewas.round()).abs() > 1e-6 {
        return Err("Amount can have at most two decimal places".to_string());
    }

    Ok(amount)
}

/// Normalise a Ghanaian mobile number to its local `0XXXXXXXXX` form
pub fn normalize_phone(input: &str) -> Option<String> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    GHANA_PHONE
        .captures(&compact)
        .and_then(|caps| caps.get(1))
        .map(|subscriber| format!("0{}", subscriber.as_str()))
}

pub fn is_valid_subdomain(subdomain: &str) -> bool {
    SUBDOMAIN.is_match(subdomain)
}
