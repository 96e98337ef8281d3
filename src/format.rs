//! Currency formatting for Ghana cedi amounts.

pub const CURRENCY_CODE: &str = "GHS";
pub const CURRENCY_SYMBOL: &str = "GH₵";

/// Format an amount as `GH₵1,250.00`
pub fn format_cedis(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{}0.00", CURRENCY_SYMBOL);
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{}{}{}.{:02}", sign, CURRENCY_SYMBOL, whole, cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
