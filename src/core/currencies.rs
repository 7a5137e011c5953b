//! ISO 4217 currency code validation.
//!
//! Covers the currencies that show up in Austrian invoicing and SEPA
//! payment practice. Domestic documents are EUR; the rest of the list
//! handles foreign-currency invoices.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted list of accepted ISO 4217 currency codes.
static CURRENCY_CODES: &[&str] = &[
    "AUD", // Australian Dollar
    "BGN", // Bulgarian Lev
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CNY", // Chinese Yuan
    "CZK", // Czech Koruna
    "DKK", // Danish Krone
    "EUR", // Euro
    "GBP", // Pound Sterling
    "HUF", // Hungarian Forint
    "ISK", // Icelandic Krona
    "JPY", // Japanese Yen
    "NOK", // Norwegian Krone
    "PLN", // Polish Zloty
    "RON", // Romanian Leu
    "RSD", // Serbian Dinar
    "SEK", // Swedish Krona
    "TRY", // Turkish Lira
    "UAH", // Ukrainian Hryvnia
    "USD", // US Dollar
];
