//! Country code tables.
//!
//! ISO 3166-1 alpha-2 codes for address and account validation, plus the
//! EU membership list in the VAT-prefix convention (Greece is `EL`, not
//! `GR`) used by VAT identifiers and recapitulative statements.

/// Check whether `code` is a known ISO 3166-1 alpha-2 country code.
pub fn is_known_country_code(code: &str) -> bool {
    COUNTRY_CODES.binary_search(&code).is_ok()
}

/// Check whether `code` names an EU member state.
///
/// Uses the VAT convention: `EL` for Greece. The ISO code `GR` is not in
/// this list.
pub fn is_eu_member(code: &str) -> bool {
    EU_MEMBERS.binary_search(&code).is_ok()
}

/// Complete list of ISO 3166-1 alpha-2 country codes (249 entries).
/// Sorted for binary search.
static COUNTRY_CODES: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX", "AZ",
    "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ", "BR", "BS",
    "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK", "CL", "CM", "CN",
    "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM", "DO", "DZ", "EC", "EE",
    "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR", "GA", "GB", "GD", "GE", "GF",
    "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS", "GT", "GU", "GW", "GY", "HK", "HM",
    "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN", "IO", "IQ", "IR", "IS", "IT", "JE", "JM",
    "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN", "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC",
    "LI", "LK", "LR", "LS", "LT", "LU", "LV", "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK",
    "ML", "MM", "MN", "MO", "MP", "MQ", "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA",
    "NC", "NE", "NF", "NG", "NI", "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG",
    "PH", "PK", "PL", "PM", "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW",
    "SA", "SB", "SC", "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS",
    "ST", "SV", "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO",
    "TR", "TT", "TV", "TW", "TZ", "UA", "UG", "UM", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI",
    "VN", "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

/// EU member states in the VAT-prefix convention (27 entries).
/// Sorted for binary search.
static EU_MEMBERS: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "EL", "ES", "FI", "FR", "HR", "HU", "IE", "IT",
    "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_countries() {
        assert!(is_known_country_code("DE"));
        assert!(is_known_country_code("AT"));
        assert!(is_known_country_code("CH"));
        assert!(is_known_country_code("FR"));
        assert!(is_known_country_code("US"));
        assert!(is_known_country_code("GB"));
    }

    #[test]
    fn unknown_countries() {
        assert!(!is_known_country_code("XX"));
        assert!(!is_known_country_code(""));
        assert!(!is_known_country_code("AUT"));
        assert!(!is_known_country_code("at"));
    }

    #[test]
    fn eu_membership() {
        assert!(is_eu_member("AT"));
        assert!(is_eu_member("DE"));
        assert!(is_eu_member("EL"));
        assert!(!is_eu_member("GR"));
        assert!(!is_eu_member("CH"));
        assert!(!is_eu_member("GB"));
        assert!(!is_eu_member("XI"));
    }

    #[test]
    fn lists_are_sorted() {
        for list in [COUNTRY_CODES, EU_MEMBERS] {
            for window in list.windows(2) {
                assert!(
                    window[0] < window[1],
                    "codes not sorted: {} >= {}",
                    window[0],
                    window[1]
                );
            }
        }
    }

    #[test]
    fn list_counts() {
        assert_eq!(COUNTRY_CODES.len(), 249);
        assert_eq!(EU_MEMBERS.len(), 27);
    }
}
