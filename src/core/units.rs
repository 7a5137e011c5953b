//! UN/CEFACT Recommendation 20 unit codes.
//!
//! The full Rec 20 list has around 2000 codes; this is the subset seen on
//! Austrian invoice lines (pieces, time units, weights, energy, lump sum).

/// Check whether `code` is a known UN/CEFACT Rec 20 unit code.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.binary_search(&code).is_ok()
}

/// Sorted list of accepted Rec 20 unit codes.
static UNIT_CODES: &[&str] = &[
    "ANN", // Year
    "C62", // One (unit)
    "CMT", // Centimetre
    "DAY", // Day
    "DZN", // Dozen
    "GRM", // Gram
    "H87", // Piece
    "HUR", // Hour
    "KGM", // Kilogram
    "KMT", // Kilometre
    "KWH", // Kilowatt-hour
    "LS",  // Lump sum
    "LTR", // Litre
    "MIN", // Minute
    "MON", // Month
    "MTK", // Square metre
    "MTQ", // Cubic metre
    "MTR", // Metre
    "NAR", // Number of articles
    "P1",  // Percent
    "SEC", // Second
    "SET", // Set
    "TNE", // Tonne
    "WEE", // Week
    "XBX", // Box
    "XCT", // Carton
    "XPK", // Package
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert!(is_known_unit_code("C62"));
        assert!(is_known_unit_code("H87"));
        assert!(is_known_unit_code("HUR"));
        assert!(is_known_unit_code("KGM"));
        assert!(is_known_unit_code("LS"));
        assert!(is_known_unit_code("DAY"));
    }

    #[test]
    fn unknown_codes() {
        assert!(!is_known_unit_code("XYZ"));
        assert!(!is_known_unit_code(""));
        assert!(!is_known_unit_code("PIECE"));
        assert!(!is_known_unit_code("hur"));
    }

    #[test]
    fn list_is_sorted() {
        for window in UNIT_CODES.windows(2) {
            assert!(
                window[0] < window[1],
                "unit codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }
}
