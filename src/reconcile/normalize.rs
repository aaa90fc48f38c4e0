//! Normalization of raw supplier price and quantity strings.

use log::warn;

/// Supplier bucket for "more than ten in stock".
const MANY_BUCKET: &str = ">10";
/// Supplier bucket for a single remaining unit, treated as out of stock.
const LAST_UNIT_BUCKET: &str = "1";
/// Quantity reported for the `">10"` bucket.
const MANY_QUANTITY: u64 = 100;

/// Reduces a supplier price string to the digits of its integer part.
///
/// Everything from the first `.` on is dropped, then every non-digit is
/// removed from what is left, so thousands separators and currency
/// suffixes disappear. The result may be empty.
///
/// # Examples
/// - `"12345.67"` -> `"12345"`
/// - `"1,234.5"` -> `"1234"`
/// - `".12"` -> `""`
/// - `"price"` -> `""`
pub fn normalize_price(price: &str) -> String {
    let integer_part = price.split('.').next().unwrap_or_default();
    integer_part.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalized price as an integer; unparseable prices become 0.
pub fn price_value(price: &str) -> u64 {
    let digits = normalize_price(price);
    if digits.is_empty() {
        warn!("Price '{price}' has no integer part, using 0");
        return 0;
    }
    match digits.parse::<u64>() {
        Ok(value) => value,
        Err(e) => {
            warn!("Price '{price}' is out of range ({e}), using 0");
            0
        }
    }
}

/// Maps a raw supplier quantity to the stock count sent to marketplaces.
///
/// | raw     | stock  |
/// |---------|--------|
/// | `">10"` | 100    |
/// | `"1"`   | 0      |
/// | digits  | parsed |
///
/// Negative counts are clamped to 0. Anything else is logged and treated
/// as out of stock.
pub fn normalize_quantity(quantity: &str) -> u64 {
    let quantity = quantity.trim();
    match quantity {
        MANY_BUCKET => MANY_QUANTITY,
        LAST_UNIT_BUCKET => 0,
        other => match other.parse::<u64>() {
            Ok(count) => count,
            Err(_) if is_negative_count(other) => {
                warn!("Negative quantity '{other}' clamped to 0");
                0
            }
            Err(_) => {
                warn!("Unrecognized quantity '{other}', using 0");
                0
            }
        },
    }
}

fn is_negative_count(quantity: &str) -> bool {
    quantity
        .strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
