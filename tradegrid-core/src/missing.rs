//! Canonical missing-value ("N/A") classification.
//!
//! Missing means: `null`, an absent key, `NaN`, a blank or whitespace-only
//! string, or the literal `"N/A"` / `"n/a"`. Zero, `"0"` and `false` are
//! values, not gaps.

use serde_json::Value;

/// Types that can be asked whether they hold a usable value.
pub trait Missing {
    fn is_missing(&self) -> bool;
}

/// Classify any supported value. `Option::None` models an absent key.
pub fn is_missing<T: Missing + ?Sized>(value: &T) -> bool {
    value.is_missing()
}

/// String rule shared by `str`, `String` and JSON strings.
pub fn is_missing_str(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || s == "N/A" || s == "n/a"
}

impl Missing for Value {
    fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => is_missing_str(s),
            Value::Number(n) => n.as_f64().map_or(false, f64::is_nan),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => false,
        }
    }
}

impl Missing for str {
    fn is_missing(&self) -> bool {
        is_missing_str(self)
    }
}

impl Missing for String {
    fn is_missing(&self) -> bool {
        is_missing_str(self)
    }
}

impl Missing for f64 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl Missing for f32 {
    fn is_missing(&self) -> bool {
        self.is_nan()
    }
}

impl Missing for bool {
    fn is_missing(&self) -> bool {
        false
    }
}

impl Missing for i64 {
    fn is_missing(&self) -> bool {
        false
    }
}

impl<T: Missing + ?Sized> Missing for &T {
    fn is_missing(&self) -> bool {
        (**self).is_missing()
    }
}

impl<T: Missing> Missing for Option<T> {
    fn is_missing(&self) -> bool {
        self.as_ref().map_or(true, Missing::is_missing)
    }
}
