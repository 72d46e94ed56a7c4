//! Datapoint type filtering for remove and select rules.

use sift_core::Value;
use tracing::warn;

/// The canonical type names a rule may name, after alias normalisation.
const VALID_TYPES: &[&str] = &[
    "FLOAT",
    "INTEGER",
    "STRING",
    "FLOAT_ARRAY",
    "DP_DICT",
    "DP_LIST",
    "IMAGE",
    "DATABUFFER",
    "2D_FLOAT_ARRAY",
    "NUMBER",
    "NON-NUMERIC",
    "USER_ARRAY",
];

/// A type name from configuration, normalised and validated.
///
/// Accepts the canonical names plus the historical aliases
/// (`FLOATING`, `BUFFER`, `NESTED`, `2D_ARRAY`, `ARRAY`) and the
/// meta-types `NUMBER` (float or integer), `NON-NUMERIC` (everything
/// else) and `USER_ARRAY` (either array shape). Matching is
/// case-insensitive. An unknown name is reported once at build time and
/// matches nothing thereafter.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    name: String,
    valid: bool,
}

impl TypeFilter {
    /// Normalise and validate a configured type name.
    pub fn new(raw: &str, asset: &str) -> Self {
        let mut name = raw.to_uppercase();
        name = match name.as_str() {
            "FLOATING" => "FLOAT".to_string(),
            "BUFFER" => "DATABUFFER".to_string(),
            "NESTED" => "DP_DICT".to_string(),
            "2D_ARRAY" => "2D_FLOAT_ARRAY".to_string(),
            "ARRAY" => "FLOAT_ARRAY".to_string(),
            _ => name,
        };

        let valid = VALID_TYPES.contains(&name.as_str());
        if !valid {
            warn!(
                "Invalid datapoint type '{raw}' given in the rule for asset '{asset}'. \
                 The rule will have no effect."
            );
        }
        Self { name, valid }
    }

    /// The normalised type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether a value is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        if !self.valid {
            return false;
        }
        let type_name = value.type_name();
        match self.name.as_str() {
            "NUMBER" => matches!(type_name, "FLOAT" | "INTEGER"),
            "NON-NUMERIC" => !matches!(type_name, "FLOAT" | "INTEGER"),
            "USER_ARRAY" => matches!(type_name, "FLOAT_ARRAY" | "2D_FLOAT_ARRAY"),
            name => name == type_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalise() {
        assert_eq!(TypeFilter::new("floating", "a").name(), "FLOAT");
        assert_eq!(TypeFilter::new("Buffer", "a").name(), "DATABUFFER");
        assert_eq!(TypeFilter::new("nested", "a").name(), "DP_DICT");
        assert_eq!(TypeFilter::new("2d_array", "a").name(), "2D_FLOAT_ARRAY");
        assert_eq!(TypeFilter::new("array", "a").name(), "FLOAT_ARRAY");
    }

    #[test]
    fn number_and_non_numeric_are_complements() {
        let number = TypeFilter::new("NUMBER", "a");
        let non_numeric = TypeFilter::new("NON-NUMERIC", "a");
        let values = [
            Value::Integer(1),
            Value::Float(1.5),
            Value::String("x".to_string()),
            Value::FloatArray(vec![]),
            Value::Dict(vec![]),
        ];
        for value in &values {
            assert_ne!(number.matches(value), non_numeric.matches(value));
        }
    }

    #[test]
    fn user_array_covers_both_array_shapes() {
        let filter = TypeFilter::new("user_array", "a");
        assert!(filter.matches(&Value::FloatArray(vec![1.0])));
        assert!(filter.matches(&Value::TwoDFloatArray(vec![vec![1.0]])));
        assert!(!filter.matches(&Value::Integer(1)));
    }

    #[test]
    fn unknown_type_matches_nothing() {
        let filter = TypeFilter::new("quaternion", "a");
        assert!(!filter.matches(&Value::Integer(1)));
        assert!(!filter.matches(&Value::String("x".to_string())));
    }
}
