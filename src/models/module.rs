//! Catalog module model
//!
//! A module is a priced line item of an elevator installation (cabin, motor,
//! doors, ...). Budgets embed full copies of modules, so the same type serves
//! both the master catalog and budget lines.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::ids::ModuleId;

fn default_units() -> u32 {
    1
}

/// Older writers stored unparseable prices as `null` or as text
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(price.filter(|p| p.is_finite()).unwrap_or(0.0))
}

fn lenient_units<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let units = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(units
        .filter(|u| u.is_finite())
        .map(|u| u.trunc().clamp(1.0, u32::MAX as f64) as u32)
        .unwrap_or(1))
}

/// A priced catalog module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Unique identifier
    pub id: ModuleId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    /// Unit price; missing or unreadable prices load as zero
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,

    /// Public path of the uploaded image, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Inline image as a data URL (empty when no image was attached)
    #[serde(default)]
    pub image_data: String,

    /// Quantity; only meaningful on a budget line
    #[serde(default = "default_units", deserialize_with = "lenient_units")]
    pub units: u32,

    /// Fields written by other tools, kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Module {
    /// Create a new module
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            category: category.into(),
            price,
            image_url: None,
            image_data: String::new(),
            units: 1,
            extra: BTreeMap::new(),
        }
    }

    /// Copy this module into a budget line with a single unit
    pub fn snapshot(&self) -> Self {
        Self {
            units: 1,
            ..self.clone()
        }
    }

    /// Price times units
    pub fn line_total(&self) -> f64 {
        self.price * self.units as f64
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some() || !self.image_data.is_empty()
    }

    /// Validate the module
    pub fn validate(&self) -> Result<(), ModuleValidationError> {
        if self.title.trim().is_empty() {
            return Err(ModuleValidationError::EmptyTitle);
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ModuleValidationError::InvalidPrice(self.price));
        }

        if self.units == 0 {
            return Err(ModuleValidationError::ZeroUnits);
        }

        Ok(())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for modules
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleValidationError {
    EmptyTitle,
    InvalidPrice(f64),
    ZeroUnits,
}

impl fmt::Display for ModuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Module title cannot be empty"),
            Self::InvalidPrice(price) => {
                write!(f, "Module price must be a non-negative number (got {})", price)
            }
            Self::ZeroUnits => write!(f, "Module units must be at least 1"),
        }
    }
}

impl std::error::Error for ModuleValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cabin() -> Module {
        Module::new(ModuleId::from_raw(1), "Cabin", "Structure", 1500.0)
    }

    #[test]
    fn test_snapshot_resets_units() {
        let mut module = cabin();
        module.units = 4;
        let line = module.snapshot();
        assert_eq!(line.units, 1);
        assert_eq!(line.title, "Cabin");
    }

    #[test]
    fn test_line_total() {
        let mut line = cabin().snapshot();
        line.units = 3;
        assert_eq!(line.line_total(), 4500.0);
    }

    #[test]
    fn test_validation() {
        let mut module = cabin();
        assert!(module.validate().is_ok());

        module.price = -1.0;
        assert_eq!(module.validate(), Err(ModuleValidationError::InvalidPrice(-1.0)));

        module.price = f64::NAN;
        assert!(module.validate().is_err());

        module.price = 10.0;
        module.title = "  ".into();
        assert_eq!(module.validate(), Err(ModuleValidationError::EmptyTitle));
    }

    #[test]
    fn test_unreadable_price_loads_as_zero() {
        let modules: Vec<Module> = serde_json::from_value(json!([
            { "id": 1, "title": "A", "price": null },
            { "id": 2, "title": "B", "price": "12.5" },
            { "id": 3, "title": "C", "price": "" },
            { "id": 4, "title": "D" }
        ]))
        .unwrap();

        let prices: Vec<f64> = modules.iter().map(|m| m.price).collect();
        assert_eq!(prices, vec![0.0, 12.5, 0.0, 0.0]);
    }

    #[test]
    fn test_unreadable_units_load_as_one() {
        let lines: Vec<Module> = serde_json::from_value(json!([
            { "id": 1, "units": null },
            { "id": 2, "units": "3" },
            { "id": 3, "units": 0 },
            { "id": 4, "units": 2 }
        ]))
        .unwrap();

        let units: Vec<u32> = lines.iter().map(|m| m.units).collect();
        assert_eq!(units, vec![1, 3, 1, 2]);
    }

    #[test]
    fn test_legacy_json_shape() {
        let module: Module = serde_json::from_value(json!({
            "id": 1718000000000i64,
            "title": "Motor",
            "description": "Gearless",
            "category": "Traction",
            "price": 3200,
            "imageUrl": "/uploads/1718000000000.png",
            "supplier": "Acme"
        }))
        .unwrap();

        assert_eq!(module.price, 3200.0);
        assert_eq!(module.units, 1);
        assert_eq!(module.image_data, "");
        assert_eq!(module.extra.get("supplier"), Some(&json!("Acme")));

        let back = serde_json::to_value(&module).unwrap();
        assert_eq!(back["imageUrl"], "/uploads/1718000000000.png");
        assert_eq!(back["supplier"], "Acme");
    }
}
