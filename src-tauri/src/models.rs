use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Fixed identity of the single seller profile record.
pub const SELLER_PROFILE_ID: &str = "seller_data";

/// Reads a number the way the invoice form does: numbers pass through,
/// strings are parsed with thousands separators removed, and anything else
/// (null, missing, garbage, NaN) becomes 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.replace(',', "").trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    Ok(finite_or_zero(number))
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_percent: f64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: unit.into(),
            quantity: 1.0,
            unit_price: 0.0,
            discount_percent: 0.0,
        }
    }

    /// Copy with every numeric field forced finite, as stored on submit.
    pub fn sanitized(&self) -> Self {
        Self {
            quantity: finite_or_zero(self.quantity),
            unit_price: finite_or_zero(self.unit_price),
            discount_percent: finite_or_zero(self.discount_percent),
            ..self.clone()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percent,
    #[serde(other)]
    Amount,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct OverallDiscount {
    #[serde(rename = "type", default)]
    pub kind: DiscountType,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: f64,
}

impl OverallDiscount {
    pub fn percent(value: f64) -> Self {
        Self {
            kind: DiscountType::Percent,
            value,
        }
    }

    pub fn amount(value: f64) -> Self {
        Self {
            kind: DiscountType::Amount,
            value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub final_discount: f64,
    pub tax: f64,
    pub grand_total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub number: String,
    pub date: String,
    pub is_proforma: bool,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub items: Vec<LineItem>,
    pub overall_discount_type: DiscountType,
    #[serde(deserialize_with = "lenient_number")]
    pub overall_discount_value: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub tax_percent: f64,
    pub payment_account: String,
    pub payment_description: String,
    pub general_notes: String,
    /// Snapshot taken at save time; never recomputed on load.
    pub totals: Totals,
    pub updated_at: String,
}

impl Invoice {
    pub fn overall_discount(&self) -> OverallDiscount {
        OverallDiscount {
            kind: self.overall_discount_type,
            value: self.overall_discount_value,
        }
    }

    pub fn document_kind(&self) -> &'static str {
        if self.is_proforma {
            "Proforma"
        } else {
            "Invoice"
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerProfile {
    pub name: String,
    pub phone: String,
    pub office_phone: String,
    pub email: String,
    pub address: String,
    /// Image as a data URL, empty when unset.
    pub logo: String,
    pub signature: String,
}

impl SellerProfile {
    pub fn logo(&self) -> Option<&str> {
        non_empty(&self.logo)
    }

    pub fn signature(&self) -> Option<&str> {
        non_empty(&self.signature)
    }
}

pub(crate) fn non_empty(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Row of the history screen.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: i64,
    pub number: String,
    pub client_name: String,
    pub date: String,
    pub is_proforma: bool,
    pub grand_total: f64,
    pub item_count: i64,
}
