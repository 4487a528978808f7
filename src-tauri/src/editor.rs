use chrono::{DateTime, SecondsFormat, Utc};

use crate::calendar::today_jalali;
use crate::config::AppConfig;
use crate::db::Database;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{DiscountType, Invoice, LineItem, Totals};
use crate::totals::compute_totals;

/// In-memory edit buffer for one invoice. Nothing here touches the store
/// except the constructors; a failed save leaves the buffer as it was.
#[derive(Debug, Clone)]
pub struct InvoiceEditor {
    invoice: Invoice,
    default_unit: String,
}

impl InvoiceEditor {
    /// Fresh draft with the next suggested number and today's date.
    pub fn new_draft(db: &Database, config: &AppConfig) -> AppResult<Self> {
        let number = db.next_invoice_number()?;
        Ok(Self::from_parts(number, today_jalali(), config))
    }

    pub fn from_parts(number: String, date: String, config: &AppConfig) -> Self {
        Self {
            invoice: Invoice {
                number,
                date,
                overall_discount_type: DiscountType::Percent,
                overall_discount_value: 0.0,
                tax_percent: config.default_tax_percent,
                ..Default::default()
            },
            default_unit: config.default_unit.clone(),
        }
    }

    pub fn open(db: &Database, id: i64, config: &AppConfig) -> AppResult<Self> {
        let invoice = db.get_invoice(id)?.ok_or(AppError::NotFound(id))?;
        Ok(Self {
            invoice,
            default_unit: config.default_unit.clone(),
        })
    }

    /// Wraps a record coming back from the UI as-is.
    pub fn from_invoice(invoice: Invoice, config: &AppConfig) -> Self {
        Self {
            invoice,
            default_unit: config.default_unit.clone(),
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn invoice_mut(&mut self) -> &mut Invoice {
        &mut self.invoice
    }

    pub fn is_editing_saved(&self) -> bool {
        self.invoice.id.is_some()
    }

    /// Blank item for the item dialog.
    pub fn blank_item(&self) -> LineItem {
        LineItem::new("", self.default_unit.clone())
    }

    /// Appends `item`, or replaces the one at `index`.
    pub fn upsert_item(&mut self, index: Option<usize>, item: LineItem) -> Result<(), ValidationError> {
        if item.name.trim().is_empty() {
            return Err(ValidationError::MissingItemName);
        }
        if !(item.unit_price > 0.0) {
            return Err(ValidationError::NonPositiveUnitPrice);
        }

        match index {
            Some(i) => {
                let slot = self
                    .invoice
                    .items
                    .get_mut(i)
                    .ok_or(ValidationError::NoSuchItem(i))?;
                *slot = item;
            }
            None => self.invoice.items.push(item),
        }
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index < self.invoice.items.len() {
            Some(self.invoice.items.remove(index))
        } else {
            None
        }
    }

    /// Recomputed on every call from the current buffer.
    pub fn totals(&self) -> Totals {
        compute_totals(
            &self.invoice.items,
            &self.invoice.overall_discount(),
            self.invoice.tax_percent,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_invoice(&self.invoice)
    }

    /// The record as it should be written: validated, item numbers made
    /// finite, totals frozen and `updatedAt` stamped.
    pub fn prepare_submission(&self, now: DateTime<Utc>) -> Result<Invoice, ValidationError> {
        self.validate()?;

        let mut record = self.invoice.clone();
        record.items = record.items.iter().map(LineItem::sanitized).collect();
        record.totals = compute_totals(&record.items, &record.overall_discount(), record.tax_percent);
        record.updated_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(record)
    }

    /// Adopt the stored copy after a successful save so later saves update it.
    pub fn mark_saved(&mut self, saved: Invoice) {
        self.invoice = saved;
    }
}

pub fn validate_invoice(invoice: &Invoice) -> Result<(), ValidationError> {
    if invoice.client_name.trim().is_empty() {
        return Err(ValidationError::MissingClientName);
    }
    if invoice.items.is_empty() {
        return Err(ValidationError::NoItems);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn editor() -> InvoiceEditor {
        InvoiceEditor::from_parts(
            "INV-0001".to_string(),
            "1404/05/16".to_string(),
            &AppConfig::default(),
        )
    }

    fn priced(name: &str, price: f64) -> LineItem {
        LineItem {
            unit_price: price,
            ..LineItem::new(name, "عدد")
        }
    }

    #[test]
    fn test_new_draft_defaults() {
        let editor = editor();
        let invoice = editor.invoice();

        assert_eq!(invoice.tax_percent, 9.0);
        assert_eq!(invoice.overall_discount_type, DiscountType::Percent);
        assert!(invoice.items.is_empty());
        assert!(!editor.is_editing_saved());
        assert_eq!(editor.blank_item().unit, "عدد");
        assert_eq!(editor.blank_item().quantity, 1.0);
    }

    #[test]
    fn test_upsert_item_rules() {
        let mut editor = editor();

        assert_eq!(
            editor.upsert_item(None, priced("", 10.0)),
            Err(ValidationError::MissingItemName)
        );
        assert_eq!(
            editor.upsert_item(None, priced("Cable", 0.0)),
            Err(ValidationError::NonPositiveUnitPrice)
        );
        assert_eq!(
            editor.upsert_item(Some(3), priced("Cable", 10.0)),
            Err(ValidationError::NoSuchItem(3))
        );

        editor.upsert_item(None, priced("Cable", 10.0)).unwrap();
        editor.upsert_item(Some(0), priced("Cable 2m", 20.0)).unwrap();
        assert_eq!(editor.invoice().items.len(), 1);
        assert_eq!(editor.invoice().items[0].name, "Cable 2m");

        assert!(editor.remove_item(5).is_none());
        assert_eq!(editor.remove_item(0).unwrap().name, "Cable 2m");
    }

    #[test]
    fn test_totals_follow_buffer() {
        let mut editor = editor();
        editor.upsert_item(None, priced("A", 1000.0)).unwrap();
        assert_eq!(editor.totals().grand_total, 1090.0);

        editor.invoice_mut().tax_percent = 0.0;
        assert_eq!(editor.totals().grand_total, 1000.0);
    }

    #[test]
    fn test_validation_blocks_submission() {
        let mut editor = editor();
        let now = Utc.with_ymd_and_hms(2025, 8, 7, 10, 0, 0).unwrap();

        assert_eq!(
            editor.prepare_submission(now),
            Err(ValidationError::MissingClientName)
        );

        editor.invoice_mut().client_name = "Client".to_string();
        assert_eq!(editor.prepare_submission(now), Err(ValidationError::NoItems));
    }

    #[test]
    fn test_prepare_submission_freezes_totals() {
        let mut editor = editor();
        editor.invoice_mut().client_name = "Client".to_string();
        editor.upsert_item(None, priced("A", 1000.0)).unwrap();
        editor.invoice_mut().items[0].discount_percent = f64::NAN;

        let now = Utc.with_ymd_and_hms(2025, 8, 7, 10, 0, 0).unwrap();
        let record = editor.prepare_submission(now).unwrap();

        assert_eq!(record.items[0].discount_percent, 0.0);
        assert_eq!(record.totals, editor.totals());
        assert_eq!(record.updated_at, "2025-08-07T10:00:00.000Z");
        assert!(editor.invoice().updated_at.is_empty());
    }
}
