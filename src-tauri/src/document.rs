//! Projects a saved invoice and the seller profile onto a single fixed-size
//! page description. No I/O happens here; an export backend turns the
//! description into a file.
//!
//! All text is laid out right-to-left. Identifiers that read left-to-right
//! (numbers, phones, account strings) are wrapped in directional isolates
//! by [`crate::format::isolate_ltr`].

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::format::{format_amount, format_plain, ltr_token, DigitSet};
use crate::models::{non_empty, Invoice, LineItem, SellerProfile};
use crate::totals::line_net;

pub const PLACEHOLDER: &str = "---";

const HEADING_PROFORMA: &str = "پیش‌ فاکتور فروش";
const HEADING_INVOICE: &str = "فاکتور فروش";

const LABEL_OFFICE_PHONE: &str = "تلفن دفتر";
const LABEL_PHONE: &str = "تلفن";
const LABEL_NUMBER: &str = "شماره";
const LABEL_DATE: &str = "تاریخ";
const LABEL_BUYER: &str = "مشخصات خریدار";
const LABEL_CLIENT: &str = "صورتحساب";
const LABEL_ADDRESS: &str = "نشانی";
const LABEL_PAYMENT: &str = "جزئیات پرداخت";
const LABEL_ACCOUNT: &str = "حساب/شبا";
const LABEL_SUBTOTAL: &str = "جمع کل";
const LABEL_DISCOUNT: &str = "تخفیف فاکتور";
const LABEL_TAX: &str = "مالیات";
const LABEL_PAYABLE: &str = "قابل پرداخت";
const LABEL_NOTES: &str = "توضیحات";
const LABEL_SELLER_SIGN: &str = "مهر و امضای فروشنده";
const LABEL_BUYER_SIGN: &str = "تایید و امضای خریدار";

/// (title, width %) for the items table, in reading order.
const ITEM_COLUMNS: [(&str, u8); 6] = [
    ("", 5),
    ("شرح کالا / خدمات", 35),
    ("تعداد", 12),
    ("قیمت واحد", 18),
    ("تخفیف", 10),
    ("جمع نهایی", 20),
];

const SIGN_OFF_WIDTH_PT: f32 = 150.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub digits: DigitSet,
    pub currency_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RenderOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            digits: config.digits,
            currency_label: config.currency_label.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub width_mm: f32,
    pub height_mm: f32,
    pub padding_pt: f32,
    pub font_size_pt: f32,
    pub direction: TextDirection,
}

impl PageSpec {
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            padding_pt: 35.0,
            font_size_pt: 9.0,
            direction: TextDirection::Rtl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderBlock {
    pub logo: Option<String>,
    pub seller_name: Option<String>,
    pub seller_address: Option<String>,
    /// Office phone then mobile, each only when set.
    pub contacts: Vec<Field>,
    pub number: Field,
    pub date: Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerBlock {
    pub title: String,
    pub client: Field,
    pub address: Field,
    pub phone: Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub title: String,
    pub width_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub sequence: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub unit: String,
    pub unit_price: String,
    pub discount: String,
    pub net_total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsTable {
    pub columns: Vec<Column>,
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBlock {
    pub title: String,
    pub account: Option<Field>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryBlock {
    pub subtotal: SummaryLine,
    pub discount: Option<SummaryLine>,
    pub tax: SummaryLine,
    pub grand_total: SummaryLine,
    pub currency: String,
}

impl SummaryBlock {
    /// Lines in print order, grand total last.
    pub fn lines(&self) -> Vec<&SummaryLine> {
        let mut lines = vec![&self.subtotal];
        lines.extend(self.discount.as_ref());
        lines.push(&self.tax);
        lines.push(&self.grand_total);
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesBlock {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOff {
    pub label: String,
    pub width_pt: f32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub seller: SignOff,
    pub buyer: SignOff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDescription {
    pub title: String,
    pub page: PageSpec,
    pub heading: String,
    pub header: HeaderBlock,
    pub buyer: BuyerBlock,
    pub items: ItemsTable,
    pub payment: PaymentBlock,
    pub summary: SummaryBlock,
    pub notes: Option<NotesBlock>,
    pub signature: Option<SignatureBlock>,
}

/// Title and heading depend on nothing but the proforma flag.
pub fn heading_for(is_proforma: bool) -> &'static str {
    if is_proforma {
        HEADING_PROFORMA
    } else {
        HEADING_INVOICE
    }
}

pub fn project_document(invoice: &Invoice, seller: Option<&SellerProfile>) -> DocumentDescription {
    project_document_with(invoice, seller, &RenderOptions::default())
}

pub fn project_document_with(
    invoice: &Invoice,
    seller: Option<&SellerProfile>,
    options: &RenderOptions,
) -> DocumentDescription {
    let empty = SellerProfile::default();
    let seller = seller.unwrap_or(&empty);
    let heading = heading_for(invoice.is_proforma).to_string();

    DocumentDescription {
        title: heading.clone(),
        page: PageSpec::a4(),
        heading,
        header: header_block(invoice, seller, options.digits),
        buyer: buyer_block(invoice, options.digits),
        items: items_table(&invoice.items, options.digits),
        payment: payment_block(invoice, options.digits),
        summary: summary_block(invoice, options),
        notes: non_empty(&invoice.general_notes).map(|text| NotesBlock {
            title: LABEL_NOTES.to_string(),
            text: text.to_string(),
        }),
        signature: seller.signature().map(|image| SignatureBlock {
            seller: SignOff {
                label: LABEL_SELLER_SIGN.to_string(),
                width_pt: SIGN_OFF_WIDTH_PT,
                image: Some(image.to_string()),
            },
            buyer: SignOff {
                label: LABEL_BUYER_SIGN.to_string(),
                width_pt: SIGN_OFF_WIDTH_PT,
                image: None,
            },
        }),
    }
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn header_block(invoice: &Invoice, seller: &SellerProfile, digits: DigitSet) -> HeaderBlock {
    let mut contacts = Vec::new();
    if let Some(office) = non_empty(&seller.office_phone) {
        contacts.push(Field::new(LABEL_OFFICE_PHONE, ltr_token(office, digits)));
    }
    if let Some(phone) = non_empty(&seller.phone) {
        contacts.push(Field::new(LABEL_PHONE, ltr_token(phone, digits)));
    }

    HeaderBlock {
        logo: seller.logo().map(str::to_string),
        seller_name: non_empty(&seller.name).map(str::to_string),
        seller_address: non_empty(&seller.address).map(str::to_string),
        contacts,
        number: Field::new(
            LABEL_NUMBER,
            or_placeholder(non_empty(&invoice.number).map(|n| ltr_token(n, digits))),
        ),
        date: Field::new(
            LABEL_DATE,
            or_placeholder(non_empty(&invoice.date).map(|d| ltr_token(d, digits))),
        ),
    }
}

fn buyer_block(invoice: &Invoice, digits: DigitSet) -> BuyerBlock {
    BuyerBlock {
        title: LABEL_BUYER.to_string(),
        client: Field::new(
            LABEL_CLIENT,
            or_placeholder(non_empty(&invoice.client_name).map(str::to_string)),
        ),
        address: Field::new(
            LABEL_ADDRESS,
            or_placeholder(non_empty(&invoice.client_address).map(str::to_string)),
        ),
        phone: Field::new(
            LABEL_PHONE,
            or_placeholder(non_empty(&invoice.client_phone).map(|p| ltr_token(p, digits))),
        ),
    }
}

fn items_table(items: &[LineItem], digits: DigitSet) -> ItemsTable {
    let columns = ITEM_COLUMNS
        .iter()
        .map(|(title, width)| Column {
            title: title.to_string(),
            width_percent: *width,
        })
        .collect();

    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemRow {
            sequence: digits.transliterate(&(i + 1).to_string()),
            name: item.name.clone(),
            description: non_empty(&item.description).map(str::to_string),
            quantity: format_amount(item.quantity, digits),
            unit: item.unit.clone(),
            unit_price: format_amount(item.unit_price, digits),
            discount: if item.discount_percent > 0.0 {
                format!("%{}", format_plain(item.discount_percent, digits))
            } else {
                PLACEHOLDER.to_string()
            },
            net_total: format_amount(line_net(item), digits),
        })
        .collect();

    ItemsTable { columns, rows }
}

fn payment_block(invoice: &Invoice, digits: DigitSet) -> PaymentBlock {
    PaymentBlock {
        title: LABEL_PAYMENT.to_string(),
        account: non_empty(&invoice.payment_account)
            .map(|account| Field::new(LABEL_ACCOUNT, ltr_token(account, digits))),
        description: invoice.payment_description.clone(),
    }
}

fn summary_block(invoice: &Invoice, options: &RenderOptions) -> SummaryBlock {
    let digits = options.digits;
    let totals = &invoice.totals;
    let line = |label: String, value: String, emphasized: bool| SummaryLine {
        label,
        value,
        emphasized,
    };

    let has_discount = totals.final_discount != 0.0 && !totals.final_discount.is_nan();

    SummaryBlock {
        subtotal: line(
            LABEL_SUBTOTAL.to_string(),
            format_amount(totals.subtotal, digits),
            false,
        ),
        discount: has_discount.then(|| {
            line(
                LABEL_DISCOUNT.to_string(),
                format!("({}-)", format_amount(totals.final_discount, digits)),
                false,
            )
        }),
        tax: line(
            format!("{LABEL_TAX} ({}%)", format_plain(invoice.tax_percent, digits)),
            format!("{}+", format_amount(totals.tax, digits)),
            false,
        ),
        grand_total: line(
            LABEL_PAYABLE.to_string(),
            format_amount(totals.grand_total, digits),
            true,
        ),
        currency: options.currency_label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{LRI, PDI};
    use crate::models::{OverallDiscount, Totals};
    use crate::totals::compute_totals;

    fn sample_invoice() -> Invoice {
        let items = vec![
            LineItem {
                description: "2024, 16GB RAM".to_string(),
                quantity: 1.0,
                unit_price: 42_500_000.0,
                discount_percent: 5.0,
                ..LineItem::new("Laptop", "عدد")
            },
            LineItem {
                quantity: 2.0,
                unit_price: 1_200_000.0,
                ..LineItem::new("Mouse", "عدد")
            },
        ];
        let totals = compute_totals(&items, &OverallDiscount::percent(3.0), 9.0);
        Invoice {
            id: Some(1),
            number: "INV-0007".to_string(),
            date: "1404/05/16".to_string(),
            client_name: "Client".to_string(),
            client_phone: "09123456789".to_string(),
            items,
            overall_discount_value: 3.0,
            tax_percent: 9.0,
            payment_account: "IR12 3456".to_string(),
            payment_description: "7 days".to_string(),
            totals,
            ..Default::default()
        }
    }

    #[test]
    fn test_heading_depends_only_on_proforma_flag() {
        let mut invoice = sample_invoice();
        let regular = project_document(&invoice, None);
        invoice.is_proforma = true;
        invoice.client_name = "Someone else".to_string();
        let proforma = project_document(&invoice, None);

        assert_eq!(regular.heading, HEADING_INVOICE);
        assert_eq!(regular.title, HEADING_INVOICE);
        assert_eq!(proforma.heading, HEADING_PROFORMA);
        assert_eq!(proforma.title, HEADING_PROFORMA);
    }

    #[test]
    fn test_item_rows() {
        let doc = project_document(&sample_invoice(), None);
        let rows = &doc.items.rows;

        assert_eq!(doc.items.columns.len(), 6);
        assert_eq!(
            doc.items.columns.iter().map(|c| c.width_percent as u32).sum::<u32>(),
            100
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sequence, "۱");
        assert_eq!(rows[0].unit_price, "۴۲,۵۰۰,۰۰۰");
        assert_eq!(rows[0].discount, "%۵");
        assert_eq!(rows[0].net_total, "۴۰,۳۷۵,۰۰۰");
        assert_eq!(rows[0].description.as_deref(), Some("2024, 16GB RAM"));
        assert_eq!(rows[1].discount, PLACEHOLDER);
        assert_eq!(rows[1].quantity, "۲");
        assert!(rows[1].description.is_none());
    }

    #[test]
    fn test_quantity_is_rounded() {
        let mut invoice = sample_invoice();
        invoice.items[1].quantity = 2.5;
        let doc = project_document_with(
            &invoice,
            None,
            &RenderOptions {
                digits: DigitSet::Latin,
                currency_label: "IRR".to_string(),
            },
        );
        assert_eq!(doc.items.rows[1].quantity, "3");
        assert_eq!(doc.items.rows[1].net_total, "3,000,000");
    }

    #[test]
    fn test_summary_uses_frozen_totals() {
        let mut invoice = sample_invoice();
        invoice.totals = Totals {
            subtotal: 100.0,
            final_discount: 0.0,
            tax: 9.0,
            grand_total: 109.0,
        };
        let doc = project_document_with(
            &invoice,
            None,
            &RenderOptions {
                digits: DigitSet::Latin,
                currency_label: "IRR".to_string(),
            },
        );

        assert_eq!(doc.summary.subtotal.value, "100");
        assert!(doc.summary.discount.is_none());
        assert_eq!(doc.summary.tax.label, "مالیات (9%)");
        assert_eq!(doc.summary.tax.value, "9+");
        assert_eq!(doc.summary.grand_total.value, "109");
        assert!(doc.summary.grand_total.emphasized);
        assert_eq!(doc.summary.currency, "IRR");
        assert_eq!(doc.summary.lines().len(), 3);
    }

    #[test]
    fn test_discount_line_when_non_zero() {
        let doc = project_document(&sample_invoice(), None);
        let discount = doc.summary.discount.as_ref().unwrap();

        assert_eq!(discount.value, "(۱,۲۸۳,۲۵۰-)");
        assert_eq!(doc.summary.grand_total.value, "۴۵,۲۲۶,۰۰۸");
        assert_eq!(doc.summary.currency, "ریال");
        assert_eq!(doc.summary.lines().len(), 4);
    }

    #[test]
    fn test_ltr_tokens_are_isolated() {
        let seller = SellerProfile {
            name: "Shop".to_string(),
            phone: "0912 000 0000".to_string(),
            office_phone: "021-8888".to_string(),
            ..Default::default()
        };
        let doc = project_document(&sample_invoice(), Some(&seller));

        let phone = &doc.buyer.phone.value;
        assert!(phone.starts_with(LRI) && phone.ends_with(PDI));
        assert!(phone.contains("۰۹۱۲۳۴۵۶۷۸۹"));

        let account = doc.payment.account.as_ref().unwrap();
        assert_eq!(account.value, format!("{LRI}IR۱۲ ۳۴۵۶{PDI}"));

        assert_eq!(doc.header.contacts.len(), 2);
        assert_eq!(doc.header.contacts[0].label, LABEL_OFFICE_PHONE);
        assert_eq!(doc.header.number.value, format!("{LRI}INV-۰۰۰۷{PDI}"));
        assert_eq!(doc.page.direction, TextDirection::Rtl);
    }

    #[test]
    fn test_placeholders_for_missing_values() {
        let invoice = Invoice {
            items: vec![LineItem::new("x", "")],
            ..Default::default()
        };
        let doc = project_document(&invoice, None);

        assert_eq!(doc.header.number.value, PLACEHOLDER);
        assert_eq!(doc.header.date.value, PLACEHOLDER);
        assert_eq!(doc.buyer.client.value, PLACEHOLDER);
        assert_eq!(doc.buyer.address.value, PLACEHOLDER);
        assert_eq!(doc.buyer.phone.value, PLACEHOLDER);
        assert!(doc.payment.account.is_none());
        assert!(doc.header.logo.is_none());
        assert!(doc.header.seller_name.is_none());
        assert!(doc.header.contacts.is_empty());
    }

    #[test]
    fn test_optional_blocks() {
        let mut invoice = sample_invoice();
        let doc = project_document(&invoice, None);
        assert!(doc.notes.is_none());
        assert!(doc.signature.is_none());

        invoice.general_notes = "18 months warranty".to_string();
        let seller = SellerProfile {
            signature: "data:image/png;base64,AAAA".to_string(),
            ..Default::default()
        };
        let doc = project_document(&invoice, Some(&seller));

        assert_eq!(doc.notes.unwrap().text, "18 months warranty");
        let signature = doc.signature.unwrap();
        assert_eq!(signature.seller.width_pt, 150.0);
        assert_eq!(signature.buyer.width_pt, 150.0);
        assert!(signature.seller.image.is_some());
        assert!(signature.buyer.image.is_none());
    }
}
