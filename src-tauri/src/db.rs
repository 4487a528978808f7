use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};
use crate::models::{Invoice, InvoiceSummary, SellerProfile, SELLER_PROFILE_ID};
use crate::numbering::next_number_after;

/// Local record store: a settings record keyed by a fixed id and an
/// identity-keyed invoices collection.
///
/// Every write is a single autocommit statement, so once a call returns the
/// row is durable and the next read sees it.
pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened invoice store");

        let db = Database {
            conn: Mutex::new(conn),
        };
        db.initialize()?;
        Ok(db)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let db = Database {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.initialize()?;
        Ok(db)
    }

    pub fn close(self) -> AppResult<()> {
        let conn = self.conn.into_inner().map_err(|_| AppError::LockPoisoned)?;
        conn.close().map_err(|(_, e)| AppError::Store(e))?;
        tracing::info!("closed invoice store");
        Ok(())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| AppError::LockPoisoned)
    }

    pub fn initialize(&self) -> AppResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            -- Seller profile and other singleton records
            CREATE TABLE IF NOT EXISTS settings (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Invoices: full record as JSON plus the columns the history list reads
            CREATE TABLE IF NOT EXISTS invoices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                number TEXT NOT NULL,
                client_name TEXT NOT NULL,
                date TEXT NOT NULL,
                is_proforma INTEGER NOT NULL DEFAULT 0,
                grand_total REAL NOT NULL DEFAULT 0,
                item_count INTEGER NOT NULL DEFAULT 0,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_invoices_client_name ON invoices(client_name);
            CREATE INDEX IF NOT EXISTS idx_invoices_date ON invoices(date);
            ",
        )?;

        Ok(())
    }

    /// Stores a new invoice and returns it with its assigned identity.
    pub fn insert_invoice(&self, invoice: &Invoice) -> AppResult<Invoice> {
        let conn = self.lock()?;

        let mut stored = invoice.clone();
        stored.id = None;
        let data = serde_json::to_string(&stored)?;

        conn.execute(
            "INSERT INTO invoices (number, client_name, date, is_proforma, grand_total, item_count, data, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stored.number,
                stored.client_name,
                stored.date,
                stored.is_proforma,
                stored.totals.grand_total,
                stored.items.len() as i64,
                data,
                stored.updated_at,
            ],
        )?;

        stored.id = Some(conn.last_insert_rowid());
        tracing::info!(id = ?stored.id, number = %stored.number, "invoice inserted");
        Ok(stored)
    }

    /// Replaces the record with identity `id`. Fails with `NotFound` when no
    /// such record exists.
    pub fn update_invoice(&self, id: i64, invoice: &Invoice) -> AppResult<Invoice> {
        let conn = self.lock()?;

        let mut stored = invoice.clone();
        stored.id = None;
        let data = serde_json::to_string(&stored)?;

        conn.execute(
            "UPDATE invoices
             SET number = ?1, client_name = ?2, date = ?3, is_proforma = ?4,
                 grand_total = ?5, item_count = ?6, data = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                stored.number,
                stored.client_name,
                stored.date,
                stored.is_proforma,
                stored.totals.grand_total,
                stored.items.len() as i64,
                data,
                stored.updated_at,
                id,
            ],
        )?;

        if conn.changes() == 0 {
            return Err(AppError::NotFound(id));
        }

        stored.id = Some(id);
        tracing::info!(id, number = %stored.number, "invoice updated");
        Ok(stored)
    }

    pub fn get_invoice(&self, id: i64) -> AppResult<Option<Invoice>> {
        let conn = self.lock()?;

        let data: Option<String> = conn
            .query_row("SELECT data FROM invoices WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;

        data.map(|data| -> AppResult<Invoice> {
            let mut invoice: Invoice = serde_json::from_str(&data)?;
            invoice.id = Some(id);
            Ok(invoice)
        })
        .transpose()
    }

    /// All invoices, newest identity first.
    pub fn list_invoices(&self) -> AppResult<Vec<InvoiceSummary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, number, client_name, date, is_proforma, grand_total, item_count
             FROM invoices
             ORDER BY id DESC",
        )?;

        let invoices = stmt
            .query_map([], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(invoices)
    }

    /// History row for one invoice, without decoding the stored record.
    pub fn get_invoice_summary(&self, id: i64) -> AppResult<Option<InvoiceSummary>> {
        let conn = self.lock()?;

        let summary = conn
            .query_row(
                "SELECT id, number, client_name, date, is_proforma, grand_total, item_count
                 FROM invoices
                 WHERE id = ?1",
                [id],
                summary_from_row,
            )
            .optional()?;

        Ok(summary)
    }

    /// Returns whether a record was removed. A missing identity is not an error.
    pub fn delete_invoice(&self, id: i64) -> AppResult<bool> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM invoices WHERE id = ?1", [id])?;
        let deleted = conn.changes() > 0;

        if deleted {
            tracing::info!(id, "invoice deleted");
        } else {
            tracing::debug!(id, "delete skipped, no such invoice");
        }
        Ok(deleted)
    }

    /// Display number of the invoice with the highest identity.
    pub fn last_invoice_number(&self) -> AppResult<Option<String>> {
        let conn = self.lock()?;

        let number = conn
            .query_row(
                "SELECT number FROM invoices ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(number)
    }

    pub fn next_invoice_number(&self) -> AppResult<String> {
        let last = self.last_invoice_number()?;
        Ok(next_number_after(last.as_deref()))
    }

    pub fn get_seller_profile(&self) -> AppResult<Option<SellerProfile>> {
        let conn = self.lock()?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM settings WHERE id = ?1",
                [SELLER_PROFILE_ID],
                |row| row.get(0),
            )
            .optional()?;

        Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
    }

    /// Insert or replace the seller profile.
    pub fn put_seller_profile(&self, profile: &SellerProfile) -> AppResult<()> {
        let conn = self.lock()?;
        let data = serde_json::to_string(profile)?;

        conn.execute(
            "INSERT INTO settings (id, data, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = CURRENT_TIMESTAMP",
            params![SELLER_PROFILE_ID, data],
        )?;

        tracing::info!("seller profile saved");
        Ok(())
    }
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<InvoiceSummary> {
    Ok(InvoiceSummary {
        id: row.get(0)?,
        number: row.get(1)?,
        client_name: row.get(2)?,
        date: row.get(3)?,
        is_proforma: row.get(4)?,
        grand_total: row.get(5)?,
        item_count: row.get(6)?,
    })
}
