use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use labledger_lending::{
    IncomingRecord, InventoryItem, LedgerEntry, OutgoingRecord, PendingBalance, TransactionRecord,
};

use super::{RelationStore, StoreError};

/// A record type with a fixed CSV header row.
///
/// `HEADERS` must list the serde field names in declaration order, since rows
/// are written without serde's own header inference.
pub trait Tabular {
    const HEADERS: &'static [&'static str];
}

impl Tabular for InventoryItem {
    const HEADERS: &'static [&'static str] = &["Product", "Quantity"];
}

impl Tabular for LedgerEntry {
    const HEADERS: &'static [&'static str] = &["Roll No", "Name", "Product", "Date", "Status"];
}

impl Tabular for TransactionRecord {
    const HEADERS: &'static [&'static str] = &["Roll No", "Name", "Product", "Status", "Date"];
}

impl Tabular for OutgoingRecord {
    const HEADERS: &'static [&'static str] = &["Date", "Roll No", "Name", "Product", "Quantity"];
}

impl Tabular for IncomingRecord {
    const HEADERS: &'static [&'static str] = &["Date", "Roll No", "Product", "Quantity"];
}

impl Tabular for PendingBalance {
    const HEADERS: &'static [&'static str] = &[
        "Roll No",
        "Name",
        "Product",
        "Quantity_issued",
        "Quantity_returned",
        "Pending",
    ];
}

/// Relation stored as a CSV file with a header row.
///
/// Columns are matched by header name on read, so files whose columns are in a
/// different order still load. Cells are trimmed.
#[derive(Debug)]
pub struct CsvRelation<R> {
    name: String,
    path: PathBuf,
    _rows: PhantomData<fn() -> R>,
}

impl<R> CsvRelation<R> {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            _rows: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl<R> RelationStore<R> for CsvRelation<R>
where
    R: Serialize + DeserializeOwned + Tabular,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Vec<R>, StoreError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| self.csv_error(e))?;

        tracing::debug!(relation = %self.name, rows = rows.len(), "relation loaded");
        Ok(rows)
    }

    fn save(&self, rows: &[R]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = fs::File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        write_rows(&mut writer, rows).map_err(|e| self.csv_error(e))?;
        writer.flush().map_err(|e| self.io_error(e))?;

        tracing::debug!(relation = %self.name, rows = rows.len(), "relation saved");
        Ok(())
    }
}

fn write_rows<W, R>(writer: &mut csv::Writer<W>, rows: &[R]) -> Result<(), csv::Error>
where
    W: std::io::Write,
    R: Serialize + Tabular,
{
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}

/// Render rows as CSV text with a header row (download/export format).
pub fn to_csv_string<R>(relation: &str, rows: &[R]) -> Result<String, StoreError>
where
    R: Serialize + Tabular,
{
    let export_error = |message: String| StoreError::Export {
        relation: relation.to_string(),
        message,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    write_rows(&mut writer, rows).map_err(|e| export_error(e.to_string()))?;
    let bytes = writer.into_inner().map_err(|e| export_error(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| export_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use labledger_core::ProductName;
    use labledger_lending::{EntryStatus, Inventory, Ledger};

    fn product(name: &str) -> ProductName {
        ProductName::new(name).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rel: CsvRelation<InventoryItem> = CsvRelation::new("inventory", dir.path().join("inventory.csv"));
        assert!(!rel.exists());
        assert!(rel.load().unwrap().is_empty());
    }

    #[test]
    fn empty_relation_keeps_its_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lab_outgoing.csv");
        let rel: CsvRelation<LedgerEntry> = CsvRelation::new("ledger", &path);

        rel.save(&[]).unwrap();
        assert!(rel.exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Roll No,Name,Product,Date,Status\n"
        );
        assert!(rel.load().unwrap().is_empty());
    }

    #[test]
    fn ledger_rows_use_form_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab_outgoing.csv");
        let rel: CsvRelation<LedgerEntry> = CsvRelation::new("ledger", &path);

        let at = Utc.with_ymd_and_hms(2025, 8, 20, 9, 15, 0).unwrap();
        let mut ledger = Ledger::new(Inventory::default_lab_stock(), vec![]);
        ledger.issue("22BCS001", "Rahul", "Microscope", at).unwrap();
        ledger.issue("22BCS002", "Priya", "Test Tube", at).unwrap();
        ledger.return_item("22BCS002", "Test Tube", at).unwrap();

        rel.save(ledger.entries()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Roll No,Name,Product,Date,Status\n\
             22BCS001,Rahul,Microscope,2025-08-20 09:15,Not Returned\n\
             22BCS002,Priya,Test Tube,2025-08-20 09:15,Returned\n"
        );
        assert_eq!(rel.load().unwrap(), ledger.entries());
    }

    #[test]
    fn loads_files_written_by_older_tools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab_outgoing.csv");
        // Date-only values, reordered columns and padded cells.
        fs::write(
            &path,
            "Status,Roll No,Name,Product,Date\nNot Returned, 22BCS001 ,Rahul,Microscope,2025-08-20\n",
        )
        .unwrap();

        let rel: CsvRelation<LedgerEntry> = CsvRelation::new("ledger", &path);
        let rows = rel.load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].roll.as_str(), "22BCS001");
        assert_eq!(rows[0].status, EntryStatus::NotReturned);
        assert_eq!(
            rows[0].date,
            Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn malformed_rows_report_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        fs::write(&path, "Product,Quantity\nBeaker,-3\n").unwrap();

        let rel: CsvRelation<InventoryItem> = CsvRelation::new("inventory", &path);
        let err = rel.load().unwrap_err();
        assert!(matches!(err, StoreError::Csv { .. }));
        assert!(err.to_string().contains("inventory.csv"));
    }

    #[test]
    fn blank_names_in_old_log_rows_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab_outgoing.csv");
        fs::write(
            &path,
            "Roll No,Name,Product,Date,Status\n\
             22BCS001,,Beaker,2025-08-20,Not Returned\n\
             ,Priya,Slide,2025-08-21,Returned\n",
        )
        .unwrap();

        let rel: CsvRelation<LedgerEntry> = CsvRelation::new("ledger", &path);
        let rows = rel.load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student_name.as_str(), "");
        assert_eq!(rows[0].product, product("Beaker"));
        assert_eq!(rows[1].roll.as_str(), "");

        rel.save(&rows).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Roll No,Name,Product,Date,Status\n\
             22BCS001,,Beaker,2025-08-20 00:00,Not Returned\n\
             ,Priya,Slide,2025-08-21 00:00,Returned\n"
        );
    }

    #[test]
    fn blank_inventory_product_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        fs::write(&path, "Product,Quantity\n  ,3\n").unwrap();

        let rel: CsvRelation<InventoryItem> = CsvRelation::new("inventory", &path);
        assert!(rel.load().is_err());
    }

    #[test]
    fn export_renders_header_and_rows() {
        let items = vec![InventoryItem::new(product("Beaker"), 50)];
        assert_eq!(
            to_csv_string("inventory", &items).unwrap(),
            "Product,Quantity\nBeaker,50\n"
        );
        assert_eq!(
            to_csv_string::<InventoryItem>("inventory", &[]).unwrap(),
            "Product,Quantity\n"
        );
    }
}
