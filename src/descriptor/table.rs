use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use tracing::{debug, info};

use crate::{
    error::{VgenError, VgenResult},
    parser::{csv_escape, csv_row},
};

use super::order_dict::OrderDict;

/// One descriptor row: column name to raw cell value, in column order
pub type Record = OrderDict<String, String>;

/// Build a record from a list of key/value pairs
pub fn record<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item=(K,V)>) -> Record {
    pairs.into_iter().map(|(k,v)| (k.into(), v.into())).collect()
}

/// Descriptor table as stored in a CSV file: a header and ordered records
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {

    pub fn new(columns: &[&str]) -> Self {
        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> VgenResult<Table> {
        debug!("Reading descriptor table {}", path.as_ref().display());
        let txt = fs::read_to_string(path)?;
        Table::parse(&txt)
    }

    /// Parse CSV content: the first non empty line is the header
    pub fn parse(txt: &str) -> VgenResult<Table> {
        let mut table = Table::default();
        let mut header_done = false;
        for (i, line) in txt.lines().enumerate() {
            let line_num = i + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let cells = csv_row(line).map_err(|e| VgenError::parse(line_num, e.to_string()))?;
            if !header_done {
                table.columns = cells;
                header_done = true;
                continue;
            }
            if cells.len() > table.columns.len() {
                return Err(VgenError::parse(
                    line_num,
                    format!("{} cells for {} columns", cells.len(), table.columns.len()),
                ));
            }
            let mut rec = Record::with_capacity(table.columns.len());
            for (k, col) in table.columns.iter().enumerate() {
                rec.insert(col.to_owned(), cells.get(k).cloned().unwrap_or_default());
            }
            table.records.push(rec);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item=&Record> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item=&str> {
        self.records.iter().map(|r| r.get("name").map(|s| s.as_str()).unwrap_or(""))
    }

    /// Check every record carries all the keys
    pub fn check_keys(&self, keys: &[&str]) -> VgenResult<()> {
        for (row, rec) in self.records.iter().enumerate() {
            if let Some(key) = keys.iter().find(|k| !rec.contains_key(**k)) {
                return Err(VgenError::MissingKey {
                    row: row + 1,
                    name: rec.get("name").cloned().unwrap_or_default(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check descriptor names are unique
    pub fn check_unique(&self) -> VgenResult<()> {
        let mut names = HashSet::with_capacity(self.len());
        for name in self.names() {
            if !names.insert(name) {
                return Err(VgenError::Duplicated(name.to_owned()));
            }
        }
        Ok(())
    }

    /// Format a record following a column order, missing cells left blank
    pub fn format_row(columns: &[String], rec: &Record) -> String {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| csv_escape(rec.get(c).map(|s| s.as_str()).unwrap_or("")))
            .collect();
        cells.join(",")
    }

    pub fn to_csv(&self) -> String {
        let mut txt = String::with_capacity(64 * (self.len() + 1));
        let header: Vec<String> = self.columns.iter().map(|c| csv_escape(c)).collect();
        txt.push_str(&header.join(","));
        txt.push('\n');
        for rec in self.records.iter() {
            txt.push_str(&Table::format_row(&self.columns, rec));
            txt.push('\n');
        }
        txt
    }

    /// Append records at the end of a CSV store, keeping its column order.
    /// A missing store is created with `header` as columns.
    pub fn append<P: AsRef<Path>>(path: P, records: &[Record], required_keys: &[&str], header: &[&str]) -> VgenResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            let mut table = Table::new(header);
            table.records.extend(records.iter().cloned());
            fs::write(path, table.to_csv())?;
            info!("Created {} with {} records", path.display(), records.len());
            return Ok(());
        }
        let existing = fs::read_to_string(path)?;
        let columns = Table::parse(&existing)?.columns;
        if let Some(key) = required_keys.iter().find(|k| !columns.iter().any(|c| c == *k)) {
            return Err(VgenError::MissingKey { row: 1, name: "header".to_owned(), key: key.to_string() });
        }
        let mut txt = String::new();
        if !existing.is_empty() && !existing.ends_with('\n') {
            txt.push('\n');
        }
        for rec in records {
            txt.push_str(&Table::format_row(&columns, rec));
            txt.push('\n');
        }
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(txt.as_bytes())?;
        info!("Appended {} records to {}", records.len(), path.display());
        Ok(())
    }
}
