//! Transaction file loading
//!
//! Two formats are accepted:
//! - JSON: either a bare array of transactions or an analyze-style request
//!   object `{ "user_id": 7, "transactions": [...] }`
//! - CSV with headers `id,description,amount,type,category,date` (any order,
//!   case-insensitive). `id` and `category` may be missing or empty.
//!
//! Timestamps are kept as text; the normalizer decides how to read them.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{checked_amount, Transaction, TransactionKind};

/// File formats that can be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFormat {
    Json,
    Csv,
}

impl TransactionFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::InvalidData(format!(
                "Unsupported transaction file (expected .json or .csv): {}",
                path.display()
            ))),
        }
    }
}

/// Transactions read from a file, plus the user id if the file named one
#[derive(Debug, Clone, Default)]
pub struct ImportedTransactions {
    pub user_id: Option<i64>,
    pub transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPayload {
    List(Vec<Transaction>),
    Request {
        #[serde(default)]
        user_id: Option<i64>,
        transactions: Vec<Transaction>,
    },
}

/// Load a transaction file, choosing the parser by extension
pub fn load_file(path: &Path) -> Result<ImportedTransactions> {
    let format = TransactionFormat::from_path(path)?;
    let file = std::fs::File::open(path)?;

    let imported = match format {
        TransactionFormat::Json => parse_json(file)?,
        TransactionFormat::Csv => ImportedTransactions {
            user_id: None,
            transactions: parse_csv(file)?,
        },
    };

    debug!(
        path = %path.display(),
        count = imported.transactions.len(),
        "Loaded transactions"
    );
    Ok(imported)
}

pub fn parse_json<R: Read>(reader: R) -> Result<ImportedTransactions> {
    let payload: JsonPayload = serde_json::from_reader(reader)?;
    Ok(match payload {
        JsonPayload::Request {
            user_id,
            transactions,
        } => ImportedTransactions {
            user_id,
            transactions,
        },
        JsonPayload::List(transactions) => ImportedTransactions {
            user_id: None,
            transactions,
        },
    })
}

/// Column positions resolved from the header row
struct Columns {
    id: Option<usize>,
    description: usize,
    amount: usize,
    kind: usize,
    category: Option<usize>,
    date: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();

        let required = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| Error::InvalidData(format!("Missing CSV column: {}", name)))
        };

        Ok(Self {
            id: index.get("id").copied(),
            description: required("description")?,
            amount: required("amount")?,
            kind: required("type")?,
            category: index.get("category").copied(),
            date: index
                .get("date")
                .or_else(|| index.get("timestamp"))
                .copied()
                .ok_or_else(|| Error::InvalidData("Missing CSV column: date".into()))?,
        })
    }
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = row + 2;
        let field = |i: usize| record.get(i).unwrap_or("");

        let id = match columns.id.map(field).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                Error::InvalidData(format!("Line {}: invalid id: {}", line, raw))
            })?,
            None => (row + 1) as i64,
        };

        let kind: TransactionKind = field(columns.kind)
            .parse()
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;

        let amount = parse_amount(field(columns.amount))
            .and_then(checked_amount)
            .map_err(|e| Error::InvalidData(format!("Line {}: {}", line, e)))?;

        let category = columns
            .category
            .map(field)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        transactions.push(Transaction {
            id,
            description: field(columns.description).to_string(),
            amount,
            kind,
            category,
            timestamp: field(columns.date).to_string(),
        });
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

/// Parse an amount, allowing currency symbols, thousands separators and
/// accounting-style parentheses
fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| format!("Unable to parse amount: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount(" 45 ").unwrap(), 45.0);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.0);
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_parse_csv() {
        let csv = "id,description,amount,type,category,date
1,Salary,\"3,000.00\",income,,2024-05-01
2,Whole Foods,85.20,EXPENSE,Groceries,2024-05-03T18:30:00
3,Mystery charge,12.00,Expense,,2024-05-04";

        let txs = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].kind, TransactionKind::Income);
        assert_eq!(txs[0].amount, 3000.0);
        assert_eq!(txs[0].category, None);
        assert_eq!(txs[1].category.as_deref(), Some("Groceries"));
        assert_eq!(txs[1].timestamp, "2024-05-03T18:30:00");
        assert_eq!(txs[2].kind, TransactionKind::Expense);
    }

    #[test]
    fn test_parse_csv_reordered_headers_without_id() {
        let csv = "Date,Type,Amount,Description
2024-05-01,EXPENSE,10,Coffee
2024-05-02,EXPENSE,20,Lunch";

        let txs = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].id, 1);
        assert_eq!(txs[1].id, 2);
        assert_eq!(txs[1].description, "Lunch");
        assert_eq!(txs[1].category, None);
    }

    #[test]
    fn test_parse_csv_errors() {
        let missing = "id,description,amount,date\n1,Coffee,5,2024-05-01";
        let err = parse_csv(missing.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Missing CSV column: type"));

        let bad_kind = "id,description,amount,type,date\n1,Coffee,5,TRANSFER,2024-05-01";
        let err = parse_csv(bad_kind.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));

        let nan = "id,description,amount,type,date\n1,Coffee,5,EXPENSE,2024-05-01\n2,Tea,NaN,EXPENSE,2024-05-02";
        let err = parse_csv(nan.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 3"));
        assert!(err.to_string().contains("finite"));

        let negative = "id,description,amount,type,date\n1,Refund,(12.00),EXPENSE,2024-05-01";
        let err = parse_csv(negative.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_parse_json_list_and_request() {
        let list = r#"[{"id": 1, "description": "Rent", "amount": 1200, "type": "EXPENSE",
                       "category": "Housing", "date": "2024-05-01"}]"#;
        let imported = parse_json(list.as_bytes()).unwrap();
        assert_eq!(imported.user_id, None);
        assert_eq!(imported.transactions.len(), 1);

        let request = r#"{"user_id": 7, "transactions": [
            {"id": 1, "description": "Pay", "amount": "2500.50", "type": "income", "date": "2024-05-01"}
        ]}"#;
        let imported = parse_json(request.as_bytes()).unwrap();
        assert_eq!(imported.user_id, Some(7));
        assert_eq!(imported.transactions[0].amount, 2500.5);
        assert_eq!(imported.transactions[0].kind, TransactionKind::Income);
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("tx.CSV");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        writeln!(file, "id,description,amount,type,category,date").unwrap();
        writeln!(file, "1,Coffee,4.50,EXPENSE,Food & Dining,2024-05-01").unwrap();
        let imported = load_file(&csv_path).unwrap();
        assert_eq!(imported.transactions.len(), 1);

        let txt_path = dir.path().join("tx.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(load_file(&txt_path), Err(Error::InvalidData(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_file(&missing), Err(Error::Io(_))));
    }
}
