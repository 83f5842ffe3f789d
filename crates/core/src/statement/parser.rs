//! Parsers turning raw statement file bytes into ordered transaction rows.
//!
//! All parsers are all-or-nothing: the first malformed row aborts the parse
//! with a `StatementError::Parse` describing where and why, and the caller
//! persists nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::error::StatementError;
use super::types::{StatementFormat, StatementRow};

/// Date formats accepted in CSV statement exports, tried in order.
const CSV_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y%m%d"];

/// Parses statement file bytes into transaction rows in file order.
///
/// # Errors
///
/// Returns `StatementError::Parse` if the file is not valid for the given
/// format, or `StatementError::EmptyFile` if it yields no rows.
pub fn parse_statement(
    bytes: &[u8],
    format: StatementFormat,
) -> Result<Vec<StatementRow>, StatementError> {
    let rows = match format {
        StatementFormat::Csv => parse_csv(bytes)?,
        // QFX is Quicken's OFX dialect; the transaction block is identical.
        StatementFormat::Ofx | StatementFormat::Qfx => parse_ofx(bytes)?,
    };

    if rows.is_empty() {
        return Err(StatementError::EmptyFile);
    }

    Ok(rows)
}

// ============================================================================
// CSV
// ============================================================================

/// Parses a CSV statement with a header row.
///
/// Recognized headers (case-insensitive): `date` / `transaction_date`,
/// `description` / `memo` / `payee`, `amount`.
fn parse_csv(bytes: &[u8]) -> Result<Vec<StatementRow>, StatementError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| StatementError::Parse(format!("invalid CSV header: {e}")))?
        .clone();

    let date_idx = find_column(&headers, &["date", "transaction_date"])
        .ok_or_else(|| StatementError::Parse("missing 'date' column".to_string()))?;
    let description_idx = find_column(&headers, &["description", "memo", "payee"])
        .ok_or_else(|| StatementError::Parse("missing 'description' column".to_string()))?;
    let amount_idx = find_column(&headers, &["amount"])
        .ok_or_else(|| StatementError::Parse("missing 'amount' column".to_string()))?;

    let mut rows = Vec::new();

    for (line, record) in reader.records().enumerate() {
        // Header is line 1, first data row is line 2.
        let line_no = line + 2;
        let record =
            record.map_err(|e| StatementError::Parse(format!("line {line_no}: {e}")))?;

        let date_field = field(&record, date_idx, "date", line_no)?;
        let description = field(&record, description_idx, "description", line_no)?;
        let amount_field = field(&record, amount_idx, "amount", line_no)?;

        let date = parse_date(date_field).ok_or_else(|| {
            StatementError::Parse(format!("line {line_no}: unrecognized date '{date_field}'"))
        })?;
        let amount = parse_amount(amount_field).ok_or_else(|| {
            StatementError::Parse(format!(
                "line {line_no}: unrecognized amount '{amount_field}'"
            ))
        })?;

        rows.push(StatementRow {
            date,
            description: description.to_string(),
            amount,
        });
    }

    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
    line_no: usize,
) -> Result<&'r str, StatementError> {
    let value = record
        .get(idx)
        .ok_or_else(|| StatementError::Parse(format!("line {line_no}: missing '{name}' field")))?;
    if value.is_empty() {
        return Err(StatementError::Parse(format!(
            "line {line_no}: empty '{name}' field"
        )));
    }
    Ok(value)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    CSV_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses a currency amount, accepting `$`, thousands separators, and
/// parenthesized negatives as exported by common banks.
fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let (negated, inner) = if trimmed.starts_with('(') && trimmed.ends_with(')') {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    let amount = Decimal::from_str(&cleaned).ok()?;
    let amount = if negated { -amount } else { amount };

    // Two-decimal fixed-point semantics throughout the ledger.
    if amount.normalize().scale() > 2 {
        return None;
    }
    Some(amount.round_dp(2))
}

// ============================================================================
// OFX / QFX
// ============================================================================

/// Parses the `<STMTTRN>` blocks of an OFX/QFX file.
///
/// OFX 1.x is SGML without closing tags for leaf values, so this scans
/// line-oriented `<TAG>value` pairs inside each transaction block rather
/// than using an XML parser. `<DTPOSTED>` carries `YYYYMMDD` (possibly with
/// a time suffix), `<TRNAMT>` the signed amount, `<NAME>`/`<MEMO>` the
/// description.
fn parse_ofx(bytes: &[u8]) -> Result<Vec<StatementRow>, StatementError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| StatementError::Parse("file is not valid UTF-8".to_string()))?;

    let mut rows = Vec::new();
    let mut current: Option<OfxTransaction> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.eq_ignore_ascii_case("<STMTTRN>") {
            if current.is_some() {
                return Err(StatementError::Parse(
                    "nested <STMTTRN> block".to_string(),
                ));
            }
            current = Some(OfxTransaction::default());
            continue;
        }

        if line.eq_ignore_ascii_case("</STMTTRN>") {
            let txn = current.take().ok_or_else(|| {
                StatementError::Parse("</STMTTRN> without opening tag".to_string())
            })?;
            rows.push(txn.into_row()?);
            continue;
        }

        let Some(txn) = current.as_mut() else {
            continue;
        };

        if let Some(value) = tag_value(line, "DTPOSTED") {
            txn.date = Some(parse_ofx_date(value).ok_or_else(|| {
                StatementError::Parse(format!("unrecognized DTPOSTED '{value}'"))
            })?);
        } else if let Some(value) = tag_value(line, "TRNAMT") {
            txn.amount = Some(parse_amount(value).ok_or_else(|| {
                StatementError::Parse(format!("unrecognized TRNAMT '{value}'"))
            })?);
        } else if let Some(value) = tag_value(line, "NAME") {
            txn.name = Some(value.to_string());
        } else if let Some(value) = tag_value(line, "MEMO") {
            txn.memo = Some(value.to_string());
        }
    }

    if current.is_some() {
        return Err(StatementError::Parse(
            "unterminated <STMTTRN> block".to_string(),
        ));
    }

    Ok(rows)
}

#[derive(Default)]
struct OfxTransaction {
    date: Option<NaiveDate>,
    amount: Option<Decimal>,
    name: Option<String>,
    memo: Option<String>,
}

impl OfxTransaction {
    fn into_row(self) -> Result<StatementRow, StatementError> {
        let date = self
            .date
            .ok_or_else(|| StatementError::Parse("transaction missing DTPOSTED".to_string()))?;
        let amount = self
            .amount
            .ok_or_else(|| StatementError::Parse("transaction missing TRNAMT".to_string()))?;
        let description = match (self.name, self.memo) {
            (Some(name), Some(memo)) if !memo.is_empty() && memo != name => {
                format!("{name} {memo}")
            }
            (Some(name), _) => name,
            (None, Some(memo)) => memo,
            (None, None) => {
                return Err(StatementError::Parse(
                    "transaction missing NAME and MEMO".to_string(),
                ));
            }
        };

        Ok(StatementRow {
            date,
            description,
            amount,
        })
    }
}

/// Extracts the value of a `<TAG>value` line, case-insensitive on the tag.
fn tag_value<'l>(line: &'l str, tag: &str) -> Option<&'l str> {
    let rest = line.strip_prefix('<')?;
    let close = rest.find('>')?;
    if !rest[..close].eq_ignore_ascii_case(tag) {
        return None;
    }
    let value = rest[close + 1..].trim();
    if value.is_empty() { None } else { Some(value) }
}

/// Parses `YYYYMMDD` with an optional time/zone suffix (`20260115120000[-5:EST]`).
fn parse_ofx_date(s: &str) -> Option<NaiveDate> {
    if s.len() < 8 {
        return None;
    }
    NaiveDate::parse_from_str(&s[..8], "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========================================================================
    // CSV
    // ========================================================================

    #[test]
    fn test_csv_basic() {
        let input = b"date,description,amount\n2026-01-05,Deposit A,200.00\n2026-01-06,Fee B,-50.00\n";
        let rows = parse_statement(input, StatementFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2026, 1, 5));
        assert_eq!(rows[0].description, "Deposit A");
        assert_eq!(rows[0].amount, dec!(200.00));
        assert_eq!(rows[1].amount, dec!(-50.00));
    }

    #[test]
    fn test_csv_preserves_file_order() {
        let input = b"date,description,amount\n2026-01-09,Later,1.00\n2026-01-02,Earlier,2.00\n";
        let rows = parse_statement(input, StatementFormat::Csv).unwrap();
        assert_eq!(rows[0].description, "Later");
        assert_eq!(rows[1].description, "Earlier");
    }

    #[test]
    fn test_csv_header_aliases() {
        let input = b"Transaction_Date,Payee,Amount\n01/05/2026,Grocery,-12.34\n";
        let rows = parse_statement(input, StatementFormat::Csv).unwrap();
        assert_eq!(rows[0].date, date(2026, 1, 5));
        assert_eq!(rows[0].description, "Grocery");
        assert_eq!(rows[0].amount, dec!(-12.34));
    }

    #[test]
    fn test_csv_currency_formatting() {
        let input = b"date,description,amount\n2026-01-05,Payroll,\"$1,234.56\"\n2026-01-06,Refund,(45.00)\n";
        let rows = parse_statement(input, StatementFormat::Csv).unwrap();
        assert_eq!(rows[0].amount, dec!(1234.56));
        assert_eq!(rows[1].amount, dec!(-45.00));
    }

    #[test]
    fn test_csv_malformed_row_fails_whole_parse() {
        let input =
            b"date,description,amount\n2026-01-05,Good,10.00\nnot-a-date,Bad,5.00\n2026-01-07,Also Good,1.00\n";
        let err = parse_statement(input, StatementFormat::Csv).unwrap_err();
        assert!(matches!(err, StatementError::Parse(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_csv_missing_column() {
        let input = b"date,amount\n2026-01-05,10.00\n";
        let err = parse_statement(input, StatementFormat::Csv).unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_csv_too_many_decimal_places() {
        let input = b"date,description,amount\n2026-01-05,Odd,10.001\n";
        let err = parse_statement(input, StatementFormat::Csv).unwrap_err();
        assert!(matches!(err, StatementError::Parse(_)));
    }

    #[test]
    fn test_csv_empty_file() {
        let input = b"date,description,amount\n";
        let err = parse_statement(input, StatementFormat::Csv).unwrap_err();
        assert!(matches!(err, StatementError::EmptyFile));
    }

    // ========================================================================
    // OFX / QFX
    // ========================================================================

    const OFX_SAMPLE: &str = "OFXHEADER:100\nDATA:OFXSGML\n\n<OFX>\n<BANKTRANLIST>\n<STMTTRN>\n<TRNTYPE>CREDIT\n<DTPOSTED>20260105120000[-5:EST]\n<TRNAMT>200.00\n<NAME>Deposit A\n</STMTTRN>\n<STMTTRN>\n<TRNTYPE>DEBIT\n<DTPOSTED>20260106\n<TRNAMT>-50.00\n<NAME>Fee B\n<MEMO>Monthly service fee\n</STMTTRN>\n</BANKTRANLIST>\n</OFX>\n";

    #[test]
    fn test_ofx_basic() {
        let rows = parse_statement(OFX_SAMPLE.as_bytes(), StatementFormat::Ofx).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(2026, 1, 5));
        assert_eq!(rows[0].amount, dec!(200.00));
        assert_eq!(rows[0].description, "Deposit A");
        assert_eq!(rows[1].description, "Fee B Monthly service fee");
        assert_eq!(rows[1].amount, dec!(-50.00));
    }

    #[test]
    fn test_qfx_uses_same_parser() {
        let rows = parse_statement(OFX_SAMPLE.as_bytes(), StatementFormat::Qfx).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_ofx_missing_amount() {
        let input = "<STMTTRN>\n<DTPOSTED>20260105\n<NAME>No amount\n</STMTTRN>\n";
        let err = parse_statement(input.as_bytes(), StatementFormat::Ofx).unwrap_err();
        assert!(err.to_string().contains("TRNAMT"));
    }

    #[test]
    fn test_ofx_unterminated_block() {
        let input = "<STMTTRN>\n<DTPOSTED>20260105\n<TRNAMT>1.00\n<NAME>Open\n";
        let err = parse_statement(input.as_bytes(), StatementFormat::Ofx).unwrap_err();
        assert!(matches!(err, StatementError::Parse(_)));
    }

    #[test]
    fn test_ofx_no_transactions() {
        let input = "<OFX>\n<BANKTRANLIST>\n</BANKTRANLIST>\n</OFX>\n";
        let err = parse_statement(input.as_bytes(), StatementFormat::Ofx).unwrap_err();
        assert!(matches!(err, StatementError::EmptyFile));
    }

    #[test]
    fn test_ofx_not_utf8() {
        let err = parse_statement(&[0xff, 0xfe, 0x00], StatementFormat::Ofx).unwrap_err();
        assert!(matches!(err, StatementError::Parse(_)));
    }

    // ========================================================================
    // Amount parsing
    // ========================================================================

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("10"), Some(dec!(10)));
        assert_eq!(parse_amount("-50.00"), Some(dec!(-50.00)));
        assert_eq!(parse_amount("$1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("(45.00)"), Some(dec!(-45.00)));
        assert_eq!(parse_amount("10.001"), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
