use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::{DisplayContext, Tabular};
use crate::error::{BackofficeError, Result};

/// Header row plus one line per record.
///
/// Cells are quoted only when they contain a comma, quote or line break;
/// embedded quotes are doubled.
pub fn to_csv<R: Tabular>(rows: &[R], ctx: &DisplayContext) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells(ctx).iter().map(|c| c.raw()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BackofficeError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        BackofficeError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Expense;

    fn expense(description: &str) -> Expense {
        Expense {
            id: "e1".into(),
            kind: Some("Fixa".into()),
            category: Some("Renda".into()),
            description: Some(description.into()),
            amount: 2500.0,
            paid_on: Some("2026-10-01".into()),
            created_at: None,
        }
    }

    #[test]
    fn header_row_comes_first() {
        let csv = to_csv::<Expense>(&[], &DisplayContext::default()).unwrap();
        assert_eq!(csv.trim_end(), Expense::headers().join(","));
    }

    #[test]
    fn comma_and_quote_are_escaped_and_round_trip() {
        let original = r#"Aluguel, loja "centro""#;
        let csv = to_csv(&[expense(original)], &DisplayContext::default()).unwrap();
        assert!(csv.contains(r#""Aluguel, loja ""centro""""#));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        let column = Expense::headers()
            .iter()
            .position(|h| *h == "Description")
            .unwrap();
        assert_eq!(&record[column], original);
    }

    #[test]
    fn newline_forces_quotes() {
        let csv = to_csv(&[expense("linha 1\nlinha 2")], &DisplayContext::default()).unwrap();
        assert!(csv.contains("\"linha 1\nlinha 2\""));
    }

    #[test]
    fn plain_values_are_not_quoted() {
        let csv = to_csv(&[expense("Internet")], &DisplayContext::default()).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert!(!line.contains('"'));
        assert!(line.contains("2500"));
    }
}
