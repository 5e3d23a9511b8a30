//! Minimal RFC 4180 CSV text handling.

use crate::error::{Error, Result};

pub fn quote_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a whole CSV document into records.
///
/// Quoted fields may contain commas, doubled quotes and line breaks.
/// Both `\n` and `\r\n` terminate a record. Blank lines are skipped.
pub fn parse_document(text: &str) -> Result<Vec<Vec<String>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // the current field opened with a quote, so an empty value is still a value
    let mut quoted = false;
    let mut line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            '"' => {
                return Err(Error::Parse(format!(
                    "unexpected quote inside unquoted field on line {}",
                    line
                )))
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                let blank = record.len() == 1 && record[0].is_empty() && !quoted;
                quoted = false;
                if !blank {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(Error::Parse(format!(
            "unterminated quoted field starting before line {}",
            line
        )));
    }

    if !field.is_empty() || !record.is_empty() || quoted {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(quote_field("plain"), "plain");
        assert_eq!(quote_field("a, b"), "\"a, b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn parses_quoted_fields_and_crlf() {
        let text = "Title,Notes\r\n\"Owls, Night\",\"He said \"\"hoot\"\"\"\r\n";
        let records = parse_document(text).unwrap();
        assert_eq!(
            records,
            vec![
                vec!["Title".to_string(), "Notes".to_string()],
                vec!["Owls, Night".to_string(), "He said \"hoot\"".to_string()],
            ]
        );
    }

    #[test]
    fn embedded_newline_stays_in_one_record() {
        let records = parse_document("a,b\n\"line one\nline two\",x").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][0], "line one\nline two");
    }

    #[test]
    fn skips_blank_lines_and_bom() {
        let records = parse_document("\u{feff}a,b\n\n1,2\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][0], "a");
    }

    #[test]
    fn quoted_empty_value_is_a_record() {
        let records = parse_document("Note\n\"\"\nx\n").unwrap();
        assert_eq!(records, vec![vec!["Note"], vec![""], vec!["x"]]);

        let records = parse_document("Note\n\"\"").unwrap();
        assert_eq!(records, vec![vec!["Note"], vec![""]]);
    }

    #[test]
    fn keeps_trailing_empty_field() {
        let records = parse_document("a,b,\n").unwrap();
        assert_eq!(records[0], vec!["a", "b", ""]);
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert!(matches!(
            parse_document("a,\"open\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn join_record_round_trips_through_parser() {
        let fields = ["Keep trying, even when it is \"hard\"", "12"];
        let parsed = parse_document(&join_record(&fields)).unwrap();
        assert_eq!(parsed, vec![vec![fields[0].to_string(), "12".to_string()]]);
    }
}
