//! Delimited Text Parser Module
//!
//! CSVテキストを1シート（`Sheet1`）の表として読み込みます。

use std::borrow::Cow;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;

use crate::error::QuizSheetError;
use crate::parser::SheetTable;

/// CSVのシート名
pub(crate) const CSV_SHEET_NAME: &str = "Sheet1";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 区切り文字の候補（同数の場合は先に並んでいるものを優先）
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// CSVテキストを読み込む
///
/// - 先頭のUTF-8 BOMは除去します
/// - 区切り文字は`sep=`行、なければヘッダー行から判定します
/// - UTF-8として不正なフィールドはWindows-1252として解釈します
/// - 行ごとの列数の違いは許容します
pub(crate) fn read_delimited(data: &[u8]) -> Result<SheetTable, QuizSheetError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let (delimiter, data) = detect_delimiter(data);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut record = ByteRecord::new();
    let mut rows = Vec::new();
    while reader.read_byte_record(&mut record)? {
        rows.push(record.iter().map(|f| decode_field(f).into_owned()).collect::<Vec<_>>());
    }

    let mut rows = rows.into_iter();
    let header = rows.next().unwrap_or_default();

    Ok(SheetTable {
        name: CSV_SHEET_NAME.to_string(),
        header,
        records: rows.collect(),
    })
}

/// 区切り文字を判定する
///
/// Excelが出力する`sep=;`行がある場合はその文字を使い、行を読み飛ばします。
/// それ以外は先頭行（引用符の外側）で最も多く現れる候補を選び、
/// どれも現れなければカンマとします。
fn detect_delimiter(data: &[u8]) -> (u8, &[u8]) {
    if let Some(rest) = data.strip_prefix(b"sep=") {
        if let Some((&delimiter, after)) = rest.split_first() {
            let after = after.strip_prefix(b"\r").unwrap_or(after);
            if after.is_empty() || after[0] == b'\n' {
                return (delimiter, after.get(1..).unwrap_or_default());
            }
        }
    }

    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for &byte in data {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' | b'\r' if !in_quotes => break,
            _ if !in_quotes => {
                if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&c| c == byte) {
                    counts[i] += 1;
                }
            }
            _ => {}
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    (DELIMITER_CANDIDATES[best], data)
}

fn decode_field(field: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(field) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            cow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_delimited_basic() {
        let table = read_delimited(b"Type,Title\nmultichoice,Q1\ntruefalse,Q2\n").unwrap();
        assert_eq!(table.name, "Sheet1");
        assert_eq!(table.header, vec!["Type", "Title"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1], vec!["truefalse", "Q2"]);
    }

    #[test]
    fn test_read_delimited_strips_bom_and_handles_quotes() {
        let table =
            read_delimited(b"\xEF\xBB\xBFTitle,Question\nQ1,\"<p>a, b</p>\"\n").unwrap();
        assert_eq!(table.header[0], "Title");
        assert_eq!(table.records[0][1], "<p>a, b</p>");
    }

    #[test]
    fn test_read_delimited_flexible_lengths() {
        let table = read_delimited(b"A,B,C\n1\n1,2,3,4\n").unwrap();
        assert_eq!(table.records[0].len(), 1);
        assert_eq!(table.records[1].len(), 4);
    }

    #[test]
    fn test_read_delimited_windows_1252_fallback() {
        // 0xE9 = 'é' in Windows-1252
        let table = read_delimited(b"Title\ncaf\xE9\n").unwrap();
        assert_eq!(table.records[0][0], "café");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"Type,Title\n").0, b',');
        assert_eq!(detect_delimiter(b"Type;Title;Correct\n").0, b';');
        assert_eq!(detect_delimiter(b"Type\tTitle\n").0, b'\t');
        assert_eq!(detect_delimiter(b"Title\n").0, b',');
        // 引用符内の文字は数えない
        assert_eq!(detect_delimiter(b"\"a,b,c\";Title\n").0, b';');
        // 同数ならカンマ
        assert_eq!(detect_delimiter(b"a,b;c\n").0, b',');
    }

    #[test]
    fn test_detect_delimiter_sep_line() {
        let (delimiter, rest) = detect_delimiter(b"sep=;\r\nType;Title\n");
        assert_eq!(delimiter, b';');
        assert_eq!(rest, b"Type;Title\n");

        let (delimiter, rest) = detect_delimiter(b"sep=|");
        assert_eq!(delimiter, b'|');
        assert!(rest.is_empty());
    }

    #[test]
    fn test_read_delimited_semicolon() {
        let table = read_delimited(b"Type;Title;Correct\ntruefalse;T1;true\n").unwrap();
        assert_eq!(table.header, vec!["Type", "Title", "Correct"]);
        assert_eq!(table.records[0], vec!["truefalse", "T1", "true"]);
    }

    #[test]
    fn test_read_delimited_sep_line_and_bom() {
        let table =
            read_delimited(b"\xEF\xBB\xBFsep=;\nTitle;Question\nQ1;\"<p>a; b</p>\"\n").unwrap();
        assert_eq!(table.header, vec!["Title", "Question"]);
        assert_eq!(table.records[0][1], "<p>a; b</p>");
    }

    #[test]
    fn test_read_delimited_empty_input() {
        let table = read_delimited(b"").unwrap();
        assert!(table.header.is_empty());
        assert!(table.records.is_empty());
    }
}
