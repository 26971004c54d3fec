//! Formatter Module
//!
//! ワークブックのセル値を表示文字列に変換するモジュール。
//! 行データは常に文字列として扱うため、`1`と`"1"`の違いはここで吸収されます。

use std::fmt::Write;

use calamine::Data;

use crate::api::DateFormat;
use crate::error::QuizSheetError;
use crate::format::NumberFormat;

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    date_formatter: DateFormatter,
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    pub fn new(date_format: DateFormat) -> Self {
        Self {
            date_formatter: DateFormatter { date_format },
            number_formatter: NumberFormatter,
        }
    }

    /// セル値を表示文字列に変換する
    ///
    /// 数値セルは`number_format`（XLSXのセル表示形式）があればそれに従います。
    /// 空セルは空文字列になります（呼び出し側で「値なし」として扱われます）。
    pub fn format_cell(
        &self,
        cell: &Data,
        number_format: Option<&NumberFormat>,
    ) -> Result<String, QuizSheetError> {
        let formatted = match cell {
            Data::Int(i) => self.format_number(*i as f64, number_format),
            Data::Float(f) => self.format_number(*f, number_format),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) => self.date_formatter.format(datetime)?,
                // 範囲外のシリアル値は数値のまま出す
                None => self.number_formatter.format(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(e) => e.to_string(),
            Data::Empty => String::new(),
            #[allow(unreachable_patterns)]
            _ => String::new(),
        };
        Ok(formatted)
    }

    fn format_number(&self, value: f64, number_format: Option<&NumberFormat>) -> String {
        number_format
            .and_then(|format| format.format(value))
            .unwrap_or_else(|| self.number_formatter.format(value))
    }
}

/// 日付フォーマッター
#[derive(Debug)]
pub(crate) struct DateFormatter {
    date_format: DateFormat,
}

impl DateFormatter {
    /// 日付値をフォーマット
    ///
    /// エポック（1900年/1904年）の解釈はcalamine側で済んでいます。
    pub fn format(&self, datetime: chrono::NaiveDateTime) -> Result<String, QuizSheetError> {
        let format_str = match &self.date_format {
            DateFormat::Iso8601 => "%Y-%m-%d",
            DateFormat::Custom(format_str) => format_str.as_str(),
        };

        // 不正な書式指定子は`to_string()`ではpanicになるため、Errとして受け取る
        let mut formatted = String::new();
        write!(formatted, "{}", datetime.format(format_str)).map_err(|_| {
            QuizSheetError::Config(format!("Invalid date format string: '{}'", format_str))
        })?;

        if formatted.is_empty() {
            return Err(QuizSheetError::Config(
                "Date format produced an empty string".to_string(),
            ));
        }
        Ok(formatted)
    }
}

/// 数値フォーマッター
///
/// 整数値は小数点なし、それ以外はRustの最短表現で出力します。
#[derive(Debug)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            value.to_string()
        }
    }
}
