//! Format Module
//!
//! Excelの表示形式（Number Format String）を数値セルに適用します。
//! 日付形式はcalamineが日付値として返すため、ここでは扱いません。

mod parser;
mod sections;
mod tokens;

pub(crate) use parser::NumberFormat;
