//! Workbook Parser Module
//!
//! calamineを使用したワークブック（XLSX/XLS/XLSB/ODS）の読み込み。

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use tracing::debug;

use crate::api::SheetSelector;
use crate::error::QuizSheetError;
use crate::formatter::CellFormatter;
use crate::parser::{SheetTable, XlsxStyles};

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
/// 形式はバイト列の内容からcalamineが判定します。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
    styles: XlsxStyles,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(QuizSheetError::Parse)` - 破損したファイル、未対応の形式の場合
    pub fn open(data: Vec<u8>) -> Result<Self, QuizSheetError> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
        Ok(Self {
            workbook,
            styles: XlsxStyles::default(),
        })
    }

    /// セルの表示形式（XLSXのみ）を設定
    pub fn with_styles(mut self, styles: XlsxStyles) -> Self {
        self.styles = styles;
        self
    }

    /// すべてのシート名（ワークブック順）
    pub fn get_sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<String>)` - 選択されたシート名のリスト
    /// * `Err(QuizSheetError::SheetNotFound)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheets(&self, selector: &SheetSelector) -> Result<Vec<String>, QuizSheetError> {
        let all_sheet_names = self.get_sheet_names();

        let by_index = |index: usize| {
            all_sheet_names.get(index).cloned().ok_or_else(|| {
                QuizSheetError::SheetNotFound(format!(
                    "index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            })
        };
        let by_name = |name: &String| {
            if all_sheet_names.contains(name) {
                Ok(name.clone())
            } else {
                Err(QuizSheetError::SheetNotFound(format!("'{}'", name)))
            }
        };

        match selector {
            SheetSelector::All => Ok(all_sheet_names.clone()),
            SheetSelector::Index(index) => Ok(vec![by_index(*index)?]),
            SheetSelector::Name(name) => Ok(vec![by_name(name)?]),
            SheetSelector::Indices(indices) => indices.iter().map(|i| by_index(*i)).collect(),
            SheetSelector::Names(names) => names.iter().map(by_name).collect(),
        }
    }

    /// シートを読み込み、表示文字列の表に変換する
    ///
    /// 使用範囲の先頭行をヘッダー、残りをデータ行とします。
    pub fn read_sheet(
        &mut self,
        sheet_name: &str,
        formatter: &CellFormatter,
    ) -> Result<SheetTable, QuizSheetError> {
        let range = self.workbook.worksheet_range(sheet_name)?;
        // 表示形式は絶対座標で引くため、使用範囲の開始位置を足す
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let styles = &self.styles;

        let mut rows = range.rows().enumerate().map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| {
                    let number_format =
                        styles.number_format(sheet_name, start_row + r as u32, start_col + c as u32);
                    formatter.format_cell(cell, number_format)
                })
                .collect::<Result<Vec<String>, QuizSheetError>>()
        });

        let header = match rows.next() {
            Some(header) => header?,
            None => Vec::new(),
        };
        let records = rows.collect::<Result<Vec<_>, _>>()?;

        debug!(
            sheet = sheet_name,
            columns = header.len(),
            records = records.len(),
            "sheet loaded"
        );

        Ok(SheetTable {
            name: sheet_name.to_string(),
            header,
            records,
        })
    }
}

// 実際のワークブックが必要なため、テストは統合テスト（tests/）で実装します。
