//! Parser Module
//!
//! アップロードされたバイト列をシート単位の表（ヘッダー行＋データ行）に変換します。
//! ZIP/CFBコンテナはcalamine、それ以外はCSVテキストとして読み込みます。

mod delimited;
mod rows;
mod styles;
mod workbook;

pub(crate) use delimited::read_delimited;
pub(crate) use rows::RowMapper;
pub(crate) use styles::XlsxStyles;
pub(crate) use workbook::WorkbookParser;

use tracing::warn;

use crate::api::SheetSelector;
use crate::error::QuizSheetError;
use crate::formatter::CellFormatter;
use crate::security::{inspect_archive, SecurityConfig};

/// 1シート分の表
///
/// `header`はシートの先頭行、`records`は残りの行（空セルは空文字列）です。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SheetTable {
    pub name: String,
    pub header: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// バイト列の先頭から判定したコンテナ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    /// XLSX / XLSB / ODS
    Zip,
    /// XLS (OLE Compound File)
    Cfb,
    /// CSVテキスト
    Text,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

impl Container {
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(ZIP_MAGIC) {
            Container::Zip
        } else if data.starts_with(CFB_MAGIC) {
            Container::Cfb
        } else {
            Container::Text
        }
    }
}

/// バイト列を読み込み、選択されたシートの表をワークブック順に返す
pub(crate) fn read_tables(
    data: &[u8],
    selector: &SheetSelector,
    formatter: &CellFormatter,
    security: &SecurityConfig,
) -> Result<Vec<SheetTable>, QuizSheetError> {
    match Container::sniff(data) {
        Container::Text => {
            let table = read_delimited(data)?;
            select_single(table, selector)
        }
        container => {
            let mut styles = XlsxStyles::default();
            if container == Container::Zip {
                inspect_archive(data, security)?;
                // 表示形式が読めなくても値は読めるため、既定の数値表現で続行する
                styles = XlsxStyles::load(data).unwrap_or_else(|e| {
                    warn!(error = %e, "cell number formats unavailable");
                    XlsxStyles::default()
                });
            }
            let mut parser = WorkbookParser::open(data.to_vec())?.with_styles(styles);
            let sheet_names = parser.select_sheets(selector)?;
            sheet_names
                .iter()
                .map(|name| parser.read_sheet(name, formatter))
                .collect()
        }
    }
}

/// CSVは`Sheet1`という名前の1シートとして扱う
fn select_single(
    table: SheetTable,
    selector: &SheetSelector,
) -> Result<Vec<SheetTable>, QuizSheetError> {
    let matches = match selector {
        SheetSelector::All => true,
        SheetSelector::Index(i) => *i == 0,
        SheetSelector::Name(name) => *name == table.name,
        SheetSelector::Indices(indices) => indices.iter().all(|i| *i == 0),
        SheetSelector::Names(names) => names.iter().all(|n| *n == table.name),
    };

    if !matches {
        return Err(QuizSheetError::SheetNotFound(format!(
            "{:?} (CSV input has a single sheet '{}')",
            selector, table.name
        )));
    }
    Ok(vec![table])
}
