//! Row Mapping Module
//!
//! ヘッダー行の列名をキーとして、データ行を`SheetRow`に解決します。
//! `Correct1`, `Correct2`, ... のような可変列はここで列順のリストにまとめ、
//! 分類処理側では列名を走査しません。

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::SheetRow;

/// 空のヘッダーセルに付ける列名
const EMPTY_HEADER: &str = "__EMPTY";

fn alternative_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Correct\d+$").expect("static regex is valid"))
}

/// 列の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Type,
    Title,
    Question,
    Option(usize),
    Correct,
    UseCase,
    Alternative,
    Ignored,
}

impl Column {
    fn from_header(name: &str) -> Self {
        match name {
            "Type" => Column::Type,
            "Title" => Column::Title,
            "Question" => Column::Question,
            "OptionA" => Column::Option(0),
            "OptionB" => Column::Option(1),
            "OptionC" => Column::Option(2),
            "OptionD" => Column::Option(3),
            "Correct" => Column::Correct,
            "UseCase" => Column::UseCase,
            _ if alternative_key_pattern().is_match(name) => Column::Alternative,
            _ => Column::Ignored,
        }
    }
}

/// ヘッダー行から作られる行マッパー
#[derive(Debug, Clone)]
pub(crate) struct RowMapper {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl RowMapper {
    /// ヘッダー行のセル値から列名を決定する
    ///
    /// 空セルは`__EMPTY`、重複した名前には`_1`, `_2`, ... を付けて一意にします。
    pub fn new(header: &[String]) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::with_capacity(header.len());

        for cell in header {
            let base = if cell.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                cell.clone()
            };

            let name = match seen.get(&base).copied() {
                None => {
                    seen.insert(base.clone(), 1);
                    base
                }
                Some(mut counter) => {
                    let mut candidate = format!("{}_{}", base, counter);
                    counter += 1;
                    while seen.contains_key(&candidate) {
                        candidate = format!("{}_{}", base, counter);
                        counter += 1;
                    }
                    seen.insert(base, counter);
                    seen.insert(candidate.clone(), 1);
                    candidate
                }
            };
            names.push(name);
        }

        let columns = names.iter().map(|n| Column::from_header(n)).collect();
        Self { names, columns }
    }

    /// 一意化済みの列名
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// データ行を解決する
    ///
    /// すべてのセルが空の行は`None`を返します（行数にも数えません）。
    /// ヘッダーより右にはみ出したセルは`__EMPTY`系の列として扱われ、無視されます。
    pub fn map(&self, record: &[String]) -> Option<SheetRow> {
        if record.iter().all(|cell| cell.is_empty()) {
            return None;
        }

        let mut row = SheetRow::default();
        for (index, cell) in record.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let column = self.columns.get(index).copied().unwrap_or(Column::Ignored);
            let value = Some(cell.clone());
            match column {
                Column::Type => row.kind = value,
                Column::Title => row.title = value,
                Column::Question => row.question = value,
                Column::Option(i) => row.options[i] = value,
                Column::Correct => row.correct = value,
                Column::UseCase => row.use_case = value,
                Column::Alternative => row.alternatives.push(cell.clone()),
                Column::Ignored => {}
            }
        }
        Some(row)
    }
}
