//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::Serialize;

/// 問題の種類
///
/// Moodle XMLの`<question type="...">`属性に対応します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// 多肢選択問題（`Type`列が未知の値の場合の既定値）
    Multichoice,

    /// 正誤問題
    #[serde(rename = "truefalse")]
    TrueFalse,

    /// 記述（短答）問題
    #[serde(rename = "shortanswer")]
    ShortAnswer,
}

impl QuestionKind {
    /// Moodle XMLで使用する種類名
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Multichoice => "multichoice",
            QuestionKind::TrueFalse => "truefalse",
            QuestionKind::ShortAnswer => "shortanswer",
        }
    }

    /// `Type`列の値から種類を判定する
    ///
    /// 大文字小文字を区別せず、完全一致のみを認識します（前後の空白は除去しません）。
    /// 認識できない値の場合は`None`を返します。
    pub fn from_type_column(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "multichoice" => Some(QuestionKind::Multichoice),
            "truefalse" => Some(QuestionKind::TrueFalse),
            "shortanswer" => Some(QuestionKind::ShortAnswer),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 入力ファイルの形式
///
/// MIMEタイプ、または拡張子から判定されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
    Ods,
}

/// MIMEタイプと形式の対応表
const MIME_TABLE: &[(&str, SourceFormat)] = &[
    ("text/csv", SourceFormat::Csv),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        SourceFormat::Xlsx,
    ),
    ("application/vnd.ms-excel", SourceFormat::Xls),
    ("application/vnd.oasis.opendocument.spreadsheet", SourceFormat::Ods),
];

impl SourceFormat {
    /// MIMEタイプから形式を判定する（完全一致）
    pub fn from_mime(mime: &str) -> Option<Self> {
        MIME_TABLE
            .iter()
            .find(|(known, _)| *known == mime)
            .map(|(_, format)| *format)
    }

    /// ファイル名の拡張子から形式を判定する（大文字小文字を区別しない）
    ///
    /// 最後の`.`以降を拡張子とみなします。`.`を含まない名前は判定できません。
    pub fn from_file_name(name: &str) -> Option<Self> {
        let dot = name.rfind('.')?;
        match name[dot..].to_lowercase().as_str() {
            ".csv" => Some(SourceFormat::Csv),
            ".xlsx" => Some(SourceFormat::Xlsx),
            ".xls" => Some(SourceFormat::Xls),
            ".ods" => Some(SourceFormat::Ods),
            _ => None,
        }
    }

    /// 通知メッセージに使用する形式の表示名
    pub fn description(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::Xlsx => "XLSX",
            SourceFormat::Xls => "XLS",
            SourceFormat::Ods => "ODS",
        }
    }
}

/// シート選択方式
///
/// ワークブック内のどのシートを問題として読み込むかを指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// すべてのシートをワークブック順に読み込む（デフォルト）
    All,

    /// インデックス指定（0始まり）
    Index(usize),

    /// シート名指定
    Name(String),

    /// 複数のインデックス指定
    Indices(Vec<usize>),

    /// 複数のシート名指定
    Names(Vec<String>),
}

/// 日付セルの表示形式
///
/// 日付セルは表示文字列に変換されてから行データになります。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD）
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// 例: `DateFormat::Custom("%d/%m/%Y".to_string())`
    Custom(String),
}

/// `Type`列の解釈方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeMode {
    /// 未知の`Type`値を多肢選択問題として扱う（デフォルト）
    #[default]
    Lenient,

    /// 未知の`Type`値の行を問題にせずスキップする
    Strict,
}
