//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// quizsheetクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、解析、XML生成中に発生するエラーを統一的に扱います。
/// バッチ処理（`Processor::process_files`）はこの型を外に返さず、
/// ファイル単位の`FileError`に変換して記録します。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `Parse`: ワークブックの解析エラー（calamine由来）
/// - `Csv`: CSVテキストの解析エラー
/// - `Xml`: XML書き出し中のエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: アーカイブのセキュリティ制限違反
///
/// # 使用例
///
/// ```rust,no_run
/// use quizsheet::{InputFile, QuizSheetError};
///
/// fn load(path: &str) -> Result<InputFile, QuizSheetError> {
///     let file = InputFile::from_path(path)?;  // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum QuizSheetError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ワークブック（XLSX/XLS/XLSB/ODS）の解析中に発生したエラー
    ///
    /// `#[from]`属性により、`calamine::Error`から自動的に変換されます。
    #[error("Failed to parse workbook: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVテキストの解析中に発生したエラー
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// XMLの書き出し中に発生したエラー
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// XLSX/ODSファイル（ZIPアーカイブ）の事前検査中に発生したエラーです。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ProcessorBuilder::build()`時に無効な設定が検出された場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use quizsheet::{ProcessorBuilder, QuizSheetError};
    ///
    /// let result = ProcessorBuilder::new().with_max_total_rows(0).build();
    ///
    /// match result {
    ///     Err(QuizSheetError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 指定されたシートがワークブックに存在しない
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサルなどのアーカイブ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}
