//! Builder Module
//!
//! Fluent Builder APIを提供し、`Processor`インスタンスを段階的に構築する。

use std::fmt::Write;

use chrono::NaiveDate;

use crate::api::{DateFormat, SheetSelector, TypeMode};
use crate::error::QuizSheetError;
use crate::processor::Processor;
use crate::security::SecurityConfig;

/// 1ファイルの最大サイズ（5 MiB）
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// 1バッチの最大データ行数
pub const DEFAULT_MAX_TOTAL_ROWS: usize = 5000;

/// バッチ処理の設定を保持する内部構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessorConfig {
    /// 1ファイルの最大サイズ（バイト）
    pub max_file_size: u64,

    /// バッチ全体の最大データ行数
    pub max_total_rows: usize,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 日付セルの表示形式
    pub date_format: DateFormat,

    /// `Type`列の解釈
    pub type_mode: TypeMode,

    /// アーカイブ検査の制限
    pub security: SecurityConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_total_rows: DEFAULT_MAX_TOTAL_ROWS,
            sheet_selector: SheetSelector::All,
            date_format: DateFormat::Iso8601,
            type_mode: TypeMode::Lenient,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use quizsheet::{ProcessorBuilder, TypeMode};
///
/// # fn main() -> Result<(), quizsheet::QuizSheetError> {
/// let processor = ProcessorBuilder::new()
///     .with_max_total_rows(1000)
///     .with_type_mode(TypeMode::Strict)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    config: ProcessorConfig,
}

impl ProcessorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 最大ファイルサイズ: 5 MiB
    /// - 最大データ行数: 5000
    /// - シート選択: すべてのシート
    /// - 日付形式: ISO 8601 (YYYY-MM-DD)
    /// - `Type`列: 未知の値は多肢選択問題
    pub fn new() -> Self {
        Self::default()
    }

    /// 1ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// バッチ全体の最大データ行数を指定する
    ///
    /// 行数はファイル単位で加算され、超過した時点で以降のファイルは処理されません。
    pub fn with_max_total_rows(mut self, rows: usize) -> Self {
        self.config.max_total_rows = rows;
        self
    }

    /// 読み込むシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use quizsheet::{ProcessorBuilder, SheetSelector};
    ///
    /// let builder = ProcessorBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Week1".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 日付セルの表示形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// `Type`列の解釈方法を指定する
    pub fn with_type_mode(mut self, mode: TypeMode) -> Self {
        self.config.type_mode = mode;
        self
    }

    /// アーカイブ検査の制限を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Processor`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `QuizSheetError::Config(String)`
    ///   * 最大ファイルサイズ、最大行数が0
    ///   * カスタム日付形式が不正、または空文字列を生成する
    pub fn build(self) -> Result<Processor, QuizSheetError> {
        if self.config.max_file_size == 0 {
            return Err(QuizSheetError::Config(
                "Maximum file size must be greater than 0".to_string(),
            ));
        }

        if self.config.max_total_rows == 0 {
            return Err(QuizSheetError::Config(
                "Maximum total rows must be greater than 0".to_string(),
            ));
        }

        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let test_date = NaiveDate::from_ymd_opt(2025, 1, 1)
                .ok_or_else(|| QuizSheetError::Config("Failed to create test date".to_string()))?;
            let mut formatted = String::new();
            let rendered = write!(formatted, "{}", test_date.format(format_str));
            if rendered.is_err() || formatted.is_empty() {
                return Err(QuizSheetError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        Ok(Processor::new(self.config))
    }
}
