//! Processor Module
//!
//! 複数ファイルのバッチ処理を行い、1つのMoodle XMLに集約するモジュール。

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::api::SourceFormat;
use crate::builder::ProcessorConfig;
use crate::classifier::classify;
use crate::error::QuizSheetError;
use crate::events::{EventSink, NullSink, ProcessEvent};
use crate::formatter::CellFormatter;
use crate::output::build_xml;
use crate::parser::{read_tables, RowMapper};
use crate::types::{FileError, FileErrorKind, InputFile, ProcessingResult, Question, SheetRow};

const MIB: f64 = 1024.0 * 1024.0;

/// バッチ処理器
///
/// `ProcessorBuilder::build()`で生成されます。設定は不変で、`process_files`は
/// 呼び出しごとに独立した集計を行うため、複数スレッドから同時に呼び出せます。
#[derive(Debug)]
pub struct Processor {
    config: ProcessorConfig,
    formatter: CellFormatter,
}

/// 1ファイル分の解析結果
struct ParsedFile {
    rows: usize,
    questions: Vec<Question>,
}

impl Processor {
    pub(crate) fn new(config: ProcessorConfig) -> Self {
        let formatter = CellFormatter::new(config.date_format.clone());
        Self { config, formatter }
    }

    /// 1ファイルの最大サイズ（バイト）
    pub fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    /// バッチ全体の最大データ行数
    pub fn max_total_rows(&self) -> usize {
        self.config.max_total_rows
    }

    /// ファイル群を処理し、通知を破棄して結果のみを返す
    pub fn process(&self, files: &[InputFile]) -> ProcessingResult {
        self.process_files(files, &mut NullSink)
    }

    /// ファイル群をファイル順に処理し、問題とXMLを集約する
    ///
    /// 1ファイルの失敗はバッチを中断しません（エラー通知の後、次のファイルへ進みます）。
    /// 行数上限を超えた場合のみ、以降のファイルを処理せずに終了します。
    /// 最後に`ProcessEvent::Done`が必ず1回送られます。
    ///
    /// # 引数
    ///
    /// * `files` - 入力ファイル（この順に処理）
    /// * `sink` - 進捗・エラー・完了通知の送信先
    ///
    /// # 戻り値
    ///
    /// 集計結果。バッチ自体はエラーを返しません。
    pub fn process_files<S>(&self, files: &[InputFile], sink: &mut S) -> ProcessingResult
    where
        S: EventSink + ?Sized,
    {
        let mut result = ProcessingResult::default();
        let total = files.len();

        for (index, file) in files.iter().enumerate() {
            if file.size > self.config.max_file_size {
                let message = format!(
                    "{} is {} - max allowed is {}",
                    file.name,
                    format_file_size(file.size),
                    format_limit(self.config.max_file_size)
                );
                warn!(file = %file.name, size = file.size, "skipping oversized file");
                let kind = FileErrorKind::TooLarge {
                    size: file.size,
                    limit: self.config.max_file_size,
                };
                report(sink, &mut result, &file.name, kind, message);
                continue;
            }

            sink.emit(ProcessEvent::progress(format!(
                "Loading ({}/{}): {}",
                index + 1,
                total,
                file.name
            )));

            let Some(format) = detect_format(file) else {
                let message = format!(
                    "Unsupported file type: {}. Supported file types: Excel (.xlsx, .xls), .ods, or .csv.",
                    file.mime
                );
                warn!(file = %file.name, mime = %file.mime, "skipping unsupported file");
                let kind = FileErrorKind::UnsupportedType {
                    mime: file.mime.clone(),
                };
                report(sink, &mut result, &file.name, kind, message);
                continue;
            };

            sink.emit(ProcessEvent::progress(format!(
                "Processing {} file: {}...",
                format.description(),
                file.name
            )));

            let parsed = match self.parse_file(file) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!(file = %file.name, format = format.description(), error = %e, "failed to process file");
                    let message = format!(
                        "Error processing {} ({}). Open the console for more information.",
                        file.name,
                        format.description()
                    );
                    let kind = FileErrorKind::ProcessingFailed {
                        format,
                        cause: e.to_string(),
                    };
                    report(sink, &mut result, &file.name, kind, message);
                    continue;
                }
            };

            debug!(
                file = %file.name,
                rows = parsed.rows,
                questions = parsed.questions.len(),
                "file processed"
            );
            result.total_rows += parsed.rows;
            result.questions.extend(parsed.questions);

            if result.total_rows > self.config.max_total_rows {
                let limit = self.config.max_total_rows;
                warn!(total_rows = result.total_rows, limit, "row limit exceeded, halting batch");
                let kind = FileErrorKind::RowLimitExceeded {
                    limit,
                    total_rows: result.total_rows,
                };
                report(
                    sink,
                    &mut result,
                    &file.name,
                    kind,
                    format!("Row limit exceeded ({}).", limit),
                );
                break;
            }
        }

        self.finish(result, sink)
    }

    /// 1ファイルを読み込み、シート順・行順に問題へ変換する
    fn parse_file(&self, file: &InputFile) -> Result<ParsedFile, QuizSheetError> {
        let tables = read_tables(
            &file.data,
            &self.config.sheet_selector,
            &self.formatter,
            &self.config.security,
        )?;

        let mut parsed = ParsedFile {
            rows: 0,
            questions: Vec::new(),
        };
        for table in &tables {
            let mapper = RowMapper::new(&table.header);
            let rows: Vec<SheetRow> = table
                .records
                .iter()
                .filter_map(|record| mapper.map(record))
                .collect();

            // collectは入力順を保持する
            let questions: Vec<Question> = rows
                .par_iter()
                .filter_map(|row| classify(row, self.config.type_mode))
                .collect();

            debug!(
                sheet = %table.name,
                columns = ?mapper.column_names(),
                rows = rows.len(),
                "sheet classified"
            );
            parsed.rows += rows.len();
            parsed.questions.extend(questions);
        }
        Ok(parsed)
    }

    /// 最終通知を送り、XMLを組み立てる
    fn finish<S>(&self, mut result: ProcessingResult, sink: &mut S) -> ProcessingResult
    where
        S: EventSink + ?Sized,
    {
        if result.total_rows == 0 {
            sink.emit(ProcessEvent::error("No data found in the uploaded files."));
        } else if result.questions.is_empty() {
            sink.emit(ProcessEvent::error("No valid questions were generated."));
        } else {
            sink.emit(ProcessEvent::progress(format!(
                "Generated {} questions",
                result.questions.len()
            )));
            let skipped = result.skipped_rows();
            if skipped > 0 {
                sink.emit(ProcessEvent::progress(format!(
                    "{} rows were skipped because they produced no question.",
                    skipped
                )));
            }
        }

        result.xml = match build_xml(&result.questions) {
            Ok(xml) => xml,
            Err(e) => {
                error!(error = %e, "failed to build quiz XML");
                String::new()
            }
        };

        info!(
            questions = result.questions.len(),
            total_rows = result.total_rows,
            errors = result.errors.len(),
            "batch finished"
        );

        sink.emit(ProcessEvent::Done {
            xml: result.xml.clone(),
            questions: result.questions.clone(),
        });
        result
    }
}

/// MIMEタイプ、次に拡張子で形式を判定する
fn detect_format(file: &InputFile) -> Option<SourceFormat> {
    SourceFormat::from_mime(&file.mime).or_else(|| SourceFormat::from_file_name(&file.name))
}

/// エラーを通知し、結果に記録する
fn report<S>(
    sink: &mut S,
    result: &mut ProcessingResult,
    file_name: &str,
    kind: FileErrorKind,
    message: String,
) where
    S: EventSink + ?Sized,
{
    sink.emit(ProcessEvent::error(message.clone()));
    result.errors.push(FileError {
        file_name: file_name.to_string(),
        kind,
        message,
    });
}

/// ファイルサイズの表示（1MiB以上は小数1桁の`X.XMiB`）
fn format_file_size(bytes: u64) -> String {
    if bytes as f64 >= MIB {
        format!("{:.1}MiB", bytes as f64 / MIB)
    } else {
        format_below_mib(bytes)
    }
}

/// 上限値の表示（整数MiBは小数点なし）
fn format_limit(bytes: u64) -> String {
    let mib = bytes as f64 / MIB;
    if mib < 1.0 {
        format_below_mib(bytes)
    } else if mib.fract() == 0.0 {
        format!("{} MiB", mib as u64)
    } else {
        format!("{:.1} MiB", mib)
    }
}

fn format_below_mib(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }
    let kib = bytes as f64 / 1024.0;
    if kib.fract() == 0.0 {
        format!("{} KiB", kib as u64)
    } else {
        format!("{:.1} KiB", kib)
    }
}
