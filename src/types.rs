//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::path::Path;

use serde::Serialize;

use crate::api::{QuestionKind, SourceFormat};
use crate::error::QuizSheetError;

/// アップロードされた1ファイル
///
/// `size`はサイズ制限の判定に使用されます（通常は`data.len()`と一致）。
/// `mime`が空、または未知の場合は拡張子で形式を判定します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub data: Vec<u8>,
}

impl InputFile {
    /// バイト列から入力ファイルを生成する
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime: mime.into(),
            data,
        }
    }

    /// ローカルファイルを読み込む
    ///
    /// ローカルファイルにはMIMEタイプがないため、形式は拡張子で判定されます。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuizSheetError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, "", data))
    }
}

/// スプレッドシートの1データ行
///
/// ヘッダー行の列名をキーとして解決済みのフィールドを保持します。
/// 空セルは`None`になります。`Correct1`, `Correct2`, ... の列は
/// 列順に`alternatives`へ集約されます（値は未トリム）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// `Type`列
    pub kind: Option<String>,
    /// `Title`列
    pub title: Option<String>,
    /// `Question`列（HTML）
    pub question: Option<String>,
    /// `OptionA`〜`OptionD`列
    pub options: [Option<String>; 4],
    /// `Correct`列
    pub correct: Option<String>,
    /// `UseCase`列
    pub use_case: Option<String>,
    /// `CorrectN`列の値（列順）
    pub alternatives: Vec<String>,
}

/// 解答の配点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fraction {
    /// 正解（`fraction="100"`）
    #[serde(rename = "100")]
    Full,
    /// 不正解（`fraction="0"`）
    #[serde(rename = "0")]
    Zero,
}

impl Fraction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fraction::Full => "100",
            Fraction::Zero => "0",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Fraction::Full)
    }
}

impl From<bool> for Fraction {
    fn from(correct: bool) -> Self {
        if correct {
            Fraction::Full
        } else {
            Fraction::Zero
        }
    }
}

/// 1つの解答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub fraction: Fraction,
    pub text: String,
}

impl Answer {
    pub fn new(fraction: Fraction, text: impl Into<String>) -> Self {
        Self {
            fraction,
            text: text.into(),
        }
    }
}

/// 問題種類ごとの本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionBody {
    /// 0〜4個の選択肢（A〜Dのうち値のあるもの）
    Multichoice { answers: Vec<Answer> },

    /// 固定の`true`/`false`の2解答で、どちらか一方のみが正解
    #[serde(rename = "truefalse")]
    TrueFalse { answers: [Answer; 2] },

    /// 正解候補はすべて`fraction="100"`
    #[serde(rename = "shortanswer")]
    ShortAnswer { usecase: u8, answers: Vec<Answer> },
}

/// XMLに書き出し可能な1問
///
/// 種類ごとの生成関数（[`Question::multichoice`]、[`Question::true_false`]、
/// [`Question::short_answer`]）からのみ構築されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    name: String,
    questiontext: String,
    #[serde(flatten)]
    body: QuestionBody,
}

impl Question {
    /// 多肢選択問題。`answers`はラベル順（A〜D）に並べる
    pub fn multichoice(
        name: impl Into<String>,
        questiontext: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Self {
        Self {
            name: name.into(),
            questiontext: questiontext.into(),
            body: QuestionBody::Multichoice { answers },
        }
    }

    /// 正誤問題。`true`と`false`の2解答を生成し、`answer_is_true`側を正解にする
    pub fn true_false(
        name: impl Into<String>,
        questiontext: impl Into<String>,
        answer_is_true: bool,
    ) -> Self {
        Self {
            name: name.into(),
            questiontext: questiontext.into(),
            body: QuestionBody::TrueFalse {
                answers: [
                    Answer::new(answer_is_true.into(), "true"),
                    Answer::new((!answer_is_true).into(), "false"),
                ],
            },
        }
    }

    /// 記述問題。`accepted`のすべてが満点の解答になる
    pub fn short_answer(
        name: impl Into<String>,
        questiontext: impl Into<String>,
        case_sensitive: bool,
        accepted: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            questiontext: questiontext.into(),
            body: QuestionBody::ShortAnswer {
                usecase: u8::from(case_sensitive),
                answers: accepted
                    .into_iter()
                    .map(|text| Answer::new(Fraction::Full, text))
                    .collect(),
            },
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::Multichoice { .. } => QuestionKind::Multichoice,
            QuestionBody::TrueFalse { .. } => QuestionKind::TrueFalse,
            QuestionBody::ShortAnswer { .. } => QuestionKind::ShortAnswer,
        }
    }

    /// 問題名（`<name><text>`）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 問題文HTML（CDATAとして書き出される）
    pub fn questiontext(&self) -> &str {
        &self.questiontext
    }

    pub fn body(&self) -> &QuestionBody {
        &self.body
    }

    pub fn answers(&self) -> &[Answer] {
        match &self.body {
            QuestionBody::Multichoice { answers } => answers,
            QuestionBody::TrueFalse { answers } => answers,
            QuestionBody::ShortAnswer { answers, .. } => answers,
        }
    }

    /// 記述問題の`usecase`値（他の種類では`None`）
    pub fn usecase(&self) -> Option<u8> {
        match self.body {
            QuestionBody::ShortAnswer { usecase, .. } => Some(usecase),
            _ => None,
        }
    }
}

/// ファイル単位のエラー種別
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileErrorKind {
    /// サイズ制限超過。ファイルはスキップされる
    TooLarge { size: u64, limit: u64 },

    /// MIMEタイプ・拡張子のどちらでも形式を判定できない
    UnsupportedType { mime: String },

    /// 読み込み・解析中の失敗。`cause`はログ用の詳細
    ProcessingFailed { format: SourceFormat, cause: String },

    /// バッチ全体の行数上限超過。以降のファイルは処理されない
    RowLimitExceeded { limit: usize, total_rows: usize },
}

/// ファイル単位のエラー記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub file_name: String,
    pub kind: FileErrorKind,
    /// 通知チャネルに送られたメッセージ
    pub message: String,
}

/// 1回のバッチ処理の集計結果
///
/// `questions`はファイル順・シート順・行順を保持し、並べ替えや重複除去はしません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingResult {
    pub questions: Vec<Question>,
    /// 受理されたファイルから読み込んだデータ行の総数
    pub total_rows: usize,
    /// Moodle XML。問題が1つもない場合は空文字列
    pub xml: String,
    pub errors: Vec<FileError>,
}

impl ProcessingResult {
    /// 問題にならなかった行数
    pub fn skipped_rows(&self) -> usize {
        self.total_rows.saturating_sub(self.questions.len())
    }

    /// 行数上限によりバッチが途中で打ち切られたか
    pub fn halted(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e.kind, FileErrorKind::RowLimitExceeded { .. }))
    }
}
