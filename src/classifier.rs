//! Classifier Module
//!
//! 1つの`SheetRow`を種類別の`Question`に変換する純粋関数群。

use crate::api::{QuestionKind, TypeMode};
use crate::types::{Answer, Fraction, Question, SheetRow};

/// 多肢選択問題の選択肢ラベル（固定順）
const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 行を問題に変換する
///
/// `Type`列を大文字小文字を区別せず判定し、`truefalse`・`shortanswer`以外
/// （空・未設定を含む）はすべて多肢選択問題になります。この関数は失敗しません。
pub fn row_to_question(row: &SheetRow) -> Question {
    let kind = row
        .kind
        .as_deref()
        .and_then(QuestionKind::from_type_column)
        .unwrap_or(QuestionKind::Multichoice);
    build(kind, row)
}

/// `TypeMode`に従って行を問題に変換する
///
/// `Strict`では、`Type`列が既知の種類名でない行は`None`になります。
pub fn classify(row: &SheetRow, mode: TypeMode) -> Option<Question> {
    match mode {
        TypeMode::Lenient => Some(row_to_question(row)),
        TypeMode::Strict => {
            let kind = row.kind.as_deref().and_then(QuestionKind::from_type_column)?;
            Some(build(kind, row))
        }
    }
}

fn build(kind: QuestionKind, row: &SheetRow) -> Question {
    let name = row.title.clone().unwrap_or_default();
    let text = row.question.clone().unwrap_or_default();

    match kind {
        QuestionKind::TrueFalse => Question::true_false(name, text, true_false_answer(row)),
        QuestionKind::ShortAnswer => {
            Question::short_answer(name, text, case_sensitive(row), accepted_answers(row))
        }
        QuestionKind::Multichoice => Question::multichoice(name, text, choices(row)),
    }
}

/// `Correct`が（大文字小文字を無視して）`true`と完全一致する場合のみ真
fn true_false_answer(row: &SheetRow) -> bool {
    row.correct
        .as_deref()
        .is_some_and(|c| c.to_lowercase() == "true")
}

/// `UseCase`が文字列`"1"`と完全一致する場合のみ大文字小文字を区別する
fn case_sensitive(row: &SheetRow) -> bool {
    row.use_case.as_deref() == Some("1")
}

/// 前後の空白を除去し、空になったものを捨てる
fn accepted_answers(row: &SheetRow) -> Vec<String> {
    row.alternatives
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// 値のある選択肢だけを生成する
///
/// 正誤は`Correct`（大文字化）にラベル文字が部分文字列として含まれるかで決まります。
/// `"AC"`ならAとCの両方が正解です。
fn choices(row: &SheetRow) -> Vec<Answer> {
    let correct = row.correct.as_deref().unwrap_or_default().to_uppercase();

    OPTION_LABELS
        .iter()
        .zip(row.options.iter())
        .filter_map(|(label, option)| {
            let text = option.as_deref().filter(|t| !t.is_empty())?;
            Some(Answer::new(Fraction::from(correct.contains(*label)), text))
        })
        .collect()
}
