//! Preview Module
//!
//! 生成された問題一覧の絞り込み・並べ替え・検索と、テキスト表形式の一覧表示。

use std::cmp::Ordering;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::QuestionKind;
use crate::types::Question;

/// 種類による絞り込み
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Multichoice,
    TrueFalse,
    ShortAnswer,
}

impl TypeFilter {
    pub fn matches(&self, kind: QuestionKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Multichoice => kind == QuestionKind::Multichoice,
            TypeFilter::TrueFalse => kind == QuestionKind::TrueFalse,
            TypeFilter::ShortAnswer => kind == QuestionKind::ShortAnswer,
        }
    }
}

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// 生成順
    #[default]
    Original,
    /// 問題名の昇順（大文字小文字を区別しない）
    TitleAsc,
    /// 問題名の降順（大文字小文字を区別しない）
    TitleDesc,
}

/// 一覧表示の条件
///
/// # 使用例
///
/// ```rust
/// use quizsheet::{PreviewQuery, Question, SortOrder, TypeFilter};
///
/// let questions = vec![
///     Question::true_false("b", "<p>?</p>", true),
///     Question::true_false("A", "<p>?</p>", false),
/// ];
/// let query = PreviewQuery {
///     filter: TypeFilter::TrueFalse,
///     sort: SortOrder::TitleAsc,
///     search: String::new(),
/// };
/// let rows = query.apply(&questions);
/// assert_eq!(rows[0].0, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewQuery {
    pub filter: TypeFilter,
    pub sort: SortOrder,
    /// 問題名・問題文・種類名・解答に対する部分一致（大文字小文字を区別しない）
    ///
    /// 前後の空白は無視されます。
    pub search: String,
}

impl PreviewQuery {
    /// 条件に合う問題を、元の番号（1始まり）と組にして返す
    pub fn apply<'a>(&self, questions: &'a [Question]) -> Vec<(usize, &'a Question)> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<(usize, &Question)> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (i + 1, q))
            .filter(|(_, q)| self.filter.matches(q.kind()))
            .filter(|(_, q)| needle.is_empty() || matches_search(q, &needle))
            .collect();

        match self.sort {
            SortOrder::Original => {}
            SortOrder::TitleAsc => rows.sort_by(|a, b| compare_titles(a.1, b.1)),
            SortOrder::TitleDesc => rows.sort_by(|a, b| compare_titles(b.1, a.1)),
        }
        rows
    }
}

fn compare_titles(a: &Question, b: &Question) -> Ordering {
    a.name().to_lowercase().cmp(&b.name().to_lowercase())
}

fn matches_search(question: &Question, needle: &str) -> bool {
    question.name().to_lowercase().contains(needle)
        || question.questiontext().to_lowercase().contains(needle)
        || question.kind().as_str().contains(needle)
        || question
            .answers()
            .iter()
            .any(|a| a.text.to_lowercase().contains(needle))
}

const NUMBER_WIDTH: usize = 4;
const KIND_WIDTH: usize = 11;
const TITLE_WIDTH: usize = 30;
const ANSWERS_WIDTH: usize = 40;

/// 一覧をテキスト表に整形する
///
/// 正解の解答には`*`が付きます。各列は表示幅で切り詰められます。
pub fn render_table(rows: &[(usize, &Question)]) -> String {
    let mut out = String::new();
    push_line(&mut out, "#", "Type", "Title", "Answers");
    out.push_str(&format!(
        "{}-+-{}-+-{}-+-{}\n",
        "-".repeat(NUMBER_WIDTH),
        "-".repeat(KIND_WIDTH),
        "-".repeat(TITLE_WIDTH),
        "-".repeat(ANSWERS_WIDTH)
    ));

    for (number, question) in rows {
        let answers = question
            .answers()
            .iter()
            .map(|a| {
                if a.fraction.is_correct() {
                    format!("*{}", a.text)
                } else {
                    a.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
        push_line(
            &mut out,
            &number.to_string(),
            question.kind().as_str(),
            question.name(),
            &answers,
        );
    }
    out
}

fn push_line(out: &mut String, number: &str, kind: &str, title: &str, answers: &str) {
    out.push_str(&pad(number, NUMBER_WIDTH));
    out.push_str(" | ");
    out.push_str(&pad(kind, KIND_WIDTH));
    out.push_str(" | ");
    out.push_str(&pad(title, TITLE_WIDTH));
    out.push_str(" | ");
    out.push_str(truncate(answers, ANSWERS_WIDTH).trim_end());
    out.push('\n');
}

/// 表示幅`width`に切り詰め、空白で埋める
fn pad(text: &str, width: usize) -> String {
    let truncated = truncate(text, width);
    let fill = width.saturating_sub(truncated.width());
    format!("{}{}", truncated, " ".repeat(fill))
}

/// 表示幅`width`を超える場合は末尾を`…`に置き換える
fn truncate(text: &str, width: usize) -> String {
    // 改行は表を崩すため空白にする
    let text: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if text.width() <= width {
        return text;
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
