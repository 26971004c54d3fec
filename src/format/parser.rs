//! NumberFormat Module
//!
//! 表示形式文字列のセクション分割と、値の符号によるセクション選択。

use super::sections::{FormatSection, SectionKind};

/// 解析済みの表示形式
///
/// 最大4セクション（正数;負数;ゼロ;テキスト）を保持します。
/// 条件付きセクション（`[>100]`）の条件は無視し、符号で選択します。
#[derive(Debug, Clone)]
pub(crate) struct NumberFormat {
    sections: Vec<FormatSection>,
}

impl NumberFormat {
    pub fn parse(code: &str) -> Self {
        if code.trim().is_empty() {
            return Self {
                sections: Vec::new(),
            };
        }
        let sections = split_sections(code)
            .iter()
            .take(4)
            .map(|s| FormatSection::parse(s))
            .collect();
        Self { sections }
    }

    /// `General`（または空）の形式かどうか
    pub fn is_general(&self) -> bool {
        self.sections
            .first()
            .map_or(true, |s| s.kind == SectionKind::General)
    }

    /// 数値を表示文字列に変換する
    ///
    /// `General`、テキスト、日付、分数の各形式では`None`を返し、
    /// 呼び出し側の既定の数値表現に任せます。
    pub fn format(&self, value: f64) -> Option<String> {
        let (section, explicit_sign) = self.select_section(value)?;
        let rendered = section.render(value.abs())?;

        if value < 0.0 && !explicit_sign {
            Some(format!("-{}", rendered))
        } else {
            Some(rendered)
        }
    }

    /// 値に対応するセクションと、そのセクションが符号を持つかを返す
    fn select_section(&self, value: f64) -> Option<(&FormatSection, bool)> {
        let first = self.sections.first()?;
        let negative = self.sections.get(1).filter(|s| s.kind != SectionKind::Text);
        let zero = self.sections.get(2).filter(|s| s.kind != SectionKind::Text);

        if value < 0.0 {
            Some(negative.map_or((first, false), |s| (s, true)))
        } else if value == 0.0 {
            Some((zero.unwrap_or(first), false))
        } else {
            Some((first, false))
        }
    }
}

/// `;`でセクションに分割する（引用符と角括弧の中は除く）
fn split_sections(code: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;

    for ch in code.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        match ch {
            '\\' if !in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            ';' if !in_quotes && !in_brackets => {
                sections.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    sections.push(current);
    sections
}
