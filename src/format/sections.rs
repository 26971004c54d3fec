//! FormatSection Module
//!
//! 数値セクションの配置解析と描画。

use super::tokens::{tokenize, FormatToken, Placeholder};

/// セクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    /// 数値として描画できるセクション
    Number,
    General,
    Text,
    DateTime,
    /// 分数（未対応）
    Fraction,
}

/// 描画要素
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Int(usize),
    Frac(usize),
    Exp(usize),
    ExpMark { always_sign: bool },
    Point,
    Literal(String),
}

/// 表示形式の1セクション
#[derive(Debug, Clone)]
pub(crate) struct FormatSection {
    pub kind: SectionKind,
    items: Vec<Item>,
    int_slots: Vec<Placeholder>,
    frac_slots: Vec<Placeholder>,
    exp_slots: Vec<Placeholder>,
    grouping: bool,
    /// 末尾カンマの数（1つごとに1000で割る）
    scale: i32,
    /// `%`の数（1つごとに100倍）
    percent: i32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Int,
    Frac,
    Exp,
}

impl FormatSection {
    pub fn parse(section: &str) -> Self {
        let tokens = tokenize(section);
        let kind = classify(&tokens);

        let mut this = Self {
            kind,
            items: Vec::new(),
            int_slots: Vec::new(),
            frac_slots: Vec::new(),
            exp_slots: Vec::new(),
            grouping: false,
            scale: 0,
            percent: 0,
        };
        if kind != SectionKind::Number {
            return this;
        }

        let mut phase = Phase::Int;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                FormatToken::Digit(placeholder) => {
                    let item = match phase {
                        Phase::Int => {
                            this.int_slots.push(*placeholder);
                            Item::Int(this.int_slots.len() - 1)
                        }
                        Phase::Frac => {
                            this.frac_slots.push(*placeholder);
                            Item::Frac(this.frac_slots.len() - 1)
                        }
                        Phase::Exp => {
                            this.exp_slots.push(*placeholder);
                            Item::Exp(this.exp_slots.len() - 1)
                        }
                    };
                    this.items.push(item);
                }
                FormatToken::DecimalPoint if phase == Phase::Int => {
                    phase = Phase::Frac;
                    this.items.push(Item::Point);
                }
                FormatToken::DecimalPoint => this.items.push(Item::Literal(".".to_string())),
                FormatToken::Exponent { always_sign } => {
                    phase = Phase::Exp;
                    this.items.push(Item::ExpMark {
                        always_sign: *always_sign,
                    });
                }
                FormatToken::Percent => {
                    this.percent += 1;
                    this.items.push(Item::Literal("%".to_string()));
                }
                FormatToken::Comma => {
                    let seen_digit = tokens[..i].iter().any(FormatToken::is_digit);
                    let digit_follows = tokens[i + 1..]
                        .iter()
                        .take_while(|t| {
                            !matches!(t, FormatToken::DecimalPoint | FormatToken::Exponent { .. })
                        })
                        .any(FormatToken::is_digit);
                    if !seen_digit {
                        this.items.push(Item::Literal(",".to_string()));
                    } else if digit_follows {
                        // 小数部のカンマは無視
                        this.grouping |= phase == Phase::Int;
                    } else {
                        this.scale += 1;
                    }
                }
                FormatToken::Literal(text) => this.items.push(Item::Literal(text.clone())),
                _ => {}
            }
        }
        this
    }

    /// 絶対値`value`を描画する（符号は呼び出し側で付ける）
    pub fn render(&self, value: f64) -> Option<String> {
        if self.kind != SectionKind::Number || !value.is_finite() {
            return None;
        }

        let value = value * 100f64.powi(self.percent) / 1000f64.powi(self.scale);
        let decimals = self.frac_slots.len();

        let (mantissa, exponent) = if !self.has_exponent() {
            (value, 0)
        } else {
            self.scientific(value, decimals)
        };

        let (int_digits, frac_digits) = split_digits(mantissa, decimals)?;
        let mut int_parts = fill_integer(&int_digits, &self.int_slots, self.grouping);
        let frac_parts = fill_fraction(&frac_digits, &self.frac_slots);
        let exp_parts = fill_integer(&exponent.unsigned_abs().to_string(), &self.exp_slots, false);

        // 整数部のプレースホルダーがない形式（`.00`など）では小数点の前に出す
        let mut orphan_int = if self.int_slots.is_empty() {
            int_digits
        } else {
            String::new()
        };

        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Int(i) => out.push_str(&std::mem::take(&mut int_parts[*i])),
                Item::Frac(i) => out.push_str(&frac_parts[*i]),
                Item::Exp(i) => out.push_str(&exp_parts[*i]),
                Item::ExpMark { always_sign } => {
                    out.push_str(&std::mem::take(&mut orphan_int));
                    out.push('E');
                    if exponent < 0 {
                        out.push('-');
                    } else if *always_sign {
                        out.push('+');
                    }
                }
                Item::Point => {
                    out.push_str(&std::mem::take(&mut orphan_int));
                    out.push('.');
                }
                Item::Literal(text) => out.push_str(text),
            }
        }
        Some(out)
    }

    fn has_exponent(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, Item::ExpMark { .. }))
    }

    /// 指数表記の仮数と指数
    ///
    /// 整数部に`#`を含む複数桁の形式（`##0.0E+0`）は指数を桁数の倍数にそろえます。
    fn scientific(&self, value: f64, decimals: usize) -> (f64, i32) {
        if value == 0.0 {
            return (0.0, 0);
        }
        let width = self.int_slots.len().max(1) as i32;
        let magnitude = value.log10().floor() as i32;
        let engineering = width > 1 && self.int_slots.contains(&Placeholder::Hash);

        let mut exponent = if engineering {
            magnitude.div_euclid(width) * width
        } else {
            magnitude - (width - 1)
        };
        let mut mantissa = value / 10f64.powi(exponent);

        // 丸めで桁が繰り上がった場合
        let factor = 10f64.powi(decimals as i32);
        if !engineering && (mantissa * factor).round() / factor >= 10f64.powi(width) {
            exponent += 1;
            mantissa = value / 10f64.powi(exponent);
        }
        (mantissa, exponent)
    }
}

fn classify(tokens: &[FormatToken]) -> SectionKind {
    let has = |f: fn(&FormatToken) -> bool| tokens.iter().any(f);

    if has(|t| matches!(t, FormatToken::General)) {
        SectionKind::General
    } else if has(|t| matches!(t, FormatToken::DateTime)) {
        SectionKind::DateTime
    } else if has(|t| matches!(t, FormatToken::Slash)) && has(FormatToken::is_digit) {
        SectionKind::Fraction
    } else if has(|t| matches!(t, FormatToken::TextPlaceholder)) {
        SectionKind::Text
    } else {
        SectionKind::Number
    }
}

/// 四捨五入して整数部と小数部の数字列に分ける
///
/// Excelと同じく有効数字15桁にそろえてから丸めます（2.675 -> 2.68）。
/// 整数部の先頭の0は取り除きます（0の場合は空文字列）。
fn split_digits(value: f64, decimals: usize) -> Option<(String, String)> {
    let scaled = value * 10f64.powi(decimals as i32);
    if !scaled.is_finite() {
        return None;
    }
    let scaled = format!("{:.14e}", scaled).parse::<f64>().ok()?.round();

    let mut digits = format!("{:.0}", scaled);
    if digits.len() <= decimals {
        digits = format!("{:0>width$}", digits, width = decimals + 1);
    }
    let frac = digits.split_off(digits.len() - decimals);
    let int = digits.trim_start_matches('0').to_string();
    Some((int, frac))
}

/// 整数部の数字を右からプレースホルダーに割り当てる
///
/// 桁が余った場合は先頭のプレースホルダーにまとめて出します。
fn fill_integer(digits: &str, slots: &[Placeholder], grouping: bool) -> Vec<String> {
    let mut remaining: Vec<char> = digits.chars().collect();
    let mut parts = vec![String::new(); slots.len()];
    let mut emitted = 0usize;

    for (i, slot) in slots.iter().enumerate().rev() {
        let take = if i == 0 {
            remaining.len()
        } else {
            remaining.len().min(1)
        };
        let mut produced = remaining.split_off(remaining.len() - take);
        if produced.is_empty() {
            match slot {
                Placeholder::Zero => produced.push('0'),
                Placeholder::Question => {
                    parts[i].push(' ');
                    continue;
                }
                Placeholder::Hash => continue,
            }
        }

        // 逆順に組み立ててから反転する
        let mut reversed = String::new();
        for c in produced.into_iter().rev() {
            if grouping && emitted > 0 && emitted % 3 == 0 {
                reversed.push(',');
            }
            reversed.push(c);
            emitted += 1;
        }
        parts[i] = reversed.chars().rev().collect();
    }
    parts
}

/// 小数部の数字を左から割り当て、末尾の省略可能な0を消す
fn fill_fraction(digits: &str, slots: &[Placeholder]) -> Vec<String> {
    let mut parts: Vec<String> = digits.chars().map(String::from).collect();
    for (i, slot) in slots.iter().enumerate().rev() {
        if parts[i] != "0" {
            break;
        }
        match slot {
            Placeholder::Zero => break,
            Placeholder::Hash => parts[i].clear(),
            Placeholder::Question => parts[i] = " ".to_string(),
        }
    }
    parts
}
