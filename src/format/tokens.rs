//! FormatToken Module
//!
//! 表示形式文字列（1セクション分）の字句解析。

/// 数字プレースホルダー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placeholder {
    /// `0`: 桁がなければ0を表示
    Zero,
    /// `#`: 桁がなければ何も表示しない
    Hash,
    /// `?`: 桁がなければ空白を表示
    Question,
}

/// フォーマットトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormatToken {
    Digit(Placeholder),
    DecimalPoint,
    /// 桁区切り、または末尾での1000分の1スケール（位置で決まる）
    Comma,
    Percent,
    /// `E+` / `E-`（`always_sign`は`E+`のとき真）
    Exponent { always_sign: bool },
    Literal(String),
    /// `@`
    TextPlaceholder,
    /// 日付・時刻の指定子（`y`, `m`, `d`, `h`, `s`, `[h]`など）
    DateTime,
    /// 分数の区切り
    Slash,
    /// `General`
    General,
}

impl FormatToken {
    pub fn is_digit(&self) -> bool {
        matches!(self, FormatToken::Digit(_))
    }
}

/// 1セクション分の文字列をトークン列に変換する
///
/// 色指定（`[Red]`）、条件（`[>100]`）、ロケール（`[$-409]`）は読み飛ばし、
/// 通貨指定（`[$€-407]`）は記号だけをリテラルとして残します。
pub(crate) fn tokenize(section: &str) -> Vec<FormatToken> {
    let mut tokens = Vec::new();
    let mut chars = section.chars().peekable();

    while let Some(ch) = chars.next() {
        let token = match ch {
            '"' => {
                let literal: String = chars.by_ref().take_while(|&c| c != '"').collect();
                FormatToken::Literal(literal)
            }
            '\\' => match chars.next() {
                Some(escaped) => FormatToken::Literal(escaped.to_string()),
                None => continue,
            },
            // `_x`は文字xの幅の空白
            '_' => {
                chars.next();
                FormatToken::Literal(" ".to_string())
            }
            // `*x`はセル幅までの繰り返し（テキスト出力では不要）
            '*' => {
                chars.next();
                continue;
            }
            '[' => {
                let content: String = chars.by_ref().take_while(|&c| c != ']').collect();
                match bracket_token(&content) {
                    Some(token) => token,
                    None => continue,
                }
            }
            '0' => FormatToken::Digit(Placeholder::Zero),
            '#' => FormatToken::Digit(Placeholder::Hash),
            '?' => FormatToken::Digit(Placeholder::Question),
            '.' => FormatToken::DecimalPoint,
            ',' => FormatToken::Comma,
            '%' => FormatToken::Percent,
            '@' => FormatToken::TextPlaceholder,
            '/' => FormatToken::Slash,
            'E' | 'e' if matches!(chars.peek(), Some('+') | Some('-')) => {
                let always_sign = chars.next() == Some('+');
                FormatToken::Exponent { always_sign }
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => FormatToken::DateTime,
            'G' | 'g' if starts_general(&chars) => {
                for _ in 0.."eneral".len() {
                    chars.next();
                }
                FormatToken::General
            }
            other => FormatToken::Literal(other.to_string()),
        };
        tokens.push(token);
    }

    tokens
}

fn bracket_token(content: &str) -> Option<FormatToken> {
    if let Some(currency) = content.strip_prefix('$') {
        let symbol = currency.split('-').next().unwrap_or_default();
        return (!symbol.is_empty()).then(|| FormatToken::Literal(symbol.to_string()));
    }

    // 経過時間（[h]:mm など）
    let lower = content.to_ascii_lowercase();
    if !lower.is_empty() && lower.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
        return Some(FormatToken::DateTime);
    }
    None
}

fn starts_general<I>(chars: &std::iter::Peekable<I>) -> bool
where
    I: Iterator<Item = char> + Clone,
{
    let rest: String = chars.clone().take("eneral".len()).collect();
    rest.eq_ignore_ascii_case("eneral")
}
