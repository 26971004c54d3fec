//! Output Module
//!
//! 問題リストをMoodle XML（`<quiz>`文書）として書き出すモジュール。

mod xml;

pub use xml::{build_xml, MoodleXmlWriter};
