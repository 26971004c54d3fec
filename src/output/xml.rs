//! Moodle XML Writer
//!
//! quick-xmlのイベントライターで`<quiz>`文書を組み立てます。
//!
//! ```xml
//! <quiz>
//!   <question type="shortanswer">
//!     <name>
//!       <text>TITLE</text>
//!     </name>
//!     <questiontext format="html">
//!       <text><![CDATA[QUESTION_HTML]]></text>
//!     </questiontext>
//!     <usecase>0</usecase>
//!     <answer fraction="100" format="moodle_auto_format">
//!       <text>ANSWER</text>
//!     </answer>
//!   </question>
//! </quiz>
//! ```

use std::io::Write;

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::api::QuestionKind;
use crate::error::QuizSheetError;
use crate::types::{Answer, Question};

/// 解答要素の`format`属性（正誤・記述問題のみ）
const ANSWER_FORMAT: &str = "moodle_auto_format";

/// 問題リストからXML文字列を生成する
///
/// 問題が1つもない場合は空文字列を返します。
pub fn build_xml(questions: &[Question]) -> Result<String, QuizSheetError> {
    if questions.is_empty() {
        return Ok(String::new());
    }

    let mut buffer = Vec::new();
    MoodleXmlWriter::new(&mut buffer).write_quiz(questions)?;
    Ok(String::from_utf8(buffer)?)
}

/// Moodle XMLライター
///
/// 2スペースのインデントで出力します。XML宣言は付けません。
pub struct MoodleXmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> MoodleXmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    /// `<quiz>`文書全体を書き出す
    pub fn write_quiz(&mut self, questions: &[Question]) -> Result<(), QuizSheetError> {
        self.writer
            .create_element("quiz")
            .write_inner_content(|w| {
                for question in questions {
                    write_question(w, question)?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

fn write_question<W: Write>(w: &mut Writer<W>, question: &Question) -> quick_xml::Result<()> {
    let kind = question.kind();
    w.create_element("question")
        .with_attribute(("type", kind.as_str()))
        .write_inner_content(|w| {
            w.create_element("name").write_inner_content(|w| {
                w.create_element("text")
                    .write_text_content(BytesText::new(question.name()))?;
                Ok::<(), quick_xml::Error>(())
            })?;

            w.create_element("questiontext")
                .with_attribute(("format", "html"))
                .write_inner_content(|w| write_cdata_text(w, question.questiontext()))?;

            if let Some(usecase) = question.usecase() {
                w.create_element("usecase")
                    .write_text_content(BytesText::new(&usecase.to_string()))?;
            }

            for answer in question.answers() {
                write_answer(w, kind, answer)?;
            }
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(())
}

fn write_answer<W: Write>(
    w: &mut Writer<W>,
    kind: QuestionKind,
    answer: &Answer,
) -> quick_xml::Result<()> {
    let mut element = w
        .create_element("answer")
        .with_attribute(("fraction", answer.fraction.as_str()));
    if kind != QuestionKind::Multichoice {
        element = element.with_attribute(("format", ANSWER_FORMAT));
    }
    element.write_inner_content(|w| {
        w.create_element("text")
            .write_text_content(BytesText::new(&answer.text))?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

/// `<text><![CDATA[...]]></text>`を書き出す
///
/// 本文中の`]]>`はCDATAを閉じてしまうため、2つのセクションに分割します。
fn write_cdata_text<W: Write>(w: &mut Writer<W>, content: &str) -> quick_xml::Result<()> {
    w.write_event(Event::Start(BytesStart::new("text")))?;
    for section in cdata_sections(content) {
        w.write_event(Event::CData(BytesCData::new(section)))?;
    }
    w.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

fn cdata_sections(content: &str) -> Vec<String> {
    let parts: Vec<&str> = content.split("]]>").collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}
