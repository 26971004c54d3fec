//! quizsheet - Spreadsheet to Moodle quiz XML converter
//!
//! This crate reads question rows from CSV, XLS, XLSX and ODS files and converts
//! them into a single Moodle XML question bank (multiple choice, true/false and
//! short answer questions).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quizsheet::{InputFile, ProcessorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a processor with default settings (5 MiB per file, 5000 rows per batch)
//!     let processor = ProcessorBuilder::new().build()?;
//!
//!     let files = vec![InputFile::from_path("week1.xlsx")?];
//!     let result = processor.process(&files);
//!
//!     std::fs::write("questions.xml", &result.xml)?;
//!     Ok(())
//! }
//! ```
//!
//! # Progress Events
//!
//! Any `FnMut(ProcessEvent)` closure can receive progress, error and completion events:
//!
//! ```rust,no_run
//! use quizsheet::{InputFile, ProcessEvent, ProcessorBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = ProcessorBuilder::new().build()?;
//! let csv = b"Type,Title,Question,Correct\ntruefalse,T1,<p>Sky blue?</p>,TRUE\n".to_vec();
//! let files = vec![InputFile::new("quiz.csv", "text/csv", csv)];
//!
//! let mut on_event = |event: ProcessEvent| match event {
//!     ProcessEvent::Progress { message } => println!("{}", message),
//!     ProcessEvent::Error { message } => eprintln!("{}", message),
//!     ProcessEvent::Done { questions, .. } => println!("done: {}", questions.len()),
//! };
//! processor.process_files(&files, &mut on_event);
//! # Ok(())
//! # }
//! ```
//!
//! # Spreadsheet Layout
//!
//! The first row of every sheet is the header. Recognised columns are
//! `Type`, `Title`, `Question`, `OptionA`..`OptionD`, `Correct`, `UseCase`
//! and `Correct1`, `Correct2`, ... (short answer alternatives).

mod api;
mod builder;
mod classifier;
mod error;
mod events;
mod format;
mod formatter;
mod output;
mod parser;
mod preview;
mod processor;
mod security;
mod types;

// 公開API
pub use api::{DateFormat, QuestionKind, SheetSelector, SourceFormat, TypeMode};
pub use builder::{ProcessorBuilder, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_ROWS};
pub use classifier::{classify, row_to_question};
pub use error::QuizSheetError;
pub use events::{EventSink, NullSink, ProcessEvent};
pub use output::{build_xml, MoodleXmlWriter};
pub use preview::{render_table, PreviewQuery, SortOrder, TypeFilter};
pub use processor::Processor;
pub use security::SecurityConfig;
pub use types::{
    Answer, FileError, FileErrorKind, Fraction, InputFile, ProcessingResult, Question,
    QuestionBody, SheetRow,
};
