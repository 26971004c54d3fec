//! Integration Tests for quizsheet
//!
//! Spreadsheet fixtures are generated with rust_xlsxwriter, CSV fixtures inline.

use rust_xlsxwriter::*;
use std::io::{Cursor, Write};
use quizsheet::{
    FileErrorKind, InputFile, ProcessEvent, ProcessorBuilder, QuestionKind, SheetSelector,
    SourceFormat,
};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const ODS_MIME: &str = "application/vnd.oasis.opendocument.spreadsheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// One question of every type on a single sheet
    pub fn generate_mixed_questions() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let header = [
            "Type", "Title", "Question", "OptionA", "OptionB", "OptionC", "OptionD", "Correct",
            "UseCase", "Correct1", "Correct2",
        ];
        for (col, name) in header.iter().enumerate() {
            worksheet.write_string(0, col as u16, *name)?;
        }

        // multichoice with two correct options
        worksheet.write_string(1, 0, "multichoice")?;
        worksheet.write_string(1, 1, "Q1")?;
        worksheet.write_string(1, 2, "<p>Pick primes</p>")?;
        worksheet.write_number(1, 3, 2.0)?;
        worksheet.write_number(1, 4, 4.0)?;
        worksheet.write_number(1, 5, 5.0)?;
        worksheet.write_string(1, 7, "a,c")?;

        // truefalse with a boolean cell
        worksheet.write_string(2, 0, "TrueFalse")?;
        worksheet.write_string(2, 1, "Q2")?;
        worksheet.write_string(2, 2, "<p>Sky blue?</p>")?;
        worksheet.write_boolean(2, 7, true)?;

        // shortanswer with a numeric UseCase cell
        worksheet.write_string(3, 0, "shortanswer")?;
        worksheet.write_string(3, 1, "Q3")?;
        worksheet.write_string(3, 2, "<p>Capital of France?</p>")?;
        worksheet.write_number(3, 8, 1.0)?;
        worksheet.write_string(3, 9, " Paris ")?;
        worksheet.write_string(3, 10, "paris")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Two sheets, each with one truefalse row
    pub fn generate_two_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        for (name, title) in [("Week1", "W1"), ("Week2", "W2")] {
            let sheet = workbook.add_worksheet();
            sheet.set_name(name)?;
            sheet.write_string(0, 0, "Type")?;
            sheet.write_string(0, 1, "Title")?;
            sheet.write_string(0, 2, "Correct")?;
            sheet.write_string(1, 0, "truefalse")?;
            sheet.write_string(1, 1, title)?;
            sheet.write_string(1, 2, "false")?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// A title stored as a date cell
    pub fn generate_date_title() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        worksheet.write_string(0, 0, "Type")?;
        worksheet.write_string(0, 1, "Title")?;
        worksheet.write_string(1, 0, "truefalse")?;
        // Serial value 45659.0 = 2025-01-02 in Excel 1900 system
        worksheet.write_number_with_format(1, 1, 45659.0, &date_format)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Option cells carrying number formats, with the table starting at B2
    pub fn generate_formatted_numbers() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let percent = Format::new().set_num_format("0%");
        let fixed = Format::new().set_num_format("0.00");
        let grouped = Format::new().set_num_format("#,##0");
        let custom = Format::new().set_num_format("0.0%");

        let header = [
            "Type", "Title", "Question", "OptionA", "OptionB", "OptionC", "OptionD", "Correct",
        ];
        for (col, name) in header.iter().enumerate() {
            worksheet.write_string(1, col as u16 + 1, *name)?;
        }
        worksheet.write_string(2, 1, "multichoice")?;
        worksheet.write_string(2, 2, "Rates")?;
        worksheet.write_string(2, 3, "<p>Which one has two decimals?</p>")?;
        worksheet.write_number_with_format(2, 4, 0.5, &percent)?;
        worksheet.write_number_with_format(2, 5, 2.5, &fixed)?;
        worksheet.write_number_with_format(2, 6, 1234567.0, &grouped)?;
        worksheet.write_number_with_format(2, 7, 0.125, &custom)?;
        worksheet.write_string(2, 8, "B")?;

        Ok(workbook.save_to_buffer()?)
    }

    pub fn generate_rows(count: u32) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Type")?;
        worksheet.write_string(0, 1, "Title")?;
        for row in 1..=count {
            worksheet.write_string(row, 0, "truefalse")?;
            worksheet.write_string(row, 1, format!("T{}", row))?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Minimal OpenDocument spreadsheet with one table
    ///
    /// Cells that parse as numbers are written as float cells.
    pub fn generate_ods(rows: &[&[&str]]) -> Vec<u8> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2"><office:body><office:spreadsheet><table:table table:name="Questions">"#,
        );
        for row in rows {
            content.push_str("<table:table-row>");
            for cell in row.iter() {
                if cell.is_empty() {
                    content.push_str("<table:table-cell/>");
                } else if let Ok(value) = cell.parse::<f64>() {
                    content.push_str(&format!(
                        r#"<table:table-cell office:value-type="float" office:value="{}"><text:p>{}</text:p></table:table-cell>"#,
                        value, cell
                    ));
                } else {
                    content.push_str(&format!(
                        r#"<table:table-cell office:value-type="string"><text:p>{}</text:p></table:table-cell>"#,
                        escape_xml(cell)
                    ));
                }
            }
            content.push_str("</table:table-row>");
        }
        content.push_str("</table:table></office:spreadsheet></office:body></office:document-content>");

        let manifest = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
 <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

        let mut data = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut data));
            let options = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            // mimetype must be the first entry, uncompressed
            zip.start_file("mimetype", options).unwrap();
            zip.write_all(ODS_MIME.as_bytes()).unwrap();
            zip.start_file("META-INF/manifest.xml", options).unwrap();
            zip.write_all(manifest.as_bytes()).unwrap();
            zip.start_file("content.xml", options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        data
    }

    pub enum XlsCell<'a> {
        Text(&'a str),
        Number(f64),
        Empty,
    }

    fn biff_record(out: &mut Vec<u8>, record_type: u16, data: &[u8]) {
        out.extend_from_slice(&record_type.to_le_bytes());
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
        out.extend_from_slice(data);
    }

    /// BOF record body (BIFF8; 0x0005 = workbook globals, 0x0010 = worksheet)
    fn biff_bof(substream: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0600u16.to_le_bytes());
        data.extend_from_slice(&substream.to_le_bytes());
        data.extend_from_slice(&0x0DBBu16.to_le_bytes());
        data.extend_from_slice(&0x07CCu16.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x0006u32.to_le_bytes());
        data
    }

    /// BIFF8 workbook stream with a single worksheet
    fn biff_workbook(sheet_name: &str, rows: &[&[XlsCell]]) -> Vec<u8> {
        let mut strings: Vec<&str> = Vec::new();
        let mut cells = Vec::new();
        let mut max_cols = 0;
        for (r, row) in rows.iter().enumerate() {
            max_cols = max_cols.max(row.len());
            for (c, cell) in row.iter().enumerate() {
                let mut data = Vec::new();
                data.extend_from_slice(&(r as u16).to_le_bytes());
                data.extend_from_slice(&(c as u16).to_le_bytes());
                data.extend_from_slice(&0u16.to_le_bytes());
                match cell {
                    XlsCell::Text(text) => {
                        data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
                        strings.push(*text);
                        biff_record(&mut cells, 0x00FD, &data); // LabelSst
                    }
                    XlsCell::Number(value) => {
                        data.extend_from_slice(&value.to_le_bytes());
                        biff_record(&mut cells, 0x0203, &data); // Number
                    }
                    XlsCell::Empty => {}
                }
            }
        }

        let mut stream = Vec::new();
        biff_record(&mut stream, 0x0809, &biff_bof(0x0005));
        biff_record(&mut stream, 0x0042, &1200u16.to_le_bytes()); // CodePage: UTF-16

        // BoundSheet8; the substream offset is patched below
        let offset_at = stream.len() + 4;
        let mut bound_sheet = vec![0u8; 6];
        bound_sheet.push(sheet_name.len() as u8);
        bound_sheet.push(0);
        bound_sheet.extend_from_slice(sheet_name.as_bytes());
        biff_record(&mut stream, 0x0085, &bound_sheet);

        let mut sst = Vec::new();
        sst.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        sst.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        for text in &strings {
            let units: Vec<u16> = text.encode_utf16().collect();
            sst.extend_from_slice(&(units.len() as u16).to_le_bytes());
            sst.push(0x01);
            for unit in units {
                sst.extend_from_slice(&unit.to_le_bytes());
            }
        }
        biff_record(&mut stream, 0x00FC, &sst);
        biff_record(&mut stream, 0x000A, &[]);

        let sheet_offset = stream.len() as u32;
        stream[offset_at..offset_at + 4].copy_from_slice(&sheet_offset.to_le_bytes());

        biff_record(&mut stream, 0x0809, &biff_bof(0x0010));
        let mut dimensions = Vec::new();
        dimensions.extend_from_slice(&0u32.to_le_bytes());
        dimensions.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        dimensions.extend_from_slice(&0u16.to_le_bytes());
        dimensions.extend_from_slice(&(max_cols as u16).to_le_bytes());
        dimensions.extend_from_slice(&0u16.to_le_bytes());
        biff_record(&mut stream, 0x0200, &dimensions);
        stream.extend_from_slice(&cells);
        biff_record(&mut stream, 0x000A, &[]);

        // Streams under 4096 bytes would live in the mini stream
        if stream.len() < 4096 {
            stream.resize(4096, 0);
        }
        stream
    }

    fn put_u16(buf: &mut [u8], at: usize, value: u16) {
        buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    fn put_u32(buf: &mut [u8], at: usize, value: u32) {
        buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Compound File (version 3, 512-byte sectors) holding one "Workbook" stream
    ///
    /// Layout: header, FAT in sector 0, directory in sector 1, stream from sector 2.
    fn compound_file(stream: &[u8]) -> Vec<u8> {
        const SECTOR: usize = 512;
        const FREESECT: u32 = 0xFFFF_FFFF;
        const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
        const FATSECT: u32 = 0xFFFF_FFFD;
        const NOSTREAM: u32 = 0xFFFF_FFFF;

        let stream_sectors = stream.len().div_ceil(SECTOR);
        assert!(stream_sectors + 2 <= SECTOR / 4, "fixture needs a single FAT sector");

        let mut header = vec![0u8; SECTOR];
        header[..8].copy_from_slice(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
        put_u16(&mut header, 24, 0x003E);
        put_u16(&mut header, 26, 0x0003);
        put_u16(&mut header, 28, 0xFFFE);
        put_u16(&mut header, 30, 0x0009);
        put_u16(&mut header, 32, 0x0006);
        put_u32(&mut header, 44, 1); // FAT sectors
        put_u32(&mut header, 48, 1); // first directory sector
        put_u32(&mut header, 56, 4096); // mini stream cutoff
        put_u32(&mut header, 60, ENDOFCHAIN); // no mini FAT
        put_u32(&mut header, 68, ENDOFCHAIN); // no DIFAT sectors
        put_u32(&mut header, 76, 0); // FAT lives in sector 0
        for i in 1..109 {
            put_u32(&mut header, 76 + i * 4, FREESECT);
        }

        let mut fat = vec![FREESECT; SECTOR / 4];
        fat[0] = FATSECT;
        fat[1] = ENDOFCHAIN;
        for i in 0..stream_sectors {
            fat[2 + i] = if i + 1 == stream_sectors {
                ENDOFCHAIN
            } else {
                (3 + i) as u32
            };
        }

        let mut directory = vec![0u8; SECTOR];
        let entries: [(&str, u8, u32, u32, usize); 2] = [
            ("Root Entry", 5, 1, ENDOFCHAIN, 0),
            ("Workbook", 2, NOSTREAM, 2, stream.len()),
        ];
        for (index, entry) in directory.chunks_mut(128).enumerate() {
            put_u32(entry, 68, NOSTREAM);
            put_u32(entry, 72, NOSTREAM);
            put_u32(entry, 76, NOSTREAM);
            let Some((name, kind, child, start, size)) = entries.get(index) else {
                continue;
            };
            let units: Vec<u16> = name.encode_utf16().collect();
            for (i, unit) in units.iter().enumerate() {
                put_u16(entry, i * 2, *unit);
            }
            put_u16(entry, 64, ((units.len() + 1) * 2) as u16);
            entry[66] = *kind;
            entry[67] = 1;
            put_u32(entry, 76, *child);
            put_u32(entry, 116, *start);
            put_u32(entry, 120, *size as u32);
        }

        let mut data = header;
        for entry in fat {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        data.extend_from_slice(&directory);
        data.extend_from_slice(stream);
        data.resize(SECTOR * (3 + stream_sectors), 0);
        data
    }

    /// Legacy Excel 97-2003 workbook with one sheet
    pub fn generate_xls(sheet_name: &str, rows: &[&[XlsCell]]) -> Vec<u8> {
        compound_file(&biff_workbook(sheet_name, rows))
    }
}

fn xlsx(name: &str, data: Vec<u8>) -> InputFile {
    InputFile::new(name, XLSX_MIME, data)
}

fn csv(name: &str, body: &str) -> InputFile {
    InputFile::new(name, "text/csv", body.as_bytes().to_vec())
}

fn messages(events: &[ProcessEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| e.message().map(str::to_string))
        .collect()
}

#[test]
fn test_xlsx_mixed_question_types() {
    let data = fixtures::generate_mixed_questions().unwrap();
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[xlsx("mixed.xlsx", data)]);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.total_rows, 3);
    let kinds: Vec<QuestionKind> = result.questions.iter().map(|q| q.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::Multichoice,
            QuestionKind::TrueFalse,
            QuestionKind::ShortAnswer
        ]
    );

    let mc = &result.questions[0];
    let texts: Vec<&str> = mc.answers().iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, vec!["2", "4", "5"]);
    let correct: Vec<bool> = mc.answers().iter().map(|a| a.fraction.is_correct()).collect();
    assert_eq!(correct, vec![true, false, true]);

    let tf = &result.questions[1];
    assert!(tf.answers()[0].fraction.is_correct());

    let sa = &result.questions[2];
    assert_eq!(sa.usecase(), Some(1));
    let accepted: Vec<&str> = sa.answers().iter().map(|a| a.text.as_str()).collect();
    assert_eq!(accepted, vec!["Paris", "paris"]);

    assert!(result.xml.contains("<question type=\"shortanswer\">"));
    assert!(result.xml.contains("<usecase>1</usecase>"));
    assert!(result
        .xml
        .contains("<questiontext format=\"html\">\n      <text><![CDATA[<p>Sky blue?</p>]]></text>"));
}

#[test]
fn test_xlsx_all_sheets_in_workbook_order() {
    let data = fixtures::generate_two_sheets().unwrap();
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[xlsx("weeks.xlsx", data)]);

    let names: Vec<&str> = result.questions.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["W1", "W2"]);
    assert_eq!(result.total_rows, 2);
}

#[test]
fn test_xlsx_sheet_selector() {
    let data = fixtures::generate_two_sheets().unwrap();
    let processor = ProcessorBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Week2".to_string()))
        .build()
        .unwrap();
    let result = processor.process(&[xlsx("weeks.xlsx", data.clone())]);
    let names: Vec<&str> = result.questions.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["W2"]);

    let processor = ProcessorBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Week9".to_string()))
        .build()
        .unwrap();
    let result = processor.process(&[xlsx("weeks.xlsx", data)]);
    assert!(result.questions.is_empty());
    assert!(matches!(
        result.errors[0].kind,
        FileErrorKind::ProcessingFailed {
            format: SourceFormat::Xlsx,
            ..
        }
    ));
}

#[test]
fn test_xlsx_date_cells_use_date_format() {
    let data = fixtures::generate_date_title().unwrap();
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[xlsx("dates.xlsx", data)]);
    assert_eq!(result.questions[0].name(), "2025-01-02");
}

#[test]
fn test_xlsx_number_formats_shape_answer_text() {
    let data = fixtures::generate_formatted_numbers().unwrap();
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[xlsx("rates.xlsx", data)]);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let mc = &result.questions[0];
    assert_eq!(mc.name(), "Rates");
    let texts: Vec<&str> = mc.answers().iter().map(|a| a.text.as_str()).collect();
    assert_eq!(texts, vec!["50%", "2.50", "1,234,567", "12.5%"]);
    let correct: Vec<bool> = mc.answers().iter().map(|a| a.fraction.is_correct()).collect();
    assert_eq!(correct, vec![false, true, false, false]);
    assert!(result.xml.contains("<answer fraction=\"100\">\n      <text>2.50</text>"));
}

#[test]
fn test_ods_questions() {
    let data = fixtures::generate_ods(&[
        &["Type", "Title", "Question", "OptionA", "OptionB", "Correct"],
        &["multichoice", "OdsQ", "<p>2+2?</p>", "3", "4", "B"],
        &["truefalse", "OdsTF", "<p>Sky blue?</p>", "", "", "true"],
    ]);
    let processor = ProcessorBuilder::new().build().unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&[InputFile::new("quiz.ods", ODS_MIME, data)], &mut events);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let names: Vec<&str> = result.questions.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["OdsQ", "OdsTF"]);
    assert_eq!(result.questions[0].kind(), QuestionKind::Multichoice);
    assert_eq!(result.questions[0].questiontext(), "<p>2+2?</p>");
    let texts: Vec<&str> = result.questions[0]
        .answers()
        .iter()
        .map(|a| a.text.as_str())
        .collect();
    assert_eq!(texts, vec!["3", "4"]);
    assert!(result.questions[0].answers()[1].fraction.is_correct());
    assert_eq!(result.questions[1].kind(), QuestionKind::TrueFalse);
    assert!(messages(&events).contains(&"Processing ODS file: quiz.ods...".to_string()));
}

#[test]
fn test_xls_questions() {
    use fixtures::XlsCell::{Empty, Number, Text};

    let data = fixtures::generate_xls(
        "Questions",
        &[
            &[Text("Type"), Text("Title"), Text("Question"), Text("OptionA"), Text("OptionB"), Text("Correct")],
            &[Text("multichoice"), Text("XlsQ"), Text("<p>2+2?</p>"), Number(3.0), Number(4.0), Text("B")],
            &[Text("shortanswer"), Text("XlsSA"), Text("<p>Capital of Japan?</p>"), Empty, Empty, Empty],
        ],
    );
    let processor = ProcessorBuilder::new().build().unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&[InputFile::new("quiz.xls", XLS_MIME, data)], &mut events);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let names: Vec<&str> = result.questions.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["XlsQ", "XlsSA"]);
    let texts: Vec<&str> = result.questions[0]
        .answers()
        .iter()
        .map(|a| a.text.as_str())
        .collect();
    assert_eq!(texts, vec!["3", "4"]);
    assert_eq!(result.questions[1].kind(), QuestionKind::ShortAnswer);
    assert!(messages(&events).contains(&"Processing XLS file: quiz.xls...".to_string()));
}

#[test]
fn test_semicolon_csv() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[csv("semi.csv", "Type;Title;Correct\ntruefalse;T1;true\n")]);

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.questions.len(), 1);
    assert_eq!(result.questions[0].kind(), QuestionKind::TrueFalse);
    assert_eq!(result.questions[0].name(), "T1");
    assert!(result.questions[0].answers()[0].fraction.is_correct());

    let tab = processor.process(&[csv("tab.csv", "Type\tTitle\nshortanswer\tTabbed\n")]);
    assert_eq!(tab.questions[0].name(), "Tabbed");

    let excel = processor.process(&[csv("excel.csv", "sep=;\nTitle;Type\nWithSep;truefalse\n")]);
    assert_eq!(excel.questions[0].name(), "WithSep");
    assert_eq!(excel.questions[0].kind(), QuestionKind::TrueFalse);
}

#[test]
fn test_multi_file_batch_keeps_file_order() {
    let data = fixtures::generate_two_sheets().unwrap();
    let files = vec![
        csv("first.csv", "Type,Title\ntruefalse,C1\n"),
        xlsx("second.xlsx", data),
        csv("third.csv", "Type,Title\nshortanswer,C3\n"),
    ];
    let processor = ProcessorBuilder::new().build().unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&files, &mut events);

    let names: Vec<&str> = result.questions.iter().map(|q| q.name()).collect();
    assert_eq!(names, vec!["C1", "W1", "W2", "C3"]);

    let messages = messages(&events);
    assert_eq!(messages[0], "Loading (1/3): first.csv");
    assert_eq!(messages[1], "Processing CSV file: first.csv...");
    assert_eq!(messages[2], "Loading (2/3): second.xlsx");
    assert_eq!(messages[3], "Processing XLSX file: second.xlsx...");
    assert_eq!(messages.last().unwrap(), "Generated 4 questions");

    match events.last() {
        Some(ProcessEvent::Done { xml, questions }) => {
            assert_eq!(questions.len(), 4);
            assert_eq!(xml, &result.xml);
        }
        other => panic!("Expected Done event, got {:?}", other),
    }
}

#[test]
fn test_unsupported_and_corrupt_files_do_not_abort_batch() {
    let files = vec![
        InputFile::new("notes.pdf", "application/pdf", b"%PDF-1.4".to_vec()),
        xlsx("broken.xlsx", b"PK\x03\x04INVALID_CONTENT".to_vec()),
        csv("ok.csv", "Type,Title\ntruefalse,T1\n"),
    ];
    let processor = ProcessorBuilder::new().build().unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&files, &mut events);

    assert_eq!(result.questions.len(), 1);
    assert_eq!(result.errors.len(), 2);
    let messages = messages(&events);
    assert!(messages.contains(
        &"Unsupported file type: application/pdf. Supported file types: Excel (.xlsx, .xls), .ods, or .csv."
            .to_string()
    ));
    assert!(messages.contains(
        &"Error processing broken.xlsx (XLSX). Open the console for more information.".to_string()
    ));
    assert_eq!(messages.last().unwrap(), "Generated 1 questions");
}

#[test]
fn test_mime_fallback_to_extension() {
    let file = InputFile::new(
        "quiz.CSV",
        "application/octet-stream",
        b"Type,Title\ntruefalse,T1\n".to_vec(),
    );
    let processor = ProcessorBuilder::new().build().unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&[file], &mut events);
    assert_eq!(result.questions.len(), 1);
    assert!(messages(&events).contains(&"Processing CSV file: quiz.CSV...".to_string()));
}

#[test]
fn test_row_limit_halts_batch() {
    let files = vec![
        xlsx("a.xlsx", fixtures::generate_rows(3).unwrap()),
        xlsx("b.xlsx", fixtures::generate_rows(3).unwrap()),
        xlsx("c.xlsx", fixtures::generate_rows(3).unwrap()),
    ];
    let processor = ProcessorBuilder::new()
        .with_max_total_rows(5)
        .build()
        .unwrap();
    let mut events: Vec<ProcessEvent> = Vec::new();
    let result = processor.process_files(&files, &mut events);

    assert!(result.halted());
    assert_eq!(result.total_rows, 6);
    assert_eq!(result.questions.len(), 6);
    let messages = messages(&events);
    assert!(messages.contains(&"Row limit exceeded (5).".to_string()));
    assert!(!messages.iter().any(|m| m.contains("c.xlsx")));
}

#[test]
fn test_row_limit_not_exceeded_at_exact_limit() {
    let files = vec![xlsx("a.xlsx", fixtures::generate_rows(5).unwrap())];
    let processor = ProcessorBuilder::new()
        .with_max_total_rows(5)
        .build()
        .unwrap();
    let result = processor.process(&files);
    assert!(!result.halted());
    assert_eq!(result.questions.len(), 5);
}

#[test]
fn test_processing_is_idempotent() {
    let files = vec![
        xlsx("mixed.xlsx", fixtures::generate_mixed_questions().unwrap()),
        csv("extra.csv", "Type,Title,Correct\ntruefalse,T,false\n"),
    ];
    let processor = ProcessorBuilder::new().build().unwrap();
    let first = processor.process(&files);
    let second = processor.process(&files);
    assert_eq!(first, second);
}

#[test]
fn test_input_file_from_path() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(b"Type,Title\ntruefalse,FromDisk\n").unwrap();

    let input = InputFile::from_path(file.path()).unwrap();
    assert!(input.mime.is_empty());
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(&[input]);
    assert_eq!(result.questions[0].name(), "FromDisk");
}
