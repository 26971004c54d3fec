//! XLSX Styles Module
//!
//! calamineはセルの表示形式を公開しないため、XLSX内部のXMLを直接読み、
//! セル座標ごとの表示形式（Number Format String）を取り出します。

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::QuizSheetError;
use crate::format::NumberFormat;

/// カスタム表示形式IDの開始値
const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// XLSXのセル表示形式
///
/// `General`以外の表示形式を持つセルだけを保持します。
#[derive(Debug, Default)]
pub(crate) struct XlsxStyles {
    /// cellXfsのインデックス -> 表示形式（`General`はNone）
    cell_formats: Vec<Option<NumberFormat>>,
    /// シート名 -> (行, 列) -> cellXfsのインデックス
    sheets: HashMap<String, HashMap<(u32, u32), usize>>,
}

impl XlsxStyles {
    /// XLSXアーカイブから表示形式を読み込む
    ///
    /// `xl/styles.xml`や`xl/workbook.xml`がない場合（ODSなど）は空の結果になります。
    pub fn load(data: &[u8]) -> Result<Self, QuizSheetError> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| QuizSheetError::Zip(e.to_string()))?;

        let Some(styles_xml) = read_entry(&mut archive, "xl/styles.xml")? else {
            return Ok(Self::default());
        };
        let (custom_formats, xf_format_ids) = parse_styles(&styles_xml)?;

        let cell_formats: Vec<Option<NumberFormat>> = xf_format_ids
            .iter()
            .map(|id| {
                let code = custom_formats
                    .get(id)
                    .map(String::as_str)
                    .or_else(|| builtin_format(*id))?;
                let format = NumberFormat::parse(code);
                (!format.is_general()).then_some(format)
            })
            .collect();
        if cell_formats.iter().all(Option::is_none) {
            return Ok(Self::default());
        }

        let mut sheets = HashMap::new();
        for (name, path) in sheet_paths(&mut archive)? {
            let Some(sheet_xml) = read_entry(&mut archive, &path)? else {
                continue;
            };
            let styled = parse_cell_styles(&sheet_xml, &cell_formats)?;
            if !styled.is_empty() {
                sheets.insert(name, styled);
            }
        }

        Ok(Self {
            cell_formats,
            sheets,
        })
    }

    /// セルの表示形式（0始まりの絶対座標）
    pub fn number_format(&self, sheet_name: &str, row: u32, col: u32) -> Option<&NumberFormat> {
        let xf = *self.sheets.get(sheet_name)?.get(&(row, col))?;
        self.cell_formats.get(xf)?.as_ref()
    }
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, QuizSheetError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(QuizSheetError::Zip(e.to_string())),
    };
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// 要素の属性を(ローカル名, 値)の組で取り出す
fn attributes(element: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>, QuizSheetError> {
    element
        .attributes()
        .map(|attr| -> Result<(Vec<u8>, String), QuizSheetError> {
            let attr = attr.map_err(quick_xml::Error::from)?;
            // `unescape_value` is unavailable when quick-xml's `encoding` feature is
            // enabled (calamine enables it), so decode as UTF-8 and unescape directly.
            let value = (|| -> quick_xml::Result<String> {
                let decoded = std::str::from_utf8(&attr.value)?;
                Ok(quick_xml::escape::unescape(decoded)?.into_owned())
            })()?;
            Ok((attr.key.local_name().as_ref().to_vec(), value))
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [(Vec<u8>, String)], key: &[u8]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_slice() == key)
        .map(|(_, v)| v.as_str())
}

/// `xl/styles.xml`から`<numFmts>`と`<cellXfs>`を読む
///
/// # 戻り値
///
/// (numFmtId -> formatCode, cellXfsの各xfのnumFmtId)
fn parse_styles(xml: &[u8]) -> Result<(HashMap<u32, String>, Vec<u32>), QuizSheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_formats = HashMap::new();
    let mut xf_format_ids = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    // <numFmt numFmtId="164" formatCode="0.0%"/>
                    let attrs = attributes(&e)?;
                    let id = attribute(&attrs, b"numFmtId").and_then(|v| v.parse().ok());
                    if let (Some(id), Some(code)) = (id, attribute(&attrs, b"formatCode")) {
                        custom_formats.insert(id, code.to_string());
                    }
                }
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let attrs = attributes(&e)?;
                    let id = attribute(&attrs, b"numFmtId")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(0);
                    xf_format_ids.push(id);
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((custom_formats, xf_format_ids))
}

/// シート名とワークシートXMLのパスの対応（ワークブック順）
fn sheet_paths<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<(String, String)>, QuizSheetError> {
    let Some(workbook_xml) = read_entry(archive, "xl/workbook.xml")? else {
        return Ok(Vec::new());
    };
    let Some(rels_xml) = read_entry(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(Vec::new());
    };

    // Relationship Id -> Target
    let mut targets = HashMap::new();
    let mut reader = Reader::from_reader(rels_xml.as_slice());
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let attrs = attributes(&e)?;
                if let (Some(id), Some(target)) =
                    (attribute(&attrs, b"Id"), attribute(&attrs, b"Target"))
                {
                    targets.insert(id.to_string(), resolve_target(target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
    buf.clear();
    let mut paths = Vec::new();
    let mut reader = Reader::from_reader(workbook_xml.as_slice());
    reader.trim_text(true);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let attrs = attributes(&e)?;
                let path = attribute(&attrs, b"id").and_then(|id| targets.get(id));
                if let (Some(name), Some(path)) = (attribute(&attrs, b"name"), path) {
                    paths.push((name.to_string(), path.clone()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paths)
}

/// リレーションシップのTargetをアーカイブ内のパスにする
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// ワークシートXMLから、表示形式を持つセルの座標とスタイルを集める
fn parse_cell_styles(
    xml: &[u8],
    cell_formats: &[Option<NumberFormat>],
) -> Result<HashMap<(u32, u32), usize>, QuizSheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut styled = HashMap::new();
    // r属性が省略された場合に備えて位置を数える
    let mut row: u32 = 0;
    let mut next_col: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    let attrs = attributes(&e)?;
                    row = attribute(&attrs, b"r")
                        .and_then(|r| r.parse::<u32>().ok())
                        .and_then(|r| r.checked_sub(1))
                        .unwrap_or(row);
                    next_col = 0;
                }
                b"c" => {
                    let attrs = attributes(&e)?;
                    let (r, c) = attribute(&attrs, b"r")
                        .and_then(parse_cell_ref)
                        .unwrap_or((row, next_col));
                    next_col = c + 1;

                    let xf = attribute(&attrs, b"s").and_then(|s| s.parse::<usize>().ok());
                    if let Some(xf) = xf {
                        if matches!(cell_formats.get(xf), Some(Some(_))) {
                            styled.insert((r, c), xf);
                        }
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"row" => row += 1,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(styled)
}

/// セル参照を0始まりの座標に変換する（例: "B3" -> (2, 1)）
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let value = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
    }
    let row = digits.parse::<u32>().ok()?.checked_sub(1)?;
    Some((row, col - 1))
}

/// 組み込み表示形式ID（0-163）の形式文字列
fn builtin_format(id: u32) -> Option<&'static str> {
    if id >= FIRST_CUSTOM_FORMAT_ID {
        return None;
    }
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "$#,##0_);($#,##0)",
        6 => "$#,##0_);[Red]($#,##0)",
        7 => "$#,##0.00_);($#,##0.00)",
        8 => "$#,##0.00_);[Red]($#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}
