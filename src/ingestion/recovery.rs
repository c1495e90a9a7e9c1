//! Low-level xlsx recovery reader.
//!
//! Used when calamine cannot parse a workbook. Opens the package as a zip archive and walks
//! `xl/workbook.xml`, its relationships, the shared strings table and each worksheet's XML
//! cell by cell. Styles, formulas and anything else not needed for values are ignored.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{CleanerError, CleanerResult};
use crate::types::{NamedSheet, Value};

use super::grid::dataset_from_grid;
use super::unified::{resolve_sheet_selection, SheetSelection};

// Excel worksheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read the selected sheets of an `.xlsx`/`.xlsm` package without calamine.
pub fn read_xlsx_package(
    path: impl AsRef<Path>,
    selection: &SheetSelection,
) -> CleanerResult<Vec<NamedSheet>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml") {
        Ok(xml) => parse_shared_strings(&xml)?,
        Err(ZipError::FileNotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?;
    let rels_xml = read_part(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let worksheets = resolve_worksheets(&workbook_xml, &rels_xml)?;

    let available: Vec<String> = worksheets.iter().map(|(name, _)| name.clone()).collect();
    let names = resolve_sheet_selection(selection, &available)?;

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let Some((_, part)) = worksheets.iter().find(|(n, _)| *n == name) else {
            continue;
        };
        let xml = read_part(&mut archive, part)?;
        let grid = parse_sheet_cells(&xml, &shared_strings)?;
        let data = dataset_from_grid(&name, grid)?;
        tracing::debug!(sheet = %name, rows = data.row_count(), "recovered sheet from package xml");
        sheets.push(NamedSheet { name, data });
    }
    Ok(sheets)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, ZipError> {
    let mut file = archive.by_name(name)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(String::from_utf8_lossy(&content).into_owned())
}

/// `(sheet name, part path)` pairs in workbook order.
fn resolve_worksheets(workbook_xml: &str, rels_xml: &str) -> CleanerResult<Vec<(String, String)>> {
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.name().as_ref() == b"sheet" => {
                let name = attr(e, b"name");
                let rid = attr(e, b"r:id");
                if let (Some(name), Some(rid)) = (name, rid) {
                    sheets.push((name, rid));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut targets: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(e, b"Id"), attr(e, b"Target")) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets
        .into_iter()
        .filter_map(|(name, rid)| {
            let target = targets.get(&rid)?;
            let part = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{target}"),
            };
            Some((name, part))
        })
        .collect())
}

/// Shared strings, indexed by position. Rich-text runs of one `<si>` are concatenated.
fn parse_shared_strings(xml: &str) -> CleanerResult<Vec<String>> {
    let mut strings = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut in_si = false;
    let mut in_t = false;
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Text(ref e) if in_t => current.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(ref e) if in_t => current.extend(entity_char(e)),
            Event::End(ref e) => match e.name().as_ref() {
                b"t" => in_t = false,
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                _ => {}
            },
            Event::Empty(ref e) if e.name().as_ref() == b"si" => strings.push(String::new()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

#[derive(Default)]
struct CellState {
    col: Option<usize>,
    kind: Option<String>,
    value: String,
    inline: String,
    in_value: bool,
    in_inline: bool,
}

/// Row-major value grid of one worksheet.
fn parse_sheet_cells(xml: &str, shared_strings: &[String]) -> CleanerResult<Vec<Vec<Value>>> {
    let mut cells: BTreeMap<usize, BTreeMap<usize, Value>> = BTreeMap::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut row_idx: usize = 0;
    let mut next_row: usize = 0;
    let mut next_col: usize = 0;
    let mut cell: Option<CellState> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"row" => {
                row_idx = attr(e, b"r")
                    .and_then(|r| r.parse::<usize>().ok())
                    .map(|r| r.saturating_sub(1))
                    .unwrap_or(next_row);
                if row_idx >= MAX_ROWS {
                    return Err(out_of_bounds("row", row_idx + 1, MAX_ROWS));
                }
                next_row = row_idx + 1;
                next_col = 0;
            }
            Event::Start(ref e) if e.name().as_ref() == b"c" => {
                cell = Some(start_cell(e, &mut next_col)?);
            }
            Event::Empty(ref e) if e.name().as_ref() == b"c" => {
                start_cell(e, &mut next_col)?;
            }
            Event::Start(ref e) => {
                if let Some(c) = cell.as_mut() {
                    match e.name().as_ref() {
                        b"v" => c.in_value = true,
                        b"t" => c.in_inline = true,
                        _ => {}
                    }
                }
            }
            Event::Text(ref e) => {
                if let Some(c) = cell.as_mut() {
                    let text = String::from_utf8_lossy(e.as_ref());
                    if c.in_value {
                        c.value.push_str(&text);
                    } else if c.in_inline {
                        c.inline.push_str(&text);
                    }
                }
            }
            Event::GeneralRef(ref e) => {
                if let Some(c) = cell.as_mut() {
                    if c.in_value {
                        c.value.extend(entity_char(e));
                    } else if c.in_inline {
                        c.inline.extend(entity_char(e));
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"v" => {
                    if let Some(c) = cell.as_mut() {
                        c.in_value = false;
                    }
                }
                b"t" => {
                    if let Some(c) = cell.as_mut() {
                        c.in_inline = false;
                    }
                }
                b"c" => {
                    if let Some(c) = cell.take() {
                        let value = resolve_cell_value(&c, shared_strings);
                        if let (Some(col), false) = (c.col, value.is_null()) {
                            cells.entry(row_idx).or_default().insert(col, value);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let height = cells.keys().next_back().map(|r| r + 1).unwrap_or(0);
    let mut grid = vec![Vec::new(); height];
    for (r, row) in cells {
        let width = row.keys().next_back().map(|c| c + 1).unwrap_or(0);
        let mut out = vec![Value::Null; width];
        for (c, v) in row {
            out[c] = v;
        }
        grid[r] = out;
    }
    Ok(grid)
}

fn start_cell(e: &BytesStart<'_>, next_col: &mut usize) -> CleanerResult<CellState> {
    let col = attr(e, b"r")
        .and_then(|r| parse_cell_ref(&r))
        .map(|(_, col)| col)
        .unwrap_or(*next_col);
    if col >= MAX_COLS {
        return Err(out_of_bounds("column", col + 1, MAX_COLS));
    }
    *next_col = col + 1;
    Ok(CellState {
        col: Some(col),
        kind: attr(e, b"t"),
        ..CellState::default()
    })
}

fn out_of_bounds(what: &str, position: usize, limit: usize) -> CleanerError {
    CleanerError::SchemaMismatch {
        message: format!("worksheet {what} {position} is past the {what} limit of {limit}"),
    }
}

fn resolve_cell_value(cell: &CellState, shared_strings: &[String]) -> Value {
    let raw = cell.value.as_str();
    match cell.kind.as_deref() {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .map(|s| Value::Utf8(s.clone()))
            .unwrap_or(Value::Null),
        Some("inlineStr") => {
            if cell.inline.is_empty() {
                Value::Null
            } else {
                Value::Utf8(cell.inline.clone())
            }
        }
        Some("b") => match raw.trim() {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            _ => Value::Null,
        },
        Some("e") => Value::Null,
        Some("n") | None => match raw.trim() {
            "" => Value::Null,
            t => t
                .parse::<f64>()
                .map(Value::Float64)
                .unwrap_or_else(|_| Value::Utf8(t.to_string())),
        },
        Some(_) => {
            if raw.is_empty() {
                Value::Null
            } else {
                Value::Utf8(raw.to_string())
            }
        }
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.decode_and_unescape_value(e.decoder()).ok().map(|v| v.into_owned()))
}

/// Character for an entity reference name (`amp`, `#38`, `#x26`, ...).
fn entity_char(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|d| d.parse::<u32>().ok())
            .and_then(char::from_u32),
        _ => None,
    }
}

/// Parse a cell reference like `"B7"` or `"AA1"` to 0-indexed `(row, col)`.
fn parse_cell_ref(cell_ref: &str) -> Option<(usize, usize)> {
    let letters: String = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let digits = &cell_ref[letters.len()..];
    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let mut col: usize = 0;
    for ch in letters.chars() {
        let digit = ch.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    Some((row, col - 1))
}
