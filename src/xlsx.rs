use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::reports::{CellValue, StatementReport};

const MONEY_FORMAT: &str = "#,##0.00;[Red]-#,##0.00";
const PCT_FORMAT: &str = "0.0%";
const LABEL_WIDTH: f64 = 42.0;
const VALUE_WIDTH: f64 = 14.0;
const HEADER_ROW: u32 = 2;

struct Formats {
    title: Format,
    header: Format,
    label: Format,
    label_bold: Format,
    money: Format,
    money_bold: Format,
    pct: Format,
    text_right: Format,
}

impl Formats {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_border_bottom(FormatBorder::Thin);
        Self {
            title: Format::new().set_bold().set_font_size(14),
            header,
            label: Format::new(),
            label_bold: Format::new().set_bold(),
            money: Format::new().set_num_format(MONEY_FORMAT),
            money_bold: Format::new().set_num_format(MONEY_FORMAT).set_bold(),
            pct: Format::new().set_num_format(PCT_FORMAT),
            text_right: Format::new().set_align(FormatAlign::Right),
        }
    }
}

/// Sheet names are capped at 31 characters and may not contain `[]:*?/\`.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    cleaned.chars().take(31).collect()
}

/// Write the period/measure header. Returns the first data row.
fn write_header(ws: &mut Worksheet, report: &StatementReport, f: &Formats) -> Result<u32> {
    let per_group = report.measures.len() as u16;
    let two_rows = report.has_sub_columns();
    let mut groups: Vec<String> = report.periods.clone();
    groups.push("Total".to_string());

    if two_rows {
        ws.merge_range(HEADER_ROW, 0, HEADER_ROW + 1, 0, "Conta", &f.header)?;
    } else {
        ws.write_string_with_format(HEADER_ROW, 0, "Conta", &f.header)?;
    }

    for (g, label) in groups.iter().enumerate() {
        let first = 1 + g as u16 * per_group;
        if per_group > 1 {
            ws.merge_range(HEADER_ROW, first, HEADER_ROW, first + per_group - 1, label, &f.header)?;
        } else {
            ws.write_string_with_format(HEADER_ROW, first, label, &f.header)?;
        }
        if two_rows {
            for (m, measure) in report.measures.iter().enumerate() {
                ws.write_string_with_format(HEADER_ROW + 1, first + m as u16, measure.header(), &f.header)?;
            }
        }
    }

    Ok(if two_rows { HEADER_ROW + 2 } else { HEADER_ROW + 1 })
}

/// Render a statement pivot as an `.xlsx` workbook. Every row of the report
/// is written, with the label indented by depth.
pub fn render_statement(report: &StatementReport, subtitle: &str) -> Result<Vec<u8>> {
    let f = Formats::new();
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(sheet_name(&report.title))?;

    ws.write_string_with_format(0, 0, format!("{} - {}", report.title, subtitle), &f.title)?;
    let mut row = write_header(ws, report, &f)?;

    ws.set_column_width(0, LABEL_WIDTH)?;
    for c in 0..report.columns.len() as u16 {
        ws.set_column_width(c + 1, VALUE_WIDTH)?;
    }
    ws.set_freeze_panes(row, 1)?;

    for r in &report.rows {
        let top = r.depth == 0;
        let label_fmt = if top { &f.label_bold } else { &f.label };
        ws.write_string_with_format(row, 0, r.indented_label(), label_fmt)?;
        for (i, cell) in r.cells.iter().enumerate() {
            let col = 1 + i as u16;
            match cell {
                CellValue::Amount(v) => {
                    let fmt = if top { &f.money_bold } else { &f.money };
                    ws.write_number_with_format(row, col, *v, fmt)?;
                }
                CellValue::Pct(p) => {
                    ws.write_number_with_format(row, col, *p / 100.0, &f.pct)?;
                }
                CellValue::ServerPct(s) => {
                    ws.write_string_with_format(row, col, s, &f.text_right)?;
                }
                CellValue::Empty => {}
            }
        }
        row += 1;
    }

    Ok(workbook.save_to_buffer()?)
}
