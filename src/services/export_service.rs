use crate::error::Result;
use crate::models::stats::Statistics;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::*;
use std::path::Path;
use tracing::{info, instrument};

pub const YEARS_SHEET: &str = "Статистика по годам";
pub const AREAS_SHEET: &str = "Статистика по городам";

/// A cell value before it is written; the text form drives column widths.
enum Cell {
    Number(f64, String),
    Text(String),
    Blank,
}

impl Cell {
    fn number<T: ToString + ToPrimitive>(value: T) -> Self {
        Cell::Number(value.to_f64().unwrap_or_default(), value.to_string())
    }

    fn width(&self) -> usize {
        match self {
            Cell::Number(_, text) | Cell::Text(text) => text.chars().count(),
            Cell::Blank => 0,
        }
    }
}

pub struct ExportService;

impl ExportService {
    /// Two-sheet statistics workbook: year series and area views.
    pub fn generate_statistics_xlsx(stats: &Statistics) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
        let cell_format = Format::new().set_border(FormatBorder::Thin);
        let percent_format = cell_format.clone().set_num_format("0.00%");

        let name = &stats.profession;
        let years_headers = [
            "Год".to_string(),
            "Средняя зарплата".to_string(),
            format!("Средняя зарплата - {}", name),
            "Количество вакансий".to_string(),
            format!("Количество вакансий - {}", name),
        ];
        let yearly = &stats.yearly;
        let years_rows: Vec<Vec<Cell>> = yearly
            .years()
            .map(|year| {
                let optional = |value: Option<Cell>| value.unwrap_or(Cell::Blank);
                vec![
                    Cell::Text(year.to_string()),
                    optional(yearly.salary.get(&year).map(|v| Cell::number(*v))),
                    optional(yearly.profession_salary.get(&year).map(|v| Cell::number(*v))),
                    optional(yearly.count.get(&year).map(|v| Cell::number(*v as u64))),
                    optional(yearly.profession_count.get(&year).map(|v| Cell::number(*v as u64))),
                ]
            })
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(YEARS_SHEET)?;
        write_sheet(sheet, &years_headers, &years_rows, &header_format, |_| &cell_format)?;

        let areas_headers = [
            "Город".to_string(),
            "Уровень зарплат".to_string(),
            String::new(),
            "Город".to_string(),
            "Доля вакансий".to_string(),
        ];
        let areas = &stats.areas;
        let rows = areas.salary.len().max(areas.share.len());
        let areas_rows: Vec<Vec<Cell>> = (0..rows)
            .map(|i| {
                let (salary_area, salary) = match areas.salary.get(i) {
                    Some((area, salary)) => (Cell::Text(area.clone()), Cell::number(*salary)),
                    None => (Cell::Blank, Cell::Blank),
                };
                let (share_area, share) = match areas.share.get(i) {
                    Some((area, share)) => (Cell::Text(area.clone()), percent(*share)),
                    None => (Cell::Blank, Cell::Blank),
                };
                vec![salary_area, salary, Cell::Blank, share_area, share]
            })
            .collect();

        let sheet = workbook.add_worksheet();
        sheet.set_name(AREAS_SHEET)?;
        write_sheet(sheet, &areas_headers, &areas_rows, &header_format, |col| {
            if col == 4 {
                &percent_format
            } else {
                &cell_format
            }
        })?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    #[instrument(skip(stats), fields(profession = %stats.profession))]
    pub fn save_statistics_xlsx(stats: &Statistics, path: &Path) -> Result<()> {
        let buffer = Self::generate_statistics_xlsx(stats)?;
        std::fs::write(path, buffer)?;
        info!(path = %path.display(), "Workbook written");
        Ok(())
    }
}

/// Shares are stored as fractions and shown as percentages; the width uses the shown form.
fn percent(share: Decimal) -> Cell {
    let shown = format!("{:.2}%", share * Decimal::ONE_HUNDRED);
    Cell::Number(share.to_f64().unwrap_or_default(), shown)
}

fn write_sheet<'a>(
    sheet: &mut Worksheet,
    headers: &[String],
    rows: &[Vec<Cell>],
    header_format: &Format,
    format_for: impl Fn(u16) -> &'a Format,
) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        if header.is_empty() {
            continue;
        }
        sheet.write_string_with_format(0, col, header, header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_index = i as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(value, _) => {
                    sheet.write_number_with_format(row_index, col, *value, format_for(col))?;
                }
                Cell::Text(text) => {
                    sheet.write_string_with_format(row_index, col, text, format_for(col))?;
                }
                Cell::Blank => {}
            }
        }
    }

    for (col, header) in headers.iter().enumerate() {
        let longest = rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(Cell::width)
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        sheet.set_column_width(col as u16, (longest + 2) as f64)?;
    }
    Ok(())
}
