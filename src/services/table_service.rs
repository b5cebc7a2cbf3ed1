use crate::dto::table_query::{Column, Filter, RowRange, SortField, TableQuery};
use crate::models::vacancy::Vacancy;
use crate::utils::console_table::ConsoleTable;

pub const MSG_NOTHING_FOUND: &str = "Ничего не найдено";

pub struct TableService;

impl TableService {
    pub fn filter(vacancies: Vec<Vacancy>, filter: Option<&Filter>) -> Vec<Vacancy> {
        match filter {
            Some(filter) => vacancies.into_iter().filter(|v| filter.matches(v)).collect(),
            None => vacancies,
        }
    }

    /// Stable sort by `field`; without a field, `reverse` flips the whole sequence.
    pub fn sort(vacancies: &mut [Vacancy], field: Option<SortField>, reverse: bool) {
        match field {
            Some(field) if reverse => vacancies.sort_by(|a, b| field.compare(b, a)),
            Some(field) => vacancies.sort_by(|a, b| field.compare(a, b)),
            None if reverse => vacancies.reverse(),
            None => {}
        }
    }

    /// Keeps the rows inside `range` and numbers them from 1 in their new order.
    pub fn select_range(vacancies: Vec<Vacancy>, range: RowRange) -> Vec<Vacancy> {
        vacancies
            .into_iter()
            .enumerate()
            .filter(|(i, _)| range.contains(*i))
            .map(|(_, v)| v)
            .enumerate()
            .map(|(position, mut v)| {
                v.index = position + 1;
                v
            })
            .collect()
    }

    pub fn apply(vacancies: Vec<Vacancy>, query: &TableQuery) -> Vec<Vacancy> {
        let mut rows = Self::filter(vacancies, query.filter.as_ref());
        Self::sort(&mut rows, query.sort, query.reverse);
        Self::select_range(rows, query.range)
    }

    pub fn render(vacancies: &[Vacancy], columns: &[Column]) -> String {
        if vacancies.is_empty() {
            return MSG_NOTHING_FOUND.to_string();
        }
        let mut table = ConsoleTable::new(columns.iter().map(|c| c.header().to_string()).collect());
        for vacancy in vacancies {
            table.add_row(columns.iter().map(|c| c.cell(vacancy)).collect());
        }
        table.render()
    }
}
