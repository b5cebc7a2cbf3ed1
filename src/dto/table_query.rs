use crate::error::{Error, Result};
use crate::models::vacancy::Vacancy;
use crate::utils::validation::validate_prompt;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

pub const MSG_BAD_FORMAT: &str = "Формат ввода некорректен";
pub const MSG_BAD_FILTER: &str = "Параметр поиска некорректен";
pub const MSG_BAD_SORT: &str = "Параметр сортировки некорректен";
pub const MSG_BAD_REVERSE: &str = "Порядок сортировки задан некорректно";
pub const MSG_BAD_RANGE: &str = "Диапазон вывода задан некорректно";

/// Answers to the table tool prompts, exactly as typed.
#[derive(Debug, Clone, Default, Validate)]
pub struct TablePrompt {
    #[validate(length(min = 1))]
    pub file_name: String,
    pub filter: String,
    pub sort: String,
    pub reverse: String,
    pub range: String,
    pub columns: String,
}

/// A single field/value predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Skills(Vec<String>),
    Currency(String),
    Name(String),
    Area(String),
    Company(String),
    Published(String),
    Experience(String),
    Premium(String),
    Salary(Decimal),
}

impl Filter {
    /// Parses `Label: value` input; an empty string means no filter.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        if input.is_empty() {
            return Ok(None);
        }
        let (label, value) = input
            .split_once(": ")
            .ok_or_else(|| Error::Input(MSG_BAD_FORMAT.to_string()))?;
        let value = value.to_string();

        let filter = match label {
            "Навыки" => Filter::Skills(value.split(", ").map(str::to_string).collect()),
            "Идентификатор валюты оклада" => Filter::Currency(value),
            "Название" => Filter::Name(value),
            "Название региона" => Filter::Area(value),
            "Компания" => Filter::Company(value),
            "Дата публикации вакансии" => Filter::Published(value),
            "Опыт работы" => Filter::Experience(value),
            "Премиум-вакансия" => Filter::Premium(value),
            "Оклад" => Filter::Salary(
                Decimal::from_str(value.trim())
                    .map_err(|_| Error::Input(MSG_BAD_FORMAT.to_string()))?,
            ),
            _ => return Err(Error::Input(MSG_BAD_FILTER.to_string())),
        };
        Ok(Some(filter))
    }

    pub fn matches(&self, vacancy: &Vacancy) -> bool {
        match self {
            Filter::Skills(wanted) => wanted.iter().all(|skill| vacancy.skills.contains(skill)),
            Filter::Currency(name) => vacancy.salary.currency.display_name() == name,
            Filter::Name(name) => &vacancy.name == name,
            Filter::Area(area) => &vacancy.area_name == area,
            Filter::Company(company) => &vacancy.employer_name == company,
            Filter::Published(date) => &vacancy.published_date == date,
            Filter::Experience(label) => vacancy.experience.label() == label,
            Filter::Premium(label) => vacancy.premium_label() == label,
            Filter::Salary(value) => vacancy.salary.contains(*value),
        }
    }
}

/// Fields the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Description,
    Skills,
    Experience,
    Premium,
    Company,
    Salary,
    Area,
    Published,
}

impl SortField {
    /// Parses a column label; an empty string means no sort field.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let field = match input {
            "" => return Ok(None),
            "Название" => SortField::Name,
            "Описание" => SortField::Description,
            "Навыки" => SortField::Skills,
            "Опыт работы" => SortField::Experience,
            "Премиум-вакансия" => SortField::Premium,
            "Компания" => SortField::Company,
            "Оклад" => SortField::Salary,
            "Название региона" => SortField::Area,
            "Дата публикации вакансии" => SortField::Published,
            _ => return Err(Error::Input(MSG_BAD_SORT.to_string())),
        };
        Ok(Some(field))
    }

    pub fn compare(&self, a: &Vacancy, b: &Vacancy) -> Ordering {
        match self {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Description => a.description.cmp(&b.description),
            SortField::Skills => a.skills.len().cmp(&b.skills.len()),
            SortField::Experience => a.experience.weight().cmp(&b.experience.weight()),
            SortField::Premium => a.premium_label().cmp(b.premium_label()),
            SortField::Company => a.employer_name.cmp(&b.employer_name),
            SortField::Salary => a.salary_rub.cmp(&b.salary_rub),
            SortField::Area => a.area_name.cmp(&b.area_name),
            SortField::Published => a.published_at.cmp(&b.published_at),
        }
    }
}

pub fn parse_reverse(input: &str) -> Result<bool> {
    match input {
        "Да" => Ok(true),
        "Нет" | "" => Ok(false),
        _ => Err(Error::Input(MSG_BAD_REVERSE.to_string())),
    }
}

/// Zero-based half-open window over the ordered rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl RowRange {
    /// Parses `start [end]` given 1-based.
    pub fn parse(input: &str) -> Result<Self> {
        let bad = || Error::Input(MSG_BAD_RANGE.to_string());
        let limits = input
            .split_whitespace()
            .map(|limit| match limit.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(bad()),
            })
            .collect::<Result<Vec<_>>>()?;

        match limits.as_slice() {
            [] => Ok(Self::default()),
            [start] => Ok(Self { start: Some(*start), end: None }),
            [start, end] => Ok(Self { start: Some(*start), end: Some(*end) }),
            _ => Err(bad()),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start.map_or(true, |start| start <= index) && self.end.map_or(true, |end| index < end)
    }
}

/// Console table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Index,
    Name,
    Description,
    Skills,
    Experience,
    Premium,
    Company,
    Salary,
    Area,
    Published,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Index,
        Column::Name,
        Column::Description,
        Column::Skills,
        Column::Experience,
        Column::Premium,
        Column::Company,
        Column::Salary,
        Column::Area,
        Column::Published,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Index => "№",
            Column::Name => "Название",
            Column::Description => "Описание",
            Column::Skills => "Навыки",
            Column::Experience => "Опыт работы",
            Column::Premium => "Премиум-вакансия",
            Column::Company => "Компания",
            Column::Salary => "Оклад",
            Column::Area => "Название региона",
            Column::Published => "Дата публикации вакансии",
        }
    }

    pub fn cell(&self, vacancy: &Vacancy) -> String {
        match self {
            Column::Index => vacancy.index.to_string(),
            Column::Name => vacancy.name.clone(),
            Column::Description => vacancy.description.clone(),
            Column::Skills => vacancy.key_skills.clone(),
            Column::Experience => vacancy.experience.label().to_string(),
            Column::Premium => vacancy.premium_label().to_string(),
            Column::Company => vacancy.employer_name.clone(),
            Column::Salary => vacancy.salary.display(),
            Column::Area => vacancy.area_name.clone(),
            Column::Published => vacancy.published_date.clone(),
        }
    }

    /// Parses a comma-space list of headers. Columns keep header order and appear
    /// once; `№` is always shown and unknown names are ignored.
    pub fn parse_list(input: &str) -> Vec<Column> {
        if input.is_empty() {
            return Column::ALL.to_vec();
        }
        let requested: Vec<&str> = input.split(", ").collect();
        Column::ALL
            .into_iter()
            .filter(|column| *column == Column::Index || requested.contains(&column.header()))
            .collect()
    }
}

/// Validated table tool settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub file_name: PathBuf,
    pub filter: Option<Filter>,
    pub sort: Option<SortField>,
    pub reverse: bool,
    pub range: RowRange,
    pub columns: Vec<Column>,
}

impl TableQuery {
    /// Validates every answer; the first problem found is returned.
    pub fn from_prompt(prompt: &TablePrompt) -> Result<Self> {
        validate_prompt(prompt, MSG_BAD_FORMAT)?;
        let filter = Filter::parse(&prompt.filter);
        let sort = SortField::parse(&prompt.sort);
        let reverse = parse_reverse(&prompt.reverse);
        let range = RowRange::parse(&prompt.range);

        Ok(Self {
            file_name: PathBuf::from(&prompt.file_name),
            filter: filter?,
            sort: sort?,
            reverse: reverse?,
            range: range?,
            columns: Column::parse_list(&prompt.columns),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(filter: &str, sort: &str, reverse: &str, range: &str) -> TablePrompt {
        TablePrompt {
            file_name: "vacancies.csv".into(),
            filter: filter.into(),
            sort: sort.into(),
            reverse: reverse.into(),
            range: range.into(),
            columns: String::new(),
        }
    }

    fn message(result: Result<TableQuery>) -> String {
        match result {
            Err(Error::Input(msg)) => msg,
            other => panic!("expected input error, got {:?}", other),
        }
    }

    #[test]
    fn parses_complete_prompt() {
        let query =
            TableQuery::from_prompt(&prompt("Навыки: Git, SQL", "Оклад", "Да", "3 5")).unwrap();
        assert_eq!(
            query.filter,
            Some(Filter::Skills(vec!["Git".into(), "SQL".into()]))
        );
        assert_eq!(query.sort, Some(SortField::Salary));
        assert!(query.reverse);
        assert_eq!(query.range, RowRange { start: Some(2), end: Some(4) });
        assert_eq!(query.columns, Column::ALL.to_vec());
    }

    #[test]
    fn filter_without_separator_is_format_error() {
        assert_eq!(message(TableQuery::from_prompt(&prompt("Навыки Git", "", "", ""))), MSG_BAD_FORMAT);
    }

    #[test]
    fn unknown_filter_label_is_rejected() {
        assert_eq!(message(TableQuery::from_prompt(&prompt("Зарплата: 100", "", "", ""))), MSG_BAD_FILTER);
    }

    #[test]
    fn only_first_error_is_reported() {
        let result = TableQuery::from_prompt(&prompt("Зарплата: 100", "Цвет", "Может", "x"));
        assert_eq!(message(result), MSG_BAD_FILTER);

        let result = TableQuery::from_prompt(&prompt("", "Цвет", "Может", ""));
        assert_eq!(message(result), MSG_BAD_SORT);

        let result = TableQuery::from_prompt(&prompt("", "", "Может", ""));
        assert_eq!(message(result), MSG_BAD_REVERSE);

        let result = TableQuery::from_prompt(&prompt("", "", "", "один"));
        assert_eq!(message(result), MSG_BAD_RANGE);
    }

    #[test]
    fn column_selection_keeps_index_and_drops_unknown() {
        let columns = Column::parse_list("Оклад, Цвет, Название");
        assert_eq!(columns, vec![Column::Index, Column::Name, Column::Salary]);
    }

    #[test]
    fn column_selection_follows_header_order_once() {
        assert_eq!(
            Column::parse_list("Оклад, Название"),
            vec![Column::Index, Column::Name, Column::Salary]
        );
        assert_eq!(Column::parse_list("№, Название"), vec![Column::Index, Column::Name]);
        assert_eq!(
            Column::parse_list("Название, Название"),
            vec![Column::Index, Column::Name]
        );
    }

    #[test]
    fn range_is_half_open() {
        let range = RowRange::parse("3 5").unwrap();
        let kept: Vec<usize> = (0..12).filter(|i| range.contains(*i)).collect();
        assert_eq!(kept, vec![2, 3]);

        let open = RowRange::parse("11").unwrap();
        let kept: Vec<usize> = (0..12).filter(|i| open.contains(*i)).collect();
        assert_eq!(kept, vec![10, 11]);
    }
}
