mod common;

use common::{output, prompter, state, vacancies_csv, write_file};
use vacancy_analytics::commands::table::run_table;
use vacancy_analytics::dto::table_query::{Filter, RowRange, SortField, MSG_BAD_SORT};
use vacancy_analytics::error::Error;
use vacancy_analytics::models::currency::CurrencyRates;
use vacancy_analytics::services::loader_service::LoaderService;
use vacancy_analytics::services::table_service::{TableService, MSG_NOTHING_FOUND};

#[test]
fn range_keeps_window_and_renumbers() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let state = state(dir.path());

    let file = file.to_string_lossy().to_string();
    let mut prompter = prompter(&[&file, "", "", "", "3 5", "Название"]);
    run_table(&state, &mut prompter).unwrap();
    let printed = output(prompter);

    assert!(printed.contains("| 1 | Аналитик 03    |"), "{}", printed);
    assert!(printed.contains("| 2 | Программист 04 |"), "{}", printed);
    assert!(!printed.contains("Программист 02"));
    assert!(!printed.contains("Программист 05"));
}

#[test]
fn selected_range_matches_original_positions() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();
    assert_eq!(vacancies.len(), 12);

    let expected: Vec<String> = vacancies[2..4].iter().map(|v| v.name.clone()).collect();
    let selected = TableService::select_range(vacancies, RowRange::parse("3 5").unwrap());

    assert_eq!(selected.iter().map(|v| v.name.clone()).collect::<Vec<_>>(), expected);
    assert_eq!(selected.iter().map(|v| v.index).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn every_filter_kind_matches_its_source_record() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    for vacancy in &vacancies {
        let salary_from = vacancy.salary.from.unwrap().to_string();
        let inputs = [
            format!("Навыки: {}", vacancy.skills[0]),
            format!("Идентификатор валюты оклада: {}", vacancy.salary.currency.display_name()),
            format!("Название: {}", vacancy.name),
            format!("Название региона: {}", vacancy.area_name),
            format!("Компания: {}", vacancy.employer_name),
            format!("Дата публикации вакансии: {}", vacancy.published_date),
            format!("Опыт работы: {}", vacancy.experience.label()),
            format!("Премиум-вакансия: {}", vacancy.premium_label()),
            format!("Оклад: {}", salary_from),
        ];
        for input in &inputs {
            let filter = Filter::parse(input).unwrap().unwrap();
            assert!(filter.matches(vacancy), "{} should match {}", input, vacancy.name);
        }
    }
}

#[test]
fn sorting_twice_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    let fields = [
        SortField::Name,
        SortField::Description,
        SortField::Skills,
        SortField::Experience,
        SortField::Premium,
        SortField::Company,
        SortField::Salary,
        SortField::Area,
        SortField::Published,
    ];
    for field in fields {
        for reverse in [false, true] {
            let mut once = vacancies.clone();
            TableService::sort(&mut once, Some(field), reverse);
            let mut twice = once.clone();
            TableService::sort(&mut twice, Some(field), reverse);
            assert_eq!(once, twice, "{:?} reverse={}", field, reverse);
        }
    }
}

#[test]
fn salary_sort_orders_by_rouble_average() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let mut vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    TableService::sort(&mut vacancies, Some(SortField::Salary), true);
    let salaries: Vec<_> = vacancies.iter().map(|v| v.salary_rub.unwrap()).collect();
    assert!(salaries.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn nothing_found_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(3));
    let state = state(dir.path());

    let file = file.to_string_lossy().to_string();
    let mut prompter = prompter(&[&file, "Название: Дворник", "", "", "", ""]);
    run_table(&state, &mut prompter).unwrap();
    assert!(output(prompter).ends_with(&format!("{}\n", MSG_NOTHING_FOUND)));
}

#[test]
fn bad_sort_is_reported_before_the_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());

    let mut prompter = prompter(&["missing.csv", "", "Цвет", "", "", ""]);
    let result = run_table(&state, &mut prompter);
    assert!(matches!(result, Err(Error::Input(msg)) if msg == MSG_BAD_SORT));
}

#[test]
fn empty_and_header_only_files_are_distinguished() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());

    let empty = write_file(dir.path(), "empty.csv", "");
    let empty = empty.to_string_lossy().to_string();
    let mut answers = prompter(&[&empty, "", "", "", "", ""]);
    assert!(matches!(run_table(&state, &mut answers), Err(Error::EmptyFile)));

    let header_only = write_file(dir.path(), "header.csv", &format!("{}\n", common::HEADER));
    let header_only = header_only.to_string_lossy().to_string();
    let mut answers = prompter(&[&header_only, "", "", "", "", ""]);
    assert!(matches!(run_table(&state, &mut answers), Err(Error::NoData)));
}

fn names(vacancies: &[vacancy_analytics::models::vacancy::Vacancy]) -> Vec<String> {
    vacancies.iter().map(|v| v.name.clone()).collect()
}

#[test]
fn skills_filter_requires_every_listed_skill() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    let both = Filter::parse("Навыки: Git, SQL").unwrap();
    let kept = TableService::filter(vacancies.clone(), both.as_ref());
    let expected: Vec<String> = (2..=12).step_by(2).map(common::vacancy_name).collect();
    assert_eq!(names(&kept), expected);

    // Odd rows only know Rust, even rows lack it: nothing has both.
    let mixed = Filter::parse("Навыки: Git, Rust").unwrap();
    assert!(TableService::filter(vacancies, mixed.as_ref()).is_empty());
}

#[test]
fn salary_filter_bounds_are_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(12));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    // Row i spans [10 000 * i, 10 000 * i + 20 000].
    let cases = [("Оклад: 30000", vec![1, 2, 3]), ("Оклад: 30001", vec![2, 3]), ("Оклад: 29999", vec![1, 2])];
    for (input, rows) in cases {
        let filter = Filter::parse(input).unwrap();
        let kept = TableService::filter(vacancies.clone(), filter.as_ref());
        let expected: Vec<String> = rows.into_iter().map(common::vacancy_name).collect();
        assert_eq!(names(&kept), expected, "{}", input);
    }
}

#[test]
fn reverse_without_sort_field_flips_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(5));
    let vacancies = LoaderService::load_vacancies(&file, &CurrencyRates::fixed()).unwrap();

    let mut untouched = vacancies.clone();
    TableService::sort(&mut untouched, None, false);
    assert_eq!(untouched, vacancies);

    let mut reversed = vacancies.clone();
    TableService::sort(&mut reversed, None, true);
    let mut expected = names(&vacancies);
    expected.reverse();
    assert_eq!(names(&reversed), expected);
}

#[test]
fn selected_columns_print_once_in_header_order() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(dir.path(), "vacancies.csv", &vacancies_csv(3));
    let state = state(dir.path());

    let file = file.to_string_lossy().to_string();
    let mut prompter = prompter(&[&file, "", "", "", "", "Премиум-вакансия, №, Название"]);
    run_table(&state, &mut prompter).unwrap();
    let printed = output(prompter);

    let header = printed
        .lines()
        .find(|line| line.starts_with("| №"))
        .unwrap()
        .to_string();
    let cells: Vec<&str> = header.split('|').map(str::trim).filter(|c| !c.is_empty()).collect();
    assert_eq!(cells, vec!["№", "Название", "Премиум-вакансия"]);
}
