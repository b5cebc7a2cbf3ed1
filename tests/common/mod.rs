#![allow(dead_code)]

use std::path::{Path, PathBuf};
use vacancy_analytics::config::Config;
use vacancy_analytics::utils::prompt::Prompter;
use vacancy_analytics::AppState;

pub const HEADER: &str = "name,description,key_skills,experience_id,premium,employer_name,salary_from,salary_to,salary_gross,salary_currency,area_name,published_at";

const EXPERIENCE: [&str; 4] = ["noExperience", "between1And3", "between3And6", "moreThan6"];
const CURRENCIES: [&str; 3] = ["RUR", "EUR", "USD"];
const AREAS: [&str; 3] = ["Москва", "Санкт-Петербург", "Казань"];

pub fn vacancy_name(i: usize) -> String {
    let title = if i % 3 == 0 { "Аналитик" } else { "Программист" };
    format!("{} {:02}", title, i)
}

/// One well-formed row; every third vacancy is an analyst.
pub fn vacancy_line(i: usize) -> String {
    let skills = if i % 2 == 0 { "\"Git\nSQL\"" } else { "Rust" };
    format!(
        "{},<p>Описание   вакансии {}</p>,{},{},{},Компания {},{},{},{},{},{},{}-{:02}-15T12:00:00+0300",
        vacancy_name(i),
        i,
        skills,
        EXPERIENCE[i % 4],
        if i % 5 == 0 { "True" } else { "False" },
        i % 4,
        10_000 * i,
        10_000 * i + 20_000,
        if i % 2 == 0 { "True" } else { "False" },
        CURRENCIES[i % 3],
        AREAS[i % 3],
        2019 + i % 4,
        i % 9 + 1,
    )
}

/// Header plus `count` rows numbered from 1.
pub fn vacancies_csv(count: usize) -> String {
    let mut lines = vec![HEADER.to_string()];
    lines.extend((1..=count).map(vacancy_line));
    lines.join("\n") + "\n"
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

pub fn config(dir: &Path) -> Config {
    Config {
        report_dir: dir.join("reports"),
        rates_csv: dir.join("curr.csv"),
        cbr_daily_url: "http://127.0.0.1:9/scripts/XML_daily.asp".to_string(),
        wkhtmltopdf_bin: "wkhtmltopdf".to_string(),
        pdf_template: None,
        partition_dir: dir.join("parts"),
        worker_pool_size: 2,
        convert_row_limit: 100,
        http_timeout_secs: 5,
    }
}

pub fn state(dir: &Path) -> AppState {
    AppState::new(config(dir)).expect("state")
}

/// Answers are fed line by line; everything printed is collected.
pub fn prompter(answers: &[&str]) -> Prompter<&'static [u8], Vec<u8>> {
    let input = answers.join("\n") + "\n";
    Prompter::new(Box::leak(input.into_boxed_str()).as_bytes(), Vec::new())
}

pub fn output(prompter: Prompter<&'static [u8], Vec<u8>>) -> String {
    String::from_utf8(prompter.into_output()).expect("utf-8 output")
}
