use crate::commands::{print_lines, ASK_FILE};
use crate::dto::table_query::{TablePrompt, TableQuery};
use crate::error::Result;
use crate::services::loader_service::LoaderService;
use crate::services::table_service::TableService;
use crate::utils::prompt::Prompter;
use crate::AppState;
use std::io::{BufRead, Write};
use tracing::instrument;

/// Console table tool: every prompt is validated before the file is opened.
#[instrument(skip_all)]
pub fn run_table<R: BufRead, W: Write>(state: &AppState, prompter: &mut Prompter<R, W>) -> Result<()> {
    let prompt = TablePrompt {
        file_name: prompter.ask(ASK_FILE)?,
        filter: prompter.ask("Введите параметр фильтрации: ")?,
        sort: prompter.ask("Введите параметр сортировки: ")?,
        reverse: prompter.ask("Обратный порядок сортировки (Да / Нет): ")?,
        range: prompter.ask("Введите диапазон вывода: ")?,
        columns: prompter.ask("Введите требуемые столбцы: ")?,
    };
    let query = TableQuery::from_prompt(&prompt)?;

    let vacancies = LoaderService::load_vacancies(&query.file_name, &state.rates)?;
    let rows = TableService::apply(vacancies, &query);
    print_lines(prompter, [TableService::render(&rows, &query.columns)])
}
