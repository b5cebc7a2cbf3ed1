pub mod partition;
pub mod rates;
pub mod stats;
pub mod table;

use crate::error::Result;
use crate::utils::prompt::Prompter;
use std::io::{BufRead, Write};

pub const ASK_FILE: &str = "Введите название файла: ";
pub const ASK_PROFESSION: &str = "Введите название профессии: ";
pub const ASK_REGION: &str = "Введите название региона: ";

/// Writes lines to the command's output.
pub fn print_lines<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    lines: impl IntoIterator<Item = impl AsRef<str>>,
) -> Result<()> {
    let out = prompter.output();
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    out.flush()?;
    Ok(())
}
