pub mod console_table;
pub mod prompt;
pub mod text;
pub mod time;
pub mod validation;
