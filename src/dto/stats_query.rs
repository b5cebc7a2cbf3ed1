use crate::dto::table_query::MSG_BAD_FORMAT;
use crate::error::Result;
use crate::utils::validation::validate_prompt;
use std::path::PathBuf;
use validator::Validate;

/// Answers to the statistics prompts.
#[derive(Debug, Clone, Default, Validate)]
pub struct StatsPrompt {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub profession: String,
    #[validate(length(min = 1))]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub file_name: PathBuf,
    pub profession: String,
    /// Restricts the profession series to one area.
    pub region: Option<String>,
}

impl StatsQuery {
    pub fn new(file_name: impl Into<PathBuf>, profession: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            profession: profession.into(),
            region: None,
        }
    }

    pub fn from_prompt(prompt: &StatsPrompt) -> Result<Self> {
        validate_prompt(prompt, MSG_BAD_FORMAT)?;
        Ok(Self {
            file_name: PathBuf::from(&prompt.file_name),
            profession: prompt.profession.clone(),
            region: prompt.region.clone(),
        })
    }
}
