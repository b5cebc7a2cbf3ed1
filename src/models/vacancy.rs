use crate::error::{Error, Result};
use crate::models::currency::{Currency, CurrencyRates};
use crate::models::{field, RawRow};
use crate::utils::text::{clear_html, group_thousands, shorten};
use crate::utils::time::to_display_date;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExperienceLevel {
    NoExperience,
    Between1And3,
    Between3And6,
    MoreThan6,
}

impl ExperienceLevel {
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "noExperience" => Ok(Self::NoExperience),
            "between1And3" => Ok(Self::Between1And3),
            "between3And6" => Ok(Self::Between3And6),
            "moreThan6" => Ok(Self::MoreThan6),
            other => Err(Error::UnknownExperience(other.to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoExperience => "Нет опыта",
            Self::Between1And3 => "От 1 года до 3 лет",
            Self::Between3And6 => "От 3 до 6 лет",
            Self::MoreThan6 => "Более 6 лет",
        }
    }

    /// Ordinal used when sorting by experience.
    pub fn weight(&self) -> u8 {
        match self {
            Self::NoExperience => 1,
            Self::Between1And3 => 2,
            Self::Between3And6 => 3,
            Self::MoreThan6 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Salary {
    pub from: Option<Decimal>,
    pub to: Option<Decimal>,
    pub currency: Currency,
    pub gross: bool,
    /// RUB multiplier resolved from the active rate table.
    pub rate: Decimal,
}

impl Salary {
    pub fn from_row(row: &RawRow, rates: &CurrencyRates) -> Result<Self> {
        let currency = Currency::from_code(field(row, "salary_currency")?)?;
        let rate = rates.rate(currency)?;
        Ok(Self {
            from: parse_bound(row, "salary_from")?,
            to: parse_bound(row, "salary_to")?,
            currency,
            gross: is_true(row.get("salary_gross").map(String::as_str).unwrap_or("")),
            rate,
        })
    }

    /// Salary in the source currency: the mean of both bounds, or the only bound present.
    pub fn average(&self) -> Result<Option<Decimal>> {
        Ok(match (self.from, self.to) {
            (Some(from), Some(to)) => {
                let sum = from
                    .checked_add(to)
                    .ok_or_else(|| Error::invalid_number("salary_to", &to.to_string()))?;
                Some(sum / Decimal::from(2))
            }
            (Some(from), None) => Some(from),
            (None, Some(to)) => Some(to),
            (None, None) => None,
        })
    }

    pub fn average_rub(&self) -> Result<Option<Decimal>> {
        self.average()?
            .map(|avg| {
                avg.checked_mul(self.rate)
                    .ok_or_else(|| Error::invalid_number("salary_currency", self.currency.code()))
            })
            .transpose()
    }

    /// Whether `value` lies within the bounds. A missing bound is open.
    pub fn contains(&self, value: Decimal) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return false;
        }
        self.from.map_or(true, |from| from <= value) && self.to.map_or(true, |to| value <= to)
    }

    pub fn gross_label(&self) -> &'static str {
        if self.gross {
            "Без вычета налогов"
        } else {
            "С вычетом налогов"
        }
    }

    /// Console form: `10 000 - 20 000 (Евро) (С вычетом налогов)`.
    pub fn display(&self) -> String {
        let bound = |b: Option<Decimal>| {
            b.and_then(|v| v.to_i64())
                .map(group_thousands)
                .unwrap_or_else(|| "—".to_string())
        };
        format!(
            "{} - {} ({}) ({})",
            bound(self.from),
            bound(self.to),
            self.currency.display_name(),
            self.gross_label()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vacancy {
    /// 1-based position assigned by range selection; 0 before that.
    pub index: usize,
    pub name: String,
    pub description: String,
    pub skills: Vec<String>,
    pub key_skills: String,
    pub experience: ExperienceLevel,
    pub premium: bool,
    pub employer_name: String,
    pub salary: Salary,
    /// RUB average used by the salary sort.
    pub salary_rub: Option<Decimal>,
    pub area_name: String,
    pub published_at: String,
    pub published_date: String,
}

impl Vacancy {
    pub fn from_row(row: &RawRow, rates: &CurrencyRates) -> Result<Self> {
        let key_skills = field(row, "key_skills")?;
        let published_at = field(row, "published_at")?.to_string();
        let salary = Salary::from_row(row, rates)?;

        Ok(Self {
            index: 0,
            name: clear_html(field(row, "name")?),
            description: shorten(&clear_html(field(row, "description")?)),
            skills: key_skills.split('\n').map(str::to_string).collect(),
            key_skills: shorten(key_skills),
            experience: ExperienceLevel::from_code(field(row, "experience_id")?)?,
            premium: is_true(field(row, "premium")?),
            employer_name: field(row, "employer_name")?.to_string(),
            salary_rub: salary.average_rub()?,
            salary,
            area_name: field(row, "area_name")?.to_string(),
            published_date: to_display_date(&published_at)?,
            published_at,
        })
    }

    pub fn premium_label(&self) -> &'static str {
        if self.premium {
            "Да"
        } else {
            "Нет"
        }
    }
}

fn is_true(value: &str) -> bool {
    value.to_lowercase() == "true"
}

/// Parses a salary bound as a number truncated towards zero. Empty means absent.
pub fn parse_bound(row: &RawRow, name: &str) -> Result<Option<Decimal>> {
    let raw = match row.get(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim(),
        _ => return Ok(None),
    };
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| Error::invalid_number(name, raw))?;
    Ok(Some(value.trunc()))
}
