use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    Azn,
    Byr,
    Eur,
    Gel,
    Kgs,
    Kzt,
    Rur,
    Uah,
    Usd,
    Uzs,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Azn,
        Currency::Byr,
        Currency::Eur,
        Currency::Gel,
        Currency::Kgs,
        Currency::Kzt,
        Currency::Rur,
        Currency::Uah,
        Currency::Usd,
        Currency::Uzs,
    ];

    /// Currencies published by the central bank feed and kept in the monthly table.
    pub const MONTHLY: [Currency; 5] = [
        Currency::Byr,
        Currency::Usd,
        Currency::Eur,
        Currency::Kzt,
        Currency::Uah,
    ];

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "AZN" => Ok(Currency::Azn),
            "BYR" => Ok(Currency::Byr),
            "EUR" => Ok(Currency::Eur),
            "GEL" => Ok(Currency::Gel),
            "KGS" => Ok(Currency::Kgs),
            "KZT" => Ok(Currency::Kzt),
            "RUR" => Ok(Currency::Rur),
            "UAH" => Ok(Currency::Uah),
            "USD" => Ok(Currency::Usd),
            "UZS" => Ok(Currency::Uzs),
            other => Err(Error::UnknownCurrency(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Azn => "AZN",
            Currency::Byr => "BYR",
            Currency::Eur => "EUR",
            Currency::Gel => "GEL",
            Currency::Kgs => "KGS",
            Currency::Kzt => "KZT",
            Currency::Rur => "RUR",
            Currency::Uah => "UAH",
            Currency::Usd => "USD",
            Currency::Uzs => "UZS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Azn => "Манаты",
            Currency::Byr => "Белорусские рубли",
            Currency::Eur => "Евро",
            Currency::Gel => "Грузинский лари",
            Currency::Kgs => "Киргизский сом",
            Currency::Kzt => "Тенге",
            Currency::Rur => "Рубли",
            Currency::Uah => "Гривны",
            Currency::Usd => "Доллары",
            Currency::Uzs => "Узбекский сум",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Currency → RUB multipliers that stay fixed for a whole run.
#[derive(Debug, Clone)]
pub struct CurrencyRates {
    rates: HashMap<Currency, Decimal>,
}

impl CurrencyRates {
    pub fn new(rates: HashMap<Currency, Decimal>) -> Self {
        Self { rates }
    }

    /// Point-in-time constants used by the table tool and the basic aggregator.
    pub fn fixed() -> Self {
        let rates = [
            (Currency::Azn, Decimal::new(3568, 2)),
            (Currency::Byr, Decimal::new(2391, 2)),
            (Currency::Eur, Decimal::new(5990, 2)),
            (Currency::Gel, Decimal::new(2174, 2)),
            (Currency::Kgs, Decimal::new(76, 2)),
            (Currency::Kzt, Decimal::new(13, 2)),
            (Currency::Rur, Decimal::ONE),
            (Currency::Uah, Decimal::new(164, 2)),
            (Currency::Usd, Decimal::new(6066, 2)),
            (Currency::Uzs, Decimal::new(55, 4)),
        ];
        Self::new(rates.into_iter().collect())
    }

    pub fn rate(&self, currency: Currency) -> Result<Decimal> {
        self.rates
            .get(&currency)
            .copied()
            .ok_or_else(|| Error::UnknownCurrency(currency.code().to_string()))
    }
}

/// Calendar month used as the key of [`MonthlyRates`], rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidDate(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Parses the leading `YYYY-MM` of a timestamp or month key.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidDate(raw.to_string());
        let head = raw.get(..7).ok_or_else(invalid)?;
        let (year, month) = head.split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// Date in the `dd/mm/yyyy` form the central bank endpoint expects.
    pub fn request_date(&self) -> String {
        format!("01/{:02}/{:04}", self.month, self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Month-indexed exchange rates produced by the rate fetcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyRates {
    months: BTreeMap<MonthKey, HashMap<Currency, Decimal>>,
}

impl MonthlyRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, month: MonthKey, rates: HashMap<Currency, Decimal>) {
        self.months.insert(month, rates);
    }

    /// RUB multiplier for `currency` in `month`. Roubles are always 1.
    pub fn rate(&self, month: MonthKey, currency: Currency) -> Option<Decimal> {
        if currency == Currency::Rur {
            return Some(Decimal::ONE);
        }
        self.months.get(&month)?.get(&currency).copied()
    }

    pub fn months(&self) -> impl Iterator<Item = (&MonthKey, &HashMap<Currency, Decimal>)> {
        self.months.iter()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}
