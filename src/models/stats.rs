use crate::error::{Error, Result};
use crate::models::currency::CurrencyRates;
use crate::models::vacancy::Salary;
use crate::models::{field, RawRow};
use crate::utils::time::year_of;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Running sum and count of RUB salaries for one year or area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalaryBucket {
    pub total: Decimal,
    /// Every record seen, with or without a salary.
    pub count: usize,
    /// Records whose salary went into `total`.
    pub paid: usize,
}

impl SalaryBucket {
    pub fn push(&mut self, salary: Option<Decimal>) -> Result<()> {
        if let Some(salary) = salary {
            self.total = add_salary(self.total, salary)?;
            self.paid += 1;
        }
        self.count += 1;
        Ok(())
    }

    pub fn merge(&mut self, other: &SalaryBucket) -> Result<()> {
        self.total = add_salary(self.total, other.total)?;
        self.count += other.count;
        self.paid += other.paid;
        Ok(())
    }

    /// Mean salary truncated to an integer; zero when no record carried a salary.
    pub fn mean(&self) -> Decimal {
        if self.paid == 0 {
            return Decimal::ZERO;
        }
        (self.total / Decimal::from(self.paid)).trunc()
    }
}

fn add_salary(total: Decimal, salary: Decimal) -> Result<Decimal> {
    total
        .checked_add(salary)
        .ok_or_else(|| Error::invalid_number("salary", &salary.to_string()))
}

/// Where the aggregator takes the RUB salary of a row from.
pub trait SalarySource {
    fn salary_rub(&self, row: &RawRow) -> Result<Option<Decimal>>;
}

impl SalarySource for CurrencyRates {
    fn salary_rub(&self, row: &RawRow) -> Result<Option<Decimal>> {
        Salary::from_row(row, self)?.average_rub()
    }
}

/// The columns the aggregator needs from one vacancy row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    pub name: String,
    pub area_name: String,
    pub year: i32,
    /// `None` when the row has no usable salary; it still counts as a vacancy.
    pub salary: Option<Decimal>,
}

impl StatRecord {
    pub fn from_row<S: SalarySource + ?Sized>(row: &RawRow, source: &S) -> Result<Self> {
        Ok(Self {
            name: field(row, "name")?.to_string(),
            area_name: field(row, "area_name")?.to_string(),
            year: year_of(field(row, "published_at")?)?,
            salary: source.salary_rub(row)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyStats {
    pub salary: BTreeMap<i32, Decimal>,
    pub count: BTreeMap<i32, usize>,
    pub profession_salary: BTreeMap<i32, Decimal>,
    pub profession_count: BTreeMap<i32, usize>,
}

impl YearlyStats {
    /// Builds the four year series. With `align_empty`, an empty profession
    /// series is filled with zeros for every year of the full series.
    pub fn from_buckets(
        all: &BTreeMap<i32, SalaryBucket>,
        profession: &BTreeMap<i32, SalaryBucket>,
        align_empty: bool,
    ) -> Self {
        let mut stats = Self {
            salary: all.iter().map(|(y, b)| (*y, b.mean())).collect(),
            count: all.iter().map(|(y, b)| (*y, b.count)).collect(),
            profession_salary: profession.iter().map(|(y, b)| (*y, b.mean())).collect(),
            profession_count: profession.iter().map(|(y, b)| (*y, b.count)).collect(),
        };

        if align_empty && stats.profession_salary.is_empty() {
            stats.profession_salary = all.keys().map(|y| (*y, Decimal::ZERO)).collect();
            stats.profession_count = all.keys().map(|y| (*y, 0)).collect();
        }

        stats
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.salary.keys().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaStats {
    /// Mean salary per area, descending, at most ten entries.
    pub salary: Vec<(String, Decimal)>,
    /// Share of all vacancies per area, descending, at most ten entries.
    pub share: Vec<(String, Decimal)>,
    /// Share of every vacancy outside `share`.
    pub other_share: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub profession: String,
    pub region: Option<String>,
    pub total: usize,
    pub yearly: YearlyStats,
    pub areas: AreaStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_mean_truncates() {
        let mut bucket = SalaryBucket::default();
        bucket.push(Some(Decimal::from(100))).unwrap();
        bucket.push(Some(Decimal::from(101))).unwrap();
        assert_eq!(bucket.mean(), Decimal::from(100));
        assert_eq!(SalaryBucket::default().mean(), Decimal::ZERO);
    }

    #[test]
    fn records_without_salary_count_but_do_not_lower_the_mean() {
        let mut bucket = SalaryBucket::default();
        bucket.push(Some(Decimal::from(300))).unwrap();
        bucket.push(None).unwrap();
        assert_eq!(bucket.count, 2);
        assert_eq!(bucket.mean(), Decimal::from(300));
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let mut bucket = SalaryBucket::default();
        bucket.push(Some(Decimal::MAX)).unwrap();
        let result = bucket.push(Some(Decimal::MAX));
        assert!(matches!(result, Err(Error::InvalidNumber { .. })));
        assert_eq!(bucket.count, 1);
    }

    #[test]
    fn empty_profession_series_is_aligned_with_full_series() {
        let mut all = BTreeMap::new();
        for year in [2019, 2020, 2021] {
            let mut bucket = SalaryBucket::default();
            bucket.push(Some(Decimal::from(50_000))).unwrap();
            all.insert(year, bucket);
        }

        let stats = YearlyStats::from_buckets(&all, &BTreeMap::new(), true);
        assert_eq!(stats.profession_salary.len(), 3);
        assert!(stats.profession_salary.values().all(|v| v.is_zero()));
        assert!(stats.profession_count.values().all(|c| *c == 0));
        assert!(stats.profession_count.keys().copied().eq(stats.years()));

        let unaligned = YearlyStats::from_buckets(&all, &BTreeMap::new(), false);
        assert!(unaligned.profession_salary.is_empty());
    }
}
