use crate::dto::stats_query::StatsQuery;
use crate::error::Result;
use crate::models::currency::{CurrencyRates, MonthlyRates};
use crate::models::stats::{AreaStats, SalaryBucket, SalarySource, StatRecord, Statistics, YearlyStats};
use crate::services::loader_service::{ensure_loaded, RowPolicy, RowStream};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::{debug, instrument};

/// Areas below this share of all vacancies are left out of area reports.
pub fn share_cutoff() -> Decimal {
    Decimal::new(1, 2)
}

pub const AREA_TOP: usize = 10;

/// Single-pass accumulator over vacancy records.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    profession: String,
    region: Option<String>,
    by_year: BTreeMap<i32, SalaryBucket>,
    profession_by_year: BTreeMap<i32, SalaryBucket>,
    by_area: IndexMap<String, SalaryBucket>,
    total: usize,
}

impl StatsAccumulator {
    pub fn new(profession: impl Into<String>, region: Option<String>) -> Self {
        Self {
            profession: profession.into(),
            region,
            ..Self::default()
        }
    }

    pub fn matches_profession(&self, record: &StatRecord) -> bool {
        record.name.contains(&self.profession)
            && self
                .region
                .as_ref()
                .map_or(true, |region| &record.area_name == region)
    }

    pub fn push(&mut self, record: &StatRecord) -> Result<()> {
        self.by_year.entry(record.year).or_default().push(record.salary)?;
        if self.matches_profession(record) {
            self.profession_by_year
                .entry(record.year)
                .or_default()
                .push(record.salary)?;
        }
        self.by_area
            .entry(record.area_name.clone())
            .or_default()
            .push(record.salary)?;
        self.total += 1;
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn finish(self) -> Statistics {
        // The region variant reports only the years where the pair occurs.
        let yearly = YearlyStats::from_buckets(
            &self.by_year,
            &self.profession_by_year,
            self.region.is_none(),
        );
        let areas = summarize_areas(&self.by_area, self.total);
        Statistics {
            profession: self.profession,
            region: self.region,
            total: self.total,
            yearly,
            areas,
        }
    }
}

/// Applies the long-tail cutoff and the top-10 truncation to area buckets.
///
/// The salary view is restricted to the areas that pass the share cutoff and is
/// then ordered by salary on its own, so it can differ from the share view.
pub fn summarize_areas(by_area: &IndexMap<String, SalaryBucket>, total: usize) -> AreaStats {
    if total == 0 {
        return AreaStats::default();
    }
    let total_dec = Decimal::from(total);

    let mut shares: Vec<(String, Decimal)> = by_area
        .iter()
        .map(|(area, bucket)| (area.clone(), (Decimal::from(bucket.count) / total_dec).round_dp(4)))
        .filter(|(_, share)| *share >= share_cutoff())
        .collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1));

    let mut salary: Vec<(String, Decimal)> = shares
        .iter()
        .filter_map(|(area, _)| by_area.get(area).map(|b| (area.clone(), b.mean())))
        .collect();
    // Restore first-seen order before the stable salary sort.
    salary.sort_by_key(|(area, _)| by_area.get_index_of(area));
    salary.sort_by(|a, b| b.1.cmp(&a.1));
    salary.truncate(AREA_TOP);

    shares.truncate(AREA_TOP);
    let other_share = Decimal::ONE - shares.iter().map(|(_, s)| *s).sum::<Decimal>();

    AreaStats {
        salary,
        share: shares,
        other_share,
    }
}

pub struct StatsService;

impl StatsService {
    #[instrument(skip(rates), fields(file = %query.file_name.display()))]
    pub fn collect(query: &StatsQuery, rates: &CurrencyRates) -> Result<Statistics> {
        let stream = RowStream::open(&query.file_name, RowPolicy::Strict)?;
        Self::collect_from(stream, query, rates)
    }

    /// Prices every row with the rate of its publication month. Rows with empty
    /// fields are kept; a row without a usable salary counts but has no salary.
    #[instrument(skip(rates), fields(file = %query.file_name.display()))]
    pub fn collect_monthly(query: &StatsQuery, rates: &MonthlyRates) -> Result<Statistics> {
        let stream = RowStream::open(&query.file_name, RowPolicy::AllowEmpty)?;
        Self::collect_from(stream, query, rates)
    }

    pub fn collect_from<R: Read, S: SalarySource>(
        mut stream: RowStream<R>,
        query: &StatsQuery,
        source: &S,
    ) -> Result<Statistics> {
        let mut acc = StatsAccumulator::new(query.profession.clone(), query.region.clone());
        for row in stream.by_ref() {
            acc.push(&StatRecord::from_row(&row?, source)?)?;
        }

        debug!(records = acc.total(), skipped = stream.skipped(), "Statistics collected");
        ensure_loaded(stream.has_header(), acc.total())?;
        Ok(acc.finish())
    }

    /// The six console lines of the statistics report.
    pub fn summary_lines(stats: &Statistics) -> Vec<String> {
        let yearly = &stats.yearly;
        let suffix = if stats.region.is_some() {
            "для выбранной профессии и региона"
        } else {
            "для выбранной профессии"
        };
        vec![
            format!("Динамика уровня зарплат по годам: {}", year_map(&yearly.salary)),
            format!("Динамика количества вакансий по годам: {}", year_map(&yearly.count)),
            format!(
                "Динамика уровня зарплат по годам {}: {}",
                suffix,
                year_map(&yearly.profession_salary)
            ),
            format!(
                "Динамика количества вакансий по годам {}: {}",
                suffix,
                year_map(&yearly.profession_count)
            ),
            format!(
                "Уровень зарплат по городам (в порядке убывания): {}",
                area_map(&stats.areas.salary)
            ),
            format!(
                "Доля вакансий по городам (в порядке убывания): {}",
                area_map(&stats.areas.share)
            ),
        ]
    }
}

fn year_map<V: std::fmt::Display>(map: &BTreeMap<i32, V>) -> String {
    let entries: Vec<String> = map.iter().map(|(year, v)| format!("{}: {}", year, v)).collect();
    format!("{{{}}}", entries.join(", "))
}

fn area_map(entries: &[(String, Decimal)]) -> String {
    let entries: Vec<String> = entries
        .iter()
        .map(|(area, v)| format!("'{}': {}", area, v.normalize()))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(count: usize, mean: i64) -> SalaryBucket {
        SalaryBucket {
            total: Decimal::from(mean) * Decimal::from(count),
            count,
            paid: count,
        }
    }

    #[test]
    fn cutoff_and_truncation() {
        let mut by_area = IndexMap::new();
        by_area.insert("A".to_string(), bucket(60, 10_000));
        by_area.insert("B".to_string(), bucket(4, 90_000));
        by_area.insert("C".to_string(), bucket(1, 500_000));
        by_area.insert("D".to_string(), bucket(30, 20_000));
        // 11 more areas with 5 records each (2.5%) push the total to 200.
        for i in 0..11 {
            by_area.insert(format!("E{}", i), bucket(5, 30_000 + i as i64));
        }
        let total = by_area.values().map(|b| b.count).sum();
        assert_eq!(total, 200);

        let areas = summarize_areas(&by_area, total);

        assert_eq!(areas.share.len(), 10);
        assert_eq!(areas.share[0], ("A".to_string(), Decimal::new(3, 1)));
        assert_eq!(areas.share[1], ("D".to_string(), Decimal::new(15, 2)));
        assert!(areas.share.iter().all(|(a, _)| a != "C"));
        assert!(areas.share.iter().all(|(a, _)| a != "B"));

        // C is richest but below 1%; B (2%) survives the cutoff and leads on salary.
        assert_eq!(areas.salary.len(), 10);
        assert_eq!(areas.salary[0].0, "B");
        assert!(areas.salary.iter().all(|(a, _)| a != "C"));
        assert!(areas.salary.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn other_share_is_remainder_of_share_view() {
        let mut by_area = IndexMap::new();
        by_area.insert("A".to_string(), bucket(3, 1));
        by_area.insert("B".to_string(), bucket(1, 1));
        let areas = summarize_areas(&by_area, 4);
        assert_eq!(areas.other_share, Decimal::ZERO);
    }

    #[test]
    fn region_variant_omits_missing_years() {
        let record = |name: &str, area: &str, year: i32| StatRecord {
            name: name.into(),
            area_name: area.into(),
            year,
            salary: Some(Decimal::from(100)),
        };
        let mut acc = StatsAccumulator::new("Аналитик", Some("Москва".into()));
        acc.push(&record("Аналитик данных", "Москва", 2020)).unwrap();
        acc.push(&record("Аналитик данных", "Казань", 2021)).unwrap();
        acc.push(&record("Тестировщик", "Москва", 2021)).unwrap();

        let stats = acc.finish();
        assert_eq!(stats.yearly.count.len(), 2);
        assert_eq!(stats.yearly.profession_count.len(), 1);
        assert_eq!(stats.yearly.profession_count[&2020], 1);
    }

    #[test]
    fn summary_formats_like_mappings() {
        let mut acc = StatsAccumulator::new("Нет такой", None);
        acc.push(&StatRecord {
            name: "Аналитик".into(),
            area_name: "Москва".into(),
            year: 2022,
            salary: Some(Decimal::new(15_5005, 1)),
        })
        .unwrap();
        let lines = StatsService::summary_lines(&acc.finish());
        assert_eq!(lines[0], "Динамика уровня зарплат по годам: {2022: 15500}");
        assert_eq!(lines[2], "Динамика уровня зарплат по годам для выбранной профессии: {2022: 0}");
        assert_eq!(lines[5], "Доля вакансий по городам (в порядке убывания): {'Москва': 1}");
    }
}
