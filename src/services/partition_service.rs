use crate::error::{Error, Result};
use crate::models::currency::CurrencyRates;
use crate::models::stats::{SalaryBucket, StatRecord, YearlyStats};
use crate::services::loader_service::{ensure_loaded, RowPolicy, RowStream};
use crate::utils::time::year_of;
use csv::Writer;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

/// One per-year slice of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub year: i32,
    pub path: PathBuf,
}

/// Year buckets computed from a single partition.
#[derive(Debug, Default)]
struct PartitionResult {
    all: BTreeMap<i32, SalaryBucket>,
    profession: BTreeMap<i32, SalaryBucket>,
}

pub struct PartitionService;

impl PartitionService {
    /// Writes `part_<year>.csv` into `out_dir` for every publication year of `source`.
    #[instrument(fields(source = %source.display()))]
    pub fn split_by_year(source: &Path, out_dir: &Path) -> Result<Vec<Partition>> {
        let mut stream = RowStream::open(source, RowPolicy::Strict)?;
        let header = stream.header().map(<[String]>::to_vec).unwrap_or_default();
        let date_column = header.iter().position(|name| name == "published_at");

        fs::create_dir_all(out_dir)?;
        let mut writers: BTreeMap<i32, Writer<File>> = BTreeMap::new();
        let mut rows = 0usize;

        while let Some(record) = stream.next_record() {
            let record = record?;
            let column =
                date_column.ok_or_else(|| Error::MissingField("published_at".to_string()))?;
            let year = year_of(record.get(column).unwrap_or_default())?;

            let writer = match writers.entry(year) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let mut writer = Writer::from_path(partition_path(out_dir, year))?;
                    writer.write_record(&header)?;
                    entry.insert(writer)
                }
            };
            writer.write_record(&record)?;
            rows += 1;
        }
        ensure_loaded(stream.has_header(), rows)?;

        let mut partitions = Vec::with_capacity(writers.len());
        for (year, mut writer) in writers {
            writer.flush()?;
            partitions.push(Partition {
                year,
                path: partition_path(out_dir, year),
            });
        }

        info!(
            partitions = partitions.len(),
            rows,
            skipped = stream.skipped(),
            "Source split by year"
        );
        Ok(partitions)
    }

    /// Aggregates every partition on a pool of at most `pool_size` blocking workers.
    ///
    /// Results are merged by year, so completion order does not matter. The first
    /// failed worker fails the whole run.
    #[instrument(skip(partitions, rates), fields(partitions = partitions.len()))]
    pub async fn aggregate_partitions(
        partitions: &[Partition],
        profession: &str,
        rates: Arc<CurrencyRates>,
        pool_size: usize,
    ) -> Result<YearlyStats> {
        let permits = Arc::new(Semaphore::new(pool_size.max(1)));
        let mut tasks = JoinSet::new();

        for partition in partitions {
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
            let path = partition.path.clone();
            let profession = profession.to_string();
            let rates = rates.clone();

            tasks.spawn_blocking(move || {
                let _permit = permit;
                aggregate_file(&path, &profession, &rates)
            });
        }

        let mut all: BTreeMap<i32, SalaryBucket> = BTreeMap::new();
        let mut matched: BTreeMap<i32, SalaryBucket> = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let merged = joined?.and_then(|result| {
                for (year, bucket) in result.all {
                    all.entry(year).or_default().merge(&bucket)?;
                }
                for (year, bucket) in result.profession {
                    matched.entry(year).or_default().merge(&bucket)?;
                }
                Ok(())
            });
            if let Err(e) = merged {
                tasks.abort_all();
                return Err(e);
            }
        }

        debug!(years = all.len(), "Partitions merged");
        Ok(YearlyStats::from_buckets(&all, &matched, true))
    }
}

fn partition_path(out_dir: &Path, year: i32) -> PathBuf {
    out_dir.join(format!("part_{}.csv", year))
}

fn aggregate_file(path: &Path, profession: &str, rates: &CurrencyRates) -> Result<PartitionResult> {
    let mut result = PartitionResult::default();
    for row in RowStream::open(path, RowPolicy::Strict)? {
        let record = StatRecord::from_row(&row?, rates)?;
        result.all.entry(record.year).or_default().push(record.salary)?;
        if record.name.contains(profession) {
            result
                .profession
                .entry(record.year)
                .or_default()
                .push(record.salary)?;
        }
    }
    debug!(file = %path.display(), years = result.all.len(), "Partition aggregated");
    Ok(result)
}
