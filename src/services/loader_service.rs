use crate::error::{Error, Result};
use crate::models::currency::CurrencyRates;
use crate::models::vacancy::Vacancy;
use crate::models::RawRow;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument};

/// Which rows survive the structural check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// Field count must match the header and no field may be empty.
    Strict,
    /// Field count must match the header; empty fields are kept.
    AllowEmpty,
}

/// Streams rows of a comma-separated file as field maps, skipping malformed rows.
pub struct RowStream<R: Read> {
    reader: csv::Reader<R>,
    header: Option<Vec<String>>,
    policy: RowPolicy,
    record: StringRecord,
    skipped: usize,
}

impl RowStream<File> {
    pub fn open(path: &Path, policy: RowPolicy) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, policy)
    }
}

impl<R: Read> RowStream<R> {
    pub fn from_reader(reader: R, policy: RowPolicy) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut first = StringRecord::new();
        let header = if reader.read_record(&mut first)? {
            Some(
                first
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        if i == 0 {
                            name.trim_start_matches('\u{feff}').to_string()
                        } else {
                            name.to_string()
                        }
                    })
                    .collect(),
            )
        } else {
            None
        };

        Ok(Self {
            reader,
            header,
            policy,
            record: StringRecord::new(),
            skipped: 0,
        })
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn accepts(&self, header_len: usize) -> bool {
        if self.record.len() != header_len {
            return false;
        }
        match self.policy {
            RowPolicy::Strict => self.record.iter().all(|cell| !cell.is_empty()),
            RowPolicy::AllowEmpty => true,
        }
    }

    /// Next accepted row as raw cells in header order.
    pub fn next_record(&mut self) -> Option<Result<StringRecord>> {
        let header_len = self.header.as_ref()?.len();
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(true) if self.accepts(header_len) => return Some(Ok(self.record.clone())),
                Ok(true) => self.skipped += 1,
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.next_record()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        let header = self.header.as_ref()?;
        Some(Ok(header
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect()))
    }
}

/// Maps an empty load to the matching data error.
pub fn ensure_loaded(has_header: bool, loaded: usize) -> Result<()> {
    match (has_header, loaded) {
        (false, 0) => Err(Error::EmptyFile),
        (true, 0) => Err(Error::NoData),
        _ => Ok(()),
    }
}

pub struct LoaderService;

impl LoaderService {
    #[instrument(skip(rates))]
    pub fn load_vacancies(path: &Path, rates: &CurrencyRates) -> Result<Vec<Vacancy>> {
        let stream = RowStream::open(path, RowPolicy::Strict)?;
        Self::collect_vacancies(stream, rates)
    }

    pub fn collect_vacancies<R: Read>(
        mut stream: RowStream<R>,
        rates: &CurrencyRates,
    ) -> Result<Vec<Vacancy>> {
        let mut vacancies = Vec::new();
        for row in stream.by_ref() {
            vacancies.push(Vacancy::from_row(&row?, rates)?);
        }

        debug!(
            loaded = vacancies.len(),
            skipped = stream.skipped(),
            "Vacancy file loaded"
        );
        ensure_loaded(stream.has_header(), vacancies.len())?;
        Ok(vacancies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,description,key_skills,experience_id,premium,employer_name,salary_from,salary_to,salary_gross,salary_currency,area_name,published_at";

    fn load(text: &str) -> Result<Vec<Vacancy>> {
        let stream = RowStream::from_reader(text.as_bytes(), RowPolicy::Strict)?;
        LoaderService::collect_vacancies(stream, &CurrencyRates::fixed())
    }

    #[test]
    fn zero_bytes_is_empty_file() {
        assert!(matches!(load(""), Err(Error::EmptyFile)));
    }

    #[test]
    fn header_only_is_no_data() {
        assert!(matches!(load(HEADER), Err(Error::NoData)));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let text = format!(
            "\u{feff}{HEADER}\n\
             Аналитик,Описание,SQL,noExperience,False,Фирма,30000,50000,True,RUR,Москва,2022-07-05T18:19:30+0300\n\
             Короткая,строка\n\
             Пустое,,SQL,noExperience,False,Фирма,30000,50000,True,RUR,Москва,2022-07-05T18:19:30+0300\n\
             Лишнее,Описание,SQL,noExperience,False,Фирма,30000,50000,True,RUR,Москва,2022-07-05T18:19:30+0300,extra\n"
        );
        let vacancies = load(&text).unwrap();
        assert_eq!(vacancies.len(), 1);
        assert_eq!(vacancies[0].name, "Аналитик");
    }

    #[test]
    fn only_malformed_rows_is_no_data() {
        let text = format!("{HEADER}\nа,б\n");
        assert!(matches!(load(&text), Err(Error::NoData)));
    }

    #[test]
    fn allow_empty_policy_keeps_blank_cells() {
        let text = "name,salary_from,salary_to\nА,,100\nБ,10\n";
        let rows: Vec<RawRow> = RowStream::from_reader(text.as_bytes(), RowPolicy::AllowEmpty)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["salary_from"], "");
    }
}
