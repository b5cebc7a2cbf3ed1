use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::stats::Statistics;
use crate::services::chart_service::ChartService;
use askama_escape::{escape, Html};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info, instrument, warn};

pub const BUILTIN_TEMPLATE: &str = include_str!("../../templates/report.html");

/// Placeholders understood by the report template.
const PLACEHOLDERS: [&str; 6] = [
    "name",
    "region",
    "chart",
    "year_rows",
    "area_salary_rows",
    "area_share_rows",
];

pub struct ReportService {
    template: String,
    converter: String,
}

impl ReportService {
    pub fn new(template: String, converter: impl Into<String>) -> Self {
        Self {
            template,
            converter: converter.into(),
        }
    }

    /// Uses `PDF_TEMPLATE` when set, the bundled template otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let template = match &config.pdf_template {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Cannot read PDF_TEMPLATE {}: {}", path.display(), e))
            })?,
            None => BUILTIN_TEMPLATE.to_string(),
        };
        Ok(Self::new(template, config.wkhtmltopdf_bin.clone()))
    }

    pub fn render_html(&self, stats: &Statistics) -> String {
        let chart = format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(ChartService::render_svg(stats))
        );
        let values = [
            escape(&stats.profession, Html).to_string(),
            region_suffix(stats),
            chart,
            year_rows(stats),
            area_salary_rows(stats),
            area_share_rows(stats),
        ];

        PLACEHOLDERS
            .iter()
            .zip(values)
            .fold(self.template.clone(), |html, (name, value)| {
                html.replace(&format!("{{{{ {} }}}}", name), &value)
            })
    }

    /// Writes `<stem>.html` next to `pdf_path` and converts it with the external binary.
    #[instrument(skip(self, stats), fields(profession = %stats.profession))]
    pub async fn write_pdf(&self, stats: &Statistics, pdf_path: &Path) -> Result<PathBuf> {
        let html_path = pdf_path.with_extension("html");
        tokio::fs::write(&html_path, self.render_html(stats)).await?;

        info!(converter = %self.converter, "Converting report to PDF");
        let output = Command::new(&self.converter)
            .arg("--enable-local-file-access")
            .arg(&html_path)
            .arg(pdf_path)
            .output()
            .await
            .map_err(|err| {
                error!(error = ?err, "Failed to spawn PDF converter");
                Error::Pdf(format!("failed to spawn {}: {}", self.converter, err))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!(?stderr, "PDF converter failed");
            return Err(Error::Pdf(format!(
                "{} exited with status {:?}",
                self.converter,
                output.status.code()
            )));
        }

        info!(path = %pdf_path.display(), "Report written");
        Ok(pdf_path.to_path_buf())
    }
}

/// ` в регионе <name>` for the region variant, empty otherwise.
fn region_suffix(stats: &Statistics) -> String {
    stats
        .region
        .as_ref()
        .map(|region| format!(" в регионе {}", escape(region, Html)))
        .unwrap_or_default()
}

fn cell(value: impl std::fmt::Display) -> String {
    format!("<td>{}</td>", escape(&value.to_string(), Html))
}

fn year_rows(stats: &Statistics) -> String {
    let yearly = &stats.yearly;
    let mut rows = String::new();
    for year in yearly.years() {
        let or_blank = |value: Option<String>| value.unwrap_or_default();
        let _ = writeln!(
            rows,
            "    <tr>{}{}{}{}{}</tr>",
            cell(year),
            cell(or_blank(yearly.salary.get(&year).map(ToString::to_string))),
            cell(or_blank(yearly.profession_salary.get(&year).map(ToString::to_string))),
            cell(or_blank(yearly.count.get(&year).map(ToString::to_string))),
            cell(or_blank(yearly.profession_count.get(&year).map(ToString::to_string))),
        );
    }
    rows
}

fn area_salary_rows(stats: &Statistics) -> String {
    let mut rows = String::new();
    for (area, salary) in &stats.areas.salary {
        let _ = writeln!(rows, "    <tr>{}{}</tr>", cell(area), cell(salary));
    }
    rows
}

fn area_share_rows(stats: &Statistics) -> String {
    let mut rows = String::new();
    for (area, share) in &stats.areas.share {
        let percent = (share * Decimal::ONE_HUNDRED).round_dp(2).normalize();
        let _ = writeln!(rows, "    <tr>{}{}</tr>", cell(area), cell(format!("{}%", percent)));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::{AreaStats, YearlyStats};

    fn statistics() -> Statistics {
        Statistics {
            profession: "Аналитик".into(),
            region: None,
            total: 10,
            yearly: YearlyStats {
                salary: [(2022, Decimal::from(100_000))].into(),
                count: [(2022, 10)].into(),
                profession_salary: [(2022, Decimal::from(120_000))].into(),
                profession_count: [(2022, 3)].into(),
            },
            areas: AreaStats {
                salary: vec![("Москва".into(), Decimal::from(110_000))],
                share: vec![("Москва".into(), Decimal::new(3264, 4))],
                other_share: Decimal::new(6736, 4),
            },
        }
    }

    #[test]
    fn fills_every_placeholder() {
        let service = ReportService::new(BUILTIN_TEMPLATE.to_string(), "wkhtmltopdf");
        let html = service.render_html(&statistics());

        assert!(!html.contains("{{"));
        assert!(html.contains("Средняя зарплата - Аналитик"));
        assert!(html.contains("<td>2022</td><td>100000</td><td>120000</td><td>10</td><td>3</td>"));
        assert!(html.contains("<td>Москва</td><td>32.64%</td>"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("для профессии Аналитик</h1>"));
    }

    #[test]
    fn region_variant_names_the_region() {
        let service = ReportService::new(BUILTIN_TEMPLATE.to_string(), "wkhtmltopdf");
        let mut stats = statistics();
        stats.region = Some("Москва".into());
        let html = service.render_html(&stats);

        assert!(!html.contains("{{"));
        assert!(html.contains("<h1>Аналитика по зарплатам и городам для профессии Аналитик в регионе Москва</h1>"));
    }

    #[tokio::test]
    async fn missing_converter_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReportService::new(
            "<p>{{ name }}</p>".to_string(),
            "definitely-not-a-real-converter-binary",
        );
        let result = service.write_pdf(&statistics(), &dir.path().join("report.pdf")).await;

        assert!(matches!(result, Err(Error::Pdf(_))));
        let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
        assert_eq!(html, "<p>Аналитик</p>");
    }
}
