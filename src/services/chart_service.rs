use crate::error::Result;
use crate::models::stats::Statistics;
use askama_escape::{escape, Html};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, instrument};

const PANEL_WIDTH: f64 = 600.0;
const PANEL_HEIGHT: f64 = 450.0;
const MARGIN: f64 = 60.0;
const FONT_SIZE: f64 = 11.0;
const PALETTE: [&str; 11] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#aec7e8",
];

pub const OTHER_LABEL: &str = "Другие";

/// A labelled data series drawn in one colour.
struct Series<'a> {
    label: String,
    values: Vec<f64>,
    color: &'a str,
}

pub struct ChartService;

impl ChartService {
    /// 2×2 chart grid: salary and count by year, salary and share by area.
    pub fn render_svg(stats: &Statistics) -> String {
        let yearly = &stats.yearly;
        let years: Vec<String> = yearly.years().map(|y| y.to_string()).collect();
        let by_year = |map: &std::collections::BTreeMap<i32, Decimal>| -> Vec<f64> {
            yearly.years().map(|y| map.get(&y).map(to_f64).unwrap_or(0.0)).collect()
        };
        let count_by_year = |map: &std::collections::BTreeMap<i32, usize>| -> Vec<f64> {
            yearly.years().map(|y| map.get(&y).copied().unwrap_or(0) as f64).collect()
        };

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="{FONT_SIZE}">"#,
            w = PANEL_WIDTH * 2.0,
            h = PANEL_HEIGHT * 2.0,
        );
        svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);

        svg.push_str(&grouped_bars(
            0.0,
            0.0,
            "Уровень зарплат по годам",
            &years,
            &[
                Series {
                    label: "средняя з/п".to_string(),
                    values: by_year(&yearly.salary),
                    color: PALETTE[0],
                },
                Series {
                    label: format!("з/п {}", stats.profession.to_lowercase()),
                    values: by_year(&yearly.profession_salary),
                    color: PALETTE[1],
                },
            ],
        ));
        svg.push_str(&grouped_bars(
            PANEL_WIDTH,
            0.0,
            "Количество вакансий по годам",
            &years,
            &[
                Series {
                    label: "Количество вакансий".to_string(),
                    values: count_by_year(&yearly.count),
                    color: PALETTE[0],
                },
                Series {
                    label: format!("Количество вакансий {}", stats.profession),
                    values: count_by_year(&yearly.profession_count),
                    color: PALETTE[1],
                },
            ],
        ));

        let (areas, salaries): (Vec<String>, Vec<f64>) = stats
            .areas
            .salary
            .iter()
            .map(|(area, salary)| (area.clone(), to_f64(salary)))
            .unzip();
        svg.push_str(&horizontal_bars(
            0.0,
            PANEL_HEIGHT,
            "Уровень зарплат по городам",
            &areas,
            &salaries,
        ));

        let mut slices = vec![(OTHER_LABEL.to_string(), to_f64(&stats.areas.other_share))];
        slices.extend(
            stats
                .areas
                .share
                .iter()
                .map(|(area, share)| (area.clone(), to_f64(share))),
        );
        svg.push_str(&pie(PANEL_WIDTH, PANEL_HEIGHT, "Доля вакансий по городам", &slices));

        svg.push_str("</svg>");
        svg
    }

    #[instrument(skip(stats), fields(profession = %stats.profession))]
    pub fn save_svg(stats: &Statistics, path: &Path) -> Result<()> {
        std::fs::write(path, Self::render_svg(stats))?;
        info!(path = %path.display(), "Chart written");
        Ok(())
    }
}

fn to_f64(value: &Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn title(x: f64, y: f64, text: &str) -> String {
    format!(
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
        x + PANEL_WIDTH / 2.0,
        y + 24.0,
        escape(text, Html)
    )
}

/// Upper bound of the value axis, rounded up to a whole step.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 1.0;
    }
    let step = 10f64.powi(max.log10().floor() as i32);
    (max / step).ceil() * step
}

fn grouped_bars(x0: f64, y0: f64, caption: &str, labels: &[String], series: &[Series<'_>]) -> String {
    let mut out = title(x0, y0, caption);
    let left = x0 + MARGIN;
    let bottom = y0 + PANEL_HEIGHT - MARGIN;
    let plot_width = PANEL_WIDTH - 1.5 * MARGIN;
    let plot_height = PANEL_HEIGHT - 2.0 * MARGIN;
    let max = axis_max(series.iter().flat_map(|s| s.values.iter().copied()));

    for tick in 0..=4 {
        let value = max * tick as f64 / 4.0;
        let y = bottom - plot_height * tick as f64 / 4.0;
        let _ = write!(
            out,
            r##"<line x1="{left:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/><text x="{:.1}" y="{:.1}" text-anchor="end">{value:.0}</text>"##,
            left + plot_width,
            left - 4.0,
            y + 4.0,
        );
    }

    let group_width = plot_width / labels.len().max(1) as f64;
    let bar_width = group_width * 0.8 / series.len().max(1) as f64;
    for (i, label) in labels.iter().enumerate() {
        let group_left = left + group_width * i as f64 + group_width * 0.1;
        for (j, s) in series.iter().enumerate() {
            let value = s.values.get(i).copied().unwrap_or(0.0);
            let height = plot_height * value / max;
            let _ = write!(
                out,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                group_left + bar_width * j as f64,
                bottom - height,
                bar_width,
                height,
                s.color
            );
        }
        let _ = write!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" transform="rotate(-90 {:.1} {:.1})">{}</text>"#,
            group_left + group_width * 0.4,
            bottom + 6.0,
            group_left + group_width * 0.4,
            bottom + 6.0,
            escape(label, Html)
        );
    }

    for (j, s) in series.iter().enumerate() {
        let y = y0 + 40.0 + 16.0 * j as f64;
        let _ = write!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}">{}</text>"#,
            left + 8.0,
            y,
            s.color,
            left + 22.0,
            y + 9.0,
            escape(&s.label, Html)
        );
    }
    out
}

fn horizontal_bars(x0: f64, y0: f64, caption: &str, labels: &[String], values: &[f64]) -> String {
    let mut out = title(x0, y0, caption);
    let left = x0 + 2.0 * MARGIN;
    let top = y0 + MARGIN;
    let plot_width = PANEL_WIDTH - 2.5 * MARGIN;
    let plot_height = PANEL_HEIGHT - 2.0 * MARGIN;
    let max = axis_max(values.iter().copied());
    let row_height = plot_height / labels.len().max(1) as f64;

    for (i, (label, value)) in labels.iter().zip(values).enumerate() {
        let y = top + row_height * i as f64;
        let _ = write!(
            out,
            r#"<rect x="{left:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/><text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            y + row_height * 0.1,
            plot_width * value / max,
            row_height * 0.8,
            PALETTE[0],
            left - 4.0,
            y + row_height / 2.0 + 4.0,
            escape(label, Html)
        );
    }
    out
}

fn pie(x0: f64, y0: f64, caption: &str, slices: &[(String, f64)]) -> String {
    let mut out = title(x0, y0, caption);
    let cx = x0 + PANEL_WIDTH * 0.4;
    let cy = y0 + PANEL_HEIGHT / 2.0 + 10.0;
    let r = PANEL_HEIGHT / 2.0 - MARGIN;
    let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return out;
    }

    let mut start = 0.0_f64;
    for (i, (label, value)) in slices.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let fraction = value.max(0.0) / total;
        if fraction > 0.0 {
            let end = start + fraction * 2.0 * PI;
            if fraction >= 0.9999 {
                let _ = write!(out, r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{color}"/>"#);
            } else {
                let large = if end - start > PI { 1 } else { 0 };
                let _ = write!(
                    out,
                    r#"<path d="M {cx:.1} {cy:.1} L {:.1} {:.1} A {r:.1} {r:.1} 0 {large} 0 {:.1} {:.1} Z" fill="{color}"/>"#,
                    cx + r * start.cos(),
                    cy - r * start.sin(),
                    cx + r * end.cos(),
                    cy - r * end.sin(),
                );
            }
            start = end;
        }

        let legend_y = y0 + 50.0 + 16.0 * i as f64;
        let legend_x = x0 + PANEL_WIDTH * 0.78;
        let _ = write!(
            out,
            r#"<rect x="{legend_x:.1}" y="{legend_y:.1}" width="10" height="10" fill="{color}"/><text x="{:.1}" y="{:.1}">{}</text>"#,
            legend_x + 14.0,
            legend_y + 9.0,
            escape(label, Html)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stats::{AreaStats, YearlyStats};

    fn statistics() -> Statistics {
        Statistics {
            profession: "Аналитик".into(),
            region: None,
            total: 4,
            yearly: YearlyStats {
                salary: [(2022, Decimal::from(100))].into(),
                count: [(2022, 4)].into(),
                profession_salary: [(2022, Decimal::ZERO)].into(),
                profession_count: [(2022, 0)].into(),
            },
            areas: AreaStats {
                salary: vec![("Ростов-на-Дону".into(), Decimal::from(100))],
                share: vec![("A&B <C>".into(), Decimal::new(75, 2))],
                other_share: Decimal::new(25, 2),
            },
        }
    }

    #[test]
    fn draws_all_four_panels() {
        let svg = ChartService::render_svg(&statistics());
        for caption in [
            "Уровень зарплат по годам",
            "Количество вакансий по годам",
            "Уровень зарплат по городам",
            "Доля вакансий по городам",
        ] {
            assert!(svg.contains(caption), "missing {}", caption);
        }
        assert!(svg.contains("п аналитик"));
        assert!(svg.contains(OTHER_LABEL));
        assert!(svg.starts_with("<svg") && svg.ends_with("</svg>"));
    }

    #[test]
    fn labels_are_escaped() {
        let svg = ChartService::render_svg(&statistics());
        assert!(svg.contains("A&amp;B &lt;C&gt;"));
        assert!(!svg.contains("<C>"));
    }

    #[test]
    fn axis_rounds_up() {
        assert_eq!(axis_max([0.0].into_iter()), 1.0);
        assert_eq!(axis_max([38_916.0, 12.0].into_iter()), 40_000.0);
    }
}
