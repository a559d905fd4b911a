use crate::analysis::{
    GenderGap, GeoPoint, IntensityEntry, ScaleEntry, TrendSummary, aggregate_trends,
    compute_gender_gaps, focus_year_slice, largest_decreases, largest_increases, locate_countries,
    rank_by_count, rank_by_percentage, rank_intensity,
};
use crate::charts::{BarChart, BarDatum, ChartSet, render_bar_chart, render_scatter_chart};
use crate::cli::Cli;
use crate::dataset::{Observation, load_observations};
use crate::progress::{ProgressState, Stage, run_with_spinner};
use crate::report::{HtmlReportContext, HtmlReportPaths, save_html_report};
use crate::summary::{SummaryContext, SummaryPaths, print_summary};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tokio::fs;

mod analysis;
mod charts;
mod cli;
mod dataset;
mod formatting;
mod progress;
mod report;
mod summary;

#[tokio::main]
async fn main() -> Result<()> {
    colored::control::set_override(true);

    let mut cli = Cli::parse();

    if let Some(command) = cli.command.take() {
        crate::cli::handle_command(command)?;
        return Ok(());
    }

    let Cli {
        input,
        year,
        top,
        save_trends,
        save_charts,
        save_html,
        archive_csv,
        full_output,
        no_progress,
        ..
    } = cli;

    let run_started_at = Local::now();
    let progress = ProgressState::new(true, !no_progress);

    let observations = run_with_spinner(
        &progress,
        Stage::Load,
        &input.display().to_string(),
        load_observations(&input),
    )
    .await?;

    let outputs = run_with_spinner(&progress, Stage::Compute, "trend and focus-year analyses", {
        let observations = &observations;
        async move { Ok(compute_analyses(observations, year, top)) }
    })
    .await?;

    run_with_spinner(&progress, Stage::Render, "charts and reports", async {
        let chart_set = build_charts(&outputs, year);
        if let Some(path) = save_trends.as_ref() {
            save_trends_csv(&outputs.summaries, path.as_path(), archive_csv).await?;
        }
        if let Some(dir) = save_charts.as_ref() {
            save_chart_files(&chart_set, dir.as_path()).await?;
        }
        if let Some(path) = save_html.as_ref() {
            let html_context = HtmlReportContext {
                observation_count: observations.len(),
                country_count: outputs.summaries.len(),
                focus_year: year,
                focus_year_count: outputs.focus_year_count,
                top_n: top,
                run_started_at: &run_started_at,
                charts: &chart_set,
                paths: HtmlReportPaths {
                    trends: save_trends.as_deref(),
                    charts: save_charts.as_deref(),
                },
                output_path: path.as_path(),
            };
            save_html_report(path.as_path(), &html_context).await?;
        }
        Ok(())
    })
    .await?;

    progress.clear();

    print_summary(&SummaryContext {
        observation_count: observations.len(),
        country_count: outputs.summaries.len(),
        focus_year: year,
        focus_year_count: outputs.focus_year_count,
        run_started_at: &run_started_at,
        paths: SummaryPaths {
            trends: save_trends.as_deref(),
            charts: save_charts.as_deref(),
            html: save_html.as_deref(),
        },
        trend_summaries: &outputs.summaries,
        increases: &outputs.increases,
        decreases: &outputs.decreases,
        gender_gaps: &outputs.gender_gaps,
        intensity: &outputs.intensity,
        by_count: &outputs.by_count,
        by_percentage: &outputs.by_percentage,
        located_count: outputs.located.len(),
        full_output,
    });

    Ok(())
}

struct AnalysisOutputs {
    summaries: Vec<TrendSummary>,
    increases: Vec<TrendSummary>,
    decreases: Vec<TrendSummary>,
    gender_gaps: Vec<GenderGap>,
    intensity: Vec<IntensityEntry>,
    by_count: Vec<ScaleEntry>,
    by_percentage: Vec<ScaleEntry>,
    located: Vec<GeoPoint>,
    focus_year_count: usize,
    year_span: Option<(i32, i32)>,
}

fn compute_analyses(observations: &[Observation], year: i32, top: usize) -> AnalysisOutputs {
    let summaries = aggregate_trends(observations);
    let increases: Vec<TrendSummary> = largest_increases(&summaries, top)
        .into_iter()
        .cloned()
        .collect();
    let decreases: Vec<TrendSummary> = largest_decreases(&summaries, top)
        .into_iter()
        .cloned()
        .collect();

    let focus_year = focus_year_slice(observations, year);
    let gender_gaps = compute_gender_gaps(&focus_year, top);
    let intensity = rank_intensity(&focus_year, top);
    let by_count = rank_by_count(&focus_year, top);
    let by_percentage = rank_by_percentage(&focus_year, top);
    let located = locate_countries(&focus_year);

    let year_span = observations
        .iter()
        .map(|obs| obs.year)
        .fold(None, |span, year| match span {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        });

    AnalysisOutputs {
        summaries,
        increases,
        decreases,
        gender_gaps,
        intensity,
        by_count,
        by_percentage,
        located,
        focus_year_count: focus_year.len(),
        year_span,
    }
}

fn build_charts(outputs: &AnalysisOutputs, focus_year: i32) -> ChartSet {
    let span_label = outputs
        .year_span
        .map_or_else(String::new, |(lo, hi)| format!(" ({lo}-{hi})"));

    let increase_data: Vec<BarDatum> = outputs
        .increases
        .iter()
        .map(|summary| BarDatum {
            label: summary.country.clone(),
            value: summary.percentage_change,
        })
        .collect();
    let decrease_data: Vec<BarDatum> = outputs
        .decreases
        .iter()
        .map(|summary| BarDatum {
            label: summary.country.clone(),
            value: summary.percentage_change,
        })
        .collect();
    let gap_data: Vec<BarDatum> = outputs
        .gender_gaps
        .iter()
        .map(|gap| BarDatum {
            label: gap.country.clone(),
            value: gap.gap,
        })
        .collect();
    let intensity_data: Vec<BarDatum> = outputs
        .intensity
        .iter()
        .map(|entry| BarDatum {
            label: entry.country.clone(),
            value: entry.daily_cigarettes,
        })
        .collect();
    let count_data: Vec<BarDatum> = outputs
        .by_count
        .iter()
        .map(|entry| BarDatum {
            label: entry.country.clone(),
            value: entry.smokers_total,
        })
        .collect();
    let percentage_data: Vec<BarDatum> = outputs
        .by_percentage
        .iter()
        .map(|entry| BarDatum {
            label: entry.country.clone(),
            value: entry.pct_total,
        })
        .collect();

    let increase_title = format!("Largest increases in smoking percentage{span_label}");
    let decrease_title = format!("Largest decreases in smoking percentage{span_label}");
    let gap_title = format!("Widest gender gap in smoking ({focus_year})");
    let intensity_title = format!("Daily cigarette consumption ({focus_year})");
    let count_title = format!("Most smokers in absolute numbers ({focus_year})");
    let percentage_title = format!("Highest smoking percentage ({focus_year})");
    let geography_title = format!("Smoking percentage by country centroid ({focus_year})");

    ChartSet {
        trend_increase: render_bar_chart(&BarChart {
            title: &increase_title,
            value_label: "Percentage point change",
            data: &increase_data,
            fill: "#3d6fb4",
            log_scale: false,
        }),
        trend_decrease: render_bar_chart(&BarChart {
            title: &decrease_title,
            value_label: "Percentage point change",
            data: &decrease_data,
            fill: "#b44a3d",
            log_scale: false,
        }),
        gender_gap: render_bar_chart(&BarChart {
            title: &gap_title,
            value_label: "Male - female, percentage points",
            data: &gap_data,
            fill: "#7a5195",
            log_scale: false,
        }),
        intensity: render_bar_chart(&BarChart {
            title: &intensity_title,
            value_label: "Average daily cigarettes",
            data: &intensity_data,
            fill: "#6a4c93",
            log_scale: false,
        }),
        scale_absolute: render_bar_chart(&BarChart {
            title: &count_title,
            value_label: "Total smokers (log scale)",
            data: &count_data,
            fill: "#3f7d4e",
            log_scale: true,
        }),
        scale_percentage: render_bar_chart(&BarChart {
            title: &percentage_title,
            value_label: "Percentage of smokers",
            data: &percentage_data,
            fill: "#d1802f",
            log_scale: false,
        }),
        geography: render_scatter_chart(&geography_title, &outputs.located),
    }
}

pub(crate) async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

async fn save_trends_csv(summaries: &[TrendSummary], path: &Path, archive: bool) -> Result<()> {
    let mut writer = Writer::from_writer(Vec::new());
    for summary in summaries {
        writer
            .serialize(summary)
            .context("failed to serialize trend summary record")?;
    }
    let serialized = finalize_writer(writer, "trend summary writer")?;
    write_output_file(path, &serialized).await?;

    if archive {
        let archived = gzip_bytes(&serialized)?;
        let archive_path = gzip_path(path);
        write_output_file(&archive_path, &archived).await?;
    }

    Ok(())
}

fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .context("failed to gzip trends CSV")?;
    encoder.finish().context("failed to finish gzip stream")
}

fn gzip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

async fn save_chart_files(charts: &ChartSet, dir: &Path) -> Result<()> {
    for (stem, svg) in charts.files() {
        let path = dir.join(format!("{stem}.svg"));
        write_output_file(&path, svg.as_bytes()).await?;
    }
    Ok(())
}
