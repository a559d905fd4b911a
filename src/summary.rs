use crate::analysis::{GenderGap, IntensityEntry, ScaleEntry, TrendSummary, largest_increases};
use crate::formatting::{format_change, format_count, format_pct};
use chrono::{DateTime, Local};
use colored::Colorize;
use std::path::Path;

pub struct SummaryPaths<'a> {
    pub(crate) trends: Option<&'a Path>,
    pub(crate) charts: Option<&'a Path>,
    pub(crate) html: Option<&'a Path>,
}

pub struct SummaryContext<'a> {
    pub(crate) observation_count: usize,
    pub(crate) country_count: usize,
    pub(crate) focus_year: i32,
    pub(crate) focus_year_count: usize,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) paths: SummaryPaths<'a>,
    pub(crate) trend_summaries: &'a [TrendSummary],
    pub(crate) increases: &'a [TrendSummary],
    pub(crate) decreases: &'a [TrendSummary],
    pub(crate) gender_gaps: &'a [GenderGap],
    pub(crate) intensity: &'a [IntensityEntry],
    pub(crate) by_count: &'a [ScaleEntry],
    pub(crate) by_percentage: &'a [ScaleEntry],
    pub(crate) located_count: usize,
    pub(crate) full_output: bool,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_paths(&context.paths);

    println!();
    println!("{}", "Trend Change".bold().bright_magenta());
    if context.full_output {
        print_full_trend_table(context.trend_summaries);
    } else {
        print_trend_slice("Largest increases", context.increases);
        print_trend_slice("Largest decreases", context.decreases);
    }

    println!();
    println!(
        "{}",
        format!("Gender Disparity ({})", context.focus_year)
            .bold()
            .bright_magenta()
    );
    print_gap_table(context.gender_gaps);

    println!();
    println!(
        "{}",
        format!("Smoking Intensity ({})", context.focus_year)
            .bold()
            .bright_magenta()
    );
    print_intensity_table(context.intensity);

    println!();
    println!(
        "{}",
        format!("Absolute vs. Relative ({})", context.focus_year)
            .bold()
            .bright_magenta()
    );
    print_scale_tables(context.by_count, context.by_percentage);

    println!();
    println!(
        "{} {}",
        "Geography".bold().bright_magenta(),
        format!(
            "{} of {} focus-year countries have known centroids",
            context.located_count, context.focus_year_count
        )
        .bright_black()
    );
    println!(
        "{}",
        "=============================================================".bright_cyan()
    );
}

fn print_summary_header(context: &SummaryContext<'_>) {
    println!(
        "{}",
        "===================== SmokeTrend Update ====================="
            .bold()
            .bright_cyan()
    );
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    println!(
        "{} {} | {} | {}",
        "Dataset".bright_yellow().bold(),
        format!("Observations: {}", context.observation_count).bright_white(),
        format!("Countries: {}", context.country_count).bright_white(),
        format!(
            "Year {}: {} rows",
            context.focus_year, context.focus_year_count
        )
        .bright_white()
    );
}

fn print_summary_paths(paths: &SummaryPaths<'_>) {
    print_path_line("Trends CSV", paths.trends, "not saved (use --save-trends)");
    print_path_line("Charts", paths.charts, "not saved (use --save-charts)");
    print_path_line("HTML Report", paths.html, "not saved (use --save-html)");
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

fn print_trend_slice(heading: &str, summaries: &[TrendSummary]) {
    if summaries.is_empty() {
        println!("{}", "No trend data available.".bright_black());
        return;
    }
    println!("{}", heading.bold().bright_white());
    println!(
        "{}",
        "Country               | Years     | Start | End   | Change".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+-----------+-------+-------+-------".bright_black()
    );
    for summary in summaries {
        let line = format!(
            "{:<21} | {}-{} | {:>5} | {:>5} | {:>6}",
            summary.country,
            summary.year_start,
            summary.year_end,
            format_pct(summary.percentage_start),
            format_pct(summary.percentage_end),
            format_change(summary.percentage_change)
        );
        println!("{}", line.bright_green());
    }
}

fn print_full_trend_table(summaries: &[TrendSummary]) {
    if summaries.is_empty() {
        println!("{}", "No trend data available.".bright_black());
        return;
    }
    let ranked = largest_increases(summaries, summaries.len());
    println!(
        "{}",
        "Country               | Years     | Start | End   | Change".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+-----------+-------+-------+-------".bright_black()
    );
    for summary in ranked {
        let line = format!(
            "{:<21} | {}-{} | {:>5} | {:>5} | {:>6}",
            summary.country,
            summary.year_start,
            summary.year_end,
            format_pct(summary.percentage_start),
            format_pct(summary.percentage_end),
            format_change(summary.percentage_change)
        );
        println!("{}", line.bright_green());
    }
}

fn print_gap_table(gaps: &[GenderGap]) {
    if gaps.is_empty() {
        println!("{}", "No observations for the focus year.".bright_black());
        return;
    }
    println!(
        "{}",
        "Country               | Male  | Female | Gap".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+-------+--------+------".bright_black()
    );
    for gap in gaps {
        let line = format!(
            "{:<21} | {:>5} | {:>6} | {:>5}",
            gap.country,
            format_pct(gap.pct_male),
            format_pct(gap.pct_female),
            format_change(gap.gap)
        );
        println!("{}", line.bright_green());
    }
}

fn print_intensity_table(entries: &[IntensityEntry]) {
    if entries.is_empty() {
        println!("{}", "No observations for the focus year.".bright_black());
        return;
    }
    println!(
        "{}",
        "Country               | Daily cigarettes".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+-----------------".bright_black()
    );
    for entry in entries {
        let line = format!(
            "{:<21} | {:>16}",
            entry.country,
            format_pct(entry.daily_cigarettes)
        );
        println!("{}", line.bright_green());
    }
}

fn print_scale_tables(by_count: &[ScaleEntry], by_percentage: &[ScaleEntry]) {
    if by_count.is_empty() && by_percentage.is_empty() {
        println!("{}", "No observations for the focus year.".bright_black());
        return;
    }
    println!("{}", "Most smokers".bold().bright_white());
    println!(
        "{}",
        "Country               | Smokers  | Share%".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+----------+-------".bright_black()
    );
    for entry in by_count {
        let line = format!(
            "{:<21} | {:>8} | {:>6}",
            entry.country,
            format_count(entry.smokers_total),
            format_pct(entry.pct_total)
        );
        println!("{}", line.bright_green());
    }
    println!("{}", "Highest share".bold().bright_white());
    println!(
        "{}",
        "Country               | Smokers  | Share%".bold().bright_white()
    );
    println!(
        "{}",
        "----------------------+----------+-------".bright_black()
    );
    for entry in by_percentage {
        let line = format!(
            "{:<21} | {:>8} | {:>6}",
            entry.country,
            format_count(entry.smokers_total),
            format_pct(entry.pct_total)
        );
        println!("{}", line.bright_green());
    }
}
