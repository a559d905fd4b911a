use crate::charts::ChartSet;
use crate::write_output_file;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::Path;

pub struct HtmlReportPaths<'a> {
    pub(crate) trends: Option<&'a Path>,
    pub(crate) charts: Option<&'a Path>,
}

pub struct HtmlReportContext<'a> {
    pub(crate) observation_count: usize,
    pub(crate) country_count: usize,
    pub(crate) focus_year: i32,
    pub(crate) focus_year_count: usize,
    pub(crate) top_n: usize,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) charts: &'a ChartSet,
    pub(crate) paths: HtmlReportPaths<'a>,
    pub(crate) output_path: &'a Path,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context);
    write_output_file(output_path, html.as_bytes()).await
}

fn render_html_report(context: &HtmlReportContext<'_>) -> String {
    let generated_at = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    let title = format!(
        "SmokeTrend Report - {}",
        context.run_started_at.format("%Y-%m-%d")
    );

    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str("<meta name=\"color-scheme\" content=\"light\">\n");
    html.push_str("<style>\n");
    html.push_str(REPORT_STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str("<div class=\"page\">\n");

    html.push_str("<header class=\"hero\">\n");
    html.push_str(&format!(
        "<div class=\"pill\">SmokeTrend v{}</div>\n",
        env!("CARGO_PKG_VERSION")
    ));
    html.push_str("<h1>SmokeTrend Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"subtitle\">Country-level smoking statistics: long-term trend change plus cross-sectional rankings for {}.</p>\n",
        context.focus_year
    ));
    html.push_str("<div class=\"meta\">\n");
    html.push_str(&format!(
        "<div><span class=\"label\">Generated</span><span class=\"value mono\">{}</span></div>\n",
        escape_html(&generated_at)
    ));
    html.push_str(&format!(
        "<div><span class=\"label\">Top N per ranking</span><span class=\"value mono\">{}</span></div>\n",
        context.top_n
    ));
    html.push_str("</div>\n</header>\n");

    html.push_str("<section class=\"cards\">\n");
    html.push_str(&format!(
        "<div class=\"card\"><div class=\"card-label\">Observations</div><div class=\"card-value\">{}</div></div>\n",
        context.observation_count
    ));
    html.push_str(&format!(
        "<div class=\"card\"><div class=\"card-label\">Countries</div><div class=\"card-value\">{}</div></div>\n",
        context.country_count
    ));
    html.push_str(&format!(
        "<div class=\"card\"><div class=\"card-label\">Focus year</div><div class=\"card-value\">{}</div></div>\n",
        context.focus_year
    ));
    html.push_str(&format!(
        "<div class=\"card\"><div class=\"card-label\">Rows in focus year</div><div class=\"card-value\">{}</div></div>\n",
        context.focus_year_count
    ));
    html.push_str("</section>\n");

    push_chart_section(
        &mut html,
        "Trend change",
        "Change in total smoking percentage between each country's first and last observed year.",
        &[
            &context.charts.trend_increase,
            &context.charts.trend_decrease,
        ],
    );
    push_chart_section(
        &mut html,
        "Gender disparity",
        "Male minus female smoking percentage in the focus year.",
        &[&context.charts.gender_gap],
    );
    push_chart_section(
        &mut html,
        "Smoking intensity",
        "Average daily cigarettes smoked in the focus year.",
        &[&context.charts.intensity],
    );
    push_chart_section(
        &mut html,
        "Absolute vs. relative",
        "Total smokers (log scale) against smoking percentage in the focus year.",
        &[
            &context.charts.scale_absolute,
            &context.charts.scale_percentage,
        ],
    );
    push_chart_section(
        &mut html,
        "Geography",
        "Smoking percentage plotted at country centroids; countries without a known centroid are omitted.",
        &[&context.charts.geography],
    );

    html.push_str(&render_downloads(context));

    html.push_str("<footer class=\"footer\">\n");
    html.push_str("<div>Source: per-country, per-year smoking statistics CSV.</div>\n");
    html.push_str("</footer>\n");
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn push_chart_section(html: &mut String, heading: &str, hint: &str, charts: &[&String]) {
    html.push_str("<section class=\"chart-section\">\n");
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(heading)));
    html.push_str(&format!(
        "<div class=\"hint\">{}</div>\n",
        escape_html(hint)
    ));
    html.push_str("<div class=\"chart-grid\">\n");
    for chart in charts {
        html.push_str("<div class=\"chart\">\n");
        html.push_str(chart);
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n</section>\n");
}

fn render_downloads(context: &HtmlReportContext<'_>) -> String {
    let items = [
        ("Trend summaries CSV", context.paths.trends),
        ("Chart directory", context.paths.charts),
    ];
    let any_saved = items.iter().any(|(_, path)| path.is_some());

    let mut section = String::new();
    section.push_str("<section class=\"downloads\">\n");
    section.push_str("<h3>Downloads</h3>\n");
    if !any_saved {
        section.push_str(
            "<p class=\"muted\">No files were saved. Use --save-trends or --save-charts.</p>\n",
        );
        section.push_str("</section>\n");
        return section;
    }

    section.push_str("<div class=\"download-list\">\n");
    for (label, path) in items {
        section.push_str("<div class=\"download-item\">\n");
        section.push_str(&format!(
            "<div class=\"download-label\">{}</div>\n",
            escape_html(label)
        ));
        if let Some(path) = path {
            let full_display = path.to_string_lossy();
            let display_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(full_display.as_ref());
            if let Some(rel) = relative_link(context.output_path, path) {
                section.push_str(&format!(
                    "<a class=\"download-link\" href=\"{}\" title=\"{}\">{}</a>\n",
                    escape_html(&rel),
                    escape_html(full_display.as_ref()),
                    escape_html(display_name)
                ));
            } else {
                section.push_str(&format!(
                    "<span class=\"download-path\" title=\"{}\">{}</span>\n",
                    escape_html(full_display.as_ref()),
                    escape_html(display_name)
                ));
            }
        } else {
            section.push_str("<span class=\"download-path\">Not saved</span>\n");
        }
        section.push_str("</div>\n");
    }
    section.push_str("</div>\n</section>\n");
    section
}

fn relative_link(html_path: &Path, target: &Path) -> Option<String> {
    let html_dir = html_path.parent()?;
    let target_dir = target.parent()?;
    if html_dir == target_dir {
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(std::string::ToString::to_string)
    } else {
        None
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const REPORT_STYLE: &str = r#"
:root {
  color-scheme: light;
  --bg: #f6f3ec;
  --ink: #1f1b16;
  --muted: #6b635b;
  --card: #ffffff;
  --accent: #2a9d8f;
  --border: #e2d6c6;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: "Segoe UI", sans-serif;
  color: var(--ink);
  background: var(--bg);
}

.page {
  max-width: 1080px;
  margin: 0 auto;
  padding: 40px 24px 56px;
}

.hero {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 18px;
  padding: 28px 32px;
}

.pill {
  display: inline-flex;
  padding: 5px 12px;
  border-radius: 999px;
  background: rgba(42, 157, 143, 0.14);
  color: var(--accent);
  font-size: 12px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.08em;
}

h1 {
  font-size: clamp(2rem, 4vw, 2.8rem);
  margin: 14px 0 8px;
}

.subtitle {
  margin: 0 0 16px;
  color: var(--muted);
  max-width: 640px;
  line-height: 1.5;
}

.meta {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 12px;
}

.label {
  display: block;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: var(--muted);
  margin-bottom: 4px;
}

.value {
  font-weight: 600;
}

.mono {
  font-family: ui-monospace, "SFMono-Regular", monospace;
}

.cards {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
  gap: 14px;
  margin: 24px 0;
}

.card {
  background: var(--card);
  border-radius: 14px;
  padding: 16px 18px;
  border: 1px solid var(--border);
}

.card-label {
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: var(--muted);
  margin-bottom: 6px;
}

.card-value {
  font-size: 24px;
  font-weight: 600;
  color: var(--accent);
}

.chart-section {
  margin: 28px 0;
}

.chart-section h2 {
  margin: 0 0 4px;
  font-size: 1.5rem;
}

.hint {
  color: var(--muted);
  font-size: 13px;
  margin-bottom: 14px;
}

.chart-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
  gap: 14px;
}

.chart {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 10px;
  overflow: auto;
}

.chart svg {
  display: block;
  max-width: 100%;
  height: auto;
}

.downloads {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 18px 22px;
}

.downloads h3 {
  margin: 0 0 12px;
  font-size: 1.2rem;
}

.download-list {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 12px;
}

.download-item {
  padding: 12px 14px;
  border-radius: 10px;
  border: 1px solid var(--border);
  background: rgba(246, 243, 236, 0.6);
}

.download-label {
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.08em;
  color: var(--muted);
  margin-bottom: 6px;
}

.download-link,
.download-path {
  color: var(--accent);
  font-weight: 600;
  text-decoration: none;
  word-break: break-all;
}

.download-link:hover {
  text-decoration: underline;
}

.muted {
  color: var(--muted);
}

.footer {
  margin-top: 24px;
  color: var(--muted);
  font-size: 13px;
  text-align: center;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn stub_charts() -> ChartSet {
        ChartSet {
            trend_increase: "<svg>inc</svg>".to_string(),
            trend_decrease: "<svg>dec</svg>".to_string(),
            gender_gap: "<svg>gap</svg>".to_string(),
            intensity: "<svg>cig</svg>".to_string(),
            scale_absolute: "<svg>abs</svg>".to_string(),
            scale_percentage: "<svg>rel</svg>".to_string(),
            geography: "<svg>geo</svg>".to_string(),
        }
    }

    #[test]
    fn report_embeds_all_charts() {
        let charts = stub_charts();
        let output_path = PathBuf::from("data/output/report.html");
        let context = HtmlReportContext {
            observation_count: 4,
            country_count: 2,
            focus_year: 2012,
            focus_year_count: 2,
            top_n: 5,
            run_started_at: &Local::now(),
            charts: &charts,
            paths: HtmlReportPaths {
                trends: None,
                charts: None,
            },
            output_path: &output_path,
        };
        let html = render_html_report(&context);
        for fragment in ["inc", "dec", "gap", "cig", "abs", "rel", "geo"] {
            assert!(html.contains(fragment), "missing chart {fragment}");
        }
        assert!(html.contains("No files were saved."));
    }

    #[test]
    fn sibling_outputs_get_relative_links() {
        let html_path = PathBuf::from("data/output/report.html");
        let csv_path = PathBuf::from("data/output/trend_summaries.csv");
        assert_eq!(
            relative_link(&html_path, &csv_path).as_deref(),
            Some("trend_summaries.csv")
        );
        let elsewhere = PathBuf::from("other/trend_summaries.csv");
        assert_eq!(relative_link(&html_path, &elsewhere), None);
    }
}
