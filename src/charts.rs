//! Server-side SVG rendering for the five analyses.
//!
//! Charts are plain SVG strings with no client-side script, suitable both
//! as standalone files and for inline embedding in the HTML report.

use crate::analysis::GeoPoint;
use crate::formatting::format_count;
use std::fmt::Write as FmtWrite;

const BAR_WIDTH: f64 = 640.0;
const BAR_HEIGHT: f64 = 360.0;
const BAR_MARGIN_LEFT: f64 = 64.0;
const BAR_MARGIN_RIGHT: f64 = 20.0;
const BAR_MARGIN_TOP: f64 = 48.0;
const BAR_MARGIN_BOTTOM: f64 = 72.0;

const SCATTER_WIDTH: f64 = 760.0;
const SCATTER_HEIGHT: f64 = 420.0;
const SCATTER_MARGIN: f64 = 48.0;

const AXIS_TICKS: usize = 4;

#[derive(Debug, Clone)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
}

pub struct BarChart<'a> {
    pub title: &'a str,
    pub value_label: &'a str,
    pub data: &'a [BarDatum],
    pub fill: &'a str,
    /// Log10 value axis, used for absolute smoker counts where the spread
    /// covers several orders of magnitude.
    pub log_scale: bool,
}

/// All rendered charts for one run, in report order.
pub struct ChartSet {
    pub trend_increase: String,
    pub trend_decrease: String,
    pub gender_gap: String,
    pub intensity: String,
    pub scale_absolute: String,
    pub scale_percentage: String,
    pub geography: String,
}

impl ChartSet {
    /// (file stem, svg) pairs for --save-charts.
    pub fn files(&self) -> [(&'static str, &str); 7] {
        [
            ("trend_increase", self.trend_increase.as_str()),
            ("trend_decrease", self.trend_decrease.as_str()),
            ("gender_gap", self.gender_gap.as_str()),
            ("intensity", self.intensity.as_str()),
            ("scale_absolute", self.scale_absolute.as_str()),
            ("scale_percentage", self.scale_percentage.as_str()),
            ("geography", self.geography.as_str()),
        ]
    }
}

pub fn render_bar_chart(chart: &BarChart<'_>) -> String {
    let mut svg = String::new();
    push_svg_open(&mut svg, BAR_WIDTH, BAR_HEIGHT);
    push_title(&mut svg, chart.title, BAR_WIDTH);

    if chart.data.is_empty() {
        push_empty_note(&mut svg, BAR_WIDTH, BAR_HEIGHT);
        svg.push_str("</svg>\n");
        return svg;
    }

    let plot_w = BAR_WIDTH - BAR_MARGIN_LEFT - BAR_MARGIN_RIGHT;
    let plot_h = BAR_HEIGHT - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;

    let scaled: Vec<f64> = chart
        .data
        .iter()
        .map(|datum| scale_value(datum.value, chart.log_scale))
        .collect();
    let finite = scaled.iter().copied().filter(|v| v.is_finite());
    let hi = finite.clone().fold(0.0_f64, f64::max);
    let lo = finite.fold(0.0_f64, f64::min);
    let span = (hi - lo).max(f64::EPSILON);

    // y pixel for a scaled value; axis zero sits between lo and hi when
    // the data mixes signs.
    let y_of = |value: f64| BAR_MARGIN_TOP + (hi - value) / span * plot_h;

    push_value_axis(&mut svg, chart, lo, hi, &y_of);

    let slot = plot_w / chart.data.len() as f64;
    let bar_w = slot * 0.6;
    let baseline = y_of(0.0);

    for (idx, datum) in chart.data.iter().enumerate() {
        let x_center = BAR_MARGIN_LEFT + slot * (idx as f64 + 0.5);
        let x = x_center - bar_w / 2.0;
        let value = scaled[idx];

        if value.is_finite() {
            let y_value = y_of(value);
            let (top, height) = if value >= 0.0 {
                (y_value, baseline - y_value)
            } else {
                (baseline, y_value - baseline)
            };
            let _ = write!(
                svg,
                "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{bar_w:.1}\" height=\"{height:.1}\" fill=\"{}\" rx=\"2\"/>\n",
                chart.fill
            );
            let label_y = if value >= 0.0 { top - 6.0 } else { top + height + 14.0 };
            let _ = write!(
                svg,
                "<text class=\"value\" x=\"{x_center:.1}\" y=\"{label_y:.1}\">{}</text>\n",
                escape_xml(&format_bar_value(datum.value, chart.log_scale))
            );
        } else {
            let _ = write!(
                svg,
                "<text class=\"value\" x=\"{x_center:.1}\" y=\"{:.1}\">-</text>\n",
                baseline - 6.0
            );
        }

        let label_y = BAR_MARGIN_TOP + plot_h + 18.0;
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{x_center:.1}\" y=\"{label_y:.1}\" transform=\"rotate(-30 {x_center:.1} {label_y:.1})\" text-anchor=\"end\">{}</text>\n",
            escape_xml(&datum.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn render_scatter_chart(title: &str, points: &[GeoPoint]) -> String {
    let mut svg = String::new();
    push_svg_open(&mut svg, SCATTER_WIDTH, SCATTER_HEIGHT);
    push_title(&mut svg, title, SCATTER_WIDTH);

    if points.is_empty() {
        push_empty_note(&mut svg, SCATTER_WIDTH, SCATTER_HEIGHT);
        svg.push_str("</svg>\n");
        return svg;
    }

    let plot_w = SCATTER_WIDTH - 2.0 * SCATTER_MARGIN;
    let plot_h = SCATTER_HEIGHT - 2.0 * SCATTER_MARGIN;
    let x_of = |lon: f64| SCATTER_MARGIN + (lon + 180.0) / 360.0 * plot_w;
    let y_of = |lat: f64| SCATTER_MARGIN + (90.0 - lat) / 180.0 * plot_h;

    // Graticule every 60 degrees of longitude, 30 of latitude.
    let mut lon = -180;
    while lon <= 180 {
        let x = x_of(f64::from(lon));
        let _ = write!(
            svg,
            "<line class=\"grid\" x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\"/>\n",
            SCATTER_MARGIN,
            SCATTER_MARGIN + plot_h
        );
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{lon}</text>\n",
            SCATTER_MARGIN + plot_h + 16.0
        );
        lon += 60;
    }
    let mut lat = -90;
    while lat <= 90 {
        let y = y_of(f64::from(lat));
        let _ = write!(
            svg,
            "<line class=\"grid\" x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>\n",
            SCATTER_MARGIN,
            SCATTER_MARGIN + plot_w
        );
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{lat}</text>\n",
            SCATTER_MARGIN - 6.0,
            y + 4.0
        );
        lat += 30;
    }

    let max_pct = points
        .iter()
        .map(|p| p.pct_total)
        .filter(|v| v.is_finite())
        .fold(f64::EPSILON, f64::max);

    for point in points {
        let x = x_of(point.longitude);
        let y = y_of(point.latitude);
        let ratio = if point.pct_total.is_finite() {
            (point.pct_total / max_pct).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let radius = 4.0 + ratio * 14.0;
        let opacity = 0.35 + ratio * 0.55;
        let _ = write!(
            svg,
            "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"{radius:.1}\" fill=\"#2a9d8f\" fill-opacity=\"{opacity:.2}\" stroke=\"#1d6f65\"/>\n"
        );
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            x + radius + 4.0,
            y + 4.0,
            escape_xml(&point.country)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn push_svg_open(svg: &mut String, width: f64, height: f64) {
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width:.0} {height:.0}\" width=\"{width:.0}\" height=\"{height:.0}\">\n"
    );
    svg.push_str(
        "<style>\n\
         text { font-family: sans-serif; fill: #33302b; }\n\
         .title { font-size: 15px; font-weight: 600; text-anchor: middle; }\n\
         .tick { font-size: 10px; fill: #6b635b; }\n\
         .value { font-size: 10px; text-anchor: middle; }\n\
         .axis-label { font-size: 11px; fill: #6b635b; text-anchor: middle; }\n\
         .grid { stroke: #d9d2c6; stroke-width: 0.5; stroke-dasharray: 3 3; }\n\
         .axis { stroke: #9a9288; stroke-width: 1; }\n\
         .note { font-size: 12px; fill: #6b635b; text-anchor: middle; }\n\
         </style>\n",
    );
    let _ = write!(
        svg,
        "<rect x=\"0\" y=\"0\" width=\"{width:.0}\" height=\"{height:.0}\" fill=\"#fdfbf7\"/>\n"
    );
}

fn push_title(svg: &mut String, title: &str, width: f64) {
    let _ = write!(
        svg,
        "<text class=\"title\" x=\"{:.1}\" y=\"24\">{}</text>\n",
        width / 2.0,
        escape_xml(title)
    );
}

fn push_empty_note(svg: &mut String, width: f64, height: f64) {
    let _ = write!(
        svg,
        "<text class=\"note\" x=\"{:.1}\" y=\"{:.1}\">No data available.</text>\n",
        width / 2.0,
        height / 2.0
    );
}

fn push_value_axis<F>(svg: &mut String, chart: &BarChart<'_>, lo: f64, hi: f64, y_of: &F)
where
    F: Fn(f64) -> f64,
{
    let _ = write!(
        svg,
        "<line class=\"axis\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\"/>\n",
        BAR_MARGIN_LEFT,
        BAR_MARGIN_TOP,
        BAR_MARGIN_LEFT,
        BAR_HEIGHT - BAR_MARGIN_BOTTOM
    );
    for step in 0..=AXIS_TICKS {
        let value = lo + (hi - lo) * step as f64 / AXIS_TICKS as f64;
        let y = y_of(value);
        let _ = write!(
            svg,
            "<line class=\"grid\" x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>\n",
            BAR_MARGIN_LEFT,
            BAR_WIDTH - BAR_MARGIN_RIGHT
        );
        let _ = write!(
            svg,
            "<text class=\"tick\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            BAR_MARGIN_LEFT - 6.0,
            y + 3.0,
            escape_xml(&format_axis_value(value, chart.log_scale))
        );
    }
    let _ = write!(
        svg,
        "<text class=\"axis-label\" x=\"16\" y=\"{:.1}\" transform=\"rotate(-90 16 {:.1})\">{}</text>\n",
        BAR_HEIGHT / 2.0,
        BAR_HEIGHT / 2.0,
        escape_xml(chart.value_label)
    );
}

fn scale_value(value: f64, log_scale: bool) -> f64 {
    if log_scale {
        if value.is_finite() && value > 0.0 {
            value.log10()
        } else {
            f64::NAN
        }
    } else {
        value
    }
}

fn format_axis_value(value: f64, log_scale: bool) -> String {
    if log_scale {
        format_count(10.0_f64.powf(value))
    } else {
        format!("{value:.1}")
    }
}

fn format_bar_value(value: f64, log_scale: bool) -> String {
    if log_scale {
        format_count(value)
    } else {
        format!("{value:.1}")
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_chart_emits_one_rect_per_finite_value() {
        let data = vec![
            BarDatum {
                label: "Afghanistan".to_string(),
                value: 15.6,
            },
            BarDatum {
                label: "Nepal".to_string(),
                value: 9.2,
            },
        ];
        let chart = BarChart {
            title: "Largest increases",
            value_label: "Percentage points",
            data: &data,
            fill: "#3d6fb4",
            log_scale: false,
        };
        let svg = render_bar_chart(&chart);
        assert_eq!(svg.matches("<rect").count(), 3); // background + 2 bars
        assert!(svg.contains("Afghanistan"));
        assert!(svg.contains("15.6"));
    }

    #[test]
    fn negative_values_render_below_baseline() {
        let data = vec![BarDatum {
            label: "Canada".to_string(),
            value: -12.0,
        }];
        let chart = BarChart {
            title: "Largest decreases",
            value_label: "Percentage points",
            data: &data,
            fill: "#b44a3d",
            log_scale: false,
        };
        let svg = render_bar_chart(&chart);
        assert!(svg.contains("-12.0"));
    }

    #[test]
    fn labels_are_escaped() {
        let data = vec![BarDatum {
            label: "C\u{f4}te d'Ivoire <test>".to_string(),
            value: 3.0,
        }];
        let chart = BarChart {
            title: "x",
            value_label: "y",
            data: &data,
            fill: "#000",
            log_scale: false,
        };
        let svg = render_bar_chart(&chart);
        assert!(svg.contains("&lt;test&gt;"));
        assert!(svg.contains("&#39;"));
    }

    #[test]
    fn empty_data_renders_a_note() {
        let chart = BarChart {
            title: "x",
            value_label: "y",
            data: &[],
            fill: "#000",
            log_scale: false,
        };
        let svg = render_bar_chart(&chart);
        assert!(svg.contains("No data available."));
    }

    #[test]
    fn scatter_places_points_by_coordinates() {
        let points = vec![GeoPoint {
            country: "China".to_string(),
            latitude: 35.86166,
            longitude: 104.195_397,
            pct_total: 25.0,
        }];
        let svg = render_scatter_chart("Geography", &points);
        assert!(svg.contains("<circle"));
        assert!(svg.contains("China"));
    }
}
