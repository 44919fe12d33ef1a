// =============================================================================
// Dashboard Page — server-rendered HTML
// =============================================================================
//
// A single self-contained page: metrics row, market mood, multi-indicator
// sentiment, an inline SVG line chart of recent closes, the TradingView
// embed and the news list. The page reloads itself every refresh period.
// All dynamic text goes through `escape_html`.
// =============================================================================

use std::fmt::Write as _;

use crate::app_state::DashboardSnapshot;
use crate::engine::{ChartPoint, MarketReport};
use crate::news::rss::NO_LINK;
use crate::news::NewsItem;
use crate::types::{MarketMood, SentimentLabel};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 240.0;
const CHART_PAD: f64 = 8.0;

const STYLE: &str = r#"
body { background-color: #0E1117; color: #FAFAFA; font-family: sans-serif; margin: 0 auto; max-width: 1100px; padding: 1.5rem; }
h1, h2, h3 { color: #FFD700; }
a { color: #FFD700; }
hr { border: 1px solid #FFD700; }
.caption { color: #A0A0A0; font-size: 0.85rem; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric { background: #161A23; border-radius: 8px; padding: 0.8rem 1rem; }
.metric .label { color: #A0A0A0; font-size: 0.85rem; }
.metric .value { font-size: 1.6rem; margin-top: 0.3rem; }
.buy { color: #3FB950; }
.sell { color: #F85149; }
.neutral { color: #E3B341; }
.error { background: #3B1219; border: 1px solid #F85149; border-radius: 6px; padding: 0.8rem 1rem; }
table.votes td { padding: 0.2rem 1rem 0.2rem 0; }
"#;

// =============================================================================
// Public entry point
// =============================================================================

/// Render the dashboard for `snapshot` (`None` before the first cycle).
pub fn render_dashboard(snapshot: Option<&DashboardSnapshot>, refresh_secs: u64) -> String {
    let mut html = String::with_capacity(16 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{refresh_secs}\">\n\
         <title>Gold (XAU/USD) Dashboard</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
    );

    html.push_str("<h1>Gold (XAU/USD) Live Dashboard</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"caption\">Auto-refreshing every {}. Technical summary, sentiment, news and chart.</p>",
        escape_html(&describe_period(refresh_secs))
    );

    match snapshot {
        None => {
            html.push_str("<p class=\"caption\">Waiting for the first refresh cycle.</p>\n");
        }
        Some(snap) => {
            match (&snap.market, &snap.market_error) {
                (Some(report), _) => render_market(&mut html, report, snap),
                (None, Some(msg)) => render_error(&mut html, msg),
                (None, None) => {}
            }

            if let Some(url) = &snap.chart_widget_url {
                html.push_str("<h2>Live TradingView Chart</h2>\n");
                let _ = writeln!(
                    html,
                    "<iframe src=\"{}\" width=\"100%\" height=\"500\" frameborder=\"0\" \
                     allowtransparency=\"true\" scrolling=\"no\"></iframe>",
                    escape_html(url)
                );
            }

            html.push_str("<h2>Latest Gold News</h2>\n");
            match &snap.news_error {
                Some(msg) => render_error(&mut html, msg),
                None => render_news(&mut html, &snap.news),
            }

            let _ = writeln!(
                html,
                "<p class=\"caption\">Updated {} (cycle {})</p>",
                snap.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                snap.cycle_id
            );
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

// =============================================================================
// Sections
// =============================================================================

fn render_market(html: &mut String, report: &MarketReport, snap: &DashboardSnapshot) {
    let change = report
        .change_pct
        .map(|c| format!("{c:.2} %"))
        .unwrap_or_else(|| "n/a".to_string());
    let rsi = report
        .indicators
        .rsi
        .map(|r| format!("{r:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    let (summary_text, summary_class) = match report.summary {
        Some(label) => (label.to_string(), label_class(label)),
        None => ("n/a".to_string(), "neutral"),
    };

    html.push_str("<div class=\"metrics\">\n");
    metric(html, "Price (USD)", &format_price(report.last_price), "");
    metric(html, "Change (1h)", &change, "");
    metric(html, "RSI (14)", &rsi, "");
    metric(html, "Summary", &summary_text, summary_class);
    html.push_str("</div>\n");

    if snap.served_by_fallback {
        let _ = writeln!(
            html,
            "<p class=\"caption\">Spot data unavailable; showing {}.</p>",
            escape_html(&report.symbol)
        );
    }

    html.push_str("<h2>Market Sentiment</h2>\n");
    match report.mood {
        Some(mood) => {
            let _ = writeln!(
                html,
                "<p><strong>Current sentiment:</strong> <span class=\"{}\">{}</span></p>",
                mood_class(mood),
                mood
            );
        }
        None => html.push_str("<p><strong>Current sentiment:</strong> n/a</p>\n"),
    }

    if let Some(sentiment) = &report.sentiment {
        let _ = writeln!(
            html,
            "<p><strong>Multi-indicator:</strong> <span class=\"{}\">{}</span> \
             ({}% bullish / {}% bearish)</p>",
            label_class(sentiment.label),
            sentiment.label,
            sentiment.bullish_pct,
            sentiment.bearish_pct
        );
        html.push_str("<table class=\"votes\">\n");
        for v in &sentiment.votes {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&v.indicator.to_uppercase()),
                v.vote
            );
        }
        html.push_str("</table>\n");
    }

    let ind = &report.indicators;
    let mut details = Vec::new();
    if let Some(m) = ind.macd {
        details.push(format!(
            "MACD {:.2} / signal {:.2} / histogram {:.2}",
            m.macd, m.signal, m.histogram
        ));
    }
    if let (Some(fast), Some(slow)) = (ind.ema_fast, ind.ema_slow) {
        details.push(format!("EMA fast {fast:.2} / slow {slow:.2}"));
    }
    if !details.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"caption\">{}</p>",
            escape_html(&details.join(" | "))
        );
    }

    if report.chart.len() >= 2 {
        html.push_str("<h2>Recent Closes</h2>\n");
        html.push_str(&render_line_chart(&report.chart));
    }
}

fn render_news(html: &mut String, news: &[NewsItem]) {
    if news.is_empty() {
        html.push_str("<p class=\"caption\">No headlines.</p>\n");
        return;
    }
    for item in news {
        let _ = writeln!(
            html,
            "<p><strong><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></strong><br>\
             <span class=\"caption\">{}</span></p>\n<hr>",
            escape_html(safe_href(&item.link)),
            escape_html(&item.title),
            escape_html(&item.published)
        );
    }
}

fn render_error(html: &mut String, msg: &str) {
    let _ = writeln!(html, "<div class=\"error\">{}</div>", escape_html(msg));
}

fn metric(html: &mut String, label: &str, value: &str, class: &str) {
    let _ = writeln!(
        html,
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value {}\">{}</div></div>",
        escape_html(label),
        class,
        escape_html(value)
    );
}

// =============================================================================
// SVG chart
// =============================================================================

/// Polyline of closes scaled into a fixed viewBox.
fn render_line_chart(points: &[ChartPoint]) -> String {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.close), hi.max(p.close))
        });
    let span = if max > min { max - min } else { 1.0 };
    let step = (CHART_WIDTH - 2.0 * CHART_PAD) / (points.len() - 1) as f64;

    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = CHART_PAD + i as f64 * step;
            let y = CHART_PAD + (max - p.close) / span * (CHART_HEIGHT - 2.0 * CHART_PAD);
            format!("{x:.1},{y:.1}")
        })
        .collect();

    format!(
        "<svg viewBox=\"0 0 {w} {h}\" width=\"100%\" height=\"{h}\" preserveAspectRatio=\"none\" \
         role=\"img\" aria-label=\"Recent closes\">\
         <rect width=\"{w}\" height=\"{h}\" fill=\"#161A23\"/>\
         <polyline fill=\"none\" stroke=\"#FFD700\" stroke-width=\"2\" points=\"{pts}\"/>\
         </svg>\n<p class=\"caption\">Low {lo} / High {hi}</p>\n",
        w = CHART_WIDTH,
        h = CHART_HEIGHT,
        pts = coords.join(" "),
        lo = format_price(min),
        hi = format_price(max),
    )
}

// =============================================================================
// Helpers
// =============================================================================

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `link` when it is an absolute http(s) URL, otherwise the `#` placeholder.
pub fn safe_href(link: &str) -> &str {
    match reqwest::Url::parse(link.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => link,
        _ => NO_LINK,
    }
}

/// `2345.678` -> `"2,345.68"`.
pub fn format_price(v: f64) -> String {
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn describe_period(secs: u64) -> String {
    match secs {
        s if s % 60 == 0 && s >= 60 => {
            let m = s / 60;
            if m == 1 {
                "1 minute".to_string()
            } else {
                format!("{m} minutes")
            }
        }
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

fn label_class(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::StrongBuy | SentimentLabel::Buy => "buy",
        SentimentLabel::StrongSell | SentimentLabel::Sell => "sell",
        SentimentLabel::Neutral => "neutral",
    }
}

fn mood_class(mood: MarketMood) -> &'static str {
    match mood {
        MarketMood::Bullish => "buy",
        MarketMood::Bearish => "sell",
        MarketMood::Neutral => "neutral",
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::tests::empty_snapshot;
    use crate::engine::IndicatorSet;
    use crate::types::RsiStyle;
    use chrono::{Duration, TimeZone, Utc};

    fn report() -> MarketReport {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        MarketReport {
            symbol: "XAUUSD=X".to_string(),
            last_price: 2345.5,
            last_timestamp: start + Duration::hours(2),
            change_pct: Some(1.0),
            rsi_style: RsiStyle::SimpleAverage,
            indicators: IndicatorSet {
                rsi: Some(25.0),
                ..IndicatorSet::default()
            },
            summary: Some(SentimentLabel::Buy),
            mood: Some(MarketMood::Bullish),
            sentiment: None,
            chart: (0..3)
                .map(|i| ChartPoint {
                    timestamp: start + Duration::hours(i),
                    close: 2340.0 + i as f64,
                    rsi: None,
                })
                .collect(),
        }
    }

    #[test]
    fn escape_html_handles_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn safe_href_keeps_only_http_links() {
        assert_eq!(safe_href("https://example.com/a"), "https://example.com/a");
        assert_eq!(safe_href("http://example.com"), "http://example.com");
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href("  JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("data:text/html,<b>x</b>"), "#");
        assert_eq!(safe_href("/relative/path"), "#");
        assert_eq!(safe_href("#"), "#");
    }

    #[test]
    fn script_links_in_news_are_not_clickable() {
        let mut snap = empty_snapshot();
        snap.news = vec![NewsItem {
            title: "Gold spikes".to_string(),
            link: "javascript:alert(document.cookie)".to_string(),
            published: String::new(),
        }];
        let html = render_dashboard(Some(&snap), 180);
        assert!(!html.contains("javascript:"));
        assert!(html.contains("<a href=\"#\""));
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(2345.678), "2,345.68");
        assert_eq!(format_price(999.0), "999.00");
        assert_eq!(format_price(1234567.0), "1,234,567.00");
        assert_eq!(format_price(-1900.5), "-1,900.50");
    }

    #[test]
    fn describe_period_prefers_minutes() {
        assert_eq!(describe_period(180), "3 minutes");
        assert_eq!(describe_period(60), "1 minute");
        assert_eq!(describe_period(30), "30 seconds");
    }

    #[test]
    fn page_before_first_cycle() {
        let html = render_dashboard(None, 180);
        assert!(html.contains("content=\"180\""));
        assert!(html.contains("Waiting for the first refresh cycle"));
    }

    #[test]
    fn page_shows_data_unavailable_message() {
        let snap = empty_snapshot();
        let html = render_dashboard(Some(&snap), 180);
        assert!(html.contains("Failed to fetch data. Try again later."));
        assert!(!html.contains("Price (USD)"));
    }

    #[test]
    fn page_renders_metrics_chart_and_escaped_news() {
        let mut snap = empty_snapshot();
        snap.market_error = None;
        snap.market = Some(report());
        snap.news = vec![NewsItem {
            title: "Gold <script>alert(1)</script> rallies".to_string(),
            link: "https://example.com/a?b=1&c=2".to_string(),
            published: "Wed, 01 May 2024".to_string(),
        }];

        let html = render_dashboard(Some(&snap), 180);
        assert!(html.contains("2,345.50"));
        assert!(html.contains("1.00 %"));
        assert!(html.contains("25.00"));
        assert!(html.contains("Bullish"));
        assert!(html.contains("<polyline"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("b=1&amp;c=2"));
    }

    #[test]
    fn news_error_replaces_list() {
        let mut snap = empty_snapshot();
        snap.news_error = Some("Couldn't fetch news feed. Try again later. (timeout)".to_string());
        let html = render_dashboard(Some(&snap), 180);
        assert!(html.contains("Couldn&#39;t fetch news feed. Try again later. (timeout)"));
    }
}
