//! Match summary email: subject, plain-text body, and HTML body.

use std::fmt::Write as _;

use crate::matching::engine::Match;
use crate::models::investor::Investor;
use crate::notify::EmailMessage;

/// Matches listed in full; the rest are summarized as a count.
pub const TOP_MATCHES: usize = 5;

const TEXT_EXCERPT_CHARS: usize = 120;
const HTML_EXCERPT_CHARS: usize = 150;

/// Builds the summary email for an investor. `matches` must be ranked already.
pub fn build_match_summary(
    investor: &Investor,
    matches: &[Match],
    dashboard_url: &str,
) -> EmailMessage {
    let remaining = matches.len().saturating_sub(TOP_MATCHES);
    let top = &matches[..matches.len().min(TOP_MATCHES)];

    EmailMessage {
        to: investor.email.clone(),
        subject: format!("{} Startup Matches Found!", matches.len()),
        text_body: render_text(investor, matches.len(), top, remaining, dashboard_url),
        html_body: render_html(investor, matches.len(), top, remaining, dashboard_url),
    }
}

fn render_text(
    investor: &Investor,
    total: usize,
    top: &[Match],
    remaining: usize,
    dashboard_url: &str,
) -> String {
    let mut out = format!(
        "Hello {}!\n\nWe found {total} startup(s) matching your investment preferences.\n\nTOP MATCHES:\n\n",
        investor.name
    );

    for (i, m) in top.iter().enumerate() {
        let _ = write!(
            out,
            "{}. {} - {}\n   Stage: {} | Funding: {}\n   Match Score: {}%\n   Location: {}\n   {}\n   Website: {}\n\n",
            i + 1,
            m.name,
            m.industry,
            m.funding_stage,
            funding_label(m.funding_amount),
            m.match_score,
            m.location,
            excerpt(&m.description, TEXT_EXCERPT_CHARS),
            m.website,
        );
    }

    if remaining > 0 {
        let _ = writeln!(out, "... and {remaining} more matches!\n");
    }

    let _ = write!(
        out,
        "Your preferences:\n  Industries: {}\n  Stages: {}\n\nExplore all your matches: {dashboard_url}\n",
        preference_label(&investor.preferred_industries),
        preference_label(&investor.preferred_funding_stages),
    );
    out
}

fn render_html(
    investor: &Investor,
    total: usize,
    top: &[Match],
    remaining: usize,
    dashboard_url: &str,
) -> String {
    let mut out = format!(
        "<html>\n<head></head>\n<body>\n<h2>Hello {}!</h2>\n<p>We found <strong>{total}</strong> startup(s) matching your investment preferences.</p>\n<h3>Top Matches:</h3>\n",
        escape_html(&investor.name)
    );

    for (i, m) in top.iter().enumerate() {
        let _ = write!(
            out,
            r#"<div style="border: 1px solid #ddd; padding: 15px; margin: 10px 0; border-radius: 8px;">
<h4>{}. {} - {}</h4>
<p><strong>Stage:</strong> {} | <strong>Funding:</strong> {}</p>
<p><strong>Location:</strong> {}</p>
<p><strong>Match Score:</strong> {}% | <strong>Why matched:</strong> {}</p>
<p>{}</p>
<p><a href="{}" target="_blank">Visit Website</a></p>
</div>
"#,
            i + 1,
            escape_html(&m.name),
            escape_html(&m.industry),
            escape_html(&m.funding_stage),
            escape_html(&funding_label(m.funding_amount)),
            escape_html(&m.location),
            m.match_score,
            match_reasons(m),
            escape_html(&excerpt(&m.description, HTML_EXCERPT_CHARS)),
            escape_html(&m.website),
        );
    }

    if remaining > 0 {
        let _ = writeln!(out, "<p><em>... and {remaining} more matches!</em></p>");
    }

    let _ = write!(
        out,
        r#"<hr>
<p><strong>Your preferences:</strong></p>
<ul>
<li><strong>Industries:</strong> {}</li>
<li><strong>Stages:</strong> {}</li>
</ul>
<p>Visit the <a href="{}">Startup Investor Platform</a> to explore all your matches!</p>
<p style="color: #666; font-size: 12px;">This is an automated notification from Startup Investor Platform.</p>
</body>
</html>"#,
        escape_html(&preference_label(&investor.preferred_industries)),
        escape_html(&preference_label(&investor.preferred_funding_stages)),
        escape_html(dashboard_url),
    );
    out
}

fn match_reasons(m: &Match) -> String {
    let mut reasons = Vec::with_capacity(2);
    if m.industry_match {
        reasons.push("Industry Match");
    }
    if m.stage_match {
        reasons.push("Stage Match");
    }
    reasons.join(" | ")
}

fn funding_label(amount: Option<f64>) -> String {
    match amount {
        Some(a) if a.fract() == 0.0 => format!("{a:.0}"),
        Some(a) => format!("{a:.2}"),
        None => "N/A".to_string(),
    }
}

fn preference_label(values: &[String]) -> String {
    if values.is_empty() {
        "Not set".to_string()
    } else {
        values.join(", ")
    }
}

/// Truncates on a char boundary, appending an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
