//! Print-oriented HTML export of answers and whole sessions.
//!
//! Every interpolated string is escaped; only the markup written here is
//! emitted raw.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::chat::RenderedAnswer;
use crate::pipeline::citation::{link_references, CitationView};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: no assistant answer yet")]
    NoAnswer,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

const ANSWER_STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;padding:24px;color:#111}\
h1{font-size:20px;margin:0 0 12px}hr{margin:16px 0} .cit div{margin:6px 0} \
.content{white-space:pre-wrap;line-height:1.6} .meta{color:#666;font-size:12px}";

const SESSION_STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;padding:24px;color:#111}\
h1{font-size:22px;margin:0 0 16px}h2{font-size:18px;margin:12px 0}h3{font-size:16px;margin:12px 0}\
hr{margin:16px 0} .cit div{margin:6px 0} .content{white-space:pre-wrap;line-height:1.6} \
.meta{color:#666;font-size:12px}";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Answer body with `[n]` markers linked to their citations.
fn linked_content(answer: &RenderedAnswer) -> String {
    let urls: Vec<String> = answer.citations.iter().map(|c| c.url.clone()).collect();
    link_references(
        &answer.text,
        &urls,
        escape_html,
        |n, url| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">[{n}]</a>"#,
                escape_html(url)
            )
        },
        |n| format!("[{n}]"),
    )
}

fn citation_line(c: &CitationView) -> String {
    let url = escape_html(&c.url);
    let mut line = format!(
        r#"<div>[{}] <span>{}</span> <a href="{url}" target="_blank">{url}</a>"#,
        c.number,
        escape_html(&c.title),
    );
    if !c.host.is_empty() {
        line.push_str(&format!(" ({})", escape_html(&c.host)));
    }
    line.push_str(&format!(" [{}]", c.kind));
    if let Some(year) = c.year {
        line.push_str(&format!(" ({year})"));
    }
    if let (Some(doi), Some(link)) = (&c.doi, c.doi_link()) {
        line.push_str(&format!(
            r#" <a href="{}" target="_blank">DOI:{}</a>"#,
            escape_html(&link),
            escape_html(doi)
        ));
    }
    line.push_str("</div>");
    line
}

fn citation_list(citations: &[CitationView]) -> String {
    citations.iter().map(citation_line).collect()
}

fn document(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body>{body}</body></html>"
    )
}

fn stamp(generated_at: DateTime<Local>) -> String {
    format!(
        r#"<p class="meta">{}</p>"#,
        escape_html(&generated_at.format("%Y-%m-%d %H:%M").to_string())
    )
}

/// Single-answer document: the answer, then its numbered citations.
pub fn export_answer(answer: &RenderedAnswer, generated_at: DateTime<Local>) -> String {
    let body = format!(
        r#"<h1>回答</h1>{}<div class="content">{}</div><hr/><h1>引用</h1><div class="cit">{}</div>"#,
        stamp(generated_at),
        linked_content(answer),
        citation_list(&answer.citations),
    );
    document("Export", ANSWER_STYLE, &body)
}

/// Whole-session document with one block per assistant answer.
pub fn export_session(answers: &[RenderedAnswer], generated_at: DateTime<Local>) -> String {
    let blocks: String = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            format!(
                r#"<h2>回答 {}</h2><div class="content">{}</div><h3>引用</h3><div class="cit">{}</div><hr/>"#,
                i + 1,
                linked_content(answer),
                citation_list(&answer.citations),
            )
        })
        .collect();
    let body = format!("<h1>会話エクスポート</h1>{}{blocks}", stamp(generated_at));
    document("Export Session", SESSION_STYLE, &body)
}

/// Write an exported document, creating parent directories.
pub fn write_document(path: &Path, html: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Wrote export");
    Ok(())
}
