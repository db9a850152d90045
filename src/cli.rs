//! Command dispatch for the `medcite` binary.

use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::Local;
use thiserror::Error;

use crate::api::server::{self, ServerError};
use crate::api::ApiContext;
use crate::chat::{AnswerReport, AnswerSource, ChatSession, SessionError};
use crate::client_state::{StateError, StateStore};
use crate::config::{AskArgs, Cli, Command, METADATA_CACHE_CAPACITY};
use crate::export::{export_answer, export_session, write_document, ExportError};
use crate::pipeline::citation::{filter_views, CitationView, TrustStatus};
use crate::pipeline::metadata::{HttpPageFetcher, LlmTitleTranslator, MetadataCache, MetadataResolver};
use crate::upstream::ChatGateway;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn dispatch(cli: Cli) -> Result<(), AppError> {
    let upstream = cli.upstream.to_config();
    match cli.command {
        Command::Serve(args) => {
            let ctx = ApiContext::new(upstream, cli.env);
            server::serve(args.bind, ctx).await?;
        }
        Command::Ask(args) => {
            ask(ChatGateway::new(upstream, cli.env), &args).await?;
        }
    }
    Ok(())
}

/// One-shot client session: load state, ask, print, persist, export.
pub async fn ask(gateway: ChatGateway, args: &AskArgs) -> Result<(), AppError> {
    let store = StateStore::new(args.state_path());
    let mut state = store.load_or_default();
    if args.reset {
        state.reset();
    }
    if let Some(model) = &args.model {
        state.model = model.clone();
    }
    if args.no_stream {
        state.stream = false;
    }

    let gateway = Arc::new(gateway);
    let resolver = Arc::new(MetadataResolver::new(
        Arc::new(Mutex::new(MetadataCache::with_capacity(METADATA_CACHE_CAPACITY))),
        HttpPageFetcher::default(),
        LlmTitleTranslator::new(Arc::clone(&gateway)),
    ));
    let mut session = ChatSession::new(gateway, resolver, state)
        .with_audience(args.audience)
        .with_detailed(args.detailed);

    let mut stdout = std::io::stdout();
    let report = session
        .send(&args.question, |delta| {
            let _ = stdout.write_all(delta.as_bytes());
            let _ = stdout.flush();
        })
        .await?;
    store.save(session.state())?;

    let citations = filter_views(report.citations.clone(), &args.citation_filter());
    print_report(&report, &citations)?;

    if let Some(path) = &args.export {
        let answer = session.latest_answer().ok_or(ExportError::NoAnswer)?;
        write_document(path, &export_answer(&answer, Local::now()))?;
    }
    if let Some(path) = &args.export_session {
        let answers = session.all_answers();
        if answers.is_empty() {
            return Err(ExportError::NoAnswer.into());
        }
        write_document(path, &export_session(&answers, Local::now()))?;
    }
    Ok(())
}

fn print_report(report: &AnswerReport, citations: &[CitationView]) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    if report.source == AnswerSource::Stream {
        writeln!(out)?;
        if report.text != report.raw {
            writeln!(out, "\n---\n{}", report.text)?;
        }
    } else {
        writeln!(out, "{}", report.text)?;
    }

    if !citations.is_empty() {
        writeln!(out)?;
        if report.trust == TrustStatus::Unfiltered {
            writeln!(out, "(unverified sources)")?;
        }
        for c in citations {
            let year = c.year.map(|y| format!(" ({y})")).unwrap_or_default();
            writeln!(out, "[{}] {} <{}> [{}]{year}", c.number, c.title, c.url, c.kind)?;
            if let Some(link) = c.doi_link() {
                writeln!(out, "    {link}")?;
            }
        }
    }

    if !report.missing_sections.is_empty() {
        tracing::warn!(missing = ?report.missing_sections, "Answer is missing expected sections");
        eprintln!("missing sections: {}", report.missing_sections.join(", "));
    }
    Ok(())
}
