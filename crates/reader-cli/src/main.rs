use miette::{IntoDiagnostic, Result};
use reader_core::{Marker, ReaderSession, RequestKind, Segment, TextRange};
use reader_feedback::{ChatFeedbackClient, FeedbackConfig, FileStore, run_request};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

mod args;

use args::{AnnotationArg, ConnectionArg};

#[derive(Parser)]
#[command(version, about = "Active reader - annotate a text and ask for feedback", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how annotations and connections partition the text
    Render {
        /// UTF-8 text file
        file: PathBuf,

        /// Annotation as START..END:TYPE[:NOTE] (char offsets)
        #[arg(short = 'a', long = "annotate")]
        annotations: Vec<AnnotationArg>,

        /// Connection as START..END=>START..END
        #[arg(short = 'c', long = "connect")]
        connections: Vec<ConnectionArg>,

        /// Print the HTML render instead of a segment listing
        #[arg(long)]
        html: bool,
    },
    /// Ask for suggestions on what to annotate
    Guide {
        file: PathBuf,

        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Ask for feedback on a summary of the text
    Summary {
        file: PathBuf,

        /// The summary to review
        #[arg(short, long)]
        summary: String,

        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Ask for feedback on a set of annotations
    Feedback {
        file: PathBuf,

        /// Annotation as START..END:TYPE[:NOTE] (char offsets)
        #[arg(short = 'a', long = "annotate")]
        annotations: Vec<AnnotationArg>,

        #[command(flatten)]
        llm: LlmArgs,
    },
}

#[derive(Args)]
struct LlmArgs {
    /// Feedback service config (.toml or .json)
    #[arg(long, env = "READER_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    endpoint: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            file,
            annotations,
            connections,
            html,
        } => {
            let session = load_session(&file, &annotations, &connections)?;
            if html {
                println!("{}", session.render_html());
            } else {
                print_listing(&session);
            }
        }
        Commands::Guide { file, llm } => {
            let mut session = load_session(&file, &[], &[])?;
            request(&mut session, &llm, RequestKind::AnnotationGuide).await?;
        }
        Commands::Summary { file, summary, llm } => {
            let mut session = load_session(&file, &[], &[])?;
            session.set_summary(summary);
            request(&mut session, &llm, RequestKind::SummaryFeedback).await?;
        }
        Commands::Feedback {
            file,
            annotations,
            llm,
        } => {
            let mut session = load_session(&file, &annotations, &[])?;
            request(&mut session, &llm, RequestKind::AnnotationFeedback).await?;
        }
    }

    Ok(())
}

/// Read `file` and apply annotations and connections through the session.
fn load_session(
    file: &Path,
    annotations: &[AnnotationArg],
    connections: &[ConnectionArg],
) -> Result<ReaderSession> {
    let text = std::fs::read_to_string(file).into_diagnostic()?;
    let mut session = ReaderSession::with_text(text);

    for ann in annotations {
        let range = TextRange::from_source(session.source(), ann.start, ann.end)?;
        session.annotate(range, ann.kind, ann.note.clone())?;
    }
    for conn in connections {
        let from = TextRange::from_source(session.source(), conn.from.0, conn.from.1)?;
        let to = TextRange::from_source(session.source(), conn.to.0, conn.to.1)?;
        session.connect(from, to)?;
    }
    tracing::debug!(
        file = %file.display(),
        annotations = session.annotations().len(),
        connections = session.connections().len(),
        "session loaded"
    );
    Ok(session)
}

async fn load_config(llm: &LlmArgs) -> Result<FeedbackConfig> {
    let mut config = match &llm.config {
        Some(path) => FeedbackConfig::load(&FileStore::new(path)).await?,
        None => FeedbackConfig::default(),
    };
    config.apply_env()?;
    if let Some(endpoint) = &llm.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(model) = &llm.model {
        config.model = model.clone();
    }
    Ok(config)
}

async fn request(session: &mut ReaderSession, llm: &LlmArgs, kind: RequestKind) -> Result<()> {
    let client = ChatFeedbackClient::new(load_config(llm).await?)?;
    run_request(session, &client, kind).await?;

    let panel = session.panel(kind);
    if let Some(error) = &panel.error {
        return Err(miette::miette!("{error}"));
    }
    println!("{}", panel.content.as_deref().unwrap_or_default());
    Ok(())
}

fn print_listing(session: &ReaderSession) {
    for segment in session.segments() {
        println!("{}", describe_segment(&segment));
    }

    if !session.annotations().is_empty() {
        println!();
        for ann in session.annotations() {
            let meta = ann.meta();
            print!(
                "{:<5} {:>4}..{:<4} {:<3} {:?}",
                ann.id,
                ann.range.start(),
                ann.range.end(),
                meta.abbreviation,
                ann.range.text()
            );
            match &ann.note {
                Some(note) => println!("  note: {note}"),
                None => println!(),
            }
        }
    }
    if !session.connections().is_empty() {
        println!();
        for conn in session.connections() {
            println!(
                "{:<5} {:?} => {:?}",
                conn.id,
                conn.from.text(),
                conn.to.text()
            );
        }
    }
}

fn describe_segment(segment: &Segment) -> String {
    let markers: Vec<String> = segment
        .markers
        .iter()
        .map(|marker| match marker {
            Marker::Annotation { id, kind } if segment.primary.as_ref() == Some(id) => {
                format!("{kind}*")
            }
            Marker::Annotation { kind, .. } => kind.to_string(),
            Marker::ConnectionFrom { id } => format!("from:{id}"),
            Marker::ConnectionTo { id } => format!("to:{id}"),
            Marker::PendingStart => "pending".to_string(),
        })
        .collect();
    format!(
        "{:>4}..{:<4} {:?} [{}]",
        segment.range.start,
        segment.range.end,
        segment.text,
        markers.join(" ")
    )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use reader_core::AnnotationType;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_args() {
        let cli = Cli::try_parse_from([
            "reader",
            "render",
            "text.txt",
            "-a",
            "4..7:key-term",
            "--annotate",
            "12..22:question:Which mat?",
            "-c",
            "12..22=>0..3",
            "--html",
        ])
        .unwrap();
        let Commands::Render {
            annotations,
            connections,
            html,
            ..
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[1].kind, AnnotationType::Question);
        assert_eq!(connections[0].to, (0, 3));
        assert!(html);
    }

    #[test]
    fn test_bad_annotation_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["reader", "render", "t.txt", "-a", "4..7:underline"]).is_err());
    }

    #[test]
    fn test_describe_segment() {
        let mut session = ReaderSession::with_text("The cat sat on the mat.");
        let cat = TextRange::from_source(session.source(), 4, 7).unwrap();
        session.annotate(cat, AnnotationType::KeyTerm, None).unwrap();
        let lines: Vec<String> = session.segments().iter().map(describe_segment).collect();
        assert_eq!(lines[1], "   4..7    \"cat\" [key-term*]");
    }
}
