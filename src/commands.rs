use crate::analytics::UNKNOWN_EVENT_TITLE;
use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::Database;
use crate::error::Result;
use crate::event::{Event, EventOrder, NewEvent};
use crate::feedback::NewFeedback;
use crate::report;
use crate::server::{self, AppState};
use crate::suggestions::{CompletionClient, EventSuggestion, GeminiClient, generate_suggestions};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;

/// Runs one CLI command against `db`, writing human-readable output to `out`
pub fn execute<W: Write>(command: Command, db: Database, config: &AppConfig, out: &mut W) -> Result<()> {
    match command {
        Command::Serve { port } => serve(db, config, port),
        Command::AddEvent {
            title,
            location,
            date,
            time,
            description,
        } => {
            let event = db.create_event(NewEvent {
                title,
                location,
                date,
                time,
                description,
            })?;
            writeln!(out, "Created event #{}: {}", event.id, event.title)?;
            Ok(())
        }
        Command::Events { desc } => {
            let order = if desc {
                EventOrder::DateDescending
            } else {
                EventOrder::DateAscending
            };
            print_events(&db.list_events(order)?, out)
        }
        Command::SubmitFeedback {
            event_id,
            rating,
            comment,
        } => {
            let feedback = db.submit_feedback(NewFeedback {
                event_id,
                rating,
                comment,
            })?;
            writeln!(
                out,
                "Thank you for your feedback! (#{}, {} stars for event #{})",
                feedback.id, feedback.rating, feedback.event_id
            )?;
            Ok(())
        }
        Command::Feedback => {
            let entries = db.list_feedback_with_events()?;
            if entries.is_empty() {
                writeln!(out, "No feedback yet.")?;
            }
            for entry in entries {
                let f = &entry.feedback;
                writeln!(
                    out,
                    "{} {} {} ({}/5)",
                    f.submitted_at.format("%Y-%m-%d %H:%M"),
                    "*".repeat(f.rating.clamp(0, 5) as usize),
                    entry.event_title.as_deref().unwrap_or(UNKNOWN_EVENT_TITLE),
                    f.rating
                )?;
                if let Some(comment) = &f.comment {
                    writeln!(out, "    {}", comment)?;
                }
            }
            Ok(())
        }
        Command::Analytics { no_color } => {
            let summary = db.compute_analytics()?;
            write!(out, "{}", report::render(&summary, !no_color))?;
            Ok(())
        }
        Command::Suggest => {
            let client = GeminiClient::from_config(config)?;
            let suggestions =
                actix_web::rt::System::new().block_on(suggest(&client, &db))?;
            print_suggestions(&suggestions, out)
        }
    }
}

/// Generates suggestions from the most recent events in `db`
pub async fn suggest(client: &dyn CompletionClient, db: &Database) -> Result<Vec<EventSuggestion>> {
    let context = db.suggestion_context()?;
    Ok(generate_suggestions(client, &context).await?)
}

fn serve(db: Database, config: &AppConfig, port: Option<u16>) -> Result<()> {
    let completion: Option<Arc<dyn CompletionClient>> = match GeminiClient::from_config(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("{}; suggestion requests will fail", e);
            None
        }
    };

    let port = port.unwrap_or(config.port);
    info!("Starting server with model {}", config.gemini_model);
    actix_web::rt::System::new().block_on(server::run(
        AppState::new(db, completion),
        &config.bind_address,
        port,
    ))?;
    Ok(())
}

fn print_events<W: Write>(events: &[Event], out: &mut W) -> Result<()> {
    if events.is_empty() {
        writeln!(out, "No events scheduled.")?;
    }
    for event in events {
        writeln!(
            out,
            "#{} {} {} {} @ {}",
            event.id,
            event.date.format("%Y-%m-%d"),
            event.time.format("%H:%M"),
            event.title,
            event.location
        )?;
        writeln!(out, "    {}", event.description)?;
    }
    Ok(())
}

fn print_suggestions<W: Write>(suggestions: &[EventSuggestion], out: &mut W) -> Result<()> {
    for (i, s) in suggestions.iter().enumerate() {
        match &s.category {
            Some(category) => writeln!(out, "{}. {} [{}]", i + 1, s.title, category)?,
            None => writeln!(out, "{}. {}", i + 1, s.title)?,
        }
        writeln!(out, "   {}", s.description)?;
        if let Some(message) = &s.promotional_message {
            writeln!(out, "   > {}", message)?;
        }
    }
    Ok(())
}
