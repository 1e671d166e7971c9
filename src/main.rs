//! Syllabus Calendar
//!
//! Reads a course outline from a file or stdin and either writes an
//! iCalendar file of its exams and assignments or creates the events on
//! Google Calendar.

mod cli;

use anyhow::{Context, Result};
use log::info;
use std::env;
use std::path::Path;
use std::process;
use tokio::io::AsyncReadExt;

use syllabus_calendar::calendar::GoogleCalendarClient;
use syllabus_calendar::gemini::GeminiClient;
use syllabus_calendar::{Config, ExtractionRequest, Pipeline, RequestError};

async fn read_outline(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut outline = String::new();
            tokio::io::stdin()
                .read_to_string(&mut outline)
                .await
                .context("Failed to read outline from stdin")?;
            Ok(outline)
        }
    }
}

fn fail(err: RequestError) -> ! {
    eprintln!("Error {}: {}", err.status_code(), err);
    process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = cli::parse(env::args().collect());
    let config = Config::from_env()?;

    let outline = read_outline(args.input.as_deref()).await?;
    let request = ExtractionRequest {
        outline_text: Some(outline),
        target_calendar_id: args.calendar_id.clone(),
        form_encoded: args.form_encoded,
    };

    let model = GeminiClient::new(&config.gemini, config.request_timeout)?;
    let mut pipeline = Pipeline::new(model);

    match args.mode {
        cli::Mode::Raw => {
            let extraction = pipeline.extract(&request).await.unwrap_or_else(|e| fail(e));
            println!("{}", serde_json::to_string_pretty(&extraction.result)?);
        }
        cli::Mode::File => {
            let response = pipeline.run_file(&request).await.unwrap_or_else(|e| fail(e));
            if let Some(diagnostic) = &response.parsed_data.diagnostic {
                info!("Extraction note: {}", diagnostic);
            }
            info!(
                "Writing {} ({}), {} items dropped",
                response.filename, response.media_type, response.dropped_items
            );
            match &args.output {
                Some(path) => tokio::fs::write(path, response.document.as_bytes())
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", response.document),
            }
        }
        cli::Mode::Remote => {
            if let Some(calendar) = &config.calendar {
                let client = GoogleCalendarClient::from_config(calendar, config.request_timeout)
                    .await
                    .context("Failed to set up Google Calendar client")?;
                pipeline = pipeline
                    .with_calendar(Box::new(client), Some(calendar.default_calendar_id.clone()));
            }
            let response = pipeline.run_remote(&request).await.unwrap_or_else(|e| fail(e));
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
