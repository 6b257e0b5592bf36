use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use contact_core::{
    ContactEvent, ContactFormController, ControllerOptions, HttpRelay, DEFAULT_REVERT_DELAY,
};
use shared::{
    domain::{FieldKey, SubmissionState},
    error::ContactFormError,
};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Send a message through the portfolio contact form relay")]
struct Args {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    message: String,
    /// Overrides the relay endpoint from config and environment.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, default_value = "contact.toml")]
    config: PathBuf,
    /// Keep the view mounted until the sent confirmation resets the form.
    #[arg(long)]
    wait_for_reset: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(endpoint) = &args.endpoint {
        settings.relay_endpoint = endpoint.clone();
    }
    settings.validate()?;

    let relay = HttpRelay::new(&settings.relay_endpoint, settings.request_timeout())
        .context("failed to set up message relay")?;
    info!(endpoint = %relay.endpoint(), "contact relay configured");
    let controller = ContactFormController::mount(Arc::new(relay), ControllerOptions::default());
    let events = controller.subscribe();

    let fields = [
        (FieldKey::Name, args.name),
        (FieldKey::Email, args.email),
        (FieldKey::Subject, args.subject),
        (FieldKey::Message, args.message),
    ];
    for (key, value) in fields {
        controller.update_field(key, value).await?;
    }

    let code = match controller.submit().await {
        Ok(state) => {
            println!("{}", status_line(&state));
            if state == SubmissionState::Submitted {
                if args.wait_for_reset {
                    wait_for_reset(events).await;
                }
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err @ ContactFormError::Validation { .. }) => {
            println!("Please check the form: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            controller.unmount().await;
            return Err(err).context("contact form submission failed");
        }
    };

    controller.unmount().await;
    Ok(code)
}

/// Text the contact view shows for a settled submission state.
fn status_line(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => "Ready to send a message.".to_string(),
        SubmissionState::Submitting => "Sending...".to_string(),
        SubmissionState::Submitted => {
            "Message sent! Thank you for reaching out. I'll get back to you soon.".to_string()
        }
        SubmissionState::Failed(message) => format!("Error: {message}"),
    }
}

async fn wait_for_reset(mut events: broadcast::Receiver<ContactEvent>) {
    let deadline = DEFAULT_REVERT_DELAY + Duration::from_secs(1);
    let waited = tokio::time::timeout(deadline, async {
        loop {
            match events.recv().await {
                Ok(ContactEvent::StateChanged(SubmissionState::Idle)) => break,
                Ok(event) => debug!(?event, "contact view event"),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;

    match waited {
        Ok(()) => println!("{}", status_line(&SubmissionState::Idle)),
        Err(_) => debug!("contact form did not reset before the deadline"),
    }
}
