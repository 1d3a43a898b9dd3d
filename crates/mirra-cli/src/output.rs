//! Event rendering for the terminal.

use anyhow::Result;
use mirra_events::{Event, EventEnvelope, JobOutcome};

/// Render one event envelope, either as a JSON line or as human-readable
/// text. Raw tool output passes through verbatim; engine lifecycle events
/// get a short prefix.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
pub fn render(envelope: &EventEnvelope, json: bool) -> Result<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string(envelope)?));
    }

    let line = match &envelope.event {
        Event::JobQueued { label, .. } => Some(format!("=> queued {label}")),
        Event::JobStarted { label, .. } => Some(format!("=> starting {label}")),
        Event::Text { line, .. } => Some(line.clone()),
        Event::Percent { value, .. } => Some(format!("   {value}%")),
        Event::JobFinished { outcome, .. } => Some(describe_outcome(outcome)),
        Event::QueueIdle => Some("=> all jobs processed".to_string()),
        Event::Suspended { .. } => {
            Some("=> paused after cancellation; waiting for resume".to_string())
        }
    };
    Ok(line)
}

fn describe_outcome(outcome: &JobOutcome) -> String {
    match outcome {
        JobOutcome::Success => "=> done".to_string(),
        JobOutcome::Failed { phase, exit_code } => match exit_code {
            Some(code) => format!("=> failed during {} (exit code {code})", phase.as_str()),
            None => format!("=> failed during {}", phase.as_str()),
        },
        JobOutcome::Cancelled => "=> cancelled".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mirra_events::TransferPhase;
    use uuid::Uuid;

    fn envelope(event: Event) -> EventEnvelope {
        EventEnvelope {
            id: 1,
            timestamp: Utc::now(),
            event,
        }
    }

    #[test]
    fn text_lines_pass_through_verbatim() {
        let rendered = render(
            &envelope(Event::Text {
                job_id: Uuid::new_v4(),
                line: "receiving incremental file list".to_string(),
            }),
            false,
        )
        .unwrap();
        assert_eq!(rendered.as_deref(), Some("receiving incremental file list"));
    }

    #[test]
    fn failures_name_the_phase() {
        let rendered = render(
            &envelope(Event::JobFinished {
                job_id: Uuid::new_v4(),
                outcome: JobOutcome::Failed {
                    phase: TransferPhase::Fetch,
                    exit_code: Some(2),
                },
            }),
            false,
        )
        .unwrap();
        assert_eq!(rendered.as_deref(), Some("=> failed during fetch (exit code 2)"));
    }

    #[test]
    fn json_mode_round_trips() {
        let event = Event::Percent {
            job_id: Uuid::new_v4(),
            value: 45,
        };
        let rendered = render(&envelope(event), true).unwrap().unwrap();
        let parsed: EventEnvelope = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.event.kind(), "percent");
    }
}
