//! Log-based event sink and display adapters.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on the target, stderr on the host) and
//! [`DisplayPort`] by logging each new frame.

use log::{error, info};

use crate::app::events::{AppEvent, TelemetryRecord};
use crate::app::ports::{DisplayPort, EventSink};
use crate::display::{DisplayFrame, FrameText};

/// How telemetry records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TelemetryFormat {
    /// Comma-separated values in record field order.
    #[default]
    Csv,
    /// One JSON object per record.
    Json,
}

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    format: TelemetryFormat,
}

impl LogEventSink {
    pub fn new(format: TelemetryFormat) -> Self {
        Self { format }
    }
}

/// CSV line: primary, case, target, start threshold, case target, state.
pub fn telemetry_csv(t: &TelemetryRecord) -> String {
    format!(
        "{:.2},{:.2},{:.1},{:.1},{:.2},{}",
        t.primary_c, t.case_c, t.target_c, t.start_threshold_c, t.case_target_c, t.state
    )
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match self.format {
                TelemetryFormat::Csv => info!("TELEM | {}", telemetry_csv(t)),
                TelemetryFormat::Json => match serde_json::to_string(t) {
                    Ok(json) => info!("TELEM | {json}"),
                    Err(e) => error!("TELEM | encode failed: {e}"),
                },
            },
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {from} -> {to}");
            }
            AppEvent::CaseTargetAdapted { from_c, to_c } => {
                info!("CASE  | target {from_c:.2} -> {to_c:.2}\u{00b0}C");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={state}");
            }
            AppEvent::Halted(fault) => {
                error!("HALT  | {fault}");
            }
        }
    }
}

/// Display adapter that logs frames, skipping repeats.
#[derive(Default)]
pub struct LogDisplay {
    last: Option<FrameText>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently "on" the display.
    pub fn current(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl DisplayPort for LogDisplay {
    fn show(&mut self, frame: &DisplayFrame) {
        let text = frame.render();
        if self.last.as_ref() != Some(&text) {
            info!("DISP  | [{text}]");
            self.last = Some(text);
        }
    }
}
