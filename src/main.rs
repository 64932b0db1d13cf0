//! Chiller Firmware: Main Entry Point
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    SimulatedChiller   LogEventSink  LogDisplay│
//! │  (Sensor+Actuator)  (Sensor+Actuator)  (EventSink)   (Display) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Safety · Case target · Time base                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  bring-up ─▶ control loop ─▶ (fault) ─▶ HaltPresenter forever  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `espidf` target drives the board.  Host builds run the same
//! service against the thermal-plant simulator on a virtual clock:
//!
//! | Variable           | Meaning                                   |
//! |--------------------|-------------------------------------------|
//! | `CHILLER_CONFIG`   | Path to a JSON config (defaults otherwise)|
//! | `CHILLER_SPEEDUP`  | Virtual ms per wall ms (default 60)       |
//! | `CHILLER_SIM_SECS` | Stop after this many virtual seconds      |
//! | `CHILLER_TELEMETRY`| `csv` (default) or `json`                 |
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use chiller::adapters::log_sink::{LogDisplay, LogEventSink, TelemetryFormat};
use chiller::app::events::AppEvent;
use chiller::app::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort};
use chiller::app::service::{AppService, LoopStatus};
use chiller::bringup;
use chiller::config::ChillerConfig;
use chiller::error::{Error, FatalFault};
use chiller::halt::HaltPresenter;

// ── Loop pacing ───────────────────────────────────────────────

/// Time source and pacing for the driver loop.
trait LoopPacer<H> {
    fn now_ms(&self) -> u32;
    /// Block for one loop period.
    fn pause(&mut self, hw: &mut H, ms: u32);
    /// Host runs may be bounded; the board never stops.
    fn finished(&self) -> bool {
        false
    }
}

// ── Main ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use chiller::adapters::hardware::HardwareAdapter;
    use chiller::adapters::time::MillisClock;
    use chiller::drivers::hw_init;
    use esp_idf_hal::delay::FreeRtos;

    struct BoardPacer {
        clock: MillisClock,
    }

    impl<H> LoopPacer<H> for BoardPacer {
        fn now_ms(&self) -> u32 {
            self.clock.now_ms()
        }

        fn pause(&mut self, _hw: &mut H, ms: u32) {
            FreeRtos::delay_ms(ms);
        }
    }

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    banner();

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()
        .map_err(Error::from)
        .context("peripheral init")?;

    let mut hw = HardwareAdapter::from_board();
    let mut pacer = BoardPacer { clock: MillisClock::new() };

    run(ChillerConfig::default(), &mut hw, &mut FreeRtos, &mut pacer, TelemetryFormat::Csv)
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use chiller::adapters::sim::{PlantModel, SimClock, SimulatedChiller};

    struct SimPacer {
        clock: SimClock,
        speedup: u32,
        remaining_ms: Option<u64>,
    }

    impl LoopPacer<SimulatedChiller> for SimPacer {
        fn now_ms(&self) -> u32 {
            self.clock.now_ms()
        }

        fn pause(&mut self, plant: &mut SimulatedChiller, ms: u32) {
            self.clock.advance(ms);
            plant.advance(ms);
            if let Some(left) = self.remaining_ms.as_mut() {
                *left = left.saturating_sub(u64::from(ms));
            }
            let wall = u64::from(ms / self.speedup.max(1));
            if wall > 0 {
                std::thread::sleep(std::time::Duration::from_millis(wall));
            }
        }

        fn finished(&self) -> bool {
            self.remaining_ms == Some(0)
        }
    }

    tracing_subscriber::fmt::init();
    banner();

    let config = match std::env::var("CHILLER_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let cfg = ChillerConfig::from_json(&text)
                .map_err(Error::from)
                .with_context(|| format!("parsing {path}"))?;
            info!("Config loaded from {}", path);
            cfg
        }
        Err(_) => ChillerConfig::default(),
    };

    let speedup = env_u32("CHILLER_SPEEDUP").unwrap_or(60);
    let format = match std::env::var("CHILLER_TELEMETRY").as_deref() {
        Ok("json") => TelemetryFormat::Json,
        _ => TelemetryFormat::Csv,
    };

    let model = PlantModel::default();
    let mut plant = SimulatedChiller::new(model, model.ambient_c + 3.0, model.ambient_c + 1.0);
    let mut pacer = SimPacer {
        clock: SimClock::default(),
        speedup,
        remaining_ms: env_u32("CHILLER_SIM_SECS").map(|s| u64::from(s) * 1000),
    };
    // Bring-up delays run on their own virtual clock; the loop clock
    // starts when the loop does.
    let mut bringup_clock = SimClock::starting_at(0);

    info!("Simulator: {}x speedup", speedup);
    run(config, &mut plant, &mut bringup_clock, &mut pacer, format)
}

#[cfg(not(target_os = "espidf"))]
fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok()?.parse().ok()
}

fn banner() {
    info!("╔══════════════════════════════════════╗");
    info!("║  Chiller v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
}

// ── Driver loop ───────────────────────────────────────────────

fn run<H, P>(
    config: ChillerConfig,
    hw: &mut H,
    delay: &mut impl embedded_hal::delay::DelayNs,
    pacer: &mut P,
    format: TelemetryFormat,
) -> Result<()>
where
    H: SensorPort + ActuatorPort,
    P: LoopPacer<H>,
{
    let loop_ms = config.loop_delay_ms;
    let mut sink = LogEventSink::new(format);
    let mut display = LogDisplay::new();

    // ── 0. Service ────────────────────────────────────────────
    let mut app = match AppService::new(config) {
        Ok(app) => app,
        Err(Error::Fatal(fault)) => {
            hw.all_off();
            sink.emit(&AppEvent::Halted(fault));
            present_halt(fault, hw, &mut display, pacer, loop_ms);
            return Ok(());
        }
        Err(e) => {
            hw.all_off();
            return Err(e).context("controller setup");
        }
    };

    // ── 1. Bring-up ───────────────────────────────────────────
    if let Err(fault) = bringup::run(&mut app, hw, delay, &mut sink) {
        present_halt(fault, hw, &mut display, pacer, loop_ms);
        return Ok(());
    }

    // ── 2. Control loop ───────────────────────────────────────
    app.start(pacer.now_ms(), &mut sink);
    info!("System ready. Entering control loop.");

    while !pacer.finished() {
        if let LoopStatus::Halted(fault) = app.tick(pacer.now_ms(), hw, &mut sink, &mut display) {
            present_halt(fault, hw, &mut display, pacer, loop_ms);
            return Ok(());
        }
        pacer.pause(hw, loop_ms);
    }

    hw.all_off();
    info!("Run finished after {} ticks in {}", app.tick_count(), app.state());
    Ok(())
}

/// Alarm tone and rotating fault display until power is removed.
fn present_halt<H, P>(fault: FatalFault, hw: &mut H, display: &mut impl DisplayPort, pacer: &mut P, loop_ms: u32)
where
    H: ActuatorPort,
    P: LoopPacer<H>,
{
    let presenter = HaltPresenter::new(fault, pacer.now_ms());
    while !pacer.finished() {
        presenter.drive(pacer.now_ms(), hw, display);
        pacer.pause(hw, loop_ms);
    }
    hw.all_off();
}
