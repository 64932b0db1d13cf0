//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!          ┌──[case > case target]─────────────────────────────┐
//!          │                                                   ▼
//!  IDLE ──[primary > target+hyst]──▶ STARTING ──[3 s]──▶ COOLING
//!    ▲                                  ▲                  │   ▲
//!    │                                  │   [primary ≤ target, >5 s]
//!    │                                  │                  ▼   │ [primary > target+0.2,
//!    │                                  │               HOLDING    past first 5 s]
//!    │                                  │                  │
//!    │                     [primary > target+hyst]   [600 s or primary < target-hyst]
//!    │                                  │                  ▼
//!    └────────[60 s, adapt case target]─┴────────────── COOLDOWN
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Starting
        StateDescriptor {
            id: StateId::Starting,
            name: "Starting",
            on_enter: Some(starting_enter),
            on_exit: None,
            on_update: starting_update,
        },
        // Index 2: Cooling
        StateDescriptor {
            id: StateId::Cooling,
            name: "Cooling",
            on_enter: Some(cooling_enter),
            on_exit: None,
            on_update: cooling_update,
        },
        // Index 3: Holding
        StateDescriptor {
            id: StateId::Holding,
            name: "Holding",
            on_enter: Some(holding_enter),
            on_exit: None,
            on_update: holding_update,
        },
        // Index 4: Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            on_enter: Some(cooldown_enter),
            on_exit: Some(cooldown_exit),
            on_update: cooldown_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: everything off, waiting for heat
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.outputs = StateId::Idle.outputs();
    info!(
        "IDLE: coolant {:.1}°C, waiting for > {:.1}°C",
        ctx.temps.primary_c,
        ctx.config.start_threshold_c()
    );
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Housekeeping: keep the second counter far from overflow.  Nothing
    // timed is running while idle.
    if ctx.elapsed_secs() >= ctx.config.idle_clock_reset_secs {
        info!("IDLE: resetting second counter after {}s", ctx.elapsed_secs());
        ctx.reset_clock();
    }

    let mut next = None;
    if ctx.temps.primary_c > ctx.config.start_threshold_c() {
        next = Some(StateId::Starting);
    }
    // Evaluated second: a hot enclosure overrides a cooling request.
    if ctx.temps.case_c > ctx.case_target.target_c() {
        next = Some(StateId::Cooldown);
    }
    next
}

// ═══════════════════════════════════════════════════════════════════════════
//  STARTING state: compressor spin-up through the bypass
// ═══════════════════════════════════════════════════════════════════════════

fn starting_enter(ctx: &mut FsmContext) {
    ctx.outputs = StateId::Starting.outputs();
    ctx.arm_timer(ctx.config.starting_duration_secs);
    info!(
        "STARTING: coolant {:.1}°C, bypass open for {}s",
        ctx.temps.primary_c, ctx.config.starting_duration_secs
    );
}

fn starting_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.timer_expired().then_some(StateId::Cooling)
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLING state: full cooling, bypass closed
// ═══════════════════════════════════════════════════════════════════════════

fn cooling_enter(ctx: &mut FsmContext) {
    ctx.outputs = StateId::Cooling.outputs();
    info!(
        "COOLING: coolant {:.1}°C -> {:.1}°C",
        ctx.temps.primary_c, ctx.config.target_temp_c
    );
}

fn cooling_update(ctx: &mut FsmContext) -> Option<StateId> {
    let reached = ctx.temps.primary_c <= ctx.config.target_temp_c;
    let dwelled = ctx.secs_in_state() > ctx.config.cooling_min_dwell_secs;
    (reached && dwelled).then_some(StateId::Holding)
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOLDING state: maintaining target with the bypass open
// ═══════════════════════════════════════════════════════════════════════════

fn holding_enter(ctx: &mut FsmContext) {
    ctx.outputs = StateId::Holding.outputs();
    ctx.arm_timer(ctx.config.holding_duration_secs);
    info!(
        "HOLDING: coolant {:.1}°C, holding for up to {}s",
        ctx.temps.primary_c, ctx.config.holding_duration_secs
    );
}

fn holding_update(ctx: &mut FsmContext) -> Option<StateId> {
    let cfg = &ctx.config;
    let primary = ctx.temps.primary_c;
    let remaining = ctx.remaining_secs();

    // (a) hold period over
    if remaining == 0 {
        return Some(StateId::Cooldown);
    }

    // (b) drifting warm, but not within the first few seconds of holding
    let bail_window = cfg.holding_duration_secs.saturating_sub(cfg.holding_min_dwell_secs);
    if primary > cfg.target_temp_c + cfg.holding_reentry_offset_c && remaining < bail_window {
        info!("HOLDING: coolant {primary:.1}°C drifting up, back to cooling");
        return Some(StateId::Cooling);
    }

    // (c) overshoot below the band
    if primary < cfg.target_temp_c - cfg.hysteresis_c {
        return Some(StateId::Cooldown);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN state: compressor rest, fan only
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_enter(ctx: &mut FsmContext) {
    ctx.outputs = StateId::Cooldown.outputs();
    ctx.arm_timer(ctx.config.cooldown_duration_secs);
    info!(
        "COOLDOWN: compressor resting for {}s, case {:.1}°C",
        ctx.config.cooldown_duration_secs, ctx.temps.case_c
    );
}

fn cooldown_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Coolant warmed up again: restart without passing through Idle.
    if ctx.temps.primary_c > ctx.config.start_threshold_c() {
        return Some(StateId::Starting);
    }

    if ctx.timer_expired() {
        let previous = ctx.case_target.target_c();
        let adapted = ctx.case_target.adapt(ctx.temps.case_c);
        info!(
            "COOLDOWN: case target {previous:.2}°C -> {adapted:.2}°C (case {:.1}°C)",
            ctx.temps.case_c
        );
        return Some(StateId::Idle);
    }

    None
}

fn cooldown_exit(ctx: &mut FsmContext) {
    info!("COOLDOWN: done after {}s", ctx.secs_in_state());
}
