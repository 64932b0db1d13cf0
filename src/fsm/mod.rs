//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  StateTable                                               │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle     │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Starting │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Cooling  │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Holding  │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ Cooldown │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └──────────┴───────────┴──────────┴───────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine re-applies the current state's outputs, then
//! calls its `on_update`.  If that returns `Some(next_id)` for a
//! different state, the engine runs `on_exit` for the current state and
//! `on_enter` for the next.  A request for the already-active state is
//! ignored, so it never re-arms that state's timer.

pub mod context;
pub mod states;

use context::{ActuatorOutputs, FsmContext};
use log::info;
use serde::Serialize;

use crate::error::FatalFault;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all duty-cycle states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Starting = 1,
    Cooling = 2,
    Holding = 3,
    Cooldown = 4,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 5;

    pub const ALL: [StateId; StateId::COUNT] = [
        Self::Idle,
        Self::Starting,
        Self::Cooling,
        Self::Holding,
        Self::Cooldown,
    ];

    /// Compressor, solenoid and fan for this state.
    pub const fn outputs(self) -> ActuatorOutputs {
        match self {
            Self::Idle => ActuatorOutputs::new(false, false, false),
            Self::Starting => ActuatorOutputs::new(true, true, false),
            Self::Cooling => ActuatorOutputs::new(true, false, true),
            Self::Holding => ActuatorOutputs::new(true, true, true),
            Self::Cooldown => ActuatorOutputs::new(false, false, true),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Starting => "Starting",
            Self::Cooling => "Cooling",
            Self::Holding => "Holding",
            Self::Cooldown => "Cooldown",
        }
    }
}

impl TryFrom<u8> for StateId {
    type Error = FatalFault;

    fn try_from(idx: u8) -> Result<Self, FatalFault> {
        Self::ALL
            .get(usize::from(idx))
            .copied()
            .ok_or(FatalFault::UnknownState(idx))
    }
}

impl core::fmt::Display for StateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to request a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// A transition the engine applied during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is owned by the caller and threaded through every
/// handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Currently active state.
    current: StateId,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    ///
    /// Every row must sit at the index of its own `StateId`; a misplaced
    /// row would run the wrong handlers and is rejected as an unknown
    /// state.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Result<Self, FatalFault> {
        for (idx, desc) in table.iter().enumerate() {
            let idx = u8::try_from(idx).map_err(|_| FatalFault::UnknownState(u8::MAX))?;
            if StateId::try_from(idx)? != desc.id {
                return Err(FatalFault::UnknownState(idx));
            }
        }
        Ok(Self {
            table,
            current: initial,
        })
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.descriptor().name);
        ctx.entered_at_secs = ctx.elapsed_secs();
        ctx.outputs = self.current.outputs();
        if let Some(enter) = self.descriptor().on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one loop iteration.
    ///
    /// 1. Re-apply the current state's outputs.
    /// 2. Call `on_update` for the current state.
    /// 3. If it requested another state, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> Option<Transition> {
        ctx.outputs = self.current.outputs();

        let next = (self.descriptor().on_update)(ctx)?;
        self.transition(next, ctx)
    }

    /// Force an immediate transition, bypassing the update predicates.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) -> Option<Transition> {
        self.transition(next, ctx)
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.current
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn descriptor(&self) -> &StateDescriptor {
        &self.table[self.current as usize]
    }

    fn transition(&mut self, next: StateId, ctx: &mut FsmContext) -> Option<Transition> {
        if next == self.current {
            return None;
        }
        let from = self.current;

        info!(
            "FSM transition: {} -> {}",
            self.descriptor().name,
            self.table[next as usize].name
        );

        // Exit current state
        if let Some(exit) = self.descriptor().on_exit {
            exit(ctx);
        }

        // Update pointer and timing
        self.current = next;
        ctx.entered_at_secs = ctx.elapsed_secs();
        ctx.timer = context::StateTimer::None;
        ctx.outputs = next.outputs();

        // Enter new state
        if let Some(enter) = self.descriptor().on_enter {
            enter(ctx);
        }

        Some(Transition { from, to: next })
    }
}
