//! Seven-segment display frames.
//!
//! The display is four digits wide.  Once per elapsed second the loop
//! shows either the state glyphs or, every few seconds, the rounded
//! coolant temperature.  Only a handful of letters render legibly on
//! seven segments, hence the odd spellings.

use core::fmt::Write;

use heapless::String;

use crate::fsm::StateId;

/// Rendered frame text.  Four glyphs plus headroom.
pub type FrameText = String<8>;

/// What the display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFrame {
    State(StateId),
    /// Rounded coolant temperature in °C.
    Temperature(i16),
    /// Halt screen: either `Err` or the diagnostic code.
    Alarm { code: u8, show_code: bool },
}

impl DisplayFrame {
    /// Temperature frame, rounded and clamped to what fits in three digits.
    pub fn temperature(celsius: f32) -> Self {
        Self::Temperature(celsius.round().clamp(-99.0, 999.0) as i16)
    }

    pub fn render(&self) -> FrameText {
        let mut text = FrameText::new();
        let written = match *self {
            Self::State(state) => text.push_str(state_glyphs(state)).map_err(|_| core::fmt::Error),
            Self::Temperature(c) => write!(text, "{c:>3}C"),
            Self::Alarm { show_code: false, .. } => text.push_str("Err ").map_err(|_| core::fmt::Error),
            Self::Alarm { code, show_code: true } => write!(text, "E {code:02}"),
        };
        debug_assert!(written.is_ok(), "frame text overflow: {self:?}");
        text
    }
}

/// Four-glyph spelling of each state.
pub const fn state_glyphs(state: StateId) -> &'static str {
    match state {
        StateId::Idle => "IdLE",
        StateId::Starting => "Strt",
        StateId::Cooling => "COOL",
        StateId::Holding => "HoLd",
        StateId::Cooldown => "C-dn",
    }
}

/// Frame for the current second: temperature every `temperature_every`
/// seconds, state otherwise.
pub fn frame_for(elapsed_secs: u32, temperature_every: u32, state: StateId, primary_c: f32) -> DisplayFrame {
    if temperature_every != 0 && elapsed_secs % temperature_every == 0 {
        DisplayFrame::temperature(primary_c)
    } else {
        DisplayFrame::State(state)
    }
}
