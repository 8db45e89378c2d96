//! Software rendering onto RGB frames: primitives, bitmap text, per-frame
//! annotation and highlight reel composition.

pub mod annotate;
pub mod canvas;
pub mod composer;
pub mod font;

pub use annotate::{annotate_frame, info_line, FrameStatus};
pub use composer::{transition_card, ClipComposer, CompositionSummary};
pub use font::{draw_text, text_width};
