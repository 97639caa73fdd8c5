//! chatface display core
//!
//! The face-animation controller of the chatface gadget. An emotion name from
//! the voice layer is resolved to an [`Emotion`], looked up in the board's
//! [`AssetTable`], and animated frame by frame on a timer tick. All scene
//! mutations go through one lock owned by [`ChatDisplay`].
//!
//! Boot runs a one-shot [`LogoSequence`] first; when it completes the face UI
//! is built and the face timer takes over.

pub mod assets;
pub mod display;
pub mod emotion;
pub mod error;
pub mod face;
pub mod logo;
pub mod surface;
pub mod timer;
pub mod variant;

pub use assets::{AssetTable, FrameSet, FrameTableConfig, ImageHandle};
pub use display::{ChatDisplay, DisplayStatus, Phase, TickOutcome};
pub use emotion::{Emotion, EmotionResolver};
pub use error::{Error, Result};
pub use face::{AnimationState, FaceAnimator, WrapPolicy};
pub use logo::{LogoSequence, LogoStep};
pub use surface::DisplaySurface;
pub use timer::{
    AnimationTimer, Cadence, CadenceConfig, TimerCallback, TimerDriver, TimerKind, TimerMode,
};
pub use variant::{BoardVariant, VariantOverrides};
