/// imgcube core library - transforms, piece state and turn animation
///
/// This library holds everything with real geometry in it: the 4x4
/// transform type, the discrete state of the 27 pieces, the eased quarter
/// turn animator and the move sequencer. Rendering is left to a `Surface`.

pub mod animator;
pub mod config;
pub mod cube;
pub mod error;
pub mod matrix;
pub mod notation;
pub mod piece;
pub mod session;
pub mod shuffle;
pub mod transform;

// Re-export commonly used types
pub use animator::{Band, RotationAnimator, StepSchedule, TickOutcome, TurnHandle, TurnReport};
pub use config::{Config, ViewConfig};
pub use cube::{Cube, FaceTransform, NullSurface, Surface};
pub use error::{Error, Result};
pub use matrix::{Axis, Mat4};
pub use notation::{format_twists, parse_twists, Twist};
pub use piece::{Direction, FaceDirection, GridCoord, Piece, PieceOrientation};
pub use session::{Session, SessionEvent};
pub use shuffle::{ShuffleHandle, ShuffleReport, ShuffleSequencer};
pub use transform::{TransformScope, TransformStack};
