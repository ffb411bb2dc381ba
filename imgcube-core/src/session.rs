/// Frame-driven owner of the cube, the animator and the move queue
use log::warn;

use crate::animator::{RotationAnimator, TickOutcome, TurnHandle, TurnReport, QUARTER_TURN};
use crate::config::Config;
use crate::cube::{Cube, Surface};
use crate::error::{Error, Result};
use crate::matrix::Axis;
use crate::notation::{parse_twists, Twist};
use crate::shuffle::{ShuffleHandle, ShuffleSequencer};

/// Something that happened during a [`Session::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A queued turn started on these pieces
    TurnBegan { twist: Twist, pieces: Vec<usize> },
    Stepped { degrees: u32 },
    TurnCompleted(TurnReport),
}

#[derive(Debug)]
pub struct Session {
    config: Config,
    cube: Cube,
    animator: RotationAnimator,
    sequencer: ShuffleSequencer,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cube: Cube::from_config(&config),
            animator: RotationAnimator::new(config.schedule.clone(), config.ambient_ratio),
            sequencer: ShuffleSequencer::from_seed(config.seed, config.pause_ticks),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    /// A turn is animating or a sequence is queued
    pub fn is_busy(&self) -> bool {
        !self.animator.is_idle() || self.sequencer.is_running()
    }

    /// Start a single turn right away
    pub fn twist(&mut self, twist: Twist) -> Result<TurnHandle> {
        if self.sequencer.is_running() {
            warn!("twist {twist} rejected: a move sequence is running");
            return Err(Error::Busy);
        }
        let pieces = self.cube.layer(twist.axis, twist.layer);
        self.animator
            .begin_rotation(pieces, twist.axis, twist.direction, QUARTER_TURN)
    }

    /// Queue `n` random turns
    pub fn shuffle(&mut self, n: usize) -> Result<ShuffleHandle> {
        if !self.animator.is_idle() {
            return Err(Error::Busy);
        }
        self.sequencer.shuffle(n)
    }

    /// Queue the configured number of random turns
    pub fn shuffle_default(&mut self) -> Result<ShuffleHandle> {
        self.shuffle(self.config.shuffle_moves)
    }

    pub fn play(&mut self, twists: Vec<Twist>) -> Result<ShuffleHandle> {
        if !self.animator.is_idle() {
            return Err(Error::Busy);
        }
        self.sequencer.play(twists)
    }

    pub fn play_notation(&mut self, notation: &str) -> Result<ShuffleHandle> {
        let twists = parse_twists(notation)?;
        self.play(twists)
    }

    /// Turn the viewer's orientation of the whole assembly
    pub fn rotate_view(&mut self, axis: Axis, degrees: f64, surface: &mut dyn Surface) {
        self.cube.rotate_world(axis, degrees);
        self.cube.render(surface);
    }

    /// Restore the configured viewer orientation
    pub fn reset_view(&mut self, surface: &mut dyn Surface) {
        self.cube.set_world(self.config.world_transform());
        self.cube.render(surface);
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        self.cube.render(surface);
    }

    /// Advance one frame
    pub fn tick(&mut self, surface: &mut dyn Surface) -> Result<Vec<SessionEvent>> {
        let mut events = Vec::new();
        if let Some(started) = self.sequencer.poll(&mut self.animator, &self.cube)? {
            events.push(SessionEvent::TurnBegan {
                twist: started.twist,
                pieces: started.pieces,
            });
        }
        match self.animator.tick(&mut self.cube, surface) {
            TickOutcome::Idle => {}
            TickOutcome::Stepped { degrees } => events.push(SessionEvent::Stepped { degrees }),
            TickOutcome::Completed { degrees, report } => {
                events.push(SessionEvent::Stepped { degrees });
                events.push(SessionEvent::TurnCompleted(report));
            }
        }
        Ok(events)
    }
}
