/// Strictly sequential chains of quarter turns
use futures::channel::oneshot;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::animator::{RotationAnimator, TurnHandle, QUARTER_TURN};
use crate::cube::Cube;
use crate::error::{Error, Result};
use crate::matrix::Axis;
use crate::notation::Twist;
use crate::piece::Direction;

/// Summary delivered through a [`ShuffleHandle`] once every turn has settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleReport {
    pub twists: Vec<Twist>,
}

pub type ShuffleHandle = oneshot::Receiver<ShuffleReport>;

/// A turn that the sequencer has just started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedTurn {
    pub twist: Twist,
    pub pieces: Vec<usize>,
}

#[derive(Debug)]
enum MoveSource {
    Random { remaining: usize },
    Script(VecDeque<Twist>),
}

#[derive(Debug)]
struct Sequence {
    source: MoveSource,
    played: Vec<Twist>,
    in_flight: Option<TurnHandle>,
    cooldown: u32,
    done: oneshot::Sender<ShuffleReport>,
}

impl Sequence {
    fn is_exhausted(&self) -> bool {
        match &self.source {
            MoveSource::Random { remaining } => *remaining == 0,
            MoveSource::Script(moves) => moves.is_empty(),
        }
    }
}

#[derive(Debug)]
pub struct ShuffleSequencer {
    rng: ChaCha8Rng,
    pause_ticks: u32,
    active: Option<Sequence>,
}

impl ShuffleSequencer {
    pub fn new(rng: ChaCha8Rng, pause_ticks: u32) -> Self {
        Self {
            rng,
            pause_ticks,
            active: None,
        }
    }

    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn from_seed(seed: Option<u64>, pause_ticks: u32) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(rng, pause_ticks)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Queue `n` random quarter turns
    pub fn shuffle(&mut self, n: usize) -> Result<ShuffleHandle> {
        self.start(MoveSource::Random { remaining: n })
    }

    /// Queue a fixed list of turns
    pub fn play(&mut self, twists: Vec<Twist>) -> Result<ShuffleHandle> {
        self.start(MoveSource::Script(twists.into()))
    }

    fn start(&mut self, source: MoveSource) -> Result<ShuffleHandle> {
        if self.is_running() {
            return Err(Error::Busy);
        }
        let (done, handle) = oneshot::channel();
        self.active = Some(Sequence {
            source,
            played: Vec::new(),
            in_flight: None,
            cooldown: 0,
            done,
        });
        debug!("move sequence started");
        Ok(handle)
    }

    /// Uniform over layer, axis and direction
    pub fn random_twist(&mut self) -> Twist {
        let layer = self.rng.gen_range(-1..=1);
        let axis = match self.rng.gen_range(0..3) {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        };
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Ccw
        } else {
            Direction::Cw
        };
        Twist::new(axis, layer, direction)
    }

    /// Start the next turn when the previous one has settled.
    ///
    /// Call once per frame before ticking the animator. The affected layer
    /// is read from `cube` at the moment the turn starts.
    pub fn poll(&mut self, animator: &mut RotationAnimator, cube: &Cube) -> Result<Option<StartedTurn>> {
        let Some(sequence) = self.active.as_mut() else {
            return Ok(None);
        };

        if let Some(handle) = sequence.in_flight.as_mut() {
            match handle.try_recv() {
                Ok(None) => return Ok(None),
                // Settled, or the animator dropped it; either way the slot is free
                Ok(Some(_)) | Err(oneshot::Canceled) => {
                    sequence.in_flight = None;
                    sequence.cooldown = self.pause_ticks;
                }
            }
        }

        if sequence.is_exhausted() {
            self.finish();
            return Ok(None);
        }
        if sequence.cooldown > 0 {
            sequence.cooldown -= 1;
            return Ok(None);
        }
        if !animator.is_idle() {
            return Ok(None);
        }

        let twist = match &mut sequence.source {
            MoveSource::Random { remaining } => {
                *remaining -= 1;
                None
            }
            MoveSource::Script(moves) => moves.pop_front(),
        };
        let twist = match twist {
            Some(twist) => twist,
            None => self.random_twist(),
        };

        let pieces = cube.layer(twist.axis, twist.layer);
        let handle = animator.begin_rotation(pieces.clone(), twist.axis, twist.direction, QUARTER_TURN)?;
        if let Some(sequence) = self.active.as_mut() {
            sequence.in_flight = Some(handle);
            sequence.played.push(twist);
        }
        Ok(Some(StartedTurn { twist, pieces }))
    }

    fn finish(&mut self) {
        if let Some(sequence) = self.active.take() {
            debug!("move sequence finished after {} turns", sequence.played.len());
            let _ = sequence.done.send(ShuffleReport {
                twists: sequence.played,
            });
        }
    }
}
