/// Animated quarter turns.
///
/// A [`RotationAnimator`] holds at most one rotation in flight. Each call to
/// [`RotationAnimator::tick`] eats one increment of the angular budget,
/// pre-rotates the affected pieces by it and nudges the world transform. The
/// tick that exhausts the budget settles the pieces into their new discrete
/// state and resolves the completion handle.
use futures::channel::oneshot;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::cube::{Cube, Surface};
use crate::error::{Error, Result};
use crate::matrix::Axis;
use crate::piece::Direction;

/// Budget consumed by a single quarter turn, degrees
pub const QUARTER_TURN: u32 = 90;

/// While more than `above` degrees remain, step by `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub above: u32,
    pub step: u32,
}

/// Easing schedule: large increments early, single degrees at the end.
///
/// Deserializing goes through [`StepSchedule::new`], so an invalid band list
/// is rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleBands")]
pub struct StepSchedule {
    bands: Vec<Band>,
}

/// Unchecked serialized form of a [`StepSchedule`]
#[derive(Deserialize)]
struct ScheduleBands {
    bands: Vec<Band>,
}

impl TryFrom<ScheduleBands> for StepSchedule {
    type Error = Error;

    fn try_from(raw: ScheduleBands) -> Result<Self> {
        Self::new(raw.bands)
    }
}

impl StepSchedule {
    pub fn new(bands: Vec<Band>) -> Result<Self> {
        let schedule = Self { bands };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Five bands of 5, 4, 3, 2 and 1 degrees; 24 ticks per quarter turn
    pub fn classic() -> Self {
        Self {
            bands: vec![
                Band { above: 20, step: 5 },
                Band { above: 15, step: 4 },
                Band { above: 10, step: 3 },
                Band { above: 5, step: 2 },
                Band { above: 0, step: 1 },
            ],
        }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn validate(&self) -> Result<()> {
        let Some(last) = self.bands.last() else {
            return Err(Error::Config("schedule needs at least one band".to_string()));
        };
        if last.above != 0 || last.step != 1 {
            return Err(Error::Config(
                "last schedule band must be { above = 0, step = 1 }".to_string(),
            ));
        }
        if self.bands.iter().any(|b| b.step == 0) {
            return Err(Error::Config("schedule steps must be positive".to_string()));
        }
        if self.bands.windows(2).any(|w| w[0].above <= w[1].above) {
            return Err(Error::Config(
                "schedule thresholds must be strictly decreasing".to_string(),
            ));
        }
        Ok(())
    }

    /// Increment to consume with `remaining` degrees left, never overshooting
    pub fn increment(&self, remaining: u32) -> u32 {
        self.bands
            .iter()
            .find(|b| remaining > b.above)
            .map_or(0, |b| b.step.min(remaining))
    }

    /// Every increment of a rotation of `total` degrees, in order
    pub fn plan(&self, total: u32) -> Vec<u32> {
        let mut remaining = total;
        let mut steps = Vec::new();
        while remaining > 0 {
            let step = self.increment(remaining);
            if step == 0 {
                break;
            }
            remaining -= step;
            steps.push(step);
        }
        steps
    }
}

impl Default for StepSchedule {
    /// Fourteen ticks per quarter turn
    fn default() -> Self {
        Self {
            bands: vec![
                Band { above: 40, step: 10 },
                Band { above: 20, step: 8 },
                Band { above: 8, step: 5 },
                Band { above: 2, step: 2 },
                Band { above: 0, step: 1 },
            ],
        }
    }
}

/// Summary delivered through a [`TurnHandle`] when a rotation finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub axis: Axis,
    pub direction: Direction,
    pub degrees: u32,
    pub pieces: Vec<usize>,
    pub ticks: u32,
}

/// Resolves with a [`TurnReport`] once the rotation has settled
pub type TurnHandle = oneshot::Receiver<TurnReport>;

/// A rotation in flight
#[derive(Debug)]
pub struct ActiveRotation {
    pub axis: Axis,
    pub direction: Direction,
    pub total: u32,
    pub remaining: u32,
    pub pieces: Vec<usize>,
    pub ticks: u32,
    done: oneshot::Sender<TurnReport>,
}

#[derive(Debug, Default)]
pub enum AnimatorState {
    #[default]
    Idle,
    Animating(ActiveRotation),
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Stepped { degrees: u32 },
    Completed { degrees: u32, report: TurnReport },
}

#[derive(Debug)]
pub struct RotationAnimator {
    schedule: StepSchedule,
    ambient_ratio: f64,
    state: AnimatorState,
}

impl RotationAnimator {
    pub fn new(schedule: StepSchedule, ambient_ratio: f64) -> Self {
        Self {
            schedule,
            ambient_ratio,
            state: AnimatorState::Idle,
        }
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    pub fn state(&self) -> &AnimatorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, AnimatorState::Idle)
    }

    /// Start turning `pieces` about `axis` by `total_degrees`.
    ///
    /// Fails with [`Error::Busy`] while another rotation is running and with
    /// [`Error::InvalidAngle`] unless the angle is a positive multiple of 90.
    pub fn begin_rotation(
        &mut self,
        pieces: Vec<usize>,
        axis: Axis,
        direction: Direction,
        total_degrees: u32,
    ) -> Result<TurnHandle> {
        if !self.is_idle() {
            warn!("rotation about {axis} rejected: animator busy");
            return Err(Error::Busy);
        }
        if total_degrees == 0 || total_degrees % QUARTER_TURN != 0 {
            return Err(Error::InvalidAngle(total_degrees));
        }

        debug!(
            "begin {total_degrees} degree rotation about {axis} ({direction:?}) of {} pieces",
            pieces.len()
        );
        let (done, handle) = oneshot::channel();
        self.state = AnimatorState::Animating(ActiveRotation {
            axis,
            direction,
            total: total_degrees,
            remaining: total_degrees,
            pieces,
            ticks: 0,
            done,
        });
        Ok(handle)
    }

    /// Advance the rotation in flight by one frame
    pub fn tick(&mut self, cube: &mut Cube, surface: &mut dyn Surface) -> TickOutcome {
        let AnimatorState::Animating(mut active) = std::mem::take(&mut self.state) else {
            return TickOutcome::Idle;
        };

        let step = self.schedule.increment(active.remaining);
        active.remaining -= step;
        active.ticks += 1;

        let signed = f64::from(active.direction.sign()) * f64::from(step);
        for &index in &active.pieces {
            cube.pieces_mut()[index].pre_rotate(active.axis, signed);
        }
        cube.rotate_world(active.axis, -signed * self.ambient_ratio);
        trace!(
            "tick {}: stepped {step}, {} remaining",
            active.ticks,
            active.remaining
        );

        if active.remaining > 0 {
            cube.render(surface);
            self.state = AnimatorState::Animating(active);
            return TickOutcome::Stepped { degrees: step };
        }

        // Discrete state catches up and replaces the accumulated transforms
        let cell_size = cube.cell_size();
        let quarter_turns = active.total / QUARTER_TURN;
        for &index in &active.pieces {
            cube.pieces_mut()[index].settle(active.axis, active.direction, quarter_turns, cell_size);
        }
        cube.render(surface);

        let report = TurnReport {
            axis: active.axis,
            direction: active.direction,
            degrees: active.total,
            pieces: active.pieces,
            ticks: active.ticks,
        };
        debug!("rotation about {} settled after {} ticks", report.axis, report.ticks);
        // A dropped handle just means nobody is waiting
        let _ = active.done.send(report.clone());
        TickOutcome::Completed {
            degrees: step,
            report,
        }
    }
}
