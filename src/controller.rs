//! Proportional beam-steering controller.
//!
//! Each axis gets a voltage proportional to the feature's pixel offset from
//! the frame center, negated so the beam steers the feature back toward the
//! setpoint. The command saturates at `max_volts` per axis; it is never
//! dropped for a large offset, only clamped. Commands are emitted on a
//! cycle cadence (`emit_every`) to keep the analog output rate below the
//! frame rate; off-cadence cycles write nothing.
//!
//! While the actuator is disabled the controller writes an explicit zero on
//! every cycle, so re-enabling never replays a stale deflection.

use crate::types::ControlCommand;

/// Proportional controller with saturation and an emit cadence.
#[derive(Debug, Clone)]
pub struct Controller {
    limit_radius: f64,
    max_volts: f64,
    emit_every: u32,
    cycle: u32,
}

impl Controller {
    /// Create a controller from its three tuning parameters.
    pub fn new(limit_radius: f64, max_volts: f64, emit_every: u32) -> Self {
        Self {
            limit_radius,
            max_volts,
            emit_every,
            cycle: 0,
        }
    }

    /// The pure control law for one axis: `-max_volts * offset / limit`,
    /// clamped to `±max_volts`.
    fn axis_volts(&self, offset_px: i32) -> f64 {
        let raw = -self.max_volts * f64::from(offset_px) / self.limit_radius;
        raw.clamp(-self.max_volts, self.max_volts)
    }

    /// The command for a given pixel offset, ignoring the cadence.
    pub fn command(&self, offset: (i32, i32)) -> ControlCommand {
        ControlCommand {
            x_volts: self.axis_volts(offset.0),
            y_volts: self.axis_volts(offset.1),
        }
    }

    /// Advance one processing cycle and return what to write, if anything.
    ///
    /// Disabled cycles always return zero and do not advance the cadence
    /// counter. Enabled cycles advance the counter and emit a command on
    /// every `emit_every`-th cycle.
    pub fn tick(&mut self, offset: (i32, i32), enabled: bool) -> Option<ControlCommand> {
        if !enabled {
            return Some(ControlCommand::ZERO);
        }
        self.cycle += 1;
        if self.cycle % self.emit_every == 0 {
            Some(self.command(offset))
        } else {
            None
        }
    }
}
