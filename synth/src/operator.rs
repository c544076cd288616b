//! Operator topology and per-operator parameter sets.
//!
//! Each operator owns one algorithm byte (addresses 1..=6):
//!
//! ```text
//!   bit   7    6    5    4    3    2    1    0
//!       ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!       │ -- │ m5 │ m4 │ m3 │ m2 │ m1 │ m0 │ C  │
//!       └────┴────┴────┴────┴────┴────┴────┴────┘
//!   C  = output is audible (carrier)
//!   mN = modulated by operator N
//! ```

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::events::SynthEvent;
use crate::parameter::{OPERATOR_COUNT, OperatorParameter, Parameter, algorithm_address};
use crate::transport::Transport;

const CARRIER_BIT: u8 = 0;

#[allow(clippy::cast_possible_truncation)]
const fn modulation_bit(modulator: usize) -> u8 {
    1 + modulator as u8
}

/// Every per-operator value of one operator. Rates and the delay are in
/// user polarity (higher is faster).
#[allow(clippy::struct_field_names)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorParams {
    pub algorithm: u8,
    pub feedback: u8,
    pub ratio: u8,
    pub ratio_fine: u8,
    pub fine: u8,
    pub level: u8,
    pub velocity_sensitivity: u8,
    pub key_breakpoint: u8,
    pub key_scale_left: u8,
    pub key_scale_right: u8,
    pub key_curve_left: u8,
    pub key_curve_right: u8,
    pub level0: u8,
    pub level1: u8,
    pub level2: u8,
    pub level3: u8,
    pub level4: u8,
    pub level5: u8,
    pub delay: u8,
    pub rate1: u8,
    pub rate2: u8,
    pub rate3: u8,
    pub rate4: u8,
    pub rate5: u8,
    pub rate_key: u8,
    pub amplitude_modulation_sensitivity: u8,
    pub pitch_modulation_sensitivity: u8,
    pub wave1: u8,
    pub wave2: u8,
    pub level_left: u8,
    pub level_right: u8,
    pub oscillator_mode: u8,
    pub oscillator_ratio: u8,
    pub phase: u8,
}

impl OperatorParams {
    /// The field that mirrors `parameter`.
    pub const fn field_mut(&mut self, parameter: OperatorParameter) -> &mut u8 {
        use OperatorParameter as P;
        match parameter {
            P::Algorithm => &mut self.algorithm,
            P::Feedback => &mut self.feedback,
            P::Ratio => &mut self.ratio,
            P::RatioFine => &mut self.ratio_fine,
            P::Fine => &mut self.fine,
            P::Level => &mut self.level,
            P::VelocitySensitivity => &mut self.velocity_sensitivity,
            P::KeyBreakpoint => &mut self.key_breakpoint,
            P::KeyScaleLeft => &mut self.key_scale_left,
            P::KeyScaleRight => &mut self.key_scale_right,
            P::KeyCurveLeft => &mut self.key_curve_left,
            P::KeyCurveRight => &mut self.key_curve_right,
            P::Level0 => &mut self.level0,
            P::Level1 => &mut self.level1,
            P::Level2 => &mut self.level2,
            P::Level3 => &mut self.level3,
            P::Level4 => &mut self.level4,
            P::Level5 => &mut self.level5,
            P::Delay => &mut self.delay,
            P::Rate1 => &mut self.rate1,
            P::Rate2 => &mut self.rate2,
            P::Rate3 => &mut self.rate3,
            P::Rate4 => &mut self.rate4,
            P::Rate5 => &mut self.rate5,
            P::RateKey => &mut self.rate_key,
            P::AmplitudeModulationSensitivity => &mut self.amplitude_modulation_sensitivity,
            P::PitchModulationSensitivity => &mut self.pitch_modulation_sensitivity,
            P::Wave1 => &mut self.wave1,
            P::Wave2 => &mut self.wave2,
            P::LevelLeft => &mut self.level_left,
            P::LevelRight => &mut self.level_right,
            P::OscillatorMode => &mut self.oscillator_mode,
            P::OscillatorRatio => &mut self.oscillator_ratio,
            P::Phase => &mut self.phase,
        }
    }

    #[must_use]
    pub const fn field(&self, parameter: OperatorParameter) -> u8 {
        use OperatorParameter as P;
        match parameter {
            P::Algorithm => self.algorithm,
            P::Feedback => self.feedback,
            P::Ratio => self.ratio,
            P::RatioFine => self.ratio_fine,
            P::Fine => self.fine,
            P::Level => self.level,
            P::VelocitySensitivity => self.velocity_sensitivity,
            P::KeyBreakpoint => self.key_breakpoint,
            P::KeyScaleLeft => self.key_scale_left,
            P::KeyScaleRight => self.key_scale_right,
            P::KeyCurveLeft => self.key_curve_left,
            P::KeyCurveRight => self.key_curve_right,
            P::Level0 => self.level0,
            P::Level1 => self.level1,
            P::Level2 => self.level2,
            P::Level3 => self.level3,
            P::Level4 => self.level4,
            P::Level5 => self.level5,
            P::Delay => self.delay,
            P::Rate1 => self.rate1,
            P::Rate2 => self.rate2,
            P::Rate3 => self.rate3,
            P::Rate4 => self.rate4,
            P::Rate5 => self.rate5,
            P::RateKey => self.rate_key,
            P::AmplitudeModulationSensitivity => self.amplitude_modulation_sensitivity,
            P::PitchModulationSensitivity => self.pitch_modulation_sensitivity,
            P::Wave1 => self.wave1,
            P::Wave2 => self.wave2,
            P::LevelLeft => self.level_left,
            P::LevelRight => self.level_right,
            P::OscillatorMode => self.oscillator_mode,
            P::OscillatorRatio => self.oscillator_ratio,
            P::Phase => self.phase,
        }
    }
}

impl<T: Transport> Controller<T> {
    /// Whether operator `op` is heard directly. `false` for any `op`
    /// outside 0..=5.
    pub fn is_carrier(&mut self, op: usize) -> Result<bool> {
        if op >= OPERATOR_COUNT {
            return Ok(false);
        }

        let byte = self.read_parameter(algorithm_address(op), true)?;
        Ok(byte.is_bit_on(CARRIER_BIT))
    }

    pub fn set_carrier(&mut self, op: usize, enabled: bool) -> Result<()> {
        if op >= OPERATOR_COUNT {
            return Ok(());
        }

        self.update_algorithm_bit(op, CARRIER_BIT, enabled)
    }

    /// Whether `modulator` feeds into operator `op`.
    pub fn is_modulating(&mut self, op: usize, modulator: usize) -> Result<bool> {
        if op >= OPERATOR_COUNT || modulator >= OPERATOR_COUNT {
            return Ok(false);
        }

        let byte = self.read_parameter(algorithm_address(op), true)?;
        Ok(byte.is_bit_on(modulation_bit(modulator)))
    }

    /// Modulation sources of operator `op`, bit `m` set when operator `m`
    /// feeds into it. Zero for any `op` outside 0..=5.
    pub fn modulators(&mut self, op: usize) -> Result<u8> {
        if op >= OPERATOR_COUNT {
            return Ok(0);
        }

        let byte = self.read_parameter(algorithm_address(op), true)?;
        Ok(byte.get_bits(1..=6))
    }

    pub fn set_modulating(&mut self, op: usize, modulator: usize, enabled: bool) -> Result<()> {
        if op >= OPERATOR_COUNT || modulator >= OPERATOR_COUNT {
            return Ok(());
        }

        self.update_algorithm_bit(op, modulation_bit(modulator), enabled)
    }

    fn update_algorithm_bit(&mut self, op: usize, bit: u8, enabled: bool) -> Result<()> {
        let address = algorithm_address(op);
        let mut byte = self.read_parameter(address, true)?;
        byte.set_bit(bit, enabled);
        self.write_parameter(address, byte)?;

        self.notify(SynthEvent::TopologyChanged);
        Ok(())
    }

    pub fn operator(&mut self, op: usize) -> Result<OperatorParams> {
        if op >= OPERATOR_COUNT {
            return Err(Error::OperatorOutOfRange(op));
        }

        let mut params = OperatorParams::default();
        for parameter in OperatorParameter::ALL {
            *params.field_mut(parameter) = self.value(Parameter::Operator(op, parameter))?;
        }
        Ok(params)
    }

    pub fn operators(&mut self) -> Result<Vec<OperatorParams>> {
        (0..OPERATOR_COUNT).map(|op| self.operator(op)).collect()
    }

    /// Writes back a whole operator. Unchanged registers cost nothing.
    pub fn update_operator(&mut self, op: usize, params: &OperatorParams, notify: bool) -> Result<()> {
        if op >= OPERATOR_COUNT {
            return Err(Error::OperatorOutOfRange(op));
        }

        for parameter in OperatorParameter::ALL {
            self.set_value(Parameter::Operator(op, parameter), params.field(parameter))?;
        }

        if notify {
            self.notify(SynthEvent::TopologyChanged);
        }
        Ok(())
    }
}
