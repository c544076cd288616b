//! XFM2 parameter address space.
//!
//! Every register of the 512-byte image has a fixed address. Per-operator
//! registers come in families of six consecutive addresses (one per operator),
//! except the left/right output levels which are interleaved. Everything else
//! is a single global register.
//!
//! The wire protocol splits the space in two tiers (0..=255 as one byte,
//! 256..=511 escaped); that split lives in [`crate::protocol`] and carries no
//! meaning here.

/// Size of the register image.
pub const REGISTER_COUNT: usize = 512;

/// Number of FM operators.
pub const OPERATOR_COUNT: usize = 6;

/// Unused addresses between the operator envelope level/rate families.
/// Each family spans 7 addresses; the seventh never carries a parameter.
pub const RESERVED_ENVELOPE_SLOTS: [u16; 7] = [81, 88, 95, 102, 109, 116, 123];

/// Address of the algorithm (carrier + modulation) byte of operator `op`.
#[must_use]
pub const fn algorithm_address(op: usize) -> u16 {
    OperatorParameter::Algorithm.address(op)
}

/// A register that exists once per operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorParameter {
    /// Carrier flag (bit 0) and modulation sources (bits 1..=6).
    Algorithm,
    Feedback,
    Ratio,
    RatioFine,
    Fine,
    Level,
    VelocitySensitivity,
    KeyBreakpoint,
    KeyScaleLeft,
    KeyScaleRight,
    KeyCurveLeft,
    KeyCurveRight,
    Level0,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    /// Envelope delay, shown to users as rate R0.
    Delay,
    Rate1,
    Rate2,
    Rate3,
    Rate4,
    Rate5,
    RateKey,
    AmplitudeModulationSensitivity,
    PitchModulationSensitivity,
    Wave1,
    Wave2,
    LevelLeft,
    LevelRight,
    OscillatorMode,
    OscillatorRatio,
    Phase,
}

impl OperatorParameter {
    /// Every per-operator register.
    pub const ALL: [Self; 34] = [
        Self::Algorithm,
        Self::Feedback,
        Self::Ratio,
        Self::RatioFine,
        Self::Fine,
        Self::Level,
        Self::VelocitySensitivity,
        Self::KeyBreakpoint,
        Self::KeyScaleLeft,
        Self::KeyScaleRight,
        Self::KeyCurveLeft,
        Self::KeyCurveRight,
        Self::Level0,
        Self::Level1,
        Self::Level2,
        Self::Level3,
        Self::Level4,
        Self::Level5,
        Self::Delay,
        Self::Rate1,
        Self::Rate2,
        Self::Rate3,
        Self::Rate4,
        Self::Rate5,
        Self::RateKey,
        Self::AmplitudeModulationSensitivity,
        Self::PitchModulationSensitivity,
        Self::Wave1,
        Self::Wave2,
        Self::LevelLeft,
        Self::LevelRight,
        Self::OscillatorMode,
        Self::OscillatorRatio,
        Self::Phase,
    ];

    /// Address of the operator 1 register, for the families laid out `base + op`.
    const fn base(self) -> u16 {
        match self {
            Self::Algorithm => 1,
            Self::Feedback => 7,
            Self::Ratio => 15,
            Self::RatioFine => 21,
            Self::Fine => 27,
            Self::Level => 33,
            Self::VelocitySensitivity => 39,
            Self::KeyBreakpoint => 45,
            Self::KeyScaleLeft => 51,
            Self::KeyScaleRight => 57,
            Self::KeyCurveLeft => 63,
            Self::KeyCurveRight => 69,
            Self::Level1 => 75,
            Self::Level2 => 82,
            Self::Level3 => 89,
            Self::Level4 => 96,
            Self::Rate1 => 103,
            Self::Rate2 => 110,
            Self::Rate3 => 117,
            Self::Rate4 => 124,
            Self::RateKey => 140,
            Self::AmplitudeModulationSensitivity => 159,
            Self::Level0 => 181,
            Self::Delay => 187,
            Self::Level5 => 193,
            Self::Rate5 => 199,
            Self::PitchModulationSensitivity => 222,
            Self::Wave1 => 236,
            Self::LevelLeft => 256,
            Self::LevelRight => 257,
            Self::Wave2 => 268,
            Self::OscillatorMode => 274,
            Self::OscillatorRatio => 280,
            Self::Phase => 286,
        }
    }

    /// Register address of this parameter for operator `op` (0-based).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn address(self, op: usize) -> u16 {
        debug_assert!(op < OPERATOR_COUNT);
        let op = op as u16;
        match self {
            Self::LevelLeft | Self::LevelRight => self.base() + 2 * op,
            _ => self.base() + op,
        }
    }

    /// Rates and the delay are stored inverted on the hardware.
    #[must_use]
    pub const fn is_rate(self) -> bool {
        matches!(
            self,
            Self::Delay | Self::Rate1 | Self::Rate2 | Self::Rate3 | Self::Rate4 | Self::Rate5
        )
    }
}

/// A register that exists once per patch. The discriminant is the address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Global {
    OperatorSync = 13,
    OperatorMode = 14,

    PitchEgLevel1 = 130,
    PitchEgLevel2 = 131,
    PitchEgLevel3 = 132,
    PitchEgLevel4 = 133,
    PitchEgRate1 = 134,
    PitchEgRate2 = 135,
    PitchEgRate3 = 136,
    PitchEgRate4 = 137,
    PitchEgRange = 138,
    PitchEgVelocity = 139,
    PitchEgRateKey = 146,

    LfoDepthPitch = 149,
    LfoDepthAmplitude = 150,
    LfoSpeed = 151,
    LfoSync = 152,
    LfoWave = 153,
    LfoFade = 154,

    ModPitchLfoWheel = 155,
    ModAmpLfoWheel = 156,
    ModPitchLfoAftertouch = 157,
    ModAmpLfoAftertouch = 158,

    MasterPitchBendUp = 172,
    MasterPitchBendDown = 173,
    MasterTranspose = 174,
    MasterVolume = 180,

    PitchEgLevel0 = 205,
    /// Pitch envelope delay, shown to users as rate R0.
    PitchEgDelay = 206,
    PitchEgLevel5 = 207,
    PitchEgRate5 = 208,

    ModPitchLfoBreath = 209,
    ModAmpLfoBreath = 210,
    ModPitchLfoFoot = 211,
    ModAmpLfoFoot = 212,
    ModEgBiasAftertouch = 213,
    ModEgBiasWheel = 214,
    ModEgBiasBreath = 215,
    ModEgBiasFoot = 216,
    ModPitchAftertouch = 217,
    ModPitchBreath = 218,
    ModPitchFoot = 219,
    ModPitchRandom = 220,

    MasterPan = 221,
    MasterLegato = 228,
    PortamentoMode = 229,
    PortamentoTime = 230,
    MasterVelocityOffset = 242,
    EnvelopeLoop = 244,
    EnvelopeLoopSegment = 245,
    EnvelopeRestart = 246,
    MasterTuning = 251,

    FxDelayDry = 300,
    FxDelayWet = 301,
    FxDelayMode = 302,
    FxDelayTime = 303,
    FxDelayFeedback = 304,
    FxDelayLowPass = 305,
    FxDelayHighPass = 306,
    FxDelayTempo = 307,
    FxDelayMultiplier = 308,
    FxDelayDivider = 309,

    FxPhaserDry = 310,
    FxPhaserWet = 311,
    FxPhaserMode = 312,
    FxPhaserDepth = 313,
    FxPhaserSpeed = 314,
    FxPhaserFeedback = 315,
    FxPhaserOffset = 316,
    FxPhaserStages = 317,
    FxPhaserPhase = 318,

    FilterLoCutoff = 320,
    FilterHiCutoff = 321,

    FxAmSpeed = 330,
    FxAmRange = 331,
    FxAmDepth = 332,
    FxAmPhase = 333,

    FxChorusDry = 360,
    FxChorusWet = 361,
    FxChorusMode = 362,
    FxChorusSpeed = 363,
    FxChorusDepth = 364,
    FxChorusFeedback = 365,
    FxChorusPhase = 366,

    FxDecimatorDepth = 370,
    FxBitCrusherDepth = 380,

    FxReverbDry = 390,
    FxReverbWet = 391,
    FxReverbMode = 392,
    FxReverbDecay = 393,
    FxReverbDamp = 394,

    FxRouting = 410,
    OutputLevel = 411,

    PerformanceCtrl1Hi = 420,
    PerformanceCtrl1Lo = 421,
    PerformanceCtrl2Hi = 422,
    PerformanceCtrl2Lo = 423,
    PerformanceCtrl3Hi = 424,
    PerformanceCtrl3Lo = 425,
    PerformanceCtrl4Hi = 426,
    PerformanceCtrl4Lo = 427,

    ArpeggiatorMode = 450,
    ArpeggiatorTempo = 451,
    ArpeggiatorReserved = 452,
    ArpeggiatorTempoMultiplier = 453,
    ArpeggiatorOctaveRange = 454,
}

impl Global {
    #[must_use]
    pub const fn address(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub const fn is_rate(self) -> bool {
        matches!(
            self,
            Self::PitchEgDelay
                | Self::PitchEgRate1
                | Self::PitchEgRate2
                | Self::PitchEgRate3
                | Self::PitchEgRate4
                | Self::PitchEgRate5
        )
    }
}

/// Any named register of the patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Operator index (0-based) and the per-operator register.
    Operator(usize, OperatorParameter),
    Global(Global),
}

impl Parameter {
    #[must_use]
    pub const fn address(self) -> u16 {
        match self {
            Self::Operator(op, param) => param.address(op),
            Self::Global(global) => global.address(),
        }
    }

    #[must_use]
    pub const fn is_rate(self) -> bool {
        match self {
            Self::Operator(_, param) => param.is_rate(),
            Self::Global(global) => global.is_rate(),
        }
    }
}

impl From<Global> for Parameter {
    fn from(global: Global) -> Self {
        Self::Global(global)
    }
}
