//! Supported vehicle models and their per-model quirks
//!
//! Model identification itself happens elsewhere; this module only answers
//! questions about a model that is already known: which gear message it
//! carries, whether it has the electric powertrain signal set, and which
//! family-level encodings apply.

use crate::types::{CarError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which message the gear selector position is decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearSource {
    /// Cluster inhibit indicators (CLU15)
    Cluster,
    /// Transmission control unit current gear (TCU12)
    Tcu,
    /// Electric gear shifter (ELECT_GEAR)
    Electric,
    /// Shift lever position (LVR12)
    Lever,
}

/// Supported Hyundai / Kia / Genesis models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarModel {
    Elantra,
    ElantraGtI30,
    HyundaiGenesis,
    GenesisG80,
    GenesisG90,
    Ioniq,
    IoniqEv,
    KiaForte,
    KiaNiroEv,
    KiaOptima,
    KiaOptimaHybrid,
    KiaSorento,
    KiaStinger,
    Kona,
    KonaEv,
    Palisade,
    SantaFe,
    Sonata,
    Sonata2019,
    SonataHybrid,
    Veloster,
}

impl CarModel {
    /// Every supported model, in declaration order
    pub const ALL: [CarModel; 21] = [
        CarModel::Elantra,
        CarModel::ElantraGtI30,
        CarModel::HyundaiGenesis,
        CarModel::GenesisG80,
        CarModel::GenesisG90,
        CarModel::Ioniq,
        CarModel::IoniqEv,
        CarModel::KiaForte,
        CarModel::KiaNiroEv,
        CarModel::KiaOptima,
        CarModel::KiaOptimaHybrid,
        CarModel::KiaSorento,
        CarModel::KiaStinger,
        CarModel::Kona,
        CarModel::KonaEv,
        CarModel::Palisade,
        CarModel::SantaFe,
        CarModel::Sonata,
        CarModel::Sonata2019,
        CarModel::SonataHybrid,
        CarModel::Veloster,
    ];

    /// Identifier used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            CarModel::Elantra => "ELANTRA",
            CarModel::ElantraGtI30 => "ELANTRA_GT_I30",
            CarModel::HyundaiGenesis => "HYUNDAI_GENESIS",
            CarModel::GenesisG80 => "GENESIS_G80",
            CarModel::GenesisG90 => "GENESIS_G90",
            CarModel::Ioniq => "IONIQ",
            CarModel::IoniqEv => "IONIQ_EV",
            CarModel::KiaForte => "KIA_FORTE",
            CarModel::KiaNiroEv => "KIA_NIRO_EV",
            CarModel::KiaOptima => "KIA_OPTIMA",
            CarModel::KiaOptimaHybrid => "KIA_OPTIMA_HYBRID",
            CarModel::KiaSorento => "KIA_SORENTO",
            CarModel::KiaStinger => "KIA_STINGER",
            CarModel::Kona => "KONA",
            CarModel::KonaEv => "KONA_EV",
            CarModel::Palisade => "PALISADE",
            CarModel::SantaFe => "SANTA_FE",
            CarModel::Sonata => "SONATA",
            CarModel::Sonata2019 => "SONATA_2019",
            CarModel::SonataHybrid => "SONATA_HYBRID",
            CarModel::Veloster => "VELOSTER",
        }
    }

    /// Gear message carried by this model
    pub fn gear_source(&self) -> GearSource {
        match self {
            CarModel::Elantra | CarModel::ElantraGtI30 | CarModel::KiaForte | CarModel::Kona => {
                GearSource::Cluster
            }
            CarModel::KiaOptima | CarModel::Sonata2019 | CarModel::Veloster => GearSource::Tcu,
            CarModel::Ioniq
            | CarModel::IoniqEv
            | CarModel::KiaNiroEv
            | CarModel::KiaOptimaHybrid
            | CarModel::KonaEv
            | CarModel::SonataHybrid => GearSource::Electric,
            _ => GearSource::Lever,
        }
    }

    /// Accelerator pedal comes from the electric powertrain message (E_EMS11)
    pub fn has_electric_powertrain(&self) -> bool {
        matches!(self, CarModel::IoniqEv | CarModel::KiaNiroEv | CarModel::KonaEv)
    }

    /// Genesis-branded cars use different HUD warning codes
    pub fn is_genesis_family(&self) -> bool {
        matches!(
            self,
            CarModel::HyundaiGenesis | CarModel::GenesisG80 | CarModel::GenesisG90
        )
    }

    /// Needs the 20 Hz lane following assist HUD message
    pub fn sends_lfa_mfa(&self) -> bool {
        matches!(
            self,
            CarModel::Sonata | CarModel::SonataHybrid | CarModel::Palisade
        )
    }

    /// Assist controller hard-faults when commanded at low speed
    pub fn has_low_speed_steer_fault(&self) -> bool {
        matches!(self, CarModel::HyundaiGenesis)
    }
}

impl fmt::Display for CarModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CarModel {
    type Err = CarError;

    fn from_str(s: &str) -> Result<Self> {
        CarModel::ALL
            .iter()
            .copied()
            .find(|model| model.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CarError::UnknownModel(s.to_string()))
    }
}
