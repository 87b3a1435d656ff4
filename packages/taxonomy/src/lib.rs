#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Analysis and label taxonomy for agro-report observations.
//!
//! This crate defines the canonical taxonomy that every observation in the
//! fact table is tagged with: the analysis type (erosion, greenhouse gases,
//! ammonia, ...), the labels valid within each analysis, and the research
//! sources that supply data. The taxonomy is static configuration, not
//! derived from the fact table — the rest of the system filters against it.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Top-level analysis types for agri-environmental observations.
///
/// Canonical names are the Portuguese identifiers used in the fact table's
/// `analysis` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Analysis {
    /// Soil erosion by land use (pasture vs. cropland).
    #[serde(rename = "erosão")]
    #[strum(serialize = "erosão")]
    Erosion,
    /// Greenhouse gas emissions by mitigation technology.
    #[serde(rename = "GEE")]
    #[strum(serialize = "GEE")]
    GreenhouseGas,
    /// Ammonia (NH3) emissions by agricultural practice.
    #[serde(rename = "NH3")]
    #[strum(serialize = "NH3")]
    Ammonia,
    /// Nitrogen/phosphorus/potassium nutrient balance.
    #[serde(rename = "NPK")]
    #[strum(serialize = "NPK")]
    Npk,
    /// Organic production by crop group.
    #[serde(rename = "orgânicas")]
    #[strum(serialize = "orgânicas")]
    Organics,
    /// Pesticide usage by pesticide class.
    #[serde(rename = "pesticidas")]
    #[strum(serialize = "pesticidas")]
    Pesticides,
    /// Water pollution by contaminant.
    #[serde(rename = "poluição")]
    #[strum(serialize = "poluição")]
    Pollution,
}

impl Analysis {
    /// Returns all analysis types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Erosion,
            Self::GreenhouseGas,
            Self::Ammonia,
            Self::Npk,
            Self::Organics,
            Self::Pesticides,
            Self::Pollution,
        ]
    }

    /// Looks up an analysis by its canonical name, case-insensitively.
    ///
    /// Returns `None` for unrecognized names so the caller can decide how to
    /// surface that as a client error.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_ref().to_lowercase() == lower)
    }

    /// Returns the labels valid within this analysis.
    #[must_use]
    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            Self::Erosion => &["pastagem", "cultura"],
            Self::GreenhouseGas => &["tecnologia1", "tecnologia2", "tecnologia3", "tecnologia4"],
            Self::Ammonia => &[
                "fertilizantes químicos",
                "fertilizantes orgânicos",
                "manejo de esterco",
                "deposição de extretas",
                "queimas de resíduos de culturas",
                "dejetos animais",
            ],
            Self::Npk => &[
                "deposição atmosférica",
                "fertilizantes minerais",
                "fertilizantes orgânicos",
                "fixação biológica de nitrogênio",
                "resíduos culturais",
                "resíduos industriais",
                "resíduos urbanos",
                "produção carne bovina",
                "produção agrícola",
                "área agropecuária",
            ],
            Self::Organics => &["grão", "hortaliças", "fruticultura", "pastagem"],
            Self::Pesticides => &["herbicidas", "fungicidas", "inseticitas", "outros"],
            Self::Pollution => &["nitrato", "fosfato", "cations", "anions"],
        }
    }

    /// Returns `true` if `label` is valid within this analysis.
    #[must_use]
    pub fn is_valid_label(self, label: &str) -> bool {
        self.labels().contains(&label)
    }
}

/// Research institutions and organizations that supply observation data.
#[must_use]
pub const fn sources() -> &'static [&'static str] {
    &["OCDE", "IAC", "UNB", "ISAgro"]
}
