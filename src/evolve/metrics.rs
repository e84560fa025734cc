//! Metric evaluation: raw physical aggregation and normalization.
//!
//! Evaluation runs in two stages. First the catalog rows behind a design
//! are folded into one [`RawProfile`] of summed/maxed/minned physical
//! quantities. Then each raw quantity passes through a domain-specific
//! normalization function onto the dimensionless `[0, 1]` scale the fitness
//! pass compares against the targets.
//!
//! Several of the normalization curves are deliberately odd-looking (the
//! attitude-knowledge tier walk in particular). Their numeric behavior is
//! load-bearing: downstream targets are expressed against these exact
//! curves, so they must not be smoothed or "fixed".

use serde::{Deserialize, Serialize};

use crate::schema::{Catalog, CatalogError, ComponentRecord, PanelRecord, StructureRecord};

use super::satellite::Satellite;

/// Number of scored criteria per satellite.
pub const NUM_CRITERIA: usize = 10;

/// Cubic millimetres per litre; structures list interior dimensions in mm
/// but the volume penalty operates on litres (one CubeSat unit = 1 L).
const MM3_PER_LITRE: f64 = 1.0e6;

/// Reference bit-rates bounding the log scale of the link metrics.
const BITRATE_FLOOR: f64 = 1200.0;
const BITRATE_CEIL: f64 = 38400.0;

/// Reference wavelength (nm) centering the wavelength match scale.
const WAVELENGTH_PIVOT: f64 = 550.0;

/// The ten normalized scores of an evaluated satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub volume: f64,
    pub mass: f64,
    pub cpu: f64,
    pub power: f64,
    pub down_link: f64,
    pub up_link: f64,
    pub att_moment: f64,
    pub att_knowledge: f64,
    pub wavelength: f64,
    pub detail: f64,
}

impl Metrics {
    /// Fixed criterion ordering shared with the fitness vector.
    pub fn as_array(&self) -> [f64; NUM_CRITERIA] {
        [
            self.volume,
            self.mass,
            self.cpu,
            self.power,
            self.down_link,
            self.up_link,
            self.att_moment,
            self.att_knowledge,
            self.wavelength,
            self.detail,
        ]
    }
}

/// Satellite-level aggregate of raw physical quantities.
///
/// Sums: volume, mass, nominal power, storage sizes, control moment,
/// discharge time, price. Extremes: wavelength bounds, detail, bit-rates,
/// the single worst power transient, and the finest positive attitude
/// knowledge. Optional fields stay `None` when no contributing part
/// reports the capability.
#[derive(Debug, Clone, Copy)]
pub struct RawProfile {
    /// Summed component volume, cubic millimetres.
    pub volume: f64,
    /// Summed mass, kilograms.
    pub mass: f64,
    /// Summed nominal power, watts (negative = net draw).
    pub power_nominal: f64,
    /// Worst single peak transient across parts, watts (<= 0).
    pub worst_peak: f64,
    /// Overall observable band, nanometres.
    pub min_wavelength: f64,
    pub max_wavelength: f64,
    /// Best sensing detail on the fuzzy scale.
    pub detail: f64,
    /// Best bit-rates across radios, bits per second.
    pub bitrate_down: Option<f64>,
    pub bitrate_up: Option<f64>,
    /// Summed storage, megabytes.
    pub data_storage: f64,
    pub code_storage: f64,
    pub ram: f64,
    /// Finest positive attitude knowledge reported, degrees. `None` means
    /// no attitude sensor on board, not perfect knowledge.
    pub att_knowledge: Option<f64>,
    /// Summed control moment.
    pub att_moment: f64,
    /// Summed battery discharge time, hours.
    pub discharge_time: f64,
    /// Summed price, dollars.
    pub price: f64,
}

impl RawProfile {
    /// Identity element for [`RawProfile::absorb`].
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            mass: 0.0,
            power_nominal: 0.0,
            worst_peak: 0.0,
            min_wavelength: f64::INFINITY,
            max_wavelength: 0.0,
            detail: 0.0,
            bitrate_down: None,
            bitrate_up: None,
            data_storage: 0.0,
            code_storage: 0.0,
            ram: 0.0,
            att_knowledge: None,
            att_moment: 0.0,
            discharge_time: 0.0,
            price: 0.0,
        }
    }

    /// Fold another profile in under the per-field policies.
    pub fn absorb(&mut self, other: &RawProfile) {
        self.volume += other.volume;
        self.mass += other.mass;
        self.power_nominal += other.power_nominal;
        self.worst_peak = self.worst_peak.min(other.worst_peak);
        self.min_wavelength = self.min_wavelength.min(other.min_wavelength);
        self.max_wavelength = self.max_wavelength.max(other.max_wavelength);
        self.detail = self.detail.max(other.detail);
        self.bitrate_down = max_option(self.bitrate_down, other.bitrate_down);
        self.bitrate_up = max_option(self.bitrate_up, other.bitrate_up);
        self.data_storage += other.data_storage;
        self.code_storage += other.code_storage;
        self.ram += other.ram;
        self.att_knowledge = min_option(self.att_knowledge, other.att_knowledge);
        self.att_moment += other.att_moment;
        self.discharge_time += other.discharge_time;
        self.price += other.price;
    }

    /// Scale the summed fields (panel area multiplier). Extremes are left
    /// alone; a bigger panel does not change what band an instrument sees.
    fn scaled(mut self, factor: f64) -> Self {
        self.volume *= factor;
        self.mass *= factor;
        self.power_nominal *= factor;
        self.data_storage *= factor;
        self.code_storage *= factor;
        self.ram *= factor;
        self.att_moment *= factor;
        self.discharge_time *= factor;
        self.price *= factor;
        self
    }

    /// Net power figure for the power metric: summed nominal plus the worst
    /// single transient.
    pub fn net_peak_power(&self) -> f64 {
        self.power_nominal + self.worst_peak
    }
}

fn max_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Lift one catalog row into a single-part profile.
pub fn parse_component(record: &ComponentRecord) -> RawProfile {
    RawProfile {
        volume: record.x * record.y * record.z,
        mass: record.mass,
        power_nominal: record.power_nominal,
        worst_peak: record.power_peak.min(0.0),
        min_wavelength: record.min_wavelength,
        max_wavelength: record.max_wavelength,
        detail: record.detail,
        bitrate_down: record.bitrate_down,
        bitrate_up: record.bitrate_up,
        data_storage: record.data_storage,
        code_storage: record.code_storage,
        ram: record.ram,
        // A reported zero is no sensor, not perfect knowledge.
        att_knowledge: record.att_knowledge.filter(|k| *k > 0.0),
        att_moment: record.att_moment,
        discharge_time: record.discharge_time,
        price: record.price,
    }
}

/// Aggregate per-part profiles into one satellite-level profile.
pub fn combine_values(rows: &[RawProfile]) -> RawProfile {
    let mut total = RawProfile::empty();
    for row in rows {
        total.absorb(row);
    }
    total
}

/// Fold structure- and panel-level contributions into the component
/// aggregate.
///
/// The chassis contributes its own mass and price; its dimensions define
/// the volume capacity and are deliberately kept out of the used-volume sum.
/// Panel contributions are scaled by four panels sized to the structure
/// class.
pub fn combine_sections(
    structure: &StructureRecord,
    components: RawProfile,
    side_panel: &PanelRecord,
    end_panel: &PanelRecord,
    size_factor: f64,
) -> RawProfile {
    let mut total = components;

    let mut chassis = RawProfile::empty();
    chassis.mass = structure.mass;
    chassis.price = structure.price;
    total.absorb(&chassis);

    let panel_scale = 4.0 * size_factor;
    total.absorb(&panel_profile(side_panel).scaled(panel_scale));
    total.absorb(&panel_profile(end_panel).scaled(panel_scale));

    total
}

fn panel_profile(panel: &PanelRecord) -> RawProfile {
    let mut profile = RawProfile::empty();
    profile.mass = panel.mass;
    profile.power_nominal = panel.power;
    profile.price = panel.price;
    profile
}

/// Exponential over-budget penalty shared by the volume and mass metrics:
/// full marks within budget, then `1 - (e^overrun - 1)` clipped to [0, 1].
fn over_budget_penalty(limit: f64, used: f64) -> f64 {
    if used <= limit {
        1.0
    } else {
        (1.0 - ((used - limit).exp() - 1.0)).clamp(0.0, 1.0)
    }
}

/// Volume score: 1 within capacity, exponential penalty past it.
/// Both arguments are in litres.
pub fn volume_metric(max_volume: f64, used_volume: f64) -> f64 {
    over_budget_penalty(max_volume, used_volume)
}

/// Mass score against the allowance for the structure's size class.
pub fn mass_metric(size_class: f64, total_mass: f64) -> f64 {
    let allowed = if (size_class - 1.0).abs() < 1e-9 {
        1.33
    } else if (size_class - 1.5).abs() < 1e-9 {
        2.0
    } else if (size_class - 2.0).abs() < 1e-9 {
        2.66
    } else if (size_class - 3.0).abs() < 1e-9 {
        4.0
    } else {
        1.33 * size_class
    };
    over_budget_penalty(allowed, total_mass)
}

/// Power score: exponential penalty on a net deficit, halved when mission
/// rules demand a battery the design does not carry.
pub fn power_metric(discharge_time: f64, net_power: f64, battery_required: bool) -> f64 {
    let mut metric = if net_power >= 0.0 {
        1.0
    } else {
        (1.0 - ((-net_power).exp() - 1.0)).clamp(0.0, 1.0)
    };
    if battery_required && discharge_time <= 0.0 {
        metric /= 2.0;
    }
    metric
}

/// Compute presence check: any storage at all scores 1, none scores 0.
pub fn cpu_metric(total_storage: f64) -> f64 {
    if total_storage > 0.0 { 1.0 } else { 0.0 }
}

/// Log-scaled bit-rate score anchored at 1200 and 38400 bps. Rates below 1
/// are floored to 1 before the log.
pub fn bitrate_metric(bitrate: f64) -> f64 {
    let bitrate = bitrate.max(1.0);
    let span = BITRATE_CEIL.ln() - BITRATE_FLOOR.ln();
    ((bitrate.ln() - BITRATE_FLOOR.ln()) / span + 0.1).clamp(0.0, 1.0)
}

/// Wavelength match score from the midpoint of the observable band,
/// log-scaled around 550 nm. A zero midpoint (no instrument) scores 0, as
/// does the infinite midpoint left by an empty aggregate whose band minimum
/// was never lowered from its fold identity.
pub fn wavelength_metric(min_wavelength: f64, max_wavelength: f64) -> f64 {
    let midpoint = (min_wavelength + max_wavelength) / 2.0;
    if !midpoint.is_finite() || midpoint <= 0.0 {
        return 0.0;
    }
    let scaled = midpoint.ln() / (2.0 * WAVELENGTH_PIVOT.ln());
    (1.75 * (scaled - 0.5) + 0.5).clamp(1e-6, 1.0)
}

/// Attitude control moment relative to design mass.
pub fn att_moment_metric(mass: f64, att_moment: f64) -> f64 {
    if mass <= 0.0 {
        return 0.0;
    }
    (1.25 * att_moment / mass).clamp(0.0, 1.0)
}

/// Tiered attitude knowledge score.
///
/// Walks `18 / knowledge` down by thirds, maps the tier count to a
/// 1/6-sized band and subtracts the leftover as an in-band penalty. The
/// resulting bands line up with the fuzzy precision vocabulary (6 deg ->
/// 0.167, 2 deg -> 0.333, ...). `None` (no sensor) scores 0, as do
/// readings at or below the noise floor.
pub fn att_know_metric(att_knowledge: Option<f64>) -> f64 {
    let Some(knowledge) = att_knowledge else {
        return 0.0;
    };
    if knowledge < 1e-4 {
        return 0.0;
    }

    let mut value = 18.0 / knowledge;
    let mut tiers = 0.0;
    while value > 1.0 {
        value /= 3.0;
        tiers += 1.0;
    }
    ((tiers - (1.0 - value)) / 6.0).clamp(0.0, 1.0)
}

/// Evaluate a satellite's full metric vector and store it on the record.
///
/// Any component, structure or panel name missing from the catalog is a
/// fatal configuration error.
pub fn calculate_satellite_metrics(
    satellite: &mut Satellite,
    catalog: &Catalog,
    battery_required: bool,
) -> Result<(), CatalogError> {
    let structure = catalog.structure(&satellite.structure)?;
    let side_panel = catalog.panel(&satellite.panels.side)?;
    let end_panel = catalog.panel(&satellite.panels.end)?;

    let rows: Vec<RawProfile> = satellite
        .components
        .iter()
        .map(|name| catalog.component(name).map(parse_component))
        .collect::<Result<_, _>>()?;

    let combined = combine_values(&rows);
    let profile = combine_sections(
        structure,
        combined,
        side_panel,
        end_panel,
        structure.size_class,
    );

    satellite.metrics = Some(Metrics {
        volume: volume_metric(
            structure.volume_capacity() / MM3_PER_LITRE,
            profile.volume / MM3_PER_LITRE,
        ),
        mass: mass_metric(structure.size_class, profile.mass),
        cpu: cpu_metric(profile.data_storage + profile.code_storage + profile.ram),
        power: power_metric(
            profile.discharge_time,
            profile.net_peak_power(),
            battery_required,
        ),
        down_link: bitrate_metric(profile.bitrate_down.unwrap_or(0.0)),
        up_link: bitrate_metric(profile.bitrate_up.unwrap_or(0.0)),
        att_moment: att_moment_metric(profile.mass, profile.att_moment),
        att_knowledge: att_know_metric(profile.att_knowledge),
        wavelength: wavelength_metric(profile.min_wavelength, profile.max_wavelength),
        detail: profile.detail.clamp(0.0, 1.0),
    });

    Ok(())
}
