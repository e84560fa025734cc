//! Satellite design records and the encoder that builds and recombines them.
//!
//! A satellite is one candidate CubeSat configuration: a chassis, a
//! variable-length list of installed components, and a panel pair. The
//! encoder owns the run's random source and performs all stochastic
//! construction - initial population, crossover, and mutation - under the
//! slot-budget fill rule.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Catalog, CatalogError, ComponentRecord, StructureRecord};

use super::fitness::Fitness;
use super::metrics::Metrics;

/// Internal/external slot capacity bookkeeping for one satellite.
///
/// Remaining counts never drop below zero: an insertion is admitted only if
/// both remainders stay non-negative afterwards. Fractional slot costs mean
/// a remainder can land in (0, 1), where the fill loop's stall budget takes
/// over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    pub internal_budget: f64,
    pub internal_remaining: f64,
    pub external_budget: f64,
    pub external_remaining: f64,
}

impl SlotState {
    /// Fresh slot state for a chassis, both remainders at full budget.
    pub fn for_structure(structure: &StructureRecord) -> Self {
        Self {
            internal_budget: structure.internal_slots,
            internal_remaining: structure.internal_slots,
            external_budget: structure.external_slots,
            external_remaining: structure.external_slots,
        }
    }

    /// Empty the satellite: remainders back to full budget.
    pub fn reset(&mut self) {
        self.internal_remaining = self.internal_budget;
        self.external_remaining = self.external_budget;
    }

    /// Would installing this part keep both remainders non-negative?
    pub fn admits(&self, part: &ComponentRecord) -> bool {
        self.internal_remaining - part.internal_slots >= 0.0
            && self.external_remaining - part.external_slots >= 0.0
    }

    /// Charge a part's slot cost.
    fn consume(&mut self, part: &ComponentRecord) {
        self.internal_remaining -= part.internal_slots;
        self.external_remaining -= part.external_slots;
    }

    /// Internal remainder sits in the fractional dead zone.
    fn fractional_slack(&self) -> bool {
        self.internal_remaining > 0.0 && self.internal_remaining < 1.0
    }
}

/// Side and end panel selection. Always swapped as a unit during crossover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPair {
    pub side: String,
    pub end: String,
}

/// One candidate CubeSat design.
///
/// `metrics`, `fitness` and `rank` are `None` until the corresponding
/// evaluation stage has run; any change to the structure or component list
/// invalidates all three.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    /// Stable identifier assigned at creation.
    pub id: u64,
    /// Chassis name.
    pub structure: String,
    /// Installed component names, in insertion order.
    pub components: Vec<String>,
    /// Selected panel pair.
    pub panels: PanelPair,
    /// Slot bookkeeping.
    pub slots: SlotState,
    /// Normalized metric scores, populated by the evaluator.
    #[serde(default)]
    pub metrics: Option<Metrics>,
    /// Per-criterion distances to the targets, populated by the fitness pass.
    #[serde(default)]
    pub fitness: Option<Fitness>,
    /// Position assigned by the ranking engine; lower is better.
    #[serde(default)]
    pub rank: Option<usize>,
}

impl Satellite {
    /// Drop all derived scores after a composition change.
    pub fn invalidate_scores(&mut self) {
        self.metrics = None;
        self.fitness = None;
        self.rank = None;
    }
}

/// Builds, recombines and mutates satellites against a fixed catalog.
///
/// Owns a seeded `StdRng` so runs are reproducible when a seed is supplied;
/// no ambient random state is touched anywhere.
pub struct Encoder<'a> {
    catalog: &'a Catalog,
    rng: StdRng,
    fill_retries: u32,
    next_id: u64,
}

impl<'a> Encoder<'a> {
    /// Create an encoder over a validated catalog.
    ///
    /// `fill_retries` bounds the consecutive fill attempts tolerated while
    /// the internal remainder is fractional or a drawn part fails to fit.
    pub fn new(
        catalog: &'a Catalog,
        fill_retries: u32,
        seed: Option<u64>,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            catalog,
            rng,
            fill_retries,
            next_id: 0,
        })
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Single biased coin flip against the encoder's RNG.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Build a fresh random population of the requested size.
    pub fn create_population(&mut self, size: usize) -> Vec<Satellite> {
        (0..size).map(|_| self.random_satellite()).collect()
    }

    fn random_satellite(&mut self) -> Satellite {
        let structure = {
            let idx = self.rng.gen_range(0..self.catalog.structures.len());
            &self.catalog.structures[idx]
        };
        let slots = SlotState::for_structure(structure);
        let name = structure.name.clone();

        let mut satellite = Satellite {
            id: self.take_id(),
            structure: name,
            components: Vec::new(),
            panels: self.random_panels(),
            slots,
            metrics: None,
            fitness: None,
            rank: None,
        };
        self.fill_from_catalog(&mut satellite);
        satellite
    }

    fn random_panels(&mut self) -> PanelPair {
        let side_idx = self.rng.gen_range(0..self.catalog.side_panels.len());
        let end_idx = self.rng.gen_range(0..self.catalog.end_panels.len());
        PanelPair {
            side: self.catalog.side_panels[side_idx].name.clone(),
            end: self.catalog.end_panels[end_idx].name.clone(),
        }
    }

    /// Fill loop against the whole catalog: draw random parts until the
    /// internal budget is exhausted or the stall budget runs out.
    fn fill_from_catalog(&mut self, satellite: &mut Satellite) {
        let mut stall = self.fill_retries;
        while satellite.slots.internal_remaining > 0.0 && stall > 0 {
            let idx = self.rng.gen_range(0..self.catalog.components.len());
            let part = &self.catalog.components[idx];
            let installed = install(satellite, part);
            if installed && !satellite.slots.fractional_slack() {
                stall = self.fill_retries;
            } else {
                stall -= 1;
            }
        }
    }

    /// Breed a same-sized child population.
    ///
    /// The parent list is split down the middle and parent `i` mates with
    /// parent `i + half`, so the rank-sorted survivors mix across the
    /// quality spread rather than with their neighbors. Each pair pools its
    /// component lists into a shared draw bag both children fill from
    /// (falling back to the full catalog once the bag empties). Children
    /// inherit their own parent's structure and slot budget; each child
    /// lands at its parent's index. Panel pairs move between the two
    /// children together with 50% probability. An odd trailing parent is
    /// carried through with a fresh id.
    pub fn create_child_population(
        &mut self,
        parents: &[Satellite],
    ) -> Result<Vec<Satellite>, CatalogError> {
        let half = parents.len() / 2;
        let mut children: Vec<Option<Satellite>> = (0..parents.len()).map(|_| None).collect();

        for i in 0..half {
            let (a, b) = (&parents[i], &parents[i + half]);

            let mut bag: Vec<String> = a
                .components
                .iter()
                .chain(b.components.iter())
                .cloned()
                .collect();

            let mut first = self.breed_child(a, &mut bag)?;
            let mut second = self.breed_child(b, &mut bag)?;

            if self.chance(0.5) {
                std::mem::swap(&mut first.panels, &mut second.panels);
            }

            children[i] = Some(first);
            children[i + half] = Some(second);
        }

        if parents.len() % 2 == 1 {
            let mut spare = parents[parents.len() - 1].clone();
            spare.id = self.take_id();
            children[parents.len() - 1] = Some(spare);
        }

        Ok(children.into_iter().flatten().collect())
    }

    fn breed_child(
        &mut self,
        parent: &Satellite,
        bag: &mut Vec<String>,
    ) -> Result<Satellite, CatalogError> {
        let mut slots = parent.slots;
        slots.reset();

        let mut child = Satellite {
            id: self.take_id(),
            structure: parent.structure.clone(),
            components: Vec::new(),
            panels: parent.panels.clone(),
            slots,
            metrics: None,
            fitness: None,
            rank: None,
        };

        let mut stall = self.fill_retries;
        while child.slots.internal_remaining > 0.0 && stall > 0 {
            let installed = if bag.is_empty() {
                let idx = self.rng.gen_range(0..self.catalog.components.len());
                let part = &self.catalog.components[idx];
                install(&mut child, part)
            } else {
                let idx = self.rng.gen_range(0..bag.len());
                let name = bag.swap_remove(idx);
                let part = self.catalog.component(&name)?;
                install(&mut child, part)
            };
            if installed && !child.slots.fractional_slack() {
                stall = self.fill_retries;
            } else {
                stall -= 1;
            }
        }

        Ok(child)
    }

    /// Mutate a satellite in place.
    ///
    /// With probability `structure_rate` the chassis is replaced by a fresh
    /// random one (slot budget reset accordingly); otherwise one random
    /// catalog part joins the component pool. Either way the component list
    /// is rebuilt from scratch out of the pooled set, discarding whatever no
    /// longer fits once the pool is exhausted. Derived scores are cleared.
    pub fn mutate(
        &mut self,
        satellite: &mut Satellite,
        structure_rate: f64,
    ) -> Result<(), CatalogError> {
        let mut pool = std::mem::take(&mut satellite.components);

        if self.chance(structure_rate) {
            let idx = self.rng.gen_range(0..self.catalog.structures.len());
            let structure = &self.catalog.structures[idx];
            satellite.structure = structure.name.clone();
            satellite.slots = SlotState::for_structure(structure);
        } else {
            let idx = self.rng.gen_range(0..self.catalog.components.len());
            pool.push(self.catalog.components[idx].name.clone());
            satellite.slots.reset();
        }

        let mut stall = self.fill_retries;
        while satellite.slots.internal_remaining > 0.0 && stall > 0 && !pool.is_empty() {
            let idx = self.rng.gen_range(0..pool.len());
            let name = pool.swap_remove(idx);
            let part = self.catalog.component(&name)?;
            let installed = install(satellite, part);
            if installed && !satellite.slots.fractional_slack() {
                stall = self.fill_retries;
            } else {
                stall -= 1;
            }
        }

        satellite.invalidate_scores();
        Ok(())
    }
}

/// Install a part if the slot budget admits it. Returns whether it went in.
fn install(satellite: &mut Satellite, part: &ComponentRecord) -> bool {
    if satellite.slots.admits(part) {
        satellite.slots.consume(part);
        satellite.components.push(part.name.clone());
        true
    } else {
        false
    }
}
