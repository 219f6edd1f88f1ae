//! Cooking raw items over a fire.
//!
//! Each actor owns a `CookingTracker`. A process holds only the id of its
//! fire and looks it up every tick, so a fire removed from the world simply
//! ends the processes that used it.

use crate::core_types::FireId;
use crate::error::{FireError, InvalidOperation, MissingConfiguration};
use crate::fire::{FireInstance, FireState};
use crate::inventory::{Inventory, ItemDef};
use crate::notifications::{NotificationSink, Severity};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Temperatures governing cooking speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookingConfig {
    /// °C at and below which nothing cooks
    pub min_temperature: f32,
    /// °C at and above which food cooks at full speed
    pub full_efficiency_temperature: f32,
}

impl Default for CookingConfig {
    fn default() -> Self {
        Self {
            min_temperature: 200.0,
            full_efficiency_temperature: 400.0,
        }
    }
}

impl CookingConfig {
    /// Cooking speed multiplier (0-1) at `temperature`
    pub fn efficiency(&self, temperature: f32) -> f32 {
        let span = self.full_efficiency_temperature - self.min_temperature;
        if temperature <= self.min_temperature {
            0.0
        } else if temperature >= self.full_efficiency_temperature || span <= 0.0 {
            1.0
        } else {
            (temperature - self.min_temperature) / span
        }
    }

    /// Whether food can go on (or stay on) this fire
    pub fn can_cook(&self, fire: &FireInstance) -> bool {
        fire.state() == FireState::Burning && fire.cooking_temperature() >= self.min_temperature
    }
}

/// Cooked result and cook time of one raw item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingRecipe {
    pub cooked: ItemDef,
    /// Seconds at full efficiency
    pub cook_time: f32,
}

/// Raw item id to cooking recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeBook {
    recipes: FxHashMap<String, CookingRecipe>,
}

impl Default for RecipeBook {
    fn default() -> Self {
        let mut book = Self::empty();
        book.insert("raw_meat", ItemDef::new("cooked_meat", "Cooked Meat"), 30.0);
        book.insert("raw_fish", ItemDef::new("cooked_fish", "Cooked Fish"), 20.0);
        book.insert("potato", ItemDef::new("baked_potato", "Baked Potato"), 25.0);
        book.insert("mushroom", ItemDef::new("roasted_mushroom", "Roasted Mushroom"), 10.0);
        book
    }
}

impl RecipeBook {
    pub fn empty() -> Self {
        Self {
            recipes: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, raw_item: impl Into<String>, cooked: ItemDef, cook_time: f32) {
        self.recipes
            .insert(raw_item.into(), CookingRecipe { cooked, cook_time });
    }

    pub fn get(&self, raw_item: &str) -> Result<&CookingRecipe, MissingConfiguration> {
        self.recipes
            .get(raw_item)
            .ok_or_else(|| MissingConfiguration::Recipe(raw_item.to_string()))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Finds fires by id
pub trait FireLookup {
    fn fire(&self, id: &FireId) -> Option<&FireInstance>;
}

impl FireLookup for [FireInstance] {
    fn fire(&self, id: &FireId) -> Option<&FireInstance> {
        self.iter().find(|fire| fire.id() == id)
    }
}

impl FireLookup for Vec<FireInstance> {
    fn fire(&self, id: &FireId) -> Option<&FireInstance> {
        self.as_slice().fire(id)
    }
}

/// Handle to a cooking process, unique within its tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cook#{}", self.0)
    }
}

/// One raw item cooking on one fire
#[derive(Debug, Clone, PartialEq)]
pub struct CookingProcess {
    pub id: ProcessId,
    /// Non-owning reference to the fire
    pub fire: FireId,
    pub raw_item: String,
    pub cooked_item: ItemDef,
    pub cook_time: f32,
    /// Effective seconds of cooking so far
    pub current_time: f32,
    pub is_complete: bool,
}

impl CookingProcess {
    /// Fraction (0-1) cooked
    pub fn progress(&self) -> f32 {
        if self.cook_time <= 0.0 {
            return 1.0;
        }
        (self.current_time / self.cook_time).clamp(0.0, 1.0)
    }
}

/// What happened to a process during an update
#[derive(Debug, Clone, PartialEq)]
pub enum CookingOutcome {
    /// Cooked item delivered to the inventory
    Completed {
        process: ProcessId,
        cooked_item: ItemDef,
    },
    /// The fire stopped being able to cook; the raw item is lost
    Ruined {
        process: ProcessId,
        raw_item: String,
        fire_state: FireState,
    },
    /// The fire no longer exists
    Abandoned { process: ProcessId },
}

/// Cooking processes of one actor
pub struct CookingTracker {
    recipes: Arc<RecipeBook>,
    config: CookingConfig,
    notifier: Arc<dyn NotificationSink>,
    processes: Vec<CookingProcess>,
    next_id: u64,
}

impl CookingTracker {
    pub fn new(
        recipes: Arc<RecipeBook>,
        config: CookingConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            recipes,
            config,
            notifier,
            processes: Vec::new(),
            next_id: 1,
        }
    }

    pub fn processes(&self) -> &[CookingProcess] {
        &self.processes
    }

    pub fn process(&self, id: ProcessId) -> Option<&CookingProcess> {
        self.processes.iter().find(|process| process.id == id)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Put one `raw_item` from `inventory` on `fire`.
    ///
    /// # Errors
    /// `NoFire`, `CannotCook` or `MissingItem` (with a player notification),
    /// or `MissingConfiguration` when the item has no recipe. The inventory is
    /// untouched on every error.
    pub fn start_cooking(
        &mut self,
        fire: Option<&FireInstance>,
        raw_item: &str,
        inventory: &mut dyn Inventory,
    ) -> Result<ProcessId, FireError> {
        let Some(fire) = fire else {
            self.notifier
                .notify("You need a fire to cook on.", Severity::Warning);
            return Err(InvalidOperation::NoFire.into());
        };

        if !self.config.can_cook(fire) {
            self.notifier.notify(
                "The fire needs to be burning steadily before you can cook.",
                Severity::Warning,
            );
            return Err(InvalidOperation::CannotCook {
                state: fire.state(),
                temperature: fire.cooking_temperature(),
            }
            .into());
        }

        let recipe = match self.recipes.get(raw_item) {
            Ok(recipe) => recipe.clone(),
            Err(missing) => {
                tracing::warn!("Refusing to cook '{raw_item}': {missing}");
                return Err(missing.into());
            }
        };

        if !inventory.remove_item(raw_item, 1) {
            self.notifier
                .notify(&format!("You have no {raw_item} to cook."), Severity::Warning);
            return Err(InvalidOperation::MissingItem {
                item_id: raw_item.to_string(),
                quantity: 1,
            }
            .into());
        }

        let id = ProcessId(self.next_id);
        self.next_id += 1;
        self.notifier.notify(
            &format!("Started cooking {}.", recipe.cooked.display_name),
            Severity::Info,
        );
        tracing::debug!(
            "{id}: cooking {raw_item} on fire {} for {:.1}s",
            fire.id(),
            recipe.cook_time
        );

        self.processes.push(CookingProcess {
            id,
            fire: fire.id().clone(),
            raw_item: raw_item.to_string(),
            cooked_item: recipe.cooked,
            cook_time: recipe.cook_time,
            current_time: 0.0,
            is_complete: false,
        });
        Ok(id)
    }

    /// Advance every process by `dt` seconds
    pub fn update<L>(
        &mut self,
        dt: f32,
        fires: &L,
        inventory: &mut dyn Inventory,
    ) -> Vec<CookingOutcome>
    where
        L: FireLookup + ?Sized,
    {
        let mut outcomes = Vec::new();
        let config = &self.config;
        let notifier = &self.notifier;

        self.processes.retain_mut(|process| {
            let Some(fire) = fires.fire(&process.fire) else {
                tracing::debug!("{}: fire {} is gone, dropping", process.id, process.fire);
                outcomes.push(CookingOutcome::Abandoned {
                    process: process.id,
                });
                return false;
            };

            if !config.can_cook(fire) {
                let message = if fire.state() == FireState::Blazing {
                    format!("Your {} burned in the flames.", process.raw_item)
                } else {
                    format!("The fire died down and your {} was ruined.", process.raw_item)
                };
                notifier.notify(&message, Severity::Warning);
                outcomes.push(CookingOutcome::Ruined {
                    process: process.id,
                    raw_item: process.raw_item.clone(),
                    fire_state: fire.state(),
                });
                return false;
            }

            process.current_time += dt.max(0.0) * config.efficiency(fire.cooking_temperature());
            if process.current_time < process.cook_time {
                return true;
            }

            process.is_complete = true;
            if !inventory.add_item(&process.cooked_item, 1) {
                tracing::warn!(
                    "{}: inventory refused {}",
                    process.id,
                    process.cooked_item.id
                );
            }
            notifier.notify(
                &format!("{} is ready!", process.cooked_item.display_name),
                Severity::Success,
            );
            outcomes.push(CookingOutcome::Completed {
                process: process.id,
                cooked_item: process.cooked_item.clone(),
            });
            false
        });

        outcomes
    }
}

impl fmt::Debug for CookingTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookingTracker")
            .field("processes", &self.processes)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
