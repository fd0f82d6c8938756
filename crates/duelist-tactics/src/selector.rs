//! Ordered scenario → strategy resolution.
//!
//! A `ComponentChain` holds entries in priority order. Each entry pairs a
//! scenario predicate with up to one sensor, movement and weapon strategy.
//! Every tick the chain is walked from the top; an entry whose scenario
//! holds fills only the slots still empty, so a high-priority entry can
//! override just the movement and leave the rest to the defaults.

/// Which entry supplies each slot this tick. Values are entry indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveSlots {
    pub sensor: Option<usize>,
    pub movement: Option<usize>,
    pub weapon: Option<usize>,
}

impl ActiveSlots {
    pub fn is_complete(&self) -> bool {
        self.sensor.is_some() && self.movement.is_some() && self.weapon.is_some()
    }
}

/// Up to one strategy per slot.
pub struct StrategySet<S, M, W> {
    pub sensor: Option<S>,
    pub movement: Option<M>,
    pub weapon: Option<W>,
}

impl<S, M, W> Default for StrategySet<S, M, W> {
    fn default() -> Self {
        Self {
            sensor: None,
            movement: None,
            weapon: None,
        }
    }
}

impl<S, M, W> StrategySet<S, M, W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn with_movement(mut self, movement: M) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_weapon(mut self, weapon: W) -> Self {
        self.weapon = Some(weapon);
        self
    }
}

type Predicate<C> = Box<dyn Fn(&C) -> bool>;

struct Entry<C, S, M, W> {
    label: String,
    applies: Predicate<C>,
    set: StrategySet<S, M, W>,
}

/// Priority-ordered strategy entries evaluated against a context `C`.
pub struct ComponentChain<C, S, M, W> {
    entries: Vec<Entry<C, S, M, W>>,
    has_default: bool,
}

impl<C, S, M, W> Default for ComponentChain<C, S, M, W> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            has_default: false,
        }
    }
}

impl<C, S, M, W> ComponentChain<C, S, M, W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario entry below all existing ones.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        applies: impl Fn(&C) -> bool + 'static,
        set: StrategySet<S, M, W>,
    ) -> &mut Self {
        if self.has_default {
            log::warn!("scenario entry added after the default entry will never fill a slot it covers");
        }
        self.entries.push(Entry {
            label: label.into(),
            applies: Box::new(applies),
            set,
        });
        self
    }

    /// Append the catch-all entry. Must be registered last.
    pub fn add_default(&mut self, set: StrategySet<S, M, W>) -> &mut Self {
        self.add("default", |_: &C| true, set);
        self.has_default = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.label.as_str())
    }

    /// Resolve this tick's active slots. Stops as soon as all three are filled.
    pub fn resolve(&self, ctx: &C) -> ActiveSlots {
        let mut slots = ActiveSlots::default();
        for (index, entry) in self.entries.iter().enumerate() {
            if slots.is_complete() {
                break;
            }
            let fills_gap = (slots.sensor.is_none() && entry.set.sensor.is_some())
                || (slots.movement.is_none() && entry.set.movement.is_some())
                || (slots.weapon.is_none() && entry.set.weapon.is_some());
            if !fills_gap || !(entry.applies)(ctx) {
                continue;
            }
            if slots.sensor.is_none() && entry.set.sensor.is_some() {
                slots.sensor = Some(index);
            }
            if slots.movement.is_none() && entry.set.movement.is_some() {
                slots.movement = Some(index);
            }
            if slots.weapon.is_none() && entry.set.weapon.is_some() {
                slots.weapon = Some(index);
            }
        }
        if !slots.is_complete() {
            log::warn!("strategy chain left slots empty: {slots:?}");
        }
        slots
    }

    pub fn sensor_mut(&mut self, index: Option<usize>) -> Option<&mut S> {
        self.entries.get_mut(index?)?.set.sensor.as_mut()
    }

    pub fn movement_mut(&mut self, index: Option<usize>) -> Option<&mut M> {
        self.entries.get_mut(index?)?.set.movement.as_mut()
    }

    pub fn weapon_mut(&mut self, index: Option<usize>) -> Option<&mut W> {
        self.entries.get_mut(index?)?.set.weapon.as_mut()
    }

    /// Every strategy in registration order, for lifecycle fan-out.
    pub fn for_each_mut(
        &mut self,
        mut sensor: impl FnMut(&mut S),
        mut movement: impl FnMut(&mut M),
        mut weapon: impl FnMut(&mut W),
    ) {
        for entry in &mut self.entries {
            if let Some(s) = entry.set.sensor.as_mut() {
                sensor(s);
            }
            if let Some(m) = entry.set.movement.as_mut() {
                movement(m);
            }
            if let Some(w) = entry.set.weapon.as_mut() {
                weapon(w);
            }
        }
    }
}
