//! Collision callback dispatch.
//!
//! [`CollisionFx`] owns one [`EffectModule`] per activated part and turns the
//! host's enter / stay / exit callbacks into effect commands. Every callback
//! first resolves which part a contact belongs to (see
//! [`resolve_target`]); a redirected scrape silences the receiving part and
//! its siblings so that at most one part in the family scrapes at a time.

use fx_types::{ContactEvent, FxError, PartId, PartTree, Point3};
use hashbrown::HashMap;
use tracing::{debug, info, trace};

use crate::attribution::{Attribution, resolve_target};
use crate::command::{ClipLibrary, Effect, EffectCommand};
use crate::config::{EffectConfig, IMPACT_SPEED_THRESHOLD};
use crate::context::SimulationContext;
use crate::module::EffectModule;

/// Phase of a host collision callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    /// First frame of contact.
    Enter,
    /// Every following frame of contact.
    Stay,
    /// Contact ended.
    Exit,
}

/// The collision effects engine.
///
/// # Example
///
/// ```
/// use fx_contact::{CollisionFx, EffectConfig, SimulationContext};
/// use fx_dust::{DustLibrary, StrSource};
/// use fx_types::{Collider, CollidingObject, ContactEvent, ContactPoint, Part, PartTree};
/// use hashbrown::HashMap;
/// use nalgebra::{Point3, Vector3};
///
/// let mut tree = PartTree::new();
/// let hull = tree.add_root(
///     Part::new("hull", Point3::origin()).with_velocity(Vector3::new(0.0, 0.0, 12.0)),
/// );
///
/// let clips: HashMap<String, f64> = [("Sounds/Scrape".to_string(), 2.0)].into_iter().collect();
/// let mut ctx = SimulationContext::new(DustLibrary::new(StrSource::new(""))).with_seed(1);
/// let mut fx = CollisionFx::new();
/// fx.activate(
///     &tree,
///     hull,
///     EffectConfig::default().with_scrape_sound("Sounds/Scrape"),
///     &clips,
///     &mut ctx,
/// )
/// .unwrap();
///
/// let event = ContactEvent::new(
///     vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
///     Vector3::new(12.0, 0.0, 0.0),
///     Collider::named("runway"),
///     CollidingObject::named("runway"),
/// );
///
/// let effects = fx.on_collision_stay(&tree, hull, &event, &mut ctx);
/// assert!(!effects.is_empty());
/// assert!(fx.module(hull).unwrap().is_scraping());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollisionFx {
    modules: HashMap<PartId, EffectModule>,
}

impl CollisionFx {
    /// Create an engine with no active parts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate collision effects on a part.
    ///
    /// Replaces any module already active on the part, stopping its effects
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the part is not in the tree or the configuration
    /// is invalid.
    pub fn activate(
        &mut self,
        tree: &PartTree,
        part: PartId,
        config: EffectConfig,
        clips: &dyn ClipLibrary,
        ctx: &mut SimulationContext,
    ) -> fx_types::Result<Vec<Effect>> {
        config.validate()?;
        let host = tree.get(part)?;

        let mut effects = self.deactivate(part);

        let env = ctx.environment().clone();
        let (module, commands) =
            EffectModule::activate(part, host, config, clips, &env, ctx.rng());
        effects.extend(addressed(part, commands));
        self.modules.insert(part, module);
        Ok(effects)
    }

    /// Remove a part's module, stopping anything it was playing.
    ///
    /// Returns nothing if the part was not active.
    pub fn deactivate(&mut self, part: PartId) -> Vec<Effect> {
        self.modules
            .remove(&part)
            .map(|module| addressed(part, module.deactivate()))
            .unwrap_or_default()
    }

    /// The module active on a part.
    #[must_use]
    pub fn module(&self, part: PartId) -> Option<&EffectModule> {
        self.modules.get(&part)
    }

    /// Whether a part has collision effects.
    #[must_use]
    pub fn is_active(&self, part: PartId) -> bool {
        self.modules.contains_key(&part)
    }

    /// Number of active parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no part is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Active parts, in ascending id order.
    #[must_use]
    pub fn active_parts(&self) -> Vec<PartId> {
        let mut parts: Vec<PartId> = self.modules.keys().copied().collect();
        parts.sort_unstable();
        parts
    }

    /// Dispatch a callback by phase.
    pub fn on_collision(
        &mut self,
        phase: CollisionPhase,
        tree: &PartTree,
        part: PartId,
        event: &ContactEvent,
        ctx: &mut SimulationContext,
    ) -> Vec<Effect> {
        match phase {
            CollisionPhase::Enter => self.on_collision_enter(tree, part, event, ctx),
            CollisionPhase::Stay => self.on_collision_stay(tree, part, event, ctx),
            CollisionPhase::Exit => self.on_collision_exit(tree, part, event, ctx),
        }
    }

    /// A collision began.
    ///
    /// Plays an impact sound on the owning part when the relative speed
    /// exceeds [`IMPACT_SPEED_THRESHOLD`]. Ignored while paused.
    pub fn on_collision_enter(
        &mut self,
        tree: &PartTree,
        part: PartId,
        event: &ContactEvent,
        ctx: &mut SimulationContext,
    ) -> Vec<Effect> {
        if ctx.is_paused() || !self.is_active(part) {
            return Vec::new();
        }
        if event.speed() <= IMPACT_SPEED_THRESHOLD {
            trace!(%part, speed = event.speed(), "Impact below threshold");
            return Vec::new();
        }
        let Some(point) = event.corrected_point(ctx.environment().delta_time) else {
            return Vec::new();
        };

        let attribution = self.resolve(tree, part, &point);
        let (target, is_wheel) = match attribution.target {
            Some(child) => (child, attribution.is_wheel),
            None => (
                part,
                tree.find(part)
                    .is_some_and(|p| p.is_wheel_contact(&point)),
            ),
        };

        let env = ctx.environment().clone();
        let Some(module) = self.modules.get_mut(&target) else {
            return Vec::new();
        };
        debug!(%part, %target, is_wheel, speed = event.speed(), "Collision impact");
        addressed(target, module.impact(is_wheel, &env, ctx.rng()))
    }

    /// A collision persists.
    ///
    /// Runs scrape effects on the owning part. When a child owns the
    /// contact, the receiving part and the child's siblings are stopped
    /// first.
    pub fn on_collision_stay(
        &mut self,
        tree: &PartTree,
        part: PartId,
        event: &ContactEvent,
        ctx: &mut SimulationContext,
    ) -> Vec<Effect> {
        let Some(module) = self.modules.get(&part) else {
            return Vec::new();
        };
        if !module.scrape_enabled() || ctx.is_paused() {
            return Vec::new();
        }
        let Some(point) = event.corrected_point(ctx.environment().delta_time) else {
            return Vec::new();
        };

        match self.resolve(tree, part, &point).target {
            Some(child) => {
                let mut effects = self.stop(part);
                for &sibling in tree.children(part).iter().filter(|&&s| s != child) {
                    effects.extend(self.stop(sibling));
                }
                effects.extend(self.scrape(tree, child, event, ctx));
                effects
            }
            None => self.scrape(tree, part, event, ctx),
        }
    }

    /// A collision ended.
    ///
    /// Stops scrape effects on the receiving part, and on the child that
    /// owned the contact if the event still carries a contact point.
    pub fn on_collision_exit(
        &mut self,
        tree: &PartTree,
        part: PartId,
        event: &ContactEvent,
        ctx: &mut SimulationContext,
    ) -> Vec<Effect> {
        let mut effects = self.stop(part);

        if let Some(point) = event.corrected_point(ctx.environment().delta_time) {
            if let Some(child) = self.resolve(tree, part, &point).target {
                effects.extend(self.stop(child));
            }
        }
        effects
    }

    /// The game was paused: silence every scrape and spark loop.
    ///
    /// Calling this again while paused emits nothing.
    pub fn pause(&mut self, ctx: &mut SimulationContext) -> Vec<Effect> {
        if !ctx.is_paused() {
            info!(parts = self.modules.len(), "Pausing collision effects");
        }
        ctx.set_paused(true);

        let mut effects = Vec::new();
        for part in self.active_parts() {
            if let Some(module) = self.modules.get_mut(&part) {
                effects.extend(addressed(part, module.pause()));
            }
        }
        effects
    }

    /// The game resumed. Loops restart on the next sustained contact.
    pub fn unpause(&mut self, ctx: &mut SimulationContext) {
        if ctx.is_paused() {
            info!("Resuming collision effects");
        }
        ctx.set_paused(false);
    }

    /// Resolve a part, reporting a stale id as an error.
    ///
    /// # Errors
    ///
    /// Returns [`FxError::InvalidPartId`] if the part is not active.
    pub fn require(&self, part: PartId) -> fx_types::Result<&EffectModule> {
        self.modules
            .get(&part)
            .ok_or(FxError::InvalidPartId(part.raw()))
    }

    fn resolve(&self, tree: &PartTree, part: PartId, point: &Point3<f64>) -> Attribution {
        resolve_target(tree, part, point, |id| self.modules.contains_key(&id))
    }

    fn stop(&mut self, part: PartId) -> Vec<Effect> {
        self.modules
            .get_mut(&part)
            .map(|module| addressed(part, module.stop_scrape()))
            .unwrap_or_default()
    }

    fn scrape(
        &mut self,
        tree: &PartTree,
        part: PartId,
        event: &ContactEvent,
        ctx: &mut SimulationContext,
    ) -> Vec<Effect> {
        let other_sparks = event
            .object
            .part
            .and_then(|other| self.modules.get(&other))
            .map_or(true, EffectModule::spark_capable);

        let Some(module) = self.modules.get_mut(&part) else {
            return Vec::new();
        };
        addressed(part, module.scrape(event, tree.find(part), other_sparks, ctx))
    }
}

fn addressed(part: PartId, commands: Vec<EffectCommand>) -> Vec<Effect> {
    commands
        .into_iter()
        .map(|command| Effect::new(part, command))
        .collect()
}
