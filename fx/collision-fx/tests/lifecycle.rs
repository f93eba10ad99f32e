//! End-to-end collision effect lifecycle tests.
//!
//! Drives the engine the way a host would: activate parts, feed contact
//! callbacks, and apply the returned effects to a backend that tracks what
//! is audible and lit.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::collections::BTreeSet;

use approx::assert_relative_eq;
use collision_fx::prelude::*;
use collision_fx::rand::rngs::mock::StepRng;

/// Backend that keeps the live state of every channel and light.
#[derive(Debug, Default)]
struct Mixer {
    playing: BTreeSet<(PartId, AudioChannel)>,
    lit: BTreeSet<PartId>,
    emitted: Vec<(PartId, Emitter, f64)>,
}

impl EffectsBackend for Mixer {
    fn apply(&mut self, effect: &Effect) {
        let part = effect.part;
        match &effect.command {
            EffectCommand::Play { channel, .. } => {
                self.playing.insert((part, *channel));
            }
            EffectCommand::Adjust { channel, .. } => {
                assert!(
                    self.playing.contains(&(part, *channel)),
                    "adjusting a stopped channel"
                );
            }
            EffectCommand::Stop { channel } => {
                assert!(
                    self.playing.remove(&(part, *channel)),
                    "stopping a stopped channel"
                );
            }
            EffectCommand::SetLight { .. } => {
                self.lit.insert(part);
            }
            EffectCommand::DisableLight => {
                assert!(self.lit.remove(&part), "disabling a dark light");
            }
            EffectCommand::Emit { emitter, count, .. } => {
                self.emitted.push((part, *emitter, *count));
            }
            EffectCommand::CreateEmitter { .. }
            | EffectCommand::CreateLight { .. }
            | EffectCommand::CreateChannel { .. } => {}
        }
    }
}

impl Mixer {
    fn scraping(&self) -> BTreeSet<PartId> {
        self.playing
            .iter()
            .filter(|(_, channel)| *channel == AudioChannel::Scrape)
            .map(|(part, _)| *part)
            .collect()
    }

    fn loops(&self) -> usize {
        self.playing
            .iter()
            .filter(|(_, channel)| channel.is_looping())
            .count()
    }
}

struct Scene {
    tree: PartTree,
    fx: CollisionFx,
    ctx: SimulationContext,
    mixer: Mixer,
}

impl Scene {
    fn new() -> Self {
        Self {
            tree: PartTree::new(),
            fx: CollisionFx::new(),
            ctx: SimulationContext::new(DustLibrary::new(StrSource::default())).with_seed(77),
            mixer: Mixer::default(),
        }
    }

    fn clips() -> HashMap<String, f64> {
        [("Bang", 1.0), ("Wheel", 0.5), ("Scrape", 4.0), ("Spark", 3.0)]
            .into_iter()
            .map(|(name, len)| (name.to_string(), len))
            .collect()
    }

    fn config() -> EffectConfig {
        EffectConfig::default()
            .with_collision_sound("Bang")
            .with_wheel_impact_sound("Wheel")
            .with_scrape_sound("Scrape")
            .with_spark_sound("Spark")
    }

    fn activate(&mut self, part: PartId) {
        let effects = self
            .fx
            .activate(&self.tree, part, Self::config(), &Self::clips(), &mut self.ctx)
            .unwrap();
        self.mixer.apply_all(&effects);
    }

    fn stay(&mut self, part: PartId, event: &ContactEvent) {
        let effects = self
            .fx
            .on_collision_stay(&self.tree, part, event, &mut self.ctx);
        self.mixer.apply_all(&effects);
    }

    fn enter(&mut self, part: PartId, event: &ContactEvent) -> Vec<Effect> {
        let effects = self
            .fx
            .on_collision_enter(&self.tree, part, event, &mut self.ctx);
        self.mixer.apply_all(&effects);
        effects
    }

    fn exit(&mut self, part: PartId, event: &ContactEvent) {
        let effects = self
            .fx
            .on_collision_exit(&self.tree, part, event, &mut self.ctx);
        self.mixer.apply_all(&effects);
    }

    fn pause(&mut self) -> Vec<Effect> {
        let effects = self.fx.pause(&mut self.ctx);
        self.mixer.apply_all(&effects);
        effects
    }
}

fn moving(name: &str, x: f64) -> Part {
    Part::new(name, Point3::new(x, 0.0, 0.0)).with_velocity(Vector3::new(0.0, 0.0, 15.0))
}

fn contact_at(point: Point3<f64>, speed: f64) -> ContactEvent {
    ContactEvent::new(
        vec![ContactPoint::new(point, Vector3::zeros())],
        Vector3::new(0.0, 0.0, speed),
        Collider::named("runway_collider"),
        CollidingObject::named("runway"),
    )
}

/// A parent with two insignificant children on the x axis; contacts happen
/// at the origin.
fn family(parent_x: f64) -> (Scene, PartId, PartId, PartId) {
    let mut scene = Scene::new();
    let parent = scene.tree.add_root(moving("fuselage", parent_x));
    let fin = scene
        .tree
        .attach(moving("fin", 8.0).physically_insignificant(), parent)
        .unwrap();
    let strut = scene
        .tree
        .attach(moving("strut", 5.0).physically_insignificant(), parent)
        .unwrap();
    for id in [parent, fin, strut] {
        scene.activate(id);
    }
    (scene, parent, fin, strut)
}

#[test]
fn closest_child_takes_the_scrape() {
    let (mut scene, parent, _fin, strut) = family(10.0);
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));

    assert_eq!(scene.mixer.scraping(), BTreeSet::from([strut]));
    assert!(scene.mixer.lit.contains(&strut));
    assert!(scene.mixer.emitted.iter().all(|(part, _, _)| *part == strut));
}

#[test]
fn closest_parent_keeps_the_scrape() {
    let (mut scene, parent, _fin, _strut) = family(3.0);
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));

    assert_eq!(scene.mixer.scraping(), BTreeSet::from([parent]));
}

#[test]
fn at_most_one_scrape_per_family() {
    let (mut scene, parent, fin, strut) = family(10.0);

    // Each part scrapes on its own contact first
    scene.stay(parent, &contact_at(Point3::new(20.0, 0.0, 0.0), 15.0));
    scene.stay(fin, &contact_at(Point3::new(8.0, 0.0, 0.0), 15.0));
    assert_eq!(scene.mixer.scraping(), BTreeSet::from([parent, fin]));

    // A contact redirected to the strut silences the parent and the fin
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert_eq!(scene.mixer.scraping(), BTreeSet::from([strut]));
    assert_eq!(scene.mixer.lit, BTreeSet::from([strut]));

    for _ in 0..20 {
        scene.stay(parent, &contact_at(Point3::origin(), 15.0));
        assert_eq!(scene.mixer.scraping().len(), 1);
    }

    scene.exit(parent, &contact_at(Point3::origin(), 15.0));
    assert!(scene.mixer.scraping().is_empty());
    assert!(scene.mixer.lit.is_empty());
}

#[test]
fn redirected_scrape_keeps_its_loop() {
    let (mut scene, parent, _fin, strut) = family(10.0);
    let contact = contact_at(Point3::origin(), 15.0);
    scene.stay(parent, &contact);

    for _ in 0..3 {
        let effects = scene
            .fx
            .on_collision_stay(&scene.tree, parent, &contact, &mut scene.ctx);
        scene.mixer.apply_all(&effects);

        let owned: Vec<_> = effects
            .iter()
            .filter(|e| e.part == strut)
            .map(|e| &e.command)
            .collect();
        assert!(owned.iter().any(|c| matches!(
            c,
            EffectCommand::Adjust {
                channel: AudioChannel::Scrape,
                ..
            }
        )));
        assert!(!owned.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(!owned.iter().any(|c| matches!(c, EffectCommand::Stop { .. })));
    }
    assert_eq!(scene.mixer.scraping(), BTreeSet::from([strut]));
}

#[test]
fn impact_goes_to_owner_above_threshold() {
    let (mut scene, parent, _fin, strut) = family(10.0);

    assert!(scene.enter(parent, &contact_at(Point3::origin(), 3.0)).is_empty());

    let effects = scene.enter(parent, &contact_at(Point3::origin(), 9.0));
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].part, strut);
    assert!(effects[0].command.plays(AudioChannel::Bang));
}

#[test]
fn wheel_takes_wheel_impact() {
    let mut scene = Scene::new();
    let body = scene.tree.add_root(moving("body", 10.0));
    let gear = scene
        .tree
        .attach(
            moving("gear", 4.0)
                .with_collider(Bounds::from_center(
                    Point3::new(4.0, 0.0, 0.0),
                    Vector3::new(0.5, 0.5, 0.5),
                ))
                .with_wheel(Wheel::intact(Bounds::from_center(
                    Point3::new(1.0, 0.0, 0.0),
                    Vector3::new(0.5, 0.5, 0.5),
                )))
                .physically_insignificant(),
            body,
        )
        .unwrap();
    scene.activate(body);
    scene.activate(gear);

    let effects = scene.enter(body, &contact_at(Point3::origin(), 12.0));
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].part, gear);
    assert!(effects[0].command.plays(AudioChannel::WheelImpact));

    // Rolling on an intact wheel makes no scrape
    scene.stay(body, &contact_at(Point3::origin(), 12.0));
    assert!(scene.mixer.scraping().is_empty());
    assert!(scene.mixer.emitted.is_empty());

    // Once the wheel breaks the gear scrapes, without dust
    scene.tree.get_mut(gear).unwrap().wheel.as_mut().unwrap().module =
        Some(WheelModule { damaged: true });
    scene.stay(body, &contact_at(Point3::origin(), 12.0));
    assert_eq!(scene.mixer.scraping(), BTreeSet::from([gear]));
    assert!(
        scene
            .mixer
            .emitted
            .iter()
            .all(|(_, emitter, _)| *emitter == Emitter::Sparks)
    );
}

#[test]
fn pause_is_idempotent_and_does_not_resume() {
    let (mut scene, parent, _fin, _strut) = family(3.0);
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert_eq!(scene.mixer.loops(), 2);

    let first = scene.pause();
    assert_eq!(first.len(), 2);
    assert_eq!(scene.mixer.loops(), 0);

    let second = scene.pause();
    assert!(second.is_empty());
    assert_eq!(scene.mixer.loops(), 0);

    // Contacts while paused are ignored
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert!(scene.enter(parent, &contact_at(Point3::origin(), 15.0)).is_empty());
    assert_eq!(scene.mixer.loops(), 0);

    // Unpausing alone brings nothing back
    scene.fx.unpause(&mut scene.ctx);
    assert_eq!(scene.mixer.loops(), 0);

    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert_eq!(scene.mixer.loops(), 2);
}

#[test]
fn slow_contact_is_dark_and_silent() {
    let (mut scene, parent, _fin, _strut) = family(3.0);
    for speed in [0.0, 0.25, 0.5, 0.99] {
        scene.stay(parent, &contact_at(Point3::origin(), speed));
        assert_eq!(scene.mixer.loops(), 0);
        assert!(scene.mixer.lit.is_empty());
        assert!(scene.mixer.emitted.is_empty());
    }
}

#[test]
fn emission_follows_speed() {
    let (mut scene, parent, _fin, _strut) = family(3.0);
    for (speed, expected) in [(1.0, 2.0), (10.0, 20.0), (37.5, 75.0), (100.0, 75.0)] {
        scene.mixer.emitted.clear();
        scene.stay(parent, &contact_at(Point3::origin(), speed));
        assert!(!scene.mixer.emitted.is_empty());
        for (_, _, count) in &scene.mixer.emitted {
            assert_relative_eq!(*count, expected);
        }
    }
}

#[test]
fn flat_random_source_gives_darkest_tan_light() {
    let mut scene = Scene::new();
    scene.ctx = SimulationContext::new(DustLibrary::new(StrSource::default()))
        .with_rng(Box::new(StepRng::new(0, 0)));
    let hull = scene.tree.add_root(moving("hull", 0.0));
    scene.activate(hull);

    let contact = contact_at(Point3::origin(), 20.0);
    let effects = scene
        .fx
        .on_collision_stay(&scene.tree, hull, &contact, &mut scene.ctx);
    let light = effects.iter().find_map(|e| match e.command {
        EffectCommand::SetLight { color, intensity } => Some((color, intensity)),
        _ => None,
    });
    assert_eq!(light, Some((Color::SPARK_TAN, 0.0)));
}

#[test]
fn destroyed_part_stops_its_effects() {
    let (mut scene, parent, _fin, _strut) = family(3.0);
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert_eq!(scene.mixer.loops(), 2);

    scene.tree.get_mut(parent).unwrap().rigid_body = None;
    scene.stay(parent, &contact_at(Point3::origin(), 15.0));
    assert_eq!(scene.mixer.loops(), 0);

    let effects = scene.fx.deactivate(parent);
    assert!(effects.is_empty());
    assert!(!scene.fx.is_active(parent));
}
