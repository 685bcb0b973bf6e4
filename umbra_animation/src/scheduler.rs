// Copyright 2025 the Umbra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A keyed table of animations advanced together.

use alloc::{format, string::String, vec::Vec};

use crate::Animation;

/// Animations keyed by name, advanced in insertion order.
///
/// At most one animation is registered per key; adding under an existing key stops the old
/// animation (running its stop hooks) and takes over its slot.
///
/// ```
/// use umbra_animation::{Animation, AnimationScheduler};
///
/// let mut scheduler: AnimationScheduler<f64> = AnimationScheduler::new();
/// scheduler.add("fade", Animation::new(2.0).on_update(|opacity: &mut f64, v| *opacity = v));
///
/// let mut opacity = 0.0;
/// scheduler.update(&mut opacity, 0.5);
/// assert_eq!(opacity, 0.25);
/// ```
pub struct AnimationScheduler<C = ()> {
    entries: Vec<(String, Animation<C>)>,
    next_unnamed: u64,
}

impl<C> core::fmt::Debug for AnimationScheduler<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, a)| (k, a)))
            .finish()
    }
}

impl<C> Default for AnimationScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> AnimationScheduler<C> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_unnamed: 0,
        }
    }

    /// Register `animation` under `key`, stopping and returning any animation it replaces.
    pub fn add(&mut self, key: impl Into<String>, animation: Animation<C>) -> Option<Animation<C>> {
        let key = key.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            tracing::debug!(key = %key, "replacing animation");
            let mut old = core::mem::replace(slot, animation);
            old.stop();
            return Some(old);
        }
        self.entries.push((key, animation));
        None
    }

    /// Register `animation` under a generated key, which is returned.
    pub fn add_unnamed(&mut self, animation: Animation<C>) -> String {
        let key = loop {
            let candidate = format!("#{}", self.next_unnamed);
            self.next_unnamed += 1;
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        self.entries.push((key.clone(), animation));
        key
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// The animation under `key`.
    pub fn get(&self, key: &str) -> Option<&Animation<C>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    /// The animation under `key`, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Animation<C>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, a)| a)
    }

    /// Unregister `key` without stopping it.
    pub fn remove(&mut self, key: &str) -> Option<Animation<C>> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Stop the animation under `key`. Returns false if there is none.
    pub fn stop(&mut self, key: &str) -> bool {
        match self.get_mut(key) {
            Some(animation) => {
                animation.stop();
                true
            }
            None => false,
        }
    }

    /// Drop every animation that is no longer playing.
    pub fn remove_finished(&mut self) {
        self.entries.retain(|(_, a)| a.playing);
    }

    /// Registered keys in update order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of registered animations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every registered animation by `dt`.
    pub fn update(&mut self, cx: &mut C, dt: f64) {
        for (_, animation) in &mut self.entries {
            animation.update(cx, dt);
        }
    }
}
