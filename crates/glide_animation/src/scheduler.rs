//! Tween scheduler
//!
//! [`TweenEngine`] owns every live tween and advances them once per frame.
//! There is no global instance: create an engine, spawn tweens from
//! [`TweenBuilder`]s and call [`TweenEngine::update`] with a [`FrameClock`]
//! each frame.
//!
//! Each update:
//!
//! 1. promotes pending tweens that were registered on an earlier frame and
//!    whose start delay has run out,
//! 2. steps every active tween in list order (advance, write, update
//!    observers, boundary handling),
//! 3. sweeps retired tweens back into the pool.
//!
//! Observers receive `&mut TweenEngine` and may spawn, pause, resume or cancel
//! any tween, including the one they are attached to. Removal is deferred to
//! the sweep while an update or an observer dispatch is running. Observers a
//! callback triggers on the tween whose list is being dispatched (a tween
//! cancelling itself with completion, say) run right after that dispatch.

use std::ops::{Deref, DerefMut};

use glide_core::{FrameClock, LifecycleEvent, ObserverId, ObserverKind, ObserverList, TweenState};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::interpolator::CombineKey;
use crate::pool::{PoolStats, TweenPool};
use crate::tween::{Boundary, TargetId, Tween, TweenBuilder, TweenCallback, TweenId};

/// Scheduler of live tweens
pub struct TweenEngine {
    config: EngineConfig,
    pub(crate) tweens: SlotMap<TweenId, Tween>,
    pending: Vec<TweenId>,
    active: Vec<TweenId>,
    removal: Vec<TweenId>,
    pool: TweenPool,
    /// Live positional writers per target and channel
    combine_counts: FxHashMap<CombineKey, u32>,
    /// Tweens whose observer list is detached for dispatch, innermost last
    dispatching: Vec<TweenId>,
    /// Fires requested while the tween's list was detached
    deferred: Vec<(TweenId, ObserverKind)>,
    frame: u64,
    ticking: bool,
}

impl TweenEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        tracing::debug!(
            "creating tween engine: pool={} cache={}",
            config.pool_capacity,
            config.cache_capacity
        );
        Self {
            pool: TweenPool::new(&config),
            tweens: SlotMap::with_capacity_and_key(config.pool_capacity),
            pending: Vec::new(),
            active: Vec::new(),
            removal: Vec::new(),
            combine_counts: FxHashMap::default(),
            dispatching: Vec::new(),
            deferred: Vec::new(),
            frame: 0,
            ticking: false,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Register a new tween. It is promoted on the first update after the
    /// current frame, once its start delay has elapsed.
    pub fn spawn(&mut self, builder: TweenBuilder) -> Result<TweenId> {
        builder.validate()?;

        let mut tween = self.pool.acquire(builder.kind());
        builder.apply(&mut tween, self.config.default_easing);
        tween.state.send(LifecycleEvent::Register);
        tween.spawn_frame = self.frame;

        let key = tween.payload.as_ref().and_then(|p| p.combine_key());
        let origin = tween.origin;
        let id = self.tweens.insert(tween);
        self.pending.push(id);
        tracing::trace!("spawned tween {:?} from {:?}", id, origin);

        if let Some(key) = key {
            self.register_writer(id, key);
        }
        Ok(id)
    }

    fn register_writer(&mut self, id: TweenId, key: CombineKey) {
        let count = {
            let count = self.combine_counts.entry(key).or_insert(0);
            *count += 1;
            *count
        };
        if let Some(payload) = self.tweens.get_mut(id).and_then(|t| t.payload.as_mut()) {
            payload.set_primary(count == 1);
        }
        if count < 2 {
            return;
        }

        tracing::debug!(
            "{:?} {:?}: {} concurrent writers, combining",
            key.0,
            key.1,
            count
        );
        for (_, tween) in self.tweens.iter_mut() {
            if !tween.state.is_live() {
                continue;
            }
            if let Some(payload) = tween.payload.as_mut() {
                if payload.combine_key() == Some(key) {
                    payload.enter_combine();
                }
            }
        }
    }

    /// Restore a combined writer's start anchor when it is the last writer
    /// of its key, and drop its count when it is retiring.
    fn reconcile_writer(&mut self, id: TweenId, retiring: bool) {
        let Some(payload) = self.tweens.get_mut(id).and_then(|t| t.payload.as_mut()) else {
            return;
        };
        let Some(key) = payload.combine_key() else {
            return;
        };

        let count = self.combine_counts.get(&key).copied().unwrap_or(0);
        if payload.is_combined() && count == 1 {
            payload.restore_from_backup();
        }
        if retiring {
            if count <= 1 {
                self.combine_counts.remove(&key);
            } else {
                self.combine_counts.insert(key, count - 1);
            }
        }
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Advance every tween by one frame
    pub fn update(&mut self, clock: &dyn FrameClock) {
        if self.ticking {
            tracing::warn!("TweenEngine::update called from inside an update, ignoring");
            return;
        }
        self.ticking = true;
        {
            let mut engine = EngineScope::new(self, |engine| engine.ticking = false);
            engine.frame = clock.frame();
            engine.promote_pending(clock);

            // Tweens spawned by observers land in `pending`, so the active
            // list only grows through promotion and can be walked by index.
            let mut index = 0;
            while index < engine.active.len() {
                let id = engine.active[index];
                index += 1;
                engine.step(id, clock);
            }
        }

        if self.dispatching.is_empty() {
            self.sweep();
        }
    }

    fn promote_pending(&mut self, clock: &dyn FrameClock) {
        if self.pending.is_empty() {
            return;
        }

        let frame = self.frame;
        let pending = std::mem::take(&mut self.pending);
        let mut waiting = Vec::with_capacity(pending.len());

        for id in pending {
            let Some(tween) = self.tweens.get_mut(id) else {
                continue;
            };
            match tween.state {
                TweenState::Pending if tween.spawn_frame < frame => {
                    let props = &mut tween.properties;
                    if props.delay > 0.0 {
                        let dt = if props.unscaled {
                            clock.unscaled_delta()
                        } else {
                            clock.delta()
                        };
                        props.delay = (props.delay - dt).max(0.0);
                        waiting.push(id);
                        continue;
                    }
                    if tween.begin() {
                        tracing::trace!("promoted tween {:?} on frame {}", id, frame);
                        self.active.push(id);
                    }
                }
                TweenState::Done => {}
                _ => waiting.push(id),
            }
        }

        // Nothing fires during promotion, so `pending` is still empty here
        waiting.append(&mut self.pending);
        self.pending = waiting;
    }

    fn step(&mut self, id: TweenId, clock: &dyn FrameClock) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if !tween.state.is_active() {
            return;
        }

        let dt = if tween.properties.unscaled {
            clock.unscaled_delta()
        } else {
            clock.delta()
        };
        let at_boundary = tween.advance(dt);
        self.fire(id, ObserverKind::Update);

        if !at_boundary {
            return;
        }
        // An update observer may have paused or cancelled it
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if !tween.state.is_active() {
            return;
        }

        match tween.cross_boundary() {
            Boundary::Repeat { notify } => {
                self.reconcile_writer(id, false);
                if notify {
                    self.fire(id, ObserverKind::Complete);
                }
            }
            Boundary::Finish => self.finish(id),
        }
    }

    fn finish(&mut self, id: TweenId) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if !tween.state.send(LifecycleEvent::Finish) {
            return;
        }
        self.reconcile_writer(id, true);
        self.fire(id, ObserverKind::Complete);
        self.fire(id, ObserverKind::LastComplete);
        self.retire(id);
    }

    /// Queue a finished or cancelled tween for recycling
    fn retire(&mut self, id: TweenId) {
        self.removal.push(id);
        if !self.ticking && self.dispatching.is_empty() {
            self.sweep();
        }
    }

    fn sweep(&mut self) {
        if self.removal.is_empty() {
            return;
        }
        let removal = std::mem::take(&mut self.removal);
        let retired: FxHashSet<TweenId> = removal.iter().copied().collect();
        self.pending.retain(|id| !retired.contains(id));
        self.active.retain(|id| !retired.contains(id));

        for id in removal {
            if let Some(tween) = self.tweens.remove(id) {
                self.pool.release(tween);
            }
        }
    }

    /// Invoke the observers of `kind` registered on `id`
    fn fire(&mut self, id: TweenId, kind: ObserverKind) {
        let observers = match self.tweens.get_mut(id) {
            Some(tween) if tween.observers.is_detached() => {
                self.deferred.push((id, kind));
                return;
            }
            Some(tween) if tween.observers.count(kind) > 0 => tween.observers.detach(),
            _ => return,
        };

        self.dispatching.push(id);
        {
            let mut engine = EngineScope::new(self, TweenEngine::leave_dispatch);
            engine.dispatch(id, kind, observers);
        }

        if !self.ticking && self.dispatching.is_empty() {
            self.sweep();
        }
    }

    fn dispatch(
        &mut self,
        id: TweenId,
        kind: ObserverKind,
        mut observers: ObserverList<TweenCallback>,
    ) {
        observers.for_each(kind, |callback| callback(self, id));
        if let Some(tween) = self.tweens.get_mut(id) {
            tween.observers.reattach(observers);
        }

        while let Some(index) = self.deferred.iter().position(|&(deferred, _)| deferred == id) {
            let (_, kind) = self.deferred.remove(index);
            self.fire(id, kind);
        }
    }

    fn leave_dispatch(&mut self) {
        let Some(id) = self.dispatching.pop() else {
            return;
        };
        // Still detached only when an observer unwound out of `dispatch`
        if let Some(tween) = self.tweens.get_mut(id) {
            if tween.observers.is_detached() {
                tween.observers.abandon_detached();
            }
        }
        if self.dispatching.is_empty() {
            self.deferred.clear();
        }
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Freeze a pending or active tween. Returns `false` if it is not live
    /// or already paused.
    pub fn pause(&mut self, id: TweenId) -> bool {
        self.send(id, LifecycleEvent::Pause)
    }

    /// Resume a paused tween where it left off
    pub fn resume(&mut self, id: TweenId) -> bool {
        self.send(id, LifecycleEvent::Resume)
    }

    /// Resume a paused tween, first re-reading the live value into its start
    /// when it has a read-back accessor
    pub fn resume_resampled(&mut self, id: TweenId) -> bool {
        if !self.resume(id) {
            return false;
        }
        if let Some(payload) = self.tweens.get_mut(id).and_then(|t| t.payload.as_mut()) {
            payload.resample();
        }
        true
    }

    fn send(&mut self, id: TweenId, event: LifecycleEvent) -> bool {
        self.tweens
            .get_mut(id)
            .is_some_and(|tween| tween.state.send(event))
    }

    /// Stop a live tween. With `execute_completion`, complete and then
    /// last-complete observers run (the tween is already `Done` when they
    /// do). Returns `false` for stale or retired ids.
    pub fn cancel(&mut self, id: TweenId, execute_completion: bool) -> bool {
        if !self.send(id, LifecycleEvent::Cancel) {
            return false;
        }
        tracing::trace!("cancelled tween {:?}", id);
        self.reconcile_writer(id, true);
        if execute_completion {
            self.fire(id, ObserverKind::Complete);
            self.fire(id, ObserverKind::LastComplete);
        }
        self.retire(id);
        true
    }

    /// Cancel every live tween correlated with `target`. Returns how many
    /// were cancelled.
    pub fn cancel_target(&mut self, target: TargetId, execute_completion: bool) -> usize {
        self.tweens_for_target(target)
            .into_iter()
            .filter(|&id| self.cancel(id, execute_completion))
            .count()
    }

    pub fn pause_all(&mut self) -> usize {
        self.live_ids()
            .into_iter()
            .filter(|&id| self.pause(id))
            .count()
    }

    pub fn resume_all(&mut self) -> usize {
        self.live_ids()
            .into_iter()
            .filter(|&id| self.resume(id))
            .count()
    }

    pub fn cancel_all(&mut self, execute_completion: bool) -> usize {
        self.live_ids()
            .into_iter()
            .filter(|&id| self.cancel(id, execute_completion))
            .count()
    }

    fn live_ids(&self) -> Vec<TweenId> {
        self.tweens
            .iter()
            .filter(|(_, tween)| tween.state.is_live())
            .map(|(id, _)| id)
            .collect()
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Run `f` after every write of the tween
    pub fn on_update(
        &mut self,
        id: TweenId,
        f: impl FnMut(&mut TweenEngine, TweenId) + 'static,
    ) -> Option<ObserverId> {
        self.observe(id, ObserverKind::Update, Box::new(f))
    }

    /// Run `f` on every terminal signal, including repeats when the tween
    /// completes on repeat
    pub fn on_complete(
        &mut self,
        id: TweenId,
        f: impl FnMut(&mut TweenEngine, TweenId) + 'static,
    ) -> Option<ObserverId> {
        self.observe(id, ObserverKind::Complete, Box::new(f))
    }

    /// Run `f` once, when the tween is done
    pub fn on_last_complete(
        &mut self,
        id: TweenId,
        f: impl FnMut(&mut TweenEngine, TweenId) + 'static,
    ) -> Option<ObserverId> {
        self.observe(id, ObserverKind::LastComplete, Box::new(f))
    }

    fn observe(
        &mut self,
        id: TweenId,
        kind: ObserverKind,
        callback: Box<TweenCallback>,
    ) -> Option<ObserverId> {
        let tween = self.tweens.get_mut(id)?;
        if !tween.state.is_live() {
            return None;
        }
        Some(tween.observers.register(kind, callback))
    }

    pub fn remove_observer(&mut self, id: TweenId, observer: ObserverId) -> bool {
        self.tweens
            .get_mut(id)
            .is_some_and(|tween| tween.observers.remove(observer))
    }

    /// Drop every observer of the tween
    pub fn clear_events(&mut self, id: TweenId) -> bool {
        match self.tweens.get_mut(id) {
            Some(tween) => {
                tween.observers.clear();
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(id)
    }

    /// Observers of `kind` registered on the tween
    pub fn observer_count(&self, id: TweenId, kind: ObserverKind) -> usize {
        self.tweens
            .get(id)
            .map_or(0, |tween| tween.observers.count(kind))
    }

    /// State of the tween; `Done` for stale ids
    pub fn state(&self, id: TweenId) -> TweenState {
        self.tweens
            .get(id)
            .map_or(TweenState::Done, |tween| tween.state)
    }

    pub fn is_live(&self, id: TweenId) -> bool {
        self.state(id).is_live()
    }

    pub fn is_combined(&self, id: TweenId) -> bool {
        self.tweens.get(id).is_some_and(|tween| tween.is_combined())
    }

    /// Live tweens correlated with `target`
    pub fn tweens_for_target(&self, target: TargetId) -> Vec<TweenId> {
        self.tweens
            .iter()
            .filter(|(_, tween)| tween.target == Some(target) && tween.state.is_live())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_tweening(&self, target: TargetId) -> bool {
        self.tweens
            .values()
            .any(|tween| tween.target == Some(target) && tween.state.is_live())
    }

    /// Promoted tweens, paused ones included
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Tweens not yet recycled
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn pool(&self) -> &TweenPool {
        &self.pool
    }

    /// Frame index of the last update
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Runs `exit` on the engine when dropped, unwinding included
struct EngineScope<'a> {
    engine: &'a mut TweenEngine,
    exit: fn(&mut TweenEngine),
}

impl<'a> EngineScope<'a> {
    fn new(engine: &'a mut TweenEngine, exit: fn(&mut TweenEngine)) -> Self {
        Self { engine, exit }
    }
}

impl Deref for EngineScope<'_> {
    type Target = TweenEngine;

    fn deref(&self) -> &TweenEngine {
        self.engine
    }
}

impl DerefMut for EngineScope<'_> {
    fn deref_mut(&mut self) -> &mut TweenEngine {
        self.engine
    }
}

impl Drop for EngineScope<'_> {
    fn drop(&mut self) {
        (self.exit)(self.engine);
    }
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenEngine")
            .field("live", &self.tweens.len())
            .field("pending", &self.pending.len())
            .field("active", &self.active.len())
            .field("frame", &self.frame)
            .field("pool", &self.pool)
            .finish()
    }
}
