//! Chaining and combining tweens
//!
//! [`TweenQueue`] plays tweens one after another: each queued tween is paused
//! until the previous one is done, then resumed (optionally re-reading its
//! start from the live value). [`TweenEngine::combine`] blends two value
//! tweens into a single output.

use crate::error::{Result, TweenError};
use crate::interpolator::{TweenKind, ValueInterpolator};
use crate::scheduler::TweenEngine;
use crate::tween::TweenId;
use crate::values::TweenValue;

/// Ordered tweens that play back to back
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TweenQueue {
    entries: Vec<TweenId>,
}

impl TweenQueue {
    /// Queue holding a single tween, to append to at runtime
    pub fn new(first: TweenId) -> Self {
        Self {
            entries: vec![first],
        }
    }

    /// Chain `ids` in order. With `resample`, each follower re-reads its
    /// start from the live value when it resumes.
    pub fn chain(engine: &mut TweenEngine, ids: &[TweenId], resample: bool) -> Self {
        let mut queue = Self::default();
        for &id in ids {
            if queue.entries.is_empty() {
                queue.entries.push(id);
            } else {
                queue.then(engine, id, resample);
            }
        }
        queue
    }

    /// Append `next`: it is paused now and resumes once the current last
    /// tween is done. If that tween already retired, `next` keeps running.
    pub fn then(&mut self, engine: &mut TweenEngine, next: TweenId, resample: bool) -> &mut Self {
        let Some(&previous) = self.entries.last() else {
            self.entries.push(next);
            return self;
        };
        self.entries.push(next);

        if !engine.is_live(previous) {
            return self;
        }
        if !engine.pause(next) {
            tracing::debug!("queued tween {:?} is not live, nothing to chain", next);
            return self;
        }

        engine.on_last_complete(previous, move |engine, _| {
            if resample {
                engine.resume_resampled(next);
            } else {
                engine.resume(next);
            }
        });
        self
    }

    /// Cancel every queued tween that is still live
    pub fn cancel_all(&self, engine: &mut TweenEngine, execute_completion: bool) -> usize {
        self.entries
            .iter()
            .filter(|&&id| engine.cancel(id, execute_completion))
            .count()
    }

    pub fn ids(&self) -> &[TweenId] {
        &self.entries
    }

    pub fn last(&self) -> Option<TweenId> {
        self.entries.last().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TweenEngine {
    /// Wrap a tween in a queue so more tweens can follow it
    pub fn as_queue(&self, id: TweenId) -> TweenQueue {
        TweenQueue::new(id)
    }

    /// Blend two value tweens of payload `T`.
    ///
    /// The lead's writer becomes the pair's output. While both are live the
    /// follower writes `lerp(lead_value, follow_value, e)` through it, where
    /// `e` is the follower's eased progress; once the follower retires the
    /// lead writes its own values again. A tween can be part of one pair only.
    pub fn combine<T: TweenValue>(&mut self, lead: TweenId, follow: TweenId) -> Result<()> {
        let expected = TweenKind::Value(T::KIND);
        let lead_kind = self.kind_of(lead)?;
        let follow_kind = self.kind_of(follow)?;
        if lead == follow {
            return Err(TweenError::AlreadyCombined(lead));
        }
        if lead_kind != expected || follow_kind != expected {
            return Err(TweenError::KindMismatch {
                lead: lead_kind,
                follow: follow_kind,
            });
        }

        for id in [lead, follow] {
            if self.value_interpolator::<T>(id)?.is_blended() {
                return Err(TweenError::AlreadyCombined(id));
            }
        }

        let slot = self.value_interpolator::<T>(lead)?.make_lead();
        self.value_interpolator::<T>(follow)?.follow(slot);
        tracing::debug!("combined {:?} into {:?}", follow, lead);
        Ok(())
    }

    fn kind_of(&self, id: TweenId) -> Result<TweenKind> {
        self.get(id)
            .filter(|tween| tween.state().is_live())
            .map(|tween| tween.kind())
            .ok_or(TweenError::UnknownTween(id))
    }

    fn value_interpolator<T: TweenValue>(
        &mut self,
        id: TweenId,
    ) -> Result<&mut ValueInterpolator<T>> {
        let tween = self
            .tweens
            .get_mut(id)
            .ok_or(TweenError::UnknownTween(id))?;
        let kind = tween.kind;
        tween
            .payload
            .as_mut()
            .and_then(|payload| payload.as_any_mut().downcast_mut::<ValueInterpolator<T>>())
            .ok_or(TweenError::KindMismatch {
                lead: kind,
                follow: TweenKind::Value(T::KIND),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::TweenBuilder;
    use glide_core::{ManualClock, TweenState, Vec2};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<f32>>>, impl FnMut(f32) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn test_chain_runs_in_order() {
        let mut engine = TweenEngine::new();
        let mut clock = ManualClock::new();
        let (first_log, first_writer) = recorder();
        let (second_log, second_writer) = recorder();

        let first = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 0.5, first_writer))
            .unwrap();
        let second = engine
            .spawn(TweenBuilder::value(1.0f32, 2.0, 0.5, second_writer))
            .unwrap();
        let queue = TweenQueue::chain(&mut engine, &[first, second], false);
        assert_eq!(queue.ids(), &[first, second]);
        assert_eq!(engine.observer_count(first, glide_core::ObserverKind::LastComplete), 1);

        engine.update(clock.advance(0.25));
        engine.update(clock.advance(0.25));
        assert_eq!(*first_log.borrow(), vec![0.5, 1.0]);
        assert!(second_log.borrow().is_empty());
        assert_eq!(engine.state(second), TweenState::Pending);

        engine.update(clock.advance(0.25));
        engine.update(clock.advance(0.25));
        assert_eq!(*second_log.borrow(), vec![1.5, 2.0]);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_then_after_previous_retired_keeps_running() {
        let mut engine = TweenEngine::new();
        let first = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
            .unwrap();
        let mut queue = engine.as_queue(first);
        engine.cancel(first, false);

        let next = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
            .unwrap();
        queue.then(&mut engine, next, false);
        assert_eq!(engine.state(next), TweenState::Pending);
        assert_eq!(queue.last(), Some(next));
    }

    #[test]
    fn test_self_cancelled_entry_hands_over_to_next() {
        let mut engine = TweenEngine::new();
        let mut clock = ManualClock::new();
        let (second_log, second_writer) = recorder();

        let first = engine
            .spawn(
                TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}).on_update(|engine, id| {
                    engine.cancel(id, true);
                }),
            )
            .unwrap();
        let second = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 0.5, second_writer))
            .unwrap();
        TweenQueue::chain(&mut engine, &[first, second], false);

        engine.update(clock.advance(0.25));
        assert_eq!(engine.state(first), TweenState::Done);
        assert_eq!(engine.state(second), TweenState::Pending);

        engine.update(clock.advance(0.25));
        assert_eq!(*second_log.borrow(), vec![0.5]);
    }

    #[test]
    fn test_queue_cancel_all() {
        let mut engine = TweenEngine::new();
        let ids: Vec<TweenId> = (0..3)
            .map(|_| {
                engine
                    .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
                    .unwrap()
            })
            .collect();
        let queue = TweenQueue::chain(&mut engine, &ids, true);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.cancel_all(&mut engine, false), 3);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_combine_blends_through_lead_writer() {
        let mut engine = TweenEngine::new();
        let mut clock = ManualClock::new();
        let (lead_log, lead_writer) = recorder();
        let (follow_log, follow_writer) = recorder();

        let lead = engine
            .spawn(TweenBuilder::value(0.0f32, 10.0, 1.0, lead_writer))
            .unwrap();
        let follow = engine
            .spawn(TweenBuilder::value(20.0f32, 30.0, 0.5, follow_writer))
            .unwrap();
        engine.combine::<f32>(lead, follow).unwrap();
        assert!(engine.is_combined(lead));
        assert!(engine.is_combined(follow));

        // lead 2.5; follower lerp(2.5, 25, 0.5)
        engine.update(clock.advance(0.25));
        assert_eq!(*lead_log.borrow(), vec![13.75]);
        assert!(follow_log.borrow().is_empty());

        // lead 5; follower finishes: lerp(5, 30, 1)
        engine.update(clock.advance(0.25));
        assert_eq!(*lead_log.borrow(), vec![13.75, 30.0]);

        // Follower retired, the lead writes on its own
        engine.update(clock.advance(0.25));
        assert_eq!(*lead_log.borrow(), vec![13.75, 30.0, 7.5]);
    }

    #[test]
    fn test_combine_with_paused_follower_keeps_lead_writing() {
        let mut engine = TweenEngine::new();
        let mut clock = ManualClock::new();
        let (lead_log, lead_writer) = recorder();

        let lead = engine
            .spawn(TweenBuilder::value(0.0f32, 10.0, 1.0, lead_writer))
            .unwrap();
        let follow = engine
            .spawn(TweenBuilder::value(20.0f32, 30.0, 1.0, |_| {}))
            .unwrap();
        engine.combine::<f32>(lead, follow).unwrap();
        assert!(engine.pause(follow));

        // The first frame after pairing is left to the follower
        for _ in 0..3 {
            engine.update(clock.advance(0.25));
        }
        assert_eq!(*lead_log.borrow(), vec![5.0, 7.5]);

        // Resumed: promoted behind the lead, blends lerp(10, 22.5, 0.25)
        assert!(engine.resume(follow));
        engine.update(clock.advance(0.25));
        assert_eq!(*lead_log.borrow(), vec![5.0, 7.5, 10.0, 13.125]);
    }

    #[test]
    fn test_combine_errors() {
        let mut engine = TweenEngine::new();
        let a = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
            .unwrap();
        let b = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
            .unwrap();
        let c = engine
            .spawn(TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}))
            .unwrap();
        let v = engine
            .spawn(TweenBuilder::value(Vec2::ZERO, Vec2::ONE, 1.0, |_| {}))
            .unwrap();

        assert!(matches!(
            engine.combine::<f32>(a, v),
            Err(TweenError::KindMismatch { .. })
        ));
        assert!(matches!(
            engine.combine::<Vec2>(a, b),
            Err(TweenError::KindMismatch { .. })
        ));
        assert!(matches!(
            engine.combine::<f32>(a, a),
            Err(TweenError::AlreadyCombined(_))
        ));

        engine.combine::<f32>(a, b).unwrap();
        assert!(matches!(
            engine.combine::<f32>(c, b),
            Err(TweenError::AlreadyCombined(id)) if id == b
        ));

        engine.cancel(c, false);
        assert!(matches!(
            engine.combine::<f32>(a, c),
            Err(TweenError::UnknownTween(_))
        ));
    }
}
