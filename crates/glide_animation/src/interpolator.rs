//! Tween payloads
//!
//! An [`Interpolator`] owns a tween's endpoints and its write (and optional
//! read-back) callbacks. The engine hands it eased progress each tick and it
//! writes the interpolated value out.
//!
//! Two families exist:
//!
//! - [`ValueInterpolator<T>`]: any [`TweenValue`] between two endpoints. Pairs
//!   of value tweens can be blended with combine-lerp.
//! - [`PositionalInterpolator`]: move, scale or rotate of a [`TargetId`],
//!   sampling its start from the live value. Concurrent positional tweens on
//!   the same target and kind reconcile through combine mode.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glide_core::Vec3;

use crate::tween::TargetId;
use crate::values::{shortest_arc_degrees, Interpolate, TweenValue, ValueKind};

/// Which transform channel a positional tween drives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionalKind {
    Move,
    Scale,
    /// Euler angles in degrees, interpolated along the shortest arc
    Rotate,
}

/// Payload tag of a tween, used to match pooled shells and combine pairs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TweenKind {
    Value(ValueKind),
    Positional(PositionalKind),
}

/// Key of the engine's writer-count table
pub type CombineKey = (TargetId, PositionalKind);

/// Write callback for values of type `T`
pub type Writer<T> = Box<dyn FnMut(T)>;

/// Read-back callback returning the live external value
pub type Reader<T> = Box<dyn Fn() -> T>;

/// A tween's payload
pub trait Interpolator: Any {
    fn kind(&self) -> TweenKind;

    /// Called once when the tween is promoted to active
    fn begin(&mut self);

    /// Write the value at eased progress `eased`
    fn write(&mut self, eased: f32);

    /// Re-read the live value into `from`. Returns `false` without a reader.
    fn resample(&mut self) -> bool;

    /// Endpoints known so far are free of NaN and infinity
    fn is_finite(&self) -> bool;

    /// Writer-count key for positional payloads
    fn combine_key(&self) -> Option<CombineKey> {
        None
    }

    /// Enter combine mode, capturing a backup of `from` once it is known
    fn enter_combine(&mut self) {}

    /// Mark the first writer of a combine key
    fn set_primary(&mut self, _primary: bool) {}

    /// Combine mode for positional payloads, combine-lerp pairing for values
    fn is_combined(&self) -> bool {
        false
    }

    /// Restore `from` from the anchor captured when combine mode began
    fn restore_from_backup(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ============================================================================
// Value interpolator
// ============================================================================

/// State shared by the two halves of a combine-lerp pair
pub(crate) struct BlendSlot<T> {
    writer: Writer<T>,
    lead_value: T,
    /// Set by the follower on every write, cleared by the lead
    follower_wrote: bool,
}

enum Blend<T> {
    Lead(Rc<RefCell<BlendSlot<T>>>),
    Follow(Rc<RefCell<BlendSlot<T>>>),
}

/// Interpolates a [`TweenValue`] between two endpoints
pub struct ValueInterpolator<T: TweenValue> {
    from: T,
    to: T,
    writer: Writer<T>,
    reader: Option<Reader<T>>,
    blend: Option<Blend<T>>,
}

impl<T: TweenValue> ValueInterpolator<T> {
    pub fn new(from: T, to: T, writer: impl FnMut(T) + 'static) -> Self {
        Self {
            from,
            to,
            writer: Box::new(writer),
            reader: None,
            blend: None,
        }
    }

    pub fn with_reader(mut self, reader: impl Fn() -> T + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    pub fn from(&self) -> T {
        self.from
    }

    pub fn to(&self) -> T {
        self.to
    }

    pub fn is_blended(&self) -> bool {
        self.blend.is_some()
    }

    /// Become the lead of a combine-lerp pair: the writer moves into a shared
    /// slot the follower writes through.
    pub(crate) fn make_lead(&mut self) -> Rc<RefCell<BlendSlot<T>>> {
        let writer = std::mem::replace(&mut self.writer, Box::new(|_: T| {}));
        // The follower gets the first frame after pairing
        let slot = Rc::new(RefCell::new(BlendSlot {
            writer,
            lead_value: self.from,
            follower_wrote: true,
        }));
        self.blend = Some(Blend::Lead(Rc::clone(&slot)));
        slot
    }

    pub(crate) fn follow(&mut self, slot: Rc<RefCell<BlendSlot<T>>>) {
        self.blend = Some(Blend::Follow(slot));
    }
}

impl<T: TweenValue> Interpolator for ValueInterpolator<T> {
    fn kind(&self) -> TweenKind {
        TweenKind::Value(T::KIND)
    }

    fn begin(&mut self) {}

    fn write(&mut self, eased: f32) {
        let value = self.from.lerp(&self.to, eased);
        match &self.blend {
            None => (self.writer)(value),
            Some(Blend::Lead(slot)) => {
                let follower_alive = Rc::strong_count(slot) > 1;
                let mut slot = slot.borrow_mut();
                slot.lead_value = value;
                // Silent only while the follower keeps writing; a paused or
                // not yet promoted follower leaves the output to the lead
                let follower_writing = follower_alive && slot.follower_wrote;
                slot.follower_wrote = false;
                if !follower_writing {
                    (slot.writer)(value);
                }
            }
            Some(Blend::Follow(slot)) => {
                let mut slot = slot.borrow_mut();
                slot.follower_wrote = true;
                let blended = slot.lead_value.lerp(&value, eased);
                (slot.writer)(blended);
            }
        }
    }

    fn resample(&mut self) -> bool {
        match &self.reader {
            Some(reader) => {
                self.from = reader();
                true
            }
            None => false,
        }
    }

    fn is_finite(&self) -> bool {
        self.from.is_finite() && self.to.is_finite()
    }

    fn is_combined(&self) -> bool {
        self.is_blended()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: TweenValue> fmt::Debug for ValueInterpolator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueInterpolator")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("reader", &self.reader.is_some())
            .field("blended", &self.blend.is_some())
            .finish()
    }
}

// ============================================================================
// Positional interpolator
// ============================================================================

/// Move, scale or rotate of a target, starting from its live value
pub struct PositionalInterpolator {
    kind: PositionalKind,
    target: TargetId,
    from: Vec3,
    to: Vec3,
    /// `to` adjusted onto the shortest arc for rotations
    end: Vec3,
    from_override: bool,
    sampled: bool,
    combined: bool,
    primary: bool,
    backup: Option<Vec3>,
    writer: Writer<Vec3>,
    reader: Reader<Vec3>,
}

impl PositionalInterpolator {
    pub fn new(
        kind: PositionalKind,
        target: TargetId,
        to: Vec3,
        writer: impl FnMut(Vec3) + 'static,
        reader: impl Fn() -> Vec3 + 'static,
    ) -> Self {
        Self {
            kind,
            target,
            from: Vec3::ZERO,
            to,
            end: to,
            from_override: false,
            sampled: false,
            combined: false,
            primary: false,
            backup: None,
            writer: Box::new(writer),
            reader: Box::new(reader),
        }
    }

    /// Start from `from` instead of sampling the live value
    pub fn with_from(mut self, from: Vec3) -> Self {
        self.override_from(from);
        self
    }

    pub(crate) fn override_from(&mut self, from: Vec3) {
        self.from = from;
        self.from_override = true;
    }

    pub fn positional_kind(&self) -> PositionalKind {
        self.kind
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn from(&self) -> Vec3 {
        self.from
    }

    pub fn to(&self) -> Vec3 {
        self.to
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    fn resolve_end(&mut self) {
        self.end = match self.kind {
            PositionalKind::Rotate => Vec3::new(
                self.from.x + shortest_arc_degrees(self.to.x - self.from.x),
                self.from.y + shortest_arc_degrees(self.to.y - self.from.y),
                self.from.z + shortest_arc_degrees(self.to.z - self.from.z),
            ),
            PositionalKind::Move | PositionalKind::Scale => self.to,
        };
    }
}

impl Interpolator for PositionalInterpolator {
    fn kind(&self) -> TweenKind {
        TweenKind::Positional(self.kind)
    }

    fn begin(&mut self) {
        if !self.from_override {
            self.from = (self.reader)();
        }
        self.sampled = true;
        if self.combined && self.backup.is_none() {
            self.backup = Some(self.from);
        }
        self.resolve_end();
    }

    fn write(&mut self, eased: f32) {
        let value = if self.combined && !self.primary {
            let live = (self.reader)();
            self.from.lerp(&live, eased).lerp(&self.end, eased)
        } else {
            self.from.lerp(&self.end, eased)
        };
        (self.writer)(value);
    }

    fn resample(&mut self) -> bool {
        self.from = (self.reader)();
        self.resolve_end();
        true
    }

    fn is_finite(&self) -> bool {
        self.to.is_finite() && (!self.from_override || self.from.is_finite())
    }

    fn combine_key(&self) -> Option<CombineKey> {
        Some((self.target, self.kind))
    }

    fn enter_combine(&mut self) {
        if self.combined {
            return;
        }
        self.combined = true;
        if self.sampled {
            self.backup = Some(self.from);
        }
    }

    fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
    }

    fn is_combined(&self) -> bool {
        self.combined
    }

    fn restore_from_backup(&mut self) {
        if let Some(backup) = self.backup {
            self.from = backup;
            self.resolve_end();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for PositionalInterpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionalInterpolator")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("combined", &self.combined)
            .field("primary", &self.primary)
            .finish()
    }
}
