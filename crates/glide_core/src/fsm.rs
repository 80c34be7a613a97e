//! Tween lifecycle state machine
//!
//! Every tween moves through the same small statechart:
//!
//! ```text
//!            Register           Promote
//!   Done ─────────────▶ Pending ───────▶ Active(dir) ◀──┐ Flip
//!    ▲                     │  ▲             │  ▲  └──────┘
//!    │                Pause│  │Resume  Pause│  │Resume
//!    │                     ▼  │             ▼  │
//!    │              Paused{promoted: false}  Paused{promoted: true}
//!    │
//!    └──── Finish (from Active) / Cancel (from any live state)
//! ```
//!
//! The table in [`TweenState::transition`] is exhaustive: any pair not listed
//! there is rejected and leaves the state untouched.

/// Playback direction of an active tween
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, Direction::Reverse)
    }
}

/// Lifecycle state of a tween instance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TweenState {
    /// Registered, waiting for the activation gate or its start delay
    Pending,
    /// Ticking every frame
    Active(Direction),
    /// Frozen; `promoted` records whether it had reached the active list
    Paused { direction: Direction, promoted: bool },
    /// Retired or never started
    #[default]
    Done,
}

/// Events that drive [`TweenState`] transitions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Register,
    Promote,
    Pause,
    Resume,
    Flip,
    Finish,
    Cancel,
}

impl TweenState {
    /// Resolve the state reached from `self` on `event`, or `None` if the
    /// transition is not defined.
    pub fn transition(self, event: LifecycleEvent) -> Option<TweenState> {
        use LifecycleEvent as E;
        use TweenState as S;

        match (self, event) {
            (S::Done, E::Register) => Some(S::Pending),

            (S::Pending, E::Promote) => Some(S::Active(Direction::Forward)),

            (S::Pending, E::Pause) => Some(S::Paused {
                direction: Direction::Forward,
                promoted: false,
            }),
            (S::Active(direction), E::Pause) => Some(S::Paused {
                direction,
                promoted: true,
            }),

            (
                S::Paused {
                    promoted: false, ..
                },
                E::Resume,
            ) => Some(S::Pending),
            (
                S::Paused {
                    direction,
                    promoted: true,
                },
                E::Resume,
            ) => Some(S::Active(direction)),

            (S::Active(direction), E::Flip) => Some(S::Active(direction.flipped())),

            (S::Active(_), E::Finish) => Some(S::Done),

            (S::Pending | S::Active(_) | S::Paused { .. }, E::Cancel) => Some(S::Done),

            (S::Done, _)
            | (S::Pending, E::Register | E::Resume | E::Flip | E::Finish)
            | (S::Active(_), E::Register | E::Promote | E::Resume)
            | (S::Paused { .. }, E::Register | E::Promote | E::Pause | E::Flip | E::Finish) => {
                None
            }
        }
    }

    /// Apply `event` in place. Returns `false` (and leaves the state as is)
    /// when the transition is not defined.
    pub fn send(&mut self, event: LifecycleEvent) -> bool {
        match self.transition(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => {
                tracing::trace!("tween state {:?} ignores {:?}", self, event);
                false
            }
        }
    }

    /// Pending, active or paused
    pub fn is_live(&self) -> bool {
        !matches!(self, TweenState::Done)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TweenState::Active(_))
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TweenState::Paused { .. })
    }

    /// Direction while active or paused
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TweenState::Active(direction) | TweenState::Paused { direction, .. } => {
                Some(*direction)
            }
            TweenState::Pending | TweenState::Done => None,
        }
    }
}
