//! Registry of per-card animations.

use std::collections::HashMap;

use rand::{SeedableRng, rngs::StdRng};
use stratus_core::{CardId, RoutineKind, Size, SurfaceId};
use tracing::{debug, trace};

use crate::frame_loop::{FrameLoop, LoopToken};
use crate::routine::Routine;
use crate::surface::Surface;

/// The view that owns the cards animations are attached to.
pub trait CardHost {
    /// Current rendered size of `card`, or [`Size::ZERO`] before layout.
    fn rendered_size(&self, card: CardId) -> Size;

    /// Insert `surface` as the first layer of `card`, beneath its content.
    fn insert_surface(&mut self, card: CardId, surface: SurfaceId);

    /// Remove `surface` from `card`.
    fn remove_surface(&mut self, card: CardId, surface: SurfaceId);
}

/// One card's running animation.
#[derive(Debug)]
pub struct AnimationHandle {
    surface: Surface,
    token: LoopToken,
    routine: Routine,
    frames: u64,
}

impl AnimationHandle {
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn token(&self) -> LoopToken {
        self.token
    }

    /// Frames drawn since the animation was attached.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn redraw(&mut self, rng: &mut StdRng) {
        self.routine.redraw(&mut self.surface, rng);
        self.frames += 1;
    }
}

/// Outcome of one [`AnimationManager::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Loops that drew a frame.
    pub redrawn: usize,
    /// Deliveries for loops cancelled after their frame was requested.
    pub stale: usize,
}

/// Owns every card animation and the frame loop that drives them.
///
/// Every [`attach`](Self::attach) is paired with exactly one cancellation,
/// either through a later `attach` on the same card, [`detach`](Self::detach)
/// or [`detach_all`](Self::detach_all).
#[derive(Debug)]
pub struct AnimationManager {
    registry: HashMap<CardId, AnimationHandle>,
    loops: HashMap<LoopToken, CardId>,
    frame_loop: FrameLoop,
    next_surface: u64,
    rng: StdRng,
}

impl Default for AnimationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationManager {
    /// Create a manager seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a manager with a reproducible random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            registry: HashMap::new(),
            loops: HashMap::new(),
            frame_loop: FrameLoop::new(),
            next_surface: 0,
            rng,
        }
    }

    /// Start (or restart) the animation for `card`.
    ///
    /// Any animation already attached to the card is detached first. The
    /// first frame is drawn immediately, later frames on each [`tick`](Self::tick).
    pub fn attach<H: CardHost + ?Sized>(
        &mut self,
        host: &mut H,
        card: CardId,
        condition: &str,
        is_daytime: bool,
        temperature: f64,
    ) {
        self.detach(host, card);

        let size = host.rendered_size(card);
        self.next_surface += 1;
        let mut surface = Surface::new(SurfaceId::new(self.next_surface), size);
        host.insert_surface(card, surface.id());

        let mut routine = Routine::select(condition, is_daytime, temperature, size, &mut self.rng);
        routine.redraw(&mut surface, &mut self.rng);
        let token = self.frame_loop.start();

        debug!(
            %card,
            routine = %routine.kind(),
            width = size.width,
            height = size.height,
            token = token.raw(),
            "attached animation"
        );

        self.loops.insert(token, card);
        self.registry.insert(
            card,
            AnimationHandle {
                surface,
                token,
                routine,
                frames: 1,
            },
        );
    }

    /// Stop the animation for `card` and remove its surface. No-op if none.
    pub fn detach<H: CardHost + ?Sized>(&mut self, host: &mut H, card: CardId) {
        let Some(handle) = self.registry.remove(&card) else {
            return;
        };
        self.frame_loop.cancel(handle.token);
        self.loops.remove(&handle.token);
        host.remove_surface(card, handle.surface.id());
        debug!(
            %card,
            routine = %handle.routine.kind(),
            frames = handle.frames,
            "detached animation"
        );
    }

    /// Detach every card.
    pub fn detach_all<H: CardHost + ?Sized>(&mut self, host: &mut H) {
        let cards: Vec<CardId> = self.registry.keys().copied().collect();
        for card in cards {
            self.detach(host, card);
        }
    }

    /// Deliver one display frame to every loop that requested it.
    pub fn tick(&mut self) -> FrameStats {
        let mut stats = FrameStats::default();

        for token in self.frame_loop.take_due() {
            // A frame requested before cancellation can still arrive here.
            if !self.frame_loop.is_live(token) {
                trace!(token = token.raw(), "dropping frame for cancelled loop");
                stats.stale += 1;
                continue;
            }
            let Some(handle) = self
                .loops
                .get(&token)
                .and_then(|card| self.registry.get_mut(card))
            else {
                stats.stale += 1;
                continue;
            };

            handle.redraw(&mut self.rng);
            self.frame_loop.request(token);
            stats.redrawn += 1;
        }

        stats
    }

    pub fn handle(&self, card: CardId) -> Option<&AnimationHandle> {
        self.registry.get(&card)
    }

    pub fn surface(&self, card: CardId) -> Option<&Surface> {
        self.registry.get(&card).map(AnimationHandle::surface)
    }

    pub fn routine_kind(&self, card: CardId) -> Option<RoutineKind> {
        self.registry.get(&card).map(|handle| handle.routine.kind())
    }

    /// Whether the loop behind `token` is still scheduled.
    pub fn is_running(&self, token: LoopToken) -> bool {
        self.frame_loop.is_live(token)
    }

    /// Number of live loops, which always equals [`len`](Self::len).
    pub fn running_loops(&self) -> usize {
        self.frame_loop.live_count()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
