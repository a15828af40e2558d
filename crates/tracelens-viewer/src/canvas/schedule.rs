use bevy::math::UVec2;
use smallvec::SmallVec;

/// Why a repaint was requested. Only used for logging and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedrawReason {
    Points,
    Scales,
    Transform,
    ColorMode,
    ActiveCase,
    Hover,
    Trajectory,
    Resize,
}

/// What the next frame has to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramePlan {
    /// New surface size, applied before painting.
    pub resize: Option<UVec2>,
    pub reasons: SmallVec<[RedrawReason; 4]>,
}

/// Dirty flag with coalescing: any number of requests between two frame
/// boundaries yield a single paint.
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Option<FramePlan>,
    frames: u64,
    coalesced: u64,
}

impl RedrawScheduler {
    pub fn request(&mut self, reason: RedrawReason) {
        if self.pending.is_some() {
            self.coalesced += 1;
        }
        let plan = self.pending.get_or_insert_with(FramePlan::default);
        if !plan.reasons.contains(&reason) {
            plan.reasons.push(reason);
        }
    }

    /// The latest size wins if several resizes land before one frame.
    pub fn request_resize(&mut self, size: UVec2) {
        self.request(RedrawReason::Resize);
        if let Some(plan) = self.pending.as_mut() {
            plan.resize = Some(size);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending work at a frame boundary, clearing the dirty flag.
    pub fn begin_frame(&mut self) -> Option<FramePlan> {
        let plan = self.pending.take()?;
        self.frames += 1;
        Some(plan)
    }

    /// Drop any pending frame without painting.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
