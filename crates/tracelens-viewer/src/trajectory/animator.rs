use super::path::Trajectory;

/// Seconds for a full reveal.
pub const PLAY_DURATION: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryEvent {
    /// Playback reached the end (or had nothing to play).
    Completed,
}

/// Cubic ease-in-out over `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Reveal state of one case's trajectory. Times are seconds on any monotonic
/// clock; the animator never reads a clock itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryAnimator {
    duration: f32,
    started_at: Option<f64>,
    reveal: f32,
    hovered: Option<usize>,
    marker: Option<usize>,
}

impl Default for TrajectoryAnimator {
    fn default() -> Self {
        Self::new(PLAY_DURATION)
    }
}

impl TrajectoryAnimator {
    pub fn new(duration: f32) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            PLAY_DURATION
        };
        Self {
            duration,
            started_at: None,
            reveal: 0.0,
            hovered: None,
            marker: None,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn reveal(&self) -> f32 {
        self.reveal
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Sentence index the marker dot sits on, if a hover snapped it.
    pub fn marker(&self) -> Option<usize> {
        self.marker
    }

    /// Restart from zero, replacing any in-flight play. A path with fewer
    /// than two vertices completes at once.
    pub fn play(&mut self, now: f64, path: &Trajectory) -> Option<TrajectoryEvent> {
        self.stop();
        self.reveal = 0.0;
        self.marker = None;
        if !path.is_drawable() {
            return Some(TrajectoryEvent::Completed);
        }
        self.started_at = Some(now);
        None
    }

    /// Advance playback. Reports `Completed` exactly once per play.
    pub fn tick(&mut self, now: f64) -> Option<TrajectoryEvent> {
        let start = self.started_at?;
        let t = ((now - start) / f64::from(self.duration)) as f32;
        self.reveal = ease_in_out(t);
        if t >= 1.0 {
            self.started_at = None;
            self.reveal = 1.0;
            return Some(TrajectoryEvent::Completed);
        }
        None
    }

    /// Jump straight to `fraction`, stopping playback.
    pub fn snap(&mut self, sentence: usize, fraction: f32) {
        self.stop();
        self.reveal = fraction.clamp(0.0, 1.0);
        self.marker = Some(sentence);
    }

    /// Follow the external sentence hover. Snaps only when the hovered
    /// sentence changes and lies on the path; returns whether anything
    /// visible changed.
    pub fn follow_hover(&mut self, sentence: Option<usize>, path: &Trajectory) -> bool {
        if sentence == self.hovered {
            return false;
        }
        self.hovered = sentence;
        match sentence.and_then(|s| path.fraction_of(s).map(|f| (s, f))) {
            Some((s, f)) if path.is_drawable() => {
                self.snap(s, f);
                true
            }
            _ => self.marker.take().is_some(),
        }
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    /// Back to the initial state, e.g. when the case changes.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn path() -> Trajectory {
        Trajectory::from_screen([
            (0, Vec2::new(0.0, 0.0)),
            (1, Vec2::new(3.0, 4.0)),
            (3, Vec2::new(6.0, 8.0)),
        ])
    }

    #[test]
    fn easing_endpoints_and_symmetry() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-6);
        assert_eq!(ease_in_out(-3.0), 0.0);
        assert_eq!(ease_in_out(7.0), 1.0);
        assert_eq!(ease_in_out(f32::NAN), 0.0);

        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out(i as f32 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn play_runs_to_completion_once() {
        let p = path();
        let mut a = TrajectoryAnimator::default();
        assert_eq!(a.play(10.0, &p), None);
        assert!(a.is_playing());
        assert_eq!(a.tick(10.0), None);
        assert_eq!(a.reveal(), 0.0);
        assert_eq!(a.tick(11.0), None);
        assert!((a.reveal() - 0.5).abs() < 1e-6);
        assert_eq!(a.tick(12.5), Some(TrajectoryEvent::Completed));
        assert_eq!(a.reveal(), 1.0);
        assert!(!a.is_playing());
        assert_eq!(a.tick(13.0), None);
    }

    #[test]
    fn new_play_cancels_previous() {
        let p = path();
        let mut a = TrajectoryAnimator::default();
        a.play(0.0, &p);
        a.tick(1.5);
        a.play(5.0, &p);
        assert_eq!(a.reveal(), 0.0);
        // Measured from the second start, not the first.
        assert_eq!(a.tick(6.0), None);
        assert!((a.reveal() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hover_snap_interrupts_play() {
        let p = path();
        let mut a = TrajectoryAnimator::default();
        a.play(0.0, &p);
        a.tick(0.4);
        assert!(a.follow_hover(Some(1), &p));
        assert!(!a.is_playing());
        assert_eq!(a.reveal(), 0.5);
        assert_eq!(a.marker(), Some(1));

        // Would-be next ticks make no further progress.
        assert_eq!(a.tick(0.8), None);
        assert_eq!(a.tick(5.0), None);
        assert_eq!(a.reveal(), 0.5);
    }

    #[test]
    fn hover_off_path_only_clears_marker() {
        let p = path();
        let mut a = TrajectoryAnimator::default();
        a.follow_hover(Some(3), &p);
        assert_eq!(a.reveal(), 1.0);
        assert!(!a.follow_hover(Some(3), &p));
        // Sentence 2 has no coordinates.
        assert!(a.follow_hover(Some(2), &p));
        assert_eq!(a.marker(), None);
        assert_eq!(a.reveal(), 1.0);
        assert!(!a.follow_hover(None, &p));
    }

    #[test]
    fn short_path_completes_immediately() {
        let single = Trajectory::from_screen([(0, Vec2::ZERO)]);
        let mut a = TrajectoryAnimator::default();
        assert_eq!(a.play(0.0, &single), Some(TrajectoryEvent::Completed));
        assert!(!a.is_playing());
        assert!(!a.follow_hover(Some(0), &single));
        assert_eq!(a.marker(), None);
    }

    #[test]
    fn invalid_duration_falls_back() {
        assert_eq!(TrajectoryAnimator::new(0.0).duration(), PLAY_DURATION);
        assert_eq!(TrajectoryAnimator::new(f32::NAN).duration(), PLAY_DURATION);
        assert_eq!(TrajectoryAnimator::new(3.5).duration(), 3.5);
    }
}
