use bevy::math::Vec2;
use tracelens_core::Case;

use crate::canvas::scale::Scales;
use crate::canvas::transform::ZoomTransform;

/// One embedded sentence on the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Index into `Case::sentences`.
    pub sentence: usize,
    /// Container pixels, after scale and transform.
    pub screen: Vec2,
    /// Share of total arc length reached at this vertex.
    pub fraction: f32,
}

/// Screen-space polyline through a case's embedded sentences, in reasoning
/// order. Sentences without coordinates are skipped, not interpolated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    vertices: Vec<Vertex>,
    total: f32,
}

impl Trajectory {
    pub fn build(case: &Case, scales: &Scales, transform: &ZoomTransform) -> Self {
        Self::from_screen(
            case.embedded_sentences()
                .map(|(i, x, y)| (i, transform.apply(scales.project(x, y)))),
        )
    }

    pub fn from_screen<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec2)>,
    {
        let (sentences, screen): (Vec<usize>, Vec<Vec2>) = points
            .into_iter()
            .filter(|(_, p)| p.is_finite())
            .unzip();
        let total = path_length(&screen);
        let fractions = arc_length_fractions_with_total(&screen, total);
        let vertices = sentences
            .into_iter()
            .zip(screen)
            .zip(fractions)
            .map(|((sentence, screen), fraction)| Vertex {
                sentence,
                screen,
                fraction,
            })
            .collect();
        Self { vertices, total }
    }

    /// A single vertex has no path to draw.
    pub fn is_drawable(&self) -> bool {
        self.vertices.len() >= 2
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn total_length(&self) -> f32 {
        self.total
    }

    pub fn screen_points(&self) -> Vec<Vec2> {
        self.vertices.iter().map(|v| v.screen).collect()
    }

    pub fn vertex_of(&self, sentence: usize) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.sentence == sentence)
    }

    pub fn fraction_of(&self, sentence: usize) -> Option<f32> {
        self.vertex_of(sentence).map(|v| v.fraction)
    }

    /// Prefix of the polyline covering `reveal` of its length, ending
    /// mid-segment when the cut falls between vertices.
    pub fn clip(&self, reveal: f32) -> Vec<Vec2> {
        if !self.is_drawable() || !(reveal > 0.0) {
            return Vec::new();
        }
        if reveal >= 1.0 || self.total == 0.0 {
            return self.screen_points();
        }

        let target = reveal * self.total;
        let mut out = vec![self.vertices[0].screen];
        let mut walked = 0.0;
        for pair in self.vertices.windows(2) {
            let (a, b) = (pair[0].screen, pair[1].screen);
            let seg = a.distance(b);
            if walked + seg >= target {
                let t = if seg > 0.0 { (target - walked) / seg } else { 0.0 };
                out.push(a.lerp(b, t));
                return out;
            }
            walked += seg;
            out.push(b);
        }
        out
    }
}

/// Cumulative arc length at each vertex over the total length. All zero
/// when the points coincide.
pub fn arc_length_fractions(points: &[Vec2]) -> Vec<f32> {
    arc_length_fractions_with_total(points, path_length(points))
}

fn arc_length_fractions_with_total(points: &[Vec2], total: f32) -> Vec<f32> {
    let mut acc = 0.0;
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i > 0 {
                acc += points[i - 1].distance(*p);
            }
            if total > 0.0 {
                acc / total
            } else {
                0.0
            }
        })
        .collect()
}

fn path_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracelens_core::Sentence;

    fn sentence(x: Option<f32>, y: Option<f32>) -> Sentence {
        Sentence {
            text: "s".into(),
            taxonomy: 0,
            cluster: None,
            ordinal: 1,
            x,
            y,
        }
    }

    fn case(coords: &[Option<(f32, f32)>]) -> Case {
        Case {
            id: "c0".into(),
            qid: None,
            prompt: String::new(),
            true_dx: "flu".into(),
            pred_dx: "flu".into(),
            correct: true,
            sentences: coords
                .iter()
                .map(|c| sentence(c.map(|c| c.0), c.map(|c| c.1)))
                .collect(),
        }
    }

    fn assert_fractions(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn collinear_equal_spacing_gives_halves() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0), Vec2::new(6.0, 8.0)];
        assert_fractions(&arc_length_fractions(&pts), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn coincident_points_are_all_zero() {
        let pts = [Vec2::splat(2.0); 4];
        assert_fractions(&arc_length_fractions(&pts), &[0.0; 4]);
        let t = Trajectory::from_screen(pts.iter().copied().enumerate());
        assert!(t.is_drawable());
        assert_eq!(t.total_length(), 0.0);
        assert_eq!(t.clip(0.5).len(), 4);
    }

    #[test]
    fn single_case_scenario_under_identity() {
        let c = case(&[Some((0.0, 0.0)), Some((3.0, 4.0)), Some((6.0, 8.0))]);
        let t = Trajectory::build(&c, &Scales::IDENTITY, &ZoomTransform::IDENTITY);
        let fractions: Vec<f32> = t.vertices().iter().map(|v| v.fraction).collect();
        assert_fractions(&fractions, &[0.0, 0.5, 1.0]);
        assert!((t.total_length() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn sentences_without_coordinates_are_skipped() {
        let c = case(&[Some((0.0, 0.0)), None, Some((0.0, 10.0)), None]);
        let t = Trajectory::build(&c, &Scales::IDENTITY, &ZoomTransform::IDENTITY);
        let sentences: Vec<usize> = t.vertices().iter().map(|v| v.sentence).collect();
        assert_eq!(sentences, vec![0, 2]);
        assert_eq!(t.fraction_of(2), Some(1.0));
        assert_eq!(t.fraction_of(1), None);
    }

    #[test]
    fn fewer_than_two_vertices_is_not_drawable() {
        let c = case(&[None, Some((1.0, 1.0)), None]);
        let t = Trajectory::build(&c, &Scales::IDENTITY, &ZoomTransform::IDENTITY);
        assert!(!t.is_drawable());
        assert!(t.clip(1.0).is_empty());
        assert!(!Trajectory::default().is_drawable());
    }

    #[test]
    fn clip_cuts_inside_a_segment() {
        let t = Trajectory::from_screen([
            (0, Vec2::new(0.0, 0.0)),
            (1, Vec2::new(10.0, 0.0)),
            (2, Vec2::new(10.0, 10.0)),
        ]);
        let half = t.clip(0.25);
        assert_eq!(half, vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)]);
        let most = t.clip(0.75);
        assert_eq!(
            most,
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 5.0)]
        );
        assert!(t.clip(0.0).is_empty());
        assert_eq!(t.clip(1.0).len(), 3);
    }

    #[test]
    fn transform_moves_the_path_but_not_its_fractions() {
        let c = case(&[Some((0.0, 0.0)), Some((1.0, 0.0)), Some((3.0, 0.0))]);
        let plain = Trajectory::build(&c, &Scales::IDENTITY, &ZoomTransform::IDENTITY);
        let zoomed = Trajectory::build(
            &c,
            &Scales::IDENTITY,
            &ZoomTransform::new(Vec2::new(40.0, 8.0), 4.0),
        );
        assert_eq!(zoomed.vertices()[1].screen, Vec2::new(44.0, 8.0));
        for (a, b) in plain.vertices().iter().zip(zoomed.vertices()) {
            assert!((a.fraction - b.fraction).abs() < 1e-6);
        }
    }
}
