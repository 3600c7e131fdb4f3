#![warn(missing_docs)]
//! Traced ray paths
//!
//! The result of tracing a single [`Ray`](crate::ray::Ray) is a [`TracedPath`]: an ordered polyline of
//! [`Segment`]s together with the way the ray ended.
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::f64::Length;

/// The reason a [`Segment`] ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum TerminationKind {
    /// the segment ends at a refracting (or reflecting) interface and the path continues
    #[default]
    None,
    /// blocked by an iris stop, a lens mount ring or a lens built-in aperture
    Aperture,
    /// blocked by the opaque housing or a lens barrel
    Body,
    /// captured by a sensor
    Sensor,
    /// no further obstacle: the segment extends to the "infinity" radius
    Escape,
}
impl TerminationKind {
    /// Returns `true` if the ray was stopped by an obstacle (aperture or housing).
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Aperture | Self::Body)
    }
}

/// One straight piece of a traced path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// start point
    pub from: Point2<f64>,
    /// end point
    pub to: Point2<f64>,
    /// reason why this segment ends here
    pub termination: TerminationKind,
}
impl Segment {
    /// Creates a new [`Segment`].
    #[must_use]
    pub const fn new(from: Point2<f64>, to: Point2<f64>, termination: TerminationKind) -> Self {
        Self {
            from,
            to,
            termination,
        }
    }
    /// Geometric length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.to - self.from).norm()
    }
    /// Returns this segment mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self::new(
            Point2::new(-self.from.x, self.from.y),
            Point2::new(-self.to.x, self.to.y),
            self.termination,
        )
    }
}

/// The polyline of one traced ray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracedPath {
    source_index: usize,
    wavelength: Length,
    segments: Vec<Segment>,
    refractions: usize,
    internal_reflections: usize,
    truncated: bool,
}
impl TracedPath {
    /// Creates an empty [`TracedPath`] for a ray of the given source and wavelength.
    #[must_use]
    pub fn new(source_index: usize, wavelength: Length) -> Self {
        Self {
            source_index,
            wavelength,
            segments: Vec::with_capacity(16),
            refractions: 0,
            internal_reflections: 0,
            truncated: false,
        }
    }
    /// Index of the light source which emitted the ray.
    #[must_use]
    pub const fn source_index(&self) -> usize {
        self.source_index
    }
    /// Wavelength of the ray.
    #[must_use]
    pub const fn wavelength(&self) -> Length {
        self.wavelength
    }
    /// Ordered list of segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
    /// Number of refractions (surface or thin lens crossings) along the path.
    #[must_use]
    pub const fn refractions(&self) -> usize {
        self.refractions
    }
    /// Number of total internal reflections along the path.
    #[must_use]
    pub const fn internal_reflections(&self) -> usize {
        self.internal_reflections
    }
    /// `true` if tracing stopped at the bounce limit before the ray terminated.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }
    /// The way this path ended. An empty path counts as [`TerminationKind::Escape`].
    #[must_use]
    pub fn termination(&self) -> TerminationKind {
        self.segments
            .last()
            .map_or(TerminationKind::Escape, |s| s.termination)
    }
    /// End point of the last segment.
    #[must_use]
    pub fn end_point(&self) -> Option<Point2<f64>> {
        self.segments.last().map(|s| s.to)
    }
    /// Axial positions of all interface crossings along the path.
    #[must_use]
    pub fn interface_points(&self) -> Vec<Point2<f64>> {
        self.segments
            .iter()
            .filter(|s| s.termination == TerminationKind::None)
            .map(|s| s.to)
            .collect()
    }
    /// Returns this path mirrored at the plane `x = 0`.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let mut path = self.clone();
        path.segments = self.segments.iter().map(Segment::mirrored).collect();
        path
    }
    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
    pub(crate) fn count_refraction(&mut self) {
        self.refractions += 1;
    }
    pub(crate) fn count_internal_reflection(&mut self) {
        self.internal_reflections += 1;
    }
    pub(crate) fn set_truncated(&mut self) {
        self.truncated = true;
    }
}
