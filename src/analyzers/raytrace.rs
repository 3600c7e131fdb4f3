//! Analyzer for ray tracing
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{OptResult, OpticalError},
    light::{emit_all, LightSource},
    optic_system::OpticalSystem,
    ray::Ray,
    ray_path::{Segment, TerminationKind, TracedPath},
    refractive_index::d_line,
    surface::reflect_direction,
};

use super::{
    collision::{CollisionKind, CollisionScene},
    Analyzer, AnalyzerType,
};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TraceConfigData")]
/// Configuration data for ray tracing and all analyses based on it.
///
/// The config contains the following info
///   - maximum number of bounces (interface crossings) / ray
///   - "infinity" radius: length of the last segment of an escaping ray and outer radius of free-standing apertures
///     if there is no housing
///   - ideal lens mode (lenses are replaced by thin lenses at their centroids)
///   - wavelength for the paraxial analysis
///   - tolerance and maximum number of iterations of the pupil search
pub struct TraceConfig {
    max_bounces: usize,
    infinity_radius: f64,
    ideal_lens: bool,
    paraxial_wavelength: Length,
    pupil_tolerance: f64,
    max_pupil_iterations: usize,
}
impl Default for TraceConfig {
    /// Create a default config with the following parameters:
    ///   - maximum number of bounces / ray: `100`
    ///   - infinity radius: `10000 mm`
    ///   - ideal lens mode: `false`
    ///   - paraxial wavelength: Fraunhofer d line (`587.5618 nm`)
    ///   - pupil tolerance: `1e-8 mm`
    ///   - maximum number of pupil iterations: `200`
    fn default() -> Self {
        Self {
            max_bounces: 100,
            infinity_radius: 10_000.0,
            ideal_lens: false,
            paraxial_wavelength: d_line(),
            pupil_tolerance: 1e-8,
            max_pupil_iterations: 200,
        }
    }
}
#[derive(Deserialize)]
#[serde(default)]
struct TraceConfigData {
    max_bounces: usize,
    infinity_radius: f64,
    ideal_lens: bool,
    paraxial_wavelength: Length,
    pupil_tolerance: f64,
    max_pupil_iterations: usize,
}
impl Default for TraceConfigData {
    fn default() -> Self {
        let config = TraceConfig::default();
        Self {
            max_bounces: config.max_bounces,
            infinity_radius: config.infinity_radius,
            ideal_lens: config.ideal_lens,
            paraxial_wavelength: config.paraxial_wavelength,
            pupil_tolerance: config.pupil_tolerance,
            max_pupil_iterations: config.max_pupil_iterations,
        }
    }
}
impl TryFrom<TraceConfigData> for TraceConfig {
    type Error = OpticalError;
    fn try_from(data: TraceConfigData) -> OptResult<Self> {
        let mut config = Self::default();
        config.set_max_bounces(data.max_bounces)?;
        config.set_infinity_radius(data.infinity_radius)?;
        config.set_ideal_lens(data.ideal_lens);
        config.set_paraxial_wavelength(data.paraxial_wavelength)?;
        config.set_pupil_tolerance(data.pupil_tolerance)?;
        config.set_max_pupil_iterations(data.max_pupil_iterations)?;
        Ok(config)
    }
}
impl TraceConfig {
    /// Read a config from a YAML document. Missing fields are set to their default values.
    ///
    /// The paraxial wavelength is given in meters.
    ///
    /// # Errors
    ///
    /// This function will return an error if the document cannot be parsed or contains invalid values.
    pub fn from_yaml(yaml: &str) -> OptResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| OpticalError::Config(format!("parsing of config failed: {e}")))
    }
    /// Returns the maximum number of bounces of this [`TraceConfig`].
    #[must_use]
    pub const fn max_bounces(&self) -> usize {
        self.max_bounces
    }
    /// Sets the max number of bounces of this [`TraceConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the given number is zero.
    pub fn set_max_bounces(&mut self, max_bounces: usize) -> OptResult<()> {
        if max_bounces == 0 {
            return Err(OpticalError::Config("max number of bounces must be >0".into()));
        }
        self.max_bounces = max_bounces;
        Ok(())
    }
    /// Returns the "infinity" radius of this [`TraceConfig`].
    #[must_use]
    pub const fn infinity_radius(&self) -> f64 {
        self.infinity_radius
    }
    /// Sets the "infinity" radius of this [`TraceConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the given radius is not positive and finite.
    pub fn set_infinity_radius(&mut self, infinity_radius: f64) -> OptResult<()> {
        if infinity_radius <= 0.0 || !infinity_radius.is_finite() {
            return Err(OpticalError::Config(
                "infinity radius must be >0.0 and finite".into(),
            ));
        }
        self.infinity_radius = infinity_radius;
        Ok(())
    }
    /// Returns `true` if lenses are treated as ideal thin lenses.
    #[must_use]
    pub const fn ideal_lens(&self) -> bool {
        self.ideal_lens
    }
    /// Switch the ideal (thin) lens mode on or off.
    pub fn set_ideal_lens(&mut self, ideal_lens: bool) {
        self.ideal_lens = ideal_lens;
    }
    /// Returns the wavelength used for the paraxial analysis and the pupil search.
    #[must_use]
    pub const fn paraxial_wavelength(&self) -> Length {
        self.paraxial_wavelength
    }
    /// Sets the wavelength used for the paraxial analysis and the pupil search.
    ///
    /// # Errors
    ///
    /// This function will return an error if the given wavelength is not positive and finite.
    pub fn set_paraxial_wavelength(&mut self, paraxial_wavelength: Length) -> OptResult<()> {
        if paraxial_wavelength.value <= 0.0 || !paraxial_wavelength.is_finite() {
            return Err(OpticalError::Config(
                "paraxial wavelength must be >0.0 and finite".into(),
            ));
        }
        self.paraxial_wavelength = paraxial_wavelength;
        Ok(())
    }
    /// Returns the tolerance of the pupil search.
    #[must_use]
    pub const fn pupil_tolerance(&self) -> f64 {
        self.pupil_tolerance
    }
    /// Sets the tolerance of the pupil search.
    ///
    /// # Errors
    ///
    /// This function will return an error if the given tolerance is not positive and finite.
    pub fn set_pupil_tolerance(&mut self, pupil_tolerance: f64) -> OptResult<()> {
        if pupil_tolerance <= 0.0 || !pupil_tolerance.is_finite() {
            return Err(OpticalError::Config(
                "pupil tolerance must be >0.0 and finite".into(),
            ));
        }
        self.pupil_tolerance = pupil_tolerance;
        Ok(())
    }
    /// Returns the maximum number of iterations of the pupil search.
    #[must_use]
    pub const fn max_pupil_iterations(&self) -> usize {
        self.max_pupil_iterations
    }
    /// Sets the maximum number of iterations of the pupil search.
    ///
    /// # Errors
    ///
    /// This function will return an error if the given number is zero.
    pub fn set_max_pupil_iterations(&mut self, max_pupil_iterations: usize) -> OptResult<()> {
        if max_pupil_iterations == 0 {
            return Err(OpticalError::Config(
                "max number of pupil iterations must be >0".into(),
            ));
        }
        self.max_pupil_iterations = max_pupil_iterations;
        Ok(())
    }
}

/// Trace a single [`Ray`] through the prepared scene.
pub(crate) fn trace_in_scene(scene: &CollisionScene, ray: Ray, config: &TraceConfig) -> TracedPath {
    let mut path = TracedPath::new(ray.source_index(), ray.wavelength());
    let mut ray = ray;
    for _ in 0..config.max_bounces() {
        let Some(collision) = scene.nearest(&ray) else {
            path.push(Segment::new(
                ray.origin(),
                ray.point_at(config.infinity_radius()),
                TerminationKind::Escape,
            ));
            return path;
        };
        let hit = collision.hit.point;
        let termination = match collision.kind {
            CollisionKind::Aperture => TerminationKind::Aperture,
            CollisionKind::Body => TerminationKind::Body,
            CollisionKind::Sensor => TerminationKind::Sensor,
            CollisionKind::Refraction { .. } | CollisionKind::ThinLens { .. } => {
                TerminationKind::None
            }
        };
        path.push(Segment::new(ray.origin(), hit, termination));
        if termination != TerminationKind::None {
            return path;
        }
        let arrived = ray.continued(hit, ray.direction());
        ray = match collision.kind {
            CollisionKind::Refraction { surface, normal } => {
                if let Ok(direction) = surface.refract(&arrived, &normal) {
                    path.count_refraction();
                    arrived.continued(hit, direction)
                } else {
                    // total internal reflection
                    path.count_internal_reflection();
                    arrived.continued(hit, reflect_direction(&arrived.direction(), &normal))
                }
            }
            CollisionKind::ThinLens { focal_length } => {
                path.count_refraction();
                match focal_length.map(|f| arrived.refract_paraxial(f)) {
                    Some(Ok(refracted)) => refracted,
                    Some(Err(e)) => {
                        debug!("thin lens passed without deflection: {e}");
                        arrived
                    }
                    None => arrived,
                }
            }
            _ => arrived,
        };
    }
    warn!(
        "ray of light source {} truncated after {} bounces",
        ray.source_index(),
        config.max_bounces()
    );
    path.set_truncated();
    path.push(Segment::new(
        ray.origin(),
        ray.point_at(config.infinity_radius()),
        TerminationKind::Escape,
    ));
    path
}

/// Trace a single [`Ray`] through an [`OpticalSystem`].
#[must_use]
pub fn trace_ray(system: &OpticalSystem, ray: Ray, config: &TraceConfig) -> TracedPath {
    let scene = CollisionScene::new(system, config);
    trace_in_scene(&scene, ray, config)
}
/// Trace a bundle of [`Ray`]s through an [`OpticalSystem`]. Returns one path per ray in the given order.
#[must_use]
pub fn trace_rays(system: &OpticalSystem, rays: &[Ray], config: &TraceConfig) -> Vec<TracedPath> {
    let scene = CollisionScene::new(system, config);
    rays.iter()
        .map(|ray| trace_in_scene(&scene, *ray, config))
        .collect()
}
/// Emit `nr_of_rays` rays per wavelength from each light source and trace them through an [`OpticalSystem`].
///
/// # Errors
///
/// This function will return an error if the rays of a light source cannot be created.
pub fn trace_lights(
    system: &OpticalSystem,
    sources: &[LightSource],
    nr_of_rays: usize,
    config: &TraceConfig,
) -> OptResult<Vec<TracedPath>> {
    let rays = emit_all(sources, nr_of_rays)?;
    Ok(trace_rays(system, &rays, config))
}

/// Analyzer for ray tracing
#[derive(Debug)]
pub struct RayTracingAnalyzer {
    config: TraceConfig,
    sources: Vec<LightSource>,
    nr_of_rays: usize,
}
impl RayTracingAnalyzer {
    /// Creates a new [`RayTracingAnalyzer`] emitting `nr_of_rays` rays per wavelength from each source.
    #[must_use]
    pub const fn new(config: TraceConfig, sources: Vec<LightSource>, nr_of_rays: usize) -> Self {
        Self {
            config,
            sources,
            nr_of_rays,
        }
    }
}
impl Analyzer for RayTracingAnalyzer {
    type Output = Vec<TracedPath>;
    fn analyzer_type(&self) -> AnalyzerType {
        AnalyzerType::RayTrace(self.config.clone())
    }
    fn analyze(&self, system: &OpticalSystem) -> OptResult<Vec<TracedPath>> {
        info!(
            "Performing ray tracing analysis of {} light sources through {} lenses.",
            self.sources.len(),
            system.lenses().len()
        );
        let paths = trace_lights(system, &self.sources, self.nr_of_rays, &self.config)?;
        let truncated = paths.iter().filter(|p| p.truncated()).count();
        if truncated > 0 {
            warn!("{truncated} of {} rays were truncated", paths.len());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        aperture::Aperture,
        geometry::cross_angle,
        lens::Lens,
        nanometer,
        refractive_index::CauchyParams,
        sensor::Sensor,
        surface::Surface,
    };
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector2};

    fn ray(x: f64, y: f64) -> Ray {
        Ray::new_collimated(Point2::new(x, y), nanometer!(587.5618), 0).unwrap()
    }
    fn biconvex() -> Lens {
        Lens::symmetric_biconvex(0.0, 50.0, 10.0, 1.5).unwrap()
    }
    #[test]
    fn config_default() {
        let c = TraceConfig::default();
        assert_eq!(c.max_bounces(), 100);
        assert_eq!(c.infinity_radius(), 10_000.0);
        assert!(!c.ideal_lens());
        assert_eq!(c.paraxial_wavelength(), nanometer!(587.5618));
        assert_eq!(c.pupil_tolerance(), 1e-8);
        assert_eq!(c.max_pupil_iterations(), 200);
    }
    #[test]
    fn config_setters() {
        let mut c = TraceConfig::default();
        assert!(c.set_max_bounces(0).is_err());
        assert!(c.set_infinity_radius(0.0).is_err());
        assert!(c.set_infinity_radius(f64::INFINITY).is_err());
        assert!(c.set_paraxial_wavelength(nanometer!(-1.0)).is_err());
        assert!(c.set_paraxial_wavelength(nanometer!(f64::NAN)).is_err());
        assert!(c.set_pupil_tolerance(0.0).is_err());
        assert!(c.set_max_pupil_iterations(0).is_err());
        c.set_max_bounces(5).unwrap();
        c.set_infinity_radius(100.0).unwrap();
        c.set_ideal_lens(true);
        c.set_paraxial_wavelength(nanometer!(1053.0)).unwrap();
        c.set_pupil_tolerance(1e-6).unwrap();
        c.set_max_pupil_iterations(10).unwrap();
        assert_eq!(c.max_bounces(), 5);
        assert_eq!(c.infinity_radius(), 100.0);
        assert!(c.ideal_lens());
        assert_eq!(c.paraxial_wavelength(), nanometer!(1053.0));
        assert_eq!(c.pupil_tolerance(), 1e-6);
        assert_eq!(c.max_pupil_iterations(), 10);
    }
    #[test]
    fn config_from_yaml() {
        let c = TraceConfig::from_yaml("max_bounces: 20\nideal_lens: true\n").unwrap();
        assert_eq!(c.max_bounces(), 20);
        assert!(c.ideal_lens());
        assert_eq!(c.infinity_radius(), 10_000.0);
        let c = TraceConfig::from_yaml("{}").unwrap();
        assert_eq!(c, TraceConfig::default());
        assert!(matches!(
            TraceConfig::from_yaml("max_bounces: 0"),
            Err(OpticalError::Config(_))
        ));
        assert!(matches!(
            TraceConfig::from_yaml("max_bounces: [1, 2"),
            Err(OpticalError::Config(_))
        ));
        assert!(serde_yaml::from_str::<TraceConfig>("infinity_radius: -1.0").is_err());
        assert!(serde_yaml::from_str::<TraceConfig>("pupil_tolerance: .nan").is_err());
        let c = serde_yaml::from_str::<TraceConfig>("max_pupil_iterations: 7").unwrap();
        assert_eq!(c.max_pupil_iterations(), 7);
    }
    #[test]
    fn escape() {
        let system = OpticalSystem::default();
        let path = trace_ray(&system, ray(0.0, 1.0), &TraceConfig::default());
        assert_eq!(path.segments().len(), 1);
        assert_eq!(path.termination(), TerminationKind::Escape);
        assert_eq!(path.end_point(), Some(Point2::new(10_000.0, 1.0)));
    }
    #[test]
    fn focusing() {
        let lens = biconvex();
        let f = crate::analyzers::system_power(&[lens.clone()], &TraceConfig::default()).unwrap();
        let system = OpticalSystem::new(
            vec![lens],
            vec![],
            vec![Sensor::perpendicular(f.focal_point(), 5.0).unwrap()],
        );
        let path = trace_ray(&system, ray(-10.0, 0.1), &TraceConfig::default());
        assert_eq!(path.refractions(), 2);
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.termination(), TerminationKind::Sensor);
        // paraxial ray hits the focal point
        assert_relative_eq!(path.end_point().unwrap().y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.end_point().unwrap().x, f.focal_point(), epsilon = 1e-9);
    }
    #[test]
    fn snell_along_path() {
        let lens = biconvex();
        let surface = lens.surfaces()[0];
        let system = OpticalSystem::new(vec![lens], vec![], vec![]);
        let path = trace_ray(&system, ray(-10.0, 6.0), &TraceConfig::default());
        let s = path.segments();
        let hit = s[0].to;
        let normal = hit - Point2::new(surface.x() + surface.r(), 0.0);
        let theta_in = cross_angle(&normal, &(s[0].to - s[0].from));
        let theta_out = cross_angle(&normal, &(s[1].to - s[1].from));
        assert_relative_eq!(theta_in.sin(), 1.5 * theta_out.sin(), epsilon = 1e-9);
    }
    #[test]
    fn index_matched_pass_through() {
        let medium = CauchyParams::constant(1.5);
        let lens = Lens::new(
            vec![Surface::new(0.0, 20.0, 10.0, medium, medium).unwrap()],
            1.0,
        )
        .unwrap();
        let system = OpticalSystem::new(vec![lens], vec![], vec![]);
        let r = Ray::new(Point2::new(-10.0, 3.0), Vector2::new(1.0, 0.1), nanometer!(500.0), 0)
            .unwrap();
        let path = trace_ray(&system, r, &TraceConfig::default());
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.refractions(), 1);
        let s = path.segments();
        let d0 = (s[0].to - s[0].from).normalize();
        let d1 = (s[1].to - s[1].from).normalize();
        assert_relative_eq!(d0, d1, epsilon = 1e-12);
        assert!(s[1].from.x > -10.0);
    }
    #[test]
    fn aperture_blocking() {
        let system = OpticalSystem::new(
            vec![biconvex()],
            vec![Aperture::new(20.0, 2.0).unwrap()],
            vec![],
        );
        let path = trace_ray(&system, ray(-10.0, 8.0), &TraceConfig::default());
        assert_eq!(path.termination(), TerminationKind::Aperture);
        assert_relative_eq!(path.end_point().unwrap().x, 20.0, epsilon = 1e-12);
        assert!(path.end_point().unwrap().y.abs() > 2.0);
        // a ray close to the axis passes
        let path = trace_ray(&system, ray(-10.0, 0.5), &TraceConfig::default());
        assert_eq!(path.termination(), TerminationKind::Escape);
        assert_eq!(path.refractions(), 2);
    }
    #[test]
    fn round_trip() {
        let lens = Lens::symmetric_biconvex(0.0, 40.0, 10.0, 1.5).unwrap();
        let system = OpticalSystem::new(vec![lens], vec![], vec![]);
        let config = TraceConfig::default();
        let forward = trace_ray(&system, ray(-20.0, 4.0), &config);
        assert_eq!(forward.refractions(), 2);
        let last = forward.segments()[2];
        // start on the exit ray behind the lens and propagate backwards
        let start = last.from + 10.0 * (last.to - last.from).normalize();
        let backward_ray =
            Ray::new(start, last.from - last.to, nanometer!(587.5618), 0).unwrap();
        let backward = trace_ray(&system, backward_ray, &config);
        assert_eq!(backward.segments().len(), forward.segments().len());
        assert_eq!(backward.refractions(), 2);
        let fwd = forward.interface_points();
        let bwd = backward.interface_points();
        assert_relative_eq!(fwd[0], bwd[1], epsilon = 1e-9);
        assert_relative_eq!(fwd[1], bwd[0], epsilon = 1e-9);
        // leaves parallel to the axis at the initial height
        let exit = backward.segments()[2];
        let dir = (exit.to - exit.from).normalize();
        assert_relative_eq!(dir, Vector2::new(-1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(exit.from.y, 4.0, epsilon = 1e-9);
    }
    #[test]
    fn total_internal_reflection() {
        // a ray inside a glass block hitting the flat back side under a steep angle
        let glass = CauchyParams::constant(1.5);
        let air = CauchyParams::vacuum();
        let lens = Lens::new(
            vec![
                Surface::flat(0.0, 10.0, air, glass).unwrap(),
                Surface::flat(10.0, 10.0, glass, air).unwrap(),
            ],
            1.0,
        )
        .unwrap();
        let system = OpticalSystem::new(vec![lens], vec![], vec![]);
        let r = Ray::new(Point2::new(5.0, 0.0), Vector2::new(1.0, 1.5), nanometer!(500.0), 0)
            .unwrap();
        let path = trace_ray(&system, r, &TraceConfig::default());
        assert!(path.internal_reflections() >= 1);
        assert!(path
            .segments()
            .iter()
            .all(|s| s.to.x.is_finite() && s.to.y.is_finite()));
    }
    #[test]
    fn ideal_lens() {
        let lens = biconvex();
        let centroid = lens.centroid();
        let system = OpticalSystem::new(
            vec![lens],
            vec![],
            vec![Sensor::perpendicular(centroid + 50.0, 5.0).unwrap()],
        );
        let mut config = TraceConfig::default();
        config.set_ideal_lens(true);
        let path = trace_ray(&system, ray(-10.0, 3.0), &config);
        assert_eq!(path.refractions(), 1);
        assert_eq!(path.segments().len(), 2);
        assert_relative_eq!(path.segments()[0].to.x, centroid, epsilon = 1e-12);
        assert_eq!(path.termination(), TerminationKind::Sensor);
        assert_relative_eq!(path.end_point().unwrap().y, 0.0, epsilon = 1e-9);
    }
    #[test]
    fn ideal_plate_without_power() {
        let glass = CauchyParams::constant(1.5);
        let air = CauchyParams::vacuum();
        let plate = Lens::new(
            vec![
                Surface::flat(0.0, 10.0, air, glass).unwrap(),
                Surface::flat(4.0, 10.0, glass, air).unwrap(),
            ],
            1.0,
        )
        .unwrap();
        let system = OpticalSystem::new(vec![plate], vec![], vec![]);
        let mut config = TraceConfig::default();
        config.set_ideal_lens(true);
        let path = trace_ray(&system, ray(-10.0, 3.0), &config);
        // the crossing counts, the direction stays untouched
        assert_eq!(path.refractions(), 1);
        assert_eq!(path.segments().len(), 2);
        assert_relative_eq!(path.segments()[0].to.x, 2.0, epsilon = 1e-9);
        assert_eq!(path.termination(), TerminationKind::Escape);
        assert_eq!(path.end_point().unwrap().y, 3.0);
    }
    #[test]
    fn truncation() {
        testing_logger::setup();
        let mut config = TraceConfig::default();
        config.set_max_bounces(1).unwrap();
        let system = OpticalSystem::new(vec![biconvex()], vec![], vec![]);
        let path = trace_ray(&system, ray(-10.0, 1.0), &config);
        assert!(path.truncated());
        assert_eq!(path.termination(), TerminationKind::Escape);
        assert_eq!(path.segments().len(), 2);
        testing_logger::validate(|captured_logs| {
            assert_eq!(captured_logs.len(), 1);
            assert_eq!(
                captured_logs[0].body,
                "ray of light source 0 truncated after 1 bounces"
            );
            assert_eq!(captured_logs[0].level, log::Level::Warn);
        });
    }
    #[test]
    fn trace_bundles() {
        let system = OpticalSystem::new(vec![biconvex()], vec![], vec![]);
        let config = TraceConfig::default();
        let paths = trace_rays(&system, &[ray(-10.0, 1.0), ray(-10.0, -1.0)], &config);
        assert_eq!(paths.len(), 2);
        let sources = vec![LightSource::Parallel {
            start: Point2::new(-10.0, -5.0),
            end: Point2::new(-10.0, 5.0),
            wavelengths: nanometer!(486.1327, 656.2725),
        }];
        let paths = trace_lights(&system, &sources, 5, &config).unwrap();
        assert_eq!(paths.len(), 10);
        assert!(paths.iter().all(|p| p.refractions() == 2));
        let analyzer = RayTracingAnalyzer::new(config, sources, 3);
        assert_eq!(format!("{}", analyzer.analyzer_type()), "ray tracing");
        assert_eq!(analyzer.analyze(&system).unwrap().len(), 6);
    }
}
