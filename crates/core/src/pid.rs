//! Particle identification driver
//!
//! The fuzzy-logic classifier itself is an external engine behind the
//! [`Classifier`] trait. [`ParticleId`] does the plumbing around it for one
//! polar scan:
//!
//! 1. check the required moments are present
//! 2. estimate SNRH from DBZH if the scan lacks it
//! 3. interpolate the temperature profile onto every ray's bin heights and
//!    attach it to the scan as [`TEMPC_ATTRIBUTE`]
//! 4. hand each ray's moments to the classifier
//! 5. store the result as a `CLASS` parameter and drop the estimated SNRH

use crate::config::PidConfig;
use crate::error::{ClassifyError, PidError};
use crate::profile::TemperatureProfile;
use crate::scan::{PolarScan, ScanParameter};
use crate::snr::{estimate_snr, SNR_QUANTITY};
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Scan attribute holding interpolated temperatures, row-major `nrays × nbins`
pub const TEMPC_ATTRIBUTE: &str = "how/tempc";

/// Quantity name of the classification output
pub const CLASS_QUANTITY: &str = "CLASS";

/// Raw CLASS value for bins that were not classified
pub const CLASS_NODATA: f64 = 255.0;

/// Raw CLASS value for bins without echo
pub const CLASS_UNDETECT: f64 = 0.0;

/// Moments the classifier cannot run without
pub const REQUIRED_MOMENTS: [&str; 3] = ["DBZH", "ZDR", "RHOHV"];

/// Moments replaced by a ray of missing values when absent
pub const OPTIONAL_MOMENTS: [&str; 3] = ["KDP", "LDR", "PHIDP"];

/// Converted moments for one ray, as handed to the classifier.
///
/// Every slice has one value per bin; bins without data hold `missing`.
#[derive(Debug, Clone, Copy)]
pub struct RayMoments<'a> {
    /// Ray index within the scan
    pub ray: usize,
    /// Signal-to-noise ratio (dB)
    pub snr: &'a [f64],
    /// Horizontal reflectivity (dBZ)
    pub dbz: &'a [f64],
    /// Differential reflectivity (dB)
    pub zdr: &'a [f64],
    /// Specific differential phase (°/km)
    pub kdp: &'a [f64],
    /// Linear depolarization ratio (dB)
    pub ldr: &'a [f64],
    /// Co-polar correlation coefficient
    pub rhohv: &'a [f64],
    /// Differential phase (°)
    pub phidp: &'a [f64],
    /// Temperature at each bin (°C)
    pub tempc: &'a [f64],
    /// Missing-value marker
    pub missing: f64,
    /// Minimum fuzzy interest for a class to be accepted
    pub min_valid_interest: f64,
}

impl RayMoments<'_> {
    /// Number of bins
    pub fn nbins(&self) -> usize {
        self.dbz.len()
    }
}

/// External particle classification engine
pub trait Classifier {
    /// Load classification thresholds. Called once per session.
    ///
    /// # Errors
    /// [`ClassifyError::Thresholds`] if the file cannot be used.
    fn read_thresholds(&mut self, path: &Path) -> Result<(), ClassifyError>;

    /// Classify one ray, returning one class code per bin.
    ///
    /// # Errors
    /// [`ClassifyError::Ray`] if the engine fails on this ray.
    fn classify_ray(&self, moments: &RayMoments<'_>) -> Result<Vec<u8>, ClassifyError>;
}

/// Outcome of classifying one scan
#[derive(Debug, Clone, Default)]
pub struct ClassifySummary {
    /// Rays classified
    pub rays: usize,
    /// Bins per ray
    pub bins: usize,
    /// Whether SNRH was estimated from DBZH
    pub snr_estimated: bool,
    /// Bin count per class code
    pub class_counts: FxHashMap<u8, usize>,
}

/// Interpolate `profile` onto every ray of `scan` and attach it as [`TEMPC_ATTRIBUTE`].
///
/// Returns the per-ray temperatures. The scan is left untouched on error.
///
/// # Errors
/// See [`ray_temperatures`].
pub fn attach_temperature<S: PolarScan + ?Sized>(
    scan: &mut S,
    profile: &TemperatureProfile,
) -> Result<Vec<Vec<f64>>, PidError> {
    let tempc = ray_temperatures(&*scan, profile)?;
    scan.set_attribute(TEMPC_ATTRIBUTE, tempc.concat());
    Ok(tempc)
}

/// Temperature at every bin of `scan`, one row per ray.
///
/// # Errors
/// [`PidError::EmptyScan`] for a scan without rays or bins,
/// [`PidError::ShapeMismatch`] if the scan reports the wrong number of heights for a ray.
pub fn ray_temperatures<S: PolarScan + ?Sized>(
    scan: &S,
    profile: &TemperatureProfile,
) -> Result<Vec<Vec<f64>>, PidError> {
    let nrays = scan.nrays();
    let nbins = scan.nbins();
    if nrays == 0 || nbins == 0 {
        return Err(PidError::EmptyScan);
    }

    let heights: Vec<Vec<f64>> = (0..nrays).map(|ray| scan.ray_heights(ray)).collect();
    if let Some((ray, h)) = heights.iter().enumerate().find(|(_, h)| h.len() != nbins) {
        return Err(PidError::ShapeMismatch {
            ray,
            expected: nbins,
            found: h.len(),
        });
    }

    Ok(profile.interpolate_rays(&heights)?)
}

/// Output of a fully classified scan, not yet written back
struct Classified {
    class: ScanParameter,
    tempc: Vec<Vec<f64>>,
    counts: FxHashMap<u8, usize>,
}

/// Classification session: a resolved configuration plus a loaded engine
pub struct ParticleId<'a, C: Classifier> {
    config: &'a PidConfig,
    classifier: C,
}

impl<'a, C: Classifier> ParticleId<'a, C> {
    /// Load the configured thresholds into `classifier`.
    ///
    /// # Errors
    /// Any [`ClassifyError`] from [`Classifier::read_thresholds`].
    pub fn new(config: &'a PidConfig, mut classifier: C) -> Result<Self, PidError> {
        classifier.read_thresholds(config.thresholds())?;
        debug!(
            "Loaded {} thresholds from {}",
            config.profile(),
            config.thresholds().display()
        );
        Ok(Self { config, classifier })
    }

    /// Session configuration
    pub fn config(&self) -> &PidConfig {
        self.config
    }

    /// The wrapped engine
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classify `scan` in place, adding a `CLASS` parameter and a
    /// [`TEMPC_ATTRIBUTE`] attribute.
    ///
    /// Both are added only once every ray has been classified. SNRH estimated
    /// here is removed again before returning, on success or failure; an SNRH
    /// that came with the scan is left alone.
    ///
    /// # Errors
    /// [`PidError::MissingParameter`] if a required moment is absent, or any
    /// profile, shape or classifier error.
    pub fn classify_scan<S: PolarScan + ?Sized>(
        &self,
        scan: &mut S,
        profile: &TemperatureProfile,
    ) -> Result<ClassifySummary, PidError> {
        if scan.nrays() == 0 || scan.nbins() == 0 {
            return Err(PidError::EmptyScan);
        }
        if let Some(&name) = REQUIRED_MOMENTS.iter().find(|q| !scan.has_parameter(q)) {
            return Err(PidError::MissingParameter(name));
        }
        for name in OPTIONAL_MOMENTS.iter().filter(|q| !scan.has_parameter(q)) {
            warn!("{name} not in scan, classifying with missing values");
        }

        let snr_estimated = !scan.has_parameter(SNR_QUANTITY);
        if snr_estimated {
            let dbzh = scan
                .parameter("DBZH")
                .ok_or(PidError::MissingParameter("DBZH"))?;
            let snr = estimate_snr(
                dbzh,
                scan.range_start_km(),
                scan.range_scale_m(),
                self.config.noise_dbz_at_100km,
                self.config.missing,
            );
            debug!("Estimated SNRH from DBZH");
            scan.add_parameter(snr);
        }

        let result = self.classify_rays(&*scan, profile);

        if snr_estimated {
            scan.remove_parameter(SNR_QUANTITY);
        }

        let classified = result?;
        scan.set_attribute(TEMPC_ATTRIBUTE, classified.tempc.concat());
        scan.add_parameter(classified.class);

        let summary = ClassifySummary {
            rays: scan.nrays(),
            bins: scan.nbins(),
            snr_estimated,
            class_counts: classified.counts,
        };
        info!(
            "Classified {} rays x {} bins with {} thresholds",
            summary.rays,
            summary.bins,
            self.config.profile()
        );
        Ok(summary)
    }

    fn classify_rays<S: PolarScan + ?Sized>(
        &self,
        scan: &S,
        profile: &TemperatureProfile,
    ) -> Result<Classified, PidError> {
        let tempc = ray_temperatures(scan, profile)?;

        let nrays = scan.nrays();
        let nbins = scan.nbins();
        let missing = self.config.missing;

        let mut class = ScanParameter::filled(CLASS_QUANTITY, nrays, nbins, CLASS_UNDETECT)
            .with_scaling(1.0, 0.0, CLASS_NODATA, CLASS_UNDETECT);
        let mut counts: FxHashMap<u8, usize> = FxHashMap::default();

        for ray in 0..nrays {
            let fetch = |quantity: &str| -> Result<Vec<f64>, PidError> {
                let values = scan
                    .parameter(quantity)
                    .map_or_else(|| vec![missing; nbins], |p| p.converted_ray(ray, missing));
                if values.len() == nbins {
                    Ok(values)
                } else {
                    Err(PidError::ShapeMismatch {
                        ray,
                        expected: nbins,
                        found: values.len(),
                    })
                }
            };

            let snr = fetch(SNR_QUANTITY)?;
            let dbz = fetch("DBZH")?;
            let zdr = fetch("ZDR")?;
            let kdp = fetch("KDP")?;
            let ldr = fetch("LDR")?;
            let rhohv = fetch("RHOHV")?;
            let phidp = fetch("PHIDP")?;

            let moments = RayMoments {
                ray,
                snr: &snr,
                dbz: &dbz,
                zdr: &zdr,
                kdp: &kdp,
                ldr: &ldr,
                rhohv: &rhohv,
                phidp: &phidp,
                tempc: &tempc[ray],
                missing,
                min_valid_interest: self.config.min_valid_interest,
            };

            let classes = self.classifier.classify_ray(&moments)?;
            if classes.len() != nbins {
                return Err(ClassifyError::Ray {
                    ray,
                    message: format!("returned {} classes for {nbins} bins", classes.len()),
                }
                .into());
            }

            for (bin, &code) in classes.iter().enumerate() {
                class.set(ray, bin, f64::from(code));
                *counts.entry(code).or_default() += 1;
            }
        }

        Ok(Classified {
            class,
            tempc,
            counts,
        })
    }
}
