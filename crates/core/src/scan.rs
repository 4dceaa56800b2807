//! Polar scan collaborators
//!
//! The scan object itself belongs to the host radar toolkit. This module only
//! describes what classification needs from it ([`PolarScan`]), a parameter
//! container with ODIM-style scaling ([`ScanParameter`]), and a small in-memory
//! scan ([`MemoryScan`]) for embedding and tests.

use crate::core_types::units::{Degrees, Meters};
use crate::geometry::ray_bin_heights;
use rustc_hash::FxHashMap;

/// Decoded value of one bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinValue {
    /// Physical value (`offset + gain · raw`)
    Data(f64),
    /// Raw value equals the parameter's `nodata` marker
    Nodata,
    /// Raw value equals the parameter's `undetect` marker
    Undetect,
}

/// One quantity of a polar scan, stored raw and scaled on read
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParameter {
    quantity: String,
    /// Scale applied to raw values
    pub gain: f64,
    /// Offset applied after scaling
    pub offset: f64,
    /// Raw marker for "not scanned"
    pub nodata: f64,
    /// Raw marker for "scanned, nothing detected"
    pub undetect: f64,
    nrays: usize,
    nbins: usize,
    data: Vec<f64>,
}

impl ScanParameter {
    /// Parameter with every raw value set to `fill`, gain 1, offset 0.
    pub fn filled(quantity: &str, nrays: usize, nbins: usize, fill: f64) -> Self {
        Self {
            quantity: quantity.to_string(),
            gain: 1.0,
            offset: 0.0,
            nodata: fill,
            undetect: fill,
            nrays,
            nbins,
            data: vec![fill; nrays * nbins],
        }
    }

    /// Parameter from raw row-major (`ray * nbins + bin`) data.
    ///
    /// Returns `None` if `data.len() != nrays * nbins`.
    pub fn from_raw(quantity: &str, nrays: usize, nbins: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != nrays * nbins {
            return None;
        }
        Some(Self {
            quantity: quantity.to_string(),
            gain: 1.0,
            offset: 0.0,
            nodata: f64::NAN,
            undetect: f64::NAN,
            nrays,
            nbins,
            data,
        })
    }

    /// Set scaling and markers
    pub fn with_scaling(mut self, gain: f64, offset: f64, nodata: f64, undetect: f64) -> Self {
        self.gain = gain;
        self.offset = offset;
        self.nodata = nodata;
        self.undetect = undetect;
        self
    }

    /// Quantity name (`DBZH`, `ZDR`, ...)
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// Number of rays
    pub fn nrays(&self) -> usize {
        self.nrays
    }

    /// Number of bins per ray
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// Raw values, row-major by ray
    pub fn raw(&self) -> &[f64] {
        &self.data
    }

    /// Raw value at `(ray, bin)`
    pub fn get(&self, ray: usize, bin: usize) -> Option<f64> {
        (ray < self.nrays && bin < self.nbins).then(|| self.data[ray * self.nbins + bin])
    }

    /// Overwrite the raw value at `(ray, bin)`. Out-of-range indices are ignored.
    pub fn set(&mut self, ray: usize, bin: usize, value: f64) {
        if ray < self.nrays && bin < self.nbins {
            self.data[ray * self.nbins + bin] = value;
        }
    }

    /// Decode the bin at `(ray, bin)`; out of range reads as [`BinValue::Nodata`]
    pub fn converted(&self, ray: usize, bin: usize) -> BinValue {
        match self.get(ray, bin) {
            None => BinValue::Nodata,
            Some(raw) if raw == self.nodata => BinValue::Nodata,
            Some(raw) if raw == self.undetect => BinValue::Undetect,
            Some(raw) => BinValue::Data(self.offset + self.gain * raw),
        }
    }

    /// Physical values along one ray; nodata and undetect bins become `missing`.
    pub fn converted_ray(&self, ray: usize, missing: f64) -> Vec<f64> {
        (0..self.nbins)
            .map(|bin| match self.converted(ray, bin) {
                BinValue::Data(v) => v,
                BinValue::Nodata | BinValue::Undetect => missing,
            })
            .collect()
    }
}

/// What classification needs from a host polar scan
pub trait PolarScan {
    /// Number of rays
    fn nrays(&self) -> usize;

    /// Number of bins per ray
    fn nbins(&self) -> usize;

    /// Range to the start of the first bin (km)
    fn range_start_km(&self) -> f64;

    /// Bin length (m)
    fn range_scale_m(&self) -> f64;

    /// Bin-centre heights along `ray` (m), in bin order. Not necessarily ascending.
    fn ray_heights(&self, ray: usize) -> Vec<f64>;

    /// Attach a numeric array attribute, replacing any previous value
    fn set_attribute(&mut self, name: &str, values: Vec<f64>);

    /// Read back an attribute
    fn attribute(&self, name: &str) -> Option<&[f64]>;

    /// Whether a parameter with this quantity is present
    fn has_parameter(&self, quantity: &str) -> bool {
        self.parameter(quantity).is_some()
    }

    /// Parameter by quantity
    fn parameter(&self, quantity: &str) -> Option<&ScanParameter>;

    /// Add a parameter, replacing any with the same quantity
    fn add_parameter(&mut self, param: ScanParameter);

    /// Remove and return a parameter
    fn remove_parameter(&mut self, quantity: &str) -> Option<ScanParameter>;
}

/// In-memory polar scan
#[derive(Debug, Clone)]
pub struct MemoryScan {
    nrays: usize,
    nbins: usize,
    elevation: Degrees,
    range_start_km: f64,
    range_scale_m: f64,
    radar_height: Meters,
    heights: Option<Vec<Vec<f64>>>,
    parameters: FxHashMap<String, ScanParameter>,
    attributes: FxHashMap<String, Vec<f64>>,
}

impl MemoryScan {
    /// Empty scan whose bin heights follow the beam geometry
    pub fn new(
        nrays: usize,
        nbins: usize,
        elevation: Degrees,
        range_start_km: f64,
        range_scale_m: f64,
        radar_height: Meters,
    ) -> Self {
        Self {
            nrays,
            nbins,
            elevation,
            range_start_km,
            range_scale_m,
            radar_height,
            heights: None,
            parameters: FxHashMap::default(),
            attributes: FxHashMap::default(),
        }
    }

    /// Replace computed heights with explicit per-ray heights.
    ///
    /// Supplied rays are returned as given, whatever their length; rays beyond
    /// `heights.len()` fall back to geometry.
    pub fn with_heights(mut self, heights: Vec<Vec<f64>>) -> Self {
        self.heights = Some(heights);
        self
    }

    /// Elevation angle
    pub fn elevation(&self) -> Degrees {
        self.elevation
    }

    /// Names of all parameters currently held
    pub fn quantities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parameters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PolarScan for MemoryScan {
    fn nrays(&self) -> usize {
        self.nrays
    }

    fn nbins(&self) -> usize {
        self.nbins
    }

    fn range_start_km(&self) -> f64 {
        self.range_start_km
    }

    fn range_scale_m(&self) -> f64 {
        self.range_scale_m
    }

    fn ray_heights(&self, ray: usize) -> Vec<f64> {
        match self.heights.as_ref().and_then(|h| h.get(ray)) {
            Some(h) => h.clone(),
            None => ray_bin_heights(
                self.elevation,
                self.range_start_km,
                self.range_scale_m,
                self.nbins,
                self.radar_height,
            ),
        }
    }

    fn set_attribute(&mut self, name: &str, values: Vec<f64>) {
        self.attributes.insert(name.to_string(), values);
    }

    fn attribute(&self, name: &str) -> Option<&[f64]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    fn parameter(&self, quantity: &str) -> Option<&ScanParameter> {
        self.parameters.get(quantity)
    }

    fn add_parameter(&mut self, param: ScanParameter) {
        self.parameters.insert(param.quantity.clone(), param);
    }

    fn remove_parameter(&mut self, quantity: &str) -> Option<ScanParameter> {
        self.parameters.remove(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_ray_maps_markers_to_missing() {
        let param = ScanParameter::from_raw("DBZH", 1, 4, vec![0.0, 255.0, 100.0, 64.0])
            .unwrap()
            .with_scaling(0.5, -32.0, 255.0, 0.0);

        assert_eq!(param.converted(0, 0), BinValue::Undetect);
        assert_eq!(param.converted(0, 1), BinValue::Nodata);
        assert_eq!(param.converted(0, 2), BinValue::Data(18.0));
        assert_eq!(param.converted(3, 0), BinValue::Nodata);
        assert_eq!(param.converted_ray(0, -9999.0), vec![-9999.0, -9999.0, 18.0, 0.0]);
    }

    #[test]
    fn test_from_raw_checks_shape() {
        assert!(ScanParameter::from_raw("ZDR", 2, 3, vec![0.0; 5]).is_none());
        let mut p = ScanParameter::from_raw("ZDR", 2, 3, vec![0.0; 6]).unwrap();
        p.set(1, 2, 4.5);
        p.set(9, 9, 1.0);
        assert_eq!(p.get(1, 2), Some(4.5));
        assert_eq!(p.raw()[5], 4.5);
        assert_eq!(p.get(2, 0), None);
    }

    #[test]
    fn test_memory_scan_parameters() {
        let mut scan = MemoryScan::new(2, 3, Degrees::new(0.5), 0.0, 250.0, Meters::new(0.0));
        scan.add_parameter(ScanParameter::filled("ZDR", 2, 3, 0.0));
        scan.add_parameter(ScanParameter::filled("DBZH", 2, 3, 0.0));
        assert_eq!(scan.quantities(), vec!["DBZH", "ZDR"]);
        assert!(scan.has_parameter("ZDR"));
        assert!(scan.remove_parameter("ZDR").is_some());
        assert!(!scan.has_parameter("ZDR"));

        scan.set_attribute("how/tempc", vec![1.0, 2.0]);
        assert_eq!(scan.attribute("how/tempc"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_explicit_heights_override_geometry() {
        let scan = MemoryScan::new(2, 3, Degrees::new(0.5), 0.0, 250.0, Meters::new(0.0))
            .with_heights(vec![vec![30.0, 10.0, 20.0]]);
        assert_eq!(scan.ray_heights(0), vec![30.0, 10.0, 20.0]);
        let geometric = scan.ray_heights(1);
        assert_eq!(geometric.len(), 3);
        assert!(geometric.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_short_explicit_heights_are_not_replaced() {
        let scan = MemoryScan::new(1, 3, Degrees::new(0.5), 0.0, 250.0, Meters::new(0.0))
            .with_heights(vec![vec![10.0, 20.0]]);
        assert_eq!(scan.ray_heights(0), vec![10.0, 20.0]);
    }
}
