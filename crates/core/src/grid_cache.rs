//! `GridCache`: UTM <-> internal coordinate transforms, plot size, and the
//! optional closest-point memoisation described in DESIGN.md.
//!
//! All per-step geometry is carried in internal coordinates (§3's false
//! origin + false scaling); every external collaborator call crosses back to
//! UTM. Both transforms are forced on here since the engine uses `f64`
//! geometry (see `geom::point`), per the design note that extended precision
//! is the only case where they may be toggled off.

use crate::geom::point::{XyPoint, XyzPoint};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Coordinate transform state for one scenario's landscape.
#[derive(Debug, Clone)]
pub struct GridCache {
    /// UTM easting/northing of the landscape's lower-left corner.
    origin: XyPoint,
    /// Cell size in UTM units; internal coordinates are scaled by `1/resolution`.
    resolution: f64,
    point_cache_enabled: bool,
    point_cache: FxHashMap<(i64, i64), XyPoint>,
    point_cache_order: VecDeque<(i64, i64)>,
    point_cache_capacity: usize,
}

const DEFAULT_POINT_CACHE_CAPACITY: usize = 4096;

impl GridCache {
    pub fn new(origin: XyPoint, resolution: f64) -> Self {
        debug_assert!(resolution > 0.0);
        GridCache {
            origin,
            resolution,
            point_cache_enabled: false,
            point_cache: FxHashMap::default(),
            point_cache_order: VecDeque::new(),
            point_cache_capacity: DEFAULT_POINT_CACHE_CAPACITY,
        }
    }

    /// Enable or disable the closest-point memoisation. Disabled by default;
    /// correctness never depends on it being on.
    pub fn enable_point_cache(&mut self, enabled: bool) {
        self.point_cache_enabled = enabled;
        if !enabled {
            self.point_cache.clear();
            self.point_cache_order.clear();
        }
    }

    /// Drop all cached state. Called on `Scenario::clear()` and step-back,
    /// per the design note that caches must never survive a rewind.
    pub fn clear(&mut self) {
        self.point_cache.clear();
        self.point_cache_order.clear();
    }

    #[inline]
    pub fn to_internal(&self, utm: XyPoint) -> XyPoint {
        (utm - self.origin) / self.resolution
    }

    #[inline]
    pub fn to_utm(&self, internal: XyPoint) -> XyPoint {
        internal * self.resolution + self.origin
    }

    #[inline]
    pub fn to_internal_3d(&self, utm: XyzPoint) -> XyzPoint {
        XyzPoint::new(
            (utm.x - self.origin.x) / self.resolution,
            (utm.y - self.origin.y) / self.resolution,
            utm.z,
        )
    }

    #[inline]
    pub fn to_utm_3d(&self, internal: XyzPoint) -> XyzPoint {
        XyzPoint::new(
            internal.x * self.resolution + self.origin.x,
            internal.y * self.resolution + self.origin.y,
            internal.z,
        )
    }

    #[inline]
    pub fn internal_length(&self, utm_length: f64) -> f64 {
        utm_length / self.resolution
    }

    #[inline]
    pub fn utm_length(&self, internal_length: f64) -> f64 {
        internal_length * self.resolution
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Grid cell index (in the UTM-aligned plot grid) a UTM point falls into.
    pub fn cell_index(&self, utm: XyPoint) -> (i64, i64) {
        let internal = self.to_internal(utm);
        (internal.x.floor() as i64, internal.y.floor() as i64)
    }

    /// Snap `utm` to the cache's notion of the nearest grid intersection,
    /// memoising the UTM result keyed by cell index when the cache is
    /// enabled. Returns the same value whether or not the cache is on; it is
    /// a pure optimisation.
    pub fn closest_grid_point(&mut self, utm: XyPoint) -> XyPoint {
        let key = self.cell_index(utm);
        if self.point_cache_enabled {
            if let Some(&cached) = self.point_cache.get(&key) {
                return cached;
            }
        }
        let snapped_internal = XyPoint::new(key.0 as f64, key.1 as f64);
        let snapped = self.to_utm(snapped_internal);
        if self.point_cache_enabled {
            if self.point_cache.len() >= self.point_cache_capacity {
                if let Some(oldest) = self.point_cache_order.pop_front() {
                    self.point_cache.remove(&oldest);
                }
            }
            self.point_cache.insert(key, snapped);
            self.point_cache_order.push_back(key);
        }
        snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_between_utm_and_internal() {
        let cache = GridCache::new(XyPoint::new(500_000.0, 6_000_000.0), 10.0);
        let utm = XyPoint::new(500_150.0, 6_000_400.0);
        let internal = cache.to_internal(utm);
        let back = cache.to_utm(internal);
        assert!((back - utm).norm() < 1e-6);
    }

    #[test]
    fn internal_length_scales_by_resolution() {
        let cache = GridCache::new(XyPoint::new(0.0, 0.0), 25.0);
        assert!((cache.internal_length(100.0) - 4.0).abs() < 1e-9);
        assert!((cache.utm_length(4.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn point_cache_disabled_by_default_still_returns_correct_value() {
        let mut cache = GridCache::new(XyPoint::new(0.0, 0.0), 10.0);
        let snapped = cache.closest_grid_point(XyPoint::new(15.0, 25.0));
        assert_eq!(snapped, XyPoint::new(10.0, 20.0));
    }

    #[test]
    fn point_cache_returns_same_value_when_enabled() {
        let mut cache = GridCache::new(XyPoint::new(0.0, 0.0), 10.0);
        cache.enable_point_cache(true);
        let a = cache.closest_grid_point(XyPoint::new(15.0, 25.0));
        let b = cache.closest_grid_point(XyPoint::new(15.0, 25.0));
        assert_eq!(a, b);
    }

    #[test]
    fn clear_drops_cached_entries() {
        let mut cache = GridCache::new(XyPoint::new(0.0, 0.0), 10.0);
        cache.enable_point_cache(true);
        cache.closest_grid_point(XyPoint::new(15.0, 25.0));
        cache.clear();
        assert!(cache.point_cache.is_empty());
    }
}
