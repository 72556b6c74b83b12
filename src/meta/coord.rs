//! Plane coordinates, axis lengths and raster-order conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical plane coordinate: depth, channel and time index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaneCoord {
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

impl PlaneCoord {
    /// Creates a new coordinate.
    #[inline]
    pub fn new(z: usize, c: usize, t: usize) -> Self {
        Self { z, c, t }
    }

    /// Returns the coordinate with its Z and T components exchanged.
    #[inline]
    pub fn transposed(self) -> Self {
        Self {
            z: self.t,
            c: self.c,
            t: self.z,
        }
    }
}

impl fmt::Display for PlaneCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z={} c={} t={}", self.z, self.c, self.t)
    }
}

/// Composite key of a per-plane metadata table: the position's ordinal in
/// the acquisition plus the plane coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaneKey {
    pub position: usize,
    pub coord: PlaneCoord,
}

impl PlaneKey {
    #[inline]
    pub fn new(position: usize, coord: PlaneCoord) -> Self {
        Self { position, coord }
    }
}

impl fmt::Display for PlaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MPlane-{}-{}-{}-{}",
            self.position, self.coord.z, self.coord.c, self.coord.t
        )
    }
}

/// Largest plane count a position may declare. Image counts are 32-bit in
/// the acquisition software, so anything past this is a corrupt header.
pub const MAX_PLANE_COUNT: usize = i32::MAX as usize;

/// Declared extents of one position's image stack.
///
/// Z, channel and time default to 1 so that a payload which never declares
/// an axis still describes a single plane along it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLengths {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub channel: usize,
    pub time: usize,
}

impl Default for AxisLengths {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            z: 1,
            channel: 1,
            time: 1,
        }
    }
}

impl AxisLengths {
    /// Number of planes described by the Z, channel and time extents, or
    /// `None` when the product does not fit in a `usize`.
    pub fn checked_plane_count(&self) -> Option<usize> {
        self.z.checked_mul(self.channel)?.checked_mul(self.time)
    }

    /// Number of planes described by the Z, channel and time extents.
    ///
    /// Saturates at `usize::MAX`. Parsed positions never get there, since
    /// counts above [`MAX_PLANE_COUNT`] are rejected.
    pub fn plane_count(&self) -> usize {
        self.checked_plane_count().unwrap_or(usize::MAX)
    }

    /// Whether the declared extents fit within [`MAX_PLANE_COUNT`].
    pub fn is_representable(&self) -> bool {
        self.checked_plane_count()
            .is_some_and(|count| count <= MAX_PLANE_COUNT)
    }

    /// Exchanges the stored Z and time extents.
    pub fn swap_z_and_time(&mut self) {
        std::mem::swap(&mut self.z, &mut self.time);
    }

    /// Converts a linear plane index into a coordinate.
    ///
    /// Raster order has Z varying fastest, then channel, then time. Returns
    /// `None` for indices past the last plane.
    pub fn raster_to_coord(&self, plane_index: usize) -> Option<PlaneCoord> {
        if plane_index >= self.plane_count() {
            return None;
        }
        let z = plane_index % self.z;
        let rest = plane_index / self.z;
        let c = rest % self.channel;
        let t = rest / self.channel;
        Some(PlaneCoord { z, c, t })
    }

    /// Converts a coordinate back into its linear plane index.
    pub fn coord_to_raster(&self, coord: PlaneCoord) -> Option<usize> {
        if coord.z >= self.z || coord.c >= self.channel || coord.t >= self.time {
            return None;
        }
        self.channel
            .checked_mul(coord.t)?
            .checked_add(coord.c)?
            .checked_mul(self.z)?
            .checked_add(coord.z)
    }
}
