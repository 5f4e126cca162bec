//! Uniform-grid spatial hashing for neighbor queries.
//!
//! Particles are bucketed into square cells the size of the query radius.
//! The grid is stored as a counting sort: `sorted` holds particle indices
//! ordered by cell, and `cell_start[c]..cell_start[c + 1]` is the slice of
//! `sorted` belonging to cell `c`. Any two particles within one cell size of
//! each other are then in the same or adjacent cells, so a neighbor query only
//! visits the 3×3 block around a cell.
//!
//! Positions outside the surface are clamped into the edge cells. Clamping
//! never pushes two points further apart, so the 3×3 guarantee still holds.

use glam::Vec2;

use crate::surface::SurfaceSize;

/// Upper bound on cell count; the cell size grows to respect it.
const MAX_CELLS: usize = 1 << 16;

/// Offsets of the 3×3 neighborhood, including the center cell.
#[rustfmt::skip]
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0), (0,  0), (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

/// 2D uniform grid over the surface.
#[derive(Debug, Clone, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    cols: u32,
    rows: u32,
    /// Cell of each particle, indexed by particle.
    cells: Vec<u32>,
    /// Prefix offsets into `sorted`, one more entry than there are cells.
    cell_start: Vec<u32>,
    /// Particle indices ordered by cell.
    sorted: Vec<u32>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Grid dimensions in cells.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// Rebuild the grid from `positions` over a surface of `size`.
    ///
    /// Cells are at least `cell_size` wide.
    pub fn rebuild<I>(&mut self, positions: I, size: SurfaceSize, cell_size: f32)
    where
        I: IntoIterator<Item = Vec2>,
    {
        let bounds = size.as_vec2().max(Vec2::ONE);
        let min_for_budget = (bounds.x * bounds.y / MAX_CELLS as f32).sqrt();
        self.cell_size = cell_size.max(1.0).max(min_for_budget);
        self.cols = ((bounds.x / self.cell_size).ceil() as u32).max(1);
        self.rows = ((bounds.y / self.cell_size).ceil() as u32).max(1);
        let cell_count = (self.cols * self.rows) as usize;

        self.cells.clear();
        for p in positions {
            let (cx, cy) = self.cell_coords(p);
            self.cells.push(cy * self.cols + cx);
        }

        // Count, prefix-sum, scatter.
        self.cell_start.clear();
        self.cell_start.resize(cell_count + 1, 0);
        for &c in &self.cells {
            self.cell_start[c as usize + 1] += 1;
        }
        for c in 0..cell_count {
            self.cell_start[c + 1] += self.cell_start[c];
        }
        let mut cursor = self.cell_start.clone();
        self.sorted.clear();
        self.sorted.resize(self.cells.len(), 0);
        for (i, &c) in self.cells.iter().enumerate() {
            let slot = &mut cursor[c as usize];
            self.sorted[*slot as usize] = i as u32;
            *slot += 1;
        }
    }

    /// Cell coordinates of a position, clamped to the grid.
    pub fn cell_coords(&self, p: Vec2) -> (u32, u32) {
        let size = self.cell_size.max(f32::EPSILON);
        let clamp = |v: f32, n: u32| -> u32 {
            if v.is_finite() {
                ((v / size).floor().max(0.0) as u32).min(n - 1)
            } else {
                0
            }
        };
        (clamp(p.x, self.cols.max(1)), clamp(p.y, self.rows.max(1)))
    }

    /// Particle indices in the 3×3 block of cells around `p`.
    pub fn neighbors(&self, p: Vec2) -> impl Iterator<Item = u32> + '_ {
        let (cx, cy) = self.cell_coords(p);
        NEIGHBOR_OFFSETS.iter().flat_map(move |&(dx, dy)| {
            let x = cx as i32 + dx;
            let y = cy as i32 + dy;
            let cell = if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
                None
            } else {
                Some((y as u32 * self.cols + x as u32) as usize)
            };
            let range = match cell {
                Some(c) if c + 1 < self.cell_start.len() => {
                    self.cell_start[c] as usize..self.cell_start[c + 1] as usize
                }
                _ => 0..0,
            };
            self.sorted[range].iter().copied()
        })
    }
}
