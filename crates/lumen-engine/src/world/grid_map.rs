use std::path::{Path, PathBuf};

use glam::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map has {count} cells, which is not a perfect square")]
    NotSquare { count: usize },

    #[error("map contains no cells")]
    Empty,

    #[error("cannot read map `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const DEFAULT_SIDE: usize = 11;

#[rustfmt::skip]
const DEFAULT_CELLS: [u8; DEFAULT_SIDE * DEFAULT_SIDE] = [
    1,1,1,1,1,1,1,1,1,1,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,0,0,0,0,0,0,0,2,0,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,0,0,0,0,0,0,0,3,0,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,0,0,0,0,0,4,0,0,0,1,
    1,0,0,0,0,0,0,0,0,0,1,
    1,1,1,1,1,1,1,1,1,1,1,
];

/// Square grid of cell codes, row-major with `y` selecting the row.
///
/// Code 0 is walkable floor; every other code is solid and selects the wall
/// texture `code - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    side: usize,
    cells: Vec<u8>,
}

impl Default for GridMap {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            cells: DEFAULT_CELLS.to_vec(),
        }
    }
}

impl GridMap {
    /// Builds a map from the digit characters of `text`; everything else is ignored.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let cells: Vec<u8> = text
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8)
            .collect();

        if cells.is_empty() {
            return Err(MapError::Empty);
        }
        let side = cells.len().isqrt();
        if side * side != cells.len() {
            return Err(MapError::NotSquare { count: cells.len() });
        }
        Ok(Self { side, cells })
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cell codes widened to the `array<u32>` the kernel reads.
    pub fn gpu_cells(&self) -> Vec<u32> {
        self.cells.iter().map(|&c| u32::from(c)).collect()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        if col >= self.side || row >= self.side {
            return None;
        }
        self.cells.get(row * self.side + col).copied()
    }

    /// Cell under a world position, `None` outside the grid.
    pub fn cell_at(&self, pos: Vec2) -> Option<u8> {
        if !(pos.x >= 0.0 && pos.y >= 0.0) {
            return None;
        }
        self.get(pos.x as usize, pos.y as usize)
    }

    pub fn is_walkable(&self, pos: Vec2) -> bool {
        self.cell_at(pos) == Some(0)
    }

    /// ASCII overview, one line per row, with `P` marking the player.
    pub fn render_ascii(&self, player: Option<Vec2>) -> String {
        let player_cell = player
            .filter(|p| p.x >= 0.0 && p.y >= 0.0)
            .map(|p| (p.x as usize, p.y as usize));

        let mut out = String::with_capacity(self.side * (self.side * 2 + 1));
        for row in 0..self.side {
            for col in 0..self.side {
                let symbol = if player_cell == Some((col, row)) {
                    'P'
                } else {
                    match self.cells[row * self.side + col] {
                        0 => ' ',
                        1 => '#',
                        2 => 'O',
                        3 => 'X',
                        4 => '@',
                        _ => '.',
                    }
                };
                out.push(symbol);
                out.push(' ');
            }
            out.pop();
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(n: usize) -> String {
        (0..n).map(|i| if i % 7 == 0 { "1, " } else { "0, " }).collect()
    }

    #[test]
    fn square_digit_count_is_reshaped() {
        let map = GridMap::parse(&digits(121)).unwrap();
        assert_eq!(map.side(), 11);
        assert_eq!(map.get(0, 0), Some(1));
        assert_eq!(map.get(1, 0), Some(0));
    }

    #[test]
    fn non_square_digit_count_is_rejected() {
        let err = GridMap::parse(&digits(120)).unwrap_err();
        assert!(matches!(err, MapError::NotSquare { count: 120 }));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(GridMap::parse("no digits here"), Err(MapError::Empty)));
    }

    #[test]
    fn default_map_has_solid_border() {
        let map = GridMap::default();
        let n = map.side();
        for i in 0..n {
            assert_eq!(map.get(i, 0), Some(1));
            assert_eq!(map.get(i, n - 1), Some(1));
            assert_eq!(map.get(0, i), Some(1));
            assert_eq!(map.get(n - 1, i), Some(1));
        }
        assert!(map.is_walkable(Vec2::new(5.5, 5.5)));
    }

    #[test]
    fn outside_positions_are_not_walkable() {
        let map = GridMap::default();
        assert!(!map.is_walkable(Vec2::new(-0.5, 3.0)));
        assert!(!map.is_walkable(Vec2::new(3.0, 11.2)));
        assert!(!map.is_walkable(Vec2::new(f32::NAN, 3.0)));
    }

    #[test]
    fn ascii_marks_player_and_codes() {
        let map = GridMap::parse("1111 1020 1030 1111").unwrap();
        let ascii = map.render_ascii(Some(Vec2::new(1.5, 1.5)));
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines[0], "# # # #");
        assert_eq!(lines[1], "# P O  ");
        assert_eq!(lines[2], "#   X  ");
    }
}
