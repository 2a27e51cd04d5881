/// A 2D row-major grid addressed as `[y][x]`.
///
/// Backend matrices arrive as nested JSON arrays that are not guaranteed to be
/// rectangular, so every slot is optional and lookups are bounds-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<Option<T>>,
}

impl<T> Default for Tilemap<T> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }
}

impl<T> Tilemap<T> {
    /// Build from nested rows. The width is the longest row; short rows leave
    /// their trailing slots empty.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut data = Vec::with_capacity(width * height);

        for row in rows {
            let len = row.len();
            data.extend(row.into_iter().map(Some));
            data.extend((len..width).map(|_| None));
        }

        Self { width, height, data }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data[idx].as_ref())
    }

    /// Iterate over all present cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.data.iter().enumerate().filter_map(move |(idx, val)| {
            val.as_ref().map(|v| (idx % width, idx / width, v))
        })
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![Some(value); width * height],
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx] = Some(value);
        }
    }
}
