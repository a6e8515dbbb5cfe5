use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use formats::Ring;
use h3o::CellIndex;
use serde_json::Value;

/// A validated H3 cell identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(CellIndex);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCellId {
    pub value: String,
}

impl fmt::Display for InvalidCellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is an invalid H3-index", self.value)
    }
}

impl std::error::Error for InvalidCellId {}

impl FromStr for CellId {
    type Err = InvalidCellId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<CellIndex>()
            .map(CellId)
            .map_err(|_| InvalidCellId {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<CellIndex> for CellId {
    fn from(index: CellIndex) -> Self {
        CellId(index)
    }
}

impl CellId {
    pub fn index(self) -> CellIndex {
        self.0
    }

    pub fn is_pentagon(self) -> bool {
        self.0.is_pentagon()
    }

    /// Boundary as a closed `[lon, lat]` ring.
    ///
    /// H3 lists vertices counter-clockwise; the ring is reversed so polygons
    /// wind clockwise, which spherical renderers read as "the small side".
    pub fn boundary_ring(self) -> Ring {
        let mut ring: Ring = self.0.boundary().iter().map(|ll| [ll.lng(), ll.lat()]).collect();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        ring.reverse();
        ring
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellSetError {
    /// The input was not a list of identifiers.
    NotASequence { found: String },
    /// The first entry failing H3 validation.
    InvalidCell { index: usize, value: String },
}

impl fmt::Display for CellSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellSetError::NotASequence { found } => {
                write!(f, "areas must contain an array of H3-indexes; got {found}")
            }
            CellSetError::InvalidCell { index, value } => write!(
                f,
                "areas must contain valid H3-indexes; '{value}' (at position {index}) is an invalid H3-index"
            ),
        }
    }
}

impl std::error::Error for CellSetError {}

/// Ordered list of cells as supplied by the caller; may hold duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellSet(Vec<CellId>);

impl CellSet {
    pub fn new(cells: Vec<CellId>) -> Self {
        Self(cells)
    }

    /// Validates every entry, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, CellSetError> {
        values
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_ref()
                    .parse::<CellId>()
                    .map_err(|e| CellSetError::InvalidCell {
                        index,
                        value: e.value,
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parses the JSON-array form used by host attributes,
    /// e.g. `["80e1fffffffffff", "8035fffffffffff"]`.
    pub fn from_json(payload: &str) -> Result<Self, CellSetError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|_| CellSetError::NotASequence {
                found: payload.to_string(),
            })?;
        let Value::Array(items) = value else {
            return Err(CellSetError::NotASequence {
                found: value.to_string(),
            });
        };

        let mut cells = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let cell = match item {
                Value::String(s) => s.parse::<CellId>().ok(),
                _ => None,
            };
            match cell {
                Some(c) => cells.push(c),
                None => {
                    return Err(CellSetError::InvalidCell {
                        index,
                        value: match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        },
                    });
                }
            }
        }
        Ok(Self(cells))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[CellId] {
        &self.0
    }

    /// Distinct cells, in first-seen order.
    pub fn unique(&self) -> Vec<CellId> {
        let mut seen = HashSet::with_capacity(self.0.len());
        self.0.iter().copied().filter(|c| seen.insert(*c)).collect()
    }
}

impl<'a> IntoIterator for &'a CellSet {
    type Item = &'a CellId;
    type IntoIter = std::slice::Iter<'a, CellId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
