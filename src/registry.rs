use crate::matrix::Matrix;
use thiserror::Error;

/// Matrix names available when no others are configured.
pub const DEFAULT_MATRIX_NAMES: [&str; 6] = ["MAT_A", "MAT_B", "MAT_C", "MAT_D", "MAT_E", "MAT_F"];

/// Stable identifier of one matrix in a [`Registry`].
///
/// Slots are only handed out by the registry that owns the matrices, so indexing
/// with one never goes out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(usize);

impl Slot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The immutable identity of a slot: its position and the name users type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    slot: Slot,
    name: String,
}

impl Profile {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Errors raised while building or querying a [`Registry`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry would hold no matrices at all.
    #[error("at least one matrix name is required")]
    Empty,
    /// A name cannot be typed as a single token (empty, whitespace or comma inside).
    #[error("invalid matrix name {0:?}")]
    InvalidName(String),
    /// Two slots would share a name.
    #[error("duplicate matrix name {0:?}")]
    DuplicateName(String),
    /// A lookup by name found nothing.
    #[error("unknown matrix name {0:?}")]
    UnknownName(String),
}

/// Owner of every matrix in the session.
///
/// The number of slots is fixed when the registry is built. Matrices are
/// mutable; profiles are not.
#[derive(Debug, Clone)]
pub struct Registry {
    matrices: Box<[Matrix]>,
    profiles: Box<[Profile]>,
}

impl Registry {
    /// Build a registry with one zeroed matrix per name, in the given order.
    pub fn new<I, S>(names: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ',') {
                return Err(RegistryError::InvalidName(name.clone()));
            }
            if names[..i].contains(name) {
                return Err(RegistryError::DuplicateName(name.clone()));
            }
        }
        Ok(Self::from_unique_names(names))
    }

    fn from_unique_names(names: Vec<String>) -> Self {
        let profiles: Box<[Profile]> = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Profile { slot: Slot(i), name })
            .collect();
        let matrices = vec![Matrix::zeros(); profiles.len()].into_boxed_slice();
        Self { matrices, profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Is `name` one of the registered matrix names?
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Look up a slot by exact name.
    pub fn find(&self, name: &str) -> Option<Slot> {
        self.profiles.iter().find(|p| p.name == name).map(|p| p.slot)
    }

    /// Like [`Registry::find`], but a miss is an error.
    pub fn resolve(&self, name: &str) -> Result<Slot, RegistryError> {
        self.find(name)
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))
    }

    pub fn name(&self, slot: Slot) -> &str {
        &self.profiles[slot.0].name
    }

    pub fn matrix(&self, slot: Slot) -> &Matrix {
        &self.matrices[slot.0]
    }

    pub fn matrix_mut(&mut self, slot: Slot) -> &mut Matrix {
        &mut self.matrices[slot.0]
    }

    /// Replace the whole grid of `slot`.
    pub fn store(&mut self, slot: Slot, matrix: Matrix) {
        self.matrices[slot.0] = matrix;
    }

    /// Overwrite `slot` from row-major values; missing cells become zero.
    pub fn load(&mut self, slot: Slot, values: &[f64]) {
        self.matrices[slot.0].fill_row_major(values);
    }

    /// Borrow `source` for reading and a different `dest` for writing.
    ///
    /// Returns `None` when both name the same slot.
    pub fn source_and_dest(&mut self, source: Slot, dest: Slot) -> Option<(&Matrix, &mut Matrix)> {
        let (head, out, tail) = self.split_at_dest(dest)?;
        let source = pick(head, tail, dest, source)?;
        Some((source, out))
    }

    /// Borrow two operands for reading and a `dest` distinct from both for writing.
    ///
    /// The operands may be the same slot. Returns `None` when `dest` is one of them.
    pub fn operands_and_dest(
        &mut self,
        lhs: Slot,
        rhs: Slot,
        dest: Slot,
    ) -> Option<(&Matrix, &Matrix, &mut Matrix)> {
        let (head, out, tail) = self.split_at_dest(dest)?;
        let lhs = pick(head, tail, dest, lhs)?;
        let rhs = pick(head, tail, dest, rhs)?;
        Some((lhs, rhs, out))
    }

    fn split_at_dest(&mut self, dest: Slot) -> Option<(&[Matrix], &mut Matrix, &[Matrix])> {
        let (head, rest) = self.matrices.split_at_mut(dest.0);
        let (out, tail) = rest.split_first_mut()?;
        Some((&*head, out, &*tail))
    }
}

impl Default for Registry {
    /// The six matrices `MAT_A` to `MAT_F`, all zero.
    fn default() -> Self {
        Self::from_unique_names(DEFAULT_MATRIX_NAMES.iter().map(|n| n.to_string()).collect())
    }
}

fn pick<'a>(head: &'a [Matrix], tail: &'a [Matrix], dest: Slot, slot: Slot) -> Option<&'a Matrix> {
    if slot.0 < dest.0 {
        head.get(slot.0)
    } else if slot.0 > dest.0 {
        tail.get(slot.0 - dest.0 - 1)
    } else {
        None
    }
}
