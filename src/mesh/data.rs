use crate::io::PrimitiveType;
use super::MetaData;


/// Roles a point data array can be marked with. Each role is held by at most
/// one array of a [`PointData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Scalars,
    Vectors,
    Normals,
    TCoords,
}

impl Attribute {
    fn slot(self) -> usize {
        match self {
            Attribute::Scalars => 0,
            Attribute::Vectors => 1,
            Attribute::Normals => 2,
            Attribute::TCoords => 3,
        }
    }
}

/// A named array of tuples with a fixed number of components.
///
/// Values are stored widened to `f64`; `ty` records the element type the
/// array is declared with, which is used when serializing.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: String,
    ty: PrimitiveType,
    num_components: usize,
    values: Vec<f64>,
    info: MetaData,
}

impl DataArray {
    /// Creates an empty array.
    ///
    /// # Panics
    ///
    /// Panics if `num_components` is 0.
    pub fn new(name: impl Into<String>, ty: PrimitiveType, num_components: usize) -> Self {
        Self::from_values(name, ty, num_components, Vec::new())
    }

    /// Creates an array with `num_tuples` tuples, all zero.
    pub fn zeroed(
        name: impl Into<String>,
        ty: PrimitiveType,
        num_components: usize,
        num_tuples: usize,
    ) -> Self {
        Self::from_values(name, ty, num_components, vec![0.0; num_components * num_tuples])
    }

    /// Creates an array from interleaved tuple values.
    ///
    /// # Panics
    ///
    /// Panics if `num_components` is 0 or `values.len()` is not a multiple of
    /// `num_components`.
    pub fn from_values(
        name: impl Into<String>,
        ty: PrimitiveType,
        num_components: usize,
        values: Vec<f64>,
    ) -> Self {
        assert!(num_components > 0, "data array needs at least one component");
        assert_eq!(values.len() % num_components, 0, "incomplete tuple in data array");

        Self {
            name: name.into(),
            ty,
            num_components,
            values,
            info: MetaData::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    pub fn num_components(&self) -> usize {
        self.num_components
    }

    pub fn num_tuples(&self) -> usize {
        self.values.len() / self.num_components
    }

    /// All values, tuple after tuple.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn tuple(&self, i: usize) -> &[f64] {
        let start = i * self.num_components;
        &self.values[start..start + self.num_components]
    }

    pub fn component(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.num_components + j]
    }

    pub fn set_component(&mut self, i: usize, j: usize, v: f64) {
        self.values[i * self.num_components + j] = v;
    }

    /// Appends a tuple. Missing components are filled with zero, surplus
    /// ones are ignored.
    pub fn push_tuple(&mut self, tuple: &[f64]) {
        let n = self.num_components;
        self.values.extend(tuple.iter().copied().chain(std::iter::repeat(0.0)).take(n));
    }

    /// Metadata of this array.
    pub fn info(&self) -> &MetaData {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut MetaData {
        &mut self.info
    }
}

/// The per-point data arrays of a mesh, in insertion order, plus the active
/// attribute slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointData {
    arrays: Vec<DataArray>,
    active: [Option<usize>; 4],
}

impl PointData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an array and returns its index.
    pub fn add_array(&mut self, array: DataArray) -> usize {
        self.arrays.push(array);
        self.arrays.len() - 1
    }

    pub fn arrays(&self) -> &[DataArray] {
        &self.arrays
    }

    pub fn array(&self, idx: usize) -> Option<&DataArray> {
        self.arrays.get(idx)
    }

    pub fn array_mut(&mut self, idx: usize) -> Option<&mut DataArray> {
        self.arrays.get_mut(idx)
    }

    /// Index of the first array with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.arrays.iter().position(|a| a.name() == name)
    }

    pub fn array_by_name(&self, name: &str) -> Option<&DataArray> {
        self.index_of(name).map(|i| &self.arrays[i])
    }

    /// Marks the array at `idx` with the given role.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn set_active(&mut self, attr: Attribute, idx: usize) {
        assert!(idx < self.arrays.len(), "active attribute index out of bounds");
        self.active[attr.slot()] = Some(idx);
    }

    pub fn active_index(&self, attr: Attribute) -> Option<usize> {
        self.active[attr.slot()]
    }

    pub fn active(&self, attr: Attribute) -> Option<&DataArray> {
        self.active_index(attr).map(|i| &self.arrays[i])
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Sum of the component counts of all arrays.
    pub fn num_components(&self) -> usize {
        self.arrays.iter().map(|a| a.num_components()).sum()
    }
}
