//! Named, typed one-dimensional arrays plus free-form text attributes.
//!
//! Binned coastline databases ship as NetCDF files: callers open a file,
//! fetch scalars and array slices by variable name, and close it. Two
//! implementations of [`ArrayReader`] are provided:
//!
//! * [`MemArrays`]: everything held in memory, used to build databases and
//!   as a test fixture.
//! * `NcArrays`: a NetCDF file, behind the `netcdf` feature. The same
//!   feature provides `write`, which stores a [`MemArrays`] as NetCDF.

pub mod array;
pub mod error;
pub mod mem;
#[cfg(feature = "netcdf")]
mod nc;

pub use array::{ArrayData, DataType};
pub use error::ArrayError;
pub use mem::MemArrays;
#[cfg(feature = "netcdf")]
pub use nc::{write, NcArrays};

/// Read access to a container of named arrays.
///
/// Reads take `&mut self` so file-backed readers may cache or seek.
/// The typed helpers widen integer storage the way NetCDF readers do: an
/// `i16` variable may be read as `i32` or `f64`, an `i32` variable as `f64`.
pub trait ArrayReader {
    /// Text attribute attached to `var`, or a global attribute when `var`
    /// is `None`.
    fn attribute(&mut self, var: Option<&str>, name: &str) -> Result<String, ArrayError>;

    /// Returns `true` if a variable with this name exists.
    fn has_variable(&self, name: &str) -> bool;

    /// Number of elements stored in `name`.
    fn len(&self, name: &str) -> Result<usize, ArrayError>;

    /// Read `count` elements of `name` starting at element `start`.
    fn read_array(&mut self, name: &str, start: usize, count: usize) -> Result<ArrayData, ArrayError>;

    /// Release the underlying resource. Further reads fail with
    /// [`ArrayError::Closed`].
    fn close(&mut self) -> Result<(), ArrayError> { Ok(()) }

    /// First element of `name` as an integer.
    fn read_scalar(&mut self, name: &str) -> Result<i64, ArrayError> {
        match self.read_array(name, 0, 1)? {
            ArrayData::I16(v) => Ok(v[0] as i64),
            ArrayData::I32(v) => Ok(v[0] as i64),
            ArrayData::F64(v) if v[0].fract() == 0.0 => Ok(v[0] as i64),
            ArrayData::F64(_) => Err(ArrayError::TypeMismatch {
                name: name.to_string(),
                expected: DataType::I32,
                found: DataType::F64,
            }),
        }
    }

    /// Read a slice of an `i16` variable.
    fn read_i16(&mut self, name: &str, start: usize, count: usize) -> Result<Vec<i16>, ArrayError> {
        match self.read_array(name, start, count)? {
            ArrayData::I16(v) => Ok(v),
            other => Err(ArrayError::TypeMismatch {
                name: name.to_string(),
                expected: DataType::I16,
                found: other.data_type(),
            }),
        }
    }

    /// Read a slice of an `i16` or `i32` variable as `i32`.
    fn read_i32(&mut self, name: &str, start: usize, count: usize) -> Result<Vec<i32>, ArrayError> {
        match self.read_array(name, start, count)? {
            ArrayData::I16(v) => Ok(v.into_iter().map(i32::from).collect()),
            ArrayData::I32(v) => Ok(v),
            other => Err(ArrayError::TypeMismatch {
                name: name.to_string(),
                expected: DataType::I32,
                found: other.data_type(),
            }),
        }
    }

    /// Read a slice of any variable as `f64`.
    fn read_f64(&mut self, name: &str, start: usize, count: usize) -> Result<Vec<f64>, ArrayError> {
        Ok(self.read_array(name, start, count)?.into_f64())
    }
}

impl<T: ArrayReader + ?Sized> ArrayReader for Box<T> {
    fn attribute(&mut self, var: Option<&str>, name: &str) -> Result<String, ArrayError> {
        (**self).attribute(var, name)
    }

    fn has_variable(&self, name: &str) -> bool { (**self).has_variable(name) }

    fn len(&self, name: &str) -> Result<usize, ArrayError> { (**self).len(name) }

    fn read_array(&mut self, name: &str, start: usize, count: usize) -> Result<ArrayData, ArrayError> {
        (**self).read_array(name, start, count)
    }

    fn close(&mut self) -> Result<(), ArrayError> { (**self).close() }
}
