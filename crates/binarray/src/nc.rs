//! NetCDF backing for [`ArrayReader`].
//!
//! Every variable is one-dimensional. `short`, `int`, `float` and `double`
//! variables map onto [`ArrayData`]; anything else is reported as
//! [`ArrayError::InvalidData`]. Text attributes are the only attributes read.

use std::collections::BTreeMap;
use std::path::Path;

use netcdf::types::{BasicType, VariableType};
use netcdf::{AttributeValue, NcPutGet};

use crate::{ArrayData, ArrayError, ArrayReader, DataType, MemArrays};

/// Deflate level used when writing compressed variables.
const DEFLATE_LEVEL: i32 = 6;

/// NetCDF file opened for reading.
pub struct NcArrays {
    file: Option<netcdf::File>,
}

impl NcArrays {
    /// Open a NetCDF file (classic or NetCDF-4).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArrayError> {
        Ok(Self { file: Some(netcdf::open(path.as_ref())?) })
    }

    #[inline] pub fn is_closed(&self) -> bool { self.file.is_none() }

    fn file(&self) -> Result<&netcdf::File, ArrayError> {
        self.file.as_ref().ok_or(ArrayError::Closed)
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>, ArrayError> {
        self.file()?.variable(name)
            .ok_or_else(|| ArrayError::UnknownVariable(name.to_string()))
    }
}

impl std::fmt::Debug for NcArrays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcArrays").field("closed", &self.is_closed()).finish()
    }
}

fn data_type(var: &netcdf::Variable<'_>) -> Result<DataType, ArrayError> {
    match var.vartype() {
        VariableType::Basic(BasicType::Short) => Ok(DataType::I16),
        VariableType::Basic(BasicType::Int) => Ok(DataType::I32),
        VariableType::Basic(BasicType::Float | BasicType::Double) => Ok(DataType::F64),
        _ => Err(ArrayError::InvalidData(format!("{} has an unsupported element type", var.name()))),
    }
}

fn text(name: &str, value: AttributeValue) -> Result<String, ArrayError> {
    match value {
        AttributeValue::Str(s) => Ok(s),
        _ => Err(ArrayError::InvalidData(format!("attribute {name} is not text"))),
    }
}

impl ArrayReader for NcArrays {
    fn attribute(&mut self, var: Option<&str>, name: &str) -> Result<String, ArrayError> {
        let value = match var {
            None => self.file()?.attribute(name).map(|a| a.value()),
            Some(var) => self.variable(var)?.attribute(name).map(|a| a.value()),
        };
        let value = value.ok_or_else(|| ArrayError::UnknownAttribute(name.to_string()))?;
        text(name, value?)
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variable(name).is_ok()
    }

    fn len(&self, name: &str) -> Result<usize, ArrayError> {
        Ok(self.variable(name)?.len())
    }

    fn read_array(&mut self, name: &str, start: usize, count: usize) -> Result<ArrayData, ArrayError> {
        let var = self.variable(name)?;
        let len = var.len();
        let end = start.checked_add(count)
            .filter(|&end| end <= len)
            .ok_or_else(|| ArrayError::OutOfBounds { name: name.to_string(), start, count, len })?;

        let ty = data_type(&var)?;
        if count == 0 {
            return Ok(match ty {
                DataType::I16 => ArrayData::I16(Vec::new()),
                DataType::I32 => ArrayData::I32(Vec::new()),
                DataType::F64 => ArrayData::F64(Vec::new()),
            });
        }
        Ok(match ty {
            DataType::I16 => ArrayData::I16(var.get_values::<i16, _>([start..end])?),
            DataType::I32 => ArrayData::I32(var.get_values::<i32, _>([start..end])?),
            DataType::F64 => ArrayData::F64(var.get_values::<f64, _>([start..end])?),
        })
    }

    fn close(&mut self) -> Result<(), ArrayError> {
        self.file = None;
        Ok(())
    }
}

/// Write every variable and attribute of `arrays` to a new NetCDF-4 file
/// at `path`, deflating each variable when `compress` is set.
///
/// Each variable gets its own dimension named `<variable>_dim`.
pub fn write(arrays: &MemArrays, path: impl AsRef<Path>, compress: bool) -> Result<(), ArrayError> {
    let mut file = netcdf::create(path.as_ref())?;
    for (name, value) in arrays.attributes() {
        file.add_attribute(name, value.to_string())?;
    }
    for (name, var) in arrays.variables() {
        let Some(data) = &var.data else { continue };
        match data {
            ArrayData::I16(v) => put(&mut file, name, v, &var.attrs, compress)?,
            ArrayData::I32(v) => put(&mut file, name, v, &var.attrs, compress)?,
            ArrayData::F64(v) => put(&mut file, name, v, &var.attrs, compress)?,
        }
    }
    Ok(())
}

fn put<T: NcPutGet>(
    file: &mut netcdf::FileMut,
    name: &str,
    values: &[T],
    attrs: &BTreeMap<String, String>,
    compress: bool,
) -> Result<(), ArrayError> {
    let dim = format!("{name}_dim");
    // length 0 declares an unlimited dimension, which reads back empty
    file.add_dimension(&dim, values.len())?;
    let mut var = file.add_variable::<T>(name, &[dim.as_str()])?;
    if compress {
        var.compression(DEFLATE_LEVEL, false)?;
    }
    for (key, value) in attrs {
        var.put_attribute(key, value.to_string())?;
    }
    if !values.is_empty() {
        var.put_values(values, [0..values.len()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(compress: bool) -> (tempfile::TempDir, NcArrays) {
        let mut mem = MemArrays::new();
        mem.set_attribute("title", "test")
            .put("a", vec![1i32, 2, 3, 4, 5])
            .put("b", vec![0.5f64, -0.25])
            .put("c", vec![7i16, 8, 9])
            .put("empty", Vec::<i32>::new());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.nc");
        write(&mem, &path, compress).unwrap();
        let nc = NcArrays::open(&path).unwrap();
        (dir, nc)
    }

    #[test]
    fn reads_slices() {
        let (_dir, mut nc) = written(false);
        assert_eq!(nc.read_i32("a", 2, 3).unwrap(), vec![3, 4, 5]);
        assert_eq!(nc.read_f64("b", 1, 1).unwrap(), vec![-0.25]);
        assert_eq!(nc.read_i16("c", 0, 3).unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn compressed_slices_match_uncompressed() {
        let (_plain_dir, mut plain) = written(false);
        let (_packed_dir, mut packed) = written(true);
        for (name, start, count) in [("a", 1, 3), ("c", 2, 1), ("b", 0, 2)] {
            assert_eq!(
                plain.read_array(name, start, count).unwrap(),
                packed.read_array(name, start, count).unwrap(),
            );
        }
    }

    #[test]
    fn slices_past_the_end_are_rejected() {
        let (_dir, mut nc) = written(false);
        assert!(nc.read_i32("a", 5, 0).unwrap().is_empty());
        assert!(matches!(nc.read_i32("a", 5, 1), Err(ArrayError::OutOfBounds { len: 5, .. })));
        assert!(matches!(nc.read_i32("a", usize::MAX, 2), Err(ArrayError::OutOfBounds { .. })));
        assert!(matches!(nc.read_i32("a", 2, usize::MAX), Err(ArrayError::OutOfBounds { .. })));
    }

    #[test]
    fn empty_variable_reads_back_empty() {
        let (_dir, mut nc) = written(true);
        assert_eq!(nc.len("empty").unwrap(), 0);
        assert!(nc.read_i32("empty", 0, 0).unwrap().is_empty());
    }

    #[test]
    fn closing_drops_the_file() {
        let (_dir, mut nc) = written(false);
        nc.read_i32("a", 0, 1).unwrap();
        nc.close().unwrap();
        assert!(nc.is_closed());
        assert!(matches!(nc.read_i32("a", 0, 1), Err(ArrayError::Closed)));
        assert!(matches!(nc.attribute(None, "title"), Err(ArrayError::Closed)));
        assert!(!nc.has_variable("a"));
    }
}
