use std::fmt;

/// Element type of a stored variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    I16,
    I32,
    F64,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::I16 => write!(f, "i16"),
            DataType::I32 => write!(f, "i32"),
            DataType::F64 => write!(f, "f64"),
        }
    }
}

/// A typed slice of values read from (or destined for) a container.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F64(Vec<f64>),
}

impl ArrayData {
    #[inline] pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::I16(_) => DataType::I16,
            ArrayData::I32(_) => DataType::I32,
            ArrayData::F64(_) => DataType::F64,
        }
    }

    #[inline] pub fn len(&self) -> usize {
        match self {
            ArrayData::I16(v) => v.len(),
            ArrayData::I32(v) => v.len(),
            ArrayData::F64(v) => v.len(),
        }
    }

    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Copy of the elements in `start..start + count`.
    pub fn slice(&self, start: usize, count: usize) -> ArrayData {
        let range = start..start + count;
        match self {
            ArrayData::I16(v) => ArrayData::I16(v[range].to_vec()),
            ArrayData::I32(v) => ArrayData::I32(v[range].to_vec()),
            ArrayData::F64(v) => ArrayData::F64(v[range].to_vec()),
        }
    }

    /// Widen every element to `f64`.
    pub fn into_f64(self) -> Vec<f64> {
        match self {
            ArrayData::I16(v) => v.into_iter().map(f64::from).collect(),
            ArrayData::I32(v) => v.into_iter().map(f64::from).collect(),
            ArrayData::F64(v) => v,
        }
    }
}

impl From<Vec<i16>> for ArrayData {
    fn from(v: Vec<i16>) -> Self { ArrayData::I16(v) }
}

impl From<Vec<i32>> for ArrayData {
    fn from(v: Vec<i32>) -> Self { ArrayData::I32(v) }
}

impl From<Vec<f64>> for ArrayData {
    fn from(v: Vec<f64>) -> Self { ArrayData::F64(v) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_to_f64() {
        assert_eq!(ArrayData::I32(vec![3, -4]).into_f64(), vec![3.0, -4.0]);
    }

    #[test]
    fn slice_is_a_copy_of_the_range() {
        let data = ArrayData::I32(vec![10, 11, 12, 13]);
        assert_eq!(data.slice(1, 2), ArrayData::I32(vec![11, 12]));
        assert_eq!(data.slice(4, 0), ArrayData::I32(vec![]));
    }
}
