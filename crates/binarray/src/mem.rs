use std::collections::BTreeMap;

use crate::{ArrayData, ArrayError, ArrayReader};

/// One stored variable: its values plus per-variable attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    pub data: Option<ArrayData>,
    pub attrs: BTreeMap<String, String>,
}

/// Simple in-memory container.
/// Keys are variable names, e.g. "N_segments_in_a_bin".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemArrays {
    pub(crate) globals: BTreeMap<String, String>,
    pub(crate) vars: BTreeMap<String, Variable>,
    closed: bool,
}

impl MemArrays {
    pub fn new() -> Self { Self::default() }

    /// Set a global text attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.globals.insert(name.to_string(), value.into());
        self
    }

    /// Set a text attribute on an existing or future variable.
    pub fn set_var_attribute(&mut self, var: &str, name: &str, value: impl Into<String>) -> &mut Self {
        self.vars.entry(var.to_string()).or_default()
            .attrs.insert(name.to_string(), value.into());
        self
    }

    /// Store (or replace) the values of `name`.
    pub fn put(&mut self, name: &str, data: impl Into<ArrayData>) -> &mut Self {
        self.vars.entry(name.to_string()).or_default().data = Some(data.into());
        self
    }

    /// Remove a variable, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<ArrayData> {
        self.vars.remove(name).and_then(|v| v.data)
    }

    /// Global attributes in name order.
    #[inline] pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.globals.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variables that hold data, in name order.
    #[inline] pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter()
            .filter(|(_, v)| v.data.is_some())
            .map(|(k, v)| (k.as_str(), v))
    }

    fn data(&self, name: &str) -> Result<&ArrayData, ArrayError> {
        if self.closed { return Err(ArrayError::Closed) }
        self.vars.get(name)
            .and_then(|v| v.data.as_ref())
            .ok_or_else(|| ArrayError::UnknownVariable(name.to_string()))
    }
}

impl ArrayReader for MemArrays {
    fn attribute(&mut self, var: Option<&str>, name: &str) -> Result<String, ArrayError> {
        if self.closed { return Err(ArrayError::Closed) }
        let attrs = match var {
            None => &self.globals,
            Some(var) => &self.vars.get(var)
                .ok_or_else(|| ArrayError::UnknownVariable(var.to_string()))?
                .attrs,
        };
        attrs.get(name).cloned()
            .ok_or_else(|| ArrayError::UnknownAttribute(name.to_string()))
    }

    fn has_variable(&self, name: &str) -> bool {
        self.vars.get(name).is_some_and(|v| v.data.is_some())
    }

    fn len(&self, name: &str) -> Result<usize, ArrayError> {
        Ok(self.data(name)?.len())
    }

    fn read_array(&mut self, name: &str, start: usize, count: usize) -> Result<ArrayData, ArrayError> {
        let data = self.data(name)?;
        if start.checked_add(count).is_none_or(|end| end > data.len()) {
            return Err(ArrayError::OutOfBounds { name: name.to_string(), start, count, len: data.len() });
        }
        Ok(data.slice(start, count))
    }

    fn close(&mut self) -> Result<(), ArrayError> {
        self.closed = true;
        Ok(())
    }
}
