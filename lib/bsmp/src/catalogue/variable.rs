//! Variables: fixed-size addressable byte buffers (§3).

use crate::error::{Error, Result};
use crate::wire::{VARIABLE_MAX_SIZE, VARIABLE_MIN_SIZE};
use std::any::Any;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VarId(pub u8);

/// Given the proposed new bytes, decides whether a write is admissible.
/// Bitwise ops (§4.4 `VAR_BIN_OP`) bypass this check.
pub trait ValueValidator {
    fn validate(&self, proposed: &[u8]) -> bool;
}

/// An addressable byte blob of fixed size, tagged with a writable flag and
/// an optional value validator.
///
/// The original C library stores a raw pointer to caller-owned storage in
/// `struct sllp_var`; a safe Rust rewrite of a catalogue meant to live for
/// the whole lifetime of the server gives the `Variable` its own buffer
/// instead (see DESIGN.md, "Variable buffer ownership").
pub struct Variable {
    id: VarId,
    writable: bool,
    data: Vec<u8>,
    validator: Option<Box<dyn ValueValidator>>,
    tag: Option<Box<dyn Any>>,
}

impl Variable {
    /// Construct a new variable of the given size, not yet registered with
    /// any server. `size` must be in `[1, 128]`.
    pub fn new(size: usize, writable: bool) -> Result<Variable> {
        if !(VARIABLE_MIN_SIZE..=VARIABLE_MAX_SIZE).contains(&size) {
            return Err(Error::ParamOutOfRange("variable size"));
        }

        Ok(Variable {
            id: VarId(0),
            writable,
            data: vec![0u8; size],
            validator: None,
            tag: None,
        })
    }

    pub fn with_validator(mut self, validator: Box<dyn ValueValidator>) -> Variable {
        self.validator = Some(validator);
        self
    }

    pub fn with_tag(mut self, tag: Box<dyn Any>) -> Variable {
        self.tag = Some(tag);
        self
    }

    #[inline]
    pub fn id(&self) -> VarId {
        self.id
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: VarId) {
        self.id = id;
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn tag(&self) -> Option<&(dyn Any)> {
        self.tag.as_deref()
    }

    /// Validate `proposed` against this variable's validator, if any.
    pub fn accepts(&self, proposed: &[u8]) -> bool {
        match &self.validator {
            Some(validator) => validator.validate(proposed),
            None => true,
        }
    }

    /// Overwrite the variable's bytes. Callers are responsible for having
    /// already checked [`Variable::accepts`] and the length match; this is
    /// the unconditional commit step (§5 ordering: validator -> mutation).
    pub(crate) fn set_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.data.len());
        self.data.copy_from_slice(bytes);
    }

    /// Byte-for-byte mutable access used by bin-op handlers, which bypass
    /// the validator entirely (§4.4).
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Encode this variable's VAR_LIST byte: high bit writable, low 7 bits
    /// size (0 encodes size 128, §4.3, B5).
    pub fn list_byte(&self) -> u8 {
        let size_field = if self.data.len() == 128 {
            0
        } else {
            self.data.len() as u8
        };
        (if self.writable { 0x80 } else { 0 }) | size_field
    }
}
