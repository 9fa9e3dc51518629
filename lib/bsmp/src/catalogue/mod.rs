//! Typed registries of Variables, Groups, Curves and Functions (§3, §4.2).
//! Grounded on the append-only `Vec<Channel>` + capacity-checked insertion
//! pattern of `net/endpoint.rs`'s `Endpoint`.

pub mod curve;
pub mod function;
pub mod group;
pub mod variable;

use crate::error::{Error, Result};
use crate::wire::{MAX_CURVES, MAX_FUNCTIONS, MAX_GROUPS, MAX_VARIABLES};
use curve::{Curve, CurveId};
use function::{Function, FuncId};
use group::{Group, GroupId};
use variable::{VarId, Variable};

/// The server's catalogue: four append-only (save for groups) ordered
/// registries, each assigning ids monotonically from 0 (§4.2 step 4, P1).
pub struct Catalogue {
    variables: Vec<Variable>,
    groups: Vec<Group>,
    curves: Vec<Curve>,
    functions: Vec<Function>,
}

impl Catalogue {
    /// Construct a catalogue with the three standard groups already present
    /// (ALL, READ_ONLY, WRITABLE — P4).
    pub fn new() -> Catalogue {
        Catalogue {
            variables: Vec::new(),
            groups: vec![
                Group::new(GroupId::ALL),
                Group::new(GroupId::READ_ONLY),
                Group::new(GroupId::WRITABLE),
            ],
            curves: Vec::new(),
            functions: Vec::new(),
        }
    }

    // -- variables --------------------------------------------------------

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.0 as usize)
    }

    pub(crate) fn variable_mut(&mut self, id: VarId) -> Option<&mut Variable> {
        self.variables.get_mut(id.0 as usize)
    }

    /// Register a variable. Assigns the next id, appends it to the
    /// catalogue, and appends it to `ALL` plus `WRITABLE`/`READ_ONLY`
    /// (§4.2).
    pub fn register_variable(&mut self, mut variable: Variable) -> Result<VarId> {
        if self.variables.len() >= MAX_VARIABLES {
            return Err(Error::OutOfMemory);
        }

        let id = VarId(self.variables.len() as u8);
        variable.set_id(id);
        let size = variable.size();
        let writable = variable.writable();

        self.variables.push(variable);

        self.groups[GroupId::ALL.0 as usize].push_member(id, size, writable);
        if writable {
            self.groups[GroupId::WRITABLE.0 as usize].push_member(id, size, writable);
        } else {
            self.groups[GroupId::READ_ONLY.0 as usize].push_member(id, size, writable);
        }

        Ok(id)
    }

    // -- groups -------------------------------------------------------------

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0 as usize)
    }

    /// `GROUP_CREATE` (§4.4): validates and appends a new group in one pass
    /// over `ids`, matching the original's check order (empty/over-count,
    /// then capacity, then per-id bounds and strictly-ascending order).
    pub fn create_group(&mut self, ids: &[VarId]) -> std::result::Result<GroupId, GroupCreateError> {
        if ids.is_empty() || ids.len() > self.variables.len() {
            return Err(GroupCreateError::InvalidPayloadSize);
        }
        if self.groups.len() >= MAX_GROUPS {
            return Err(GroupCreateError::OutOfMemory);
        }

        let new_id = GroupId(self.groups.len() as u8);
        let mut group = Group::new(new_id);

        let mut previous: Option<VarId> = None;
        for &var_id in ids {
            let variable = self
                .variables
                .get(var_id.0 as usize)
                .ok_or(GroupCreateError::InvalidId)?;

            if let Some(prev) = previous {
                if var_id.0 <= prev.0 {
                    return Err(GroupCreateError::InvalidId);
                }
            }
            previous = Some(var_id);

            group.push_member(var_id, variable.size(), variable.writable());
        }

        self.groups.push(group);
        Ok(new_id)
    }

    /// `GROUP_REMOVE_ALL` (§4.4): truncate back to the three standard
    /// groups (P4).
    pub fn remove_all_groups(&mut self) {
        self.groups.truncate(GroupId::STANDARD_COUNT);
    }

    // -- curves ---------------------------------------------------------

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn curve(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(id.0 as usize)
    }

    pub(crate) fn curve_mut(&mut self, id: CurveId) -> Option<&mut Curve> {
        self.curves.get_mut(id.0 as usize)
    }

    pub fn register_curve(&mut self, mut curve: Curve) -> Result<CurveId> {
        if self.curves.len() >= MAX_CURVES {
            return Err(Error::OutOfMemory);
        }

        let id = CurveId(self.curves.len() as u8);
        curve.set_id(id);
        self.curves.push(curve);
        Ok(id)
    }

    // -- functions --------------------------------------------------------

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub(crate) fn function_mut(&mut self, id: FuncId) -> Option<&mut Function> {
        self.functions.get_mut(id.0 as usize)
    }

    pub fn register_function(&mut self, mut function: Function) -> Result<FuncId> {
        if self.functions.len() >= MAX_FUNCTIONS {
            return Err(Error::OutOfMemory);
        }

        let id = FuncId(self.functions.len() as u8);
        function.set_id(id);
        self.functions.push(function);
        Ok(id)
    }
}

impl Default for Catalogue {
    fn default() -> Catalogue {
        Catalogue::new()
    }
}

/// Rejection reasons for `GROUP_CREATE`, distinct from [`Error`] because
/// they map directly onto wire response codes (§4.4) rather than embedder
/// registration errors.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GroupCreateError {
    InvalidPayloadSize,
    OutOfMemory,
    InvalidId,
}
