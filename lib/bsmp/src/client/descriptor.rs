//! Cached catalogue descriptors (§3: "the client session exclusively owns
//! its cached catalogue descriptors"). Each mirrors its server-side entity
//! but carries no capability objects — only the bits a client needs to
//! validate and size its own requests.

use crate::catalogue::curve::CurveId;
use crate::catalogue::function::FuncId;
use crate::catalogue::group::GroupId;
use crate::catalogue::variable::VarId;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VariableDescriptor {
    pub id: VarId,
    pub size: usize,
    pub writable: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GroupDescriptor {
    pub id: GroupId,
    pub members: Vec<VarId>,
    pub size: usize,
    pub writable: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CurveDescriptor {
    pub id: CurveId,
    pub writable: bool,
    pub block_size: usize,
    pub nblocks: u32,
    pub checksum: [u8; 16],
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionDescriptor {
    pub id: FuncId,
    pub input_size: usize,
    pub output_size: usize,
}
