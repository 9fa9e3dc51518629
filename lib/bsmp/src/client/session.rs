//! The client session: discovery, descriptor cache, and typed operations
//! (§4.8). Grounded on `client.c`'s `bsmp_client_t` (a transport pair plus
//! cached lists refreshed by discovery commands) and on the
//! `net/`-module convention of a capability-backed session wrapping a
//! duplex channel.

use super::descriptor::{CurveDescriptor, FunctionDescriptor, GroupDescriptor, VariableDescriptor};
use super::error::{Error, Result};
use super::transport::Transport;
use crate::binops::BinOp;
use crate::catalogue::curve::CurveId;
use crate::catalogue::function::FuncId;
use crate::catalogue::group::GroupId;
use crate::catalogue::variable::VarId;
use crate::codec;
use crate::server::Version;
use crate::wire::{Code, MAX_MESSAGE};
use bsmp_support::logging::{self, info, Logger};

/// The outcome of `FUNC_EXECUTE`: either the declared output bytes or the
/// callee's 1-byte domain error code (§4.6).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FuncOutcome {
    Return(Vec<u8>),
    Error(u8),
}

pub struct Session<T: Transport> {
    transport: T,
    version: Version,
    variables: Vec<VariableDescriptor>,
    groups: Vec<GroupDescriptor>,
    curves: Vec<CurveDescriptor>,
    functions: Vec<FunctionDescriptor>,
    initialized: bool,
    log: Logger,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Session<T> {
        Session {
            transport,
            version: Version::default(),
            variables: Vec::new(),
            groups: Vec::new(),
            curves: Vec::new(),
            functions: Vec::new(),
            initialized: false,
            log: logging::discard(),
        }
    }

    pub fn with_logger(mut self, log: Logger) -> Session<T> {
        self.log = log;
        self
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn get_vars(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    pub fn get_groups(&self) -> &[GroupDescriptor] {
        &self.groups
    }

    pub fn get_curves(&self) -> &[CurveDescriptor] {
        &self.curves
    }

    pub fn get_funcs(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    // -- discovery ----------------------------------------------------

    /// Connect-time discovery (§4.8): version, then variables, groups
    /// (and member lists), curves (and checksums), functions.
    pub fn init(&mut self) -> Result<()> {
        self.discover_version()?;
        self.discover_variables()?;
        self.discover_groups()?;
        self.discover_curves()?;
        self.discover_functions()?;
        self.initialized = true;
        info!(self.log, "session initialized"; "version" => %self.version.text);
        Ok(())
    }

    fn discover_version(&mut self) -> Result<()> {
        let mut out = [0u8; 3];
        match self.exchange_raw(Code::QueryVersion, &[], &mut out) {
            Ok((Code::QueryVersion, 3)) => {
                self.version = Version {
                    major: out[0],
                    minor: out[1],
                    revision: out[2],
                    text: format!("{}.{:02}.{:03}", out[0], out[1], out[2]),
                };
            }
            Ok((Code::OpNotSupported, _)) => {
                self.version = Version {
                    major: 1,
                    minor: 0,
                    revision: 0,
                    text: "1.00.000".into(),
                };
            }
            Ok(_) | Err(_) => return Err(Error::Comm),
        }
        Ok(())
    }

    fn discover_variables(&mut self) -> Result<()> {
        let mut out = vec![0u8; MAX_MESSAGE];
        let n = self.exchange(Code::VarQueryList, &[], Code::VarList, &mut out)?;
        self.variables = out[..n]
            .iter()
            .enumerate()
            .map(|(i, &byte)| {
                let writable = byte & 0x80 != 0;
                let size = match byte & 0x7F {
                    0 => 128,
                    s => s as usize,
                };
                VariableDescriptor {
                    id: VarId(i as u8),
                    size,
                    writable,
                }
            })
            .collect();
        Ok(())
    }

    fn discover_groups(&mut self) -> Result<()> {
        let mut list = vec![0u8; MAX_MESSAGE];
        let n = self.exchange(Code::GroupQueryList, &[], Code::GroupList, &mut list)?;

        let mut groups = Vec::with_capacity(n);
        for (i, &byte) in list[..n].iter().enumerate() {
            let id = GroupId(i as u8);
            let writable_flag = byte & 0x80 != 0;

            let mut member_buf = vec![0u8; MAX_MESSAGE];
            let m = self.exchange(Code::GroupQuery, &[id.0], Code::Group, &mut member_buf)?;
            let members: Vec<VarId> = member_buf[..m].iter().map(|&b| VarId(b)).collect();

            let size = members
                .iter()
                .map(|member| {
                    self.variables
                        .get(member.0 as usize)
                        .map(|v| v.size)
                        .unwrap_or(0)
                })
                .sum();

            groups.push(GroupDescriptor {
                id,
                members,
                size,
                writable: writable_flag,
            });
        }
        self.groups = groups;
        Ok(())
    }

    fn discover_curves(&mut self) -> Result<()> {
        let mut list = vec![0u8; MAX_MESSAGE];
        let n = self.exchange(Code::CurveQueryList, &[], Code::CurveList, &mut list)?;

        let mut curves = Vec::new();
        for (i, record) in list[..n].chunks_exact(5).enumerate() {
            let id = CurveId(i as u8);
            let writable = record[0] & 0x80 != 0;
            let block_size = u16::from_be_bytes([record[1], record[2]]) as usize;
            let nblocks_field = u16::from_be_bytes([record[3], record[4]]);
            let nblocks = if nblocks_field == 0 {
                65_536
            } else {
                nblocks_field as u32
            };

            let mut csum_buf = [0u8; 16];
            let m = self.exchange(Code::CurveQueryCsum, &[id.0], Code::CurveCsum, &mut csum_buf)?;
            if m != 16 {
                return Err(Error::Comm);
            }

            curves.push(CurveDescriptor {
                id,
                writable,
                block_size,
                nblocks,
                checksum: csum_buf,
            });
        }
        self.curves = curves;
        Ok(())
    }

    fn discover_functions(&mut self) -> Result<()> {
        let mut out = vec![0u8; MAX_MESSAGE];
        let n = self.exchange(Code::FuncQueryList, &[], Code::FuncList, &mut out)?;
        self.functions = out[..n]
            .iter()
            .enumerate()
            .map(|(i, &byte)| FunctionDescriptor {
                id: FuncId(i as u8),
                input_size: (byte >> 4) as usize,
                output_size: (byte & 0x0F) as usize,
            })
            .collect();
        Ok(())
    }

    // -- variable operations --------------------------------------------

    pub fn read_var(&mut self, descriptor: &VariableDescriptor) -> Result<Vec<u8>> {
        self.require_initialized()?;
        self.lookup_var(descriptor)?;

        let mut out = vec![0u8; descriptor.size];
        let n = self.exchange(Code::VarRead, &[descriptor.id.0], Code::VarValue, &mut out)?;
        if n != descriptor.size {
            return Err(Error::Comm);
        }
        Ok(out)
    }

    pub fn write_var(&mut self, descriptor: &VariableDescriptor, bytes: &[u8]) -> Result<()> {
        self.require_initialized()?;
        self.lookup_var(descriptor)?;
        if !descriptor.writable {
            return Err(Error::ParamInvalid("variable is read-only"));
        }
        if bytes.len() != descriptor.size {
            return Err(Error::ParamOutOfRange("value size"));
        }

        let mut payload = Vec::with_capacity(1 + bytes.len());
        payload.push(descriptor.id.0);
        payload.extend_from_slice(bytes);

        self.exchange(Code::VarWrite, &payload, Code::Ok, &mut [])?;
        Ok(())
    }

    pub fn write_read_vars(
        &mut self,
        write: &VariableDescriptor,
        read: &VariableDescriptor,
        bytes: &[u8],
    ) -> Result<Vec<u8>> {
        self.require_initialized()?;
        self.lookup_var(write)?;
        self.lookup_var(read)?;
        if !write.writable {
            return Err(Error::ParamInvalid("variable is read-only"));
        }
        if bytes.len() != write.size {
            return Err(Error::ParamOutOfRange("value size"));
        }

        let mut payload = Vec::with_capacity(2 + bytes.len());
        payload.push(write.id.0);
        payload.push(read.id.0);
        payload.extend_from_slice(bytes);

        let mut out = vec![0u8; read.size];
        let n = self.exchange(Code::VarWriteRead, &payload, Code::VarValue, &mut out)?;
        if n != read.size {
            return Err(Error::Comm);
        }
        Ok(out)
    }

    pub fn bin_op_var(&mut self, descriptor: &VariableDescriptor, op: BinOp, mask: &[u8]) -> Result<()> {
        self.require_initialized()?;
        self.lookup_var(descriptor)?;
        if !descriptor.writable {
            return Err(Error::ParamInvalid("variable is read-only"));
        }
        if mask.len() != descriptor.size {
            return Err(Error::ParamOutOfRange("mask size"));
        }

        let mut payload = Vec::with_capacity(2 + mask.len());
        payload.push(descriptor.id.0);
        payload.push(op.to_byte());
        payload.extend_from_slice(mask);

        self.exchange(Code::VarBinOp, &payload, Code::Ok, &mut [])?;
        Ok(())
    }

    // -- group operations -------------------------------------------------

    pub fn read_group(&mut self, descriptor: &GroupDescriptor) -> Result<Vec<u8>> {
        self.require_initialized()?;
        self.lookup_group(descriptor)?;

        let mut out = vec![0u8; descriptor.size];
        let n = self.exchange(Code::GroupRead, &[descriptor.id.0], Code::GroupValues, &mut out)?;
        if n != descriptor.size {
            return Err(Error::Comm);
        }
        Ok(out)
    }

    pub fn write_group(&mut self, descriptor: &GroupDescriptor, bytes: &[u8]) -> Result<()> {
        self.require_initialized()?;
        self.lookup_group(descriptor)?;
        if !descriptor.writable {
            return Err(Error::ParamInvalid("group is read-only"));
        }
        if bytes.len() != descriptor.size {
            return Err(Error::ParamOutOfRange("value size"));
        }

        let mut payload = Vec::with_capacity(1 + bytes.len());
        payload.push(descriptor.id.0);
        payload.extend_from_slice(bytes);

        self.exchange(Code::GroupWrite, &payload, Code::Ok, &mut [])?;
        Ok(())
    }

    pub fn bin_op_group(&mut self, descriptor: &GroupDescriptor, op: BinOp, mask: &[u8]) -> Result<()> {
        self.require_initialized()?;
        self.lookup_group(descriptor)?;
        if !descriptor.writable {
            return Err(Error::ParamInvalid("group is read-only"));
        }
        if mask.len() != descriptor.size {
            return Err(Error::ParamOutOfRange("mask size"));
        }

        let mut payload = Vec::with_capacity(2 + mask.len());
        payload.push(descriptor.id.0);
        payload.push(op.to_byte());
        payload.extend_from_slice(mask);

        self.exchange(Code::GroupBinOp, &payload, Code::Ok, &mut [])?;
        Ok(())
    }

    pub fn create_group(&mut self, ids: &[VarId]) -> Result<GroupId> {
        self.require_initialized()?;
        if ids.is_empty() {
            return Err(Error::ParamInvalid("empty id list"));
        }

        let payload: Vec<u8> = ids.iter().map(|id| id.0).collect();
        self.exchange(Code::GroupCreate, &payload, Code::Ok, &mut [])?;
        self.discover_groups()?;

        self.groups
            .last()
            .map(|g| g.id)
            .ok_or(Error::Comm)
    }

    pub fn remove_all_groups(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.exchange(Code::GroupRemoveAll, &[], Code::Ok, &mut [])?;
        self.discover_groups()
    }

    // -- curve operations -------------------------------------------------

    pub fn request_curve_block(&mut self, descriptor: &CurveDescriptor, offset: u32) -> Result<Vec<u8>> {
        self.require_initialized()?;
        self.lookup_curve(descriptor)?;
        if offset >= descriptor.nblocks {
            return Err(Error::ParamOutOfRange("block offset"));
        }

        let mut payload = [0u8; 3];
        payload[0] = descriptor.id.0;
        payload[1..3].copy_from_slice(&(offset as u16).to_be_bytes());

        let mut out = vec![0u8; 3 + descriptor.block_size];
        let n = self.exchange(Code::CurveBlockRequest, &payload, Code::CurveBlock, &mut out)?;
        let off_be = (offset as u16).to_be_bytes();

        if n < 3 || out[0] != descriptor.id.0 || out[1] != off_be[0] || out[2] != off_be[1] {
            return Err(Error::Comm);
        }
        Ok(out[3..n].to_vec())
    }

    /// Whole-curve read: successive block requests, stopping at a short
    /// block (§4.8).
    pub fn read_curve(&mut self, descriptor: &CurveDescriptor) -> Result<Vec<u8>> {
        self.require_initialized()?;
        self.lookup_curve(descriptor)?;

        let mut out = Vec::with_capacity(descriptor.block_size * descriptor.nblocks as usize);
        for offset in 0..descriptor.nblocks {
            let block = self.request_curve_block(descriptor, offset)?;
            let short = block.len() < descriptor.block_size;
            out.extend_from_slice(&block);
            if short {
                break;
            }
        }
        Ok(out)
    }

    pub fn send_curve_block(&mut self, descriptor: &CurveDescriptor, offset: u32, bytes: &[u8]) -> Result<()> {
        self.require_initialized()?;
        self.lookup_curve(descriptor)?;
        if !descriptor.writable {
            return Err(Error::ParamInvalid("curve is read-only"));
        }
        if offset >= descriptor.nblocks {
            return Err(Error::ParamOutOfRange("block offset"));
        }
        if bytes.len() > descriptor.block_size {
            return Err(Error::ParamOutOfRange("block size"));
        }

        let mut payload = Vec::with_capacity(3 + bytes.len());
        payload.push(descriptor.id.0);
        payload.extend_from_slice(&(offset as u16).to_be_bytes());
        payload.extend_from_slice(bytes);

        self.exchange(Code::CurveBlock, &payload, Code::Ok, &mut [])?;
        Ok(())
    }

    /// Whole-curve write: chunk `data` into `block_size` slices (§4.8).
    pub fn write_curve(&mut self, descriptor: &CurveDescriptor, data: &[u8]) -> Result<()> {
        self.require_initialized()?;
        for (offset, chunk) in data.chunks(descriptor.block_size).enumerate() {
            self.send_curve_block(descriptor, offset as u32, chunk)?;
        }
        Ok(())
    }

    pub fn recalc_checksum(&mut self, descriptor: &CurveDescriptor) -> Result<[u8; 16]> {
        self.require_initialized()?;
        self.lookup_curve(descriptor)?;

        let mut out = [0u8; 16];
        let n = self.exchange(Code::CurveRecalcCsum, &[descriptor.id.0], Code::CurveCsum, &mut out)?;
        if n != 16 {
            return Err(Error::Comm);
        }
        self.discover_curves()?;
        Ok(out)
    }

    // -- function operations ----------------------------------------------

    pub fn func_execute(&mut self, descriptor: &FunctionDescriptor, input: &[u8]) -> Result<FuncOutcome> {
        self.require_initialized()?;
        self.lookup_func(descriptor)?;
        if input.len() != descriptor.input_size {
            return Err(Error::ParamOutOfRange("input size"));
        }

        let mut payload = Vec::with_capacity(1 + input.len());
        payload.push(descriptor.id.0);
        payload.extend_from_slice(input);

        let mut out = vec![0u8; descriptor.output_size.max(1)];
        let (code, n) = self.exchange_raw(Code::FuncExecute, &payload, &mut out)?;
        match code {
            Code::FuncReturn if n == descriptor.output_size => Ok(FuncOutcome::Return(out[..n].to_vec())),
            Code::FuncError if n == 1 => Ok(FuncOutcome::Error(out[0])),
            _ => Err(Error::Comm),
        }
    }

    // -- identity checks ----------------------------------------------------

    fn lookup_var(&self, descriptor: &VariableDescriptor) -> Result<()> {
        match self.variables.get(descriptor.id.0 as usize) {
            Some(cached) if cached == descriptor => Ok(()),
            _ => Err(Error::UnknownDescriptor),
        }
    }

    fn lookup_group(&self, descriptor: &GroupDescriptor) -> Result<()> {
        match self.groups.get(descriptor.id.0 as usize) {
            Some(cached) if cached == descriptor => Ok(()),
            _ => Err(Error::UnknownDescriptor),
        }
    }

    fn lookup_curve(&self, descriptor: &CurveDescriptor) -> Result<()> {
        match self.curves.get(descriptor.id.0 as usize) {
            Some(cached) if cached == descriptor => Ok(()),
            _ => Err(Error::UnknownDescriptor),
        }
    }

    fn lookup_func(&self, descriptor: &FunctionDescriptor) -> Result<()> {
        match self.functions.get(descriptor.id.0 as usize) {
            Some(cached) if cached == descriptor => Ok(()),
            _ => Err(Error::UnknownDescriptor),
        }
    }

    fn require_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::Uninitialized)
        }
    }

    // -- wire plumbing ------------------------------------------------------

    /// One send/recv exchange, rejecting any response whose code isn't
    /// `expect` (§4.8d). Returns the number of payload bytes copied into
    /// `out`.
    fn exchange(&mut self, code: Code, payload: &[u8], expect: Code, out: &mut [u8]) -> Result<usize> {
        let (got, n) = self.exchange_raw(code, payload, out)?;
        if got != expect {
            return Err(Error::Comm);
        }
        Ok(n)
    }

    /// Like `exchange`, but returns the response code as well so callers
    /// that accept more than one success code (version query, function
    /// execute) can branch themselves.
    fn exchange_raw(&mut self, code: Code, payload: &[u8], out: &mut [u8]) -> Result<(Code, usize)> {
        let mut request = vec![0u8; crate::wire::HEADER_SIZE + payload.len()];
        let req_len =
            codec::encode_request(&mut request, code, payload).map_err(|_| Error::ParamOutOfRange("payload"))?;

        if !self.transport.send(&request[..req_len]) {
            return Err(Error::Comm);
        }

        let mut response = vec![0u8; MAX_MESSAGE];
        let Some(resp_len) = self.transport.recv(&mut response) else {
            return Err(Error::Comm);
        };

        let decoded = codec::decode_request(&response[..resp_len]).map_err(|_| Error::Comm)?;
        let response_code = Code::from_u8(decoded.code).ok_or(Error::Comm)?;

        let n = decoded.payload.len().min(out.len());
        out[..n].copy_from_slice(&decoded.payload[..n]);
        Ok((response_code, decoded.payload.len()))
    }
}
