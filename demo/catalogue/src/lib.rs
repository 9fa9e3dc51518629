//! A small sample catalogue: two variables (one guarded by a validator),
//! one in-memory curve, and one arithmetic function. Demonstrates wiring
//! an embedder's own storage and capability objects into a [`bsmp::Server`],
//! the way `gamecore` wires its own components into a `t51core` world.

use bsmp::catalogue::curve::{Curve, ReadBlock, WriteBlock};
use bsmp::catalogue::function::{Callable, Function};
use bsmp::catalogue::variable::{ValueValidator, Variable};
use bsmp::Server;
use std::cell::RefCell;
use std::rc::Rc;

/// Rejects odd first bytes; demonstrates a variable with a non-trivial
/// write-admission rule.
struct EvenFirstByte;

impl ValueValidator for EvenFirstByte {
    fn validate(&self, proposed: &[u8]) -> bool {
        proposed.first().is_some_and(|b| b % 2 == 0)
    }
}

/// Block storage for the sample curve, shared between its read and write
/// capabilities.
struct CurveStore(Rc<RefCell<Vec<u8>>>);

impl ReadBlock for CurveStore {
    fn read_block(&self, block: u32, out: &mut [u8]) -> usize {
        let store = self.0.borrow();
        let start = block as usize * out.len();
        if start >= store.len() {
            return 0;
        }
        let end = (start + out.len()).min(store.len());
        let n = end - start;
        out[..n].copy_from_slice(&store[start..end]);
        n
    }
}

impl WriteBlock for CurveStore {
    fn write_block(&mut self, block: u32, data: &[u8]) {
        let mut store = self.0.borrow_mut();
        let start = block as usize * data.len();
        if store.len() < start + data.len() {
            store.resize(start + data.len(), 0);
        }
        store[start..start + data.len()].copy_from_slice(data);
    }
}

/// Adds two bytes; reports a domain error (code 1) on overflow instead of
/// wrapping, to exercise `FUNC_ERROR`.
struct CheckedAdd;

impl Callable for CheckedAdd {
    fn call(&mut self, input: &[u8], output: &mut [u8]) -> u8 {
        match input[0].checked_add(input[1]) {
            Some(sum) => {
                output[0] = sum;
                0
            }
            None => 1,
        }
    }
}

pub fn build_demo_server() -> Server {
    let mut server = Server::new();

    server
        .register_variable(Variable::new(4, true).expect("valid size"))
        .expect("capacity available");
    server
        .register_variable(
            Variable::new(1, true)
                .expect("valid size")
                .with_validator(Box::new(EvenFirstByte)),
        )
        .expect("capacity available");
    server
        .register_variable(Variable::new(2, false).expect("valid size"))
        .expect("capacity available");

    let store = Rc::new(RefCell::new(vec![0u8; 4 * 8]));
    server
        .register_curve(
            Curve::new(
                4,
                8,
                true,
                Box::new(CurveStore(store.clone())),
                Some(Box::new(CurveStore(store))),
            )
            .expect("valid curve parameters"),
        )
        .expect("capacity available");

    server
        .register_function(Function::new(2, 1, Box::new(CheckedAdd)).expect("valid arity"))
        .expect("capacity available");

    server
}
