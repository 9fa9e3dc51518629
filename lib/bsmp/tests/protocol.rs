//! End-to-end dispatch tests driving `Server::process_packet` directly with
//! raw frame bytes, covering the testable properties and literal scenarios.

use bsmp::catalogue::curve::{Curve, ReadBlock, WriteBlock};
use bsmp::catalogue::function::{Callable, Function};
use bsmp::catalogue::variable::{ValueValidator, Variable};
use bsmp::wire::MAX_MESSAGE;
use bsmp::Server;

fn exchange(server: &mut Server, request: &[u8]) -> Vec<u8> {
    let mut response = vec![0u8; MAX_MESSAGE];
    let n = server.process_packet(request, &mut response).unwrap();
    response.truncate(n);
    response
}

fn one_writable_variable(size: usize) -> Server {
    let mut server = Server::new();
    server.register_variable(Variable::new(size, true).unwrap()).unwrap();
    server
}

// -- literal end-to-end scenarios (spec §8) --------------------------------

#[test]
fn scenario_1_query_list_of_one_variable_server() {
    let mut server = one_writable_variable(4);
    let response = exchange(&mut server, &[0x02, 0x00, 0x00]);
    assert_eq!(response, vec![0x03, 0x00, 0x01, 0x84]);
}

#[test]
fn scenario_2_read_variable_zero() {
    let mut server = one_writable_variable(4);
    let response = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(response, vec![0x11, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn scenario_3_write_variable_zero() {
    let mut server = one_writable_variable(4);
    let request = [0x20, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04];
    let response = exchange(&mut server, &request);
    assert_eq!(response, vec![0xE0, 0x00, 0x00]);

    let read_back = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(read_back, vec![0x11, 0x00, 0x04, 0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn scenario_4_toggle_low_nibble() {
    let mut server = one_writable_variable(4);
    exchange(
        &mut server,
        &[0x20, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04],
    );

    let request = [0x24, 0x00, 0x06, 0x00, b'T', 0x00, 0x00, 0x00, 0x0F];
    let response = exchange(&mut server, &request);
    assert_eq!(response, vec![0xE0, 0x00, 0x00]);

    let read_back = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(read_back, vec![0x11, 0x00, 0x04, 0x01, 0x02, 0x03, 0x0B]);
}

#[test]
fn scenario_5_write_to_read_only_variable() {
    let mut server = Server::new();
    server.register_variable(Variable::new(4, false).unwrap()).unwrap();

    let request = [0x20, 0x00, 0x05, 0x00, 0x01, 0x02, 0x03, 0x04];
    let response = exchange(&mut server, &request);
    assert_eq!(response, vec![0xE6, 0x00, 0x00]);
}

#[test]
fn scenario_6_unknown_opcode() {
    let mut server = one_writable_variable(4);
    let response = exchange(&mut server, &[0xFE, 0x00, 0x00]);
    assert_eq!(response, vec![0xE2, 0x00, 0x00]);
}

// -- quantified invariants (P1-P4) ------------------------------------------

#[test]
fn p1_variable_ids_are_dense_from_zero() {
    let mut server = Server::new();
    for i in 0..5u8 {
        server.register_variable(Variable::new(1, true).unwrap()).unwrap();
        assert!(server
            .catalogue()
            .variable(bsmp::catalogue::variable::VarId(i))
            .is_some());
    }
    assert!(server
        .catalogue()
        .variable(bsmp::catalogue::variable::VarId(5))
        .is_none());
}

#[test]
fn p4_standard_groups_survive_remove_all() {
    let mut server = one_writable_variable(1);
    exchange(&mut server, &[0x30, 0x00, 0x01, 0x00]); // GROUP_CREATE([0])
    assert_eq!(server.catalogue().groups().len(), 4);

    exchange(&mut server, &[0x32, 0x00, 0x00]); // GROUP_REMOVE_ALL
    assert_eq!(server.catalogue().groups().len(), 3);
    assert!(server.catalogue().group(bsmp::catalogue::group::GroupId(0)).is_some());
    assert!(server.catalogue().group(bsmp::catalogue::group::GroupId(1)).is_some());
    assert!(server.catalogue().group(bsmp::catalogue::group::GroupId(2)).is_some());
}

#[test]
fn p3_group_size_and_writable_are_aggregated() {
    let mut server = Server::new();
    server.register_variable(Variable::new(4, true).unwrap()).unwrap();
    server.register_variable(Variable::new(2, false).unwrap()).unwrap();
    exchange(&mut server, &[0x30, 0x00, 0x02, 0x00, 0x01]); // GROUP_CREATE([0,1])

    let group = server.catalogue().group(bsmp::catalogue::group::GroupId(3)).unwrap();
    assert_eq!(group.size(), 6);
    assert!(!group.writable());
}

// -- round-trip and idempotence laws (L1-L5) --------------------------------

#[test]
fn l1_read_after_write_round_trips() {
    let mut server = one_writable_variable(4);
    exchange(&mut server, &[0x20, 0x00, 0x05, 0x00, 0xAA, 0xBB, 0xCC, 0xDD]);
    let response = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(&response[3..], &[0xAA, 0xBB, 0xCC, 0xDD]);
}

#[test]
fn l2_xor_twice_restores_original() {
    let mut server = one_writable_variable(4);
    exchange(&mut server, &[0x20, 0x00, 0x05, 0x00, 0x10, 0x20, 0x30, 0x40]);

    let toggle = [0x24, 0x00, 0x06, 0x00, b'X', 0x01, 0x02, 0x03, 0x04];
    exchange(&mut server, &toggle);
    exchange(&mut server, &toggle);

    let response = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(&response[3..], &[0x10, 0x20, 0x30, 0x40]);
}

#[test]
fn l3_or_and_set_agree_and_are_not_xor() {
    let mut or_server = one_writable_variable(1);
    let mut set_server = one_writable_variable(1);
    exchange(&mut or_server, &[0x20, 0x00, 0x02, 0x00, 0b1010_1010]);
    exchange(&mut set_server, &[0x20, 0x00, 0x02, 0x00, 0b1010_1010]);

    exchange(&mut or_server, &[0x24, 0x00, 0x03, 0x00, b'O', 0b1100_1100]);
    exchange(&mut set_server, &[0x24, 0x00, 0x03, 0x00, b'S', 0b1100_1100]);

    let or_read = exchange(&mut or_server, &[0x10, 0x00, 0x01, 0x00]);
    let set_read = exchange(&mut set_server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(or_read[3], 0b1110_1110);
    assert_eq!(or_read[3], set_read[3]);
}

#[test]
fn l4_curve_reads_reflect_earlier_writes() {
    let mut server = Server::new();
    struct Backing(std::cell::RefCell<Vec<u8>>);
    impl ReadBlock for Backing {
        fn read_block(&self, block: u32, out: &mut [u8]) -> usize {
            let store = self.0.borrow();
            let start = block as usize * out.len();
            out.copy_from_slice(&store[start..start + out.len()]);
            out.len()
        }
    }
    impl WriteBlock for Backing {
        fn write_block(&mut self, block: u32, data: &[u8]) {
            let mut store = self.0.borrow_mut();
            let start = block as usize * data.len();
            store[start..start + data.len()].copy_from_slice(data);
        }
    }

    let store = std::rc::Rc::new(Backing(std::cell::RefCell::new(vec![0u8; 8])));
    struct Reader(std::rc::Rc<Backing>);
    impl ReadBlock for Reader {
        fn read_block(&self, block: u32, out: &mut [u8]) -> usize {
            self.0.read_block(block, out)
        }
    }
    struct Writer(std::rc::Rc<Backing>);
    impl WriteBlock for Writer {
        fn write_block(&mut self, block: u32, data: &[u8]) {
            self.0.write_block(block, data)
        }
    }

    server
        .register_curve(Curve::new(4, 2, true, Box::new(Reader(store.clone())), Some(Box::new(Writer(store)))).unwrap())
        .unwrap();

    exchange(&mut server, &[0x41, 0x00, 0x07, 0x00, 0x00, 0x00, 0xDE, 0xAD, 0xBE, 0xEF]);
    exchange(&mut server, &[0x41, 0x00, 0x07, 0x00, 0x00, 0x01, 0x01, 0x02, 0x03, 0x04]);

    let block0 = exchange(&mut server, &[0x40, 0x00, 0x03, 0x00, 0x00, 0x00]);
    let block1 = exchange(&mut server, &[0x40, 0x00, 0x03, 0x00, 0x00, 0x01]);
    // response body is id(1) + offset(2, big-endian) + block data.
    assert_eq!(&block0[6..], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(&block1[6..], &[0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn l5_write_read_matches_separate_write_then_read() {
    let mut server = Server::new();
    server.register_variable(Variable::new(2, true).unwrap()).unwrap();
    server.register_variable(Variable::new(2, true).unwrap()).unwrap();

    let response = exchange(&mut server, &[0x28, 0x00, 0x04, 0x00, 0x01, 0xAA, 0xBB]);
    assert_eq!(response, vec![0x11, 0x00, 0x02, 0x00, 0x00]);

    let var0 = exchange(&mut server, &[0x10, 0x00, 0x01, 0x00]);
    assert_eq!(&var0[3..], &[0xAA, 0xBB]);
}

// -- boundary behavior (B1-B5) -----------------------------------------------

#[test]
fn b1_read_unknown_id_is_invalid_id() {
    let mut server = one_writable_variable(4);
    let response = exchange(&mut server, &[0x10, 0x00, 0x01, 0x05]);
    assert_eq!(response, vec![0xE3, 0x00, 0x00]);
}

#[test]
fn b2_write_read_only_variable_is_read_only() {
    let mut server = Server::new();
    server.register_variable(Variable::new(1, false).unwrap()).unwrap();
    let response = exchange(&mut server, &[0x20, 0x00, 0x02, 0x00, 0xFF]);
    assert_eq!(response, vec![0xE6, 0x00, 0x00]);
}

#[test]
fn b3_declared_length_mismatch_is_malformed() {
    let mut server = one_writable_variable(4);
    let mut response = vec![0u8; MAX_MESSAGE];
    // declares a 1-byte payload but the buffer supplies two.
    let n = server
        .process_packet(&[0x10, 0x00, 0x01, 0x00, 0xFF], &mut response)
        .unwrap();
    assert_eq!(&response[..n], &[0xE1, 0x00, 0x00]);
}

#[test]
fn b4_group_create_rejects_non_ascending_ids() {
    let mut server = Server::new();
    server.register_variable(Variable::new(1, true).unwrap()).unwrap();
    server.register_variable(Variable::new(1, true).unwrap()).unwrap();
    let response = exchange(&mut server, &[0x30, 0x00, 0x02, 0x01, 0x00]);
    assert_eq!(response, vec![0xE3, 0x00, 0x00]);
}

#[test]
fn b5_full_size_variable_round_trips_through_zero_byte() {
    let mut server = Server::new();
    server.register_variable(Variable::new(128, true).unwrap()).unwrap();

    let list = exchange(&mut server, &[0x02, 0x00, 0x00]);
    assert_eq!(list[3], 0x80); // writable bit set, size field 0 means 128
}

// -- functions ---------------------------------------------------------------

struct Sum;
impl Callable for Sum {
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

#[test]
fn func_execute_returns_output_on_success() {
    let mut server = Server::new();
    server.register_function(Function::new(2, 1, Box::new(Sum)).unwrap()).unwrap();

    let response = exchange(&mut server, &[0x50, 0x00, 0x03, 0x00, 0x02, 0x03]);
    assert_eq!(response, vec![0x51, 0x00, 0x01, 0x05]);
}

#[test]
fn func_execute_reports_domain_error() {
    let mut server = Server::new();
    server.register_function(Function::new(2, 1, Box::new(Sum)).unwrap()).unwrap();

    let response = exchange(&mut server, &[0x50, 0x00, 0x03, 0x00, 0xFF, 0x02]);
    assert_eq!(response, vec![0x53, 0x00, 0x01, 0x01]);
}

// -- handler validation ordering ---------------------------------------------

#[test]
fn var_write_reports_wrong_size_before_read_only() {
    let mut server = Server::new();
    server.register_variable(Variable::new(4, false).unwrap()).unwrap();

    // wrong payload size on a read-only variable: size check must win.
    let response = exchange(&mut server, &[0x20, 0x00, 0x02, 0x00, 0xFF]);
    assert_eq!(response, vec![0xE5, 0x00, 0x00]);
}

#[test]
fn group_write_reports_wrong_size_before_read_only() {
    let mut server = Server::new();
    server.register_variable(Variable::new(4, false).unwrap()).unwrap();
    exchange(&mut server, &[0x30, 0x00, 0x01, 0x00]); // GROUP_CREATE([0]), read-only

    let response = exchange(&mut server, &[0x22, 0x00, 0x02, 0x03, 0xFF]);
    assert_eq!(response, vec![0xE5, 0x00, 0x00]);
}

#[test]
fn var_bin_op_reports_unknown_op_before_read_only() {
    let mut server = Server::new();
    server.register_variable(Variable::new(1, false).unwrap()).unwrap();

    let response = exchange(&mut server, &[0x24, 0x00, 0x03, 0x00, b'Z', 0xFF]);
    assert_eq!(response, vec![0xE2, 0x00, 0x00]);
}

#[test]
fn group_bin_op_reports_unknown_op_before_read_only() {
    let mut server = Server::new();
    server.register_variable(Variable::new(1, false).unwrap()).unwrap();
    exchange(&mut server, &[0x30, 0x00, 0x01, 0x00]); // GROUP_CREATE([0]), read-only

    let response = exchange(&mut server, &[0x26, 0x00, 0x03, 0x03, b'Z', 0xFF]);
    assert_eq!(response, vec![0xE2, 0x00, 0x00]);
}

#[test]
fn query_list_handlers_reject_nonempty_payload() {
    let mut server = one_writable_variable(4);
    assert_eq!(exchange(&mut server, &[0x00, 0x00, 0x01, 0xAA]), vec![0xE5, 0x00, 0x00]);
    assert_eq!(exchange(&mut server, &[0x02, 0x00, 0x02, 0xAA, 0xBB]), vec![0xE5, 0x00, 0x00]);
    assert_eq!(exchange(&mut server, &[0x04, 0x00, 0x01, 0xAA]), vec![0xE5, 0x00, 0x00]);
    assert_eq!(exchange(&mut server, &[0x08, 0x00, 0x01, 0xAA]), vec![0xE5, 0x00, 0x00]);
    assert_eq!(exchange(&mut server, &[0x0C, 0x00, 0x01, 0xAA]), vec![0xE5, 0x00, 0x00]);
    assert_eq!(exchange(&mut server, &[0x32, 0x00, 0x01, 0xAA]), vec![0xE5, 0x00, 0x00]);
}

// -- validator rejection ------------------------------------------------------

struct EvenOnly;
impl ValueValidator for EvenOnly {
    fn validate(&self, proposed: &[u8]) -> bool {
        proposed[0] % 2 == 0
    }
}

#[test]
fn write_rejected_by_validator_is_invalid_value() {
    let mut server = Server::new();
    server
        .register_variable(Variable::new(1, true).unwrap().with_validator(Box::new(EvenOnly)))
        .unwrap();

    let response = exchange(&mut server, &[0x20, 0x00, 0x02, 0x00, 0x03]);
    assert_eq!(response, vec![0xE4, 0x00, 0x00]);

    let response = exchange(&mut server, &[0x20, 0x00, 0x02, 0x00, 0x04]);
    assert_eq!(response, vec![0xE0, 0x00, 0x00]);
}
