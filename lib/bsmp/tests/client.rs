//! Client `Session` exercised against a server in the same process, looping
//! every send straight back through `Server::process_packet`.

use bsmp::catalogue::variable::Variable;
use bsmp::client::{Session, Transport};
use bsmp::wire::MAX_MESSAGE;
use bsmp::Server;

struct Loopback {
    server: Server,
    response: Vec<u8>,
}

impl Transport for Loopback {
    fn send(&mut self, bytes: &[u8]) -> bool {
        let mut response = vec![0u8; MAX_MESSAGE];
        let n = self.server.process_packet(bytes, &mut response).unwrap();
        response.truncate(n);
        self.response = response;
        true
    }

    fn recv(&mut self, buf: &mut [u8]) -> Option<usize> {
        let n = self.response.len();
        buf[..n].copy_from_slice(&self.response);
        Some(n)
    }
}

fn server_with_one_variable() -> Server {
    let mut server = Server::new();
    server.register_variable(Variable::new(4, true).unwrap()).unwrap();
    server
}

#[test]
fn init_discovers_the_catalogue() {
    let transport = Loopback {
        server: server_with_one_variable(),
        response: Vec::new(),
    };
    let mut session = Session::new(transport);
    session.init().unwrap();

    assert_eq!(session.get_vars().len(), 1);
    assert_eq!(session.get_vars()[0].size, 4);
    assert!(session.get_vars()[0].writable);
    // three standard groups, none created on top.
    assert_eq!(session.get_groups().len(), 3);
}

#[test]
fn write_then_read_round_trips_through_the_session() {
    let transport = Loopback {
        server: server_with_one_variable(),
        response: Vec::new(),
    };
    let mut session = Session::new(transport);
    session.init().unwrap();

    let descriptor = session.get_vars()[0].clone();
    session.write_var(&descriptor, &[1, 2, 3, 4]).unwrap();
    let bytes = session.read_var(&descriptor).unwrap();
    assert_eq!(bytes, vec![1, 2, 3, 4]);
}

#[test]
fn write_var_rejects_wrong_size() {
    let transport = Loopback {
        server: server_with_one_variable(),
        response: Vec::new(),
    };
    let mut session = Session::new(transport);
    session.init().unwrap();

    let descriptor = session.get_vars()[0].clone();
    let err = session.write_var(&descriptor, &[1, 2]).unwrap_err();
    assert!(matches!(err, bsmp::client::Error::ParamOutOfRange(_)));
}
