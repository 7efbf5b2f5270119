//! Dispatch boundary: decodes a named operation and its serialized argument,
//! runs it against the [`Ledger`], and encodes the outcome.

use crate::codec;
use crate::error::LedgerError;
use crate::ledger::{Balance, Ledger};
use crate::persistence::StateStore;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix of every error message returned to callers.
pub const ERROR_PREFIX: &str = "sigledger error: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(with = "serde_bytes")]
    pub address: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRequest {
    #[serde(with = "serde_bytes")]
    pub address: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub tx: Transaction,
}

/// Response payload shared by all three operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Balance,
}

/// The closed set of operations the ledger understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Register(RegisterRequest),
    Balance(BalanceRequest),
    Send(SendRequest),
}

impl Request {
    /// Resolves a function name and its arguments into a typed request.
    /// Fails before any state is touched.
    pub fn decode(function: &str, args: &[Vec<u8>]) -> Result<Self, LedgerError> {
        match function {
            "register" => Ok(Request::Register(codec::decode(single_arg(args)?)?)),
            "balance" => Ok(Request::Balance(codec::decode(single_arg(args)?)?)),
            "send" => Ok(Request::Send(codec::decode(single_arg(args)?)?)),
            other => Err(LedgerError::UnknownOperation(other.to_string())),
        }
    }

    pub fn function(&self) -> &'static str {
        match self {
            Request::Register(_) => "register",
            Request::Balance(_) => "balance",
            Request::Send(_) => "send",
        }
    }

    /// The serialized argument list for this request.
    pub fn encode_args(&self) -> Result<Vec<Vec<u8>>, LedgerError> {
        let payload = match self {
            Request::Register(req) => codec::encode(req)?,
            Request::Balance(req) => codec::encode(req)?,
            Request::Send(req) => codec::encode(req)?,
        };
        Ok(vec![payload])
    }
}

fn single_arg(args: &[Vec<u8>]) -> Result<&[u8], LedgerError> {
    args.first()
        .map(Vec::as_slice)
        .ok_or(LedgerError::ArgumentCountError {
            expected: 1,
            received: args.len(),
        })
}

/// Outcome of an invocation, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Success(Vec<u8>),
    Error(String),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// Decodes a successful payload; an error response becomes `Err` with its message.
    pub fn into_balance(self) -> Result<Balance, String> {
        match self {
            Response::Success(payload) => codec::decode::<BalanceResponse>(&payload)
                .map(|r| r.balance)
                .map_err(|e| e.to_string()),
            Response::Error(message) => Err(message),
        }
    }
}

pub struct Dispatcher<S: StateStore> {
    ledger: Ledger<S>,
}

impl<S: StateStore> Dispatcher<S> {
    pub fn new(ledger: Ledger<S>) -> Self {
        Dispatcher { ledger }
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn invoke(&self, function: &str, args: &[Vec<u8>]) -> Response {
        debug!("Invoking {} with {} argument(s)", function, args.len());
        match Request::decode(function, args).and_then(|request| self.handle(&request)) {
            Ok(payload) => Response::Success(payload),
            Err(e) => {
                warn!("{} failed: {}", function, e);
                Response::Error(format!("{}{}", ERROR_PREFIX, e))
            }
        }
    }

    /// Runs a decoded request and returns the encoded [`BalanceResponse`].
    pub fn handle(&self, request: &Request) -> Result<Vec<u8>, LedgerError> {
        let balance = match request {
            Request::Register(req) => self.ledger.register(&req.address)?,
            Request::Balance(req) => self.ledger.balance(&req.address)?,
            Request::Send(req) => self.ledger.send(&req.tx)?,
        };
        codec::encode(&BalanceResponse { balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::persistence::InMemoryStore;

    fn dispatcher() -> Dispatcher<InMemoryStore> {
        Dispatcher::new(Ledger::new(InMemoryStore::new()))
    }

    fn call(dispatcher: &Dispatcher<InMemoryStore>, request: Request) -> Response {
        dispatcher.invoke(request.function(), &request.encode_args().unwrap())
    }

    #[test]
    fn test_missing_argument() {
        let d = dispatcher();
        let response = d.invoke("register", &[]);
        assert_eq!(
            response,
            Response::Error(
                "sigledger error: arguments length expected: 1 received: 0".to_string()
            )
        );
        assert!(d.ledger().store().is_empty());
    }

    #[test]
    fn test_unknown_function() {
        let result = Request::decode("mint", &[vec![0u8; 8]]);
        assert_eq!(result, Err(LedgerError::UnknownOperation("mint".to_string())));
    }

    #[test]
    fn test_unknown_function_checked_before_arguments() {
        let result = Request::decode("mint", &[]);
        assert_eq!(result, Err(LedgerError::UnknownOperation("mint".to_string())));
    }

    #[test]
    fn test_payload_with_trailing_bytes_is_decode_error() {
        let d = dispatcher();
        let mut payload = codec::encode(&RegisterRequest {
            address: vec![1, 2],
        })
        .unwrap();
        payload.extend_from_slice(b"junk");

        let result = Request::decode("register", &[payload.clone()]);
        assert!(matches!(result, Err(LedgerError::DecodeError(_))));
        assert!(!d.invoke("register", &[payload]).is_ok());
        assert!(d.ledger().store().is_empty());
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let d = dispatcher();
        let result = Request::decode("send", &[vec![0xFF, 0x01]]);
        assert!(matches!(result, Err(LedgerError::DecodeError(_))));

        let response = d.invoke("send", &[vec![0xFF, 0x01]]);
        assert!(!response.is_ok());
        assert!(d.ledger().store().is_empty());
    }

    #[test]
    fn test_register_and_query_through_dispatch() {
        let d = dispatcher();
        let address = KeyPair::generate().address();

        let registered = call(
            &d,
            Request::Register(RegisterRequest {
                address: address.clone(),
            }),
        )
        .into_balance()
        .unwrap();
        assert_eq!(registered.amount, 100);

        let queried = call(&d, Request::Balance(BalanceRequest { address }))
            .into_balance()
            .unwrap();
        assert_eq!(queried, registered);
    }

    #[test]
    fn test_duplicate_register_message() {
        let d = dispatcher();
        let request = Request::Register(RegisterRequest {
            address: vec![0x04, 0x01],
        });
        assert!(call(&d, request.clone()).is_ok());

        let message = call(&d, request).into_balance().unwrap_err();
        assert!(message.starts_with(ERROR_PREFIX));
        assert!(message.contains("already registered"));
    }

    #[test]
    fn test_send_through_dispatch() {
        let d = dispatcher();
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        for address in [alice.address(), bob.address()] {
            assert!(call(&d, Request::Register(RegisterRequest { address })).is_ok());
        }

        let token = d.ledger().balance(&alice.address()).unwrap().chain_token;
        let tx = Transaction::signed(&alice, bob.address(), 25, &token).unwrap();
        let sender = call(&d, Request::Send(SendRequest { tx }))
            .into_balance()
            .unwrap();
        assert_eq!(sender.amount, 75);
        assert_ne!(sender.chain_token, token);
    }
}
