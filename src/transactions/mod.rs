//! Transaction workflow: negotiation records and the state machine that
//! drives them, including listing-availability side effects

mod model;
mod service;
pub mod workflow;

pub use model::{
    CreateTransactionRequest, MeetingDetails, Transaction, TransactionMessage, TransactionQuery,
    TransactionRole, TransactionWithMessages, UpdateTransactionRequest,
};
pub use service::{TransactionError, TransactionService};
pub use workflow::{
    availability_for, transition, ActorRole, TransactionAction, TransactionStatus,
};
