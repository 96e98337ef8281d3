//! Session key naming
//!
//! Every value lives under `bundlepay:session:{session_id}:{field}` so one
//! backing store can hold many browser sessions.

use std::fmt;

pub const TOKEN: &str = "token";
pub const WALLET_BALANCE: &str = "walletBalance";
pub const PENDING_PURCHASE: &str = "pendingPurchase";
pub const PURCHASE_DATA: &str = "purchaseData";

const PREFIX: &str = "bundlepay:session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey<'a> {
    pub session_id: &'a str,
    pub field: &'a str,
}

impl<'a> SessionKey<'a> {
    pub fn new(session_id: &'a str, field: &'a str) -> Self {
        Self { session_id, field }
    }
}

impl fmt::Display for SessionKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", PREFIX, self.session_id, self.field)
    }
}
