// Copyright (C) 2024-2026 MinePulse Developers (see AUTHORS)
//
// This file is part of MinePulse
//
// MinePulse is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// MinePulse is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// MinePulse. If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const MIN_TOP_UP: f64 = 10.0;
pub const MAX_TOP_UP: f64 = 10_000.0;

#[derive(Error, Debug, PartialEq)]
pub enum CardError {
    #[error("Top up amount {0} must be between 10 and 10000")]
    TopUpOutOfRange(f64),
    #[error("Amount {0} must be positive")]
    NonPositiveAmount(f64),
    #[error("Amount {amount} exceeds balance {balance}")]
    InsufficientBalance { amount: f64, balance: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    TopUp,
    Send,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub balance_after: f64,
    pub at: DateTime<Utc>,
}

/// Simulated prepaid card. Rejected amounts never touch the balance.
#[derive(Debug, Clone, Default)]
pub struct PrepaidCard {
    balance: f64,
    transactions: Vec<CardTransaction>,
}

impl PrepaidCard {
    pub fn new(balance: f64) -> Self {
        Self {
            balance: balance.max(0.0),
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Most recent last
    pub fn transactions(&self) -> &[CardTransaction] {
        &self.transactions
    }

    pub fn top_up(&mut self, amount: f64, now: DateTime<Utc>) -> Result<f64, CardError> {
        // NaN fails the range check as well
        if !(MIN_TOP_UP..=MAX_TOP_UP).contains(&amount) {
            warn!("Rejected top up of {}", amount);
            return Err(CardError::TopUpOutOfRange(amount));
        }
        self.balance += amount;
        self.record(TransactionKind::TopUp, amount, now);
        info!("Card topped up by {:.2}, balance {:.2}", amount, self.balance);
        Ok(self.balance)
    }

    pub fn send(&mut self, amount: f64, now: DateTime<Utc>) -> Result<f64, CardError> {
        if amount.is_nan() || amount <= 0.0 {
            warn!("Rejected send of {}", amount);
            return Err(CardError::NonPositiveAmount(amount));
        }
        if amount > self.balance {
            warn!("Rejected send of {} with balance {}", amount, self.balance);
            return Err(CardError::InsufficientBalance {
                amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        self.record(TransactionKind::Send, amount, now);
        info!("Sent {:.2} from card, balance {:.2}", amount, self.balance);
        Ok(self.balance)
    }

    fn record(&mut self, kind: TransactionKind, amount: f64, at: DateTime<Utc>) {
        self.transactions.push(CardTransaction {
            kind,
            amount,
            balance_after: self.balance,
            at,
        });
    }
}
