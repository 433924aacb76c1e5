// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Transactional access to the keepalive counter
//!
//! The tick logic only talks to [`CounterStore`] and [`CounterTransaction`],
//! which keeps the rollback rules testable without a database.

use std::future::Future;

use sqlx::mysql::{MySql, MySqlPool};
use sqlx::Transaction;

use crate::error::{AppError, Result};

/// Key of the row the keepalive increments
pub const COUNTER_KEY: &str = "counter";

const INCREMENT_SQL: &str = "UPDATE `keepalive` SET `value` = `value` + 1 WHERE `key` = ?";
/// Cast so an UNSIGNED `value` column still decodes as `i64`
const SELECT_SQL: &str = "SELECT CAST(`value` AS SIGNED) FROM `keepalive` WHERE `key` = ?";

/// Source of counter transactions
pub trait CounterStore: Send + Sync + 'static {
    type Tx: CounterTransaction;

    /// Opens a READ COMMITTED transaction
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;
}

/// One open transaction on the counter row
pub trait CounterTransaction: Send {
    /// Adds one to the counter
    fn increment(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Reads the counter as seen inside this transaction
    fn current_value(&mut self) -> impl Future<Output = Result<i64>> + Send;

    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Counter store backed by the MySQL pool
#[derive(Debug, Clone)]
pub struct MySqlCounterStore {
    pool: MySqlPool,
}

impl MySqlCounterStore {
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl CounterStore for MySqlCounterStore {
    type Tx = MySqlCounterTx;

    async fn begin(&self) -> Result<MySqlCounterTx> {
        let tx = self.pool.begin().await?;
        tracing::trace!("Transaction opened ({} pooled connections)", self.pool.size());
        Ok(MySqlCounterTx { tx })
    }
}

/// Open MySQL transaction on the counter row
pub struct MySqlCounterTx {
    tx: Transaction<'static, MySql>,
}

impl CounterTransaction for MySqlCounterTx {
    async fn increment(&mut self) -> Result<()> {
        let result = sqlx::query(INCREMENT_SQL)
            .bind(COUNTER_KEY)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CounterMissing(COUNTER_KEY.to_string()));
        }
        Ok(())
    }

    async fn current_value(&mut self) -> Result<i64> {
        let value = sqlx::query_scalar::<_, i64>(SELECT_SQL)
            .bind(COUNTER_KEY)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(value)
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
