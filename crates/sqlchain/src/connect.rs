//! Connection acquisition and hand-back.
//!
//! A builder holds at most one connection. Execute calls take it out (or
//! resolve a fresh one through the factory), run, and then either put it back
//! or close it.

use crate::builder::SqlBuilder;
use crate::config::ConnectionTarget;
use crate::driver::{Connection, ConnectionFactory};
use crate::error::SqlResult;
use crate::logging::TARGET;

/// A connection taken out of the builder for one operation.
pub(crate) struct Acquired<C> {
    pub(crate) conn: C,
    /// Taken from the builder rather than freshly resolved.
    pub(crate) reused: bool,
}

impl<F: ConnectionFactory> SqlBuilder<F> {
    /// Take the held connection if it is still open, otherwise resolve a new one.
    ///
    /// Fresh connections have auto-commit turned off before they are returned.
    pub(crate) async fn resolve(&mut self) -> SqlResult<Acquired<F::Connection>> {
        if let Some(conn) = self.held.take() {
            if !conn.is_closed() {
                tracing::trace!(target: TARGET, "reusing held connection");
                return Ok(Acquired { conn, reused: true });
            }
            tracing::debug!(target: TARGET, "discarding closed held connection");
        }

        let mut conn = match self.connection_config.target()? {
            ConnectionTarget::Named(name) => {
                tracing::debug!(target: TARGET, resource = name, "resolving connection");
                self.factory.resolve_by_name(name).await?
            }
            ConnectionTarget::Direct(credentials) => {
                tracing::debug!(target: TARGET, url = %credentials.url, "resolving connection");
                self.factory.resolve_by_credentials(credentials).await?
            }
        };

        if let Err(e) = conn.set_auto_commit(false).await {
            close_quietly(&mut conn).await;
            return Err(e);
        }
        Ok(Acquired {
            conn,
            reused: false,
        })
    }

    /// Hold `conn` for later calls.
    ///
    /// The connection is stored only when no open connection is held already;
    /// otherwise it is handed back to the caller.
    pub fn retain(&mut self, conn: F::Connection) -> Option<F::Connection> {
        if self.has_connection() {
            return Some(conn);
        }
        tracing::trace!(target: TARGET, "retaining connection");
        self.held = Some(conn);
        None
    }

    /// Put a connection back after a successful operation.
    ///
    /// Reused connections and those the caller asked to `keep` go back into the
    /// builder; everything else is closed.
    pub(crate) async fn release(
        &mut self,
        acquired: Acquired<F::Connection>,
        keep: bool,
    ) -> SqlResult<()> {
        let mut conn = if keep || acquired.reused {
            match self.retain(acquired.conn) {
                None => return Ok(()),
                Some(extra) => extra,
            }
        } else {
            acquired.conn
        };
        tracing::trace!(target: TARGET, "closing connection");
        conn.close().await
    }

    /// Roll back and release after a failed operation, logging secondary failures.
    pub(crate) async fn abandon(&mut self, mut acquired: Acquired<F::Connection>) {
        if let Err(e) = acquired.conn.rollback().await {
            tracing::warn!(target: TARGET, error = %e, "rollback after failure did not succeed");
        }
        if acquired.reused {
            if let Some(mut extra) = self.retain(acquired.conn) {
                close_quietly(&mut extra).await;
            }
        } else {
            close_quietly(&mut acquired.conn).await;
        }
    }

    /// Close and drop the held connection, if any.
    pub async fn close(&mut self) -> SqlResult<()> {
        match self.held.take() {
            Some(mut conn) if !conn.is_closed() => {
                tracing::debug!(target: TARGET, "closing held connection");
                conn.close().await
            }
            _ => Ok(()),
        }
    }
}

async fn close_quietly<C: Connection>(conn: &mut C) {
    if let Err(e) = conn.close().await {
        tracing::warn!(target: TARGET, error = %e, "failed to close connection");
    }
}
