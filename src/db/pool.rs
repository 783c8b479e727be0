//! Bounded pool of database sessions.
//!
//! Every slot is a [`DatabaseConnection`] pinned to exactly one Postgres
//! session, so session-scoped settings such as `SET TIME ZONE` stay with the
//! handle that issued them. Acquisition is a receive on a bounded channel
//! and release is the matching send, performed by the guard on every exit
//! path; waiters are served in arrival order.

use std::ops::Deref;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tokio::sync::{Mutex, mpsc};

pub struct DbPool {
    tx: mpsc::Sender<DatabaseConnection>,
    rx: Mutex<mpsc::Receiver<DatabaseConnection>>,
    size: usize,
}

/// A borrowed connection. Dereferences to the underlying
/// [`DatabaseConnection`]; dropping it returns the slot to the pool.
pub struct PooledConn {
    conn: Option<DatabaseConnection>,
    tx: mpsc::Sender<DatabaseConnection>,
}

impl DbPool {
    /// Open `size` dedicated sessions against `url`.
    ///
    /// # Errors
    ///
    /// Returns the driver error of the first connection that fails to open;
    /// connections opened before the failure are dropped.
    pub async fn connect(url: &str, size: usize) -> Result<Self, DbErr> {
        let size = size.max(1);
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let mut opts = ConnectOptions::new(url.to_owned());
            // One sqlx connection per slot keeps session state attached to
            // the handle.
            opts.max_connections(1).min_connections(1).sqlx_logging(false);
            conns.push(Database::connect(opts).await?);
        }
        Ok(Self::new(conns))
    }

    /// Build a pool from already-open connections.
    #[must_use]
    pub fn new(conns: Vec<DatabaseConnection>) -> Self {
        let size = conns.len();
        let (tx, rx) = mpsc::channel(size.max(1));
        for conn in conns {
            // Channel capacity equals the connection count; this cannot fail.
            let _ = tx.try_send(conn);
        }
        Self {
            tx,
            rx: Mutex::new(rx),
            size,
        }
    }

    /// Borrow a connection, waiting until one is free. Cannot fail once the
    /// pool is initialised.
    pub async fn acquire(&self) -> PooledConn {
        let mut rx = self.rx.lock().await;
        let conn = rx
            .recv()
            .await
            .expect("pool sender lives as long as the pool");
        PooledConn {
            conn: Some(conn),
            tx: self.tx.clone(),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Deref for PooledConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_ref()
            .expect("connection present until the guard is dropped")
    }
}

impl Drop for PooledConn {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // Capacity equals pool size, so the slot always fits back.
            let _ = self.tx.try_send(conn);
        }
    }
}
