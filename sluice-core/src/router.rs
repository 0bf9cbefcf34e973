use crate::{Error, Link, Result};
use std::{
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Source of links: the master for writes, a slave (or the master) for reads.
///
/// Links are borrowed for a single operation and never retained by the caller.
pub trait Router: Send + Sync {
    type Link: Link;

    fn write_link(&self) -> impl Future<Output = Result<Self::Link>> + Send;

    fn read_link(&self) -> impl Future<Output = Result<Self::Link>> + Send;
}

/// Fixed set of links: one master, any number of slaves picked in turn.
///
/// Reads go to the master when no slave is configured.
#[derive(Debug)]
pub struct StaticRouter<L> {
    master: L,
    slaves: Vec<L>,
    next: AtomicUsize,
}

impl<L> StaticRouter<L> {
    pub fn new(master: L) -> Self {
        Self {
            master,
            slaves: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }
    pub fn with_slaves(mut self, slaves: impl IntoIterator<Item = L>) -> Self {
        self.slaves.extend(slaves);
        self
    }
    pub fn master(&self) -> &L {
        &self.master
    }
    pub fn slaves(&self) -> &[L] {
        &self.slaves
    }
    fn pick_slave(&self) -> &L {
        if self.slaves.is_empty() {
            return &self.master;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        &self.slaves[i % self.slaves.len()]
    }
}

impl<L: Link + Clone> Router for StaticRouter<L> {
    type Link = L;

    async fn write_link(&self) -> Result<L> {
        Ok(self.master.clone())
    }

    async fn read_link(&self) -> Result<L> {
        Ok(self.pick_slave().clone())
    }
}

/// Convert a router failure into the error reported by the facade.
pub(crate) fn unavailable(role: &'static str) -> impl FnOnce(Error) -> Error {
    move |source| crate::DbError::ConnectionUnavailable { role, source }.into()
}
