//! Generic enumeration iterators
//!
//! `iter_enumerate_instances` hides the pull-vs-non-pull choice: the
//! first use probes the server with an `Open*` operation; on
//! `CIM_ERR_NOT_SUPPORTED` it falls back to the traditional enumeration
//! and the decision is cached on the connection.

use crate::connection::{InstanceOptions, WbemConnection};
use crate::error::{ClientError, ClientResult};
use crate::pull::PullHandle;
use crate::status::CimStatusCode;
use rwbem_types::{CimInstance, CimInstanceName};
use std::collections::VecDeque;
use tracing::debug;

const DEFAULT_BATCH: u32 = 1000;

enum Source<T> {
    /// All results were fetched eagerly (non-pulled fallback)
    Buffered,
    /// An open pulled enumeration to keep draining
    Pulled {
        handle: PullHandle,
        pull: fn(&WbemConnection, &mut PullHandle, u32) -> ClientResult<Vec<T>>,
    },
}

/// Iterator over enumeration results, pulled or buffered
pub struct EnumerationIter<'c, T> {
    conn: &'c WbemConnection,
    buffer: VecDeque<T>,
    source: Source<T>,
    batch_size: u32,
    failed: bool,
}

impl<T> Iterator for EnumerationIter<'_, T> {
    type Item = ClientResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.failed {
                return None;
            }
            match &mut self.source {
                Source::Buffered => return None,
                Source::Pulled { handle, pull } => {
                    if handle.is_drained() {
                        return None;
                    }
                    match pull(self.conn, handle, self.batch_size) {
                        Ok(batch) => self.buffer.extend(batch),
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}

impl WbemConnection {
    /// Iterate instances of a class, choosing pulled or traditional
    /// enumeration per the server's capability
    pub fn iter_enumerate_instances(
        &self,
        class_name: &str,
        namespace: Option<&str>,
        options: &InstanceOptions,
    ) -> ClientResult<EnumerationIter<'_, CimInstance>> {
        if self.pull_supported.get() == Some(false) {
            let all = self.enumerate_instances(class_name, namespace, options)?;
            return Ok(self.buffered(all));
        }
        match self.open_enumerate_instances(class_name, namespace, DEFAULT_BATCH) {
            Ok((batch, handle)) => {
                self.pull_supported.set(Some(true));
                Ok(EnumerationIter {
                    conn: self,
                    buffer: batch.into(),
                    source: Source::Pulled {
                        handle,
                        pull: WbemConnection::pull_instances_with_path,
                    },
                    batch_size: DEFAULT_BATCH,
                    failed: false,
                })
            }
            Err(e) if is_not_supported(&e) => {
                debug!("server lacks pulled enumerations; falling back");
                self.pull_supported.set(Some(false));
                let all = self.enumerate_instances(class_name, namespace, options)?;
                Ok(self.buffered(all))
            }
            Err(e) => Err(e),
        }
    }

    /// Iterate instance paths of a class, pulled when available
    pub fn iter_enumerate_instance_paths(
        &self,
        class_name: &str,
        namespace: Option<&str>,
    ) -> ClientResult<EnumerationIter<'_, CimInstanceName>> {
        if self.pull_supported.get() == Some(false) {
            let all = self.enumerate_instance_names(class_name, namespace)?;
            return Ok(self.buffered(all));
        }
        match self.open_enumerate_instance_paths(class_name, namespace, DEFAULT_BATCH) {
            Ok((batch, handle)) => {
                self.pull_supported.set(Some(true));
                Ok(EnumerationIter {
                    conn: self,
                    buffer: batch.into(),
                    source: Source::Pulled {
                        handle,
                        pull: WbemConnection::pull_instance_paths,
                    },
                    batch_size: DEFAULT_BATCH,
                    failed: false,
                })
            }
            Err(e) if is_not_supported(&e) => {
                debug!("server lacks pulled enumerations; falling back");
                self.pull_supported.set(Some(false));
                let all = self.enumerate_instance_names(class_name, namespace)?;
                Ok(self.buffered(all))
            }
            Err(e) => Err(e),
        }
    }

    fn buffered<T>(&self, items: Vec<T>) -> EnumerationIter<'_, T> {
        EnumerationIter {
            conn: self,
            buffer: items.into(),
            source: Source::Buffered,
            batch_size: DEFAULT_BATCH,
            failed: false,
        }
    }
}

fn is_not_supported(error: &ClientError) -> bool {
    error.cim_status() == Some(CimStatusCode::NotSupported)
}
