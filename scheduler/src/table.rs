use std::slice;

use crate::record::ProcessRecord;
use crate::{Pid, ProcessState};

/// The records of a run, in arrival order. Never reordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTable {
    records: Vec<ProcessRecord>,
}

impl ProcessTable {
    pub fn new() -> Self {
        ProcessTable::default()
    }

    /// Appends a record for `name`; its arrival is the current length.
    pub fn push(&mut self, name: impl Into<String>, entry_time: i64) -> usize {
        let arrival = self.records.len();
        self.records.push(ProcessRecord::new(name, entry_time, arrival));
        arrival
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, arrival: usize) -> Option<&ProcessRecord> {
        self.records.get(arrival)
    }

    pub(crate) fn get_mut(&mut self, arrival: usize) -> Option<&mut ProcessRecord> {
        self.records.get_mut(arrival)
    }

    pub fn iter(&self) -> slice::Iter<'_, ProcessRecord> {
        self.records.iter()
    }

    /// The unfinished record running as `pid`.
    ///
    /// Exited records are skipped: the OS may hand their PID to a later child.
    pub fn find_by_handle(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.records
            .iter()
            .find(|record| record.handle() == Some(pid) && !record.is_exited())
    }

    pub(crate) fn find_by_handle_mut(&mut self, pid: Pid) -> Option<&mut ProcessRecord> {
        self.records
            .iter_mut()
            .find(|record| record.handle() == Some(pid) && !record.is_exited())
    }

    /// The earliest arrival in `state` matching `filter`.
    pub(crate) fn first_mut(
        &mut self,
        state: ProcessState,
        filter: impl Fn(&ProcessRecord) -> bool,
    ) -> Option<&mut ProcessRecord> {
        self.records
            .iter_mut()
            .find(|record| record.state() == state && filter(&**record))
    }

    pub fn all_exited(&self) -> bool {
        self.records.iter().all(ProcessRecord::is_exited)
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for ProcessTable {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut table = ProcessTable::new();
        for (name, entry_time) in iter {
            table.push(name, entry_time);
        }
        table
    }
}

impl<'a> IntoIterator for &'a ProcessTable {
    type Item = &'a ProcessRecord;
    type IntoIter = slice::Iter<'a, ProcessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
