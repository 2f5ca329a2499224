use std::fmt::{self, Display};
use std::time::Instant;

use scheduler::{Pid, ProcessRecord, ProcessState, ProcessTable, RunStats};

/// What is printed for one finished record.
#[derive(Debug, PartialEq)]
pub struct RecordSummary {
    /// The PID the record ran as.
    pub pid: Option<Pid>,

    /// The program name.
    pub name: String,

    pub state: ProcessState,

    /// Wall time from launch to exit, in seconds.
    pub elapsed_secs: f64,

    /// Time spent holding the CPU, in seconds.
    pub work_secs: f64,
}

impl RecordSummary {
    pub fn new(record: &ProcessRecord, now: Instant) -> RecordSummary {
        RecordSummary {
            pid: record.handle(),
            name: record.name().to_string(),
            state: record.state(),
            elapsed_secs: record.timing().elapsed_wall_ms(now) / 1000.0,
            work_secs: record.timing().cpu_work_ms() / 1000.0,
        }
    }
}

impl Display for RecordSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "{pid}")?,
            None => write!(f, "-")?,
        }
        write!(
            f,
            "\t{}\t{}\t{:.2}s\t{:.2}s",
            self.name, self.state, self.elapsed_secs, self.work_secs
        )
    }
}

/// Format the finished records of `table` and the run totals to a [`String`].
pub fn format_report(table: &ProcessTable, stats: &RunStats) -> String {
    let now = Instant::now();
    let mut s = String::new();
    let _ = fmt::write(&mut s, format_args!("PID\tNAME\tSTATE\tELAPSED\tWORK\n"));
    let finished = table.iter().filter(|record| record.is_exited());
    for record in finished {
        let _ = fmt::write(&mut s, format_args!("{}\n", RecordSummary::new(record, now)));
    }
    let _ = fmt::write(
        &mut s,
        format_args!(
            "{} processes, {} launched, {} passes, {:.2}s\n",
            table.len(),
            stats.launched,
            stats.passes,
            stats.elapsed.as_secs_f64()
        ),
    );
    s
}
