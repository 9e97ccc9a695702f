//! Trace Source (spec §6): a lazy, per-pid sequence of
//! `(kind, address)` records. This module provides the narrow
//! `TraceSource` interface plus one concrete file-backed adapter;
//! spec.md treats the trace reader itself as an external collaborator,
//! so the format here (§4 of SPEC_FULL.md) is this crate's own choice,
//! not part of the hard core.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::address::Address;
use crate::error::TraceError;
use crate::Pid;

/// The kind of a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Read,
    Write,
    Nop,
}

/// One trace entry for a single processor.
#[derive(Clone, Copy, Debug)]
pub struct Record {
    pub kind: RecordKind,
    pub addr: Address,
}

/// The external trace-reader interface every processor front-end
/// consumes. Implementations must serialize concurrent callers.
pub trait TraceSource: Send + Sync {
    fn proc_count(&self) -> usize;
    fn eof(&self, pid: Pid) -> bool;
    /// Pull the next record for `pid`, or `None` at end-of-trace.
    fn next(&self, pid: Pid) -> Option<Record>;
}

/// A trace loaded up front from a text file: one record per line,
/// `<pid> <R|W|N> <address>`. An optional leading bare integer gives
/// the processor count explicitly; otherwise it is inferred as
/// `1 + max(pid)`. Blank lines and `#`-comments are skipped.
pub struct FileTraceSource {
    proc_count: usize,
    queues: Mutex<Vec<VecDeque<Record>>>,
}

impl FileTraceSource {
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let text = fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut declared_count: Option<usize> = None;
        let mut records: Vec<(Pid, Record)> = Vec::new();
        let mut max_pid: Option<Pid> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if declared_count.is_none() && records.is_empty() {
                if let Ok(n) = line.parse::<usize>() {
                    declared_count = Some(n);
                    continue;
                }
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(TraceError::MalformedLine {
                    path: path.to_path_buf(),
                    line_no,
                    raw: line.to_string(),
                });
            }

            let pid: Pid = fields[0].parse().map_err(|_| TraceError::MalformedLine {
                path: path.to_path_buf(),
                line_no,
                raw: line.to_string(),
            })?;

            let kind = match fields[1].to_ascii_uppercase().as_str() {
                "R" | "READ" => RecordKind::Read,
                "W" | "WRITE" => RecordKind::Write,
                "N" | "NOP" => RecordKind::Nop,
                _ => {
                    return Err(TraceError::UnknownKind {
                        path: path.to_path_buf(),
                        line_no,
                        raw: fields[1].to_string(),
                    })
                }
            };

            let addr = parse_address(fields[2]).ok_or_else(|| TraceError::BadAddress {
                path: path.to_path_buf(),
                line_no,
                raw: fields[2].to_string(),
            })?;

            max_pid = Some(max_pid.map_or(pid, |m| m.max(pid)));
            records.push((pid, Record { kind, addr }));
        }

        let proc_count = declared_count.unwrap_or_else(|| max_pid.map_or(0, |m| m as usize + 1));

        let mut queues: Vec<VecDeque<Record>> = (0..proc_count).map(|_| VecDeque::new()).collect();
        for (pid, record) in records {
            if let Some(q) = queues.get_mut(pid as usize) {
                q.push_back(record);
            }
        }

        Ok(FileTraceSource {
            proc_count,
            queues: Mutex::new(queues),
        })
    }

    /// Build a trace directly from already-parsed records, one queue
    /// per pid in order. Used by integration tests.
    pub fn from_records(per_pid: Vec<Vec<Record>>) -> Self {
        let proc_count = per_pid.len();
        let queues = per_pid.into_iter().map(VecDeque::from).collect();
        FileTraceSource {
            proc_count,
            queues: Mutex::new(queues),
        }
    }
}

fn parse_address(raw: &str) -> Option<Address> {
    let raw = raw.trim();
    let value = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        raw.parse::<u32>().ok()?
    };
    Some(Address(value))
}

impl TraceSource for FileTraceSource {
    fn proc_count(&self) -> usize {
        self.proc_count
    }

    fn eof(&self, pid: Pid) -> bool {
        self.queues
            .lock()
            .unwrap()
            .get(pid as usize)
            .map_or(true, |q| q.is_empty())
    }

    fn next(&self, pid: Pid) -> Option<Record> {
        self.queues.lock().unwrap().get_mut(pid as usize)?.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{contents}").unwrap();
        f
    }

    #[test]
    fn parses_pid_kind_address_lines() {
        let f = write_trace("0 R 0x1000\n0 W 0x2000\n1 N 0x0\n");
        let trace = FileTraceSource::load(f.path()).unwrap();
        assert_eq!(trace.proc_count(), 2);
        assert_eq!(trace.next(0).unwrap().kind, RecordKind::Read);
        assert_eq!(trace.next(0).unwrap().kind, RecordKind::Write);
        assert!(trace.next(0).is_none());
        assert_eq!(trace.next(1).unwrap().kind, RecordKind::Nop);
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let f = write_trace("# a comment\n\n0 R 0x10\n");
        let trace = FileTraceSource::load(f.path()).unwrap();
        assert_eq!(trace.proc_count(), 1);
        assert!(trace.next(0).is_some());
    }

    #[test]
    fn explicit_processor_count_header() {
        let f = write_trace("4\n0 R 0x10\n");
        let trace = FileTraceSource::load(f.path()).unwrap();
        assert_eq!(trace.proc_count(), 4);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let f = write_trace("0 X 0x10\n");
        assert!(matches!(
            FileTraceSource::load(f.path()),
            Err(TraceError::UnknownKind { .. })
        ));
    }
}
