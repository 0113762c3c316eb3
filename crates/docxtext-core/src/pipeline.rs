use std::io::Write;

use thiserror::Error;

use crate::{PretrainData, Reader, ReaderError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Reader(#[from] ReaderError),
    #[error("failed to write record: {0}")]
    Output(#[from] std::io::Error),
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of `read()` calls, one per input file.
    pub files: usize,
    pub records: usize,
    /// Absent records, one per file that failed to read.
    pub failed: usize,
}

/// Destination for records produced by a reader.
pub trait RecordSink {
    fn write(&mut self, record: &PretrainData) -> std::io::Result<()>;
}

impl RecordSink for Vec<PretrainData> {
    fn write(&mut self, record: &PretrainData) -> std::io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write(&mut self, record: &PretrainData) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")
    }
}

/// Drive `reader` to completion, handing every present record to `sink`.
///
/// Configuration errors from `initialize()` abort before any read. A sink
/// error stops the run; the reader is finalized either way.
pub fn run<R, S>(reader: &mut R, sink: &mut S) -> Result<RunStats, PipelineError>
where
    R: Reader + ?Sized,
    S: RecordSink + ?Sized,
{
    reader.initialize()?;

    let mut stats = RunStats::default();
    let result = drain(reader, sink, &mut stats);
    reader.finalize();
    result?;

    tracing::info!(
        reader = reader.name(),
        files = stats.files,
        records = stats.records,
        failed = stats.failed,
        "reading finished"
    );
    Ok(stats)
}

fn drain<R, S>(reader: &mut R, sink: &mut S, stats: &mut RunStats) -> std::io::Result<()>
where
    R: Reader + ?Sized,
    S: RecordSink + ?Sized,
{
    while !reader.has_finished() {
        stats.files += 1;
        for record in reader.read() {
            match record {
                Some(record) => {
                    sink.write(&record)?;
                    stats.records += 1;
                }
                None => stats.failed += 1,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Meta, Records};

    /// Reader over an in-memory list; `None` entries simulate failing files.
    struct ListReader {
        items: Vec<Option<Vec<String>>>,
        queue: Vec<Option<Vec<String>>>,
        finalized: usize,
    }

    impl ListReader {
        fn new(items: Vec<Option<Vec<String>>>) -> Self {
            Self {
                items,
                queue: Vec::new(),
                finalized: 0,
            }
        }
    }

    impl Reader for ListReader {
        fn name(&self) -> &str {
            "from-list"
        }

        fn description(&self) -> &str {
            "test reader"
        }

        fn initialize(&mut self) -> Result<(), ReaderError> {
            if self.items.is_empty() {
                return Err(ReaderError::Configuration("no inputs".into()));
            }
            self.queue = self.items.iter().rev().cloned().collect();
            Ok(())
        }

        fn read(&mut self) -> Records {
            match self.queue.pop() {
                Some(Some(paragraphs)) => Records::paragraphs("mem", paragraphs),
                Some(None) => Records::failed("mem"),
                None => Records::empty(),
            }
        }

        fn has_finished(&self) -> bool {
            self.queue.is_empty()
        }

        fn finalize(&mut self) {
            self.finalized += 1;
        }
    }

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn write(&mut self, _record: &PretrainData) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn run_counts_files_records_and_failures() {
        let mut reader = ListReader::new(vec![
            Some(vec!["a".into(), "b".into()]),
            None,
            Some(vec!["c".into()]),
        ]);
        let mut sink: Vec<PretrainData> = Vec::new();
        let stats = run(&mut reader, &mut sink).unwrap();
        assert_eq!(
            stats,
            RunStats {
                files: 3,
                records: 3,
                failed: 1
            }
        );
        let contents: Vec<_> = sink.iter().map(|r| r.content()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
        assert_eq!(reader.finalized, 1);
    }

    #[test]
    fn run_propagates_configuration_error() {
        let mut reader = ListReader::new(vec![]);
        let mut sink: Vec<PretrainData> = Vec::new();
        let err = run(&mut reader, &mut sink).unwrap_err();
        assert!(matches!(err, PipelineError::Reader(ReaderError::Configuration(_))));
        assert!(sink.is_empty());
    }

    #[test]
    fn run_stops_on_sink_error_and_still_finalizes() {
        let mut reader = ListReader::new(vec![Some(vec!["a".into()]), Some(vec!["b".into()])]);
        let err = run(&mut reader, &mut FailingSink).unwrap_err();
        assert!(matches!(err, PipelineError::Output(_)));
        assert_eq!(reader.finalized, 1);
    }

    #[test]
    fn json_lines_sink_writes_one_object_per_line() {
        let mut meta = Meta::new();
        meta.insert("file".into(), "a.docx".into());
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write(&PretrainData::new("one", meta.clone())).unwrap();
        sink.write(&PretrainData::new("two", meta)).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"content":"one","meta":{"file":"a.docx"}}"#);
    }
}
