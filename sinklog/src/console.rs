// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;
use parking_lot::Mutex;
use std::io::Write;

/// A sink which writes to standard output, or any other shared stream.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Writes to `writer` instead of standard output.
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> String {
        "console".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(text.as_bytes()).map_err(Error::Write)
    }

    // the stream owns its buffering, this only pushes out anything the
    // std handle is holding
    fn flush(&self) -> Result<()> {
        self.writer.lock().flush().map_err(Error::Flush)
    }

    fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_verbatim() {
        let buffer = Shared::default();
        let sink = ConsoleSink::with_writer(buffer.clone());
        sink.initialize().unwrap();
        sink.write("one\n").unwrap();
        sink.write("two\n").unwrap();
        sink.flush().unwrap();
        sink.destroy().unwrap();
        assert_eq!(&*buffer.0.lock(), b"one\ntwo\n");
    }

    #[test]
    fn concurrent_writers() {
        let buffer = Shared::default();
        let sink = Arc::new(ConsoleSink::with_writer(buffer.clone()));

        let threads: Vec<_> = (0..4)
            .map(|id| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        sink.write(&format!("thread-{id} line-{i:03}\n")).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("thread-") && l.len() == "thread-0 line-000".len()));
    }
}
