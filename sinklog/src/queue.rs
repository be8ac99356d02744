// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A sink which forwards each log line to a message broker. The broker
//! client is not part of this crate; it is injected through the `Connector`
//! and `Producer` traits.

use crate::*;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A synchronous producer for a message broker. `send` returns once the
/// broker has accepted the message or the attempt has failed.
pub trait Producer: Send {
    fn send(&mut self, topic: &str, payload: &[u8]) -> std::result::Result<(), ProducerError>;

    fn close(&mut self) -> std::result::Result<(), ProducerError>;
}

/// Creates a `Producer` for a set of brokers. Validating the broker list and
/// options is left to the implementation.
pub trait Connector {
    type Producer: Producer + 'static;

    fn connect(
        &self,
        brokers: &[String],
        options: &BTreeMap<String, String>,
    ) -> std::result::Result<Self::Producer, ProducerError>;
}

impl<F, P> Connector for F
where
    F: Fn(&[String], &BTreeMap<String, String>) -> std::result::Result<P, ProducerError>,
    P: Producer + 'static,
{
    type Producer = P;

    fn connect(
        &self,
        brokers: &[String],
        options: &BTreeMap<String, String>,
    ) -> std::result::Result<P, ProducerError> {
        self(brokers, options)
    }
}

/// Where a `QueueSink` sends its messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    /// Client specific settings, passed through to the `Connector`.
    pub options: BTreeMap<String, String>,
}

/// A `Sink` which sends each message to a topic.
pub struct QueueSink {
    topic: String,
    producer: Mutex<Box<dyn Producer>>,
}

impl QueueSink {
    /// Connects to the brokers. Fails if the connector cannot create a
    /// producer.
    pub fn connect<C: Connector>(config: QueueConfig, connector: &C) -> Result<Self> {
        let producer = connector
            .connect(&config.brokers, &config.options)
            .map_err(Error::Producer)?;
        Ok(Self::new(config.topic, producer))
    }

    /// Wraps an already connected producer.
    pub fn new<P: Producer + 'static>(topic: impl Into<String>, producer: P) -> Self {
        Self {
            topic: topic.into(),
            producer: Mutex::new(Box::new(producer)),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Sink for QueueSink {
    fn name(&self) -> String {
        format!("queue({})", self.topic)
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn write(&self, text: &str) -> Result<()> {
        // brokers keep discrete messages, the line terminator is not needed
        let payload = text.strip_suffix('\n').unwrap_or(text);
        self.producer
            .lock()
            .send(&self.topic, payload.as_bytes())
            .map_err(Error::Producer)
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        self.producer.lock().close().map_err(Error::Producer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        closed: Arc<Mutex<bool>>,
        fail: bool,
    }

    impl Producer for Recorder {
        fn send(&mut self, topic: &str, payload: &[u8]) -> std::result::Result<(), ProducerError> {
            if self.fail {
                return Err("broker unavailable".into());
            }
            self.sent.lock().push((topic.to_string(), payload.to_vec()));
            Ok(())
        }

        fn close(&mut self) -> std::result::Result<(), ProducerError> {
            *self.closed.lock() = true;
            Ok(())
        }
    }

    #[test]
    fn strips_one_newline() {
        let producer = Recorder::default();
        let sink = QueueSink::new("logs", producer.clone());
        sink.write("hello\n").unwrap();
        sink.write("two\n\n").unwrap();
        sink.write("bare").unwrap();
        sink.write("\n").unwrap();

        let sent = producer.sent.lock();
        let payloads: Vec<&[u8]> = sent.iter().map(|(_, p)| p.as_slice()).collect();
        assert_eq!(payloads, [&b"hello"[..], b"two\n", b"bare", b""]);
        assert!(sent.iter().all(|(topic, _)| topic == "logs"));
    }

    #[test]
    fn destroy_closes_producer() {
        let producer = Recorder::default();
        let sink = QueueSink::new("logs", producer.clone());
        sink.destroy().unwrap();
        assert!(*producer.closed.lock());
    }

    #[test]
    fn send_failure() {
        let producer = Recorder {
            fail: true,
            ..Default::default()
        };
        let sink = QueueSink::new("logs", producer);
        let err = sink.write("lost\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[test]
    fn connect() {
        let config = QueueConfig {
            brokers: vec!["localhost:9092".to_string()],
            topic: "app".to_string(),
            options: BTreeMap::new(),
        };

        let sink = QueueSink::connect(
            config.clone(),
            &|brokers: &[String], _: &BTreeMap<String, String>| -> std::result::Result<Recorder, ProducerError> {
                assert_eq!(brokers, ["localhost:9092"]);
                Ok(Recorder::default())
            },
        )
        .unwrap();
        assert_eq!(sink.topic(), "app");
        assert_eq!(sink.name(), "queue(app)");

        let refused = QueueSink::connect(
            config,
            &|_: &[String], _: &BTreeMap<String, String>| -> std::result::Result<Recorder, ProducerError> {
                Err("no brokers reachable".into())
            },
        );
        assert!(matches!(refused, Err(Error::Producer(_))));
    }
}
