//! Bench module - Interactive harness around a simulated accessory
//!
//! - `input`: Key event handling

mod input;

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use podlink::sim::SimulatedPod;
use podlink::{Accessory, AccessoryEvent, LinkConfig};

const LOG_CAPACITY: usize = 200;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub sim_ms: u64,
    pub text: String,
}

pub struct Bench {
    pub link: Accessory,
    pub pod: SimulatedPod,
    pub log: VecDeque<LogEntry>,
    pub show_help: bool,
    pub should_quit: bool,
}

impl Bench {
    pub fn new(config: LinkConfig) -> (Self, UnboundedReceiver<AccessoryEvent>) {
        let pod = SimulatedPod::with_demo_library();
        let (tx, rx) = mpsc::unbounded_channel();
        let link = Accessory::new(pod.peripherals(), config, tx);

        let bench = Self {
            link,
            pod,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            show_help: false,
            should_quit: false,
        };
        (bench, rx)
    }

    /// Let simulated time pass and give the link a chance to run.
    pub fn step(&mut self, ms: u64) {
        self.pod.advance(ms);
        self.link.tick();
    }

    pub fn record(&mut self, event: AccessoryEvent) {
        tracing::debug!(?event, "Accessory event");
        let text = match event {
            AccessoryEvent::ModeChanged(mode) => format!("mode -> {:?}", mode),
            AccessoryEvent::TrackChanged(position) => format!("track -> #{}", position),
            AccessoryEvent::MetadataReady(metadata) => format!(
                "metadata: {} / {} / {}",
                metadata.title.as_deref().unwrap_or("?"),
                metadata.artist.as_deref().unwrap_or("?"),
                metadata.album.as_deref().unwrap_or("?"),
            ),
            AccessoryEvent::PlaybackStateChanged(state) => format!("playback -> {:?}", state),
        };
        self.note(text);
    }

    pub fn note(&mut self, text: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            at: Local::now(),
            sim_ms: self.pod.now_ms(),
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podlink::Mode;

    #[test]
    fn log_is_bounded() {
        let (mut bench, _rx) = Bench::new(LinkConfig::default());
        for i in 0..LOG_CAPACITY + 10 {
            bench.note(format!("entry {}", i));
        }
        assert_eq!(bench.log.len(), LOG_CAPACITY);
        assert_eq!(bench.log.front().map(|e| e.text.as_str()), Some("entry 10"));
    }

    #[test]
    fn events_reach_the_receiver() {
        let (mut bench, mut rx) = Bench::new(LinkConfig::default());
        bench.pod.attach();
        bench.step(250);

        let event = rx.try_recv().unwrap();
        assert_eq!(event, AccessoryEvent::ModeChanged(Mode::Simple));
        bench.record(event);
        assert_eq!(bench.log.back().map(|e| e.text.as_str()), Some("mode -> Simple"));
    }
}
