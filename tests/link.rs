use podlink::protocol::{AdvancedRequest, Feedback, PlaybackControl, PollingCommand, PollingMode, SimpleCommand};
use podlink::sim::{PodMessage, SimulatedPod};
use podlink::{
    Accessory, AccessoryEvent, LinkConfig, Mode, PlaybackRequest, PlaybackState, SequenceState,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const TICK_MS: u64 = 250;

struct Harness {
    pod: SimulatedPod,
    link: Accessory,
    events: UnboundedReceiver<AccessoryEvent>,
}

impl Harness {
    fn new() -> Self {
        let pod = SimulatedPod::with_demo_library();
        let (tx, events) = mpsc::unbounded_channel();
        let link = Accessory::new(pod.peripherals(), LinkConfig::default(), tx);
        Self { pod, link, events }
    }

    fn step(&mut self) {
        self.pod.advance(TICK_MS);
        self.link.tick();
    }

    fn run_for(&mut self, ms: u64) {
        let until = self.pod.now_ms() + ms;
        while self.pod.now_ms() < until {
            self.step();
        }
    }

    fn drain(&mut self) -> Vec<AccessoryEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn mode_events(&mut self) -> Vec<Mode> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                AccessoryEvent::ModeChanged(mode) => Some(mode),
                _ => None,
            })
            .collect()
    }

    /// Attached, in the advanced dialect, with track 0 fully described.
    fn advanced() -> Self {
        let mut h = Self::new();
        h.pod.attach();
        h.step();
        h.link.request_advanced_dialect();
        h.step();
        h.step();
        assert_eq!(h.link.mode(), Mode::Advanced);
        assert_eq!(h.link.sequence_state(), SequenceState::Complete);
        h.drain();
        h.pod.clear_logs();
        h
    }
}

fn count<T: PartialEq>(items: &[T], wanted: &T) -> usize {
    items.iter().filter(|item| *item == wanted).count()
}

#[test]
fn presence_enters_simple_with_one_mode_event() {
    let mut h = Harness::new();
    h.step();
    assert_eq!(h.link.mode(), Mode::Unknown);
    assert!(h.drain().is_empty());

    h.pod.attach();
    h.step();

    assert_eq!(h.link.mode(), Mode::Simple);
    assert!(h.link.is_present());
    assert!(!h.link.is_advanced_active());
    assert_eq!(h.mode_events(), vec![Mode::Simple]);

    h.run_for(2_000);
    assert!(h.mode_events().is_empty());
}

#[test]
fn switching_to_advanced_reports_only_the_final_mode() {
    let mut h = Harness::new();
    h.pod.attach();
    h.step();
    h.drain();
    h.pod.clear_logs();

    h.link.request_advanced_dialect();
    h.step();

    assert_eq!(h.link.mode(), Mode::SwitchingToAdvanced);
    assert!(h.link.is_present());
    assert!(!h.link.is_advanced_active());
    assert_eq!(h.pod.advanced_log(), vec![AdvancedRequest::TimeAndStatus]);
    assert!(h.mode_events().is_empty());

    h.step();

    assert_eq!(h.link.mode(), Mode::Advanced);
    assert!(h.link.is_advanced_active());
    assert!(h.pod.is_polling());
    assert_eq!(h.mode_events(), vec![Mode::Advanced]);
}

#[test]
fn entering_advanced_fetches_metadata_for_the_current_track() {
    let mut h = Harness::new();
    h.pod.attach();
    h.step();
    h.link.request_advanced_dialect();
    h.step();
    h.drain();
    h.step();

    let events = h.drain();
    assert!(events.contains(&AccessoryEvent::TrackChanged(0)));
    let ready: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            AccessoryEvent::MetadataReady(metadata) => Some(metadata.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].position, Some(0));
    assert_eq!(ready[0].title.as_deref(), Some("So What"));

    assert_eq!(h.link.current_track_position(), Some(0));
    assert_eq!(h.link.current_title(), Some("So What"));
    assert_eq!(h.link.current_artist(), Some("Miles Davis"));
    assert_eq!(h.link.current_album(), Some("Kind of Blue"));
    assert_eq!(h.link.track_length_ms(), 562_000);
}

#[test]
fn position_change_clears_metadata_and_restarts_the_chain() {
    let mut h = Harness::advanced();

    h.pod.set_responsive(false);
    h.pod.inject(PodMessage::Polling(PollingCommand::TrackChange, 5));
    h.step();

    assert_eq!(h.drain(), vec![AccessoryEvent::TrackChanged(5)]);
    assert_eq!(h.link.current_track_position(), Some(5));
    assert_eq!(h.link.current_title(), None);
    assert_eq!(h.link.current_artist(), None);
    assert_eq!(h.link.current_album(), None);
    assert_eq!(h.link.sequence_state(), SequenceState::AwaitingTitle);
    assert_eq!(h.pod.advanced_log(), vec![AdvancedRequest::Title(5)]);

    // The title request went unanswered; the chain restarts after the timeout.
    h.pod.set_responsive(true);
    h.run_for(3_000);

    assert_eq!(h.link.sequence_state(), SequenceState::Complete);
    assert_eq!(h.link.current_title(), Some("Take Five"));
    assert_eq!(h.link.current_album(), Some("Time Out"));
    assert!(count(&h.pod.advanced_log(), &AdvancedRequest::Title(5)) >= 2);

    let ready = h
        .drain()
        .into_iter()
        .filter(|event| matches!(event, AccessoryEvent::MetadataReady(_)))
        .count();
    assert_eq!(ready, 1);
}

#[test]
fn same_position_does_not_refetch() {
    let mut h = Harness::advanced();
    h.pod.inject(PodMessage::PlaylistPosition(0));
    h.step();

    assert!(h.drain().is_empty());
    assert!(!h.pod.advanced_log().contains(&AdvancedRequest::Title(0)));
    assert_eq!(h.link.current_title(), Some("So What"));
}

#[test]
fn silent_accessory_is_dropped_after_two_windows() {
    let mut h = Harness::advanced();
    let window = h.link.config().advanced_window_ms;

    h.pod.set_responsive(false);
    h.pod.inject(PodMessage::Feedback(Feedback::Success, 0x26));
    h.step();
    let silent_since = h.pod.now_ms();

    h.run_for(window + 500);
    assert_eq!(h.link.mode(), Mode::Advanced);
    assert_eq!(h.link.missed_deadlines(), 1);
    assert!(h.mode_events().is_empty());

    while h.link.mode() == Mode::Advanced {
        assert!(h.pod.now_ms() - silent_since < 4 * window, "link never dropped");
        h.step();
    }

    assert_eq!(h.link.mode(), Mode::Unknown);
    assert!(h.pod.now_ms() - silent_since >= 2 * window);
    assert_eq!(
        h.drain(),
        vec![
            AccessoryEvent::ModeChanged(Mode::Unknown),
            AccessoryEvent::PlaybackStateChanged(PlaybackState::Unknown),
        ]
    );
    assert_eq!(h.link.current_track_position(), None);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Unknown);
    assert!(!h.pod.in_advanced_dialect());
}

#[test]
fn keepalive_holds_a_paused_link_open() {
    let mut h = Harness::advanced();
    assert_eq!(h.link.current_playback_state(), PlaybackState::Paused);

    h.run_for(20_000);

    assert_eq!(h.link.mode(), Mode::Advanced);
    assert_eq!(h.link.missed_deadlines(), 0);
    assert!(h.mode_events().is_empty());
    assert!(count(&h.pod.advanced_log(), &AdvancedRequest::TimeAndStatus) >= 5);
}

#[test]
fn polled_elapsed_time_holds_a_playing_link_open() {
    let mut h = Harness::advanced();
    h.link.request_play();
    h.step();
    h.pod.clear_logs();

    h.run_for(20_000);

    assert_eq!(h.link.mode(), Mode::Advanced);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Playing);
    assert!(h.link.elapsed_ms() > 0);
    assert!(!h.pod.advanced_log().contains(&AdvancedRequest::TimeAndStatus));
}

#[test]
fn detach_in_simple_mode_is_immediate() {
    let mut h = Harness::new();
    h.pod.attach();
    h.step();
    h.drain();

    h.pod.detach();
    h.step();

    assert_eq!(h.link.mode(), Mode::Unknown);
    assert!(!h.link.is_present());
    assert_eq!(h.link.current_playback_state(), PlaybackState::Unknown);
    assert_eq!(
        h.drain(),
        vec![
            AccessoryEvent::ModeChanged(Mode::Unknown),
            AccessoryEvent::PlaybackStateChanged(PlaybackState::Unknown),
        ]
    );
}

#[test]
fn detach_in_advanced_mode_is_caught_by_the_deadline() {
    let mut h = Harness::advanced();
    h.pod.detach();

    h.step();
    assert_eq!(h.link.mode(), Mode::Advanced);

    h.run_for(5_000);
    assert_eq!(h.link.mode(), Mode::Unknown);
    assert_eq!(h.mode_events(), vec![Mode::Unknown]);
}

#[test]
fn reattach_after_loss_starts_over_in_simple() {
    let mut h = Harness::advanced();
    h.link.request_simple_dialect();
    h.pod.detach();
    h.run_for(5_000);
    assert_eq!(h.link.mode(), Mode::Unknown);
    h.drain();

    h.pod.attach();
    h.step();
    assert_eq!(h.link.mode(), Mode::Simple);
    assert_eq!(h.mode_events(), vec![Mode::Simple]);
}

#[test]
fn returning_to_simple_disarms_the_advanced_codec() {
    let mut h = Harness::advanced();
    h.link.request_simple_dialect();
    h.step();

    assert_eq!(h.link.mode(), Mode::Simple);
    assert!(!h.pod.in_advanced_dialect());
    assert!(h.link.liveness_remaining_ms().is_none());
    assert_eq!(h.mode_events(), vec![Mode::Simple]);

    // Stale advanced traffic is discarded rather than decoded.
    h.pod.inject(PodMessage::PlaylistPosition(4));
    h.step();
    assert_eq!(h.pod.pending_inbound(), 0);
    assert_eq!(h.link.current_track_position(), Some(0));
}

#[test]
fn simple_mode_corrects_playback_once() {
    let mut h = Harness::new();
    h.pod.attach();
    h.step();
    h.pod.clear_logs();

    h.link.request_play();
    h.step();
    assert_eq!(
        h.pod.simple_log(),
        vec![
            SimpleCommand::PowerOn,
            SimpleCommand::ButtonReleased,
            SimpleCommand::JustPlay,
            SimpleCommand::ButtonReleased,
        ]
    );
    assert_eq!(h.pod.status(), podlink::protocol::PlaybackStatus::Playing);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Playing);

    h.run_for(2_000);
    assert_eq!(h.pod.simple_log().len(), 4);

    h.link.request_pause();
    h.step();
    assert_eq!(h.pod.simple_log()[6], SimpleCommand::JustPause);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Paused);
}

#[test]
fn advanced_mode_corrects_playback_once() {
    let mut h = Harness::advanced();

    h.link.request_play();
    assert_eq!(h.link.requested_playback(), PlaybackRequest::Playing);
    h.run_for(3_000);

    let toggles = count(
        &h.pod.advanced_log(),
        &AdvancedRequest::Control(PlaybackControl::PlayPause),
    );
    assert_eq!(toggles, 1);
    assert_eq!(h.pod.status(), podlink::protocol::PlaybackStatus::Playing);
    assert!(h
        .drain()
        .contains(&AccessoryEvent::PlaybackStateChanged(PlaybackState::Playing)));
}

#[test]
fn stopped_accessory_is_corrected_towards_pause() {
    let mut h = Harness::advanced();
    h.pod.set_status(podlink::protocol::PlaybackStatus::Stopped);

    let toggle = AdvancedRequest::Control(PlaybackControl::PlayPause);
    let start = h.pod.now_ms();
    while !h.pod.advanced_log().contains(&toggle) {
        assert!(h.pod.now_ms() - start < 5_000, "no correction issued");
        h.step();
    }

    assert_eq!(h.link.requested_playback(), PlaybackRequest::Paused);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Paused);

    // The toggle started a stopped accessory; the next status report
    // brings it back to paused.
    h.run_for(3_000);
    assert_eq!(h.pod.status(), podlink::protocol::PlaybackStatus::Paused);
    assert_eq!(h.link.current_playback_state(), PlaybackState::Paused);
}

#[test]
fn transport_controls_follow_the_active_dialect() {
    let mut h = Harness::new();
    h.link.next_track();
    assert!(h.pod.simple_log().is_empty());

    h.pod.attach();
    h.step();
    h.pod.clear_logs();

    h.link.next_album();
    assert_eq!(h.pod.simple_log(), vec![SimpleCommand::NextAlbum, SimpleCommand::ButtonReleased]);
    assert_eq!(h.pod.position(), 3);

    let mut h = Harness::advanced();
    h.link.next_track();
    assert_eq!(
        h.pod.advanced_log(),
        vec![AdvancedRequest::Control(PlaybackControl::SkipForward)]
    );
    h.link.next_album();
    assert!(h.pod.simple_log().is_empty());

    h.step();
    assert_eq!(h.link.current_track_position(), Some(1));
    assert_eq!(h.link.current_title(), Some("Freddie Freeloader"));
}

#[test]
fn calls_inside_the_tick_interval_do_nothing() {
    let mut h = Harness::new();
    h.pod.attach();
    h.link.tick();
    assert_eq!(h.link.mode(), Mode::Simple);

    h.pod.detach();
    h.link.tick();
    assert_eq!(h.link.mode(), Mode::Simple);

    h.step();
    assert_eq!(h.link.mode(), Mode::Unknown);
}

#[test]
fn invalid_parameter_feedback_changes_nothing() {
    let mut h = Harness::advanced();
    h.pod.inject(PodMessage::Feedback(Feedback::InvalidParameter, 0x20));
    h.step();

    assert_eq!(h.link.mode(), Mode::Advanced);
    assert!(h.mode_events().is_empty());
}

#[test]
fn polling_is_started_once_per_advanced_entry() {
    let mut h = Harness::new();
    h.pod.attach();
    h.step();
    h.link.request_advanced_dialect();
    h.run_for(5_000);

    assert_eq!(
        count(&h.pod.advanced_log(), &AdvancedRequest::SetPolling(PollingMode::Start)),
        1
    );
}
