// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use masteryhub::coach::{Coach, INSIGHTS_FALLBACK};
use masteryhub::genai::{Prompt, SpeechModel, TextModel, speech_prompt};
use masteryhub::live::{
    AudioSink, ClientMessage, CoachSession, DashboardContext, INPUT_MIME, LiveError,
    LiveTransport, OPENING_PROMPT, RealtimeInput, Scheduled, ServerMessage, SessionStatus, encode_pcm16,
};
use masteryhub::metrics::budget_report;
use masteryhub::retry::{CallError, RetryPolicy};
use masteryhub::state::AppState;
use masteryhub::storage::{CoachMemory, MemoryStorage, Speaker};
use rust_decimal::Decimal;
use serde_json::json;

struct Scripted {
    calls: AtomicUsize,
    reply: Result<String, CallError>,
}

impl Scripted {
    fn new(reply: Result<String, CallError>) -> Arc<Self> {
        Arc::new(Scripted {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextModel for Scripted {
    fn generate(&self, _prompt: &Prompt) -> Result<String, CallError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

fn coach(model: &Arc<Scripted>) -> Coach {
    let model: Arc<dyn TextModel + Send + Sync> = model.clone();
    Coach::new(Some(model), RetryPolicy::immediate(3))
}

#[test]
fn retry_backs_off_exponentially_on_rate_limits() {
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 1_000,
        max_jitter_ms: 0,
    };
    let mut slept = Vec::new();
    let mut attempts = 0;
    let out = policy.run_with_sleep(
        || {
            attempts += 1;
            if attempts < 3 {
                Err(CallError::Other("RESOURCE_EXHAUSTED: quota".into()))
            } else {
                Ok("done")
            }
        },
        |d| slept.push(d),
    );
    assert_eq!(out, Ok("done"));
    assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
}

#[test]
fn server_errors_exhaust_the_attempts_then_fall_back() {
    let model = Scripted::new(Err(CallError::Status {
        status: 503,
        message: "overloaded".into(),
    }));
    let text = coach(&model).check_in(1, 3);
    assert_eq!(model.calls(), 3);
    assert_eq!(
        text,
        "Momentum secured. You've broken the friction of zero. Keep the streak alive."
    );
}

#[test]
fn client_errors_are_not_retried() {
    let model = Scripted::new(Err(CallError::Status {
        status: 400,
        message: "bad request".into(),
    }));
    let text = coach(&model).check_in(0, 3);
    assert_eq!(model.calls(), 1);
    assert!(text.starts_with("Focus on the smallest possible starting point."));

    let all = coach(&model).check_in(3, 3);
    assert!(all.starts_with("Momentum peak achieved."));
}

#[test]
fn empty_model_reply_has_its_own_message() {
    let model = Scripted::new(Err(CallError::Empty));
    assert_eq!(
        coach(&model).check_in(1, 2),
        "Small wins are proof of momentum. One more iteration today."
    );
    assert_eq!(model.calls(), 1);
}

#[test]
fn model_text_passes_through() {
    let model = Scripted::new(Ok("Two down, keep rolling.".into()));
    assert_eq!(coach(&model).check_in(2, 5), "Two down, keep rolling.");
    assert_eq!(
        coach(&model).income_advice(Decimal::from(100), "$", &["Core Needs".into()]),
        "Two down, keep rolling."
    );
}

#[test]
fn insights_strip_bullets_or_fall_back() {
    let st = AppState::default();
    let report = budget_report(&st.buckets, &st.expenses, &st.income_records);

    let model = Scripted::new(Ok("• Strong growth allocation 🌱\n\n* Fun spend is steady\n".into()));
    assert_eq!(
        coach(&model).budget_insights(&report, "$"),
        vec!["Strong growth allocation 🌱", "Fun spend is steady"]
    );

    let failing = Scripted::new(Err(CallError::Other("boom".into())));
    assert_eq!(
        coach(&failing).budget_insights(&report, "$"),
        vec![INSIGHTS_FALLBACK.to_string()]
    );
    assert_eq!(
        Coach::offline().budget_insights(&report, "$"),
        vec![INSIGHTS_FALLBACK.to_string()]
    );
}

struct Voice {
    calls: AtomicUsize,
    failures_first: usize,
    heard: std::sync::Mutex<Vec<String>>,
}

impl SpeechModel for Voice {
    fn synthesize(&self, text: &str) -> Result<String, CallError> {
        self.heard.lock().unwrap().push(speech_prompt(text));
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures_first {
            return Err(CallError::Status {
                status: 429,
                message: "RESOURCE_EXHAUSTED".into(),
            });
        }
        Ok(encode_pcm16(&[0.5; 4_800]))
    }
}

#[test]
fn speech_retries_and_decodes_the_audio() {
    let voice = Arc::new(Voice {
        calls: AtomicUsize::new(0),
        failures_first: 1,
        heard: Default::default(),
    });
    let coach = Coach::new(None, RetryPolicy::immediate(3)).with_voice(voice.clone());
    let frames = coach.speak("  Stay the course  ").unwrap();
    assert_eq!(frames.len(), 4_800);
    assert_eq!(frames[0], 0.5);
    assert_eq!(voice.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        voice.heard.lock().unwrap()[0],
        "Say with extreme motivation and professional clarity: Stay the course"
    );

    assert!(coach.speak("   ").is_err());
    assert_eq!(Coach::offline().speak("hi"), Err(CallError::MissingKey));
}

#[derive(Default)]
struct Wire {
    sent: Vec<ClientMessage>,
    inbox: VecDeque<ServerMessage>,
    closed: bool,
}

struct ScriptedTransport(Rc<RefCell<Wire>>);

impl LiveTransport for ScriptedTransport {
    fn send(&mut self, msg: &ClientMessage) -> Result<(), LiveError> {
        self.0.borrow_mut().sent.push(msg.clone());
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<ServerMessage>, LiveError> {
        Ok(self.0.borrow_mut().inbox.pop_front())
    }

    fn close(&mut self) -> Result<(), LiveError> {
        self.0.borrow_mut().closed = true;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    played: Vec<Scheduled>,
    stopped: Vec<u64>,
}

impl AudioSink for RecordingSink {
    fn now(&self) -> f64 {
        0.0
    }

    fn play(&mut self, slot: Scheduled, _samples: &[f32]) {
        self.played.push(slot);
    }

    fn stop(&mut self, id: u64) {
        self.stopped.push(id);
    }
}

fn msg(v: serde_json::Value) -> ServerMessage {
    serde_json::from_value(v).unwrap()
}

fn audio(samples: usize) -> ServerMessage {
    let data = encode_pcm16(&vec![0.25; samples]);
    msg(json!({
        "serverContent": {
            "modelTurn": { "parts": [{ "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": data } }] }
        }
    }))
}

#[test]
fn live_session_records_finished_turns() {
    let storage = MemoryStorage::new();
    let wire = Rc::new(RefCell::new(Wire::default()));
    let ctx = DashboardContext::from_state(&AppState::default());
    let mut session = CoachSession::start(
        ScriptedTransport(wire.clone()),
        RecordingSink::default(),
        CoachMemory::new(&storage),
        Some(&ctx),
    )
    .unwrap();

    {
        let w = wire.borrow();
        assert_eq!(w.sent.len(), 2);
        assert!(matches!(w.sent[0], ClientMessage::Setup(_)));
        assert_eq!(
            w.sent[1],
            ClientMessage::RealtimeInput(RealtimeInput::Text(OPENING_PROMPT.to_string()))
        );
    }
    assert!(session.is_thinking());

    wire.borrow_mut().inbox.extend([
        msg(json!({ "serverContent": { "inputTranscription": { "text": "How was " } } })),
        msg(json!({ "serverContent": { "inputTranscription": { "text": "my day?" } } })),
        msg(json!({ "serverContent": { "outputTranscription": { "text": "Great work" } } })),
        audio(2_400),
        msg(json!({ "serverContent": { "turnComplete": true } })),
    ]);
    while !wire.borrow().inbox.is_empty() {
        assert!(session.pump().unwrap());
    }

    let lines = session.transcript();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "How was my day?");
    assert_eq!(lines[1].sender, Speaker::Coach);
    assert!(lines.iter().all(|l| !l.pending));
    assert!(!session.is_thinking());
    assert_eq!(session.sink().played.len(), 1);
    assert!((session.sink().played[0].end - 0.1).abs() < 1e-9);

    // Remote hangs up.
    assert!(!session.pump().unwrap());
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(wire.borrow().closed);
    drop(session);

    let entries = CoachMemory::new(&storage).entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "How was my day?");
    assert_eq!(entries[0].sender, Speaker::User);
    assert_eq!(entries[1].text, "Great work");
    assert_eq!(entries[1].sender, Speaker::Coach);
}

#[test]
fn interruption_stops_queued_audio() {
    let storage = MemoryStorage::new();
    let wire = Rc::new(RefCell::new(Wire::default()));
    let mut session = CoachSession::start(
        ScriptedTransport(wire.clone()),
        RecordingSink::default(),
        CoachMemory::new(&storage),
        None,
    )
    .unwrap();

    session.handle(&audio(2_400)).unwrap();
    session.handle(&audio(2_400)).unwrap();
    let played = session.sink().played.clone();
    assert_eq!(played.len(), 2);
    assert!((played[1].start - played[0].end).abs() < 1e-9);

    session
        .handle(&msg(json!({ "serverContent": { "interrupted": true } })))
        .unwrap();
    assert_eq!(session.sink().stopped, vec![played[0].id, played[1].id]);
    assert!(session.scheduler().in_flight().is_empty());
    assert_eq!(session.scheduler().next_start(), 0.0);

    session.send_text("  ").unwrap();
    session.send_text("Quick question").unwrap();
    session.send_audio(&[0.0, 0.5]).unwrap();
    {
        let w = wire.borrow();
        assert_eq!(w.sent.len(), 4);
        match &w.sent[3] {
            ClientMessage::RealtimeInput(RealtimeInput::Audio(blob)) => {
                assert_eq!(blob.mime_type, INPUT_MIME);
                assert_eq!(blob.data, encode_pcm16(&[0.0, 0.5]));
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }
    session.close();
    assert!(wire.borrow().closed);
    assert_eq!(CoachMemory::new(&storage).entries()[0].text, "Quick question");
}

#[test]
fn corrupt_audio_still_honours_the_interrupt() {
    let storage = MemoryStorage::new();
    let wire = Rc::new(RefCell::new(Wire::default()));
    let mut session = CoachSession::start(
        ScriptedTransport(wire.clone()),
        RecordingSink::default(),
        CoachMemory::new(&storage),
        None,
    )
    .unwrap();
    session.handle(&audio(2_400)).unwrap();
    let queued = session.sink().played[0].id;

    wire.borrow_mut().inbox.push_back(msg(json!({
        "serverContent": {
            "interrupted": true,
            "modelTurn": { "parts": [{ "inlineData": { "mimeType": "audio/pcm;rate=24000", "data": "@@@" } }] }
        }
    })));
    assert!(matches!(session.pump(), Err(LiveError::Base64(_))));
    assert_eq!(session.sink().stopped, vec![queued]);
    assert_eq!(session.status(), SessionStatus::Error);
    assert!(wire.borrow().closed);
}
