// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Real-time voice coaching: PCM framing, playback scheduling and the
//! session state machine. The wire and the speaker are traits so the session
//! runs the same over a socket, a recording, or a test script.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::metrics::focus_stats;
use crate::state::AppState;
use crate::storage::{CoachMemory, Speaker};

pub const LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";
pub const VOICE: &str = "Zephyr";
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;
pub const INPUT_MIME: &str = "audio/pcm;rate=16000";
pub const OPENING_PROMPT: &str = "I'm here. Open the conversation warmly by referencing a specific win from my dashboard and asking a deep follow-up question.";
const NO_BASELINE: &str = "Initializing new baseline...";

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("invalid base64 audio: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PCM payload has odd length {0}")]
    OddLength(usize),
    #[error("live transport: {0}")]
    Transport(String),
    #[error("session already closed")]
    Closed,
}

/// Float frames in [-1, 1] to base64 little-endian i16.
pub fn encode_pcm16(frames: &[f32]) -> String {
    B64.encode(pcm16_bytes(frames))
}

fn pcm16_bytes(frames: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frames.len() * 2);
    for f in frames {
        let s = (f * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

pub fn decode_pcm16(data: &str) -> Result<Vec<f32>, LiveError> {
    let bytes = B64.decode(data)?;
    if bytes.len() % 2 != 0 {
        return Err(LiveError::OddLength(bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])) / 32768.0)
        .collect())
}

/// Wraps float frames in a 16-bit mono RIFF/WAVE container.
pub fn wav_bytes(frames: &[f32], rate: u32) -> Vec<u8> {
    let data_len = (frames.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(&pcm16_bytes(frames));
    out
}

pub fn duration_secs(samples: usize, rate: u32) -> f64 {
    samples as f64 / f64::from(rate)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    pub id: u64,
    pub start: f64,
    pub end: f64,
}

/// Gapless queue of output chunks on the sink's clock.
#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    next_start: f64,
    next_id: u64,
    in_flight: Vec<Scheduled>,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    pub fn in_flight(&self) -> &[Scheduled] {
        &self.in_flight
    }

    /// Slots a chunk right after the previous one, or now if the queue ran dry.
    pub fn schedule(&mut self, now: f64, duration: f64) -> Scheduled {
        let start = self.next_start.max(now);
        self.next_id += 1;
        let slot = Scheduled {
            id: self.next_id,
            start,
            end: start + duration,
        };
        self.next_start = slot.end;
        self.in_flight.push(slot);
        slot
    }

    /// Forgets chunks that finished playing.
    pub fn reap(&mut self, now: f64) {
        self.in_flight.retain(|s| s.end > now);
    }

    /// Drops everything queued and rewinds the cursor; returns what must be stopped.
    pub fn interrupt(&mut self) -> Vec<Scheduled> {
        self.next_start = 0.0;
        std::mem::take(&mut self.in_flight)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default)]
    pub setup_complete: Option<Value>,
    #[serde(default)]
    pub server_content: Option<ServerContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default)]
    pub input_transcription: Option<Transcription>,
    #[serde(default)]
    pub output_transcription: Option<Transcription>,
    #[serde(default)]
    pub model_turn: Option<ModelTurn>,
    #[serde(default)]
    pub turn_complete: bool,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<ModelPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPart {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl ServerMessage {
    fn audio(&self) -> Option<&str> {
        self.server_content
            .as_ref()?
            .model_turn
            .as_ref()?
            .parts
            .first()?
            .inline_data
            .as_ref()
            .map(|d| d.data.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientMessage {
    Setup(Setup),
    RealtimeInput(RealtimeInput),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub model: String,
    pub generation_config: Value,
    pub system_instruction: Value,
    pub input_audio_transcription: Value,
    pub output_audio_transcription: Value,
}

impl Setup {
    pub fn new(system_instruction: &str) -> Self {
        Setup {
            model: format!("models/{LIVE_MODEL}"),
            generation_config: serde_json::json!({
                "responseModalities": ["AUDIO"],
                "speechConfig": { "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": VOICE } } },
            }),
            system_instruction: serde_json::json!({ "parts": [{ "text": system_instruction }] }),
            input_audio_transcription: serde_json::json!({}),
            output_audio_transcription: serde_json::json!({}),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RealtimeInput {
    Audio(InlineData),
    Text(String),
}

pub trait LiveTransport {
    fn send(&mut self, msg: &ClientMessage) -> Result<(), LiveError>;
    /// Next server message; `None` once the remote side closed.
    fn recv(&mut self) -> Result<Option<ServerMessage>, LiveError>;
    fn close(&mut self) -> Result<(), LiveError>;
}

pub trait AudioSink {
    /// Current time on the output clock, in seconds.
    fn now(&self) -> f64;
    fn play(&mut self, slot: Scheduled, samples: &[f32]);
    fn stop(&mut self, id: u64);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardContext {
    pub completed_wins: usize,
    pub total_wins: usize,
    pub active_habits: Vec<String>,
    pub focus_level: u64,
    pub recent_trade_result: String,
}

impl DashboardContext {
    pub fn from_state(state: &AppState) -> Self {
        let focus = focus_stats(
            &state.wins,
            &state.tasks,
            &state.trades,
            &state.mastery_habits,
        );
        DashboardContext {
            completed_wins: state.wins.iter().filter(|w| w.completed).count(),
            total_wins: state.wins.len(),
            active_habits: state
                .mastery_habits
                .iter()
                .map(|h| format!("{}: {}/{}", h.label, h.progress, h.total))
                .collect(),
            focus_level: focus.level,
            recent_trade_result: state
                .trades
                .first()
                .map(|t| format!("{:?}", t.status))
                .unwrap_or_else(|| "No trades yet".to_string()),
        }
    }
}

pub fn system_instruction(ctx: Option<&DashboardContext>, history: &str) -> String {
    let stats = match ctx {
        Some(c) => format!(
            "DASHBOARD CONTEXT:\nWins: {}/{} Done\nLVL: {}\nHabits: {}\nLast Trade: {}",
            c.completed_wins,
            c.total_wins,
            c.focus_level,
            c.active_habits.join(", "),
            c.recent_trade_result
        ),
        None => NO_BASELINE.to_string(),
    };
    format!(
        "ROLE: Mastery Coach, Growth Companion, and Casual Friend.
PERSONA: You are a seamless part of the user's life. You aren't just a digital tool; you're a supportive, high-vibes companion. You are warm, encouraging, and treat the user with the familiarity of a close friend.
STRICT CONVERSATION RULES:
1. TWO-WAY DIALOGUE: Always Reflect, Respond, and ask ONE Follow-up question to keep the flow alive.
2. SOCIAL AWARENESS: You acknowledge and speak about people the user mentions (e.g., 'my wife', 'my friend', 'my partner', 'my kids'). If they ask you to 'say hi' to someone, respond as a friendly third-person companion.
3. ANTI-SILENCE: Never give one-word answers. If the user is quiet, probe deeper into their goals or current mood.
4. CONTEXT: Refer to dashboard stats and past history below to show you're paying attention to their journey.
5. TONE: Warm, calm, human mentor with a casual, fun edge. Spread good vibes.

DASHBOARD:
{stats}

HISTORY:
{history}
"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Active,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLine {
    pub text: String,
    pub sender: Speaker,
    /// Still being streamed for the current turn.
    pub pending: bool,
}

pub struct CoachSession<'a, T: LiveTransport, A: AudioSink> {
    transport: Option<T>,
    sink: A,
    memory: CoachMemory<'a>,
    scheduler: PlaybackScheduler,
    current_input: String,
    current_output: String,
    transcript: Vec<TranscriptLine>,
    status: SessionStatus,
    thinking: bool,
}

impl<'a, T: LiveTransport, A: AudioSink> CoachSession<'a, T, A> {
    /// Sends the setup frame and the opening prompt over an open transport.
    pub fn start(
        mut transport: T,
        sink: A,
        memory: CoachMemory<'a>,
        ctx: Option<&DashboardContext>,
    ) -> Result<Self, LiveError> {
        let instruction = system_instruction(ctx, &memory.transcript());
        transport.send(&ClientMessage::Setup(Setup::new(&instruction)))?;
        transport.send(&ClientMessage::RealtimeInput(RealtimeInput::Text(
            OPENING_PROMPT.to_string(),
        )))?;
        tracing::info!(model = LIVE_MODEL, "live coach session opened");
        Ok(CoachSession {
            transport: Some(transport),
            sink,
            memory,
            scheduler: PlaybackScheduler::new(),
            current_input: String::new(),
            current_output: String::new(),
            transcript: Vec::new(),
            status: SessionStatus::Active,
            thinking: true,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    fn transport(&mut self) -> Result<&mut T, LiveError> {
        self.transport.as_mut().ok_or(LiveError::Closed)
    }

    pub fn send_text(&mut self, text: &str) -> Result<(), LiveError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.transport()?
            .send(&ClientMessage::RealtimeInput(RealtimeInput::Text(
                text.to_string(),
            )))?;
        self.transcript.push(TranscriptLine {
            text: text.to_string(),
            sender: Speaker::User,
            pending: false,
        });
        if let Err(e) = self.memory.record(text, Speaker::User) {
            tracing::warn!(error = %e, "coach memory write failed");
        }
        self.thinking = true;
        Ok(())
    }

    /// Streams one microphone buffer sampled at 16 kHz.
    pub fn send_audio(&mut self, frames: &[f32]) -> Result<(), LiveError> {
        let blob = InlineData {
            mime_type: INPUT_MIME.to_string(),
            data: encode_pcm16(frames),
        };
        self.transport()?
            .send(&ClientMessage::RealtimeInput(RealtimeInput::Audio(blob)))
    }

    fn stream_line(&mut self, sender: Speaker) {
        let text = match sender {
            Speaker::User => self.current_input.clone(),
            Speaker::Coach => self.current_output.clone(),
        };
        match self.transcript.last_mut() {
            Some(last) if last.pending && last.sender == sender => last.text = text,
            _ => self.transcript.push(TranscriptLine {
                text,
                sender,
                pending: true,
            }),
        }
    }

    pub fn handle(&mut self, msg: &ServerMessage) -> Result<(), LiveError> {
        if let Some(content) = &msg.server_content {
            if let Some(t) = &content.input_transcription {
                if !t.text.trim().is_empty() {
                    self.current_input.push_str(&t.text);
                    self.thinking = true;
                    self.stream_line(Speaker::User);
                }
            }
            if let Some(t) = &content.output_transcription {
                if !t.text.trim().is_empty() {
                    self.current_output.push_str(&t.text);
                    self.thinking = false;
                    self.stream_line(Speaker::Coach);
                }
            }
            if content.turn_complete {
                self.finish_turn();
            }
        }

        if msg.server_content.as_ref().is_some_and(|c| c.interrupted) {
            for slot in self.scheduler.interrupt() {
                self.sink.stop(slot.id);
            }
        }

        if let Some(data) = msg.audio() {
            let samples = decode_pcm16(data)?;
            let now = self.sink.now();
            self.scheduler.reap(now);
            let slot = self
                .scheduler
                .schedule(now, duration_secs(samples.len(), OUTPUT_SAMPLE_RATE));
            self.sink.play(slot, &samples);
        }
        Ok(())
    }

    fn finish_turn(&mut self) {
        for (text, who) in [
            (std::mem::take(&mut self.current_input), Speaker::User),
            (std::mem::take(&mut self.current_output), Speaker::Coach),
        ] {
            if !text.is_empty() {
                if let Err(e) = self.memory.record(&text, who) {
                    tracing::warn!(error = %e, "coach memory write failed");
                }
            }
        }
        for line in &mut self.transcript {
            line.pending = false;
        }
        self.thinking = false;
    }

    /// Reads and applies one server message. Returns false once the remote closed.
    pub fn pump(&mut self) -> Result<bool, LiveError> {
        let next = match self.transport()?.recv() {
            Ok(next) => next,
            Err(e) => return Err(self.fail(e)),
        };
        match next {
            Some(msg) => match self.handle(&msg) {
                Ok(()) => Ok(true),
                Err(e) => Err(self.fail(e)),
            },
            None => {
                self.status = SessionStatus::Idle;
                self.teardown();
                Ok(false)
            }
        }
    }

    fn fail(&mut self, e: LiveError) -> LiveError {
        tracing::error!(error = %e, "coach connection error");
        self.status = SessionStatus::Error;
        self.teardown();
        e
    }

    fn teardown(&mut self) {
        for slot in self.scheduler.interrupt() {
            self.sink.stop(slot.id);
        }
        if let Some(mut t) = self.transport.take() {
            if let Err(e) = t.close() {
                tracing::debug!(error = %e, "transport close failed");
            }
        }
        self.thinking = false;
    }

    pub fn close(mut self) {
        self.status = SessionStatus::Idle;
        self.teardown();
    }
}

impl<T: LiveTransport, A: AudioSink> Drop for CoachSession<'_, T, A> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm_codec_scales_and_clamps() {
        let b64 = encode_pcm16(&[0.0, 0.5, -1.0, 1.0]);
        let back = decode_pcm16(&b64).unwrap();
        assert_eq!(back[0], 0.0);
        assert_eq!(back[1], 0.5);
        assert_eq!(back[2], -1.0);
        assert_eq!(back[3], 32767.0 / 32768.0);
        assert!(matches!(decode_pcm16("AAEC"), Err(LiveError::OddLength(3))));
    }

    #[test]
    fn wav_header_describes_mono_pcm() {
        let wav = wav_bytes(&[0.0, 0.5, -0.5], OUTPUT_SAMPLE_RATE);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 42);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 24_000);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 16_384);
    }

    #[test]
    fn scheduler_is_gapless_and_rewinds_on_interrupt() {
        let mut s = PlaybackScheduler::new();
        let a = s.schedule(1.0, 0.5);
        let b = s.schedule(1.2, 0.5);
        assert_eq!(a.start, 1.0);
        assert_eq!(b.start, 1.5);
        let c = s.schedule(5.0, 0.1);
        assert_eq!(c.start, 5.0);
        s.reap(2.5);
        assert_eq!(s.in_flight().len(), 1);
        let stopped = s.interrupt();
        assert_eq!(stopped.len(), 1);
        assert_eq!(s.next_start(), 0.0);
        assert!(s.in_flight().is_empty());
    }

    #[test]
    fn instruction_uses_baseline_without_stats() {
        let text = system_instruction(None, "hist");
        assert!(text.contains("Initializing new baseline..."));
        assert!(text.contains("HISTORY:\nhist"));
    }
}
