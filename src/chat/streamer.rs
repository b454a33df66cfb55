// src/chat/streamer.rs
//! Typewriter reveal of a finished answer.
//!
//! The full text is already known; it is revealed one word at a time with a
//! small random pause between words. Every write goes back to the UI loop as a
//! [`ChatIntent`] tagged with the generation the reveal was started under, and
//! the task stops on its own as soon as that generation is no longer current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use super::state::ChatIntent;
use crate::event::{AppEvent, Event, EventSender};
use crate::util::config::StreamConfig;
use crate::log_debug;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamStep {
    pub content: String,
    pub is_streaming: bool,
}

/// The text as the reveal leaves it: words joined by single spaces.
pub fn joined_words(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cumulative content after each word. The last step is the only one with
/// `is_streaming == false`; empty text yields no steps.
pub fn plan_steps(text: &str) -> Vec<StreamStep> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let last = words.len().saturating_sub(1);
    let mut content = String::new();

    words.iter()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 {
                content.push(' ');
            }
            content.push_str(word);
            StreamStep {
                content: content.clone(),
                is_streaming: i < last,
            }
        })
        .collect()
}

/// Write permission for one background task
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    current: Arc<AtomicU64>,
    generation: u64,
}

impl GenerationGuard {
    pub fn new(current: Arc<AtomicU64>, generation: u64) -> Self {
        Self { current, generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Debug, Clone)]
pub struct StreamSimulator {
    config: StreamConfig,
    sender: EventSender,
}

impl StreamSimulator {
    pub fn new(config: StreamConfig, sender: EventSender) -> Self {
        Self { config, sender }
    }

    pub fn spawn(&self, guard: GenerationGuard, message_id: String, text: String) -> JoinHandle<()> {
        let simulator = self.clone();
        tokio::spawn(async move { simulator.run(guard, message_id, text).await })
    }

    pub async fn run(&self, guard: GenerationGuard, message_id: String, text: String) {
        let generation = guard.generation();

        for step in plan_steps(&text) {
            if !guard.is_current() {
                log_debug!("Stream for {} superseded", message_id);
                return;
            }
            self.send(ChatIntent::StreamStep {
                generation,
                message_id: message_id.clone(),
                content: step.content,
                is_streaming: step.is_streaming,
            });
            tokio::time::sleep(self.word_delay()).await;
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        if guard.is_current() {
            self.send(ChatIntent::StreamFinished { generation, message_id });
        }
    }

    fn word_delay(&self) -> Duration {
        let (min, max) = (self.config.min_delay_ms, self.config.max_delay_ms);
        let ms = if max > min {
            rand::thread_rng().gen_range(min..max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }

    fn send(&self, intent: ChatIntent) {
        let _ = self.sender.send(Event::App(AppEvent::Chat(intent)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_plan_steps_accumulates_words() {
        let steps = plan_steps("  Section 2\ncovers   patterns ");
        let contents: Vec<&str> = steps.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["Section", "Section 2", "Section 2 covers", "Section 2 covers patterns"]);

        let flags: Vec<bool> = steps.iter().map(|s| s.is_streaming).collect();
        assert_eq!(flags, vec![true, true, true, false]);
    }

    #[test]
    fn test_last_step_matches_joined_words() {
        let text = "Line one\n\nLine  two";
        let steps = plan_steps(text);
        assert_eq!(steps.last().unwrap().content, joined_words(text));
        assert_eq!(joined_words(text), "Line one Line two");
    }

    #[test]
    fn test_plan_steps_empty_text() {
        assert!(plan_steps("").is_empty());
        assert!(plan_steps("   ").is_empty());
    }

    fn collect(receiver: &mut mpsc::UnboundedReceiver<Event>) -> Vec<ChatIntent> {
        let mut intents = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let Event::App(AppEvent::Chat(intent)) = event {
                intents.push(intent);
            }
        }
        intents
    }

    #[tokio::test]
    async fn test_run_sends_steps_then_finished() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let simulator = StreamSimulator::new(StreamConfig::instant(), sender);
        let current = Arc::new(AtomicU64::new(3));

        simulator.run(GenerationGuard::new(current, 3), "m1".to_string(), "one two".to_string()).await;

        let intents = collect(&mut receiver);
        assert_eq!(intents.len(), 3);
        assert!(matches!(&intents[1], ChatIntent::StreamStep { content, is_streaming: false, .. } if content == "one two"));
        assert!(matches!(&intents[2], ChatIntent::StreamFinished { generation: 3, .. }));
    }

    #[tokio::test]
    async fn test_run_stops_when_superseded() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let simulator = StreamSimulator::new(StreamConfig::instant(), sender);
        let current = Arc::new(AtomicU64::new(4));

        simulator.run(GenerationGuard::new(current, 3), "m1".to_string(), "one two".to_string()).await;

        assert!(collect(&mut receiver).is_empty());
    }
}
