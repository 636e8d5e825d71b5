//! Blocking input sources feeding a read session.
//!
//! A session pulls one [`InputEvent`] at a time through [`KeySource`]. The
//! terminal implementation wraps `crossterm::event::read`; [`ScriptedKeys`]
//! replays a fixed sequence and is what hosts and tests use to drive the
//! editor without a terminal.

mod key_token;

use std::collections::VecDeque;

use anyhow::Result;
use core_events::{InputEvent, KeyCode, KeyEvent};

#[inline]
pub(crate) fn log_paste(text: &str) {
    tracing::trace!(target: "input.paste", paste_len = text.len(), "paste_received");
}

pub trait KeySource {
    /// Block until the next event. `Ok(None)` means the source is exhausted.
    fn next_event(&mut self) -> Result<Option<InputEvent>>;
}

/// Reads events from the controlling terminal. Raw mode must already be active.
#[derive(Debug, Default)]
pub struct CrosstermKeySource;

impl CrosstermKeySource {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for CrosstermKeySource {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        loop {
            let raw = crossterm::event::read()?;
            if let Some(event) = key_token::map_event(raw) {
                if let InputEvent::Paste(text) = &event {
                    log_paste(text);
                }
                return Ok(Some(event));
            }
        }
    }
}

/// Replays a predetermined event sequence, then reports exhaustion.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    events: VecDeque<InputEvent>,
}

impl ScriptedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// One plain key press per char; `'\n'` becomes Enter and `'\t'` Tab.
    pub fn typed(text: &str) -> Self {
        let mut keys = Self::new();
        keys.push_text(text);
        keys
    }

    pub fn push_key(&mut self, key: KeyEvent) -> &mut Self {
        self.events.push_back(InputEvent::Key(key));
        self
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            let code = match c {
                '\n' => KeyCode::Enter,
                '\t' => KeyCode::Tab,
                c => KeyCode::Char(c),
            };
            self.push_key(KeyEvent::plain(code));
        }
        self
    }

    pub fn push_event(&mut self, event: InputEvent) -> &mut Self {
        self.events.push_back(event);
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl From<Vec<InputEvent>> for ScriptedKeys {
    fn from(events: Vec<InputEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_event(&mut self) -> Result<Option<InputEvent>> {
        let event = self.events.pop_front();
        if let Some(InputEvent::Paste(text)) = &event {
            log_paste(text);
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyModifiers;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::dispatcher::Dispatch;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::layer::Layer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            let meta = event.metadata();
            self.events.lock().unwrap().push(CapturedEvent {
                target: meta.target().to_string(),
                fields: collector.fields,
            });
        }
    }

    #[test]
    fn paste_log_redacts_content() {
        let capture = Capture::default();
        let events = capture.events.clone();
        let subscriber = Registry::default().with(capture);
        let dispatch = Dispatch::new(subscriber);

        tracing::dispatcher::with_default(&dispatch, || {
            let mut keys = ScriptedKeys::new();
            keys.push_event(InputEvent::Paste("secret paste payload 💣".into()));
            let got = keys.next_event().unwrap();
            assert!(matches!(got, Some(InputEvent::Paste(_))));
        });

        let events = events.lock().unwrap();
        let event = events
            .iter()
            .find(|e| e.target == "input.paste")
            .expect("missing input.paste event");
        assert!(
            event.fields.iter().any(|(name, _)| name == "paste_len"),
            "paste_len field missing from event"
        );
        for (_, value) in &event.fields {
            assert!(
                !value.contains("secret paste payload"),
                "event leaked raw paste content: {value}"
            );
            assert!(
                !value.contains("💣"),
                "event leaked emoji from paste content: {value}"
            );
        }
    }

    #[test]
    fn typed_maps_newline_to_enter() {
        let mut keys = ScriptedKeys::typed("a\n");
        assert_eq!(keys.remaining(), 2);
        assert_eq!(
            keys.next_event().unwrap(),
            Some(InputEvent::Key(KeyEvent::plain(KeyCode::Char('a'))))
        );
        assert_eq!(
            keys.next_event().unwrap(),
            Some(InputEvent::Key(KeyEvent::plain(KeyCode::Enter)))
        );
        assert_eq!(keys.next_event().unwrap(), None);
    }

    #[test]
    fn builder_calls_chain_in_order() {
        let mut keys = ScriptedKeys::new();
        keys.push_text("x")
            .push_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT))
            .push_event(InputEvent::Resize(40, 10));
        assert_eq!(keys.remaining(), 3);
        keys.next_event().unwrap();
        assert_eq!(
            keys.next_event().unwrap(),
            Some(InputEvent::Key(KeyEvent::new(
                KeyCode::Tab,
                KeyModifiers::SHIFT
            )))
        );
        assert_eq!(
            keys.next_event().unwrap(),
            Some(InputEvent::Resize(40, 10))
        );
    }
}
