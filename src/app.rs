use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, DataPayload, SubmissionRecord};
use crate::config::AppConfig;

/// One-shot sweep: success notifications still on screen this long after
/// startup are dismissed. Notifications created later are unaffected.
const SUCCESS_SWEEP_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Danger,
}

/// Transient in-app notification, stacked until dismissed
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Modal, // Singleton response viewer
    Form,  // Submission form
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOrigin {
    Test,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Message,
}

/// Completion of a background request, delivered over the app channel
#[derive(Debug)]
pub enum ApiEvent {
    DataLoaded(Result<DataPayload, ApiError>),
    SubmitFinished {
        origin: SubmitOrigin,
        result: Result<serde_json::Value, ApiError>,
    },
}

pub struct App {
    pub client: ApiClient,
    pub config: AppConfig,
    pub popup: Popup,

    // Last successfully fetched payload (overwritten, never merged)
    pub current_data: Option<DataPayload>,
    pub selected_item: usize,

    // Loading indicator is shown while this is non-zero. Overlapping loads
    // are allowed; the last completion applied wins.
    pub loads_in_flight: usize,

    pub notifications: Vec<Notification>,
    started_at: Instant,
    sweep_done: bool,

    // Modal content (one instance, replaced in place)
    pub modal_title: String,
    pub modal_body: String,
    pub modal_scroll: u16,

    // Form buffers
    pub form_name: String,
    pub form_email: String,
    pub form_message: String,
    pub form_field: FormField,

    events_tx: mpsc::UnboundedSender<ApiEvent>,
    events_rx: mpsc::UnboundedReceiver<ApiEvent>,
}

impl App {
    pub fn new(config: AppConfig, client: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            client,
            config,
            popup: Popup::None,

            current_data: None,
            selected_item: 0,

            loads_in_flight: 0,

            notifications: Vec::new(),
            started_at: Instant::now(),
            sweep_done: false,

            modal_title: String::new(),
            modal_body: String::new(),
            modal_scroll: 0,

            form_name: String::new(),
            form_email: String::new(),
            form_message: String::new(),
            form_field: FormField::Name,

            events_tx,
            events_rx,
        }
    }

    /// Push a notification onto the stack
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Danger => tracing::warn!("{}", message),
            _ => tracing::info!("{}", message),
        }
        self.notifications.push(Notification {
            message,
            severity,
            created_at: Instant::now(),
        });
    }

    /// Dismiss the newest notification, if any
    pub fn dismiss_notification(&mut self) {
        self.notifications.pop();
    }

    /// Kick off a data fetch. Does not block; the result arrives via the
    /// event channel and is applied in tick().
    pub fn load_data(&mut self) {
        self.loads_in_flight += 1;
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(ApiEvent::DataLoaded(client.fetch_data().await));
        });
    }

    /// Send a record to /api/submit in the background
    fn submit_record(&mut self, record: SubmissionRecord, origin: SubmitOrigin) {
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.submit(&record).await;
            let _ = tx.send(ApiEvent::SubmitFinished { origin, result });
        });
    }

    /// Submit the canned test record
    pub fn submit_test(&mut self) {
        self.submit_record(SubmissionRecord::test(), SubmitOrigin::Test);
    }

    /// Open the response modal, replacing any content already shown
    pub fn show_modal(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.modal_title = title.into();
        self.modal_body = body.into();
        self.modal_scroll = 0;
        self.popup = Popup::Modal;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }
        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Fetch /api/data
            KeyCode::Char('f') | KeyCode::Char('r') => self.load_data(),

            // Submit the test record
            KeyCode::Char('s') => self.submit_test(),

            // Open the submission form
            KeyCode::Char('n') => {
                self.form_field = FormField::Name;
                self.popup = Popup::Form;
            }

            // Dismiss the newest notification
            KeyCode::Char('x') => self.dismiss_notification(),

            // Table navigation
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Help
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Modal => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                        self.popup = Popup::None;
                    }
                    KeyCode::Char('j') | KeyCode::Down => {
                        self.modal_scroll = self.modal_scroll.saturating_add(1);
                    }
                    KeyCode::Char('k') | KeyCode::Up => {
                        self.modal_scroll = self.modal_scroll.saturating_sub(1);
                    }
                    _ => {}
                }
                Ok(())
            }
            Popup::Form => self.handle_form_key(key),
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc
                        | KeyCode::Enter
                        | KeyCode::Char('q')
                        | KeyCode::Char('?')
                        | KeyCode::Char('h')
                ) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            Popup::None => Ok(()),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.popup = Popup::None;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.form_field = match self.form_field {
                    FormField::Name => FormField::Email,
                    FormField::Email => FormField::Message,
                    FormField::Message => FormField::Name,
                };
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_field = match self.form_field {
                    FormField::Name => FormField::Message,
                    FormField::Email => FormField::Name,
                    FormField::Message => FormField::Email,
                };
            }
            KeyCode::Enter => {
                // Enter advances through the fields, then submits
                match self.form_field {
                    FormField::Name => self.form_field = FormField::Email,
                    FormField::Email => self.form_field = FormField::Message,
                    FormField::Message => self.submit_form(),
                }
            }
            KeyCode::F(2) => self.submit_form(),
            KeyCode::Backspace => {
                self.focused_field_mut().pop();
            }
            KeyCode::Char(c) => {
                self.focused_field_mut().push(c);
            }
            _ => {}
        }
        Ok(())
    }

    fn focused_field_mut(&mut self) -> &mut String {
        match self.form_field {
            FormField::Name => &mut self.form_name,
            FormField::Email => &mut self.form_email,
            FormField::Message => &mut self.form_message,
        }
    }

    /// Submit the form contents (all fields required)
    fn submit_form(&mut self) {
        if self.form_name.is_empty() || self.form_email.is_empty() || self.form_message.is_empty()
        {
            self.notify("Fill in all fields before submitting", Severity::Info);
            return;
        }

        let record = SubmissionRecord::new(
            self.form_name.clone(),
            self.form_email.clone(),
            self.form_message.clone(),
        );
        self.submit_record(record, SubmitOrigin::Form);
        self.popup = Popup::None;
    }

    fn move_down(&mut self) {
        let count = self.current_data.as_ref().map_or(0, |d| d.items.len());
        if count > 0 {
            self.selected_item = (self.selected_item + 1) % count;
        }
    }

    fn move_up(&mut self) {
        let count = self.current_data.as_ref().map_or(0, |d| d.items.len());
        if count > 0 {
            self.selected_item = self.selected_item.checked_sub(1).unwrap_or(count - 1);
        }
    }

    /// Periodic housekeeping: apply completed requests, run the one-shot
    /// success sweep when its deadline passes.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }

        if !self.sweep_done && self.started_at.elapsed() >= SUCCESS_SWEEP_DELAY {
            self.sweep_success();
        }
    }

    /// Dismiss every success notification currently present. Runs once.
    pub fn sweep_success(&mut self) {
        self.sweep_done = true;
        self.notifications.retain(|n| n.severity != Severity::Success);
    }

    /// Apply a completed request. Events arrive in completion order, so
    /// when two loads overlap the later response determines the final state.
    pub fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::DataLoaded(result) => {
                // Hide the loading indicator on every completion path
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);

                match result {
                    Ok(payload) => {
                        if self.selected_item >= payload.items.len() {
                            self.selected_item = 0;
                        }
                        self.notify(
                            format!("Loaded {} items", payload.items.len()),
                            Severity::Success,
                        );
                        self.current_data = Some(payload);
                    }
                    Err(e) => {
                        self.notify(format!("Failed to load data: {}", e), Severity::Danger);
                    }
                }
            }
            ApiEvent::SubmitFinished { origin, result } => match result {
                Ok(value) => {
                    let body = serde_json::to_string_pretty(&value)
                        .unwrap_or_else(|_| value.to_string());
                    self.show_modal("Submission Result", body);
                    self.notify("Submission accepted", Severity::Success);
                    self.desktop_notify("Submission accepted");

                    if origin == SubmitOrigin::Form {
                        self.form_name.clear();
                        self.form_email.clear();
                        self.form_message.clear();
                        self.form_field = FormField::Name;
                    }
                }
                Err(e) => {
                    let message = format!("Submission failed: {}", e);
                    self.desktop_notify(&message);
                    self.notify(message, Severity::Danger);
                }
            },
        }
    }

    /// Mirror an outcome to the desktop, when enabled
    fn desktop_notify(&self, body: &str) {
        if !self.config.notifications {
            return;
        }
        if let Err(e) = notify_rust::Notification::new()
            .summary("madoguchi")
            .body(body)
            .icon("network-transmit-receive")
            .show()
        {
            tracing::debug!("Desktop notification failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Item;
    use serde_json::json;

    fn test_app() -> App {
        let config = AppConfig {
            notifications: false, // No desktop side effects in tests
            ..Default::default()
        };
        App::new(config, ApiClient::new("http://127.0.0.1:5000"))
    }

    fn payload(message: &str, items: Vec<Item>) -> DataPayload {
        DataPayload {
            message: message.to_string(),
            timestamp: "2025-07-17T00:00:00Z".to_string(),
            items,
        }
    }

    fn item(id: i64, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
        }
    }

    #[test]
    fn test_data_loaded_overwrites_current() {
        let mut app = test_app();
        app.loads_in_flight = 1;

        app.apply_event(ApiEvent::DataLoaded(Ok(payload("first", vec![item(1, "a")]))));

        assert_eq!(app.loads_in_flight, 0);
        assert_eq!(app.current_data.as_ref().unwrap().message, "first");
        assert_eq!(app.notifications.last().unwrap().severity, Severity::Success);
    }

    #[test]
    fn test_overlapping_loads_last_completion_wins() {
        let mut app = test_app();
        app.loads_in_flight = 2;

        app.apply_event(ApiEvent::DataLoaded(Ok(payload("first", vec![item(1, "a")]))));
        app.apply_event(ApiEvent::DataLoaded(Ok(payload(
            "second",
            vec![item(2, "b"), item(3, "c")],
        ))));

        assert_eq!(app.loads_in_flight, 0);
        let data = app.current_data.as_ref().unwrap();
        assert_eq!(data.message, "second");
        assert_eq!(data.items.len(), 2);
    }

    #[test]
    fn test_load_failure_hides_indicator_and_notifies() {
        let mut app = test_app();
        app.loads_in_flight = 1;

        app.apply_event(ApiEvent::DataLoaded(Err(ApiError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            message: Some("not found".to_string()),
        })));

        assert_eq!(app.loads_in_flight, 0);
        assert!(app.current_data.is_none());
        let last = app.notifications.last().unwrap();
        assert_eq!(last.severity, Severity::Danger);
        assert!(last.message.contains("not found"));
    }

    #[test]
    fn test_submit_success_shows_modal_and_resets_form() {
        let mut app = test_app();
        app.form_name = "Test User".to_string();
        app.form_email = "test@example.com".to_string();
        app.form_message = "This is a test submission".to_string();

        app.apply_event(ApiEvent::SubmitFinished {
            origin: SubmitOrigin::Form,
            result: Ok(json!({"ok": true})),
        });

        assert_eq!(app.popup, Popup::Modal);
        assert_eq!(app.modal_body, "{\n  \"ok\": true\n}");
        assert_eq!(app.notifications.last().unwrap().severity, Severity::Success);
        assert!(app.form_name.is_empty());
        assert!(app.form_email.is_empty());
        assert!(app.form_message.is_empty());
    }

    #[test]
    fn test_submit_failure_shows_no_modal() {
        let mut app = test_app();

        app.apply_event(ApiEvent::SubmitFinished {
            origin: SubmitOrigin::Test,
            result: Err(ApiError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: Some("Failed to process data".to_string()),
            }),
        });

        assert_eq!(app.popup, Popup::None);
        let last = app.notifications.last().unwrap();
        assert_eq!(last.severity, Severity::Danger);
        assert!(last.message.contains("Failed to process data"));
    }

    #[test]
    fn test_test_record_keeps_form_untouched() {
        let mut app = test_app();
        app.form_name = "draft".to_string();

        app.apply_event(ApiEvent::SubmitFinished {
            origin: SubmitOrigin::Test,
            result: Ok(json!({"status": "success"})),
        });

        assert_eq!(app.popup, Popup::Modal);
        assert_eq!(app.form_name, "draft");
    }

    #[test]
    fn test_sweep_removes_only_success_present_at_sweep_time() {
        let mut app = test_app();
        app.notify("loaded", Severity::Success);
        app.notify("oops", Severity::Danger);
        app.notify("fyi", Severity::Info);

        app.sweep_success();

        assert_eq!(app.notifications.len(), 2);
        assert!(app.notifications.iter().all(|n| n.severity != Severity::Success));

        // A success created after the sweep is not affected by it
        app.notify("later", Severity::Success);
        app.tick();
        assert!(app
            .notifications
            .iter()
            .any(|n| n.severity == Severity::Success));
    }

    #[test]
    fn test_dismiss_newest_notification() {
        let mut app = test_app();
        app.notify("one", Severity::Info);
        app.notify("two", Severity::Danger);

        app.dismiss_notification();

        assert_eq!(app.notifications.len(), 1);
        assert_eq!(app.notifications[0].message, "one");
    }

    #[test]
    fn test_selection_clamped_on_shorter_payload() {
        let mut app = test_app();
        app.loads_in_flight = 2;
        app.apply_event(ApiEvent::DataLoaded(Ok(payload(
            "long",
            vec![item(1, "a"), item(2, "b"), item(3, "c")],
        ))));
        app.selected_item = 2;

        app.apply_event(ApiEvent::DataLoaded(Ok(payload("short", vec![item(1, "a")]))));

        assert_eq!(app.selected_item, 0);
    }
}
