use gloo_timers::callback::Timeout;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{File, KeyboardEvent, SubmitEvent};

use crate::api::ApiClient;
use crate::bridge::{self, Command, Shortcut, UploadSeed};
use crate::cascade::{Cascade, CascadeState};
use crate::config::ClientConfig;
use crate::models::Note;
use crate::notify::Notifier;
use crate::upload::{self, Completion, FileMeta, UploadForm};
use crate::validate::validate_file;

pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const NOTE_LOAD_ERROR: &str = "Error loading note details";
pub const SEARCH_PENDING: &str = "Search functionality coming soon!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedStep {
    Subject(String),
    Class(String),
    Index(String),
}

/// The next seeded value to apply, one level below the deepest selection made so
/// far. Stops at the first value the loaded options do not offer, or once the
/// selection has moved away from the seed.
pub fn next_seed_step(state: &CascadeState, seed: &UploadSeed) -> Option<SeedStep> {
    let subject = seed.subject.as_deref()?;
    if state.subject.is_empty() {
        return state
            .subjects
            .iter()
            .any(|name| name == subject)
            .then(|| SeedStep::Subject(subject.to_string()));
    }
    if state.subject != subject {
        return None;
    }
    let class_name = seed.class_name.as_deref()?;
    if state.class_name.is_empty() {
        return state
            .classes
            .iter()
            .any(|name| name == class_name)
            .then(|| SeedStep::Class(class_name.to_string()));
    }
    if state.class_name != class_name || !state.index_key.is_empty() {
        return None;
    }
    let index_key = seed.index_key.as_deref()?;
    state
        .has_index(index_key)
        .then(|| SeedStep::Index(index_key.to_string()))
}

/// Everything the modals and global listeners act on.
#[derive(Clone, Copy)]
pub struct Controller {
    pub config: StoredValue<ClientConfig>,
    pub api: StoredValue<ApiClient>,
    pub notifier: Notifier,
    pub cascade: Cascade,
    pub upload_open: RwSignal<bool>,
    pub uploading: RwSignal<bool>,
    pub note: RwSignal<Option<Note>>,
    pub note_open: RwSignal<bool>,
    pub form_ref: NodeRef<html::Form>,
    pub file_ref: NodeRef<html::Input>,
}

impl Controller {
    pub fn new(config: ClientConfig, api: ApiClient, notifier: Notifier) -> Self {
        Self {
            config: StoredValue::new(config),
            api: StoredValue::new(api),
            notifier,
            cascade: Cascade::new(),
            upload_open: RwSignal::new(false),
            uploading: RwSignal::new(false),
            note: RwSignal::new(None),
            note_open: RwSignal::new(false),
            form_ref: NodeRef::new(),
            file_ref: NodeRef::new(),
        }
    }

    pub fn load_subjects(self) {
        let api = self.api.get_value();
        spawn_local(async move {
            self.cascade.load_subjects(&api).await;
        });
    }

    /// Opens the upload modal, then walks the seed down the cascade one
    /// completed fetch at a time.
    pub fn show_upload_modal(self, seed: UploadSeed) {
        self.upload_open.set(true);
        let api = self.api.get_value();
        let cascade = self.cascade;
        spawn_local(async move {
            cascade.load_subjects(&api).await;
            for _ in 0..3 {
                let Some(step) = cascade.state().with_untracked(|s| next_seed_step(s, &seed)) else {
                    break;
                };
                match step {
                    SeedStep::Subject(subject) => cascade.on_subject_change(&api, subject).await,
                    SeedStep::Class(class_name) => cascade.on_class_change(&api, class_name).await,
                    SeedStep::Index(index_key) => {
                        cascade.select_index(index_key);
                        break;
                    }
                }
            }
        });
    }

    pub fn close_upload_modal(self) {
        self.upload_open.set(false);
        if let Some(form) = self.form_ref.get_untracked() {
            form.reset();
        }
        self.cascade.reset();
    }

    pub fn subject_changed(self, subject: String) {
        let api = self.api.get_value();
        spawn_local(async move {
            self.cascade.on_subject_change(&api, subject).await;
        });
    }

    pub fn class_changed(self, class_name: String) {
        let api = self.api.get_value();
        spawn_local(async move {
            self.cascade.on_class_change(&api, class_name).await;
        });
    }

    fn selected_file(self) -> Option<File> {
        self.file_ref
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
    }

    /// Rejects a bad selection as soon as it is picked.
    pub fn file_changed(self) {
        let Some(file) = self.selected_file() else {
            return;
        };
        let verdict = self
            .config
            .with_value(|config| validate_file(config, &file.name(), file.size() as u64));
        if let Err(rejection) = verdict {
            self.notifier.error(rejection.to_string());
            if let Some(input) = self.file_ref.get_untracked() {
                input.set_value("");
            }
        }
    }

    pub fn submit_upload(self, ev: SubmitEvent) {
        ev.prevent_default();
        if self.uploading.get_untracked() {
            return;
        }
        let (subject, class_name, index_key) = self.cascade.selection();
        let form = UploadForm {
            subject,
            class_name,
            index_key,
            file: self.selected_file().map(|file| FileMeta {
                name: file.name(),
                size: file.size() as u64,
            }),
        };
        if let Err(rejection) = self.config.with_value(|config| form.check(config)) {
            self.notifier.error(rejection.to_string());
            return;
        }
        let Some(element) = self.form_ref.get_untracked() else {
            return;
        };

        self.uploading.set(true);
        let api = self.api.get_value();
        let reload_delay = self.config.with_value(|config| config.reload_delay_ms);
        spawn_local(async move {
            let result = upload::submit(&api, &element, &form).await;
            match &result {
                Ok(note_id) => log::info!("uploaded note {note_id:?}"),
                Err(err) => log::error!("Upload error: {err}"),
            }
            if let Some(reload_after_ms) = self.finish_upload(upload::completion(&result, reload_delay)) {
                Timeout::new(reload_after_ms, || {
                    if let Err(err) = window().location().reload() {
                        log::error!("reload failed: {err:?}");
                    }
                })
                .forget();
            }
        });
    }

    /// Applies the upload result to the modal and returns the reload delay on success.
    fn finish_upload(self, completion: Completion) -> Option<u32> {
        self.uploading.set(false);
        match completion {
            Completion::Uploaded { reload_after_ms } => {
                self.notifier.success(upload::UPLOAD_SUCCESS);
                self.close_upload_modal();
                Some(reload_after_ms)
            }
            Completion::Failed(message) => {
                self.notifier.error(message);
                None
            }
        }
    }

    pub fn view_note(self, id: u64) {
        let api = self.api.get_value();
        spawn_local(async move {
            match api.note(id).await {
                Ok(note) => {
                    log::debug!("loaded note {} ({})", note.id, note.original_name);
                    self.note.set(Some(note));
                    self.note_open.set(true);
                }
                Err(err) => {
                    log::error!("Error loading note {id}: {err}");
                    self.notifier.error(NOTE_LOAD_ERROR);
                }
            }
        });
    }

    pub fn close_note_modal(self) {
        self.note_open.set(false);
    }

    pub fn search(self) {
        let term = bridge::search_term().unwrap_or_default();
        log::info!("search requested for {term:?}");
        self.notifier.info(SEARCH_PENDING);
    }

    pub fn handle(self, command: Command) {
        match command {
            Command::ShowUpload(seed) => self.show_upload_modal(seed),
            Command::CloseUpload => self.close_upload_modal(),
            Command::ViewNote { id } => self.view_note(id),
            Command::CloseNote => self.close_note_modal(),
            Command::NoteAction { id, action } => {
                log::info!("{action:?} on note {id}");
                self.notifier.success(action.confirmation());
            }
            Command::Search => self.search(),
        }
    }

    pub fn handle_key(self, ev: &KeyboardEvent) {
        let Some(shortcut) = bridge::shortcut_for(&ev.key(), ev.ctrl_key(), ev.meta_key()) else {
            return;
        };
        if shortcut == Shortcut::OpenUpload {
            ev.prevent_default();
        }
        self.run_shortcut(shortcut);
    }

    pub fn run_shortcut(self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::CloseModals => {
                self.close_upload_modal();
                self.close_note_modal();
            }
            Shortcut::OpenUpload => self.show_upload_modal(UploadSeed::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leptos::reactive::owner::Owner;

    use super::*;
    use crate::cascade::IndexOption;
    use crate::error::ApiError;

    fn controller() -> Controller {
        let config = ClientConfig::default();
        let notifier = Notifier::new(config.toast_duration_ms, config.toast_exit_ms);
        let api = ApiClient::new("", Arc::new(|_: &ApiError| {}));
        Controller::new(config, api, notifier)
    }

    fn seed(subject: &str, class_name: &str, index_key: &str) -> UploadSeed {
        UploadSeed::new(
            Some(subject.to_string()),
            Some(class_name.to_string()),
            Some(index_key.to_string()),
        )
    }

    fn loaded() -> CascadeState {
        CascadeState {
            subjects: vec!["Physics".into(), "Biology".into()],
            ..CascadeState::default()
        }
    }

    #[test]
    fn escape_hides_both_modals() {
        let owner = Owner::new();
        owner.set();
        let ctl = controller();
        ctl.upload_open.set(true);
        ctl.note_open.set(true);
        ctl.cascade.state().update(|s| {
            s.select_subject("Physics");
        });

        ctl.run_shortcut(Shortcut::CloseModals);
        assert!(!ctl.upload_open.get_untracked());
        assert!(!ctl.note_open.get_untracked());
        assert_eq!(ctl.cascade.selection(), (String::new(), String::new(), String::new()));
    }

    #[test]
    fn close_commands_target_their_own_modal() {
        let owner = Owner::new();
        owner.set();
        let ctl = controller();
        ctl.upload_open.set(true);
        ctl.note_open.set(true);

        ctl.handle(Command::CloseNote);
        assert!(ctl.upload_open.get_untracked());
        assert!(!ctl.note_open.get_untracked());

        ctl.handle(Command::CloseUpload);
        assert!(!ctl.upload_open.get_untracked());
    }

    #[test]
    fn seed_is_applied_subject_then_class_then_index() {
        let seed = seed("Physics", "Optics", "4");
        let mut state = loaded();

        assert_eq!(next_seed_step(&state, &seed), Some(SeedStep::Subject("Physics".into())));
        state.select_subject("Physics");
        state.classes = vec!["Mechanics".into(), "Optics".into()];

        assert_eq!(next_seed_step(&state, &seed), Some(SeedStep::Class("Optics".into())));
        state.select_class("Optics");
        state.indices = vec![IndexOption {
            value: "4".into(),
            label: "4 Lenses".into(),
        }];

        assert_eq!(next_seed_step(&state, &seed), Some(SeedStep::Index("4".into())));
        state.select_index("4");
        assert_eq!(next_seed_step(&state, &seed), None);
    }

    #[test]
    fn unknown_seed_values_stop_the_walk() {
        let mut state = loaded();
        assert_eq!(next_seed_step(&state, &seed("History", "Rome", "1")), None);

        state.select_subject("Physics");
        state.classes = vec!["Mechanics".into()];
        assert_eq!(next_seed_step(&state, &seed("Physics", "Optics", "1")), None);

        state.select_class("Mechanics");
        state.indices = vec![IndexOption::notice("No textbook index uploaded - will auto-detect")];
        assert_eq!(next_seed_step(&state, &seed("Physics", "Mechanics", "1")), None);
    }

    #[test]
    fn seed_walk_yields_to_a_user_choice() {
        let mut state = loaded();
        state.select_subject("Biology");
        state.classes = vec!["Cells".into()];
        assert_eq!(next_seed_step(&state, &seed("Physics", "Cells", "")), None);
    }

    #[test]
    fn subject_only_seed_stops_after_subject() {
        let mut state = loaded();
        let seed = UploadSeed::new(Some("Physics".into()), None, None);
        assert_eq!(next_seed_step(&state, &seed), Some(SeedStep::Subject("Physics".into())));
        state.select_subject("Physics");
        state.classes = vec!["Optics".into()];
        assert_eq!(next_seed_step(&state, &seed), None);
    }
}
