use leptos::prelude::*;

use crate::api::ApiClient;
use crate::models::{IndexEntry, IndexListing, SubjectMap};

pub const SUBJECT_PLACEHOLDER: &str = "Select a subject...";
pub const CLASS_PLACEHOLDER_NO_SUBJECT: &str = "Select a subject first...";
pub const CLASS_PLACEHOLDER: &str = "Select a class...";
pub const INDEX_PLACEHOLDER: &str = "Auto-detect from textbook index...";
pub const NO_INDEX_NOTICE: &str = "No textbook index uploaded - will auto-detect";
pub const INDEX_ERROR_NOTICE: &str = "Error loading indices - will auto-detect";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOption {
    pub value: String,
    pub label: String,
}

impl IndexOption {
    pub fn from_entry(entry: &IndexEntry) -> Self {
        let number = entry.number.as_deref().unwrap_or_default();
        let value = if number.is_empty() {
            entry.title.to_lowercase().replacen(' ', "_", 1)
        } else {
            number.to_string()
        };
        Self {
            value,
            label: format!("{number} {}", entry.title).trim().to_string(),
        }
    }

    /// An option with an empty value that only informs the user.
    pub fn notice(label: &str) -> Self {
        Self {
            value: String::new(),
            label: label.to_string(),
        }
    }

    pub fn is_notice(&self) -> bool {
        self.value.is_empty()
    }
}

pub fn index_options(listing: &IndexListing) -> Vec<IndexOption> {
    if listing.has_index && !listing.structure.is_empty() {
        listing.structure.iter().map(IndexOption::from_entry).collect()
    } else {
        vec![IndexOption::notice(NO_INDEX_NOTICE)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Subject,
    Class,
    Index,
}

/// Issued with every fetch; a response is applied only while its ticket is current.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    level: Level,
    generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexRequest {
    pub ticket: Ticket,
    pub subject: String,
    pub class_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeState {
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
    pub indices: Vec<IndexOption>,
    pub subject: String,
    pub class_name: String,
    pub index_key: String,
    pub class_enabled: bool,
    pub index_enabled: bool,
    pub(crate) subjects_generation: u64,
    pub(crate) classes_generation: u64,
    pub(crate) indices_generation: u64,
}

impl CascadeState {
    fn is_current(&self, ticket: Ticket) -> bool {
        let current = match ticket.level {
            Level::Subject => self.subjects_generation,
            Level::Class => self.classes_generation,
            Level::Index => self.indices_generation,
        };
        current == ticket.generation
    }

    fn clear_classes(&mut self) {
        self.classes_generation += 1;
        self.classes.clear();
        self.class_name.clear();
        self.clear_indices();
    }

    fn clear_indices(&mut self) {
        self.indices_generation += 1;
        self.indices.clear();
        self.index_key.clear();
    }

    pub fn begin_subject_load(&mut self) -> Ticket {
        self.subjects_generation += 1;
        Ticket {
            level: Level::Subject,
            generation: self.subjects_generation,
        }
    }

    /// Replaces the subject list and resets everything below it.
    pub fn apply_subjects(&mut self, ticket: Ticket, subjects: &SubjectMap) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.subjects = subjects.keys().cloned().collect();
        self.subject.clear();
        self.clear_classes();
        self.class_enabled = false;
        self.index_enabled = false;
        true
    }

    /// A pending subject-list reload would wipe this choice, so it goes stale.
    pub fn select_subject(&mut self, subject: &str) -> Option<Ticket> {
        self.subjects_generation += 1;
        self.subject = subject.to_string();
        self.clear_classes();
        self.index_enabled = false;
        if subject.is_empty() {
            self.class_enabled = false;
            return None;
        }
        self.class_enabled = true;
        Some(Ticket {
            level: Level::Class,
            generation: self.classes_generation,
        })
    }

    pub fn apply_classes(&mut self, ticket: Ticket, subjects: &SubjectMap) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.classes = subjects
            .get(&self.subject)
            .map(|subject| subject.class_names())
            .unwrap_or_default();
        true
    }

    pub fn select_class(&mut self, class_name: &str) -> Option<IndexRequest> {
        self.subjects_generation += 1;
        self.class_name = class_name.to_string();
        self.clear_indices();
        if self.subject.is_empty() || class_name.is_empty() {
            self.index_enabled = false;
            return None;
        }
        self.index_enabled = true;
        Some(IndexRequest {
            ticket: Ticket {
                level: Level::Index,
                generation: self.indices_generation,
            },
            subject: self.subject.clone(),
            class_name: self.class_name.clone(),
        })
    }

    /// `None` means the index request failed.
    pub fn apply_indices(&mut self, ticket: Ticket, listing: Option<&IndexListing>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.indices = match listing {
            Some(listing) => index_options(listing),
            None => vec![IndexOption::notice(INDEX_ERROR_NOTICE)],
        };
        true
    }

    pub fn select_index(&mut self, index_key: &str) {
        self.index_key = index_key.to_string();
    }

    /// Drops every selection but keeps the loaded subject list.
    pub fn reset(&mut self) {
        self.subject.clear();
        self.clear_classes();
        self.class_enabled = false;
        self.index_enabled = false;
    }

    /// Whether `index_key` names a real section, not an informational notice.
    pub fn has_index(&self, index_key: &str) -> bool {
        self.indices
            .iter()
            .any(|option| !option.is_notice() && option.value == index_key)
    }

    pub fn class_placeholder(&self) -> &'static str {
        if self.subject.is_empty() {
            CLASS_PLACEHOLDER_NO_SUBJECT
        } else {
            CLASS_PLACEHOLDER
        }
    }
}

/// Drives a [`CascadeState`] signal from user selections and API responses.
#[derive(Clone, Copy)]
pub struct Cascade {
    state: RwSignal<CascadeState>,
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(CascadeState::default()),
        }
    }

    pub fn state(&self) -> RwSignal<CascadeState> {
        self.state
    }

    pub fn selection(&self) -> (String, String, String) {
        self.state.with_untracked(|s| {
            (s.subject.clone(), s.class_name.clone(), s.index_key.clone())
        })
    }

    pub async fn load_subjects(&self, api: &ApiClient) {
        let Some(ticket) = self.state.try_update(|s| s.begin_subject_load()) else {
            return;
        };
        match api.subjects().await {
            Ok(subjects) => {
                self.state.update(|s| {
                    s.apply_subjects(ticket, &subjects);
                });
            }
            Err(err) => log::error!("Error loading subjects: {err}"),
        }
    }

    pub async fn on_subject_change(&self, api: &ApiClient, subject: String) {
        let Some(Some(ticket)) = self.state.try_update(|s| s.select_subject(&subject)) else {
            return;
        };
        match api.subjects().await {
            Ok(subjects) => {
                let applied = self
                    .state
                    .try_update(|s| s.apply_classes(ticket, &subjects))
                    .unwrap_or(false);
                if !applied {
                    log::debug!("dropping stale class list for {subject}");
                }
            }
            Err(err) => log::error!("Error loading classes for {subject}: {err}"),
        }
    }

    pub async fn on_class_change(&self, api: &ApiClient, class_name: String) {
        let Some(Some(request)) = self.state.try_update(|s| s.select_class(&class_name)) else {
            return;
        };
        let result = api.indices(&request.subject, &request.class_name).await;
        if let Err(err) = &result {
            log::error!("Error loading indices: {err}");
        }
        let applied = self
            .state
            .try_update(|s| s.apply_indices(request.ticket, result.as_ref().ok()))
            .unwrap_or(false);
        if !applied {
            log::debug!("dropping stale index list for {}/{}", request.subject, request.class_name);
        }
    }

    pub fn select_index(&self, index_key: String) {
        self.state.update(|s| s.select_index(&index_key));
    }

    pub fn reset(&self) {
        self.state.update(|s| s.reset());
    }
}
