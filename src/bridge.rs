//! Glue between the server-rendered page and the mounted app.
//!
//! The page calls plain global functions from `onclick` attributes. Each one
//! is forwarded to the app as a `notes-command` CustomEvent on `window`.

use js_sys::Reflect;
use leptos::prelude::{document, window};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, HtmlElement};

pub const COMMAND_EVENT: &str = "notes-command";
pub const CARD_SELECTOR: &str = ".note-card, .subject-card, .class-card, .action-card";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadSeed {
    pub subject: Option<String>,
    pub class_name: Option<String>,
    pub index_key: Option<String>,
}

impl UploadSeed {
    /// Empty strings count as "not given".
    pub fn new(subject: Option<String>, class_name: Option<String>, index_key: Option<String>) -> Self {
        let given = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            subject: given(subject),
            class_name: given(class_name),
            index_key: given(index_key),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteAction {
    Star,
    Highlight,
    Question,
}

impl NoteAction {
    pub fn confirmation(self) -> &'static str {
        match self {
            NoteAction::Star => "Note starred!",
            NoteAction::Highlight => "Note highlighted!",
            NoteAction::Question => "Note marked for questions!",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ShowUpload(UploadSeed),
    CloseUpload,
    ViewNote { id: u64 },
    CloseNote,
    NoteAction { id: u64, action: NoteAction },
    Search,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    CloseModals,
    OpenUpload,
}

pub fn shortcut_for(key: &str, ctrl: bool, meta: bool) -> Option<Shortcut> {
    match key {
        "Escape" => Some(Shortcut::CloseModals),
        "u" if ctrl || meta => Some(Shortcut::OpenUpload),
        _ => None,
    }
}

/// Note ids arrive from markup as numbers or numeric strings.
pub fn note_id(value: &JsValue) -> Option<u64> {
    if let Some(number) = value.as_f64() {
        return (number >= 0.0 && number.fract() == 0.0).then_some(number as u64);
    }
    value.as_string()?.trim().parse().ok()
}

pub fn dispatch(command: &Command) {
    let detail = match serde_wasm_bindgen::to_value(command) {
        Ok(detail) => detail,
        Err(err) => {
            log::error!("could not encode {command:?}: {err}");
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(COMMAND_EVENT, &init) {
        Ok(event) => {
            let _ = window().dispatch_event(&event);
        }
        Err(err) => log::error!("could not create {COMMAND_EVENT}: {err:?}"),
    }
}

pub fn decode(event: &CustomEvent) -> Option<Command> {
    match serde_wasm_bindgen::from_value(event.detail()) {
        Ok(command) => Some(command),
        Err(err) => {
            log::warn!("ignoring malformed {COMMAND_EVENT}: {err}");
            None
        }
    }
}

fn expose(name: &str, f: impl Fn(JsValue, JsValue, JsValue) + 'static) {
    let closure = Closure::<dyn Fn(JsValue, JsValue, JsValue)>::new(f);
    let target: JsValue = window().into();
    if Reflect::set(&target, &JsValue::from_str(name), closure.as_ref()).is_err() {
        log::warn!("could not expose window.{name}");
    }
    closure.forget();
}

fn note_command(action: impl Fn(u64) -> Command + 'static) -> impl Fn(JsValue, JsValue, JsValue) {
    move |id, _, _| match note_id(&id) {
        Some(id) => dispatch(&action(id)),
        None => log::warn!("ignoring note command with id {id:?}"),
    }
}

/// Installs the global functions the page's markup calls.
pub fn install() {
    expose("showUploadModal", |subject, class_name, index_key| {
        dispatch(&Command::ShowUpload(UploadSeed::new(
            subject.as_string(),
            class_name.as_string(),
            index_key.as_string(),
        )))
    });
    expose("closeUploadModal", |_, _, _| dispatch(&Command::CloseUpload));
    expose("viewNote", note_command(|id| Command::ViewNote { id }));
    expose("closeNoteModal", |_, _, _| dispatch(&Command::CloseNote));
    expose(
        "starNote",
        note_command(|id| Command::NoteAction { id, action: NoteAction::Star }),
    );
    expose(
        "highlightNote",
        note_command(|id| Command::NoteAction { id, action: NoteAction::Highlight }),
    );
    expose(
        "questionNote",
        note_command(|id| Command::NoteAction { id, action: NoteAction::Question }),
    );
    expose("searchNotes", |_, _, _| dispatch(&Command::Search));
    expose("showLoading", |element, _, _| {
        if let Ok(element) = element.dyn_into::<HtmlElement>() {
            set_loading(&element, true);
        }
    });
    expose("hideLoading", |element, _, _| {
        if let Ok(element) = element.dyn_into::<HtmlElement>() {
            set_loading(&element, false);
        }
    });
}

pub fn set_loading(element: &HtmlElement, loading: bool) {
    let style = element.style();
    let (opacity, pointer_events) = if loading { ("0.6", "none") } else { ("1", "auto") };
    let _ = style.set_property("opacity", opacity);
    let _ = style.set_property("pointer-events", pointer_events);
}

/// Lifts server-rendered cards while hovered.
pub fn attach_card_hover() {
    let Ok(cards) = document().query_selector_all(CARD_SELECTOR) else {
        return;
    };
    for i in 0..cards.length() {
        let Some(card) = cards.item(i).and_then(|node| node.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        for (event, offset) in [("mouseenter", "translateY(-5px)"), ("mouseleave", "translateY(0)")] {
            let target = card.clone();
            let closure = Closure::<dyn Fn()>::new(move || {
                let _ = target.style().set_property("transform", offset);
            });
            let _ = card.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

/// Lowercased contents of `#searchInput`, if the page has one.
pub fn search_term() -> Option<String> {
    document()
        .get_element_by_id("searchInput")
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|input| input.value().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_and_ctrl_u_are_shortcuts() {
        assert_eq!(shortcut_for("Escape", false, false), Some(Shortcut::CloseModals));
        assert_eq!(shortcut_for("Escape", true, false), Some(Shortcut::CloseModals));
        assert_eq!(shortcut_for("u", true, false), Some(Shortcut::OpenUpload));
        assert_eq!(shortcut_for("u", false, true), Some(Shortcut::OpenUpload));
        assert_eq!(shortcut_for("u", false, false), None);
        assert_eq!(shortcut_for("k", true, false), None);
    }

    #[test]
    fn upload_seed_drops_empty_values() {
        let seed = UploadSeed::new(Some("Physics".into()), Some(String::new()), None);
        assert_eq!(seed.subject.as_deref(), Some("Physics"));
        assert_eq!(seed.class_name, None);
        assert_eq!(seed.index_key, None);
    }

    #[test]
    fn commands_use_tagged_json() {
        let json = serde_json::to_value(Command::NoteAction {
            id: 4,
            action: NoteAction::Star,
        })
        .unwrap();
        assert_eq!(json["command"], "note_action");
        assert_eq!(json["action"], "star");

        let parsed: Command = serde_json::from_str(
            r#"{"command": "show_upload", "subject": "Physics", "class_name": null, "index_key": null}"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            Command::ShowUpload(UploadSeed {
                subject: Some("Physics".into()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn note_actions_confirm() {
        assert_eq!(NoteAction::Question.confirmation(), "Note marked for questions!");
    }
}
