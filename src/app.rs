use std::sync::Arc;

use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Event, EventTarget, MouseEvent};

use crate::api::ApiClient;
use crate::bridge::{self, COMMAND_EVENT};
use crate::cascade::{IndexOption, INDEX_PLACEHOLDER, SUBJECT_PLACEHOLDER};
use crate::config::ClientConfig;
use crate::controller::{Controller, NETWORK_ERROR};
use crate::error::ApiError;
use crate::notify::{Notifier, ToastHost};
use crate::render;
use crate::upload::{BUSY_LABEL, IDLE_LABEL};

fn visibility(open: bool) -> &'static str {
    if open {
        "display: block;"
    } else {
        "display: none;"
    }
}

/// True when the click landed on the overlay itself rather than its content.
fn is_backdrop_click(ev: &MouseEvent, overlay: NodeRef<html::Div>) -> bool {
    let Some(target) = ev.target() else {
        return false;
    };
    overlay.get_untracked().is_some_and(|el| {
        let el: &EventTarget = el.as_ref();
        *el == target
    })
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::load();
    let notifier = Notifier::new(config.toast_duration_ms, config.toast_exit_ms);
    let api = ApiClient::new(
        config.api_base.clone(),
        Arc::new(move |_: &ApiError| notifier.error(NETWORK_ERROR)),
    );
    let ctl = Controller::new(config, api, notifier);

    let commands = window_event_listener_untyped(COMMAND_EVENT, move |e: Event| {
        if let Some(command) = e.dyn_ref::<CustomEvent>().and_then(bridge::decode) {
            ctl.handle(command);
        }
    });
    let keys = window_event_listener(ev::keydown, move |e| ctl.handle_key(&e));
    on_cleanup(move || {
        commands.remove();
        keys.remove();
    });

    bridge::attach_card_hover();
    Effect::new(move |_| ctl.load_subjects());

    view! {
        <UploadModal ctl=ctl />
        <NoteModal ctl=ctl />
        <ToastHost notifier=notifier />
    }
}

#[component]
fn UploadModal(ctl: Controller) -> impl IntoView {
    let overlay = NodeRef::<html::Div>::new();
    let state = ctl.cascade.state();
    let subjects = Memo::new(move |_| state.with(|s| s.subjects.clone()));
    let classes = Memo::new(move |_| state.with(|s| s.classes.clone()));
    let indices = Memo::new(move |_| state.with(|s| s.indices.clone()));
    let accept = ctl.config.with_value(|config| config.accept_attribute());

    view! {
        <div
            id="uploadModal"
            class="modal"
            node_ref=overlay
            style=move || visibility(ctl.upload_open.get())
            on:click=move |e| {
                if is_backdrop_click(&e, overlay) {
                    ctl.close_upload_modal();
                }
            }
        >
            <div class="modal-content">
                <div class="modal-header">
                    <h2><i class="fas fa-upload"></i>" Upload Note"</h2>
                    <span class="close" on:click=move |_| ctl.close_upload_modal()>"×"</span>
                </div>
                <form id="uploadForm" node_ref=ctl.form_ref on:submit=move |e| ctl.submit_upload(e)>
                    <div class="form-group">
                        <label for="subject">"Subject"</label>
                        <select
                            id="subject"
                            name="subject"
                            on:change=move |e| ctl.subject_changed(event_target_value(&e))
                        >
                            <option value="" prop:selected=move || state.with(|s| s.subject.is_empty())>
                                {SUBJECT_PLACEHOLDER}
                            </option>
                            {move || subjects.get().into_iter().map(|name| {
                                let current = name.clone();
                                let value = name.clone();
                                view! {
                                    <option
                                        value=value
                                        prop:selected=move || state.with(|s| s.subject == current)
                                    >
                                        {name}
                                    </option>
                                }
                            }).collect::<Vec<_>>()}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="class_name">"Class"</label>
                        <select
                            id="class_name"
                            name="class_name"
                            prop:disabled=move || !state.with(|s| s.class_enabled)
                            on:change=move |e| ctl.class_changed(event_target_value(&e))
                        >
                            <option value="" prop:selected=move || state.with(|s| s.class_name.is_empty())>
                                {move || state.with(|s| s.class_placeholder())}
                            </option>
                            {move || classes.get().into_iter().map(|name| {
                                let current = name.clone();
                                let value = name.clone();
                                view! {
                                    <option
                                        value=value
                                        prop:selected=move || state.with(|s| s.class_name == current)
                                    >
                                        {name}
                                    </option>
                                }
                            }).collect::<Vec<_>>()}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="index_key">"Textbook Section"</label>
                        <select
                            id="index_key"
                            name="index_key"
                            prop:disabled=move || !state.with(|s| s.index_enabled)
                            on:change=move |e| ctl.cascade.select_index(event_target_value(&e))
                        >
                            <option value="" prop:selected=move || state.with(|s| s.index_key.is_empty())>
                                {INDEX_PLACEHOLDER}
                            </option>
                            {move || indices.get().into_iter().map(|option| {
                                let is_notice = option.is_notice();
                                let IndexOption { value, label } = option;
                                let current = value.clone();
                                view! {
                                    <option
                                        value=value
                                        class:notice=is_notice
                                        prop:selected=move || !is_notice && state.with(|s| s.index_key == current)
                                    >
                                        {label}
                                    </option>
                                }
                            }).collect::<Vec<_>>()}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="file">"Note File"</label>
                        <input
                            type="file"
                            id="file"
                            name="file"
                            accept=accept
                            node_ref=ctl.file_ref
                            on:change=move |_| ctl.file_changed()
                        />
                    </div>
                    <div class="form-actions">
                        <button type="button" class="btn btn-secondary" on:click=move |_| ctl.close_upload_modal()>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" prop:disabled=move || ctl.uploading.get()>
                            {move || if ctl.uploading.get() {
                                view! { <i class="fas fa-spinner fa-spin"></i>{BUSY_LABEL} }.into_any()
                            } else {
                                view! { <i class="fas fa-upload"></i>{IDLE_LABEL} }.into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

#[component]
fn NoteModal(ctl: Controller) -> impl IntoView {
    let overlay = NodeRef::<html::Div>::new();

    view! {
        <div
            id="noteModal"
            class="modal"
            node_ref=overlay
            style=move || visibility(ctl.note_open.get())
            on:click=move |e| {
                if is_backdrop_click(&e, overlay) {
                    ctl.close_note_modal();
                }
            }
        >
            <div class="modal-content large">
                <div class="modal-header">
                    <h2 id="noteTitle">
                        {move || ctl.note.with(|n| n.as_ref().map(|n| n.original_name.clone()).unwrap_or_default())}
                    </h2>
                    <span class="close" on:click=move |_| ctl.close_note_modal()>"×"</span>
                </div>
                <div class="modal-body">
                    <div
                        id="noteContent"
                        inner_html=move || ctl.note.with(|n| n.as_ref().map(render::note_body_html).unwrap_or_default())
                    ></div>
                    <div
                        id="noteAnalysis"
                        inner_html=move || ctl.note.with(|n| {
                            n.as_ref()
                                .map(|n| render::analysis_html(n.ai_analysis.as_ref()))
                                .unwrap_or_default()
                        })
                    ></div>
                </div>
            </div>
        </div>
    }
}
