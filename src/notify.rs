use gloo_timers::callback::Timeout;
use leptos::prelude::*;

pub const STYLE_ELEMENT_ID: &str = "notification-styles";

const KEYFRAMES: &str = "
@keyframes slideInRight {
    from { opacity: 0; transform: translateX(100%); }
    to { opacity: 1; transform: translateX(0); }
}
@keyframes slideOutRight {
    from { opacity: 1; transform: translateX(0); }
    to { opacity: 0; transform: translateX(100%); }
}
";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    pub fn name(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
        }
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            ToastKind::Success => "fas fa-check-circle",
            ToastKind::Error => "fas fa-exclamation-circle",
            ToastKind::Info => "fas fa-info-circle",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            ToastKind::Success => "#48bb78",
            ToastKind::Error => "#f56565",
            ToastKind::Info => "#4299e1",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToastPhase {
    Entering,
    Leaving,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub phase: ToastPhase,
}

impl Toast {
    pub fn class(&self) -> String {
        format!("notification notification-{}", self.kind.name())
    }

    pub fn style(&self) -> String {
        let animation = match self.phase {
            ToastPhase::Entering => "slideInRight",
            ToastPhase::Leaving => "slideOutRight",
        };
        format!(
            "position: fixed; top: 20px; right: 20px; background: {}; color: white; padding: 15px 20px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.15); z-index: 10000; display: flex; align-items: center; gap: 10px; font-weight: 500; animation: {animation} 0.3s ease-out;",
            self.kind.background()
        )
    }
}

/// Visible toasts in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, message: String, kind: ToastKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            message,
            kind,
            phase: ToastPhase::Entering,
        });
        id
    }

    pub fn begin_exit(&mut self, id: u64) -> bool {
        match self.toasts.iter_mut().find(|toast| toast.id == id) {
            Some(toast) => {
                toast.phase = ToastPhase::Leaving;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

#[derive(Clone, Copy)]
pub struct Notifier {
    queue: RwSignal<ToastQueue>,
    duration_ms: u32,
    exit_ms: u32,
}

impl Notifier {
    pub fn new(duration_ms: u32, exit_ms: u32) -> Self {
        Self {
            queue: RwSignal::new(ToastQueue::default()),
            duration_ms,
            exit_ms,
        }
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        ensure_keyframes();
        let Some(id) = self.queue.try_update(|queue| queue.push(message.into(), kind)) else {
            return;
        };
        let queue = self.queue;
        let exit_ms = self.exit_ms;
        Timeout::new(self.duration_ms, move || {
            queue.update(|q| {
                q.begin_exit(id);
            });
            Timeout::new(exit_ms, move || queue.update(|q| q.remove(id))).forget();
        })
        .forget();
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info);
    }
}

fn ensure_keyframes() {
    let document = document();
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return;
    }
    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(KEYFRAMES));
    if let Some(head) = document.head() {
        let _ = head.append_child(&style);
    }
}

#[component]
pub fn ToastHost(notifier: Notifier) -> impl IntoView {
    view! {
        <For
            each=move || notifier.queue.with(|q| q.toasts().to_vec())
            key=|toast| (toast.id, toast.phase)
            let:toast
        >
            <div class=toast.class() style=toast.style()>
                <i class=toast.kind.icon_class()></i>
                // Text node, so the message is never parsed as markup.
                <span>{toast.message.clone()}</span>
            </div>
        </For>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_leave_then_disappear() {
        let mut queue = ToastQueue::default();
        let first = queue.push("Saved".into(), ToastKind::Success);
        let second = queue.push("Oops".into(), ToastKind::Error);
        assert_ne!(first, second);

        assert!(queue.begin_exit(first));
        assert_eq!(queue.toasts()[0].phase, ToastPhase::Leaving);
        assert_eq!(queue.toasts()[1].phase, ToastPhase::Entering);

        queue.remove(first);
        assert_eq!(queue.toasts().len(), 1);
        assert_eq!(queue.toasts()[0].message, "Oops");
        assert!(!queue.begin_exit(first));
    }

    #[test]
    fn each_kind_has_its_own_colour_and_icon() {
        let mut queue = ToastQueue::default();
        queue.push("a".into(), ToastKind::default());
        let toast = &queue.toasts()[0];
        assert_eq!(toast.kind, ToastKind::Info);
        assert_eq!(toast.class(), "notification notification-info");
        assert!(toast.style().contains("#4299e1"));
        assert!(toast.style().contains("slideInRight"));
        assert_eq!(ToastKind::Success.icon_class(), "fas fa-check-circle");
        assert_ne!(ToastKind::Error.background(), ToastKind::Success.background());
    }
}
