use crate::models::{AiAnalysis, Note};

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[derive(Clone, Copy)]
enum ItemStyle {
    Plain,
    Code,
    Highlight,
}

struct Section<'a> {
    icon: &'static str,
    label: &'static str,
    style: ItemStyle,
    items: &'a [String],
}

fn sections(analysis: &AiAnalysis) -> [Section<'_>; 5] {
    [
        Section {
            icon: "fa-tags",
            label: "Key Topics",
            style: ItemStyle::Plain,
            items: analysis.key_topics.as_slice(),
        },
        Section {
            icon: "fa-calculator",
            label: "Important Equations",
            style: ItemStyle::Code,
            items: analysis.important_equations.as_slice(),
        },
        Section {
            icon: "fa-highlighter",
            label: "AI Highlights",
            style: ItemStyle::Highlight,
            items: analysis.highlights.as_slice(),
        },
        Section {
            icon: "fa-question-circle",
            label: "Test Questions",
            style: ItemStyle::Plain,
            items: analysis.test_questions.as_slice(),
        },
        Section {
            icon: "fa-link",
            label: "Related Concepts",
            style: ItemStyle::Plain,
            items: analysis.related_links.as_slice(),
        },
    ]
}

pub fn content_html(content: &str) -> String {
    format!("<pre>{}</pre>", escape_html(content))
}

/// Upload date and index key, when the server recorded them.
pub fn meta_html(note: &Note) -> String {
    let mut parts = Vec::new();
    if let Some(date) = note.upload_date.as_deref().filter(|d| !d.is_empty()) {
        let day = date.split('T').next().unwrap_or(date);
        parts.push(format!(
            "<span><i class=\"fas fa-calendar\"></i> {}</span>",
            escape_html(day)
        ));
    }
    if let Some(key) = note.index_key.as_deref().filter(|k| !k.is_empty()) {
        parts.push(format!(
            "<span><i class=\"fas fa-bookmark\"></i> {}</span>",
            escape_html(key)
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("<div class=\"note-meta\">{}</div>", parts.join(" "))
    }
}

pub fn note_body_html(note: &Note) -> String {
    let mut html = meta_html(note);
    html.push_str(&content_html(&note.content));
    html
}

pub fn analysis_html(analysis: Option<&AiAnalysis>) -> String {
    let mut html = String::from("<div class=\"ai-analysis\">");
    if let Some(analysis) = analysis {
        for section in sections(analysis) {
            if section.items.is_empty() {
                continue;
            }
            html.push_str(&format!(
                "<h4><i class=\"fas {}\"></i> {}</h4><ul>",
                section.icon, section.label
            ));
            for item in section.items {
                let item = escape_html(item);
                match section.style {
                    ItemStyle::Plain => html.push_str(&format!("<li>{item}</li>")),
                    ItemStyle::Code => html.push_str(&format!("<li><code>{item}</code></li>")),
                    ItemStyle::Highlight => {
                        html.push_str(&format!("<li class=\"highlight-item\">{item}</li>"))
                    }
                }
            }
            html.push_str("</ul>");
        }
        if let Some(error) = &analysis.error {
            html.push_str(&format!(
                "<div class=\"error-message\"><i class=\"fas fa-exclamation-triangle\"></i> AI Analysis Error: {}</div>",
                escape_html(error)
            ));
        }
    }
    html.push_str("</div>");
    html
}
