use html_escape::encode_text;

use crate::aggregator::DigestModel;

/// A fully rendered digest, ready for the delivery sink.
#[derive(Debug, Clone)]
pub struct RenderedDigest {
    pub subject: String,
    pub plain: String,
    pub html: String,
}

/// Renders the pruned model. Pure: no I/O, no mutation.
pub fn render(model: &DigestModel, subject: &str) -> RenderedDigest {
    RenderedDigest {
        subject: subject.to_string(),
        plain: render_plain_text(model),
        html: render_html(model),
    }
}

pub fn render_plain_text(model: &DigestModel) -> String {
    let mut out = String::new();

    for channel in &model.channels {
        out.push_str(&format!("### {}\n{}\n\n", channel.title, channel.home_page()));
        for item in model.items_for(channel) {
            out.push_str(&format!("{}\n{}\n\n", item.title, item.first_link()));
        }
    }

    if !model.fetch_errors.is_empty() {
        out.push_str("### Fetch errors\n");
        for error in &model.fetch_errors {
            out.push_str(&format!("[e] {}: {}\n", error.url, error.message));
        }
    }

    out
}

pub fn render_html(model: &DigestModel) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<body>\n");

    out.push_str("<div class=\"toc\">\n<h2>Contents</h2>\n<ol>\n");
    for channel in &model.channels {
        let home = channel.home_page();
        out.push_str(&format!(
            "<li>{} - <a href=\"{}\">{}</a></li>\n",
            encode_text(&channel.title),
            home,
            home
        ));
    }
    out.push_str("</ol>\n</div>\n");

    for channel in &model.channels {
        let home = channel.home_page();
        out.push_str(&format!(
            "<div class=\"channel\">\n<h2>{}</h2>\n<p><a href=\"{}\">{}</a></p>\n</div>\n",
            encode_text(&channel.title),
            home,
            home
        ));
        for item in model.items_for(channel) {
            out.push_str(&format!(
                "<h3><a href=\"{}\">{}</a></h3>\n",
                item.first_link(),
                encode_text(&item.title)
            ));
            // Item bodies are feed-supplied HTML and pass through as-is.
            out.push_str(&format!(
                "<div class=\"item-content\">{}</div>\n",
                item.content
            ));
        }
    }

    if !model.fetch_errors.is_empty() {
        out.push_str("<div class=\"fetch-errors\">\n<h2>Fetch errors</h2>\n<ul>\n");
        for error in &model.fetch_errors {
            out.push_str(&format!(
                "<li>{}: {}</li>\n",
                encode_text(&error.url),
                encode_text(&error.message)
            ));
        }
        out.push_str("</ul>\n</div>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
