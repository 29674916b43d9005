use super::spans::SpanKind;
use super::view::DecoratedView;
use crossterm::style::{
    Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};

fn css(kind: SpanKind) -> Option<&'static str> {
    match kind {
        SpanKind::Number => Some("color: #ff5555; font-weight: bold;"),
        SpanKind::Timing => Some("color: #ffaa00; font-weight: bold;"),
        SpanKind::Tag => Some("color: #00ffff; font-weight: bold;"),
        SpanKind::Comma => Some("color: #66ff66; font-weight: bold;"),
        SpanKind::Period => Some("color: #ffcc33; font-weight: bold;"),
        SpanKind::Punct => Some("color: #ff9999;"),
        SpanKind::MultiSpace => Some("background: #2a2a2a; color: #eee;"),
        SpanKind::Plain => None,
    }
}

fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Markup for an HTML host: escaped text with one styled `<span>` per
/// decorated node.
pub fn render_html(view: &DecoratedView) -> String {
    let mut html = String::with_capacity(view.len() * 2);

    for node in view.nodes() {
        match css(node.kind) {
            Some(style) => {
                html.push_str("<span style=\"");
                html.push_str(style);
                html.push_str("\">");
                escape_html(&node.text, &mut html);
                html.push_str("</span>");
            }
            None => escape_html(&node.text, &mut html),
        }
    }

    html
}

fn terminal_style(kind: SpanKind) -> Option<(Color, bool)> {
    let rgb = |r, g, b| Color::Rgb { r, g, b };
    match kind {
        SpanKind::Number => Some((rgb(0xff, 0x55, 0x55), true)),
        SpanKind::Timing => Some((rgb(0xff, 0xaa, 0x00), true)),
        SpanKind::Tag => Some((rgb(0x00, 0xff, 0xff), true)),
        SpanKind::Comma => Some((rgb(0x66, 0xff, 0x66), true)),
        SpanKind::Period => Some((rgb(0xff, 0xcc, 0x33), true)),
        SpanKind::Punct => Some((rgb(0xff, 0x99, 0x99), false)),
        SpanKind::MultiSpace | SpanKind::Plain => None,
    }
}

/// ANSI-coloured text for terminals.
pub fn render_ansi(view: &DecoratedView) -> String {
    let mut result = String::new();

    for node in view.nodes() {
        if node.kind == SpanKind::MultiSpace {
            result.push_str(&format!(
                "{}{}{}",
                SetBackgroundColor(Color::Rgb {
                    r: 0x2a,
                    g: 0x2a,
                    b: 0x2a
                }),
                node.text,
                ResetColor
            ));
            continue;
        }

        match terminal_style(node.kind) {
            Some((color, bold)) => {
                if bold {
                    result.push_str(&format!("{}", SetAttribute(Attribute::Bold)));
                }
                result.push_str(&format!("{}{}", SetForegroundColor(color), node.text));
                result.push_str(&format!(
                    "{}{}",
                    ResetColor,
                    SetAttribute(Attribute::Reset)
                ));
            }
            None => result.push_str(&node.text),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::view::decorate;

    fn strip_html(html: &str) -> String {
        let mut out = String::new();
        let mut in_markup = false;
        for ch in html.chars() {
            match ch {
                '<' => in_markup = true,
                '>' if in_markup => in_markup = false,
                _ if !in_markup => out.push(ch),
                _ => {}
            }
        }
        out.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_render_html_wraps_tags() {
        let html = render_html(&decorate("[Alice] hi"));
        assert_eq!(
            html,
            "<span style=\"color: #00ffff; font-weight: bold;\">[Alice]</span> hi"
        );
    }

    #[test]
    fn test_render_html_escapes_payload() {
        let text = "a <b> & [x>y] c";
        let html = render_html(&decorate(text));
        assert!(html.contains("&lt;b&gt; &amp; "));
        assert!(!html.contains("<b>"));
        assert_eq!(strip_html(&html), text);
    }

    #[test]
    fn test_render_html_round_trips_srt() {
        let text = "1\n00:00:00,000 --> 00:00:03,000\n[en:Bob|seed:42] Let me explain;  ok?\n";
        assert_eq!(strip_html(&render_html(&decorate(text))), text);
    }

    #[test]
    fn test_render_html_is_stable() {
        let text = "2\n00:00:03,500 --> 00:00:07,000\nHi, there.";
        assert_eq!(
            render_html(&decorate(text)),
            render_html(&decorate(text))
        );
    }

    #[test]
    fn test_render_ansi_keeps_text() {
        let out = render_ansi(&decorate("[Alice] hi,  there"));
        assert!(out.contains("[Alice]"));
        assert!(out.contains(" there"));
        assert!(out.contains("\x1b["));
    }
}
