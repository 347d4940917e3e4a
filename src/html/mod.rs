//! HTML module - boilerplate for generated web pages

use chrono::{Datelike, Local};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Settings for the `<head>` section of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlHead {
    pub lang: String,
    pub title: String,
    /// Path of an icon file.
    pub icon: Option<String>,
    /// Path of a stylesheet.
    pub css: Option<String>,
    /// Author for the copyright meta tag; no tag when empty.
    pub author: String,
    /// First year of the copyright.
    pub copyr_start: Option<i32>,
    /// Refresh period in minutes.
    pub refresh: Option<u32>,
    /// `<meta property=... content=...>` pairs, in order.
    pub meta_prop: Vec<(String, String)>,
}

impl Default for HtmlHead {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            title: "Page title".to_string(),
            icon: None,
            css: None,
            author: String::new(),
            copyr_start: None,
            refresh: None,
            meta_prop: Vec::new(),
        }
    }
}

/// Write the doctype, the head section and the opening body tag.
///
/// `refresh_url` is the page reloaded on refresh.
pub fn write_head<W: Write>(
    out: &mut W,
    head: &HtmlHead,
    refresh_url: &str,
    current_year: i32,
) -> io::Result<()> {
    writeln!(out, "<!DOCTYPE HTML>")?;
    writeln!(out, "<html lang=\"{}\">", head.lang)?;
    writeln!(out, "  <head>")?;
    writeln!(
        out,
        "    <meta http-equiv=\"Content-Type\" content=\"text/html;charset=utf-8\">"
    )?;

    if let Some(minutes) = head.refresh {
        let url = if refresh_url == "index.html" {
            "."
        } else {
            refresh_url
        };
        writeln!(
            out,
            "    <meta content=\"{}; URL={}\" http-equiv=\"Refresh\">",
            minutes * 60,
            url
        )?;
    }

    if let Some(icon) = &head.icon {
        writeln!(out, "    <link rel=\"icon\" href=\"{icon}\">")?;
    }
    if let Some(css) = &head.css {
        writeln!(
            out,
            "    <link rel=\"stylesheet\" type=\"text/css\" href=\"{css}\">"
        )?;
    }

    writeln!(out, "    <title>{}</title>", head.title)?;

    if !head.author.is_empty() {
        let years = match head.copyr_start {
            Some(start) if start != current_year => format!("{start}-{current_year}"),
            _ => current_year.to_string(),
        };
        writeln!(
            out,
            "    <meta name=\"author\" content=\"(c) {} {}\">",
            years, head.author
        )?;
    }

    for (property, content) in &head.meta_prop {
        writeln!(
            out,
            "    <meta property=\"{property}\" content=\"{content}\">"
        )?;
    }

    writeln!(out, "  </head>")?;
    writeln!(out, "  ")?;
    writeln!(out, "  <body>")
}

/// Create an HTML file, write its head section and start the body.
pub fn start_html_file(path: &Path, head: &HtmlHead) -> io::Result<BufWriter<File>> {
    let mut out = BufWriter::new(File::create(path)?);
    write_head(
        &mut out,
        head,
        &path.to_string_lossy(),
        Local::now().year(),
    )?;
    Ok(out)
}

/// Close the body and html tags and flush the file.
pub fn finish_html_file<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "  </body>")?;
    writeln!(out, "</html>")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_minimal_head() {
        let mut buf = Vec::new();
        write_head(&mut buf, &HtmlHead::default(), "page.html", 2024).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("<!DOCTYPE HTML>\n<html lang=\"en\">\n  <head>\n"));
        assert!(text.contains("    <title>Page title</title>\n"));
        assert!(!text.contains("Refresh"));
        assert!(!text.contains("author"));
        assert!(text.ends_with("  </head>\n  \n  <body>\n"));
    }

    #[test]
    fn test_full_head() {
        let head = HtmlHead {
            lang: "nl".into(),
            title: "Weer".into(),
            icon: Some("icon.png".into()),
            css: Some("style.css".into()),
            author: "A. Author".into(),
            copyr_start: Some(2020),
            refresh: Some(5),
            meta_prop: vec![("og:title".into(), "Weer".into())],
        };
        let mut buf = Vec::new();
        write_head(&mut buf, &head, "index.html", 2024).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("<meta content=\"300; URL=.\" http-equiv=\"Refresh\">"));
        assert!(text.contains("<link rel=\"icon\" href=\"icon.png\">"));
        assert!(text.contains("href=\"style.css\""));
        assert!(text.contains("content=\"(c) 2020-2024 A. Author\""));
        assert!(text.contains("<meta property=\"og:title\" content=\"Weer\">"));

        let same_year = HtmlHead {
            copyr_start: Some(2024),
            ..head
        };
        let mut buf = Vec::new();
        write_head(&mut buf, &same_year, "weer.html", 2024).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("content=\"(c) 2024 A. Author\""));
        assert!(text.contains("URL=weer.html"));
    }

    #[test]
    fn test_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        let mut out = start_html_file(&path, &HtmlHead::default()).unwrap();
        writeln!(out, "    <p>Hello</p>").unwrap();
        finish_html_file(out).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<p>Hello</p>"));
        assert!(text.ends_with("  </body>\n</html>\n"));
    }
}
