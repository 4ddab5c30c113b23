//! HTML rendering helpers shared by the listing and upload summary pages
//!
//! Text is escaped with `html_escape`; links are percent-encoded first and
//! then escaped as double-quoted attribute values.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when a file name is used as one URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Absolute link to a file under the download route
pub fn file_href(name: &str) -> String {
    format!("/{}", utf8_percent_encode(name, PATH_SEGMENT))
}

/// Wrap a body fragment in a minimal HTML document
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape::encode_text(title),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_escapes_title() {
        let html = page("Tom & <Jerry>", "<p>body</p>\n");
        assert!(html.contains("<title>Tom &amp; &lt;Jerry&gt;</title>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_file_href() {
        assert_eq!(file_href("a.txt"), "/a.txt");
        assert_eq!(file_href("my report #2.pdf"), "/my%20report%20%232.pdf");
        assert_eq!(file_href("50%.txt"), "/50%25.txt");
    }
}
