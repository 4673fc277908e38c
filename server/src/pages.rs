//! Minimal HTML for the three pages and the shared error page.

use catalog::{PopularEntry, Recommendation};
use std::fmt::Write;

pub const MSG_EMPTY_TITLE: &str = "Please enter a book title";
pub const MSG_BOOK_NOT_FOUND: &str = "Book not found in our database. Please try another book.";
pub const MSG_PAGE_NOT_FOUND: &str = "The page you're looking for doesn't exist.";
pub const MSG_INTERNAL: &str = "An internal server error occurred. Please try again later.";

const NAV: &str = r#"<nav><a href="/">Popular</a> | <a href="/recommend">Recommend</a></nav>"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{NAV}\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn index_page(popular: &[PopularEntry]) -> String {
    let mut body = String::from("<h1>Popular Books</h1>\n<ol class=\"popular\">\n");
    for p in popular {
        let _ = writeln!(
            body,
            "<li class=\"book\"><img src=\"{}\" alt=\"\"><h3>{}</h3><p class=\"author\">{}</p><p>Votes: <span class=\"votes\">{}</span></p><p>Rating: <span class=\"rating\">{:.2}</span></p></li>",
            escape(&p.cover_image_url),
            escape(&p.title),
            escape(&p.author),
            p.rating_count,
            p.avg_rating,
        );
    }
    body.push_str("</ol>");
    layout("Book Recommender", &body)
}

pub fn recommend_form() -> String {
    let body = r#"<h1>Recommend Books</h1>
<form class="search-form" action="/recommend" method="post">
<input class="search-input" type="text" name="book_name" autocomplete="off" placeholder="Enter a book title">
<div class="search-results"></div>
<button type="submit">Submit</button>
</form>"#;
    layout("Recommend Books", body)
}

pub fn recommendations_page(selected: &str, recs: &[Recommendation]) -> String {
    let mut body = format!("<h1>Because you liked <em class=\"selected\">{}</em></h1>\n<ol class=\"recommendations\">\n", escape(selected));
    for r in recs {
        let _ = writeln!(
            body,
            "<li class=\"book\"><img src=\"{}\" alt=\"\"><h3>{}</h3><p class=\"author\">{}</p></li>",
            escape(&r.cover_image_url),
            escape(&r.title),
            escape(&r.author),
        );
    }
    body.push_str("</ol>");
    layout("Recommendations", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!("<h1>Oops</h1>\n<p class=\"error\">{}</p>", escape(message));
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn index_lists_all_fields_in_order() {
        let popular = vec![
            PopularEntry { title: "First".into(), author: "A1".into(), cover_image_url: "http://img/1".into(), rating_count: 12, avg_rating: 4.25 },
            PopularEntry { title: "Second".into(), author: "A2".into(), cover_image_url: "http://img/2".into(), rating_count: 7, avg_rating: 3.5 },
        ];
        let html = index_page(&popular);
        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        assert!(first < second);
        for needle in ["A1", "http://img/1", ">12<", ">4.25<", ">3.50<"] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn error_page_escapes_message() {
        let html = error_page(MSG_PAGE_NOT_FOUND);
        assert!(html.contains("The page you&#39;re looking for doesn&#39;t exist."));
    }
}
