use std::fmt::Write as _;

use actix_web::http::StatusCode;

use crate::models::{Registration, RegistrationForm};

// ============================================================================
// HTML Views
// ============================================================================
//
// Server rendered pages. All user supplied text goes through `escape`.
//
// ============================================================================

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
    .errors{color:#a00}.notice{color:#060}label{display:block;margin-top:1rem}\
    table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}";

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn home(registered: bool) -> String {
    let mut body = String::new();
    if registered {
        body.push_str("<p class=\"notice\">Thank you for your registration!</p>\n");
    }
    body.push_str("<p><a href=\"/register\">Register</a></p>");

    layout("Registration", &body)
}

/// The form, with any error messages and the previously submitted values.
pub fn registration_form(errors: &[String], data: &RegistrationForm) -> String {
    let mut body = String::new();

    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">\n");
        for message in errors {
            let _ = writeln!(body, "<li>{}</li>", escape(message));
        }
        body.push_str("</ul>\n");
    }

    let _ = write!(
        body,
        "<form action=\"/register\" method=\"post\" novalidate>\n\
         <label for=\"name\">Name:</label>\n\
         <input type=\"text\" id=\"name\" name=\"name\" value=\"{name}\">\n\
         <label for=\"email\">Email:</label>\n\
         <input type=\"email\" id=\"email\" name=\"email\" value=\"{email}\">\n\
         <p><button type=\"submit\">Submit</button></p>\n\
         </form>",
        name = escape(&data.name),
        email = escape(&data.email),
    );

    let title = if errors.is_empty() {
        "Registration form"
    } else {
        "Registration Error"
    };
    layout(title, &body)
}

pub fn registrations(registrations: &[Registration]) -> String {
    let mut body = String::new();

    if registrations.is_empty() {
        body.push_str("<p>No registrations yet.</p>");
    } else {
        body.push_str("<table>\n<tr><th>Name</th><th>Email</th><th>Registered</th></tr>\n");
        for registration in registrations {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&registration.name),
                escape(&registration.email),
                registration.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }
        body.push_str("</table>");
    }

    layout("Listing registrations", &body)
}

/// Generic error page. `detail` is only passed in development mode.
pub fn error_page(status: StatusCode, message: &str, detail: Option<&str>) -> String {
    let mut body = format!(
        "<p>{}</p>\n<p>{}</p>",
        status.as_u16(),
        escape(message)
    );

    if let Some(detail) = detail {
        let _ = write!(body, "\n<pre>{}</pre>", escape(detail));
    }

    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_form_echoes_escaped_input() {
        let page = registration_form(
            &["Name is required".to_string()],
            &RegistrationForm::new("", "\"><b>@x.com"),
        );

        assert!(page.contains("<li>Name is required</li>"));
        assert!(page.contains("value=\"&quot;&gt;&lt;b&gt;@x.com\""));
        assert!(page.contains("<title>Registration Error</title>"));
    }

    #[test]
    fn test_home_banner_only_after_registration() {
        assert!(home(true).contains("Thank you for your registration!"));
        assert!(!home(false).contains("Thank you"));
    }

    #[test]
    fn test_error_page_detail_is_optional() {
        let plain = error_page(StatusCode::NOT_FOUND, "Not Found", None);
        assert!(plain.contains("404"));
        assert!(!plain.contains("<pre>"));

        let detailed = error_page(StatusCode::INTERNAL_SERVER_ERROR, "Oops", Some("trace <here>"));
        assert!(detailed.contains("<pre>trace &lt;here&gt;</pre>"));
    }
}
