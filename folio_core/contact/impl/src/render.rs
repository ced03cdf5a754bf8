use folio_models::contact::{sanitize, ContactMessage};

const NOT_PROVIDED: &str = "Not provided";

pub(crate) struct RenderedMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub(crate) fn render(message: &ContactMessage) -> RenderedMessage {
    let name = sanitize(message.name());
    let email = sanitize(message.email());
    let phone = message.phone().map(sanitize).filter(|p| !p.is_empty());
    let content = sanitize(message.message());

    let subject = format!("[Portfolio] New message from {name}");

    let text = format!(
        "Name:    {name}\nEmail:   {email}\nPhone:   {phone}\n\nMessage:\n{content}",
        phone = phone.as_deref().unwrap_or(NOT_PROVIDED),
    )
    .trim()
    .to_owned();

    let phone_html = match &phone {
        Some(phone) => phone.clone(),
        None => format!("<em>{NOT_PROVIDED}</em>"),
    };
    let html = format!(
        r##"<div style="font-family:sans-serif;max-width:500px;margin:auto;padding:24px;background:#f9f9f9;border-radius:12px;">
  <h2 style="color:#f07484;margin-bottom:16px;">New Portfolio Message</h2>
  <table style="width:100%;border-collapse:collapse;">
    <tr><td style="padding:6px 0;color:#666;width:80px;"><strong>Name</strong></td><td style="padding:6px 0;">{name}</td></tr>
    <tr><td style="padding:6px 0;color:#666;"><strong>Email</strong></td><td style="padding:6px 0;"><a href="mailto:{email}">{email}</a></td></tr>
    <tr><td style="padding:6px 0;color:#666;"><strong>Phone</strong></td><td style="padding:6px 0;">{phone_html}</td></tr>
  </table>
  <hr style="margin:16px 0;border:none;border-top:1px solid #eee;"/>
  <p style="color:#333;white-space:pre-wrap;">{content}</p>
</div>
"##
    );

    RenderedMessage {
        subject,
        text,
        html,
    }
}

#[cfg(test)]
mod tests {
    use folio_models::contact::ContactSubmission;
    use pretty_assertions::assert_eq;

    use super::*;

    fn message(name: &str, phone: Option<&str>, content: &str) -> ContactMessage {
        ContactSubmission {
            name: Some(name.into()),
            email: Some("jane@example.com".into()),
            phone: phone.map(Into::into),
            message: Some(content.into()),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn text_with_phone() {
        let rendered = render(&message(
            "Jane Doe",
            Some("+1 555 0100"),
            "Hello, I'd like to collaborate on a project.\n\n",
        ));

        assert_eq!(rendered.subject, "[Portfolio] New message from Jane Doe");
        assert_eq!(
            rendered.text,
            "Name:    Jane Doe\nEmail:   jane@example.com\nPhone:   +1 555 0100\n\nMessage:\nHello, I'd like to collaborate on a project."
        );
        assert!(rendered.html.contains(r#"<td style="padding:6px 0;">+1 555 0100</td>"#));
    }

    #[test]
    fn missing_phone() {
        for phone in [None, Some("")] {
            let rendered = render(&message("Jane Doe", phone, "Hello, this is a message."));

            assert!(rendered.text.contains("Phone:   Not provided\n"));
            assert!(rendered.html.contains("<em>Not provided</em>"));
        }
    }

    #[test]
    fn markup_is_escaped() {
        let rendered = render(&message(
            "<b>Mallory</b>",
            Some("<img src=x>"),
            "<script>alert(1)</script>",
        ));

        assert_eq!(
            rendered.subject,
            "[Portfolio] New message from &lt;b&gt;Mallory&lt;/b&gt;"
        );
        for body in [&rendered.text, &rendered.html] {
            assert!(body.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
            assert!(body.contains("&lt;img src=x&gt;"));
            assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
            assert!(!body.contains("<script>"));
            assert!(!body.contains("<b>"));
        }
    }

    #[test]
    fn html_links_email() {
        let rendered = render(&message("Jane Doe", None, "Hello, this is a message."));

        assert!(rendered
            .html
            .contains(r#"<a href="mailto:jane@example.com">jane@example.com</a>"#));
        assert!(rendered.html.contains("New Portfolio Message"));
        assert!(rendered.html.contains(
            r#"<p style="color:#333;white-space:pre-wrap;">Hello, this is a message.</p>"#
        ));
    }
}
