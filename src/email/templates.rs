use crate::reset::{PASSWORD_RESET_TEMPLATE, ResetNotice};

/// HTML body for a notice, chosen by its template id.
pub fn render(notice: &ResetNotice) -> Result<String, String> {
    match notice.template_id {
        PASSWORD_RESET_TEMPLATE => Ok(render_password_reset(&notice.reset_link)),
        other => Err(format!("Unknown email template: {other}")),
    }
}

pub fn render_password_reset(reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Password Reset</h2>
    <p>Someone asked to reset the password on your Storefinder account.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #303030; color: #fff200; text-decoration: none; border-radius: 4px;">Reset my password</a></p>
    <p>If the button does not work, paste this link into your browser: {reset_url}</p>
    <p style="color: #666; font-size: 14px;">This link is only good for a limited time. If you didn't request this, you can ignore it.</p>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(template_id: &'static str) -> ResetNotice {
        ResetNotice {
            recipient: "a@x.com".to_string(),
            subject: "Password Reset".to_string(),
            template_id,
            reset_link: "http://stores.test/account/reset/abc123".to_string(),
        }
    }

    #[test]
    fn reset_template_embeds_link() {
        let html = render(&notice(PASSWORD_RESET_TEMPLATE)).unwrap();
        assert!(html.contains("http://stores.test/account/reset/abc123"));
    }

    #[test]
    fn unknown_template_is_rejected() {
        assert!(render(&notice("newsletter")).is_err());
    }
}
