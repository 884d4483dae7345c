use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(api_key: &str, from_email: &str, from_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }

    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), String> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self.client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("email send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("email API error: {body}"));
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    pub async fn send_verification_email(&self, to: &str, verify_url: &str) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #e11d48;">Amora - Verify your email</h2>
            <p>Click the link below to verify your email address:</p>
            <p><a href="{verify_url}" style="background: #e11d48; color: #fff; padding: 12px 24px; border-radius: 8px; text-decoration: none;">Verify email</a></p>
            <p style="color: #666; margin-top: 20px;">This link expires in 24 hours.</p>
            </div>"#
        );

        self.send_email(to, "Amora - Verify your email address", &html).await
    }

    pub async fn send_password_reset_email(&self, to: &str, reset_url: &str) -> Result<(), String> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #e11d48;">Amora - Reset your password</h2>
            <p>Click the link below to choose a new password:</p>
            <p><a href="{reset_url}" style="background: #e11d48; color: #fff; padding: 12px 24px; border-radius: 8px; text-decoration: none;">Reset password</a></p>
            <p style="color: #666; margin-top: 20px;">This link expires in 24 hours. If you did not request this, please ignore this email.</p>
            </div>"#
        );

        self.send_email(to, "Amora - Reset your password", &html).await
    }
}
