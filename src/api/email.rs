//! Email delivery abstraction and message templates.
//!
//! Flows build an [`EmailMessage`] and hand it to an [`EmailSender`]; the
//! sender decides how to deliver (SMTP, API, etc.) and returns `Ok`/`Err`.
//! Passcode emails are sent inline and their failures propagate to the
//! caller; courtesy notifications (login detected, reset confirmation) are
//! dispatched through [`send_detached`] and never fail the request.
//!
//! The default sender for local dev is `LogEmailSender`, which logs and
//! returns `Ok(())`.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email send stub"
        );
        Ok(())
    }
}

/// Deliver a courtesy notification off the request path. Failures are
/// logged and never surfaced to the caller.
pub fn send_detached(sender: Arc<dyn EmailSender>, message: EmailMessage) {
    tokio::task::spawn_blocking(move || {
        if let Err(err) = sender.send(&message) {
            error!(to = %message.to, subject = %message.subject, "failed to send email: {err:#}");
        }
    });
}

/// Device/browser/OS summary derived from the client's User-Agent, included
/// in login-notification emails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device: String,
    pub browser: String,
    pub os: String,
}

impl EmailMessage {
    #[must_use]
    pub fn signup_otp(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "🔐 Your Exclusive Access Code for NexGen WebCon".to_string(),
            html: otp_html(code, "This OTP is valid for 1 minute only"),
            text: Some(format!(
                "Welcome to NexGen WebCon! Your OTP for sign up is: {code}. \
                 This OTP is valid for 1 minute. Enter it quickly to join the \
                 future of web conferences!"
            )),
        }
    }

    #[must_use]
    pub fn reset_otp(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "🔐 Password Reset OTP for NexGen WebCon".to_string(),
            html: otp_html(code, "This OTP is valid for 5 minutes only"),
            text: Some(format!(
                "Your OTP for password reset is: {code}. This OTP is valid for \
                 5 minutes. Enter it quickly to reset your password!"
            )),
        }
    }

    #[must_use]
    pub fn login_notification(to: &str, name: &str, device: &DeviceInfo) -> Self {
        Self {
            to: to.to_string(),
            subject: "New Login Detected on Your NexGen WebCon Account".to_string(),
            html: login_notification_html(name, device),
            text: None,
        }
    }

    #[must_use]
    pub fn reset_confirmation(to: &str, name: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your NexGen WebCon Password Has Been Reset".to_string(),
            html: reset_confirmation_html(name),
            text: None,
        }
    }
}

fn common_styles() -> &'static str {
    r"
  body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    color: #333;
    margin: 0;
    padding: 0;
  }
  .container {
    max-width: 600px;
    margin: 0 auto;
    padding: 20px;
    background-color: #f9f9f9;
  }
  .header {
    background-color: #1877f2;
    color: #ffffff;
    text-align: center;
    padding: 20px;
    font-size: 24px;
    font-weight: bold;
  }
  .content {
    background-color: #ffffff;
    padding: 30px;
    border-radius: 5px;
    box-shadow: 0 2px 5px rgba(0, 0, 0, 0.1);
  }
  .footer {
    text-align: center;
    margin-top: 20px;
    font-size: 12px;
    color: #888;
  }
"
}

fn otp_html(code: &str, validity_line: &str) -> String {
    let styles = common_styles();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>NexGen WebCon OTP</title>
  <style>
    {styles}
    .otp {{
      font-size: 36px;
      font-weight: bold;
      text-align: center;
      color: #1877f2;
      margin: 20px 0;
      letter-spacing: 5px;
    }}
    .timer {{
      text-align: center;
      font-size: 18px;
      color: #e74c3c;
      margin-bottom: 20px;
    }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      Welcome to NexGen WebCon!
    </div>
    <div class="content">
      <p>Hello,</p>
      <p>Thank you for choosing NexGen WebCon. To continue, please use the following One-Time Password (OTP):</p>
      <div class="otp">{code}</div>
      <div class="timer">⏳ {validity_line}</div>
      <p>Please enter this code to verify your account and join the future of web conferences!</p>
      <p>If you didn't request this OTP, please ignore this email.</p>
    </div>
    <div class="footer">
      &copy; 2024 NexGen WebCon. All rights reserved.
    </div>
  </div>
</body>
</html>
"#
    )
}

fn login_notification_html(name: &str, device: &DeviceInfo) -> String {
    let styles = common_styles();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>New Login Detected</title>
  <style>
    {styles}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      NexGen WebCon - New Login Detected
    </div>
    <div class="content">
      <p>Hello {name},</p>
      <p>We detected a new login to your NexGen WebCon account.</p>
      <p><strong>Device Details:</strong></p>
      <ul>
        <li>Device: {device}</li>
        <li>Browser: {browser}</li>
        <li>Operating System: {os}</li>
      </ul>
      <p>If this was you, you can disregard this email. If you didn't log in recently, please change your password immediately and contact our support team.</p>
    </div>
    <div class="footer">
      &copy; 2024 NexGen WebCon. All rights reserved.
    </div>
  </div>
</body>
</html>
"#,
        device = device.device,
        browser = device.browser,
        os = device.os,
    )
}

fn reset_confirmation_html(name: &str) -> String {
    let styles = common_styles();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Password Reset Confirmation</title>
  <style>
    {styles}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      NexGen WebCon - Password Reset Confirmation
    </div>
    <div class="content">
      <p>Hello {name},</p>
      <p>Your password has been successfully reset.</p>
      <p>If you did not initiate this password reset, please contact our support team immediately.</p>
    </div>
    <div class="footer">
      &copy; 2024 NexGen WebCon. All rights reserved.
    </div>
  </div>
</body>
</html>
"#
    )
}
