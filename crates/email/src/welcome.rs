//! Welcome email template.

use chrono::{Datelike, Utc};

/// Render the welcome email body. Inputs are trusted configuration values,
/// not request data; nothing is escaped.
pub fn welcome_html(name: Option<&str>, app_name: &str) -> String {
    let name = name.unwrap_or("there");
    let year = Utc::now().year();
    format!(
        r##"<!DOCTYPE html>
<html>
  <body style="margin:0;padding:0;background-color:#ffffff;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
    <div style="max-width:600px;margin:0 auto;">
      <div style="padding:48px 32px;text-align:center;background-color:#7c3aed;background:linear-gradient(135deg,#7c3aed 0%,#9333ea 100%);">
        <h1 style="color:#ffffff;font-size:32px;font-weight:700;margin:0 0 16px 0;line-height:1.2;">Welcome to {app_name}! &#127881;</h1>
        <p style="color:#f3e8ff;font-size:18px;font-weight:600;margin:0;line-height:1.5;">We're thrilled to have you on board</p>
      </div>
      <div style="padding:32px;">
        <p style="color:#374151;font-size:16px;line-height:1.6;margin:0 0 24px 0;">Hi {name},</p>
        <p style="color:#374151;font-size:16px;line-height:1.6;margin:0 0 24px 0;">Thank you for joining {app_name}! We're excited to have you as part of our community. You're now all set to explore everything we have to offer.</p>
        <p style="color:#374151;font-size:16px;line-height:1.6;margin:0 0 24px 0;">Here's what you can do next:</p>
        <div style="background-color:#f9fafb;border-radius:8px;padding:24px;margin:0 0 24px 0;">
          <p style="color:#1f2937;font-size:14px;font-weight:600;margin:0 0 8px 0;">&#10024; Get Started</p>
          <p style="color:#4b5563;font-size:14px;margin:0 0 12px 0;">Explore our features and discover what makes {app_name} special</p>
          <p style="color:#1f2937;font-size:14px;font-weight:600;margin:0 0 8px 0;">&#128218; Learn More</p>
          <p style="color:#4b5563;font-size:14px;margin:0 0 12px 0;">Check out our documentation and guides to make the most of your experience</p>
          <p style="color:#1f2937;font-size:14px;font-weight:600;margin:0 0 8px 0;">&#128172; Connect</p>
          <p style="color:#4b5563;font-size:14px;margin:0;">Reach out if you have any questions or feedback - we're here to help!</p>
        </div>
        <div style="text-align:center;margin:0 0 24px 0;">
          <a href="#" style="background-color:#7c3aed;color:#ffffff;padding:12px 24px;border-radius:8px;font-size:16px;font-weight:600;text-decoration:none;display:inline-block;">Get Started</a>
        </div>
        <hr style="border:none;border-top:1px solid #e5e7eb;margin:24px 0;" />
        <p style="color:#6b7280;font-size:14px;text-align:center;margin:0;">If you have any questions, feel free to reach out to our support team. We're always happy to help!</p>
        <p style="color:#6b7280;font-size:14px;text-align:center;margin:16px 0 0 0;">Welcome aboard,</p>
        <p style="color:#6b7280;font-size:14px;text-align:center;margin:0;">The {app_name} Team</p>
      </div>
      <div style="background-color:#f9fafb;padding:24px 32px;text-align:center;">
        <p style="color:#6b7280;font-size:12px;margin:0;">&copy; {year} {app_name}. All rights reserved.</p>
      </div>
    </div>
  </body>
</html>
"##
    )
}
